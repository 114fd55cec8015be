//! Calendar, heatmap and streak figures derived from the session list.
//!
//! Everything here is a pure function of the newest-first session list; nothing
//! is cached between calls.

use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, Duration, NaiveDate};

use crate::models::session::SessionRecord;

pub const RECENT_SESSIONS_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarCell {
    Blank,
    Day(NaiveDate),
}

/// Heatmap intensity for a day, ordered from `Empty` to `Max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HeatLevel {
    Empty,
    Low,
    Medium,
    High,
    Max,
}

pub fn heat_level(count: usize) -> HeatLevel {
    match count {
        0 => HeatLevel::Empty,
        1 => HeatLevel::Low,
        2 => HeatLevel::Medium,
        3 => HeatLevel::High,
        _ => HeatLevel::Max,
    }
}

/// Month the history calendar is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthCursor {
    pub year: i32,
    pub month: u32,
}

impl MonthCursor {
    pub fn containing(date: NaiveDate) -> Self {
        Self { year: date.year(), month: date.month() }
    }

    pub fn previous(self) -> Self {
        if self.month <= 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    pub fn next(self) -> Self {
        if self.month >= 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn day(self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    pub fn days_in_month(self) -> u32 {
        match (self.first_day(), self.next().first_day()) {
            (Some(first), Some(next_first)) => (next_first - first).num_days() as u32,
            _ => 0,
        }
    }

    /// e.g. "October 2026"
    pub fn label(self) -> String {
        self.first_day()
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_default()
    }
}

pub fn sessions_for_date(sessions: &[SessionRecord], date: NaiveDate) -> Vec<&SessionRecord> {
    sessions.iter().filter(|s| s.date == date).collect()
}

pub fn session_count_for_date(sessions: &[SessionRecord], date: NaiveDate) -> usize {
    sessions.iter().filter(|s| s.date == date).count()
}

/// Groups sessions by completion date; each group keeps list order.
pub fn sessions_by_date(sessions: &[SessionRecord]) -> BTreeMap<NaiveDate, Vec<&SessionRecord>> {
    let mut grouped: BTreeMap<NaiveDate, Vec<&SessionRecord>> = BTreeMap::new();
    for session in sessions {
        grouped.entry(session.date).or_default().push(session);
    }
    grouped
}

/// Grid cells for a month: leading blanks up to the 1st (weeks start on
/// Sunday), then one cell per day.
pub fn calendar_days(year: i32, month: u32) -> Vec<CalendarCell> {
    let cursor = MonthCursor { year, month };
    let Some(first) = cursor.first_day() else {
        return Vec::new();
    };

    let leading = first.weekday().num_days_from_sunday() as usize;
    let mut cells = vec![CalendarCell::Blank; leading];
    cells.extend(
        (1..=cursor.days_in_month())
            .filter_map(|day| cursor.day(day))
            .map(CalendarCell::Day),
    );
    cells
}

/// Consecutive days with at least one session, counting back from `today`.
pub fn current_streak(sessions: &[SessionRecord], today: NaiveDate) -> u32 {
    let active_days: HashSet<NaiveDate> = sessions.iter().map(|s| s.date).collect();
    let mut streak = 0;
    let mut day = today;
    while active_days.contains(&day) {
        streak += 1;
        match day.checked_sub_signed(Duration::days(1)) {
            Some(previous) => day = previous,
            None => break,
        }
    }
    streak
}

pub fn recent_sessions(sessions: &[SessionRecord]) -> &[SessionRecord] {
    &sessions[..sessions.len().min(RECENT_SESSIONS_LIMIT)]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistorySummary {
    pub total_sessions: usize,
    pub total_focus_minutes: u64,
    pub active_days: usize,
    pub current_streak: u32,
}

pub fn summarize(sessions: &[SessionRecord], today: NaiveDate) -> HistorySummary {
    HistorySummary {
        total_sessions: sessions.len(),
        total_focus_minutes: sessions.iter().map(|s| u64::from(s.duration)).sum(),
        active_days: sessions_by_date(sessions).len(),
        current_streak: current_streak(sessions, today),
    }
}
