use chrono::{Datelike, Duration, NaiveDate, Timelike};

use crate::audio::Chime;
use crate::clock::Clock;
use crate::models::session::{Fulfillment, SessionRecord};
use crate::session::draft::{SessionDraft, SessionPlan};
use crate::session::history::MonthCursor;
use crate::store::SessionStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusRun {
    pub plan: SessionPlan,
    pub time_left_secs: u32,
    pub running: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectionForm {
    pub plan: SessionPlan,
    pub time_left_secs: u32,
    pub fulfilled: Option<Fulfillment>,
    pub reflection: String,
}

impl ReflectionForm {
    pub fn completed_minutes(&self) -> u32 {
        self.plan.planned_minutes.saturating_sub(self.time_left_secs / 60)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryView {
    pub month: MonthCursor,
    pub cursor_day: u32,
    pub selected_date: Option<NaiveDate>,
}

impl HistoryView {
    pub fn cursor_date(&self) -> Option<NaiveDate> {
        self.month.day(self.cursor_day)
    }

    fn clamp_cursor(&mut self) {
        let last = self.month.days_in_month().max(1);
        self.cursor_day = self.cursor_day.clamp(1, last);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Setup(SessionDraft),
    Focus(FocusRun),
    Reflection(ReflectionForm),
    /// Keeps the setup form so leaving history returns to it unchanged.
    History { draft: SessionDraft, view: HistoryView },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Idle,
    Counting,
    Completed,
}

/// Owns the session list and drives setup → focus → reflection → setup.
///
/// Operations that do not apply to the current phase leave the state as it is
/// and report `false`/`None`.
pub struct SessionController {
    phase: Phase,
    sessions: Vec<SessionRecord>,
    store: Box<dyn SessionStore>,
    chime: Box<dyn Chime>,
    clock: Box<dyn Clock>,
    diagnostics: Vec<String>,
}

impl SessionController {
    pub fn new(store: Box<dyn SessionStore>, chime: Box<dyn Chime>, clock: Box<dyn Clock>) -> Self {
        let sessions = crate::store::load_or_empty(store.as_ref());
        Self {
            phase: Phase::Setup(SessionDraft::default()),
            sessions,
            store,
            chime,
            clock,
            diagnostics: Vec::new(),
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Newest first.
    pub fn sessions(&self) -> &[SessionRecord] {
        &self.sessions
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.now().date_naive()
    }

    pub fn take_diagnostics(&mut self) -> Vec<String> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn draft(&self) -> Option<&SessionDraft> {
        match &self.phase {
            Phase::Setup(draft) => Some(draft),
            _ => None,
        }
    }

    pub fn draft_mut(&mut self) -> Option<&mut SessionDraft> {
        match &mut self.phase {
            Phase::Setup(draft) => Some(draft),
            _ => None,
        }
    }

    pub fn can_start(&self) -> bool {
        self.draft().is_some_and(SessionDraft::can_start)
    }

    pub fn start_session(&mut self) -> bool {
        let Some(plan) = self.draft().and_then(SessionDraft::to_plan) else {
            return false;
        };
        log::info!("Starting {} minute {} session", plan.planned_minutes, plan.session_type.label());
        self.phase = Phase::Focus(FocusRun {
            time_left_secs: plan.planned_minutes * 60,
            running: true,
            plan,
        });
        true
    }

    pub fn time_left_secs(&self) -> Option<u32> {
        match &self.phase {
            Phase::Focus(run) => Some(run.time_left_secs),
            Phase::Reflection(form) => Some(form.time_left_secs),
            _ => None,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(&self.phase, Phase::Focus(run) if run.running)
    }

    /// The countdown should receive ticks only while focusing and running.
    pub fn wants_ticks(&self) -> bool {
        self.is_running()
    }

    /// One second of countdown.
    pub fn tick(&mut self) -> TickOutcome {
        let Phase::Focus(run) = &mut self.phase else {
            return TickOutcome::Idle;
        };
        if !run.running {
            return TickOutcome::Idle;
        }
        if run.time_left_secs > 1 {
            run.time_left_secs -= 1;
            return TickOutcome::Counting;
        }

        run.running = false;
        run.time_left_secs = 0;
        log::info!("Focus countdown finished");
        if let Err(e) = self.chime.play() {
            log::warn!("Failed to play chime: {}", e);
        }
        self.enter_reflection();
        TickOutcome::Completed
    }

    pub fn toggle_pause(&mut self) -> bool {
        match &mut self.phase {
            Phase::Focus(run) => {
                run.running = !run.running;
                log::debug!("Focus {}", if run.running { "resumed" } else { "paused" });
                true
            }
            _ => false,
        }
    }

    /// Ends the focus phase early; the remaining time is kept for the record.
    pub fn end_session(&mut self) -> bool {
        match &mut self.phase {
            Phase::Focus(run) => {
                run.running = false;
                log::info!("Session ended with {}s remaining", run.time_left_secs);
            }
            _ => return false,
        }
        self.enter_reflection();
        true
    }

    fn enter_reflection(&mut self) {
        let phase = std::mem::replace(&mut self.phase, Phase::Setup(SessionDraft::default()));
        self.phase = match phase {
            Phase::Focus(run) => Phase::Reflection(ReflectionForm {
                plan: run.plan,
                time_left_secs: run.time_left_secs,
                fulfilled: None,
                reflection: String::new(),
            }),
            other => other,
        };
    }

    pub fn reflection_form(&self) -> Option<&ReflectionForm> {
        match &self.phase {
            Phase::Reflection(form) => Some(form),
            _ => None,
        }
    }

    pub fn reflection_form_mut(&mut self) -> Option<&mut ReflectionForm> {
        match &mut self.phase {
            Phase::Reflection(form) => Some(form),
            _ => None,
        }
    }

    pub fn set_fulfilled(&mut self, fulfilled: Fulfillment) -> bool {
        self.reflection_form_mut()
            .map(|form| form.fulfilled = Some(fulfilled))
            .is_some()
    }

    pub fn set_reflection(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        self.reflection_form_mut()
            .map(|form| form.reflection = text)
            .is_some()
    }

    pub fn can_save(&self) -> bool {
        self.reflection_form().is_some_and(|form| form.fulfilled.is_some())
    }

    /// Finalizes the reflection into a record, persists the list and resets
    /// to a blank setup form.
    pub fn save_session(&mut self) -> Option<SessionRecord> {
        let form = match &self.phase {
            Phase::Reflection(form) if form.fulfilled.is_some() => form.clone(),
            _ => return None,
        };
        let fulfilled = form.fulfilled?;

        let now = self.clock.now();
        let completed = form.completed_minutes();
        let started = now - Duration::minutes(i64::from(completed));
        let start_time = started.time().with_second(0).and_then(|t| t.with_nanosecond(0)).unwrap_or(started.time());
        let reflection = form.reflection.trim();

        let record = SessionRecord {
            id: self.next_id(now.timestamp_millis()),
            date: now.date_naive(),
            start_time,
            duration: completed,
            planned_duration: form.plan.planned_minutes,
            purpose: form.plan.purpose,
            outcome: form.plan.outcome,
            session_type: form.plan.session_type,
            session_focus: form.plan.session_focus,
            fulfilled,
            reflection: (!reflection.is_empty()).then(|| reflection.to_string()),
            timestamp: now,
        };

        self.sessions.insert(0, record.clone());
        self.persist();
        log::info!(
            "Saved session {} ({} of {} minutes)",
            record.id,
            record.duration,
            record.planned_duration
        );

        self.phase = Phase::Setup(SessionDraft::default());
        Some(record)
    }

    fn next_id(&self, candidate: i64) -> i64 {
        match self.sessions.iter().map(|s| s.id).max() {
            Some(newest) if candidate <= newest => newest + 1,
            _ => candidate,
        }
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.sessions) {
            log::error!("{}", e);
            self.diagnostics.push(e.to_string());
        }
    }

    pub fn open_history(&mut self) -> bool {
        if !matches!(self.phase, Phase::Setup(_)) {
            return false;
        }
        let today = self.today();
        let phase = std::mem::replace(&mut self.phase, Phase::Setup(SessionDraft::default()));
        if let Phase::Setup(draft) = phase {
            self.phase = Phase::History {
                draft,
                view: HistoryView {
                    month: MonthCursor::containing(today),
                    cursor_day: today.day(),
                    selected_date: None,
                },
            };
        }
        true
    }

    pub fn close_history(&mut self) -> bool {
        let phase = std::mem::replace(&mut self.phase, Phase::Setup(SessionDraft::default()));
        match phase {
            Phase::History { draft, .. } => {
                self.phase = Phase::Setup(draft);
                true
            }
            other => {
                self.phase = other;
                false
            }
        }
    }

    pub fn history_view(&self) -> Option<&HistoryView> {
        match &self.phase {
            Phase::History { view, .. } => Some(view),
            _ => None,
        }
    }

    fn history_view_mut(&mut self) -> Option<&mut HistoryView> {
        match &mut self.phase {
            Phase::History { view, .. } => Some(view),
            _ => None,
        }
    }

    pub fn previous_month(&mut self) -> bool {
        self.history_view_mut()
            .map(|view| {
                view.month = view.month.previous();
                view.clamp_cursor();
            })
            .is_some()
    }

    pub fn next_month(&mut self) -> bool {
        self.history_view_mut()
            .map(|view| {
                view.month = view.month.next();
                view.clamp_cursor();
            })
            .is_some()
    }

    /// Moves the day cursor within the shown month.
    pub fn move_day_cursor(&mut self, delta: i64) -> bool {
        self.history_view_mut()
            .map(|view| {
                let moved = i64::from(view.cursor_day) + delta;
                view.cursor_day = moved.clamp(1, i64::from(u32::MAX)) as u32;
                view.clamp_cursor();
            })
            .is_some()
    }

    pub fn select_cursor_date(&mut self) -> bool {
        match self.history_view_mut() {
            Some(view) => {
                view.selected_date = view.cursor_date();
                view.selected_date.is_some()
            }
            None => false,
        }
    }

    pub fn clear_selected_date(&mut self) -> bool {
        self.history_view_mut()
            .map(|view| view.selected_date = None)
            .is_some()
    }

    /// Drill-down → calendar → setup.
    pub fn history_back(&mut self) -> bool {
        match self.history_view() {
            Some(view) if view.selected_date.is_some() => self.clear_selected_date(),
            Some(_) => self.close_history(),
            None => false,
        }
    }
}
