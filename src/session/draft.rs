use crate::models::session::SessionType;

pub const TIME_PRESETS: [u32; 4] = [15, 30, 60, 120];
pub const DEFAULT_MINUTES: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeChoice {
    Preset(u32),
    Custom,
}

impl Default for TimeChoice {
    fn default() -> Self {
        TimeChoice::Preset(DEFAULT_MINUTES)
    }
}

impl TimeChoice {
    /// Cycles presets then Custom, wrapping around in either direction.
    pub fn cycle(self, forward: bool) -> Self {
        let mut choices: Vec<TimeChoice> = TIME_PRESETS.iter().map(|m| TimeChoice::Preset(*m)).collect();
        choices.push(TimeChoice::Custom);
        let len = choices.len();
        let idx = choices.iter().position(|c| *c == self).unwrap_or(0);
        let next = if forward { (idx + 1) % len } else { (idx + len - 1) % len };
        choices[next]
    }
}

/// Setup form for the next session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionDraft {
    pub time_choice: TimeChoice,
    pub custom_time: String,
    pub session_type: Option<SessionType>,
    pub session_focus: String,
    pub purpose: String,
    pub outcome: String,
}

/// Validated intentions a focus run is started with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPlan {
    pub planned_minutes: u32,
    pub session_type: SessionType,
    pub session_focus: String,
    pub purpose: String,
    pub outcome: String,
}

impl SessionDraft {
    /// Planned length in minutes, if the duration inputs are usable.
    pub fn resolved_minutes(&self) -> Option<u32> {
        let minutes = match self.time_choice {
            TimeChoice::Preset(minutes) => minutes,
            TimeChoice::Custom => self.custom_time.trim().parse::<u32>().ok()?,
        };
        // the countdown is kept in seconds
        if minutes == 0 || minutes.checked_mul(60).is_none() {
            return None;
        }
        Some(minutes)
    }

    pub fn can_start(&self) -> bool {
        self.to_plan().is_some()
    }

    pub fn to_plan(&self) -> Option<SessionPlan> {
        let planned_minutes = self.resolved_minutes()?;
        let session_type = self.session_type?;
        if [&self.session_focus, &self.purpose, &self.outcome]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return None;
        }
        Some(SessionPlan {
            planned_minutes,
            session_type,
            session_focus: self.session_focus.trim().to_string(),
            purpose: self.purpose.trim().to_string(),
            outcome: self.outcome.trim().to_string(),
        })
    }

    pub fn cycle_session_type(&mut self, forward: bool) {
        let all = SessionType::ALL;
        self.session_type = Some(match self.session_type.and_then(|t| all.iter().position(|x| *x == t)) {
            None if forward => all[0],
            None => all[all.len() - 1],
            Some(idx) if forward => all[(idx + 1) % all.len()],
            Some(idx) => all[(idx + all.len() - 1) % all.len()],
        });
    }
}
