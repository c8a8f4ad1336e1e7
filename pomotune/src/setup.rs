use pomotune_core::SessionConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Focus,
    ShortBreak,
    LongBreak,
    BreakInterval,
    Sessions,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Focus,
        Field::ShortBreak,
        Field::LongBreak,
        Field::BreakInterval,
        Field::Sessions,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::Focus => "Focus Session",
            Field::ShortBreak => "Short Break",
            Field::LongBreak => "Long Break",
            Field::BreakInterval => "Long Break After",
            Field::Sessions => "Sessions",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Field::Focus | Field::ShortBreak | Field::LongBreak => "min",
            Field::BreakInterval | Field::Sessions => "sesh",
        }
    }
}

const FOCUS_STEP: u32 = 5;
const FOCUS_MIN: u32 = 5;
const SHORT_BREAK_RANGE: (u32, u32) = (5, 10);
const LONG_BREAK_RANGE: (u32, u32) = (15, 25);
const MAX_SESSIONS: u32 = 6;

/// Counters on the setup screen. Buttons clamp; values loaded from config or
/// flags are taken as-is until the user touches them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupForm {
    pub config: SessionConfig,
    pub selected: usize,
}

impl SetupForm {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            selected: 0,
        }
    }

    pub fn selected_field(&self) -> Field {
        Field::ALL[self.selected.min(Field::ALL.len() - 1)]
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        self.selected = (self.selected + 1).min(Field::ALL.len() - 1);
    }

    pub fn value(&self, field: Field) -> Option<u32> {
        let c = &self.config;
        match field {
            Field::Focus => Some(c.focus_duration),
            Field::ShortBreak => Some(c.short_break_duration),
            Field::LongBreak => c.long_break_duration,
            Field::BreakInterval => Some(c.break_interval),
            Field::Sessions => Some(c.total_sessions),
        }
    }

    pub fn increment(&mut self) {
        let field = self.selected_field();
        let c = &mut self.config;
        match field {
            Field::Focus => c.focus_duration = c.focus_duration.saturating_add(FOCUS_STEP),
            Field::ShortBreak => {
                c.short_break_duration =
                    c.short_break_duration.saturating_add(1).min(SHORT_BREAK_RANGE.1);
            }
            Field::LongBreak => {
                c.long_break_duration = Some(match c.long_break_duration {
                    Some(minutes) => minutes.saturating_add(1).min(LONG_BREAK_RANGE.1),
                    None => LONG_BREAK_RANGE.0,
                });
            }
            Field::BreakInterval => {
                c.break_interval = c.break_interval.saturating_add(1).min(c.total_sessions);
            }
            Field::Sessions => {
                c.total_sessions = c.total_sessions.saturating_add(1).min(MAX_SESSIONS);
            }
        }
    }

    pub fn decrement(&mut self) {
        let field = self.selected_field();
        let c = &mut self.config;
        match field {
            Field::Focus => {
                c.focus_duration = c.focus_duration.saturating_sub(FOCUS_STEP).max(FOCUS_MIN);
            }
            Field::ShortBreak => {
                c.short_break_duration =
                    c.short_break_duration.saturating_sub(1).max(SHORT_BREAK_RANGE.0);
            }
            Field::LongBreak => {
                c.long_break_duration = c
                    .long_break_duration
                    .map(|minutes| minutes.saturating_sub(1).max(LONG_BREAK_RANGE.0));
            }
            Field::BreakInterval => c.break_interval = c.break_interval.saturating_sub(1).max(1),
            Field::Sessions => {
                c.total_sessions = c.total_sessions.saturating_sub(1).max(1);
                if c.break_interval > c.total_sessions {
                    c.break_interval = c.total_sessions;
                }
            }
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        self.config
    }
}
