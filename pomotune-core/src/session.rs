use serde::{Deserialize, Serialize};

/// User-facing knobs for one run. Durations are in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    pub focus_duration: u32,
    pub short_break_duration: u32,
    /// Missing means a scheduled long break lasts zero minutes.
    #[serde(default)]
    pub long_break_duration: Option<u32>,
    /// Every Nth focus interval is followed by a long break.
    pub break_interval: u32,
    pub total_sessions: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IntervalKind {
    Focus,
    ShortBreak,
    LongBreak,
}

impl IntervalKind {
    pub fn is_break(self) -> bool {
        matches!(self, IntervalKind::ShortBreak | IntervalKind::LongBreak)
    }

    pub fn label(self) -> &'static str {
        match self {
            IntervalKind::Focus => "Focus",
            IntervalKind::ShortBreak => "Short Break",
            IntervalKind::LongBreak => "Long Break",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interval {
    pub kind: IntervalKind,
    pub duration_secs: u64,
}

impl Interval {
    fn from_minutes(kind: IntervalKind, minutes: u32) -> Self {
        Self {
            kind,
            duration_secs: u64::from(minutes) * 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerSession {
    pub config: SessionConfig,
    pub intervals: Vec<Interval>,
    pub current_index: usize,
    pub completed: bool,
    /// Focus intervals the user has passed through, starting at 1.
    pub session_count: u32,
}

impl TimerSession {
    pub fn current_interval(&self) -> Option<&Interval> {
        self.intervals.get(self.current_index)
    }

    pub fn is_last_interval(&self) -> bool {
        self.current_index + 1 >= self.intervals.len()
    }
}

/// Expands `config` into alternating focus and break intervals, ending on a
/// focus interval. Values are taken as-is; bounds checking belongs to
/// whoever collected them.
pub fn create_session(config: SessionConfig) -> TimerSession {
    let mut intervals = Vec::new();

    for i in 1..=config.total_sessions {
        intervals.push(Interval::from_minutes(
            IntervalKind::Focus,
            config.focus_duration,
        ));

        if i == config.total_sessions {
            break;
        }

        // A zero cadence never lines up, so it only yields short breaks.
        let long_break = config.break_interval != 0 && i % config.break_interval == 0;
        let interval = if long_break {
            Interval::from_minutes(
                IntervalKind::LongBreak,
                config.long_break_duration.unwrap_or(0),
            )
        } else {
            Interval::from_minutes(IntervalKind::ShortBreak, config.short_break_duration)
        };
        intervals.push(interval);
    }

    TimerSession {
        config,
        intervals,
        current_index: 0,
        completed: false,
        session_count: 1,
    }
}
