use crate::session::{Interval, TimerSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Stop,
    /// One elapsed second.
    Tick,
    Restart,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerState {
    pub session: TimerSession,
    /// Seconds left in the interval at `session.current_index`.
    pub time_left: u64,
    pub is_running: bool,
}

impl TimerState {
    /// Stopped, with the clock set to the first interval.
    pub fn new(session: TimerSession) -> Self {
        let time_left = session
            .intervals
            .first()
            .map_or(0, |interval| interval.duration_secs);
        Self {
            session,
            time_left,
            is_running: false,
        }
    }

    pub fn current_interval(&self) -> Option<&Interval> {
        self.session.current_interval()
    }

    /// Seconds already spent in the current interval.
    pub fn elapsed_in_interval(&self) -> u64 {
        self.current_interval()
            .map_or(0, |interval| interval.duration_secs.saturating_sub(self.time_left))
    }
}

/// Applies `action` and returns the next state.
///
/// `Tick` is not gated on `is_running`; the tick source is expected to stay
/// quiet while the timer is stopped. Reaching an interval boundary always
/// stops the timer so the caller gets a chance to react before the next
/// interval starts.
pub fn reduce(state: TimerState, action: Action) -> TimerState {
    match action {
        Action::Start => TimerState {
            is_running: true,
            ..state
        },
        Action::Stop => TimerState {
            is_running: false,
            ..state
        },
        // Resetting the session has not been decided yet; the action is
        // accepted and ignored.
        Action::Restart => state,
        Action::Tick => tick(state),
    }
}

fn tick(state: TimerState) -> TimerState {
    if state.time_left > 1 {
        return TimerState {
            time_left: state.time_left - 1,
            ..state
        };
    }

    let TimerState { mut session, .. } = state;
    let next_index = session.current_index + 1;

    if next_index >= session.intervals.len() {
        session.completed = true;
        return TimerState {
            session,
            time_left: 0,
            is_running: false,
        };
    }

    let finished_break = session
        .current_interval()
        .is_some_and(|interval| interval.kind.is_break());
    if finished_break && session.current_index >= 1 {
        session.session_count += 1;
    }

    session.current_index = next_index;
    let time_left = session.intervals[next_index].duration_secs;

    TimerState {
        session,
        time_left,
        is_running: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{create_session, IntervalKind, SessionConfig};

    fn state() -> TimerState {
        TimerState::new(create_session(SessionConfig {
            focus_duration: 1,
            short_break_duration: 1,
            long_break_duration: Some(5),
            break_interval: 2,
            total_sessions: 3,
        }))
    }

    fn run_out(mut state: TimerState) -> TimerState {
        while state.time_left > 1 {
            state = reduce(state, Action::Tick);
        }
        reduce(state, Action::Tick)
    }

    #[test]
    fn new_state_is_stopped_on_the_first_interval() {
        let state = state();
        assert_eq!(state.time_left, 60);
        assert!(!state.is_running);
        assert_eq!(state.current_interval().unwrap().kind, IntervalKind::Focus);
    }

    #[test]
    fn start_and_stop_only_touch_the_running_flag() {
        let initial = state();

        let started = reduce(initial.clone(), Action::Start);
        assert!(started.is_running);
        assert_eq!(started.session, initial.session);
        assert_eq!(started.time_left, initial.time_left);
        assert_eq!(reduce(started.clone(), Action::Start), started);

        let stopped = reduce(started, Action::Stop);
        assert_eq!(stopped, initial);
        assert_eq!(reduce(stopped.clone(), Action::Stop), stopped);
    }

    #[test]
    fn restart_leaves_state_untouched() {
        let mid_interval = reduce(reduce(state(), Action::Start), Action::Tick);
        assert_eq!(reduce(mid_interval.clone(), Action::Restart), mid_interval);
    }

    #[test]
    fn tick_counts_down_one_second() {
        let running = reduce(state(), Action::Start);
        let ticked = reduce(running.clone(), Action::Tick);
        assert_eq!(ticked.time_left, 59);
        assert_eq!(ticked.session, running.session);
        assert!(ticked.is_running);
    }

    #[test]
    fn tick_at_one_second_moves_to_next_interval_and_pauses() {
        let mut state = reduce(state(), Action::Start);
        state.time_left = 1;

        let next = reduce(state, Action::Tick);
        assert_eq!(next.session.current_index, 1);
        assert_eq!(next.time_left, 60);
        assert!(!next.is_running);
        assert_eq!(next.session.session_count, 1);
    }

    #[test]
    fn tick_at_zero_also_crosses_the_boundary() {
        let mut state = state();
        state.time_left = 0;
        assert_eq!(reduce(state, Action::Tick).session.current_index, 1);
    }

    #[test]
    fn completed_breaks_bump_the_session_count() {
        let after_focus = run_out(state());
        assert_eq!(after_focus.session.session_count, 1);

        let after_short_break = run_out(after_focus);
        assert_eq!(after_short_break.session.current_index, 2);
        assert_eq!(after_short_break.session.session_count, 2);

        let after_second_focus = run_out(after_short_break);
        assert_eq!(after_second_focus.session.session_count, 2);
        assert_eq!(after_second_focus.time_left, 300);

        let after_long_break = run_out(after_second_focus);
        assert_eq!(after_long_break.session.session_count, 3);
    }

    #[test]
    fn last_boundary_completes_the_session() {
        let mut state = state();
        for _ in 0..4 {
            state = run_out(state);
        }
        assert_eq!(state.session.current_index, 4);
        assert!(!state.session.completed);

        let finished = run_out(reduce(state, Action::Start));
        assert!(finished.session.completed);
        assert!(!finished.is_running);
        assert_eq!(finished.time_left, 0);
        assert_eq!(finished.session.current_index, 4);
        assert_eq!(finished.session.session_count, 3);
    }

    #[test]
    fn zero_length_interval_finishes_on_next_tick() {
        let session = create_session(SessionConfig {
            focus_duration: 0,
            short_break_duration: 0,
            long_break_duration: None,
            break_interval: 1,
            total_sessions: 2,
        });
        let state = reduce(TimerState::new(session), Action::Tick);
        assert_eq!(state.session.current_index, 1);
        assert_eq!(state.time_left, 0);
    }

    #[test]
    fn empty_session_completes_immediately() {
        let session = create_session(SessionConfig {
            focus_duration: 25,
            short_break_duration: 5,
            long_break_duration: Some(15),
            break_interval: 4,
            total_sessions: 0,
        });
        let state = TimerState::new(session);
        assert_eq!(state.time_left, 0);

        let state = reduce(state, Action::Tick);
        assert!(state.session.completed);
        assert_eq!(state.session.current_index, 0);
    }
}
