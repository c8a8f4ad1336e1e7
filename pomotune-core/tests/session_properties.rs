use pomotune_core::{create_session, reduce, Action, IntervalKind, SessionConfig, TimerState};
use proptest::prelude::*;

fn config_with_minutes(max_minutes: u32) -> impl Strategy<Value = SessionConfig> {
    (
        1u32..=max_minutes,
        1u32..=max_minutes,
        proptest::option::of(1u32..=max_minutes),
        1u32..=8,
        1u32..=12,
    )
        .prop_map(
            |(focus, short_break, long_break, break_interval, total_sessions)| SessionConfig {
                focus_duration: focus,
                short_break_duration: short_break,
                long_break_duration: long_break,
                break_interval,
                total_sessions,
            },
        )
}

fn session_config() -> impl Strategy<Value = SessionConfig> {
    config_with_minutes(90)
}

/// Short enough to tick through every interval.
fn quick_config() -> impl Strategy<Value = SessionConfig> {
    config_with_minutes(3)
}

/// Drives a session to completion, starting the timer whenever a boundary
/// paused it. Returns every state the reducer produced.
fn play_through(config: SessionConfig) -> Vec<TimerState> {
    let mut state = TimerState::new(create_session(config));
    let mut history = vec![state.clone()];
    while !state.session.completed {
        if !state.is_running {
            state = reduce(state, Action::Start);
        }
        state = reduce(state, Action::Tick);
        history.push(state.clone());
    }
    history
}

proptest! {
    #[test]
    fn sessions_alternate_and_end_on_focus(config in session_config()) {
        let session = create_session(config);
        let n = config.total_sessions as usize;

        prop_assert_eq!(session.intervals.len(), 2 * n - 1);
        prop_assert_eq!(session.intervals.first().map(|i| i.kind), Some(IntervalKind::Focus));
        prop_assert_eq!(session.intervals.last().map(|i| i.kind), Some(IntervalKind::Focus));

        for (position, interval) in session.intervals.iter().enumerate() {
            if position % 2 == 0 {
                prop_assert_eq!(interval.kind, IntervalKind::Focus);
                prop_assert_eq!(interval.duration_secs, u64::from(config.focus_duration) * 60);
            } else {
                let focus_number = (position as u32 + 1) / 2;
                let expected = if focus_number % config.break_interval == 0 {
                    IntervalKind::LongBreak
                } else {
                    IntervalKind::ShortBreak
                };
                prop_assert_eq!(interval.kind, expected);
            }
        }
    }

    #[test]
    fn countdown_ticks_change_only_time_left(config in session_config(), ticks in 0u64..59) {
        let start = reduce(TimerState::new(create_session(config)), Action::Start);
        let mut state = start.clone();
        for _ in 0..ticks {
            state = reduce(state, Action::Tick);
        }
        prop_assert_eq!(state.time_left, start.time_left - ticks);
        prop_assert_eq!(&state.session, &start.session);
        prop_assert!(state.is_running);
    }

    #[test]
    fn boundaries_pause_and_load_the_next_interval(config in quick_config()) {
        let history = play_through(config);

        for pair in history.windows(2) {
            let (before, after) = (&pair[0], &pair[1]);
            if before.time_left > 1 {
                continue;
            }
            prop_assert!(!after.is_running);
            if after.session.completed {
                prop_assert_eq!(after.time_left, 0);
                prop_assert_eq!(after.session.current_index, after.session.intervals.len() - 1);
            } else {
                prop_assert_eq!(after.session.current_index, before.session.current_index + 1);
                prop_assert_eq!(
                    after.time_left,
                    after.session.intervals[after.session.current_index].duration_secs
                );
            }
        }
    }

    #[test]
    fn session_count_tracks_completed_breaks(config in quick_config()) {
        let history = play_through(config);

        for pair in history.windows(2) {
            let (before, after) = (&pair[0], &pair[1]);
            let crossed = after.session.current_index != before.session.current_index;
            let finished_break = before
                .current_interval()
                .is_some_and(|interval| interval.kind.is_break());
            let expected = if crossed && finished_break {
                before.session.session_count + 1
            } else {
                before.session.session_count
            };
            prop_assert_eq!(after.session.session_count, expected);
        }

        let last = history.last().unwrap();
        prop_assert_eq!(last.session.session_count, config.total_sessions);
    }
}
