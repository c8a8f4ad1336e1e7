use crate::config::Config;
use crate::playback::{NowPlaying, Playback, PlaybackCommand};
use crate::setup::SetupForm;
use chrono::Local;
use pomotune_core::{create_session, reduce, Action, IntervalKind, SessionConfig, TimerState};
use std::io::{self, Write};
use std::time::{Duration, Instant};
use tachyonfx::{fx, EffectManager, EffectTimer, Interpolation};
use tracing::{debug, info, warn};

pub const TICK: Duration = Duration::from_secs(1);

#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppMode {
    #[default]
    Setup,
    Timer,
}

/// Emitted once per interval boundary crossed by a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalFinished {
    pub kind: IntervalKind,
    pub index: usize,
    pub session_complete: bool,
}

impl IntervalFinished {
    pub fn title(&self) -> &'static str {
        match (self.session_complete, self.kind) {
            (true, _) => "Session complete",
            (false, IntervalKind::Focus) => "Focus complete",
            (false, _) => "Break over",
        }
    }

    pub fn body(&self) -> String {
        let next = if self.session_complete {
            "Nice work."
        } else if self.kind == IntervalKind::Focus {
            "Time for a break."
        } else {
            "Back to focus."
        };
        format!("{} Finished at {}.", next, Local::now().format("%H:%M"))
    }
}

/// Where the cursor was before an action was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    index: usize,
    completed: bool,
    kind: Option<IntervalKind>,
}

impl Position {
    pub fn of(state: &TimerState) -> Self {
        Self {
            index: state.session.current_index,
            completed: state.session.completed,
            kind: state.current_interval().map(|interval| interval.kind),
        }
    }
}

/// Reports the interval that just ended, if `after` sits past a boundary
/// that `before` had not crossed yet.
pub fn detect_boundary(before: Position, after: &TimerState) -> Option<IntervalFinished> {
    let advanced = after.session.current_index != before.index;
    let completed_now = after.session.completed && !before.completed;
    if !advanced && !completed_now {
        return None;
    }
    Some(IntervalFinished {
        kind: before.kind?,
        index: before.index,
        session_complete: after.session.completed,
    })
}

pub struct App {
    pub mode: AppMode,
    pub setup: SetupForm,
    pub timer: Option<TimerState>,
    pub config: Config,
    pub effect_manager: EffectManager<u32>,
    pub should_quit: bool,
    pub last_finished: Option<IntervalFinished>,
    playback: Box<dyn Playback>,
    next_tick: Option<Instant>,
}

impl App {
    pub fn new(config: Config, initial: SessionConfig, playback: Box<dyn Playback>) -> Self {
        Self {
            mode: AppMode::Setup,
            setup: SetupForm::new(initial),
            timer: None,
            config,
            effect_manager: EffectManager::default(),
            should_quit: false,
            last_finished: None,
            playback,
            next_tick: None,
        }
    }

    /// Builds a fresh session from the setup form and shows the timer.
    pub fn begin_session(&mut self) {
        let config = self.setup.session_config();
        let session = create_session(config);
        info!(
            intervals = session.intervals.len(),
            focus = config.focus_duration,
            sessions = config.total_sessions,
            "Session created"
        );
        self.timer = Some(TimerState::new(session));
        self.next_tick = None;
        self.last_finished = None;
        self.mode = AppMode::Timer;
    }

    /// Drops the running session and goes back to the setup screen.
    pub fn leave_session(&mut self) {
        if self.timer.take().is_some() {
            debug!("Session discarded");
        }
        self.next_tick = None;
        self.mode = AppMode::Setup;
    }

    pub fn is_running(&self) -> bool {
        self.timer.as_ref().is_some_and(|state| state.is_running)
    }

    pub fn start(&mut self, now: Instant) {
        let Some(state) = self.timer.as_ref() else {
            return;
        };
        if state.session.completed {
            debug!("Session already complete, ignoring start");
            return;
        }
        if !state.is_running {
            self.next_tick = Some(now + TICK);
        }
        self.dispatch(Action::Start);
    }

    pub fn stop(&mut self) {
        self.dispatch(Action::Stop);
    }

    pub fn toggle(&mut self, now: Instant) {
        if self.is_running() {
            self.stop();
        } else {
            self.start(now);
        }
    }

    pub fn restart(&mut self) {
        debug!("Restart requested; it currently leaves the session as is");
        self.dispatch(Action::Restart);
    }

    /// Delivers every tick whose deadline has passed. Ticks stop as soon as
    /// the timer does, so a boundary always ends the batch.
    pub fn tick_due(&mut self, now: Instant) -> Vec<IntervalFinished> {
        let mut finished = Vec::new();
        while let Some(deadline) = self.next_tick {
            if now < deadline {
                break;
            }
            self.next_tick = Some(deadline + TICK);
            if let Some(event) = self.dispatch(Action::Tick) {
                finished.push(event);
            }
        }
        finished
    }

    fn dispatch(&mut self, action: Action) -> Option<IntervalFinished> {
        let state = self.timer.take()?;
        let before = Position::of(&state);
        let after = reduce(state, action);
        let finished = detect_boundary(before, &after);

        if !after.is_running {
            self.next_tick = None;
        }
        self.timer = Some(after);

        if let Some(event) = finished {
            self.on_interval_finished(event);
        }
        finished
    }

    fn on_interval_finished(&mut self, event: IntervalFinished) {
        info!(
            kind = ?event.kind,
            index = event.index,
            session_complete = event.session_complete,
            "Interval finished"
        );
        self.last_finished = Some(event);

        if self.config.alerts.bell {
            ring_bell();
        }
        if self.config.alerts.desktop {
            send_notification(event.title(), &event.body());
        }
        self.trigger_transition_effect();

        if event.kind == IntervalKind::Focus {
            self.playback.send(PlaybackCommand::Pause);
        }
    }

    fn trigger_transition_effect(&mut self) {
        let color = match self.timer.as_ref().and_then(TimerState::current_interval) {
            Some(interval) if interval.kind == IntervalKind::Focus => self.config.theme.focus,
            _ => self.config.theme.rest,
        };
        let timer = EffectTimer::from_ms(600, Interpolation::QuadOut);
        self.effect_manager.add_effect(fx::fade_from_fg(color, timer));
    }

    pub fn send_playback(&self, command: PlaybackCommand) {
        self.playback.send(command);
    }

    pub fn toggle_playback(&self) {
        let playing = self
            .playback
            .now_playing()
            .is_some_and(|now_playing| now_playing.is_playing());
        self.send_playback(if playing {
            PlaybackCommand::Pause
        } else {
            PlaybackCommand::Play
        });
    }

    pub fn now_playing(&self) -> Option<NowPlaying> {
        self.playback.now_playing()
    }

    pub fn spotify_connected(&self) -> bool {
        self.playback.is_connected()
    }
}

fn ring_bell() {
    let mut stdout = io::stdout();
    if let Err(e) = stdout.write_all(b"\x07").and_then(|()| stdout.flush()) {
        debug!("Failed to ring terminal bell: {}", e);
    }
}

fn send_notification(title: &str, body: &str) {
    if let Err(e) = notify_rust::Notification::new()
        .summary(title)
        .body(body)
        .appname("pomotune")
        .show()
    {
        warn!("Failed to send notification: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Alerts;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct RecordingPlayback {
        sent: Rc<RefCell<Vec<PlaybackCommand>>>,
    }

    impl Playback for RecordingPlayback {
        fn send(&self, command: PlaybackCommand) {
            self.sent.borrow_mut().push(command);
        }

        fn now_playing(&self) -> Option<NowPlaying> {
            None
        }

        fn is_connected(&self) -> bool {
            true
        }
    }

    fn quiet_config() -> Config {
        Config {
            alerts: Alerts {
                bell: false,
                desktop: false,
            },
            ..Config::default()
        }
    }

    fn app() -> (App, Rc<RefCell<Vec<PlaybackCommand>>>) {
        let playback = RecordingPlayback::default();
        let sent = playback.sent.clone();
        let session = SessionConfig {
            focus_duration: 1,
            short_break_duration: 1,
            long_break_duration: Some(5),
            break_interval: 2,
            total_sessions: 2,
        };
        let mut app = App::new(quiet_config(), session, Box::new(playback));
        app.begin_session();
        (app, sent)
    }

    fn time_left(app: &App) -> u64 {
        app.timer.as_ref().unwrap().time_left
    }

    fn set_time_left(app: &mut App, secs: u64) {
        app.timer.as_mut().unwrap().time_left = secs;
    }

    #[test]
    fn no_ticks_until_started() {
        let (mut app, _) = app();
        let t0 = Instant::now();
        assert!(app.tick_due(t0 + Duration::from_secs(5)).is_empty());
        assert_eq!(time_left(&app), 60);
    }

    #[test]
    fn one_tick_per_elapsed_second() {
        let (mut app, _) = app();
        let t0 = Instant::now();
        app.start(t0);

        app.tick_due(t0 + Duration::from_millis(999));
        assert_eq!(time_left(&app), 60);
        app.tick_due(t0 + Duration::from_secs(1));
        assert_eq!(time_left(&app), 59);
        app.tick_due(t0 + Duration::from_millis(3500));
        assert_eq!(time_left(&app), 57);
    }

    #[test]
    fn stop_halts_the_countdown() {
        let (mut app, _) = app();
        let t0 = Instant::now();
        app.start(t0);
        app.tick_due(t0 + TICK);
        app.stop();
        app.tick_due(t0 + Duration::from_secs(30));
        assert_eq!(time_left(&app), 59);
        assert!(!app.is_running());
    }

    #[test]
    fn focus_end_pauses_playback_once_and_waits_for_start() {
        let (mut app, sent) = app();
        let t0 = Instant::now();
        set_time_left(&mut app, 2);
        app.start(t0);

        let finished = app.tick_due(t0 + Duration::from_secs(10));
        assert_eq!(
            finished,
            vec![IntervalFinished {
                kind: IntervalKind::Focus,
                index: 0,
                session_complete: false,
            }]
        );
        assert_eq!(*sent.borrow(), vec![PlaybackCommand::Pause]);
        assert!(!app.is_running());
        assert_eq!(app.timer.as_ref().unwrap().session.current_index, 1);

        assert!(app.tick_due(t0 + Duration::from_secs(60)).is_empty());
        assert_eq!(sent.borrow().len(), 1);
    }

    #[test]
    fn break_end_leaves_playback_alone() {
        let (mut app, sent) = app();
        let t0 = Instant::now();
        set_time_left(&mut app, 1);
        app.start(t0);
        app.tick_due(t0 + TICK);
        sent.borrow_mut().clear();

        set_time_left(&mut app, 1);
        app.start(t0 + TICK);
        let finished = app.tick_due(t0 + TICK * 2);
        assert_eq!(finished[0].kind, IntervalKind::ShortBreak);
        assert!(sent.borrow().is_empty());
        assert_eq!(app.timer.as_ref().unwrap().session.session_count, 2);
    }

    #[test]
    fn final_focus_completes_the_session() {
        let (mut app, sent) = app();
        let mut now = Instant::now();
        for _ in 0..3 {
            set_time_left(&mut app, 1);
            app.start(now);
            now += TICK;
            app.tick_due(now);
        }

        let last = app.last_finished.unwrap();
        assert!(last.session_complete);
        assert_eq!(last.kind, IntervalKind::Focus);
        assert_eq!(last.title(), "Session complete");
        assert_eq!(
            *sent.borrow(),
            vec![PlaybackCommand::Pause, PlaybackCommand::Pause]
        );

        app.start(now);
        assert!(!app.is_running());
        assert!(app.tick_due(now + Duration::from_secs(5)).is_empty());
    }

    #[test]
    fn restart_changes_nothing() {
        let (mut app, _) = app();
        let t0 = Instant::now();
        app.start(t0);
        app.tick_due(t0 + TICK);
        let before = app.timer.clone();
        app.restart();
        assert_eq!(app.timer, before);
    }

    #[test]
    fn leaving_discards_the_session() {
        let (mut app, _) = app();
        app.start(Instant::now());
        app.leave_session();
        assert_eq!(app.mode, AppMode::Setup);
        assert!(app.timer.is_none());
        assert!(!app.is_running());
    }

    #[test]
    fn toggle_playback_plays_when_nothing_is_playing() {
        let (app, sent) = app();
        app.toggle_playback();
        assert_eq!(*sent.borrow(), vec![PlaybackCommand::Play]);
    }

    #[test]
    fn boundary_detection_ignores_plain_countdown() {
        let state = TimerState::new(create_session(SessionConfig {
            focus_duration: 1,
            short_break_duration: 1,
            long_break_duration: None,
            break_interval: 1,
            total_sessions: 1,
        }));
        let before = Position::of(&state);
        let ticked = reduce(state.clone(), Action::Tick);
        assert_eq!(detect_boundary(before, &ticked), None);

        let mut last_second = state;
        last_second.time_left = 1;
        let before = Position::of(&last_second);
        let done = reduce(last_second, Action::Tick);
        assert_eq!(
            detect_boundary(before, &done),
            Some(IntervalFinished {
                kind: IntervalKind::Focus,
                index: 0,
                session_complete: true,
            })
        );
    }
}
