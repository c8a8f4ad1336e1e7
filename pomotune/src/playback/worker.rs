use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::{NowPlaying, Playback, PlaybackCommand, SpotifyClient};

type Snapshot = Arc<Mutex<Option<NowPlaying>>>;

/// UI-side end of the playback worker. Dropping it stops the worker.
pub struct PlaybackHandle {
    commands: mpsc::UnboundedSender<PlaybackCommand>,
    snapshot: Snapshot,
}

impl Playback for PlaybackHandle {
    fn send(&self, command: PlaybackCommand) {
        if self.commands.send(command).is_err() {
            warn!(?command, "Playback worker has stopped");
        }
    }

    fn now_playing(&self) -> Option<NowPlaying> {
        self.snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn is_connected(&self) -> bool {
        !self.commands.is_closed()
    }
}

/// Starts polling the player every `poll_every` on `runtime`.
pub fn spawn(runtime: &Handle, client: SpotifyClient, poll_every: Duration) -> PlaybackHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let snapshot: Snapshot = Arc::new(Mutex::new(None));

    runtime.spawn(run(client, rx, snapshot.clone(), poll_every));
    info!(?poll_every, "Spotify playback worker started");

    PlaybackHandle {
        commands: tx,
        snapshot,
    }
}

async fn run(
    client: SpotifyClient,
    mut commands: mpsc::UnboundedReceiver<PlaybackCommand>,
    snapshot: Snapshot,
    poll_every: Duration,
) {
    let mut poll = tokio::time::interval(poll_every);
    poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = poll.tick() => refresh(&client, &snapshot).await,
            command = commands.recv() => {
                let Some(command) = command else {
                    debug!("Playback handle dropped, stopping worker");
                    break;
                };
                match client.control(command).await {
                    Ok(()) => refresh(&client, &snapshot).await,
                    Err(e) => warn!(?command, "Error controlling playback: {}", e),
                }
            }
        }
    }
}

async fn refresh(client: &SpotifyClient, snapshot: &Snapshot) {
    let next = match client.player_state().await {
        Ok(state) => state.map(|state| NowPlaying::new(state, Instant::now())),
        Err(e) => {
            warn!("Error checking Spotify playback state: {}", e);
            None
        }
    };
    *snapshot.lock().unwrap_or_else(PoisonError::into_inner) = next;
}
