//! Spotify playback, kept at arm's length from the timer.
//!
//! The UI loop only ever talks to a [`Playback`]: it fires commands and reads
//! the latest snapshot. Network calls happen on the tokio runtime in
//! [`worker`], so a slow API never stalls the countdown.

mod spotify;
mod worker;

pub use spotify::SpotifyClient;
pub use worker::spawn;

use serde::Deserialize;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackCommand {
    Play,
    Pause,
    Next,
    Previous,
}

impl PlaybackCommand {
    /// Path under `/me/player/`.
    pub fn endpoint(self) -> &'static str {
        match self {
            PlaybackCommand::Play => "play",
            PlaybackCommand::Pause => "pause",
            PlaybackCommand::Next => "next",
            PlaybackCommand::Previous => "previous",
        }
    }

    pub fn method(self) -> reqwest::Method {
        match self {
            PlaybackCommand::Play | PlaybackCommand::Pause => reqwest::Method::PUT,
            PlaybackCommand::Next | PlaybackCommand::Previous => reqwest::Method::POST,
        }
    }
}

pub trait Playback {
    fn send(&self, command: PlaybackCommand);
    fn now_playing(&self) -> Option<NowPlaying>;
    fn is_connected(&self) -> bool;
}

/// Used when no access token is configured.
pub struct Disconnected;

impl Playback for Disconnected {
    fn send(&self, command: PlaybackCommand) {
        tracing::debug!(?command, "Spotify not connected, dropping command");
    }

    fn now_playing(&self) -> Option<NowPlaying> {
        None
    }

    fn is_connected(&self) -> bool {
        false
    }
}

/// Body of `GET /me/player`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlayerState {
    pub device: Option<Device>,
    pub item: Option<Track>,
    #[serde(default)]
    pub is_playing: bool,
    #[serde(default)]
    pub progress_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Device {
    #[serde(default)]
    pub name: String,
    pub volume_percent: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Track {
    pub name: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
    pub album: Option<Album>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Artist {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Album {
    pub name: String,
}

impl Track {
    pub fn first_artist(&self) -> Option<&str> {
        self.artists.first().map(|artist| artist.name.as_str())
    }
}

/// A player state plus the moment it was fetched, so progress can keep
/// moving between polls.
#[derive(Debug, Clone)]
pub struct NowPlaying {
    pub state: PlayerState,
    pub fetched_at: Instant,
}

impl NowPlaying {
    pub fn new(state: PlayerState, fetched_at: Instant) -> Self {
        Self { state, fetched_at }
    }

    pub fn track(&self) -> Option<&Track> {
        self.state.item.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    /// Reported progress advanced by the time since the fetch, capped at the
    /// track length. Paused playback does not advance.
    pub fn progress_ms_at(&self, now: Instant) -> u64 {
        let reported = self.state.progress_ms.unwrap_or(0);
        let Some(track) = self.track() else {
            return reported;
        };
        let advanced = if self.state.is_playing {
            let since = now.saturating_duration_since(self.fetched_at);
            reported.saturating_add(duration_ms(since))
        } else {
            reported
        };
        advanced.min(track.duration_ms)
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
