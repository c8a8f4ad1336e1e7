use reqwest::{header, StatusCode};
use thiserror::Error;
use tracing::debug;

use super::{PlaybackCommand, PlayerState};

#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Spotify returned {status} for {endpoint}")]
    Status { status: StatusCode, endpoint: String },

    #[error("Failed to decode player state: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Thin client over the Spotify Web API player endpoints.
#[derive(Clone)]
pub struct SpotifyClient {
    http: reqwest::Client,
    api_base: String,
    access_token: String,
}

impl SpotifyClient {
    pub fn new(api_base: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/me/player{}", self.api_base, path)
    }

    /// `Ok(None)` when there is no active device.
    pub async fn player_state(&self) -> Result<Option<PlayerState>, PlaybackError> {
        let url = self.url("");
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(PlaybackError::Status {
                status,
                endpoint: url,
            });
        }

        let body = response.bytes().await?;
        Ok(Some(serde_json::from_slice(&body)?))
    }

    /// Sends `command` after confirming the player endpoint answers. A
    /// failed check skips the command.
    pub async fn control(&self, command: PlaybackCommand) -> Result<(), PlaybackError> {
        let active = self.player_state().await?;
        if active.is_none() {
            debug!(?command, "No active Spotify device, sending anyway");
        }

        let url = self.url(&format!("/{}", command.endpoint()));
        let response = self
            .http
            .request(command.method(), &url)
            .bearer_auth(&self.access_token)
            .header(header::CONTENT_LENGTH, 0)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlaybackError::Status {
                status,
                endpoint: url,
            });
        }
        debug!(?command, %status, "Playback command accepted");
        Ok(())
    }
}
