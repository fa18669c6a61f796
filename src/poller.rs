//! Channel status polling
//!
//! The poller is an on-demand query: it has no timer of its own, the
//! supervisor decides when to call [`StatusPoller::poll`]. Every failure is
//! folded into [`ChannelStatus::Unknown`]; fatal authentication failures are
//! additionally kept aside for the supervisor to pick up.

use alloc::format;
use alloc::string::String;

use embassy_time::Instant;
use thiserror::Error;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::config::Config;
use crate::http::{HttpClient, Request, TransportError};
use crate::session::{AuthError, SessionManager};
use crate::status::ChannelStatus;
use crate::twitch::{self, StatusError};

const UNAUTHORIZED: u16 = 401;

/// Why a poll produced `Unknown`
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PollError {
    #[error("auth: {0}")]
    Auth(#[from] AuthError),
    #[error("transport: {0}")]
    Transport(#[from] TransportError),
    #[error("status: {0}")]
    Status(#[from] StatusError),
}

/// Queries the live state of one channel
pub struct StatusPoller<C: HttpClient> {
    sessions: SessionManager<C>,
    channel: String,
    url: String,
    consecutive_failures: u32,
    last_error: Option<PollError>,
    fatal: Option<AuthError>,
}

impl<C: HttpClient> StatusPoller<C> {
    pub fn new(sessions: SessionManager<C>, channel: &str) -> Self {
        Self {
            sessions,
            channel: String::from(channel),
            url: twitch::streams_url(channel),
            consecutive_failures: 0,
            last_error: None,
            fatal: None,
        }
    }

    /// Build the poller and its session manager from the configuration
    pub fn from_config(client: C, config: &Config) -> Self {
        let sessions =
            SessionManager::new(client, config.credentials.clone(), config.session_margin);
        Self::new(sessions, &config.channel)
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub const fn sessions(&self) -> &SessionManager<C> {
        &self.sessions
    }

    /// Failed polls since the last successful one
    pub const fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Error behind the most recent `Unknown`, cleared by a success
    pub const fn last_error(&self) -> Option<PollError> {
        self.last_error
    }

    /// Take the pending fatal authentication error, if any
    pub fn take_fatal(&mut self) -> Option<AuthError> {
        self.fatal.take()
    }

    /// Run one status query
    ///
    /// Never fails: any error yields `Unknown` and counts as a failed poll.
    pub fn poll(&mut self, now: Instant) -> ChannelStatus {
        match self.query(now) {
            Ok(status) => {
                self.consecutive_failures = 0;
                self.last_error = None;
                status
            }
            Err(err) => {
                #[cfg(feature = "esp32-log")]
                println!("[StatusPoller.poll] {} ({})", err, self.channel);
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                self.last_error = Some(err);
                if let PollError::Auth(auth) = err {
                    if auth.is_fatal() {
                        self.fatal = Some(auth);
                    }
                }
                ChannelStatus::Unknown
            }
        }
    }

    fn query(&mut self, now: Instant) -> Result<ChannelStatus, PollError> {
        let session = self.sessions.ensure_valid_session(now)?;
        let bearer = format!("Bearer {}", session.access_token);
        let client_id = self.sessions.credentials().client_id.clone();
        let headers = [
            ("Client-ID", client_id.as_str()),
            ("Authorization", bearer.as_str()),
        ];
        let request = Request::get(&self.url, &headers);
        let response = self.sessions.client_mut().request(&request)?;

        if response.status == UNAUTHORIZED {
            // Token revoked or expired early, start over on the next poll
            self.sessions.invalidate();
        }
        if !response.is_success() {
            return Err(StatusError::Http(response.status).into());
        }
        Ok(twitch::parse_stream_status(&response.body)?)
    }
}
