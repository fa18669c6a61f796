//! OAuth session lifecycle
//!
//! The session lives in memory only. It is acquired lazily on the first
//! request, renewed when it gets close to expiry and dropped on any
//! non-transient failure. Nothing is persisted: a reboot always starts
//! from a fresh client-credentials exchange.

use alloc::string::String;

use embassy_time::{Duration, Instant, TICK_HZ};
use thiserror::Error;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::config::Credentials;
use crate::http::{HttpClient, Request, Response, TransportError};
use crate::twitch::{self, FORM_CONTENT_TYPE, TOKEN_URL, TokenResponse};

/// Default renewal margin before expiry
pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::from_secs(60);

/// An access token and its expiry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub access_token: String,
    pub expires_at: Instant,
    pub refresh_token: Option<String>,
}

impl AuthSession {
    /// Expired tokens must not be sent
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    /// True when the token expires within `margin` of `now`
    pub fn needs_renewal(&self, now: Instant, margin: Duration) -> bool {
        now.checked_add(margin).is_none_or(|deadline| deadline >= self.expires_at)
    }
}

/// Token acquisition or refresh failed
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("token request failed: {0}")]
    Network(#[from] TransportError),
    #[error("malformed token response")]
    InvalidResponse,
    #[error("token request denied with status {0}")]
    Denied(u16),
}

impl AuthError {
    /// Errors that retrying in-process will not fix
    pub const fn is_fatal(self) -> bool {
        matches!(self, Self::InvalidResponse | Self::Denied(_))
    }
}

/// Owns the OAuth session and the HTTP client used to obtain it
pub struct SessionManager<C: HttpClient> {
    client: C,
    credentials: Credentials,
    margin: Duration,
    session: Option<AuthSession>,
}

impl<C: HttpClient> SessionManager<C> {
    pub const fn new(client: C, credentials: Credentials, margin: Duration) -> Self {
        Self {
            client,
            credentials,
            margin,
            session: None,
        }
    }

    /// Currently held session, if any
    pub const fn session(&self) -> Option<&AuthSession> {
        self.session.as_ref()
    }

    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Drop the held session so the next call acquires a new one
    pub fn invalidate(&mut self) {
        self.session = None;
    }

    /// Access to the shared HTTP client for authenticated requests
    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    /// Return a session that is not expired at `now`
    ///
    /// Acquires or refreshes when there is no session or the held one
    /// expires within the safety margin. A network failure during renewal
    /// keeps the old token while it is still valid; fatal failures drop it
    /// and are returned to the caller without retrying.
    pub fn ensure_valid_session(&mut self, now: Instant) -> Result<AuthSession, AuthError> {
        if let Some(session) = &self.session {
            if !session.needs_renewal(now, self.margin) {
                return Ok(session.clone());
            }
        }

        let refresh_token = self
            .session
            .as_ref()
            .and_then(|session| session.refresh_token.clone());
        let renewed = match refresh_token {
            Some(token) => self.refresh(&token, now),
            None => self.acquire(now),
        };

        match renewed {
            Ok(session) => {
                self.session = Some(session.clone());
                Ok(session)
            }
            Err(AuthError::Network(err)) => {
                let still_valid = self
                    .session
                    .as_ref()
                    .filter(|session| !session.is_expired(now));
                if let Some(session) = still_valid {
                    #[cfg(feature = "esp32-log")]
                    println!(
                        "[SessionManager.ensure_valid_session] renewal failed ({}), keeping token",
                        err
                    );
                    return Ok(session.clone());
                }
                self.session = None;
                Err(AuthError::Network(err))
            }
            Err(err) => {
                #[cfg(feature = "esp32-log")]
                println!("[SessionManager.ensure_valid_session] {}", err);
                self.session = None;
                Err(err)
            }
        }
    }

    fn acquire(&mut self, now: Instant) -> Result<AuthSession, AuthError> {
        #[cfg(feature = "esp32-log")]
        println!("[SessionManager.acquire] requesting client credentials token");
        let body = twitch::client_credentials_body(&self.credentials);
        let response = self.post_token(&body)?;
        Self::parse_session(&response, None, now)
    }

    fn refresh(&mut self, refresh_token: &str, now: Instant) -> Result<AuthSession, AuthError> {
        #[cfg(feature = "esp32-log")]
        println!("[SessionManager.refresh] refreshing token");
        let body = twitch::refresh_body(&self.credentials, refresh_token);
        let response = self.post_token(&body)?;
        Self::parse_session(&response, Some(refresh_token), now)
    }

    fn post_token(&mut self, body: &str) -> Result<Response, AuthError> {
        let headers = [("Content-Type", FORM_CONTENT_TYPE)];
        let request = Request::post(TOKEN_URL, &headers, body.as_bytes());
        let response = self.client.request(&request)?;
        match response.status {
            200..=299 => Ok(response),
            400..=403 => Err(AuthError::Denied(response.status)),
            _ => Err(AuthError::InvalidResponse),
        }
    }

    /// Build a session from a token response
    ///
    /// A refresh response without a new refresh token keeps the previous one.
    fn parse_session(
        response: &Response,
        previous_refresh: Option<&str>,
        now: Instant,
    ) -> Result<AuthSession, AuthError> {
        let token: TokenResponse =
            twitch::parse_token(&response.body).map_err(|_| AuthError::InvalidResponse)?;
        if token.access_token.is_empty() || token.expires_in == 0 {
            return Err(AuthError::InvalidResponse);
        }
        let expires_at = token
            .expires_in
            .checked_mul(TICK_HZ)
            .and_then(|ticks| now.checked_add(Duration::from_ticks(ticks)))
            .ok_or(AuthError::InvalidResponse)?;
        #[cfg(feature = "esp32-log")]
        println!("[SessionManager.parse_session] token valid for {}s", token.expires_in);

        Ok(AuthSession {
            access_token: token.access_token,
            expires_at,
            refresh_token: token
                .refresh_token
                .or_else(|| previous_refresh.map(String::from)),
        })
    }
}
