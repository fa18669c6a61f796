//! Twitch endpoints and payloads
//!
//! Tokens come from the client-credentials flow:
//! <https://dev.twitch.tv/docs/authentication/getting-tokens-oauth/#client-credentials-grant-flow>

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write as _;

use serde::Deserialize;
use serde::de::IgnoredAny;
use thiserror::Error;

use crate::config::Credentials;
use crate::status::ChannelStatus;

pub const TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";
pub const STREAMS_URL: &str = "https://api.twitch.tv/helix/streams?user_login=";

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Body of a successful token exchange
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    pub(crate) access_token: String,
    /// Lifetime in seconds
    pub(crate) expires_in: u64,
    #[serde(default)]
    pub(crate) refresh_token: Option<String>,
}

#[derive(Deserialize)]
struct StreamsResponse {
    data: Vec<IgnoredAny>,
}

/// Stream query could not be turned into a status
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StatusError {
    #[error("status endpoint answered {0}")]
    Http(u16),
    #[error("malformed stream payload")]
    Malformed,
}

/// Form body for the client-credentials grant
pub(crate) fn client_credentials_body(credentials: &Credentials) -> String {
    let mut body = String::new();
    push_field(&mut body, "client_id", &credentials.client_id);
    push_field(&mut body, "client_secret", &credentials.client_secret);
    push_field(&mut body, "grant_type", "client_credentials");
    body
}

/// Form body for the refresh-token grant
pub(crate) fn refresh_body(credentials: &Credentials, refresh_token: &str) -> String {
    let mut body = String::new();
    push_field(&mut body, "client_id", &credentials.client_id);
    push_field(&mut body, "client_secret", &credentials.client_secret);
    push_field(&mut body, "grant_type", "refresh_token");
    push_field(&mut body, "refresh_token", refresh_token);
    body
}

/// Stream lookup URL for a channel login
pub fn streams_url(channel: &str) -> String {
    let mut url = String::from(STREAMS_URL);
    percent_encode(&mut url, channel);
    url
}

pub(crate) fn parse_token(body: &[u8]) -> Result<TokenResponse, serde_json::Error> {
    serde_json::from_slice(body)
}

/// Parse a Helix `streams` payload
///
/// The channel is live when `data` holds at least one stream.
pub fn parse_stream_status(body: &[u8]) -> Result<ChannelStatus, StatusError> {
    let response: StreamsResponse =
        serde_json::from_slice(body).map_err(|_| StatusError::Malformed)?;
    if response.data.is_empty() {
        Ok(ChannelStatus::Offline)
    } else {
        Ok(ChannelStatus::Live)
    }
}

fn push_field(body: &mut String, key: &str, value: &str) {
    if !body.is_empty() {
        body.push('&');
    }
    percent_encode(body, key);
    body.push('=');
    percent_encode(body, value);
}

fn percent_encode(out: &mut String, value: &str) {
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(char::from(byte));
            }
            _ => {
                let _ = write!(out, "%{byte:02X}");
            }
        }
    }
}
