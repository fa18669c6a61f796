#![allow(dead_code)]

use std::collections::VecDeque;

use live_beacon::{
    AnimationTimings, Config, Credentials, DebugConsole, Duration, HttpClient, Method,
    OutputDriver, OutputError, Request, Response, Rgb, StatusIndicator, TransportError,
};

pub const CLIENT_ID: &str = "client-id";
pub const CLIENT_SECRET: &str = "client-secret";
pub const CHANNEL: &str = "some_streamer";

/// Request as seen by the fake client
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// HTTP client answering from a script, failing with `Connection` once empty
#[derive(Debug, Default)]
pub struct ScriptedClient {
    replies: VecDeque<Result<Response, TransportError>>,
    pub requests: Vec<RecordedRequest>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, status: u16, body: &str) -> Self {
        self.replies.push_back(Ok(Response::new(status, body.as_bytes())));
        self
    }

    pub fn fail(mut self, err: TransportError) -> Self {
        self.replies.push_back(Err(err));
        self
    }

    pub fn token(self, access_token: &str, expires_in: u64) -> Self {
        let body = format!(
            r#"{{"access_token":"{access_token}","expires_in":{expires_in},"token_type":"bearer"}}"#
        );
        self.reply(200, &body)
    }

    pub fn live(self) -> Self {
        self.reply(
            200,
            r#"{"data":[{"id":"1","user_login":"some_streamer","type":"live"}],"pagination":{}}"#,
        )
    }

    pub fn offline(self) -> Self {
        self.reply(200, r#"{"data":[],"pagination":{}}"#)
    }

    pub fn remaining(&self) -> usize {
        self.replies.len()
    }
}

impl HttpClient for ScriptedClient {
    fn request(&mut self, request: &Request<'_>) -> Result<Response, TransportError> {
        self.requests.push(RecordedRequest {
            method: request.method,
            url: request.url.to_owned(),
            headers: request
                .headers
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
            body: String::from_utf8_lossy(request.body).into_owned(),
        });
        self.replies
            .pop_front()
            .unwrap_or(Err(TransportError::Connection))
    }
}

#[derive(Debug, Default)]
pub struct RecordingOutput {
    pub frames: Vec<Vec<Rgb>>,
    pub fail: bool,
}

impl OutputDriver for RecordingOutput {
    fn write(&mut self, colors: &[Rgb]) -> Result<(), OutputError> {
        if self.fail {
            return Err(OutputError::Bus);
        }
        self.frames.push(colors.to_vec());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingIndicator {
    pub colors: Vec<Rgb>,
    pub fail: bool,
}

impl StatusIndicator for RecordingIndicator {
    fn set_indicator(&mut self, color: Rgb) -> Result<(), OutputError> {
        if self.fail {
            return Err(OutputError::Bus);
        }
        self.colors.push(color);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingConsole {
    pub lines: Vec<String>,
}

impl DebugConsole for RecordingConsole {
    fn print_line(&mut self, line: &str) {
        self.lines.push(line.to_owned());
    }
}

pub fn credentials() -> Credentials {
    Credentials {
        client_id: CLIENT_ID.to_owned(),
        client_secret: CLIENT_SECRET.to_owned(),
    }
}

/// Short timings so scenarios run in a few hundred simulated milliseconds
pub fn fast_timings() -> AnimationTimings {
    AnimationTimings {
        ramp_up: Duration::from_millis(200),
        ramp_down: Duration::from_millis(100),
        pulse_period: Duration::from_millis(400),
        pulse_floor: 0.5,
    }
}

pub fn fast_config() -> Config {
    Config::new(CHANNEL, credentials())
        .with_poll_interval(Duration::from_millis(1_000))
        .with_frame_interval(Duration::from_millis(10))
        .with_reboot_interval(Duration::from_secs(60))
        .with_animation(fast_timings())
        .with_max_consecutive_failures(3)
}
