//! Configuration loaded by the board before the core starts
//!
//! A [`Config`] is built either in code via [`Config::new`] and the `with_*`
//! methods, or from a JSON document (for example a `settings.json` stored
//! next to the firmware) via [`Config::from_json`]. Durations in the JSON
//! document are given in milliseconds.

use alloc::string::String;

use embassy_time::Duration;
use serde::Deserialize;
use thiserror::Error;

use crate::animation::AnimationTimings;
use crate::color::{Rgb, WARM_WHITE};

const DEFAULT_POLL_INTERVAL_MS: u64 = 63_000;
/// 90 FPS
const DEFAULT_FRAME_INTERVAL_MS: u64 = 1000 / 90;
/// Arbitrary 22h restart period
const DEFAULT_REBOOT_INTERVAL_MS: u64 = 22 * 60 * 60 * 1000;
const DEFAULT_SESSION_MARGIN_MS: u64 = 60_000;
const DEFAULT_MAX_CONSECUTIVE_FAILURES: u32 = 10;
const DEFAULT_SCHEDULED_REBOOT_DELAY_MS: u64 = 5_000;
const DEFAULT_ERROR_REBOOT_DELAY_MS: u64 = 30_000;
/// Longest accepted duration, one year
const MAX_DURATION_MS: u64 = 365 * 24 * 60 * 60 * 1000;

/// OAuth application credentials
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Core configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Login of the monitored channel
    pub channel: String,
    pub credentials: Credentials,
    /// Time between two status polls
    pub poll_interval: Duration,
    /// Time between two rendered frames
    pub frame_interval: Duration,
    /// Uptime after which the device reboots unconditionally
    pub reboot_interval: Duration,
    /// Renew the session when it expires within this margin
    pub session_margin: Duration,
    pub animation: AnimationTimings,
    /// Strand color at full intensity
    pub color: Rgb,
    /// Failed polls in a row that escalate to a reboot
    pub max_consecutive_failures: u32,
    /// Pause before a scheduled reboot
    pub scheduled_reboot_delay: Duration,
    /// Pause before a reboot caused by an error
    pub error_reboot_delay: Duration,
}

/// Invalid configuration
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("malformed config at line {line}, column {column}")]
    Parse { line: usize, column: usize },
    #[error("channel name is empty")]
    EmptyChannel,
    #[error("client id or secret is empty")]
    MissingCredentials,
    #[error("{0} must not be zero")]
    Zero(&'static str),
    #[error("{0} must not exceed one year")]
    TooLong(&'static str),
    #[error("pulse floor must be between 0 and 1")]
    PulseFloor,
    #[error("frame interval must be shorter than poll interval")]
    FrameInterval,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    channel: String,
    client_id: String,
    client_secret: String,
    poll_interval_ms: Option<u64>,
    frame_interval_ms: Option<u64>,
    reboot_interval_ms: Option<u64>,
    session_margin_ms: Option<u64>,
    ramp_up_ms: Option<u64>,
    ramp_down_ms: Option<u64>,
    pulse_period_ms: Option<u64>,
    pulse_floor: Option<f32>,
    color: Option<[u8; 3]>,
    max_consecutive_failures: Option<u32>,
}

impl Config {
    /// Create a configuration with default timings
    pub fn new(channel: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            channel: channel.into(),
            credentials,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            frame_interval: Duration::from_millis(DEFAULT_FRAME_INTERVAL_MS),
            reboot_interval: Duration::from_millis(DEFAULT_REBOOT_INTERVAL_MS),
            session_margin: Duration::from_millis(DEFAULT_SESSION_MARGIN_MS),
            animation: AnimationTimings::default(),
            color: WARM_WHITE,
            max_consecutive_failures: DEFAULT_MAX_CONSECUTIVE_FAILURES,
            scheduled_reboot_delay: Duration::from_millis(DEFAULT_SCHEDULED_REBOOT_DELAY_MS),
            error_reboot_delay: Duration::from_millis(DEFAULT_ERROR_REBOOT_DELAY_MS),
        }
    }

    /// Parse and validate a JSON configuration document
    ///
    /// Only `channel`, `client_id` and `client_secret` are required.
    pub fn from_json(document: &[u8]) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            serde_json::from_slice(document).map_err(|err| ConfigError::Parse {
                line: err.line(),
                column: err.column(),
            })?;

        let mut config = Self::new(
            file.channel,
            Credentials {
                client_id: file.client_id,
                client_secret: file.client_secret,
            },
        );
        let fields = [
            (file.poll_interval_ms, &mut config.poll_interval, "poll interval"),
            (file.frame_interval_ms, &mut config.frame_interval, "frame interval"),
            (file.reboot_interval_ms, &mut config.reboot_interval, "reboot interval"),
            (file.session_margin_ms, &mut config.session_margin, "session margin"),
            (file.ramp_up_ms, &mut config.animation.ramp_up, "ramp-up duration"),
            (file.ramp_down_ms, &mut config.animation.ramp_down, "ramp-down duration"),
            (file.pulse_period_ms, &mut config.animation.pulse_period, "pulse period"),
        ];
        for (ms, field, name) in fields {
            if let Some(ms) = ms {
                // Converting first would overflow the tick count
                if ms > MAX_DURATION_MS {
                    return Err(ConfigError::TooLong(name));
                }
                *field = Duration::from_millis(ms);
            }
        }
        if let Some(floor) = file.pulse_floor {
            config.animation.pulse_floor = floor;
        }
        if let Some([r, g, b]) = file.color {
            config.color = Rgb { r, g, b };
        }
        if let Some(limit) = file.max_consecutive_failures {
            config.max_consecutive_failures = limit;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values the core cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel.trim().is_empty() {
            return Err(ConfigError::EmptyChannel);
        }
        if self.credentials.client_id.is_empty() || self.credentials.client_secret.is_empty() {
            return Err(ConfigError::MissingCredentials);
        }

        let durations = [
            ("poll interval", self.poll_interval),
            ("frame interval", self.frame_interval),
            ("reboot interval", self.reboot_interval),
            ("ramp-up duration", self.animation.ramp_up),
            ("ramp-down duration", self.animation.ramp_down),
            ("pulse period", self.animation.pulse_period),
        ];
        if let Some((name, _)) = durations.iter().find(|(_, d)| d.as_ticks() == 0) {
            return Err(ConfigError::Zero(*name));
        }
        let max = Duration::from_millis(MAX_DURATION_MS);
        let bounded = [("session margin", self.session_margin)];
        if let Some((name, _)) = durations.iter().chain(bounded.iter()).find(|(_, d)| *d > max) {
            return Err(ConfigError::TooLong(*name));
        }
        if self.max_consecutive_failures == 0 {
            return Err(ConfigError::Zero("failure limit"));
        }

        let floor = self.animation.pulse_floor;
        if !(floor > 0.0 && floor < 1.0) {
            return Err(ConfigError::PulseFloor);
        }
        if self.frame_interval >= self.poll_interval {
            return Err(ConfigError::FrameInterval);
        }
        Ok(())
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    #[must_use]
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    #[must_use]
    pub fn with_reboot_interval(mut self, interval: Duration) -> Self {
        self.reboot_interval = interval;
        self
    }

    #[must_use]
    pub fn with_session_margin(mut self, margin: Duration) -> Self {
        self.session_margin = margin;
        self
    }

    #[must_use]
    pub fn with_animation(mut self, animation: AnimationTimings) -> Self {
        self.animation = animation;
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub fn with_max_consecutive_failures(mut self, limit: u32) -> Self {
        self.max_consecutive_failures = limit;
        self
    }

    #[must_use]
    pub fn with_reboot_delays(mut self, scheduled: Duration, error: Duration) -> Self {
        self.scheduled_reboot_delay = scheduled;
        self.error_reboot_delay = error;
        self
    }
}
