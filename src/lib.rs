#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod animation;
pub mod color;
pub mod config;
pub mod console;
pub mod frame_scheduler;
pub mod health;
pub mod http;
pub mod poller;
pub mod session;
pub mod status;
pub mod supervisor;
pub mod twitch;

use thiserror::Error;

pub use animation::{AnimationEngine, AnimationPhase, AnimationTimings, PhaseEntry};
pub use config::{Config, ConfigError, Credentials};
pub use console::{Console, DebugConsole, NoConsole, ScrollBuffer};
pub use frame_scheduler::FrameClock;
pub use health::{Health, HealthIndicator};
pub use http::{HttpClient, Method, Request, Response, TransportError};
pub use poller::{PollError, StatusPoller};
pub use session::{AuthError, AuthSession, SessionManager};
pub use status::ChannelStatus;
pub use supervisor::{Platform, RebootReason, Supervisor};

pub use color::Rgb;
pub use embassy_time::{Duration, Instant};

/// Hardware failure while driving an output
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum OutputError {
    #[error("bus error")]
    Bus,
    #[error("output timed out")]
    Timeout,
}

/// Abstract LED strand driver
///
/// Implement this trait to support different hardware platforms. One
/// entry per strand or pixel, in wiring order.
pub trait OutputDriver {
    /// Write colors to the strands
    fn write(&mut self, colors: &[Rgb]) -> Result<(), OutputError>;
}

/// Single status pixel showing network health
pub trait StatusIndicator {
    fn set_indicator(&mut self, color: Rgb) -> Result<(), OutputError>;
}
