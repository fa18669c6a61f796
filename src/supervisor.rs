//! Supervisor loop
//!
//! One cooperative loop drives everything: polls are gated by the poll
//! interval, frames by the [`FrameClock`]. Within one pass a poll result is
//! committed to the animation before the frame is rendered. The blocking
//! status request does not count as animation time. Between passes the loop
//! sleeps, never past the earliest of the next frame, the next poll and the
//! reboot deadline. Anything that
//! is not a tolerated poll failure ends the loop with a [`RebootReason`];
//! recovery is a clean restart, all state is rebuilt from [`Config`].

use alloc::format;
use alloc::string::String;
use core::cmp::min;

use embassy_time::{Duration, Instant};
use thiserror::Error;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::animation::{AnimationEngine, AnimationPhase};
use crate::color::{RED, Rgb};
use crate::config::Config;
use crate::console::DebugConsole;
use crate::frame_scheduler::FrameClock;
use crate::health::HealthIndicator;
use crate::http::HttpClient;
use crate::poller::StatusPoller;
use crate::session::AuthError;
use crate::status::ChannelStatus;
use crate::{OutputDriver, OutputError, StatusIndicator};

/// Why the supervisor gave up
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RebootReason {
    #[error("scheduled reboot")]
    Scheduled,
    #[error("authentication failed: {0}")]
    Auth(AuthError),
    #[error("{0} failed polls in a row")]
    PersistentFailure(u32),
    #[error("output failed: {0}")]
    Output(#[from] OutputError),
}

/// Board services needed to run the loop
pub trait Platform {
    /// Monotonic time since boot
    fn now(&self) -> Instant;

    fn sleep(&mut self, duration: Duration);

    /// Reset the device
    fn reset(&mut self) -> !;
}

/// Drives the poller, the animation and the outputs
pub struct Supervisor<C, O, I, D, const LEDS: usize>
where
    C: HttpClient,
    O: OutputDriver,
    I: StatusIndicator,
    D: DebugConsole,
{
    // External dependencies
    poller: StatusPoller<C>,
    output: O,
    indicator: I,
    console: D,

    // Configuration
    poll_interval: Duration,
    max_consecutive_failures: u32,
    scheduled_reboot_delay: Duration,
    error_reboot_delay: Duration,
    reboot_deadline: Instant,

    // Internal state
    engine: AnimationEngine,
    health: HealthIndicator,
    frames: FrameClock,
    next_poll: Instant,
    frame: [Rgb; LEDS],
}

impl<C, O, I, D, const LEDS: usize> Supervisor<C, O, I, D, LEDS>
where
    C: HttpClient,
    O: OutputDriver,
    I: StatusIndicator,
    D: DebugConsole,
{
    /// Create a supervisor that boots at `boot`
    ///
    /// The first poll and the first frame are due immediately; the reboot
    /// deadline is fixed here and never moves.
    pub fn new(
        config: &Config,
        client: C,
        output: O,
        indicator: I,
        console: D,
        boot: Instant,
    ) -> Self {
        Self {
            poller: StatusPoller::from_config(client, config),
            output,
            indicator,
            console,
            poll_interval: config.poll_interval,
            max_consecutive_failures: config.max_consecutive_failures,
            scheduled_reboot_delay: config.scheduled_reboot_delay,
            error_reboot_delay: config.error_reboot_delay,
            reboot_deadline: boot
                .checked_add(config.reboot_interval)
                .unwrap_or(Instant::MAX),
            engine: AnimationEngine::new(config.animation, config.color),
            health: HealthIndicator::new(),
            frames: FrameClock::new(config.frame_interval, boot),
            next_poll: boot,
            frame: [Rgb::default(); LEDS],
        }
    }

    pub const fn engine(&self) -> &AnimationEngine {
        &self.engine
    }

    pub const fn health(&self) -> &HealthIndicator {
        &self.health
    }

    pub const fn poller(&self) -> &StatusPoller<C> {
        &self.poller
    }

    pub const fn reboot_deadline(&self) -> Instant {
        self.reboot_deadline
    }

    pub const fn next_poll(&self) -> Instant {
        self.next_poll
    }

    /// Last rendered frame
    pub const fn frame(&self) -> &[Rgb; LEDS] {
        &self.frame
    }

    pub const fn output(&self) -> &O {
        &self.output
    }

    pub const fn indicator(&self) -> &I {
        &self.indicator
    }

    pub const fn console(&self) -> &D {
        &self.console
    }

    /// Show the initial network status before the first poll
    pub fn start(&mut self) -> Result<(), RebootReason> {
        self.console
            .print_line(&format!("Monitoring {}", self.poller.channel()));
        self.indicator.set_indicator(self.health.current_color())?;
        Ok(())
    }

    /// Run one pass of the loop
    ///
    /// Returns how long the caller may sleep before the next pass.
    pub fn tick(&mut self, now: Instant) -> Result<Duration, RebootReason> {
        if now >= self.reboot_deadline {
            return Err(RebootReason::Scheduled);
        }

        let polled = now >= self.next_poll;
        if polled {
            self.next_poll = now.checked_add(self.poll_interval).unwrap_or(Instant::MAX);
            self.poll_once(now)?;
        }

        if let Some(elapsed) = self.frames.poll(now) {
            self.render_frame(elapsed)?;
        }
        if polled {
            // `now` predates the request
            self.frames.stall();
        }

        let wake = min(
            min(self.frames.next_deadline(), self.next_poll),
            self.reboot_deadline,
        );
        Ok(wake.saturating_duration_since(now))
    }

    /// Announce the reboot on the status pixel and console
    ///
    /// Returns the pause to observe before resetting. Output errors are
    /// ignored at this point.
    pub fn prepare_reboot(&mut self, reason: &RebootReason) -> Duration {
        let delay = match reason {
            RebootReason::Scheduled => self.scheduled_reboot_delay,
            _ => self.error_reboot_delay,
        };
        #[cfg(feature = "esp32-log")]
        println!("[Supervisor.prepare_reboot] {}, reboot in {}s", reason, delay.as_secs());

        let _ = self.indicator.set_indicator(RED);
        let message: String = match reason {
            RebootReason::Scheduled => String::from("Programmed Reboot"),
            other => format!("Error: {}", other),
        };
        self.console.print_line(&message);
        self.console
            .print_line(&format!("Reboot in {} seconds", delay.as_secs()));
        delay
    }

    /// Run until a reboot is required, then reset the board
    pub fn run<P: Platform>(mut self, platform: &mut P) -> ! {
        let mut outcome = self.start();
        loop {
            if let Err(reason) = outcome {
                let delay = self.prepare_reboot(&reason);
                platform.sleep(delay);
                platform.reset();
            }
            outcome = self.tick(platform.now()).map(|sleep| platform.sleep(sleep));
        }
    }

    fn poll_once(&mut self, now: Instant) -> Result<(), RebootReason> {
        let status = self.poller.poll(now);
        if let Some(err) = self.poller.take_fatal() {
            return Err(RebootReason::Auth(err));
        }

        self.health.record(status.is_confirmed());
        self.indicator.set_indicator(self.health.current_color())?;

        let line = match status {
            ChannelStatus::Live => format!("Live: {}", self.poller.channel()),
            ChannelStatus::Offline => format!("offline: {}", self.poller.channel()),
            ChannelStatus::Unknown => match self.poller.last_error() {
                Some(err) => format!("Status error: {}", err),
                None => String::from("Status error"),
            },
        };
        self.console.print_line(&line);

        let failures = self.poller.consecutive_failures();
        if failures >= self.max_consecutive_failures {
            return Err(RebootReason::PersistentFailure(failures));
        }

        if let Some(phase) = self.engine.observe(status) {
            self.announce(phase);
        }
        Ok(())
    }

    fn render_frame(&mut self, elapsed: Duration) -> Result<(), RebootReason> {
        if let Some(phase) = self.engine.advance(elapsed) {
            self.announce(phase);
        }
        self.engine.render(&mut self.frame);
        self.output.write(&self.frame)?;
        Ok(())
    }

    fn announce(&mut self, phase: AnimationPhase) {
        self.console.print_line(&format!("Change to {}", phase));
    }
}
