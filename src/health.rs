//! Network health summary for the status pixel

use heapless::Deque;

use crate::color::{BLUE, GREEN, RED, Rgb, YELLOW};

/// Number of poll outcomes kept by default
pub const DEFAULT_WINDOW: usize = 8;

/// Health derived from the recent poll outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    /// Nothing recorded yet
    Connecting,
    /// Every recent poll succeeded
    Healthy,
    /// Some recent polls failed
    Degraded,
    /// Every recent poll failed
    Failing,
}

impl Health {
    pub const fn color(self) -> Rgb {
        match self {
            Self::Connecting => BLUE,
            Self::Healthy => GREEN,
            Self::Degraded => YELLOW,
            Self::Failing => RED,
        }
    }
}

/// Ring of the last `K` poll outcomes
#[derive(Debug, Clone, Default)]
pub struct HealthIndicator<const K: usize = DEFAULT_WINDOW> {
    outcomes: Deque<bool, K>,
}

impl<const K: usize> HealthIndicator<K> {
    pub const fn new() -> Self {
        Self {
            outcomes: Deque::new(),
        }
    }

    /// Push an outcome, evicting the oldest one when full
    pub fn record(&mut self, success: bool) {
        if self.outcomes.is_full() {
            self.outcomes.pop_front();
        }
        let _ = self.outcomes.push_back(success);
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn health(&self) -> Health {
        if self.outcomes.is_empty() {
            return Health::Connecting;
        }
        let successes = self.outcomes.iter().filter(|success| **success).count();
        if successes == self.outcomes.len() {
            Health::Healthy
        } else if successes == 0 {
            Health::Failing
        } else {
            Health::Degraded
        }
    }

    pub fn current_color(&self) -> Rgb {
        self.health().color()
    }
}
