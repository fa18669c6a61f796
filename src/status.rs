use core::fmt;

/// Live state of the monitored channel, as seen by one poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelStatus {
    /// Poll failed or nothing observed yet
    #[default]
    Unknown,
    Offline,
    Live,
}

impl ChannelStatus {
    /// `Live` and `Offline` are confirmed readings, `Unknown` is not
    pub const fn is_confirmed(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Offline => "offline",
            Self::Live => "live",
        }
    }
}

impl fmt::Display for ChannelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
