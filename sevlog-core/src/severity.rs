use std::{fmt, str::FromStr};

use log::Level;

use crate::error::LoggerError;

/// Width of the longest severity name (`EMERGENCY`). Labels are padded to it.
pub const LABEL_WIDTH: usize = 9;

/// Syslog style severities. Lower rank means more urgent.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// System is unusable.
    Emergency = 0,
    /// Action must be taken immediately.
    Alert = 1,
    /// Critical condition.
    Critical = 2,
    /// Error condition.
    Error = 3,
    /// Warning condition.
    Warning = 4,
    /// Normal but significant condition.
    Notice = 5,
    /// Purely informational message.
    Info = 6,
    /// Application debug message.
    Debug = 7,
}

impl Severity {
    /// Every severity, ordered by rank.
    pub const ALL: [Severity; 8] = [
        Severity::Emergency,
        Severity::Alert,
        Severity::Critical,
        Severity::Error,
        Severity::Warning,
        Severity::Notice,
        Severity::Info,
        Severity::Debug,
    ];

    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Severity::Emergency => "EMERGENCY",
            Severity::Alert => "ALERT",
            Severity::Critical => "CRITICAL",
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Notice => "NOTICE",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
        }
    }

    /// Case-insensitive lookup of a severity name. Unknown names give `None`,
    /// which never passes a threshold.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|severity| severity.name().eq_ignore_ascii_case(name))
    }

    pub fn from_rank(rank: u8) -> Option<Self> {
        Self::ALL.get(rank as usize).copied()
    }

    /// Whether a message of this severity is admitted by `threshold`.
    pub fn passes(self, threshold: u8) -> bool {
        self.rank() <= threshold
    }

    /// Severity name right-padded to [`LABEL_WIDTH`].
    pub fn label(self) -> String {
        format!("{:<LABEL_WIDTH$}", self.name())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Severity {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| LoggerError::UnknownSeverity(s.to_string()))
    }
}

impl From<Level> for Severity {
    fn from(level: Level) -> Self {
        match level {
            Level::Error => Severity::Error,
            Level::Warn => Severity::Warning,
            Level::Info => Severity::Info,
            Level::Debug | Level::Trace => Severity::Debug,
        }
    }
}

impl From<Severity> for Level {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Emergency | Severity::Alert | Severity::Critical | Severity::Error => {
                Level::Error
            }
            Severity::Warning => Level::Warn,
            Severity::Notice | Severity::Info => Level::Info,
            Severity::Debug => Level::Debug,
        }
    }
}

/// Minimum severity admitted by a logger, given either by name or by raw rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Threshold {
    Name(String),
    Rank(u8),
}

impl Threshold {
    /// Resolves the threshold to a raw rank. Raw ranks are used as given.
    pub fn resolve(&self) -> Result<u8, LoggerError> {
        match self {
            Threshold::Name(name) => Ok(name.parse::<Severity>()?.rank()),
            Threshold::Rank(rank) => Ok(*rank),
        }
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Threshold::Rank(Severity::Debug.rank())
    }
}

impl From<Severity> for Threshold {
    fn from(severity: Severity) -> Self {
        Threshold::Rank(severity.rank())
    }
}

impl From<u8> for Threshold {
    fn from(rank: u8) -> Self {
        Threshold::Rank(rank)
    }
}

impl From<&str> for Threshold {
    fn from(name: &str) -> Self {
        Threshold::Name(name.to_string())
    }
}

impl From<String> for Threshold {
    fn from(name: String) -> Self {
        Threshold::Name(name)
    }
}
