use std::sync::LazyLock;

use derive_from_env::FromEnv;

use crate::{error::LoggerError, severity::Threshold};

/// Process-wide defaults read from `SEVLOG_*` environment variables.
#[derive(Debug, Clone, FromEnv)]
#[from_env(prefix = "SEVLOG")]
#[allow(non_snake_case)]
pub struct SevlogConfig {
    /// Threshold used when a builder is not given one.
    #[from_env(default = "DEBUG")]
    pub LEVEL: String,
    /// Enables ANSI colors on the standard console.
    #[from_env(default = "true")]
    pub COLOR: bool,
}

impl SevlogConfig {
    /// Reads the environment now, ignoring the cached [`SEVLOG_CONFIG`].
    pub fn load() -> Result<Self, LoggerError> {
        Self::from_env().map_err(|err| LoggerError::Config(err.to_string()))
    }

    /// The configuration read on first access. A variable that failed to
    /// parse is reported on every call.
    pub fn global() -> Result<&'static Self, LoggerError> {
        SEVLOG_CONFIG
            .as_ref()
            .map_err(|err| LoggerError::Config(err.clone()))
    }

    /// Rank named by `LEVEL`.
    pub fn threshold(&self) -> Result<u8, LoggerError> {
        Threshold::from(self.LEVEL.as_str()).resolve()
    }
}

impl Default for SevlogConfig {
    fn default() -> Self {
        Self {
            LEVEL: "DEBUG".into(),
            COLOR: true,
        }
    }
}

/// Environment configuration, read once. Holds the parse error message on failure.
pub static SEVLOG_CONFIG: LazyLock<Result<SevlogConfig, String>> =
    LazyLock::new(|| SevlogConfig::from_env().map_err(|err| err.to_string()));
