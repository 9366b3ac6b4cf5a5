use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while configuring or installing a logger.
///
/// Emitting a message never fails: sink errors after construction are dropped.
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("unknown severity `{0}`")]
    UnknownSeverity(String),

    #[error("file logging requested without a file path")]
    MissingFilePath,

    #[error("unable to open log file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to spawn the tail thread: {0}")]
    SpawnTail(#[source] std::io::Error),

    #[error("unable to install the global logger: {0}")]
    SetLogger(#[from] log::SetLoggerError),

    #[error("invalid environment configuration: {0}")]
    Config(String),
}
