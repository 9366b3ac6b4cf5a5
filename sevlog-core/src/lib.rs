//! # sevlog-core
//! Core utilities for sevlog - severities, sinks, daily rotation and log tailing.

mod clock;
mod config;
mod error;
mod events;
mod log_rotation;
mod log_writer;
mod severity;
mod tail;
mod utils;

pub use clock::{Clock, LocalClock, ManualClock};
pub use config::{SEVLOG_CONFIG, SevlogConfig};
pub use error::LoggerError;
pub use events::{EventBus, SubscriptionId, TailEvent};
pub use log_rotation::{DATE_TOKEN, DailyRotationConfig, LogFileDailyRotation, file_name_for};
pub use log_writer::{ConsoleSink, ConsoleStream, LogFile, LogWriter, MemoryConsole, StdConsole};
pub use severity::{LABEL_WIDTH, Severity, Threshold};
pub use tail::{LineBuffer, ParsedLine, TailSender, parse_line, spawn_tail_thread};
pub use utils::{
    TIMESTAMP_FORMAT, console_stream, format_console_line, format_file_line, format_timestamp,
};
