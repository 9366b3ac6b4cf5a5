//! # sevlog
//! Leveled logger with console output, daily log files and log tailing.
//!
//! ## Usage
//! ```toml
//! // Cargo.toml
//! ...
//! [dependencies]
//! sevlog = "0.1.0"
//! ```
//!
//! ```rust
//! use sevlog::logger_config;
//!
//! let logger = logger_config()
//!     .with_level("WARNING")
//!     .with_console(true)
//!     .build()
//!     .expect("Unable to create logger");
//! logger.error("disk full"); // printed
//! logger.debug("ignored"); // below the threshold
//! ```
//!
//! ## Logging to daily files
//! `%DATE%` in the file path is replaced with the current date. The first
//! message logged on a later day opens a new file.
//!
//! ```rust
//! use sevlog::logger_config;
//!
//! let logger = logger_config()
//!     .with_file("/tmp/sevlog_doc/app-%DATE%.log")
//!     .build()
//!     .expect("Unable to create log file");
//! logger.info("Hello, world!");
//! let path = logger.current_file().unwrap();
//! assert!(std::fs::read_to_string(path).unwrap().ends_with("Hello, world!\r\n"));
//! ```
//!
//! ## Tailing
//! Lines written to the log file are parsed back and published as events.
//!
//! ```rust
//! use sevlog::{Severity, TailEvent, logger_config};
//!
//! let logger = logger_config()
//!     .with_file("/tmp/sevlog_doc/tail-%DATE%.log")
//!     .build()
//!     .unwrap();
//! let (_, events) = logger.subscribe();
//! logger.notice("deploy started");
//! drop(logger); // closing the file ends the tail reader
//!
//! let events: Vec<TailEvent> = events.try_iter().collect();
//! match &events[0] {
//!     TailEvent::Line(line) => {
//!         assert_eq!(line.level, Some(Severity::Notice));
//!         assert_eq!(line.msg, "deploy started");
//!     }
//!     TailEvent::End => unreachable!(),
//! }
//! assert_eq!(events.last(), Some(&TailEvent::End));
//! ```

use std::{
    backtrace::Backtrace,
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
};

use chrono::{NaiveDate, NaiveDateTime};
use crossbeam_channel::Receiver;
use log::{Level, LevelFilter, Log};
use sevlog_core::{
    DailyRotationConfig, LogFileDailyRotation, LogWriter, console_stream,
    format_console_line, format_file_line, format_timestamp,
};

pub use sevlog_core::{
    Clock, ConsoleSink, ConsoleStream, EventBus, LocalClock, LoggerError, ManualClock,
    MemoryConsole, ParsedLine, Severity, SevlogConfig, StdConsole, SubscriptionId, TailEvent,
    Threshold,
};

/// Options recognised when constructing a [`Logger`].
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Least urgent severity admitted. Defaults to `SEVLOG_LEVEL`, itself `DEBUG` by default.
    pub level: Option<Threshold>,
    pub use_console: bool,
    pub use_file: bool,
    /// File path template, `%DATE%` is replaced with `YYYY-MM-DD`.
    pub file_path: Option<String>,
    /// Tail opened log files and publish their lines as events.
    pub tail: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: None,
            use_console: false,
            use_file: false,
            file_path: None,
            tail: true,
        }
    }
}

/// A leveled logger writing to the console and/or a daily log file.
pub struct Logger {
    threshold: u8,
    use_console: bool,
    color: bool,
    console: Arc<dyn ConsoleSink>,
    clock: Arc<dyn Clock>,
    file: Mutex<Option<LogFileDailyRotation>>,
    events: EventBus,
}

macro_rules! severity_methods {
    ($($name:ident, $traced:ident => $severity:ident;)*) => {
        $(
            #[doc = concat!("Logs `message` as `", stringify!($severity), "`.")]
            pub fn $name(&self, message: &str) {
                self.log_at(Severity::$severity, message, false)
            }

            #[doc = concat!("Logs `message` as `", stringify!($severity), "` followed by a stack trace.")]
            pub fn $traced(&self, message: &str) {
                self.log_at(Severity::$severity, message, true)
            }
        )*
    };
}

impl Logger {
    /// Builds a logger from `config` with the local clock and the standard console.
    pub fn new(config: LoggerConfig) -> Result<Self, LoggerError> {
        ConfigBuilder::from(config).build()
    }

    severity_methods! {
        emergency, emergency_trace => Emergency;
        alert, alert_trace => Alert;
        critical, critical_trace => Critical;
        error, error_trace => Error;
        warning, warning_trace => Warning;
        notice, notice_trace => Notice;
        info, info_trace => Info;
        debug, debug_trace => Debug;
    }

    /// Logs `message` under the severity called `severity` (case-insensitive).
    /// Unknown severities are never written.
    pub fn log(&self, severity: &str, message: &str, trace: bool) {
        let now = self.clock.now();
        self.rotate_if_needed(now.date());
        if let Some(severity) = Severity::from_name(severity) {
            self.emit(severity, message, trace, &now);
        }
    }

    pub fn log_at(&self, severity: Severity, message: &str, trace: bool) {
        let now = self.clock.now();
        self.rotate_if_needed(now.date());
        self.emit(severity, message, trace, &now);
    }

    /// Raw rank of the least urgent severity admitted.
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn enabled(&self, severity: Severity) -> bool {
        severity.passes(self.threshold)
    }

    /// Path of the log file currently written to.
    pub fn current_file(&self) -> Option<PathBuf> {
        self.file
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|file| file.current_path().to_path_buf())
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn on_line<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&ParsedLine) + Send + Sync + 'static,
    {
        self.events.on_line(listener)
    }

    pub fn on_end<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.events.on_end(listener)
    }

    pub fn subscribe(&self) -> (SubscriptionId, Receiver<TailEvent>) {
        self.events.subscribe()
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    pub fn flush(&self) {
        if let Some(file) = self
            .file
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_mut()
        {
            file.flush().ok();
        }
    }

    fn rotate_if_needed(&self, today: NaiveDate) {
        let superseded = {
            let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
            match file.as_mut() {
                Some(file) if file.should_rotate(today) => file.rotate(today).ok(),
                _ => None,
            }
        };
        // closing the old file ends its tail reader, which may call back into listeners
        drop(superseded);
    }

    fn emit(&self, severity: Severity, message: &str, trace: bool, now: &NaiveDateTime) {
        if !severity.passes(self.threshold) {
            return;
        }
        let timestamp = format_timestamp(now);
        if self.use_console {
            let line = format_console_line(&timestamp, severity, message, self.color);
            self.console.write(console_stream(severity), &line);
        }
        if let Some(file) = self
            .file
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_mut()
        {
            file.write_line(&format_file_line(&timestamp, severity, message))
                .ok();
        }
        if trace {
            let backtrace = Backtrace::force_capture();
            self.console.trace(&format!("Trace follows\n{backtrace}"));
        }
    }
}

/// `log` facade backend forwarding records to a shared [`Logger`].
struct SevLogger(Arc<Logger>);

impl Log for SevLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.0.enabled(Severity::from(metadata.level()))
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.0
            .log_at(Severity::from(record.level()), &record.args().to_string(), false);
    }

    fn flush(&self) {
        self.0.flush();
    }
}

/// Most verbose `log` level a threshold lets through.
fn max_level_for(threshold: u8) -> LevelFilter {
    [Level::Trace, Level::Debug, Level::Info, Level::Warn, Level::Error]
        .into_iter()
        .find(|level| Severity::from(*level).passes(threshold))
        .map_or(LevelFilter::Off, |level| level.to_level_filter())
}

/// Builder for configuring and initializing a [`Logger`].
pub struct ConfigBuilder {
    config: LoggerConfig,
    /// Overrides `SEVLOG_COLOR` when set.
    color: Option<bool>,
    clock: Arc<dyn Clock>,
    console: Arc<dyn ConsoleSink>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::from(LoggerConfig::default())
    }
}

impl From<LoggerConfig> for ConfigBuilder {
    fn from(config: LoggerConfig) -> Self {
        Self {
            config,
            color: None,
            clock: Arc::new(LocalClock),
            console: Arc::new(StdConsole),
        }
    }
}

impl ConfigBuilder {
    /// Builds the logger, opening today's log file when file logging is on.
    ///
    /// Settings left unset fall back to the `SEVLOG_*` environment; an
    /// unparsable variable then fails with [`LoggerError::Config`].
    pub fn build(self) -> Result<Logger, LoggerError> {
        let Self {
            config,
            color,
            clock,
            console,
        } = self;
        let threshold = match config.level {
            Some(level) => level.resolve()?,
            None => SevlogConfig::global()?.threshold()?,
        };
        let color = match color {
            Some(color) => color,
            None => SevlogConfig::global()?.COLOR,
        };
        let events = EventBus::new();
        let file = if config.use_file {
            let template = config
                .file_path
                .filter(|path| !path.is_empty())
                .ok_or(LoggerError::MissingFilePath)?;
            Some(LogFileDailyRotation::new(
                DailyRotationConfig {
                    template,
                    tail: config.tail,
                },
                clock.now().date(),
                events.clone(),
            )?)
        } else {
            None
        };
        Ok(Logger {
            threshold,
            use_console: config.use_console,
            color,
            console,
            clock,
            file: Mutex::new(file),
            events,
        })
    }

    /// Sets the threshold, by name (`"warning"`), rank (`4u8`) or [`Severity`].
    pub fn with_level(self, level: impl Into<Threshold>) -> Self {
        Self {
            config: LoggerConfig {
                level: Some(level.into()),
                ..self.config
            },
            ..self
        }
    }
    /// Dynamically set the console flag.
    pub fn with_console(self, yes: bool) -> Self {
        Self {
            config: LoggerConfig {
                use_console: yes,
                ..self.config
            },
            ..self
        }
    }
    /// Ignore console logging
    pub fn no_console(self) -> Self {
        self.with_console(false)
    }
    /// Log to daily files named after `template`.
    pub fn with_file(self, template: &str) -> Self {
        Self {
            config: LoggerConfig {
                use_file: true,
                file_path: Some(template.into()),
                ..self.config
            },
            ..self
        }
    }
    /// Maybe log to daily files.
    pub fn maybe_with_file(self, template: Option<&str>) -> Self {
        match template {
            Some(template) => self.with_file(template),
            None => self.no_file(),
        }
    }
    /// Ignore file logging
    pub fn no_file(self) -> Self {
        Self {
            config: LoggerConfig {
                use_file: false,
                ..self.config
            },
            ..self
        }
    }
    /// Do not tail log files.
    pub fn no_tail(self) -> Self {
        Self {
            config: LoggerConfig {
                tail: false,
                ..self.config
            },
            ..self
        }
    }
    /// Disable ANSI colors on the console.
    pub fn no_color(self) -> Self {
        Self {
            color: Some(false),
            ..self
        }
    }
    /// Use another time source, e.g. a [`ManualClock`].
    pub fn with_clock(self, clock: impl Clock + 'static) -> Self {
        Self {
            clock: Arc::new(clock),
            ..self
        }
    }
    /// Use another console, e.g. a [`MemoryConsole`].
    pub fn with_console_sink(self, console: impl ConsoleSink + 'static) -> Self {
        Self {
            console: Arc::new(console),
            ..self
        }
    }
    /// Builds the logger and installs it as the `log` crate backend.
    /// The returned handle gives access to the logger and its events.
    pub fn init_global(self) -> Result<Arc<Logger>, LoggerError> {
        let logger = Arc::new(self.build()?);
        log::set_boxed_logger(Box::new(SevLogger(Arc::clone(&logger))))?;
        log::set_max_level(max_level_for(logger.threshold()));
        Ok(logger)
    }
}

/// Returns a default ConfigBuilder for configuring the logger.
pub fn logger_config() -> ConfigBuilder {
    ConfigBuilder::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn clock() -> ManualClock {
        ManualClock::new(
            NaiveDate::from_ymd_opt(2024, 6, 30)
                .unwrap()
                .and_hms_opt(23, 59, 58)
                .unwrap(),
        )
    }

    #[test]
    fn test_max_level_for() {
        assert_eq!(max_level_for(7), LevelFilter::Trace);
        assert_eq!(max_level_for(6), LevelFilter::Info);
        assert_eq!(max_level_for(5), LevelFilter::Warn);
        assert_eq!(max_level_for(3), LevelFilter::Error);
        assert_eq!(max_level_for(1), LevelFilter::Off);
    }

    #[test]
    fn test_unknown_level_name_fails() {
        let result = logger_config().with_level("LOUD").build();
        assert!(matches!(result, Err(LoggerError::UnknownSeverity(name)) if name == "LOUD"));
    }

    #[test]
    fn test_file_without_path_fails() {
        let result = Logger::new(LoggerConfig {
            use_file: true,
            ..Default::default()
        });
        assert!(matches!(result, Err(LoggerError::MissingFilePath)));
        let result = logger_config().with_file("").build();
        assert!(matches!(result, Err(LoggerError::MissingFilePath)));
    }

    #[test]
    fn test_maybe_with_file() {
        let dir = PathBuf::from("/tmp/sevlog_test_maybe_with_file");
        let _ = std::fs::remove_dir_all(&dir);
        let template = dir.join("app-%DATE%.log").to_string_lossy().to_string();
        let logger = logger_config()
            .with_clock(clock())
            .maybe_with_file(Some(&template))
            .no_tail()
            .build()
            .unwrap();
        assert_eq!(logger.current_file(), Some(dir.join("app-2024-06-30.log")));
        assert!(dir.join("app-2024-06-30.log").exists());

        let logger = logger_config()
            .with_file(&template)
            .maybe_with_file(None)
            .build()
            .unwrap();
        assert!(logger.current_file().is_none());
    }

    #[test]
    fn test_path_without_file_flag_is_ignored() {
        let logger = Logger::new(LoggerConfig {
            file_path: Some("/tmp/sevlog_test_unused/%DATE%.log".into()),
            ..Default::default()
        })
        .unwrap();
        assert!(logger.current_file().is_none());
    }

    #[test]
    fn test_trace_is_independent_of_console() {
        let console = Arc::new(MemoryConsole::default());
        let logger = logger_config()
            .with_level(Severity::Error)
            .with_console_sink(Arc::clone(&console))
            .build()
            .unwrap();
        logger.critical_trace("corrupted index");
        logger.warning_trace("filtered, no trace");
        assert!(console.lines().is_empty());
        let traces = console.traces();
        assert_eq!(traces.len(), 1);
        assert!(traces[0].starts_with("Trace follows"));
    }

    #[test]
    fn test_unknown_severity_is_filtered() {
        let console = Arc::new(MemoryConsole::default());
        let logger = logger_config()
            .with_level(200u8)
            .with_console(true)
            .with_console_sink(Arc::clone(&console))
            .build()
            .unwrap();
        logger.log("verbose", "never shown", true);
        logger.log("notice", "shown", false);
        let lines = console.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].1.ends_with("shown"));
        assert!(console.traces().is_empty());
    }

    #[test]
    fn test_clock_drives_timestamps() {
        let console = Arc::new(MemoryConsole::default());
        let clock = clock();
        let logger = logger_config()
            .with_console(true)
            .no_color()
            .with_clock(clock.clone())
            .with_console_sink(Arc::clone(&console))
            .build()
            .unwrap();
        logger.info("before midnight");
        clock.advance(TimeDelta::seconds(3));
        logger.info("after midnight");
        let lines: Vec<String> = console.lines().into_iter().map(|(_, l)| l).collect();
        assert_eq!(
            lines,
            vec![
                "[2024-06-30 23:59:58] INFO      before midnight",
                "[2024-07-01 00:00:01] INFO      after midnight",
            ]
        );
    }
}
