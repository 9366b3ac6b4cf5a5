use std::{
    io,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;

use crate::{
    error::LoggerError,
    events::EventBus,
    log_writer::{LogFile, LogWriter},
    tail::spawn_tail_thread,
};

/// Token substituted with the opening date in file path templates.
pub const DATE_TOKEN: &str = "%DATE%";

/// Expands `%DATE%` in `template` to `date` formatted as `YYYY-MM-DD`.
pub fn file_name_for(template: &str, date: NaiveDate) -> PathBuf {
    PathBuf::from(template.replace(DATE_TOKEN, &date.format("%Y-%m-%d").to_string()))
}

/// Configuration for daily log file rotation.
#[derive(Debug, Clone)]
pub struct DailyRotationConfig {
    /// Path template containing [`DATE_TOKEN`].
    pub template: String,
    /// Attach a tail reader to every opened file.
    pub tail: bool,
}

/// A log file that is replaced by a freshly named one whenever the calendar
/// date changes.
pub struct LogFileDailyRotation {
    template: String,
    tail: bool,
    bus: EventBus,
    current_date: NaiveDate,
    current_file: LogFile,
}

impl LogFileDailyRotation {
    pub fn new(
        config: DailyRotationConfig,
        today: NaiveDate,
        bus: EventBus,
    ) -> Result<Self, LoggerError> {
        if config.template.is_empty() {
            return Err(LoggerError::MissingFilePath);
        }
        let current_file = open_daily_file(&config.template, today, config.tail, &bus)?;
        Ok(Self {
            template: config.template,
            tail: config.tail,
            bus,
            current_date: today,
            current_file,
        })
    }

    pub fn current_date(&self) -> NaiveDate {
        self.current_date
    }

    pub fn current_path(&self) -> &Path {
        self.current_file.path()
    }

    pub fn should_rotate(&self, today: NaiveDate) -> bool {
        self.current_date != today
    }

    /// Opens the file for `today` and returns the one it replaces. On failure
    /// the current file stays in place.
    pub fn rotate(&mut self, today: NaiveDate) -> Result<LogFile, LoggerError> {
        let new_file = open_daily_file(&self.template, today, self.tail, &self.bus)?;
        self.current_date = today;
        Ok(std::mem::replace(&mut self.current_file, new_file))
    }
}

impl LogWriter for LogFileDailyRotation {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.current_file.write_line(line)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.current_file.flush()
    }
}

fn open_daily_file(
    template: &str,
    date: NaiveDate,
    tail: bool,
    bus: &EventBus,
) -> Result<LogFile, LoggerError> {
    let path = file_name_for(template, date);
    let opened = if tail {
        LogFile::readable(&path)
    } else {
        LogFile::new(&path)
    };
    let mut file = opened.map_err(|source| LoggerError::Open { path, source })?;
    if file.is_readable() {
        file.attach_tail(spawn_tail_thread(bus.clone()).map_err(LoggerError::SpawnTail)?);
    }
    Ok(file)
}
