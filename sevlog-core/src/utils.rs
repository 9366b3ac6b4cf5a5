use chrono::NaiveDateTime;
use colored::{ColoredString, Colorize};

use crate::{log_writer::ConsoleStream, severity::Severity};

/// Timestamp layout shared by the writer and the tail parser.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_timestamp(now: &NaiveDateTime) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}

/// Plain line as persisted to log files, CRLF terminated.
pub fn format_file_line(timestamp: &str, severity: Severity, message: &str) -> String {
    format!("[{timestamp}] {} {message}\r\n", severity.label())
}

/// Console rendering: the padded label is colored by severity.
pub fn format_console_line(
    timestamp: &str,
    severity: Severity,
    message: &str,
    color: bool,
) -> String {
    let label = severity.label();
    if color {
        format!("[{timestamp}] {} {message}", colorize(label, severity))
    } else {
        format!("[{timestamp}] {label} {message}")
    }
}

fn colorize(label: String, severity: Severity) -> ColoredString {
    match severity {
        Severity::Error => label.red(),
        Severity::Warning => label.yellow(),
        Severity::Info => label.cyan(),
        Severity::Debug => label.normal(),
        Severity::Emergency | Severity::Alert | Severity::Critical | Severity::Notice => {
            label.green()
        }
    }
}

/// Console stream a severity is routed to. Only `ERROR` reaches the error stream.
pub fn console_stream(severity: Severity) -> ConsoleStream {
    match severity {
        Severity::Error => ConsoleStream::Error,
        Severity::Warning => ConsoleStream::Warn,
        Severity::Info => ConsoleStream::Info,
        Severity::Emergency
        | Severity::Alert
        | Severity::Critical
        | Severity::Notice
        | Severity::Debug => ConsoleStream::Log,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_timestamp_is_zero_padded() {
        assert_eq!(format_timestamp(&at(2024, 1, 5, 3, 4, 9)), "2024-01-05 03:04:09");
        assert_eq!(format_timestamp(&at(987, 12, 31, 23, 59, 59)), "0987-12-31 23:59:59");
    }

    #[test]
    fn test_file_line_layout() {
        let line = format_file_line("2024-01-05 03:04:09", Severity::Error, "disk full");
        assert_eq!(line, "[2024-01-05 03:04:09] ERROR     disk full\r\n");
        let line = format_file_line("2024-01-05 03:04:09", Severity::Emergency, "down");
        assert_eq!(line, "[2024-01-05 03:04:09] EMERGENCY down\r\n");
    }

    #[test]
    fn test_console_line_without_color() {
        let line = format_console_line("2024-01-05 03:04:09", Severity::Info, "ready", false);
        assert_eq!(line, "[2024-01-05 03:04:09] INFO      ready");
    }

    #[test]
    fn test_console_line_with_color() {
        colored::control::set_override(true);
        let error = format_console_line("2024-01-05 03:04:09", Severity::Error, "boom", true);
        let debug = format_console_line("2024-01-05 03:04:09", Severity::Debug, "trace", true);
        let critical = format_console_line("2024-01-05 03:04:09", Severity::Critical, "hot", true);
        colored::control::unset_override();
        assert!(error.contains("\x1b[31mERROR    \x1b[0m"));
        assert!(error.ends_with(" boom"));
        assert!(critical.starts_with("[2024-01-05 03:04:09] \x1b[32mCRITICAL "));
        assert!(critical.ends_with("\x1b[0m hot"));
        assert_eq!(debug, "[2024-01-05 03:04:09] DEBUG     trace");
    }

    #[test]
    fn test_console_routing() {
        assert_eq!(console_stream(Severity::Emergency), ConsoleStream::Log);
        assert_eq!(console_stream(Severity::Alert), ConsoleStream::Log);
        assert_eq!(console_stream(Severity::Critical), ConsoleStream::Log);
        assert_eq!(console_stream(Severity::Error), ConsoleStream::Error);
        assert_eq!(console_stream(Severity::Warning), ConsoleStream::Warn);
        assert_eq!(console_stream(Severity::Info), ConsoleStream::Info);
        assert_eq!(console_stream(Severity::Notice), ConsoleStream::Log);
        assert_eq!(console_stream(Severity::Debug), ConsoleStream::Log);
    }
}
