//! Reads back what a [`LogFile`](crate::LogFile) writes and turns each line into
//! a [`TailEvent`].

use std::{
    sync::LazyLock,
    thread::{self, JoinHandle},
};

use chrono::NaiveDateTime;
use crossbeam_channel::{Sender, unbounded};
use regex::Regex;

use crate::{
    events::{EventBus, TailEvent},
    severity::{LABEL_WIDTH, Severity},
    utils::TIMESTAMP_FORMAT,
};

static LINE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[([^\]]+)\] (\w+) (.*)$").expect("valid line pattern"));

/// A log line parsed back into its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub date: NaiveDateTime,
    /// `None` when the level token is not a known severity.
    pub level: Option<Severity>,
    pub level_string: String,
    pub msg: String,
}

/// Parses a single line (without its line terminator). Returns `None` when the
/// line does not follow the `[timestamp] LEVEL message` layout.
pub fn parse_line(line: &str) -> Option<ParsedLine> {
    let captures = LINE_PATTERN.captures(line)?;
    let date = NaiveDateTime::parse_from_str(&captures[1], TIMESTAMP_FORMAT).ok()?;
    let level_string = captures[2].to_string();
    let rest = &captures[3];
    // short labels are padded with spaces up to the label width
    let padding = LABEL_WIDTH.saturating_sub(level_string.chars().count());
    let msg = match rest.get(..padding) {
        Some(prefix) if prefix.bytes().all(|b| b == b' ') => &rest[padding..],
        _ => rest,
    };
    Some(ParsedLine {
        date,
        level: Severity::from_name(&level_string),
        level_string,
        msg: msg.to_string(),
    })
}

/// Accumulates chunks until they end on a line boundary.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: String,
}

impl LineBuffer {
    /// Appends `chunk` and, once the buffer ends with a newline, returns every
    /// parsable line it holds. Unparsable lines are dropped.
    pub fn push(&mut self, chunk: &str) -> Vec<ParsedLine> {
        self.buf.push_str(chunk);
        if !self.buf.ends_with('\n') {
            return Vec::new();
        }
        let lines = self
            .buf
            .split('\n')
            .filter(|segment| !segment.is_empty())
            .filter_map(|segment| parse_line(segment.strip_suffix('\r').unwrap_or(segment)))
            .collect();
        self.buf.clear();
        lines
    }

    pub fn pending(&self) -> &str {
        &self.buf
    }
}

/// Writing side of a tail reader. Dropping it closes the reader, which then
/// publishes [`TailEvent::End`]; the drop waits for that to happen.
pub struct TailSender {
    sender: Option<Sender<String>>,
    handle: Option<JoinHandle<()>>,
}

impl TailSender {
    pub fn forward(&self, chunk: &str) {
        if let Some(sender) = &self.sender {
            sender.send(chunk.to_string()).ok();
        }
    }
}

impl Drop for TailSender {
    fn drop(&mut self) {
        drop(self.sender.take());
        if let Some(handle) = self.handle.take()
            && handle.thread().id() != thread::current().id()
        {
            handle.join().ok();
        }
    }
}

/// Spawns the thread turning forwarded chunks into events on `bus`.
pub fn spawn_tail_thread(bus: EventBus) -> Result<TailSender, std::io::Error> {
    let (sender, receiver) = unbounded::<String>();
    let handle = thread::Builder::new()
        .name("sevlog-tail".into())
        .spawn(move || {
            let mut buffer = LineBuffer::default();
            while let Ok(chunk) = receiver.recv() {
                for line in buffer.push(&chunk) {
                    bus.publish(&TailEvent::Line(line));
                }
            }
            bus.publish(&TailEvent::End);
        })?;
    Ok(TailSender {
        sender: Some(sender),
        handle: Some(handle),
    })
}
