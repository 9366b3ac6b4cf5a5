//! # sevlog-tokio
//! Async access to sevlog tail events for tokio runtimes.
//!
//! ## Usage
//! ```toml
//! // Cargo.toml
//! ...
//! [dependencies]
//! sevlog = "0.1.0"
//! sevlog-tokio = "0.1.0"
//! tokio = {version = "1.40.0", features = ["full"]}
//! ```
//!
//! ```rust
//! use sevlog::logger_config;
//! use sevlog_tokio::tail_events;
//!
//! #[tokio::main]
//! async fn main() {
//!     let logger = logger_config()
//!         .with_file("/tmp/sevlog_doc/async-%DATE%.log")
//!         .build()
//!         .unwrap();
//!     let mut events = tail_events(&logger);
//!     logger.warning("low disk space");
//!     let line = events.next_line().await.unwrap();
//!     assert_eq!(line.msg, "low disk space");
//! }
//! ```

use sevlog::Logger;
use sevlog_core::{EventBus, ParsedLine, SubscriptionId, TailEvent};
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

/// Tail events delivered through a tokio channel. Dropping it unsubscribes.
pub struct TailEvents {
    bus: EventBus,
    id: SubscriptionId,
    receiver: UnboundedReceiver<TailEvent>,
}

impl TailEvents {
    pub fn new(bus: &EventBus) -> Self {
        let (sender, receiver) = unbounded_channel();
        let id = bus.listen(move |event| {
            sender.send(event.clone()).ok();
        });
        Self {
            bus: bus.clone(),
            id,
            receiver,
        }
    }

    /// Next event, `None` once unsubscribed and drained.
    pub async fn next(&mut self) -> Option<TailEvent> {
        self.receiver.recv().await
    }

    /// Next parsed line. Returns `None` when the tailed file ends first.
    pub async fn next_line(&mut self) -> Option<ParsedLine> {
        match self.next().await? {
            TailEvent::Line(line) => Some(line),
            TailEvent::End => None,
        }
    }

    /// Collects every line until the tailed file ends.
    pub async fn collect_until_end(&mut self) -> Vec<ParsedLine> {
        let mut lines = Vec::new();
        while let Some(line) = self.next_line().await {
            lines.push(line);
        }
        lines
    }

    pub fn try_next(&mut self) -> Option<TailEvent> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for TailEvents {
    fn drop(&mut self) {
        if !self.bus.unsubscribe(self.id) {
            log::debug!("tail subscription {} was already removed", self.id);
        }
    }
}

/// Subscribes to the tail events of `logger`.
pub fn tail_events(logger: &Logger) -> TailEvents {
    TailEvents::new(logger.events())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeDelta};
    use sevlog::{ManualClock, Severity, logger_config};
    use std::{fs, path::PathBuf};

    fn test_dir(name: &str) -> PathBuf {
        let dir = PathBuf::from(format!("/tmp/sevlog_test_{name}"));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[tokio::test]
    async fn test_lines_then_end() {
        let dir = test_dir("tokio_lines");
        let logger = logger_config()
            .with_file(&dir.join("app-%DATE%.log").to_string_lossy())
            .build()
            .unwrap();
        let mut events = tail_events(&logger);
        logger.info("one");
        logger.critical("two");
        let first = events.next_line().await.unwrap();
        assert_eq!(first.level, Some(Severity::Info));
        assert_eq!(first.msg, "one");
        drop(logger);
        let rest = events.collect_until_end().await;
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].level_string, "CRITICAL");
    }

    #[tokio::test]
    async fn test_rotation_ends_stream_segment() {
        let dir = test_dir("tokio_rotation");
        let clock = ManualClock::new(
            NaiveDate::from_ymd_opt(2024, 4, 1)
                .unwrap()
                .and_hms_opt(23, 0, 0)
                .unwrap(),
        );
        let logger = logger_config()
            .with_clock(clock.clone())
            .with_file(&dir.join("app-%DATE%.log").to_string_lossy())
            .build()
            .unwrap();
        let mut events = tail_events(&logger);
        logger.notice("day one");
        clock.advance(TimeDelta::hours(2));
        logger.notice("day two");

        let day_one = events.collect_until_end().await;
        assert_eq!(day_one.len(), 1);
        assert_eq!(day_one[0].msg, "day one");
        let day_two = events.next_line().await.unwrap();
        assert_eq!(day_two.msg, "day two");
    }

    #[tokio::test]
    async fn test_try_next_does_not_wait() {
        let dir = test_dir("tokio_try_next");
        let logger = logger_config()
            .with_file(&dir.join("app-%DATE%.log").to_string_lossy())
            .build()
            .unwrap();
        let mut events = tail_events(&logger);
        assert_eq!(events.try_next(), None);
        logger.warning("queued");
        // closing the file joins the tail thread, so both events are queued
        drop(logger);
        match events.try_next() {
            Some(TailEvent::Line(line)) => assert_eq!(line.msg, "queued"),
            other => panic!("expected a line, got {other:?}"),
        }
        assert_eq!(events.try_next(), Some(TailEvent::End));
        assert_eq!(events.try_next(), None);
    }

    #[tokio::test]
    async fn test_drop_unsubscribes() {
        let logger = logger_config().build().unwrap();
        let events = tail_events(&logger);
        assert_eq!(logger.events().len(), 1);
        drop(events);
        assert!(logger.events().is_empty());
    }
}
