use std::{fs, path::PathBuf};

use log::Log;
use sevlog::{Severity, TailEvent, logger_config};

#[test]
fn test_log_facade_backend() {
    let dir = PathBuf::from("/tmp/sevlog_test_global");
    let _ = fs::remove_dir_all(&dir);
    let logger = logger_config()
        .with_level(Severity::Notice)
        .with_file(&dir.join("global-%DATE%.log").to_string_lossy())
        .init_global()
        .expect("first installation succeeds");
    assert_eq!(log::max_level(), log::LevelFilter::Warn);
    let (_, events) = logger.subscribe();

    log::error!("from the facade");
    log::warn!("careful {}", 42);
    log::info!("below notice");
    log::logger().flush();

    let content = fs::read_to_string(logger.current_file().unwrap()).unwrap();
    let lines: Vec<&str> = content.split_terminator("\r\n").collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("] ERROR     from the facade"));
    assert!(lines[1].ends_with("] WARNING   careful 42"));

    let first = events.recv().unwrap();
    assert!(matches!(first, TailEvent::Line(line) if line.level == Some(Severity::Error)));

    let second = logger_config().init_global();
    assert!(second.is_err());
}
