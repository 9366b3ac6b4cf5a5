use std::path::PathBuf;

use chrono::{NaiveDate, TimeDelta};
use sevlog::{ManualClock, logger_config};

fn main() {
    let dir = PathBuf::from("/tmp/sevlog_example_rotation");
    let _ = std::fs::remove_dir_all(&dir);

    let clock = ManualClock::new(
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(22, 0, 0)
            .unwrap(),
    );
    let logger = logger_config()
        .with_level("INFO")
        .with_console(true)
        .with_clock(clock.clone())
        .with_file(&dir.join("app-%DATE%.log").to_string_lossy())
        .build()
        .unwrap();

    for hour in 0..6 {
        logger.info(&format!("Log message at hour {hour}"));
        logger.debug("not written, below INFO");
        clock.advance(TimeDelta::hours(1));
    }
    drop(logger);

    let mut files: Vec<String> = std::fs::read_dir(&dir)
        .unwrap()
        .flatten()
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    files.sort();

    println!("\n--- Rotation Summary ---");
    println!("Log directory: {}", dir.display());
    for f in &files {
        println!("  {f}");
    }
    assert_eq!(files, vec!["app-2024-01-01.log", "app-2024-01-02.log"]);
}
