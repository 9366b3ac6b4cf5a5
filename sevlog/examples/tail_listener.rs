use sevlog::{TailEvent, logger_config};

fn main() {
    let logger = logger_config()
        .with_level("NOTICE")
        .with_file("/tmp/sevlog_example_tail/app-%DATE%.log")
        .build()
        .unwrap();

    logger.on_line(|line| {
        println!(
            "tailed {:<9} at {}: {}",
            line.level_string, line.date, line.msg
        );
    });
    logger.on_end(|| println!("log file closed"));
    let (_, events) = logger.subscribe();

    logger.alert("Hello, Top !");
    logger.notice("Hello, Middle !");
    logger.info("filtered out");
    logger.error_trace("Hello, Bottom !");
    drop(logger);

    let events: Vec<TailEvent> = events.try_iter().collect();
    assert_eq!(events.len(), 4);
    assert_eq!(events.last(), Some(&TailEvent::End));
}
