use std::time::Duration;

use sevlog::logger_config;
use sevlog_tokio::tail_events;

#[tokio::main]
async fn main() {
    let logger = logger_config()
        .with_console(true)
        .with_file("/tmp/sevlog_example_async/app-%DATE%.log")
        .build()
        .unwrap();
    let mut events = tail_events(&logger);

    let reader = tokio::spawn(async move { events.collect_until_end().await });

    for batch in 0..3 {
        logger.info(&format!("Batch {batch} - message A"));
        logger.warning(&format!("Batch {batch} - message B"));
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    drop(logger);

    let lines = reader.await.unwrap();
    println!("\n--- Async Tail Summary ---");
    for line in &lines {
        println!("  {} {}", line.level_string, line.msg);
    }
    assert_eq!(lines.len(), 6);
}
