use std::sync::Arc;

use sevlog::{MemoryConsole, Severity, logger_config};

#[test]
fn test_env_level_is_the_default_threshold() {
    // SAFETY: single test in this binary, set before the environment is first read.
    unsafe {
        std::env::set_var("SEVLOG_LEVEL", "error");
        std::env::set_var("SEVLOG_COLOR", "false");
    }
    let console = Arc::new(MemoryConsole::default());
    let logger = logger_config()
        .with_console(true)
        .with_console_sink(Arc::clone(&console))
        .build()
        .unwrap();
    assert_eq!(logger.threshold(), 3);
    logger.warning("below the env threshold");
    logger.error("kept");
    let lines = console.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].1.ends_with("] ERROR     kept"));

    let logger = logger_config().with_level(Severity::Debug).build().unwrap();
    assert_eq!(logger.threshold(), 7);
}
