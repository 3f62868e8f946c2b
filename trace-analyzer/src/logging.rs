use std::str::FromStr;

use log4rs::{
    append::console::{ConsoleAppender, Target},
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    Config,
};

/// Environment variable holding the log level used when no log4rs file is given.
///
/// Test builds read `env_logger` filters from `ulog::LOG_FILTER_ENV` instead.
pub const LOG_LEVEL_ENV: &str = "KAHADB_LOG_LEVEL";

/// Log to stderr at the level named by `KAHADB_LOG_LEVEL`, `warn` by default.
///
/// Stdout carries the report and is never used for logging.
pub fn init_console_log() -> anyhow::Result<()> {
    let level = console_level(std::env::var(LOG_LEVEL_ENV).ok().as_deref());
    log4rs::init_config(console_config(level)?)?;
    Ok(())
}

/// A single level name, case insensitive. Anything else yields `warn`.
fn console_level(value: Option<&str>) -> log::LevelFilter {
    value
        .and_then(|value| log::LevelFilter::from_str(value.trim()).ok())
        .unwrap_or(log::LevelFilter::Warn)
}

fn console_config(level: log::LevelFilter) -> anyhow::Result<Config> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S%.3f)} | {({l}):5.5} | {f}:{L} - {m}{n}",
        )))
        .build();

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))?;
    Ok(config)
}
