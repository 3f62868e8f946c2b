//! Log initialization for unit and integration tests.

#[cfg(feature = "env")]
use std::io::Write;

/// Environment variable holding an `env_logger` filter for tests, e.g. `scan=trace`.
///
/// The analyzer binary takes a plain level from `KAHADB_LOG_LEVEL` instead.
pub const LOG_FILTER_ENV: &str = "KAHADB_LOG";

/// Install a test logger. Repeated calls are no-ops.
///
/// Records go through the test harness capture, so they only show for failing tests or with
/// `--nocapture`.
#[cfg(feature = "env")]
pub fn try_init_log() {
    try_init_log_with_level(log::LevelFilter::Debug)
}

/// Same as [`try_init_log`], with `level` applying when `KAHADB_LOG` is unset.
#[cfg(feature = "env")]
pub fn try_init_log_with_level(level: log::LevelFilter) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    if let Ok(filters) = std::env::var(LOG_FILTER_ENV) {
        builder.parse_filters(&filters);
    }
    let _ = builder
        .is_test(true)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{:5}] {} {}:{} - {}",
                chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .try_init();
}
