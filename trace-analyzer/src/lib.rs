//! Reconstructs journal data file usage from the message store's GC scan trace.

pub mod cli;
pub mod error;
pub mod logging;

use std::io::Write;

use config::Configuration;
use log::info;
use scan::{ScanAccumulator, ScanStats, TextReport};

pub use crate::cli::Cli;
pub use crate::error::AnalyzerError;

pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

/// Resolve the configured trace, replay it and write the report to `out`.
pub fn analyze<W: Write>(config: &Configuration, mut out: W) -> Result<ScanStats, AnalyzerError> {
    let source = source::resolve(&config.source)?;
    writeln!(out, "{}", source.origin)?;

    let mut accumulator = ScanAccumulator::new(config.report, TextReport::new(out));
    for line in source.lines() {
        accumulator.accept(&line?)?;
    }
    let (report, stats) = accumulator.finish()?;
    report.into_inner().flush()?;
    info!(
        "Replayed {} lines of `{}` in {} scan cycles",
        stats.lines, config.source, stats.cycles
    );
    Ok(stats)
}
