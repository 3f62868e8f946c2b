//! Errors raised while interpreting GC scan trace lines.
//!
//! Parse errors are recoverable: the accumulator logs and skips the offending line. Only failures
//! of the report sink abort a scan.

use thiserror::Error;

/// A trace line matched a scan marker but did not have the shape that marker implies.
///
/// Positions are byte offsets into the scan fragment, i.e. the text starting at `gc candidates`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("No `[` found after byte {at}")]
    MissingOpenBracket { at: usize },

    #[error("Bracket opened at byte {at} is never closed")]
    UnclosedBracket { at: usize },

    #[error("No transaction range group after byte {at}")]
    MissingTxRange { at: usize },

    #[error("Stage name starting at byte {at} is not terminated by `:`")]
    MissingStageTerminator { at: usize },

    #[error("Destination descriptor at byte {at} is malformed")]
    MalformedDestination { at: usize },
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Failed to write report")]
    Report(#[from] std::io::Error),
}
