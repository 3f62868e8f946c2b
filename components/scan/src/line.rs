//! Tokenizer for the message store's GC trace lines.
//!
//! This is the only place that knows the textual layout of the trace. Everything downstream works
//! on [`TraceLine`].

use log::trace;

use crate::{error::ParseError, segment::SegmentSet, stage::Stage};

/// Every line of interest is emitted by this logger.
pub const SOURCE_MARKER: &str = "MessageDatabase";

/// Start of the scan fragment. All scan parsing is relative to this marker.
pub const SCAN_MARKER: &str = "gc candidates";

pub const FULL_SET_MARKER: &str = "set:";

pub const CHECKPOINT_MARKER: &str = "candidates after";

pub const ACK_RETENTION_MARKER: &str = "not removing data file";

pub const CHECKPOINT_DONE_MARKER: &str = "Checkpoint done.";

/// Milliseconds following the first `,` of a `yyyy-MM-dd HH:mm:ss,SSS` timestamp.
const TIMESTAMP_FRACTION_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullSetLine {
    /// Timestamp prefix of the line, reproduced verbatim in time-annotated output.
    pub timestamp: Option<String>,
    pub segments: SegmentSet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointLine {
    pub stage: Stage,
    pub segments: SegmentSet,

    /// Text between the brackets the segments were parsed from.
    pub list: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceLine {
    FullSet(FullSetLine),
    Checkpoint(CheckpointLine),
    AckRetention,
    CheckpointDone,
    Ignored,
}

impl TraceLine {
    /// Classify a single line of the trace.
    ///
    /// Lines without the source marker, and scan lines of no known shape, are `Ignored`. A line
    /// that carries a known marker but lacks the delimiters it implies is a `ParseError`.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        if !line.contains(SOURCE_MARKER) {
            return Ok(TraceLine::Ignored);
        }

        if let Some(start) = line.find(SCAN_MARKER) {
            let fragment = &line[start..];
            if fragment.contains(FULL_SET_MARKER) {
                let (list, _) = first_bracket_group(fragment, 0)?;
                trace!("Full set list: [{}]", list);
                return Ok(TraceLine::FullSet(FullSetLine {
                    timestamp: timestamp_prefix(line),
                    segments: SegmentSet::from_list(list),
                }));
            }

            if let Some(at) = fragment.find(CHECKPOINT_MARKER) {
                return parse_checkpoint(fragment, at).map(TraceLine::Checkpoint);
            }
            return Ok(TraceLine::Ignored);
        }

        if line.contains(ACK_RETENTION_MARKER) {
            return Ok(TraceLine::AckRetention);
        }

        if line.contains(CHECKPOINT_DONE_MARKER) {
            return Ok(TraceLine::CheckpointDone);
        }

        Ok(TraceLine::Ignored)
    }
}

fn parse_checkpoint(fragment: &str, at: usize) -> Result<CheckpointLine, ParseError> {
    // Marker is followed by a single separator before the stage name.
    let name_start = at + CHECKPOINT_MARKER.len() + 1;
    let name_end = fragment
        .get(name_start..)
        .and_then(|rest| rest.find(':'))
        .map(|offset| name_start + offset)
        .ok_or(ParseError::MissingStageTerminator { at: name_start })?;
    let name = &fragment[name_start..name_end];

    let stage = Stage::resolve(name, fragment)?;
    let list = if stage.is_tx_range() {
        tx_range_list(fragment, name_end)?
    } else {
        first_bracket_group(fragment, name_end)?.0
    };
    trace!("Stage `{}` list: [{}]", stage, list);

    Ok(CheckpointLine {
        segments: SegmentSet::from_list(list),
        list: list.to_owned(),
        stage,
    })
}

/// Content of the first `[...]` at or after `from`, and the position just past its `]`.
///
/// Anything after the closing bracket, e.g. trailing layout fields, is left alone.
fn first_bracket_group(fragment: &str, from: usize) -> Result<(&str, usize), ParseError> {
    let open = fragment[from..]
        .find('[')
        .map(|offset| from + offset)
        .ok_or(ParseError::MissingOpenBracket { at: from })?;
    let close = fragment[open..]
        .find(']')
        .map(|offset| open + offset)
        .ok_or(ParseError::UnclosedBracket { at: open })?;
    Ok((&fragment[open + 1..close], close + 1))
}

/// A transaction range line carries the range as the first bracket group after the stage name
/// and the candidates as the group right after it.
fn tx_range_list(fragment: &str, from: usize) -> Result<&str, ParseError> {
    let (range, range_end) = first_bracket_group(fragment, from).map_err(|e| match e {
        ParseError::MissingOpenBracket { at } => ParseError::MissingTxRange { at },
        e => e,
    })?;
    trace!("Transaction range: [{}]", range);
    let (list, _) = first_bracket_group(fragment, range_end)?;
    Ok(list)
}

/// Everything up to the first `,` plus the millisecond digits after it.
///
/// The comma must precede the source marker and be followed by three digits, so commas inside
/// the message never pass for a timestamp.
fn timestamp_prefix(line: &str) -> Option<String> {
    let marker = line.find(SOURCE_MARKER)?;
    let comma = line[..marker].find(',')?;
    let end = comma + 1 + TIMESTAMP_FRACTION_LEN;
    let fraction = line[..marker].get(comma + 1..end)?;
    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(line[..end].to_owned())
}
