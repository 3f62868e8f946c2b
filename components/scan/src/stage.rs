use std::fmt::{self, Display, Formatter};

use crate::error::ParseError;

pub(crate) const DESTINATION_MARKER: &str = "dest";
const DESTINATION_DESCRIPTOR: &str = "dest:";
const TX_RANGE_MARKER: &str = "tx range";
const QUEUE_TYPE_CODE: char = '0';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationKind {
    Queue,
    Topic,
}

impl DestinationKind {
    fn from_code(code: char) -> Self {
        if code == QUEUE_TYPE_CODE {
            DestinationKind::Queue
        } else {
            DestinationKind::Topic
        }
    }
}

impl Display for DestinationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DestinationKind::Queue => f.write_str("Queue"),
            DestinationKind::Topic => f.write_str("Topic"),
        }
    }
}

/// Step of the GC scan that a checkpoint line reports on.
///
/// Each stage is charged with the segments that left the candidate set between the previous
/// checkpoint line and its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// A fixed step such as `first tx` or `ackMessageFileMapLocation`.
    Named(String),

    /// In-flight transaction range. Its line carries the range itself as a leading bracket group.
    TxRange(String),

    Destination { name: String, kind: DestinationKind },
}

impl Stage {
    /// Resolve a stage from its raw name and the scan fragment it was found in.
    pub(crate) fn resolve(name: &str, fragment: &str) -> Result<Self, ParseError> {
        if name.contains(DESTINATION_MARKER) {
            return resolve_destination(fragment);
        }
        if name.contains(TX_RANGE_MARKER) {
            return Ok(Stage::TxRange(name.to_owned()));
        }
        Ok(Stage::Named(name.to_owned()))
    }

    pub fn is_tx_range(&self) -> bool {
        matches!(self, Stage::TxRange(_))
    }
}

/// Label used in usage report lines: the raw stage name, or `<name> (Queue|Topic)`.
impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Named(name) | Stage::TxRange(name) => f.write_str(name),
            Stage::Destination { name, kind } => write!(f, "{} ({})", name, kind),
        }
    }
}

/// Parse `dest:<type>[:]<name>,`.
///
/// The type code is a single character. Traces separate it from the name with `:`, which is
/// skipped when present.
fn resolve_destination(fragment: &str) -> Result<Stage, ParseError> {
    let at = fragment
        .find(DESTINATION_DESCRIPTOR)
        .ok_or(ParseError::MalformedDestination { at: 0 })?;
    let descriptor = &fragment[at + DESTINATION_DESCRIPTOR.len()..];

    let mut chars = descriptor.chars();
    let code = chars
        .next()
        .ok_or(ParseError::MalformedDestination { at })?;
    let rest = chars.as_str();
    let rest = rest.strip_prefix(':').unwrap_or(rest);

    // The name ends before the candidate list opens.
    let head = rest.find('[').map_or(rest, |open| &rest[..open]);
    let end = head
        .find(',')
        .ok_or(ParseError::MalformedDestination { at })?;
    Ok(Stage::Destination {
        name: rest[..end].to_owned(),
        kind: DestinationKind::from_code(code),
    })
}
