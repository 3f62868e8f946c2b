use std::io::{self, Write};

#[cfg(test)]
use mockall::automock;

use crate::segment::SegmentSet;

/// Observable outcome of feeding trace lines to the accumulator.
///
/// Output options are applied before an event is emitted, so a sink renders every event it
/// receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEvent {
    /// A scan cycle started.
    FullSet {
        size: usize,
        timestamp: Option<String>,
    },

    /// Parse internals of a checkpoint line, emitted ahead of its usage in debug mode.
    StageDebug {
        label: String,
        prior: usize,
        current: usize,
        tx_range: Option<String>,
    },

    /// Segments retired by a stage. `retired` is populated in verbose mode only.
    StageUsage {
        in_use: i64,
        label: String,
        retired: Option<SegmentSet>,
    },

    CycleSummary {
        contains_acks: usize,
        candidates: i64,
        checkpoint_done: bool,
    },

    /// The input ended without any full set line.
    NoFullSet,
}

#[cfg_attr(test, automock)]
pub trait ReportSink {
    fn emit(&mut self, event: ReportEvent) -> io::Result<()>;
}

/// Renders report events as the line-oriented text report.
pub struct TextReport<W> {
    writer: W,
}

impl<W: Write> TextReport<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportSink for TextReport<W> {
    fn emit(&mut self, event: ReportEvent) -> io::Result<()> {
        let w = &mut self.writer;
        match event {
            ReportEvent::FullSet { size, timestamp } => {
                writeln!(w, "Acquiring Full Set...\n")?;
                if let Some(timestamp) = timestamp {
                    writeln!(w, "Time: {}", timestamp)?;
                }
                writeln!(w, "Full journal set: {}", size)?;
            }
            ReportEvent::StageDebug {
                label,
                prior,
                current,
                tx_range,
            } => {
                if let Some(list) = tx_range {
                    writeln!(w, "tx range set: {}", list)?;
                }
                writeln!(w, "Dest: {}", label)?;
                writeln!(w, "priorSet.length: {}", prior)?;
                writeln!(w, "currentSet.length: {}", current)?;
            }
            ReportEvent::StageUsage {
                in_use,
                label,
                retired,
            } => match retired {
                Some(retired) => writeln!(w, "{} --- {} ({})", in_use, label, retired)?,
                None => writeln!(w, "{} --- {}", in_use, label)?,
            },
            ReportEvent::CycleSummary {
                contains_acks,
                candidates,
                checkpoint_done,
            } => {
                if contains_acks > 0 {
                    writeln!(w, "Journals containing acks: {}", contains_acks)?;
                }
                writeln!(w, "Candidates for cleanup: {}\n", candidates)?;
                if checkpoint_done {
                    writeln!(w, "Analysis is complete\n")?;
                } else {
                    writeln!(
                        w,
                        "!!! Unable to determine if checkpoint is done. Please try increasing log size !!!\n"
                    )?;
                }
            }
            ReportEvent::NoFullSet => {
                writeln!(
                    w,
                    "\nUnable to determine full log set\n\
                     Check that TRACE level logging has been enabled for org.apache.activemq.store.kahadb.MessageDatabase\n\
                     and that the log contains a full output from the trace logging.  In some cases you may need to increase the log size.\n"
                )?;
            }
        }
        Ok(())
    }
}
