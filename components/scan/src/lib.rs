//! Offline interpreter of the message store's GC scan trace.
//!
//! During a checkpoint the store traces its journal GC candidate set after every step of the
//! scan. Replaying those snapshots in order tells how many data files each step, and in
//! particular each destination, still pins, and how many files are left for cleanup.

pub mod accumulator;
pub mod error;
pub mod line;
pub mod report;
pub mod segment;
pub mod stage;

pub use crate::accumulator::{ScanAccumulator, ScanStats};
pub use crate::error::{ParseError, ScanError};
pub use crate::report::{ReportEvent, ReportSink, TextReport};
pub use crate::segment::{SegmentId, SegmentSet};
