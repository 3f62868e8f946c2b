use config::ReportOptions;
use log::{debug, info, trace, warn};

use crate::{
    error::ScanError,
    line::{CheckpointLine, FullSetLine, TraceLine},
    report::{ReportEvent, ReportSink},
    segment::SegmentSet,
};

/// Counters of one scan cycle, bounded by two full set lines or by the end of input.
#[derive(Debug)]
struct Cycle {
    full_size: usize,

    /// Candidate set as of the last checkpoint line.
    prior: SegmentSet,

    /// Candidates remaining. May go negative if a checkpoint widens the candidate set.
    count: i64,

    /// Segments retained only because they hold unacknowledged messages.
    contains_acks: usize,

    checkpoint_done: bool,
}

impl Cycle {
    fn new(full: SegmentSet) -> Self {
        Self {
            full_size: full.len(),
            count: full.len() as i64,
            prior: full,
            contains_acks: 0,
            checkpoint_done: false,
        }
    }

    fn summary(&self) -> ReportEvent {
        ReportEvent::CycleSummary {
            contains_acks: self.contains_acks,
            candidates: self.count - self.contains_acks as i64,
            checkpoint_done: self.checkpoint_done,
        }
    }
}

#[derive(Debug)]
enum CycleState {
    AwaitingFullSet,
    Accumulating(Cycle),
}

/// Line and cycle counts of a finished scan.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanStats {
    pub lines: u64,
    pub cycles: usize,

    /// Lines that carried a scan marker but could not be parsed.
    pub skipped: usize,
}

/// Reconstructs per-stage segment usage from the GC scan trace, one line at a time.
///
/// Each checkpoint line is charged with the candidates that disappeared since the previous one,
/// so lines must be fed in the order the store emitted them.
pub struct ScanAccumulator<S> {
    options: ReportOptions,
    sink: S,
    state: CycleState,
    stats: ScanStats,
}

impl<S: ReportSink> ScanAccumulator<S> {
    pub fn new(options: ReportOptions, sink: S) -> Self {
        Self {
            options,
            sink,
            state: CycleState::AwaitingFullSet,
            stats: ScanStats::default(),
        }
    }

    /// Feed the next line of the trace.
    ///
    /// Malformed scan lines are logged and skipped. Only sink failures are returned.
    pub fn accept(&mut self, line: &str) -> Result<(), ScanError> {
        self.stats.lines += 1;
        let parsed = match TraceLine::parse(line) {
            Ok(parsed) => parsed,
            Err(e) => {
                self.stats.skipped += 1;
                warn!(
                    "Skipped malformed trace line {}: {}. Line: {}",
                    self.stats.lines, e, line
                );
                return Ok(());
            }
        };

        match parsed {
            TraceLine::FullSet(full) => self.begin_cycle(full)?,
            TraceLine::Checkpoint(checkpoint) => self.checkpoint(checkpoint)?,
            TraceLine::AckRetention => {
                if let CycleState::Accumulating(cycle) = &mut self.state {
                    cycle.contains_acks += 1;
                    trace!("Data file retained for acks, {} so far", cycle.contains_acks);
                }
            }
            TraceLine::CheckpointDone => {
                if let CycleState::Accumulating(cycle) = &mut self.state {
                    cycle.checkpoint_done = true;
                    debug!("Checkpoint done at line {}", self.stats.lines);
                }
            }
            TraceLine::Ignored => {}
        }
        Ok(())
    }

    /// Flush the pending cycle, or the missing full set diagnostic, and hand back the sink.
    pub fn finish(mut self) -> Result<(S, ScanStats), ScanError> {
        match &self.state {
            CycleState::Accumulating(cycle) => {
                let summary = cycle.summary();
                self.sink.emit(summary)?;
            }
            CycleState::AwaitingFullSet => {
                warn!("No full candidate set in {} lines", self.stats.lines);
                self.sink.emit(ReportEvent::NoFullSet)?;
            }
        }
        info!(
            "Analyzed {} lines: {} scan cycles, {} malformed lines skipped",
            self.stats.lines, self.stats.cycles, self.stats.skipped
        );
        Ok((self.sink, self.stats))
    }

    /// Candidates remaining in the current cycle.
    pub fn remaining(&self) -> Option<i64> {
        match &self.state {
            CycleState::Accumulating(cycle) => Some(cycle.count),
            CycleState::AwaitingFullSet => None,
        }
    }

    /// Candidate set as of the last checkpoint line of the current cycle.
    pub fn prior_set(&self) -> Option<&SegmentSet> {
        match &self.state {
            CycleState::Accumulating(cycle) => Some(&cycle.prior),
            CycleState::AwaitingFullSet => None,
        }
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    fn begin_cycle(&mut self, full: FullSetLine) -> Result<(), ScanError> {
        if let CycleState::Accumulating(cycle) = &self.state {
            info!(
                "Scan cycle of {} candidates ends with {} remaining",
                cycle.full_size, cycle.count
            );
            let summary = cycle.summary();
            self.sink.emit(summary)?;
        }

        let cycle = Cycle::new(full.segments);
        self.stats.cycles += 1;
        info!(
            "Scan cycle {} starts with {} candidates",
            self.stats.cycles, cycle.full_size
        );
        self.sink.emit(ReportEvent::FullSet {
            size: cycle.full_size,
            timestamp: full.timestamp.filter(|_| self.options.time),
        })?;
        self.state = CycleState::Accumulating(cycle);
        Ok(())
    }

    fn checkpoint(&mut self, checkpoint: CheckpointLine) -> Result<(), ScanError> {
        let cycle = match &mut self.state {
            CycleState::Accumulating(cycle) => cycle,
            CycleState::AwaitingFullSet => {
                trace!("Checkpoint line before any full set: {}", checkpoint.stage);
                return Ok(());
            }
        };

        let label = checkpoint.stage.to_string();
        let current = checkpoint.segments;
        debug!(
            "Stage `{}`: prior {} candidates, current {}",
            label,
            cycle.prior.len(),
            current.len()
        );
        if self.options.debug {
            self.sink.emit(ReportEvent::StageDebug {
                label: label.clone(),
                prior: cycle.prior.len(),
                current: current.len(),
                tx_range: checkpoint
                    .stage
                    .is_tx_range()
                    .then(|| checkpoint.list.clone()),
            })?;
        }

        let in_use = cycle.prior.len() as i64 - current.len() as i64;
        if in_use < 0 {
            warn!(
                "Candidate set grew by {} at stage `{}`; trace lines may be out of order",
                -in_use, label
            );
        }

        if !(self.options.concise && in_use == 0) {
            let retired = if self.options.verbose {
                Some(cycle.prior.difference(&current)).filter(|retired| !retired.is_empty())
            } else {
                None
            };
            self.sink.emit(ReportEvent::StageUsage {
                in_use,
                label,
                retired,
            })?;
        }

        cycle.count -= in_use;
        cycle.prior = current;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use config::ReportOptions;

    use super::{ScanAccumulator, ScanStats};
    use crate::{
        report::{MockReportSink, ReportEvent, TextReport},
        segment::SegmentSet,
    };

    const PREFIX: &str = "2015-06-10 10:05:42,117 | TRACE | MessageDatabase | Checkpoint Worker";

    fn line(body: &str) -> String {
        format!("{} | {}", PREFIX, body)
    }

    fn run(options: ReportOptions, lines: &[String]) -> Result<(String, ScanStats), Box<dyn Error>> {
        ulog::try_init_log();
        let mut accumulator = ScanAccumulator::new(options, TextReport::new(Vec::new()));
        for l in lines {
            accumulator.accept(l)?;
        }
        let (report, stats) = accumulator.finish()?;
        Ok((String::from_utf8(report.into_inner())?, stats))
    }

    fn single_destination_cycle() -> Vec<String> {
        vec![
            line("gc candidates set: [1,2,3,4,5]"),
            line("gc candidates after dest:0foo, x : [1,2,4,5]"),
            line("Checkpoint done."),
        ]
    }

    #[test]
    fn test_single_destination() -> Result<(), Box<dyn Error>> {
        let (text, stats) = run(ReportOptions::default(), &single_destination_cycle())?;
        assert_eq!(
            "Acquiring Full Set...\n\n\
             Full journal set: 5\n\
             1 --- foo (Queue)\n\
             Candidates for cleanup: 4\n\n\
             Analysis is complete\n\n",
            text
        );
        assert_eq!(1, stats.cycles);
        assert_eq!(3, stats.lines);
        assert_eq!(0, stats.skipped);
        Ok(())
    }

    #[test]
    fn test_no_full_set() -> Result<(), Box<dyn Error>> {
        let lines = vec![
            line("gc candidates after first tx:3, [1, 2]"),
            line("not removing data file: 3"),
            line("Checkpoint done."),
        ];
        let (text, stats) = run(ReportOptions::default(), &lines)?;
        assert!(text.contains("Unable to determine full log set"));
        assert!(!text.contains("Candidates for cleanup"));
        assert!(!text.contains("---"));
        assert_eq!(0, stats.cycles);
        Ok(())
    }

    #[test]
    fn test_ack_retention_reduces_candidates() -> Result<(), Box<dyn Error>> {
        let mut lines = single_destination_cycle();
        lines.insert(2, line("not removing data file: 4 as contained ack(s) refer to referenced file: [2]"));
        let (text, _) = run(ReportOptions::default(), &lines)?;
        assert!(text.contains("Journals containing acks: 1\n"));
        assert!(text.contains("Candidates for cleanup: 3\n"));
        Ok(())
    }

    #[test]
    fn test_checkpoint_not_done() -> Result<(), Box<dyn Error>> {
        let mut lines = single_destination_cycle();
        lines.pop();
        let (text, _) = run(ReportOptions::default(), &lines)?;
        assert!(text.contains("Candidates for cleanup: 4\n"));
        assert!(text.contains("!!! Unable to determine if checkpoint is done."));
        assert!(!text.contains("Analysis is complete"));
        Ok(())
    }

    #[test]
    fn test_usage_tracks_prior_set() -> Result<(), Box<dyn Error>> {
        let mut accumulator =
            ScanAccumulator::new(ReportOptions::default(), TextReport::new(Vec::new()));
        assert_eq!(None, accumulator.remaining());

        accumulator.accept(&line("gc candidates set: [1, 2, 3, 4, 5, 6]"))?;
        assert_eq!(Some(6), accumulator.remaining());

        let steps = [
            ("gc candidates after first tx:2, [1, 2, 3, 4, 5, 6]", "1, 2, 3, 4, 5, 6"),
            ("gc candidates after producerSequenceIdTrackerLocation:4, [1, 2, 3, 5, 6]", "1, 2, 3, 5, 6"),
            ("gc candidates after tx range:[3, 3], [1, 2, 5, 6]", "1, 2, 5, 6"),
            ("gc candidates after dest:1:prices, [1, 6]", "1, 6"),
        ];
        let mut reported = 0;
        for (body, expected) in steps {
            let before = accumulator.prior_set().map(SegmentSet::len).unwrap_or(0) as i64;
            let remaining = accumulator.remaining().unwrap_or(0);
            accumulator.accept(&line(body))?;
            let expected = SegmentSet::from_list(expected);
            let in_use = before - expected.len() as i64;
            reported += in_use;
            assert_eq!(Some(&expected), accumulator.prior_set());
            assert_eq!(Some(remaining - in_use), accumulator.remaining());
        }
        assert_eq!(Some(6 - reported), accumulator.remaining());
        assert_eq!(Some(2), accumulator.remaining());
        Ok(())
    }

    #[test]
    fn test_concise_suppresses_idle_stages() -> Result<(), Box<dyn Error>> {
        let lines = vec![
            line("gc candidates set: [1, 2, 3]"),
            line("gc candidates after first tx:1, [1, 2, 3]"),
            line("gc candidates after dest:0:idle, [1, 2, 3]"),
            line("gc candidates after dest:0:busy, [1]"),
        ];
        let (text, _) = run(ReportOptions::default(), &lines)?;
        assert!(text.contains("0 --- first tx\n"));
        assert!(text.contains("0 --- idle (Queue)\n"));
        assert!(text.contains("2 --- busy (Queue)\n"));

        let concise = ReportOptions {
            concise: true,
            ..Default::default()
        };
        let (text, _) = run(concise, &lines)?;
        assert!(!text.contains("first tx"));
        assert!(!text.contains("idle"));
        assert!(text.contains("2 --- busy (Queue)\n"));
        Ok(())
    }

    #[test]
    fn test_verbose_appends_retired_ids() -> Result<(), Box<dyn Error>> {
        let lines = vec![
            line("gc candidates set: [1, 2, 3, 4]"),
            line("gc candidates after dest:0:orders, [1, 4]"),
            line("gc candidates after dest:1:prices, [1, 4]"),
        ];
        let (text, _) = run(ReportOptions::default(), &lines)?;
        assert!(text.contains("2 --- orders (Queue)\n"));
        assert!(!text.contains("[2, 3]"));

        let verbose = ReportOptions {
            verbose: true,
            ..Default::default()
        };
        let (text, _) = run(verbose, &lines)?;
        assert!(text.contains("2 --- orders (Queue) ([2, 3])\n"));
        // Nothing retired, nothing appended.
        assert!(text.contains("0 --- prices (Topic)\n"));
        Ok(())
    }

    #[test]
    fn test_time_and_debug() -> Result<(), Box<dyn Error>> {
        let lines = vec![
            line("gc candidates set: [1, 2, 3]"),
            line("gc candidates after tx range:[2, 2], [1, 3]"),
        ];
        let (text, _) = run(ReportOptions::default(), &lines)?;
        assert!(!text.contains("Time:"));
        assert!(!text.contains("priorSet.length"));

        let options = ReportOptions {
            time: true,
            debug: true,
            ..Default::default()
        };
        let (text, _) = run(options, &lines)?;
        assert!(text.contains("Time: 2015-06-10 10:05:42,117\n"));
        assert!(text.contains(
            "tx range set: 1, 3\nDest: tx range\npriorSet.length: 3\ncurrentSet.length: 2\n1 --- tx range\n"
        ));
        Ok(())
    }

    #[test]
    fn test_multiple_cycles() -> Result<(), Box<dyn Error>> {
        let lines = vec![
            line("gc candidates set: [1, 2, 3]"),
            line("gc candidates after dest:0:orders, [3]"),
            line("not removing data file: 3"),
            line("Checkpoint done."),
            line("gc candidates set: [4, 5]"),
            line("gc candidates after dest:0:orders, [4, 5]"),
        ];
        let (text, stats) = run(ReportOptions::default(), &lines)?;
        assert_eq!(2, stats.cycles);
        let summaries: Vec<_> = text
            .lines()
            .filter(|l| l.starts_with("Candidates for cleanup"))
            .collect();
        assert_eq!(
            vec!["Candidates for cleanup: 0", "Candidates for cleanup: 2"],
            summaries
        );
        // Acks and checkpoint completion are reset with the cycle.
        assert_eq!(1, text.matches("Journals containing acks").count());
        assert_eq!(1, text.matches("Analysis is complete").count());
        assert_eq!(1, text.matches("!!! Unable to determine if checkpoint").count());
        Ok(())
    }

    #[test]
    fn test_negative_usage() -> Result<(), Box<dyn Error>> {
        let lines = vec![
            line("gc candidates set: [1, 2]"),
            line("gc candidates after dest:0:orders, [1, 2, 3]"),
        ];
        let (text, _) = run(ReportOptions::default(), &lines)?;
        assert!(text.contains("-1 --- orders (Queue)\n"));
        assert!(text.contains("Candidates for cleanup: 3\n"));
        Ok(())
    }

    #[test]
    fn test_malformed_line_is_skipped() -> Result<(), Box<dyn Error>> {
        let mut lines = single_destination_cycle();
        lines.insert(1, line("gc candidates after tx range:, [1, 2, 3, 4, 5]"));
        lines.insert(1, line("gc candidates after dest:0:broken [1]"));
        let (text, stats) = run(ReportOptions::default(), &lines)?;
        assert_eq!(2, stats.skipped);
        assert_eq!(5, stats.lines);
        assert_eq!(
            "Acquiring Full Set...\n\n\
             Full journal set: 5\n\
             1 --- foo (Queue)\n\
             Candidates for cleanup: 4\n\n\
             Analysis is complete\n\n",
            text
        );
        Ok(())
    }

    #[test]
    fn test_destination_without_comma_before_list() -> Result<(), Box<dyn Error>> {
        let mut lines = single_destination_cycle();
        lines.insert(1, line("gc candidates after dest:0:broken [1, 2, 4, 5]"));
        let (text, stats) = run(ReportOptions::default(), &lines)?;
        assert_eq!(1, stats.skipped);
        assert!(!text.contains("broken"));
        assert!(text.contains("1 --- foo (Queue)\n"));
        assert!(text.contains("Candidates for cleanup: 4\n"));
        Ok(())
    }

    #[test]
    fn test_trailing_layout_fields() -> Result<(), Box<dyn Error>> {
        let lines = vec![
            line("gc candidates set: [1,2,3,4] [Worker]"),
            line("gc candidates after tx range:[3, 3], [1, 2, 4] [Worker]"),
            line("gc candidates after dest:0:orders, [1] [Worker]"),
        ];
        let (text, stats) = run(ReportOptions::default(), &lines)?;
        assert_eq!(0, stats.skipped);
        assert!(text.contains("Full journal set: 4\n1 --- tx range\n2 --- orders (Queue)\n"));
        assert!(text.contains("Candidates for cleanup: 1\n"));
        Ok(())
    }

    #[test]
    fn test_time_without_timestamp() -> Result<(), Box<dyn Error>> {
        let lines = vec![
            "MessageDatabase gc candidates set: [1, 2]".to_owned(),
            "MessageDatabase gc candidates after dest:0:orders, [2]".to_owned(),
        ];
        let options = ReportOptions {
            time: true,
            ..Default::default()
        };
        let (text, _) = run(options, &lines)?;
        assert!(!text.contains("Time:"));
        assert!(text.contains("Full journal set: 2\n1 --- orders (Queue)\n"));
        Ok(())
    }

    #[test]
    fn test_events() -> Result<(), Box<dyn Error>> {
        let mut sink = MockReportSink::new();
        let mut sequence = mockall::Sequence::new();
        sink.expect_emit()
            .withf(|event| *event == ReportEvent::FullSet { size: 5, timestamp: None })
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(()));
        sink.expect_emit()
            .withf(|event| {
                *event
                    == ReportEvent::StageUsage {
                        in_use: 1,
                        label: "foo (Queue)".to_owned(),
                        retired: Some(SegmentSet::from_list("3")),
                    }
            })
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(()));
        sink.expect_emit()
            .withf(|event| {
                *event
                    == ReportEvent::CycleSummary {
                        contains_acks: 0,
                        candidates: 4,
                        checkpoint_done: true,
                    }
            })
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(()));

        let verbose = ReportOptions {
            verbose: true,
            ..Default::default()
        };
        let mut accumulator = ScanAccumulator::new(verbose, sink);
        for l in single_destination_cycle() {
            accumulator.accept(&l)?;
        }
        accumulator.finish()?;
        Ok(())
    }

    #[test]
    fn test_sink_failure_aborts() {
        let mut sink = MockReportSink::new();
        sink.expect_emit().returning(|_| {
            Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "stdout closed",
            ))
        });
        let mut accumulator = ScanAccumulator::new(ReportOptions::default(), sink);
        assert!(accumulator
            .accept(&line("gc candidates set: [1, 2]"))
            .is_err());
    }
}
