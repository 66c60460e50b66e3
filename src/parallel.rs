//! Parallel case execution.
//!
//! Cases are independent: each owns its config, stimulus, model instance and
//! record. `ParallelHarness` therefore hands whole cases to rayon workers and
//! only synchronizes on collecting the finished records.
//!
//! # Feature Flag
//!
//! Worker threads require the `parallel` feature:
//! ```toml
//! [dependencies]
//! goldcheck = { version = "0.1", features = ["parallel"] }
//! ```
//!
//! Without it the same API runs the cases sequentially.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use parking_lot::Mutex;
use std::path::Path;
use tracing::info;

use crate::config::ConfigError;
use crate::harness::{load_jobs, CaseJob, Harness};
use crate::report::{CaseSummary, ComparisonRecord};

/// Thread-safe collector for finished case records.
#[derive(Debug, Default)]
pub struct RecordSink {
    records: Mutex<Vec<ComparisonRecord>>,
}

impl RecordSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one record.
    pub fn push(&self, record: ComparisonRecord) {
        self.records.lock().push(record);
    }

    /// Returns the number of collected records.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Returns true if nothing has been collected.
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Consumes the sink and orders its records by case id.
    pub fn into_summary(self) -> CaseSummary {
        CaseSummary::from_records(self.records.into_inner())
    }
}

/// Runs cases on a worker pool.
///
/// # Example
///
/// ```ignore
/// use goldcheck::parallel::ParallelHarness;
///
/// let runner = ParallelHarness::new(harness).with_threads(4);
/// let summary = runner.run_dir("results")?;
/// ```
#[derive(Debug, Clone)]
pub struct ParallelHarness {
    harness: Harness,
    num_threads: usize,
}

impl ParallelHarness {
    /// Wraps a harness; the thread count comes from its configuration.
    pub fn new(harness: Harness) -> Self {
        let num_threads = harness.config().threads;
        Self {
            harness,
            num_threads,
        }
    }

    /// Sets the number of worker threads.
    ///
    /// Pass 0 for automatic detection (uses number of CPUs).
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = threads;
        self
    }

    /// Configured worker thread count (0 = automatic).
    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// The wrapped harness.
    pub fn harness(&self) -> &Harness {
        &self.harness
    }

    /// Runs every job sequentially.
    #[cfg(not(feature = "parallel"))]
    pub fn run_jobs(&self, jobs: &[CaseJob]) -> CaseSummary {
        let sink = RecordSink::new();
        for job in jobs {
            sink.push(self.harness.run_job(job));
        }
        self.finish(sink)
    }

    /// Runs every job on the worker pool.
    #[cfg(feature = "parallel")]
    pub fn run_jobs(&self, jobs: &[CaseJob]) -> CaseSummary {
        let sink = RecordSink::new();
        let run = || {
            jobs.par_iter()
                .for_each(|job| sink.push(self.harness.run_job(job)));
        };

        if self.num_threads > 0 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(self.num_threads)
                .build()
            {
                Ok(pool) => pool.install(run),
                Err(err) => {
                    tracing::warn!(error = %err, "Falling back to the global pool");
                    run();
                }
            }
        } else {
            run();
        }

        self.finish(sink)
    }

    /// Runs every case config in a results directory and writes the reports.
    pub fn run_dir<P: AsRef<Path>>(&self, dir: P) -> Result<CaseSummary, ConfigError> {
        let dir = dir.as_ref();
        let loaded = load_jobs(dir)?;
        let summary = loaded.with_rejected(self.run_jobs(&loaded.jobs));
        summary.write_reports(dir)?;
        Ok(summary)
    }

    fn finish(&self, sink: RecordSink) -> CaseSummary {
        let summary = sink.into_summary();
        info!(
            passed = summary.passed(),
            total = summary.total(),
            threads = self.num_threads,
            "Run complete"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CaseConfig, HarnessConfig, PortDecl};
    use crate::logic::Logic;
    use crate::stimulus::StimulusSet;
    use crate::types::Direction;

    fn job(case_id: u32, value: u64, candidate_ok: bool) -> CaseJob {
        let case = CaseConfig::new(case_id, 6)
            .with_param("INPUT_COUNT", 2)
            .with_param("DATA_WIDTH", 8)
            .with_port(PortDecl::new("i_data", Direction::Input, "input [1:0][7:0] i_data"))
            .with_port(PortDecl::new("o_sum", Direction::Output, "output [8:0] o_sum"));
        let mut stimulus = StimulusSet::new();
        stimulus.insert("i_data", 16, vec![Logic::from(value); 6]);

        let harness = Harness::new(HarnessConfig::default());
        let mut golden = harness.golden_lines(&case, &stimulus).unwrap();
        if !candidate_ok {
            golden.pop();
        }
        CaseJob::new(case, Some(golden)).with_stimulus(stimulus)
    }

    #[test]
    fn test_record_sink() {
        let sink = RecordSink::new();
        assert!(sink.is_empty());
        sink.push(ComparisonRecord::pass(2, vec![]));
        sink.push(ComparisonRecord::pass(1, vec![]));
        assert_eq!(sink.len(), 2);
        let summary = sink.into_summary();
        assert_eq!(summary.records()[0].case_id, 1);
    }

    #[test]
    fn test_run_jobs_ordered_summary() {
        let jobs: Vec<CaseJob> = (0..8).rev().map(|i| job(i, 0x0102 * i as u64, i != 5)).collect();
        let runner = ParallelHarness::new(Harness::new(HarnessConfig::default())).with_threads(2);
        let summary = runner.run_jobs(&jobs);

        let ids: Vec<_> = summary.records().iter().map(|r| r.case_id).collect();
        assert_eq!(ids, (0..8).collect::<Vec<_>>());
        assert_eq!(summary.passed(), 7);
        assert!(!summary.get(5).unwrap().is_pass());
    }

    #[test]
    fn test_threads_from_config() {
        let config = HarnessConfig {
            threads: 3,
            ..HarnessConfig::default()
        };
        let runner = ParallelHarness::new(Harness::new(config));
        assert_eq!(runner.num_threads(), 3);
    }
}
