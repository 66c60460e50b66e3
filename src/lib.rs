//! # goldcheck
//!
//! A golden-model equivalence harness for pipelined digital circuits.
//!
//! The harness produces seeded, bit-exact stimulus for a circuit, replays it
//! through a hand-written behavioral reference ("golden") model that
//! reproduces the circuit's pipeline latency, and compares the golden output
//! against the output of an external simulator. An unknown (`x`) digit is
//! accepted in place of a `0`, and every such tolerant substitution is
//! recorded.
//!
//! ## Design Principles
//!
//! - **Explicit unknowns**: signal values are [`Logic`], either a definite
//!   `BigUint` or `Unknown`. No arithmetic ever touches an unknown.
//! - **Latency as data**: a golden model is a pure `compute_raw` plus a
//!   [`LatencyQueue`]; the trait supplies `reset` and `step`.
//! - **Registry over discovery**: models are selected by [`ModelKind`]
//!   through a [`ModelRegistry`].
//! - **Independent cases**: each case owns its stimulus, model and record,
//!   so cases can run on independent workers.
//!
//! ## Features
//!
//! - `parallel` - Run cases on a rayon worker pool
//!
//! ## Quick Start
//!
//! ```rust
//! use goldcheck::{Comparator, Logic, Verdict};
//! use goldcheck::model::{GoldenModel, Inputs, ModelContext};
//! use goldcheck::models::AdderTreeModel;
//! use std::collections::BTreeMap;
//!
//! let params: BTreeMap<String, i64> =
//!     [("INPUT_COUNT".to_string(), 4), ("DATA_WIDTH".to_string(), 4)].into();
//! let mut model = AdderTreeModel::new(&ModelContext::new(&params, "rst_n")).unwrap();
//! model.reset();
//!
//! let inputs: Inputs = [("i_data".to_string(), Logic::from(0x4321))].into();
//! let mut golden = vec!["cycle,o_sum".to_string()];
//! for cycle in 0..4 {
//!     let out = model.step(&inputs).unwrap();
//!     golden.push(format!("{},{}", cycle, out["o_sum"].to_hex(2)));
//! }
//!
//! let candidate = ["cycle,o_sum", "0,00", "1,0x", "2,0a", "3,0a"];
//! let record = Comparator::new().compare(0, Some(&golden[..]), Some(&candidate.map(String::from)[..]));
//! assert_eq!(record.verdict, Verdict::Pass);
//! assert_eq!(record.substitution_count(), 2);
//! ```
//!
//! ## Running A Results Directory
//!
//! ```rust,ignore
//! use goldcheck::{Harness, HarnessConfig};
//!
//! let config = HarnessConfig::from_file("harness.yaml")?;
//! let summary = Harness::new(config).run_dir("results")?;
//! println!("{}", summary.summary());
//! ```

pub mod types;
pub mod logic;
pub mod width;
pub mod config;
pub mod stimulus;
pub mod model;
pub mod models;
pub mod registry;
pub mod compare;
pub mod report;
pub mod harness;
pub mod parallel;

// Re-export commonly used types
pub use types::{CaseId, Cycle, Direction, PortName};
pub use logic::Logic;
pub use width::{clog2, port_width, WidthEvaluator};
pub use config::{
    CaseConfig, CaseFile, ConfigError, HarnessConfig, HarnessConfigBuilder, PortDecl, ResetConvention,
    DEFAULT_RESET_CYCLES,
};
pub use stimulus::{StimulusError, StimulusGenerator, StimulusSet};
pub use model::{GoldenModel, Inputs, LatencyQueue, ModelContext, OutputPort, Outputs};
pub use models::{AdderTreeModel, MuxModel};
pub use registry::{create_default_registry, ModelKind, ModelRegistry};
pub use compare::{digits_equivalent, CompareFailure, Comparator, Substitution};
pub use report::{CaseFailure, CaseSummary, ComparisonRecord, Verdict};
pub use harness::{CaseError, CaseJob, Harness, LoadedCases};
pub use parallel::{ParallelHarness, RecordSink};

/// Initialize the tracing subscriber for logging.
///
/// `RUST_LOG` takes precedence over `level` when set.
///
/// # Example
///
/// ```rust,ignore
/// goldcheck::init_logging("info");
/// ```
pub fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
