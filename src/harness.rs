//! Case runner: stimulus, golden model, CSV rendering and comparison.
//!
//! The `Harness` is the top-level coordinator of a run. For each case it
//!
//! 1. instantiates the configured golden model and resets it,
//! 2. drives clock and reset the way the testbench does and feeds the
//!    stimulus through the model one cycle at a time,
//! 3. renders the golden output CSV, and
//! 4. compares it against the candidate CSV produced by the external
//!    simulator.
//!
//! Cases never share state. Any error inside a case becomes that case's
//! failed [`ComparisonRecord`]; the run as a whole always completes.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::compare::{read_lines, Comparator};
use crate::config::{CaseConfig, ConfigError, HarnessConfig};
use crate::logic::{hex_digits, Logic};
use crate::model::{GoldenModel, Inputs, ModelContext};
use crate::registry::{create_default_registry, ModelRegistry};
use crate::report::{CaseFailure, CaseSummary, ComparisonRecord};
use crate::stimulus::{StimulusError, StimulusGenerator, StimulusSet};
use crate::types::{CaseId, PortName};

/// File name of a case's golden output.
pub fn golden_csv_file(case_id: CaseId) -> String {
    format!("golden_case{}.csv", case_id)
}

/// File name of a case's candidate (simulator) output.
pub fn candidate_csv_file(case_id: CaseId) -> String {
    format!("csv_result_case{}.csv", case_id)
}

/// File name of a case's configuration.
pub fn case_config_file(case_id: CaseId) -> String {
    format!("config_case{}.json", case_id)
}

/// Errors that abort one case before comparison.
#[derive(Error, Debug)]
pub enum CaseError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Stimulus(#[from] StimulusError),
}

impl From<CaseError> for CaseFailure {
    fn from(err: CaseError) -> Self {
        match err {
            CaseError::Config(e) | CaseError::Stimulus(StimulusError::Config(e)) => {
                CaseFailure::Config(e.to_string())
            }
            CaseError::Stimulus(e) => CaseFailure::Stimulus(e.to_string()),
        }
    }
}

/// Everything needed to run one case, fully materialized up front.
#[derive(Clone, Debug)]
pub struct CaseJob {
    pub case: CaseConfig,
    /// Preloaded stimulus; `None` reads the case's hex files
    pub stimulus: Option<StimulusSet>,
    /// Candidate CSV lines; `None` means the candidate file is missing
    pub candidate: Option<Vec<String>>,
    /// Where to write the golden CSV, if anywhere
    pub golden_out: Option<PathBuf>,
}

impl CaseJob {
    /// Creates a job from a case and its candidate output.
    pub fn new(case: CaseConfig, candidate: Option<Vec<String>>) -> Self {
        Self {
            case,
            stimulus: None,
            candidate,
            golden_out: None,
        }
    }

    /// Uses an in-memory stimulus set instead of the case's hex files.
    pub fn with_stimulus(mut self, stimulus: StimulusSet) -> Self {
        self.stimulus = Some(stimulus);
        self
    }

    /// Writes the golden CSV to `path` when the job runs.
    pub fn with_golden_out(mut self, path: impl Into<PathBuf>) -> Self {
        self.golden_out = Some(path.into());
        self
    }

    /// Builds the job for a case living in a results directory.
    ///
    /// Reads `csv_result_case<id>.csv` and targets `golden_case<id>.csv`.
    pub fn from_results_dir(case: CaseConfig, dir: &Path) -> Self {
        let case_id = case.case_id;
        let candidate = read_lines(dir.join(candidate_csv_file(case_id)));
        Self::new(case, candidate).with_golden_out(dir.join(golden_csv_file(case_id)))
    }
}

/// Runs cases against a golden model.
///
/// # Example
///
/// ```rust
/// use goldcheck::config::{CaseConfig, HarnessConfigBuilder, PortDecl};
/// use goldcheck::harness::Harness;
/// use goldcheck::logic::Logic;
/// use goldcheck::registry::ModelKind;
/// use goldcheck::stimulus::StimulusSet;
/// use goldcheck::types::Direction;
///
/// let case = CaseConfig::new(0, 3)
///     .with_param("INPUT_COUNT", 2)
///     .with_param("DATA_WIDTH", 8)
///     .with_port(PortDecl::new("data_in", Direction::Input, "input [15:0] data_in"))
///     .with_port(PortDecl::new("sel", Direction::Input, "input sel"))
///     .with_port(PortDecl::new("data_out", Direction::Output, "output [7:0] data_out"));
///
/// let mut stimulus = StimulusSet::new();
/// stimulus.insert("data_in", 16, vec![Logic::from(0x2211); 3]);
/// stimulus.insert("sel", 1, vec![Logic::from(1); 3]);
///
/// let config = HarnessConfigBuilder::new().model(ModelKind::Mux).build().unwrap();
/// let harness = Harness::new(config);
/// let lines = harness.golden_lines(&case, &stimulus).unwrap();
/// // The reset loads the output register with zero.
/// assert_eq!(lines, vec!["cycle,data_out", "0,00", "1,22", "2,22"]);
/// ```
#[derive(Debug, Clone)]
pub struct Harness {
    config: HarnessConfig,
    registry: ModelRegistry,
    comparator: Comparator,
}

impl Harness {
    /// Creates a harness with the built-in models.
    pub fn new(config: HarnessConfig) -> Self {
        Self::with_registry(config, create_default_registry())
    }

    /// Creates a harness with a custom model registry.
    pub fn with_registry(config: HarnessConfig, registry: ModelRegistry) -> Self {
        Self {
            config,
            registry,
            comparator: Comparator::new(),
        }
    }

    /// Replaces the comparator.
    pub fn with_comparator(mut self, comparator: Comparator) -> Self {
        self.comparator = comparator;
        self
    }

    /// Harness configuration.
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Model registry.
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Derives the case list views, skipping clock and reset.
    pub fn prepare(&self, case: &CaseConfig) -> CaseConfig {
        case.clone()
            .normalized(&self.config.clock_port, &self.config.reset.port)
    }

    /// Instantiates and resets the configured model for one case.
    pub fn build_model(&self, case: &CaseConfig) -> Result<Box<dyn GoldenModel>, ConfigError> {
        let ctx = ModelContext::new(&case.params, &self.config.reset.port);
        let mut model = self.registry.create(&self.config.model, &ctx)?;
        model.reset();
        debug!(
            case_id = case.case_id,
            model = model.name(),
            latency = model.latency(),
            "Built golden model"
        );
        Ok(model)
    }

    /// Seed for one case: the run seed offset by the case id.
    pub fn case_seed(&self, case_id: CaseId) -> Option<u64> {
        self.config.seed.map(|seed| seed.wrapping_add(u64::from(case_id)))
    }

    /// Draws fresh stimulus for a case.
    pub fn generate_stimulus(&self, case: &CaseConfig) -> Result<StimulusSet, ConfigError> {
        let case = self.prepare(case);
        StimulusGenerator::new(self.case_seed(case.case_id)).generate(&case)
    }

    /// Generates stimulus, writes its hex files into `dir` and returns the
    /// case with `hex_files` pointing at them.
    pub fn write_stimulus(&self, case: &CaseConfig, dir: &Path) -> Result<CaseConfig, CaseError> {
        let stimulus = self.generate_stimulus(case)?;
        let mut case = self.prepare(case);
        case.hex_files = stimulus.write_hex_files(dir, case.case_id)?;
        info!(case_id = case.case_id, files = case.hex_files.len(), "Stimulus written");
        Ok(case)
    }

    /// Runs the golden model over a case and renders its output CSV lines.
    ///
    /// The first line is the `cycle,<out>...` header.
    pub fn golden_lines(
        &self,
        case: &CaseConfig,
        stimulus: &StimulusSet,
    ) -> Result<Vec<String>, CaseError> {
        let case = self.prepare(case);
        let mut model = self.build_model(&case)?;

        let model_widths: HashMap<PortName, u64> = model
            .output_ports()
            .into_iter()
            .map(|p| (p.name, p.width))
            .collect();
        let digits = case
            .output_ports
            .iter()
            .map(|port| {
                let width = match model_widths.get(port) {
                    Some(&width) => width,
                    None => case.port_width(port)?,
                };
                Ok(hex_digits(width))
            })
            .collect::<Result<Vec<usize>, ConfigError>>()?;

        let drives_reset = case.has_port(&self.config.reset.port);
        let drives_clock = case.has_port(&self.config.clock_port);

        let mut lines = Vec::with_capacity(case.cycles as usize + 1);
        let mut header = String::from("cycle");
        for port in &case.output_ports {
            header.push(',');
            header.push_str(port);
        }
        lines.push(header);

        for cycle in 0..case.cycles {
            let mut inputs = Inputs::new();
            if drives_reset {
                inputs.insert(
                    self.config.reset.port.clone(),
                    Logic::from(self.config.reset.level_at(cycle)),
                );
            }
            if drives_clock {
                inputs.insert(self.config.clock_port.clone(), Logic::from(1));
            }
            for port in &case.input_ports {
                let vector = stimulus
                    .vector(port)
                    .ok_or_else(|| StimulusError::MissingFile { port: port.clone() })?;
                let value = vector
                    .get(cycle as usize)
                    .ok_or_else(|| StimulusError::MissingToken {
                        port: port.clone(),
                        cycle,
                    })?;
                inputs.insert(port.clone(), value.clone());
            }

            let outputs = model.step(&inputs)?;

            let mut line = cycle.to_string();
            for (port, &width) in case.output_ports.iter().zip(&digits) {
                line.push(',');
                match outputs.get(port) {
                    Some(value) => line.push_str(&value.to_hex(width)),
                    None => line.push_str(&Logic::Unknown.to_hex(width)),
                }
            }
            lines.push(line);
        }

        Ok(lines)
    }

    /// Runs one job's golden model and writes its CSV if requested.
    pub fn golden_for_job(&self, job: &CaseJob) -> Result<Vec<String>, CaseError> {
        let loaded;
        let stimulus = match job.stimulus {
            Some(ref stimulus) => stimulus,
            None => {
                loaded = StimulusSet::from_case(&self.prepare(&job.case))?;
                &loaded
            }
        };

        let lines = self.golden_lines(&job.case, stimulus)?;
        if let Some(ref path) = job.golden_out {
            write_csv(path, &lines).map_err(ConfigError::from)?;
        }
        Ok(lines)
    }

    /// Runs one case end to end and returns its record.
    pub fn run_job(&self, job: &CaseJob) -> ComparisonRecord {
        let case_id = job.case.case_id;
        info!(case_id, cycles = job.case.cycles, "Running case");

        let golden = match self.golden_for_job(job) {
            Ok(lines) => lines,
            Err(err) => {
                warn!(case_id, error = %err, "Case aborted before comparison");
                return ComparisonRecord::failed(case_id, err.into());
            }
        };

        let record = self
            .comparator
            .compare(case_id, Some(golden.as_slice()), job.candidate.as_deref());
        info!(case_id, verdict = %record.verdict, "Case finished");
        record
    }

    /// Runs every job in order.
    pub fn run_jobs(&self, jobs: &[CaseJob]) -> CaseSummary {
        let summary: CaseSummary = jobs.iter().map(|job| self.run_job(job)).collect();
        info!(
            passed = summary.passed(),
            total = summary.total(),
            "Run complete"
        );
        summary
    }

    /// Runs every `config_case*.json` in a results directory.
    ///
    /// Writes `golden_case<id>.csv`, `compare_case<id>.txt` and
    /// `compare_summary.txt` next to the configs.
    ///
    /// A config that fails to load becomes a failed record for its case;
    /// only an unreadable directory fails the whole run.
    pub fn run_dir<P: AsRef<Path>>(&self, dir: P) -> Result<CaseSummary, ConfigError> {
        let dir = dir.as_ref();
        let loaded = load_jobs(dir)?;
        let summary = loaded.with_rejected(self.run_jobs(&loaded.jobs));
        summary.write_reports(dir)?;
        Ok(summary)
    }
}

/// Cases discovered in a results directory.
#[derive(Debug, Default)]
pub struct LoadedCases {
    pub jobs: Vec<CaseJob>,
    /// Failed records for configs that could not be loaded
    pub rejected: Vec<ComparisonRecord>,
}

impl LoadedCases {
    /// Adds the rejected cases to the summary of the jobs that ran.
    pub fn with_rejected(&self, mut summary: CaseSummary) -> CaseSummary {
        for record in &self.rejected {
            summary.push(record.clone());
        }
        summary
    }
}

/// Loads one job per case config found in `dir`.
pub fn load_jobs(dir: &Path) -> Result<LoadedCases, ConfigError> {
    let mut loaded = LoadedCases::default();
    for file in CaseConfig::load_dir(dir)? {
        match file.config {
            Ok(case) => loaded.jobs.push(CaseJob::from_results_dir(case, dir)),
            Err(err) => {
                warn!(case_id = file.file_id, path = %file.path.display(), error = %err, "Case config rejected");
                loaded.rejected.push(ComparisonRecord::failed(
                    file.file_id,
                    CaseFailure::Config(err.to_string()),
                ));
            }
        }
    }
    info!(
        dir = %dir.display(),
        cases = loaded.jobs.len(),
        rejected = loaded.rejected.len(),
        "Loaded case configs"
    );
    Ok(loaded)
}

/// Writes CSV lines with a trailing newline.
pub fn write_csv(path: &Path, lines: &[String]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut text = lines.join("\n");
    text.push('\n');
    fs::write(path, text)
}
