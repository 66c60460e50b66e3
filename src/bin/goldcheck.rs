use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

use goldcheck::compare::Comparator;
use goldcheck::config::{CaseConfig, HarnessConfig};
use goldcheck::harness::{case_config_file, golden_csv_file, write_csv, Harness};
use goldcheck::parallel::ParallelHarness;
use goldcheck::registry::ModelKind;
use goldcheck::stimulus::StimulusSet;

/// goldcheck - golden-model equivalence harness
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Harness configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Golden model override (adder_tree, mux, ...)
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate stimulus hex files for one case
    Generate {
        /// Case configuration file
        case: PathBuf,

        /// Output directory for the hex files and the updated case config
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Stimulus seed
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Run the golden model for one case and write its CSV
    Golden {
        /// Case configuration file
        case: PathBuf,

        /// Output CSV (defaults to golden_case<id>.csv next to the config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare a golden CSV against a candidate CSV
    Compare {
        /// Golden CSV
        golden: PathBuf,

        /// Candidate CSV
        candidate: PathBuf,

        /// Case id used in the report
        #[arg(long, default_value_t = 0)]
        case_id: u32,
    },

    /// Run and compare every case in a results directory
    Run {
        /// Results directory holding config_case*.json
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Worker threads (0 = automatic)
        #[arg(short, long)]
        threads: Option<usize>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => HarnessConfig::from_file(path)
            .with_context(|| format!("Failed to load harness config {}", path.display()))?,
        None => HarnessConfig::default(),
    };
    if let Some(ref model) = cli.model {
        config.model = ModelKind::from(model.clone());
    }

    let log_level = match cli.verbose {
        0 => config.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    goldcheck::init_logging(log_level);

    match cli.command {
        Commands::Generate {
            case,
            output,
            seed,
        } => {
            if seed.is_some() {
                config.seed = seed;
            }
            generate(config, &case, &output)?;
        }

        Commands::Golden { case, output } => {
            golden(config, &case, output)?;
        }

        Commands::Compare {
            golden,
            candidate,
            case_id,
        } => {
            let record = Comparator::new().compare_files(case_id, &golden, &candidate);
            print!("{}", record.report());
            if !record.is_pass() {
                bail!("case {} failed", case_id);
            }
        }

        Commands::Run { dir, threads } => {
            if let Some(threads) = threads {
                config.threads = threads;
            }
            let dir = dir
                .or_else(|| config.results_dir.clone())
                .unwrap_or_else(|| PathBuf::from("results"));
            let runner = ParallelHarness::new(Harness::new(config));
            let summary = runner
                .run_dir(&dir)
                .with_context(|| format!("Failed to run cases in {}", dir.display()))?;
            print!("{}", summary.summary());
            if !summary.all_passed() {
                bail!("{} of {} cases failed", summary.failed(), summary.total());
            }
        }
    }

    Ok(())
}

fn load_case(path: &Path) -> Result<CaseConfig> {
    CaseConfig::from_file(path)
        .with_context(|| format!("Failed to load case config {}", path.display()))
}

fn generate(config: HarnessConfig, case_path: &Path, output: &Path) -> Result<()> {
    let case = load_case(case_path)?;
    let harness = Harness::new(config);
    let case = harness
        .write_stimulus(&case, output)
        .with_context(|| format!("Failed to generate stimulus for case {}", case.case_id))?;

    let config_path = output.join(case_config_file(case.case_id));
    case.to_json_file(&config_path)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    info!(case_id = case.case_id, path = %config_path.display(), "Case config updated");
    Ok(())
}

fn golden(config: HarnessConfig, case_path: &Path, output: Option<PathBuf>) -> Result<()> {
    let case = load_case(case_path)?;
    let harness = Harness::new(config);
    let prepared = harness.prepare(&case);

    let stimulus = StimulusSet::from_case(&prepared)
        .with_context(|| format!("Failed to read stimulus for case {}", case.case_id))?;
    let lines = harness
        .golden_lines(&case, &stimulus)
        .with_context(|| format!("Golden run failed for case {}", case.case_id))?;

    let output = output.unwrap_or_else(|| {
        case_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(golden_csv_file(case.case_id))
    });
    write_csv(&output, &lines).with_context(|| format!("Failed to write {}", output.display()))?;
    info!(case_id = case.case_id, path = %output.display(), "Golden CSV written");
    Ok(())
}
