//! Configuration for test cases and for the harness itself.
//!
//! Two documents drive a run:
//!
//! - one [`CaseConfig`] per test case, emitted by the orchestration layer as
//!   `config_case<N>.json` (YAML is accepted too), and
//! - one [`HarnessConfig`] selecting the golden model and the run-wide
//!   conventions (seed, clock/reset names, reset length, logging).
//!
//! # Case File Structure
//!
//! ```yaml
//! case_id: 0
//! cycles: 20
//! params:
//!   INPUT_COUNT: 4
//!   DATA_WIDTH: 4
//! ports:
//!   - { name: clk,    dir: input,  full: "input clk" }
//!   - { name: rst_n,  dir: input,  full: "input rst_n" }
//!   - { name: i_data, dir: input,  full: "input [INPUT_COUNT-1:0][DATA_WIDTH-1:0] i_data" }
//!   - { name: o_sum,  dir: output, full: "output [DATA_WIDTH+$clog2(INPUT_COUNT)-1:0] o_sum" }
//! input_ports: [i_data]
//! output_ports: [o_sum]
//! hex_files:
//!   i_data: results/i_data_case0.hex
//! ```
//!
//! # Harness File Structure
//!
//! ```yaml
//! model: adder_tree
//! seed: 42
//! clock_port: clk
//! reset:
//!   port: rst_n
//!   cycles: 3
//! log_level: info
//! results_dir: results
//! threads: 0
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::registry::ModelKind;
use crate::types::{CaseId, Cycle, Direction, PortName};
use crate::width::WidthEvaluator;

/// Number of leading cycles the reset port is held low.
pub const DEFAULT_RESET_CYCLES: Cycle = 3;

/// Default clock port name.
pub const DEFAULT_CLOCK_PORT: &str = "clk";

/// Default active-low reset port name.
pub const DEFAULT_RESET_PORT: &str = "rst_n";

/// Errors raised while loading or interpreting configuration.
///
/// Any of these is fatal to the case it occurs in and to no other case.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown file format: {0}")]
    UnknownFormat(String),

    #[error("undefined parameter '{0}'")]
    UndefinedParameter(String),

    #[error("expression '{expr}' does not evaluate to an integer")]
    NonInteger { expr: String },

    #[error("invalid expression '{expr}': {message}")]
    Expression { expr: String, message: String },

    #[error("missing required parameter '{0}'")]
    MissingParameter(String),

    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },

    #[error("missing required input '{0}'")]
    MissingInput(String),

    #[error("latency queue used before reset")]
    QueueNotInitialized,

    #[error("no golden model registered as '{0}'")]
    UnknownModel(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// One port as declared by the circuit under test.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortDecl {
    /// Port name, unique within a case
    pub name: PortName,

    /// Port direction
    #[serde(rename = "dir", alias = "direction")]
    pub direction: Direction,

    /// Raw declaration text carrying the bracketed ranges
    #[serde(rename = "full", alias = "decl", default)]
    pub decl: String,
}

impl PortDecl {
    /// Creates a port declaration.
    pub fn new(name: impl Into<String>, direction: Direction, decl: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction,
            decl: decl.into(),
        }
    }
}

/// A port with its width resolved against the case parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedPort {
    pub name: PortName,
    pub direction: Direction,
    /// Total bit width (always >= 1)
    pub width: u64,
}

/// One case config file found in a results directory.
#[derive(Debug)]
pub struct CaseFile {
    pub path: PathBuf,
    /// Id encoded in the file name
    pub file_id: CaseId,
    pub config: ConfigResult<CaseConfig>,
}

impl CaseFile {
    /// The loaded config's id, or the file-name id when loading failed.
    pub fn case_id(&self) -> CaseId {
        match self.config {
            Ok(ref case) => case.case_id,
            Err(_) => self.file_id,
        }
    }
}

/// Parses the id out of a `config_case<id>.json` file name.
pub fn case_id_from_file_name(name: &str) -> Option<CaseId> {
    name.strip_prefix("config_case")?
        .strip_suffix(".json")?
        .parse()
        .ok()
}

/// Configuration of a single test case.
///
/// Created once by the orchestration layer before any execution and never
/// mutated afterwards.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CaseConfig {
    /// Unique case identifier
    pub case_id: CaseId,

    /// Number of clock cycles simulated
    pub cycles: Cycle,

    /// Parameter name -> integer value
    #[serde(default)]
    pub params: BTreeMap<String, i64>,

    /// Declared ports in declaration order
    #[serde(default)]
    pub ports: Vec<PortDecl>,

    /// Data input ports (clock and reset excluded)
    #[serde(default)]
    pub input_ports: Vec<PortName>,

    /// Observed output ports, in CSV column order
    #[serde(default)]
    pub output_ports: Vec<PortName>,

    /// Input port -> stimulus hex file
    #[serde(default)]
    pub hex_files: BTreeMap<PortName, PathBuf>,
}

impl CaseConfig {
    /// Creates an empty case with the given id and cycle count.
    pub fn new(case_id: CaseId, cycles: Cycle) -> Self {
        Self {
            case_id,
            cycles,
            params: BTreeMap::new(),
            ports: Vec::new(),
            input_ports: Vec::new(),
            output_ports: Vec::new(),
            hex_files: BTreeMap::new(),
        }
    }

    /// Adds a parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: i64) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    /// Adds a port declaration.
    pub fn with_port(mut self, port: PortDecl) -> Self {
        self.ports.push(port);
        self
    }

    /// Loads a case from a YAML string.
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        let config: CaseConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a case from a JSON string.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: CaseConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a case from a file, auto-detecting the format.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match extension_of(path).as_str() {
            "yaml" | "yml" => Self::from_yaml(&content),
            "json" => Self::from_json(&content),
            ext => Err(ConfigError::UnknownFormat(ext.to_string())),
        }
    }

    /// Loads every `config_case<id>.json` in `dir`, sorted by case id.
    ///
    /// Only an unreadable directory fails the call. Each file keeps its own
    /// load result so one malformed case cannot hide the others.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> ConfigResult<Vec<CaseFile>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let file_id = match path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(case_id_from_file_name)
            {
                Some(id) => id,
                None => continue,
            };
            let config = Self::from_file(&path);
            files.push(CaseFile {
                path,
                file_id,
                config,
            });
        }
        files.sort_by_key(CaseFile::case_id);
        Ok(files)
    }

    /// Saves the case as pretty JSON.
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Converts to a JSON string.
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Fills in `input_ports` / `output_ports` from `ports` when they are empty.
    ///
    /// Derived inputs exclude the clock and reset ports, which the harness
    /// drives itself.
    pub fn normalized(mut self, clock_port: &str, reset_port: &str) -> Self {
        if self.input_ports.is_empty() {
            self.input_ports = self
                .ports
                .iter()
                .filter(|p| p.direction.is_input() && p.name != clock_port && p.name != reset_port)
                .map(|p| p.name.clone())
                .collect();
        }
        if self.output_ports.is_empty() {
            self.output_ports = self
                .ports
                .iter()
                .filter(|p| p.direction.is_output())
                .map(|p| p.name.clone())
                .collect();
        }
        self
    }

    /// Validates the case configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.cycles == 0 {
            return Err(ConfigError::Validation(format!(
                "Case {} has no cycles to simulate",
                self.case_id
            )));
        }

        let mut names = HashSet::new();
        for port in &self.ports {
            if !names.insert(port.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "Case {} declares port '{}' twice",
                    self.case_id, port.name
                )));
            }
        }

        // Port lists may name ports the case does not declare only when no
        // declarations were given at all.
        if !self.ports.is_empty() {
            for name in self.input_ports.iter().chain(&self.output_ports) {
                if !names.contains(name.as_str()) {
                    return Err(ConfigError::Validation(format!(
                        "Case {} lists undeclared port '{}'",
                        self.case_id, name
                    )));
                }
            }
        }

        for port in self.hex_files.keys() {
            if !self.input_ports.contains(port) {
                return Err(ConfigError::Validation(format!(
                    "Case {} has a stimulus file for non-input port '{}'",
                    self.case_id, port
                )));
            }
        }

        Ok(())
    }

    /// Returns true if a port of that name is declared.
    pub fn has_port(&self, name: &str) -> bool {
        self.ports.iter().any(|p| p.name == name)
    }

    /// Finds a port declaration by name.
    pub fn find_port(&self, name: &str) -> Option<&PortDecl> {
        self.ports.iter().find(|p| p.name == name)
    }

    /// Resolves the width of one declared port.
    pub fn port_width(&self, name: &str) -> ConfigResult<u64> {
        let port = self
            .find_port(name)
            .ok_or_else(|| ConfigError::Validation(format!("undeclared port '{}'", name)))?;
        WidthEvaluator::new(&self.params).port_width(&port.decl)
    }

    /// Resolves every declared port's width.
    pub fn resolve_ports(&self) -> ConfigResult<Vec<ResolvedPort>> {
        let eval = WidthEvaluator::new(&self.params);
        self.ports
            .iter()
            .map(|p| {
                Ok(ResolvedPort {
                    name: p.name.clone(),
                    direction: p.direction,
                    width: eval.port_width(&p.decl)?,
                })
            })
            .collect()
    }
}

/// Reset sequencing shared by the testbench and the golden model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetConvention {
    /// Active-low reset port name
    #[serde(default = "default_reset_port")]
    pub port: PortName,

    /// Number of leading cycles with the reset asserted (port driven low)
    #[serde(default = "default_reset_cycles")]
    pub cycles: Cycle,
}

impl ResetConvention {
    /// Returns the reset port level for `cycle`: 0 while in reset, 1 afterwards.
    pub fn level_at(&self, cycle: Cycle) -> u64 {
        if cycle < self.cycles {
            0
        } else {
            1
        }
    }
}

impl Default for ResetConvention {
    fn default() -> Self {
        Self {
            port: default_reset_port(),
            cycles: default_reset_cycles(),
        }
    }
}

fn default_reset_port() -> PortName {
    DEFAULT_RESET_PORT.to_string()
}

fn default_reset_cycles() -> Cycle {
    DEFAULT_RESET_CYCLES
}

fn default_clock_port() -> PortName {
    DEFAULT_CLOCK_PORT.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Run-wide harness settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Golden model to instantiate for every case
    #[serde(default)]
    pub model: ModelKind,

    /// Stimulus seed; `None` draws from OS entropy
    #[serde(default)]
    pub seed: Option<u64>,

    /// Clock port name
    #[serde(default = "default_clock_port")]
    pub clock_port: PortName,

    /// Reset convention
    #[serde(default)]
    pub reset: ResetConvention,

    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Directory holding case configs, stimulus and outputs
    #[serde(default)]
    pub results_dir: Option<PathBuf>,

    /// Worker threads for parallel case execution (0 = automatic)
    #[serde(default)]
    pub threads: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            model: ModelKind::default(),
            seed: None,
            clock_port: default_clock_port(),
            reset: ResetConvention::default(),
            log_level: default_log_level(),
            results_dir: None,
            threads: 0,
        }
    }
}

impl HarnessConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        let config: HarnessConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a JSON string.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: HarnessConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a file, auto-detecting the format.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match extension_of(path).as_str() {
            "yaml" | "yml" => Self::from_yaml(&content),
            "json" => Self::from_json(&content),
            ext => Err(ConfigError::UnknownFormat(ext.to_string())),
        }
    }

    /// Converts to a YAML string.
    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.clock_port.is_empty() || self.reset.port.is_empty() {
            return Err(ConfigError::Validation(
                "clock and reset port names must not be empty".to_string(),
            ));
        }
        if self.clock_port == self.reset.port {
            return Err(ConfigError::Validation(format!(
                "clock and reset share the port name '{}'",
                self.clock_port
            )));
        }
        Ok(())
    }
}

/// Builder for creating a `HarnessConfig` programmatically.
#[derive(Default)]
pub struct HarnessConfigBuilder {
    config: HarnessConfig,
}

impl HarnessConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the golden model.
    pub fn model(mut self, kind: ModelKind) -> Self {
        self.config.model = kind;
        self
    }

    /// Sets the stimulus seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Sets the clock port name.
    pub fn clock_port(mut self, name: impl Into<String>) -> Self {
        self.config.clock_port = name.into();
        self
    }

    /// Sets the reset port name and its asserted cycle count.
    pub fn reset(mut self, port: impl Into<String>, cycles: Cycle) -> Self {
        self.config.reset = ResetConvention {
            port: port.into(),
            cycles,
        };
        self
    }

    /// Sets the log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.log_level = level.into();
        self
    }

    /// Sets the results directory.
    pub fn results_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.results_dir = Some(dir.into());
        self
    }

    /// Sets the worker thread count.
    pub fn threads(mut self, threads: usize) -> Self {
        self.config.threads = threads;
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> ConfigResult<HarnessConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CASE_JSON: &str = r#"{
        "case_id": 3,
        "cycles": 20,
        "params": {"INPUT_COUNT": 4, "DATA_WIDTH": 4},
        "ports": [
            {"name": "clk", "dir": "input", "full": "input clk"},
            {"name": "rst_n", "dir": "input", "full": "input rst_n"},
            {"name": "i_data", "dir": "input", "full": "input [INPUT_COUNT-1:0][DATA_WIDTH-1:0] i_data"},
            {"name": "o_sum", "dir": "output", "full": "output [DATA_WIDTH+$clog2(INPUT_COUNT)-1:0] o_sum"}
        ],
        "input_ports": ["i_data"],
        "output_ports": ["o_sum"],
        "hex_files": {"i_data": "results/i_data_case3.hex"}
    }"#;

    #[test]
    fn test_case_json_parsing() {
        let case = CaseConfig::from_json(CASE_JSON).unwrap();
        assert_eq!(case.case_id, 3);
        assert_eq!(case.cycles, 20);
        assert_eq!(case.params["DATA_WIDTH"], 4);
        assert_eq!(case.ports.len(), 4);
        assert_eq!(case.ports[2].direction, Direction::Input);
        assert_eq!(case.hex_files["i_data"], PathBuf::from("results/i_data_case3.hex"));
    }

    #[test]
    fn test_resolve_ports() {
        let case = CaseConfig::from_json(CASE_JSON).unwrap();
        let ports = case.resolve_ports().unwrap();
        let widths: Vec<u64> = ports.iter().map(|p| p.width).collect();
        assert_eq!(widths, vec![1, 1, 16, 6]);
        assert_eq!(case.port_width("o_sum").unwrap(), 6);
        assert!(case.port_width("missing").is_err());
    }

    #[test]
    fn test_case_yaml_parsing() {
        let yaml = r#"
case_id: 1
cycles: 8
params:
  INPUT_COUNT: 2
  DATA_WIDTH: 8
ports:
  - { name: data_in, direction: input, decl: "input [INPUT_COUNT*DATA_WIDTH-1:0] data_in" }
  - { name: sel, dir: input, full: "input [0:0] sel" }
  - { name: data_out, dir: output, full: "output [DATA_WIDTH-1:0] data_out" }
"#;
        let case = CaseConfig::from_yaml(yaml).unwrap().normalized("clk", "rst_n");
        assert_eq!(case.input_ports, vec!["data_in", "sel"]);
        assert_eq!(case.output_ports, vec!["data_out"]);
        assert_eq!(case.port_width("data_in").unwrap(), 16);
    }

    #[test]
    fn test_normalized_excludes_clock_and_reset() {
        let case = CaseConfig::new(0, 4)
            .with_port(PortDecl::new("clk", Direction::Input, "input clk"))
            .with_port(PortDecl::new("rst_n", Direction::Input, "input rst_n"))
            .with_port(PortDecl::new("a", Direction::Input, "input [3:0] a"))
            .with_port(PortDecl::new("y", Direction::Output, "output [3:0] y"))
            .normalized("clk", "rst_n");
        assert_eq!(case.input_ports, vec!["a"]);
        assert_eq!(case.output_ports, vec!["y"]);
    }

    #[test]
    fn test_validation_zero_cycles() {
        let json = r#"{"case_id": 0, "cycles": 0}"#;
        assert!(matches!(CaseConfig::from_json(json), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validation_duplicate_port() {
        let json = r#"{"case_id": 0, "cycles": 1, "ports": [
            {"name": "a", "dir": "input", "full": ""},
            {"name": "a", "dir": "output", "full": ""}
        ]}"#;
        assert!(CaseConfig::from_json(json).is_err());
    }

    #[test]
    fn test_validation_hex_file_for_output() {
        let json = r#"{"case_id": 0, "cycles": 1,
            "ports": [{"name": "y", "dir": "output", "full": ""}],
            "output_ports": ["y"],
            "hex_files": {"y": "y.hex"}}"#;
        assert!(CaseConfig::from_json(json).is_err());
    }

    #[test]
    fn test_unknown_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("case.toml");
        std::fs::write(&path, "case_id = 0").unwrap();
        let result = CaseConfig::from_file(&path);
        assert!(matches!(result, Err(ConfigError::UnknownFormat(ref ext)) if ext == "toml"));
    }

    #[test]
    fn test_case_id_from_file_name() {
        assert_eq!(case_id_from_file_name("config_case0.json"), Some(0));
        assert_eq!(case_id_from_file_name("config_case17.json"), Some(17));
        assert_eq!(case_id_from_file_name("config_case.json"), None);
        assert_eq!(case_id_from_file_name("config_case_old.json"), None);
        assert_eq!(case_id_from_file_name("config_case3.yaml"), None);
    }

    #[test]
    fn test_load_dir_keeps_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        CaseConfig::new(2, 4)
            .to_json_file(dir.path().join("config_case2.json"))
            .unwrap();
        std::fs::write(dir.path().join("config_case0.json"), r#"{"case_id": 0, "cycles": 0}"#)
            .unwrap();
        std::fs::write(dir.path().join("config_case1.json"), "{ not json").unwrap();
        std::fs::write(dir.path().join("notes.json"), "{}").unwrap();

        let files = CaseConfig::load_dir(dir.path()).unwrap();
        let ids: Vec<CaseId> = files.iter().map(CaseFile::case_id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert!(matches!(files[0].config, Err(ConfigError::Validation(_))));
        assert!(matches!(files[1].config, Err(ConfigError::Json(_))));
        assert_eq!(files[2].config.as_ref().unwrap().cycles, 4);
    }

    #[test]
    fn test_harness_defaults() {
        let config = HarnessConfig::new();
        assert_eq!(config.clock_port, "clk");
        assert_eq!(config.reset.port, "rst_n");
        assert_eq!(config.reset.cycles, DEFAULT_RESET_CYCLES);
        assert_eq!(config.seed, None);
        assert_eq!(config.model, ModelKind::AdderTree);
    }

    #[test]
    fn test_harness_yaml_parsing() {
        let yaml = r#"
model: mux
seed: 7
reset:
  cycles: 5
"#;
        let config = HarnessConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.model, ModelKind::Mux);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.reset.port, "rst_n");
        assert_eq!(config.reset.cycles, 5);
    }

    #[test]
    fn test_harness_builder() {
        let config = HarnessConfigBuilder::new()
            .model(ModelKind::Mux)
            .seed(11)
            .reset("rstn", 2)
            .threads(4)
            .build()
            .unwrap();
        assert_eq!(config.reset.port, "rstn");
        assert_eq!(config.threads, 4);

        let bad = HarnessConfigBuilder::new().clock_port("rst_n").build();
        assert!(bad.is_err());
    }

    #[test]
    fn test_reset_levels() {
        let reset = ResetConvention::default();
        let levels: Vec<u64> = (0..5).map(|c| reset.level_at(c)).collect();
        assert_eq!(levels, vec![0, 0, 0, 1, 1]);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let config = HarnessConfigBuilder::new().seed(99).build().unwrap();
        let yaml = config.to_yaml().unwrap();
        let restored = HarnessConfig::from_yaml(&yaml).unwrap();
        assert_eq!(restored.seed, Some(99));
        assert_eq!(restored.reset, config.reset);
    }
}
