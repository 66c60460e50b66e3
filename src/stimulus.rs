//! Seeded stimulus generation and stimulus hex files.
//!
//! The generator draws, for every data input port of a case, one value per
//! cycle uniformly from `[0, 2^width)`. Clock and reset ports are skipped;
//! the harness drives those itself from the [`ResetConvention`].
//!
//! Stimulus travels between the generator, the golden run and the external
//! simulator as one hex file per port: one token per line, zero-padded to
//! `ceil(width / 4)` characters. An empty line or an all-`x` token is the
//! unknown marker.
//!
//! [`ResetConvention`]: crate::config::ResetConvention

use num_bigint::RandBigInt;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::config::{CaseConfig, ConfigError};
use crate::logic::{hex_digits, Logic};
use crate::types::{CaseId, Cycle, PortName};

/// Errors raised while reading stimulus.
#[derive(Error, Debug)]
pub enum StimulusError {
    #[error("no stimulus file for input port '{port}'")]
    MissingFile { port: PortName },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stimulus for '{port}' ends before cycle {cycle}")]
    MissingToken { port: PortName, cycle: Cycle },

    #[error("malformed stimulus token '{token}' for '{port}' at line {line}")]
    MalformedToken {
        port: PortName,
        line: usize,
        token: String,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Materialized stimulus of one case: per input port, one value per cycle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StimulusSet {
    vectors: BTreeMap<PortName, Vec<Logic>>,
    widths: BTreeMap<PortName, u64>,
}

impl StimulusSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces one port's vector.
    pub fn insert(&mut self, port: impl Into<String>, width: u64, values: Vec<Logic>) {
        let port = port.into();
        self.widths.insert(port.clone(), width);
        self.vectors.insert(port, values);
    }

    /// The vector of one port.
    pub fn vector(&self, port: &str) -> Option<&[Logic]> {
        self.vectors.get(port).map(Vec::as_slice)
    }

    /// The bit width recorded for one port.
    pub fn width(&self, port: &str) -> Option<u64> {
        self.widths.get(port).copied()
    }

    /// Value of `port` at `cycle`.
    pub fn value(&self, port: &str, cycle: Cycle) -> Option<&Logic> {
        self.vectors.get(port)?.get(cycle as usize)
    }

    /// Port names in sorted order.
    pub fn ports(&self) -> impl Iterator<Item = &PortName> {
        self.vectors.keys()
    }

    /// Number of ports.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Returns true if no port has stimulus.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Renders one port's vector as zero-padded hex lines.
    pub fn to_hex_lines(&self, port: &str) -> Option<Vec<String>> {
        let digits = hex_digits(self.width(port)?);
        Some(self.vectors.get(port)?.iter().map(|v| v.to_hex(digits)).collect())
    }

    /// Writes `<port>_case<id>.hex` for every port into `dir`.
    ///
    /// Returns the port -> path map suitable for `CaseConfig::hex_files`.
    pub fn write_hex_files<P: AsRef<Path>>(
        &self,
        dir: P,
        case_id: CaseId,
    ) -> Result<BTreeMap<PortName, PathBuf>, StimulusError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let mut files = BTreeMap::new();
        for port in self.vectors.keys() {
            let path = dir.join(format!("{}_case{}.hex", port, case_id));
            let mut text = self.to_hex_lines(port).unwrap_or_default().join("\n");
            text.push('\n');
            fs::write(&path, text)?;
            files.insert(port.clone(), path);
        }
        debug!(case_id, ports = files.len(), "Wrote stimulus files");
        Ok(files)
    }

    /// Parses `cycles` tokens of one port from stimulus file text.
    ///
    /// Extra trailing lines are ignored.
    pub fn parse_hex_lines(
        port: &str,
        text: &str,
        cycles: Cycle,
    ) -> Result<Vec<Logic>, StimulusError> {
        let mut lines = text.lines();
        (0..cycles)
            .map(|cycle| {
                let token = lines.next().ok_or_else(|| StimulusError::MissingToken {
                    port: port.to_string(),
                    cycle,
                })?;
                Logic::from_hex_token(token).ok_or_else(|| StimulusError::MalformedToken {
                    port: port.to_string(),
                    line: cycle as usize + 1,
                    token: token.trim().to_string(),
                })
            })
            .collect()
    }

    /// Reads every data input port of `case` from its stimulus file.
    ///
    /// Declared ports take their declared width, and a declaration that
    /// fails to evaluate is an error. Undeclared ports get the narrowest
    /// width that holds every value read.
    pub fn from_case(case: &CaseConfig) -> Result<Self, StimulusError> {
        let mut set = Self::new();
        for port in &case.input_ports {
            let path = case
                .hex_files
                .get(port)
                .ok_or_else(|| StimulusError::MissingFile { port: port.clone() })?;
            let text = fs::read_to_string(path)?;
            let values = Self::parse_hex_lines(port, &text, case.cycles)?;
            let width = match case.find_port(port) {
                Some(_) => case.port_width(port)?,
                None => inferred_width(&values),
            };
            set.insert(port.clone(), width, values);
        }
        Ok(set)
    }
}

/// Smallest width that holds every known value (at least 1 bit).
fn inferred_width(values: &[Logic]) -> u64 {
    values
        .iter()
        .filter_map(Logic::as_known)
        .map(|v| v.bits())
        .max()
        .unwrap_or(0)
        .max(1)
}

/// Draws stimulus from an explicit, optionally seeded, random source.
///
/// # Example
///
/// ```rust
/// use goldcheck::stimulus::StimulusGenerator;
/// use goldcheck::config::{CaseConfig, PortDecl};
/// use goldcheck::types::Direction;
///
/// let case = CaseConfig::new(0, 8)
///     .with_param("W", 12)
///     .with_port(PortDecl::new("a", Direction::Input, "input [W-1:0] a"));
/// let case = case.normalized("clk", "rst_n");
///
/// let first = StimulusGenerator::new(Some(7)).generate(&case).unwrap();
/// let again = StimulusGenerator::new(Some(7)).generate(&case).unwrap();
/// assert_eq!(first, again);
/// assert_eq!(first.to_hex_lines("a").unwrap()[0].len(), 3);
/// ```
#[derive(Debug)]
pub struct StimulusGenerator {
    rng: StdRng,
}

impl StimulusGenerator {
    /// Creates a generator; `None` seeds from OS entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Draws one uniform value of `width` bits.
    pub fn draw(&mut self, width: u64) -> Logic {
        Logic::Known(self.rng.gen_biguint(width))
    }

    /// Generates `cycles` values for every data input port of `case`.
    ///
    /// Ports are visited in `input_ports` order so a given seed always maps
    /// to the same vectors.
    pub fn generate(&mut self, case: &CaseConfig) -> Result<StimulusSet, ConfigError> {
        let mut set = StimulusSet::new();
        for port in &case.input_ports {
            let width = case.port_width(port)?;
            let values = (0..case.cycles).map(|_| self.draw(width)).collect();
            set.insert(port.clone(), width, values);
        }
        debug!(
            case_id = case.case_id,
            ports = set.len(),
            cycles = case.cycles,
            "Generated stimulus"
        );
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PortDecl;
    use crate::types::Direction;
    use num_bigint::BigUint;

    fn tree_case(cycles: Cycle) -> CaseConfig {
        CaseConfig::new(0, cycles)
            .with_param("INPUT_COUNT", 4)
            .with_param("DATA_WIDTH", 4)
            .with_port(PortDecl::new("clk", Direction::Input, "input clk"))
            .with_port(PortDecl::new("rst_n", Direction::Input, "input rst_n"))
            .with_port(PortDecl::new(
                "i_data",
                Direction::Input,
                "input [INPUT_COUNT-1:0][DATA_WIDTH-1:0] i_data",
            ))
            .with_port(PortDecl::new("o_sum", Direction::Output, "output [5:0] o_sum"))
            .normalized("clk", "rst_n")
    }

    #[test]
    fn test_generate_skips_clock_and_reset() {
        let set = StimulusGenerator::new(Some(1)).generate(&tree_case(5)).unwrap();
        assert_eq!(set.ports().collect::<Vec<_>>(), vec!["i_data"]);
        assert_eq!(set.vector("i_data").unwrap().len(), 5);
        assert_eq!(set.width("i_data"), Some(16));
    }

    #[test]
    fn test_values_within_width() {
        let set = StimulusGenerator::new(Some(3)).generate(&tree_case(200)).unwrap();
        let limit = BigUint::from(1u32) << 16u32;
        for value in set.vector("i_data").unwrap() {
            assert!(value.as_known().unwrap() < &limit);
        }
        for line in set.to_hex_lines("i_data").unwrap() {
            assert_eq!(line.len(), 4);
        }
    }

    #[test]
    fn test_seed_reproducible() {
        let a = StimulusGenerator::new(Some(42)).generate(&tree_case(16)).unwrap();
        let b = StimulusGenerator::new(Some(42)).generate(&tree_case(16)).unwrap();
        let c = StimulusGenerator::new(Some(43)).generate(&tree_case(16)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_generate_undefined_parameter() {
        let case = CaseConfig::new(0, 2)
            .with_port(PortDecl::new("a", Direction::Input, "input [N-1:0] a"))
            .normalized("clk", "rst_n");
        let err = StimulusGenerator::new(Some(0)).generate(&case).unwrap_err();
        assert!(matches!(err, ConfigError::UndefinedParameter(ref p) if p == "N"));
    }

    #[test]
    fn test_parse_hex_lines() {
        let values = StimulusSet::parse_hex_lines("a", "0a\nxx\n\nFF\n", 4).unwrap();
        assert_eq!(
            values,
            vec![Logic::from(10), Logic::Unknown, Logic::Unknown, Logic::from(255)]
        );
    }

    #[test]
    fn test_parse_hex_lines_errors() {
        let err = StimulusSet::parse_hex_lines("a", "01\n02\n", 3).unwrap_err();
        assert!(matches!(err, StimulusError::MissingToken { cycle: 2, .. }));

        let err = StimulusSet::parse_hex_lines("a", "01\nzz\n", 2).unwrap_err();
        assert!(matches!(err, StimulusError::MalformedToken { line: 2, .. }));
    }

    #[test]
    fn test_missing_file() {
        let case = tree_case(2);
        let err = StimulusSet::from_case(&case).unwrap_err();
        assert!(matches!(err, StimulusError::MissingFile { ref port } if port == "i_data"));
    }

    #[test]
    fn test_from_case_width_errors_propagate() {
        let dir = tempfile::tempdir().unwrap();
        let hex = dir.path().join("a_case0.hex");
        fs::write(&hex, "01\n02\n").unwrap();

        let mut case = CaseConfig::new(0, 2)
            .with_port(PortDecl::new("a", Direction::Input, "input [N-1:0] a"))
            .normalized("clk", "rst_n");
        case.hex_files.insert("a".to_string(), hex.clone());
        let err = StimulusSet::from_case(&case).unwrap_err();
        assert!(matches!(
            err,
            StimulusError::Config(ConfigError::UndefinedParameter(ref p)) if p == "N"
        ));

        // No declaration at all: the width comes from the values.
        let mut case = CaseConfig::new(0, 2);
        case.input_ports.push("a".to_string());
        case.hex_files.insert("a".to_string(), hex);
        let set = StimulusSet::from_case(&case).unwrap();
        assert_eq!(set.width("a"), Some(2));
    }

    #[test]
    fn test_inferred_width() {
        assert_eq!(inferred_width(&[Logic::Unknown]), 1);
        assert_eq!(inferred_width(&[Logic::from(3), Logic::from(0x100)]), 9);
    }
}
