//! x-tolerant comparison of golden and candidate output CSVs.
//!
//! Both sides are cycle-indexed CSV text: a `cycle,...` header followed by
//! one `<cycle>,<hex>` line per cycle. The comparison is strictly fail-fast:
//! the first structural or value violation aborts the case.
//!
//! Digit equivalence is three-valued. Two digits are equivalent when they
//! are equal (ignoring case) or when one is `0` and the other `x`. A line
//! whose digits are all equivalent but not identical passes and is recorded
//! as a tolerant substitution.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

use crate::report::ComparisonRecord;
use crate::types::CaseId;

/// Returns true if two hex digits are equivalent under the 0/x rule.
///
/// Symmetric and reflexive for every input.
pub fn digits_equivalent(c1: char, c2: char) -> bool {
    let (a, b) = (c1.to_ascii_lowercase(), c2.to_ascii_lowercase());
    a == b || matches!((a, b), ('0', 'x') | ('x', '0'))
}

/// Why a comparison failed. Line numbers count the header as line 0.
#[derive(Error, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompareFailure {
    #[error("Missing file")]
    MissingFile,

    #[error("Line count mismatch (golden {golden}, candidate {candidate})")]
    LineCountMismatch { golden: usize, candidate: usize },

    #[error("Header mismatch at line {line}")]
    HeaderMismatch { line: usize },

    #[error("Invalid CSV format at line {line}")]
    FormatMismatch { line: usize },

    #[error("Length mismatch at line {line}")]
    LengthMismatch { line: usize },

    #[error("Mismatch at line {line}")]
    ValueMismatch { line: usize },
}

impl CompareFailure {
    /// Returns true for every failure except a value mismatch.
    pub fn is_structural(&self) -> bool {
        !matches!(self, CompareFailure::ValueMismatch { .. })
    }

    /// Line the failure was detected on, if it is tied to one.
    pub fn line(&self) -> Option<usize> {
        match self {
            CompareFailure::MissingFile | CompareFailure::LineCountMismatch { .. } => None,
            CompareFailure::HeaderMismatch { line }
            | CompareFailure::FormatMismatch { line }
            | CompareFailure::LengthMismatch { line }
            | CompareFailure::ValueMismatch { line } => Some(*line),
        }
    }
}

/// A line that passed only thanks to 0/x tolerance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    pub line: usize,
    pub golden: String,
    pub candidate: String,
}

/// Comparator settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareOptions {
    /// Token both header lines must begin with (matched case-insensitively)
    pub header_token: String,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            header_token: "cycle".to_string(),
        }
    }
}

/// Compares golden output against candidate output.
#[derive(Clone, Debug, Default)]
pub struct Comparator {
    options: CompareOptions,
}

impl Comparator {
    /// Creates a comparator with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a comparator with custom options.
    pub fn with_options(options: CompareOptions) -> Self {
        Self { options }
    }

    /// Comparator options.
    pub fn options(&self) -> &CompareOptions {
        &self.options
    }

    /// Compares one case and folds the outcome into a record.
    ///
    /// `None` on either side means that side's file is missing.
    pub fn compare<S: AsRef<str>>(
        &self,
        case_id: CaseId,
        golden: Option<&[S]>,
        candidate: Option<&[S]>,
    ) -> ComparisonRecord {
        let outcome = match (golden, candidate) {
            (Some(golden), Some(candidate)) => self.compare_lines(golden, candidate),
            _ => Err(CompareFailure::MissingFile),
        };

        match outcome {
            Ok(substitutions) => {
                debug!(case_id, substitutions = substitutions.len(), "Comparison passed");
                ComparisonRecord::pass(case_id, substitutions)
            }
            Err(failure) => {
                warn!(case_id, reason = %failure, "Comparison failed");
                ComparisonRecord::mismatch(case_id, failure)
            }
        }
    }

    /// Reads both files and compares them.
    pub fn compare_files<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        case_id: CaseId,
        golden: P,
        candidate: Q,
    ) -> ComparisonRecord {
        let golden = read_lines(golden);
        let candidate = read_lines(candidate);
        self.compare(case_id, golden.as_deref(), candidate.as_deref())
    }

    /// Runs every check in order and returns the tolerant substitutions.
    pub fn compare_lines<S: AsRef<str>>(
        &self,
        golden: &[S],
        candidate: &[S],
    ) -> Result<Vec<Substitution>, CompareFailure> {
        if golden.len() != candidate.len() {
            return Err(CompareFailure::LineCountMismatch {
                golden: golden.len(),
                candidate: candidate.len(),
            });
        }

        let mut substitutions = Vec::new();
        for (idx, (g, c)) in golden.iter().zip(candidate).enumerate() {
            let (g, c) = (g.as_ref().trim(), c.as_ref().trim());

            if idx == 0 {
                if !self.is_header(g) || !self.is_header(c) {
                    return Err(CompareFailure::HeaderMismatch { line: idx });
                }
                continue;
            }

            let (g_val, c_val) = match (split_value(g), split_value(c)) {
                (Some(g_val), Some(c_val)) => (g_val, c_val),
                _ => return Err(CompareFailure::FormatMismatch { line: idx }),
            };

            if g_val.len() != c_val.len() {
                return Err(CompareFailure::LengthMismatch { line: idx });
            }

            if !g_val
                .chars()
                .zip(c_val.chars())
                .all(|(a, b)| digits_equivalent(a, b))
            {
                return Err(CompareFailure::ValueMismatch { line: idx });
            }

            if g_val != c_val {
                substitutions.push(Substitution {
                    line: idx,
                    golden: g_val.to_string(),
                    candidate: c_val.to_string(),
                });
            }
        }

        Ok(substitutions)
    }

    fn is_header(&self, line: &str) -> bool {
        line.to_ascii_lowercase()
            .starts_with(&self.options.header_token.to_ascii_lowercase())
    }
}

/// Splits a data line on its first comma and returns the trimmed value part.
fn split_value(line: &str) -> Option<&str> {
    line.split_once(',').map(|(_, value)| value.trim())
}

/// Reads a CSV file into lines; `None` if it cannot be read.
pub fn read_lines<P: AsRef<Path>>(path: P) -> Option<Vec<String>> {
    fs::read_to_string(path)
        .ok()
        .map(|text| text.lines().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Verdict;

    const HEX: &str = "0123456789abcdefxX";

    fn lines(text: &str) -> Vec<&str> {
        text.lines().collect()
    }

    #[test]
    fn test_digits_equivalent_symmetric_reflexive() {
        for c1 in HEX.chars() {
            assert!(digits_equivalent(c1, c1));
            for c2 in HEX.chars() {
                assert_eq!(digits_equivalent(c1, c2), digits_equivalent(c2, c1));
            }
        }
    }

    #[test]
    fn test_digits_equivalent_rule() {
        assert!(digits_equivalent('0', 'x'));
        assert!(digits_equivalent('X', '0'));
        assert!(digits_equivalent('A', 'a'));
        assert!(!digits_equivalent('1', 'x'));
        assert!(!digits_equivalent('0', '1'));
    }

    #[test]
    fn test_identical_passes_without_substitutions() {
        let g = lines("cycle,o_sum\n0,xx\n1,0a\n2,3f");
        assert!(Comparator::new().compare_lines(&g, &g).unwrap().is_empty());
    }

    #[test]
    fn test_tolerant_substitution_recorded() {
        let g = lines("cycle,o_sum\n0,00\n1,0a");
        let c = lines("cycle,o_sum\n0,xx\n1,xa");
        let subs = Comparator::new().compare_lines(&g, &c).unwrap();
        assert_eq!(
            subs,
            vec![
                Substitution {
                    line: 1,
                    golden: "00".into(),
                    candidate: "xx".into()
                },
                Substitution {
                    line: 2,
                    golden: "0a".into(),
                    candidate: "xa".into()
                },
            ]
        );
    }

    #[test]
    fn test_substitution_keeps_original_case() {
        let g = lines("cycle,o_sum\n0,0A\n1,0a");
        let c = lines("cycle,o_sum\n0,0a\n1,0a");
        let subs = Comparator::new().compare_lines(&g, &c).unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].golden, "0A");
        assert_eq!(subs[0].candidate, "0a");

        let c = lines("cycle,o_sum\n0,XA\n1,0A");
        let subs = Comparator::new().compare_lines(&g, &c).unwrap();
        assert_eq!(
            subs,
            vec![
                Substitution {
                    line: 1,
                    golden: "0A".into(),
                    candidate: "XA".into()
                },
                Substitution {
                    line: 2,
                    golden: "0a".into(),
                    candidate: "0A".into()
                },
            ]
        );
    }

    #[test]
    fn test_line_count_mismatch_first() {
        // The extra line also carries a value mismatch that must never be reached.
        let g = lines("cycle,y\n0,01");
        let c = lines("cycle,y\n0,ff\n1,00");
        assert_eq!(
            Comparator::new().compare_lines(&g, &c),
            Err(CompareFailure::LineCountMismatch {
                golden: 2,
                candidate: 3
            })
        );
    }

    #[test]
    fn test_header_mismatch() {
        let g = lines("cycle,y\n0,01");
        let c = lines("time,y\n0,01");
        assert_eq!(
            Comparator::new().compare_lines(&g, &c),
            Err(CompareFailure::HeaderMismatch { line: 0 })
        );
        let c = lines("CYCLE,y\n0,01");
        assert!(Comparator::new().compare_lines(&g, &c).is_ok());
    }

    #[test]
    fn test_format_and_length_mismatch() {
        let g = lines("cycle,y\n0,01");
        assert_eq!(
            Comparator::new().compare_lines(&g, &lines("cycle,y\n001")),
            Err(CompareFailure::FormatMismatch { line: 1 })
        );
        assert_eq!(
            Comparator::new().compare_lines(&g, &lines("cycle,y\n0,1")),
            Err(CompareFailure::LengthMismatch { line: 1 })
        );
    }

    #[test]
    fn test_value_mismatch_aborts() {
        let g = lines("cycle,y\n0,01\n1,02\n2,03");
        let c = lines("cycle,y\n0,01\n1,12\n2,zz");
        assert_eq!(
            Comparator::new().compare_lines(&g, &c),
            Err(CompareFailure::ValueMismatch { line: 2 })
        );
    }

    #[test]
    fn test_multi_column_split_on_first_comma() {
        let g = lines("cycle,a,b\n0,0a,00");
        let c = lines("cycle,a,b\n0,0a,x0");
        let subs = Comparator::new().compare_lines(&g, &c).unwrap();
        assert_eq!(subs[0].golden, "0a,00");
    }

    #[test]
    fn test_compare_missing_side() {
        let g = lines("cycle,y\n0,01");
        let record = Comparator::new().compare(4, Some(&g[..]), None);
        assert_eq!(record.case_id, 4);
        assert_eq!(record.verdict, Verdict::Fail);
        assert_eq!(record.reason().as_deref(), Some("Missing file"));
    }

    #[test]
    fn test_custom_header_token() {
        let comparator = Comparator::with_options(CompareOptions {
            header_token: "Time".to_string(),
        });
        let g = lines("time,y\n0,01");
        assert!(comparator.compare_lines(&g, &g).is_ok());
    }

    #[test]
    fn test_failure_classification() {
        assert!(CompareFailure::MissingFile.is_structural());
        assert!(!CompareFailure::ValueMismatch { line: 3 }.is_structural());
        assert_eq!(CompareFailure::LengthMismatch { line: 5 }.line(), Some(5));
        assert_eq!(
            CompareFailure::ValueMismatch { line: 7 }.to_string(),
            "Mismatch at line 7"
        );
    }
}
