//! Per-case comparison records and the run summary.
//!
//! Every case ends in exactly one [`ComparisonRecord`], whether it failed
//! while loading its configuration, while reading stimulus, or in the
//! comparison itself. The [`CaseSummary`] folds those records and exports
//! them as text reports, JSON or CSV.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::compare::{CompareFailure, Substitution};
use crate::types::CaseId;

/// File name of the summary report.
pub const SUMMARY_FILE: &str = "compare_summary.txt";

/// File name of one case's report.
pub fn case_report_file(case_id: CaseId) -> String {
    format!("compare_case{}.txt", case_id)
}

/// Outcome of one case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "PASS"),
            Verdict::Fail => write!(f, "FAIL"),
        }
    }
}

/// Why a case failed.
///
/// Configuration and stimulus errors are kept as their rendered message so
/// records stay cloneable and serializable.
#[derive(Error, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum CaseFailure {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Stimulus error: {0}")]
    Stimulus(String),

    #[error(transparent)]
    Mismatch(#[from] CompareFailure),
}

/// Result of one case.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonRecord {
    pub case_id: CaseId,
    pub verdict: Verdict,
    /// Present exactly when the verdict is `Fail`
    pub failure: Option<CaseFailure>,
    /// Tolerant substitutions; only ever non-empty on a pass
    pub substitutions: Vec<Substitution>,
}

impl ComparisonRecord {
    /// A passing record.
    pub fn pass(case_id: CaseId, substitutions: Vec<Substitution>) -> Self {
        Self {
            case_id,
            verdict: Verdict::Pass,
            failure: None,
            substitutions,
        }
    }

    /// A failing record.
    pub fn failed(case_id: CaseId, failure: CaseFailure) -> Self {
        Self {
            case_id,
            verdict: Verdict::Fail,
            failure: Some(failure),
            substitutions: Vec::new(),
        }
    }

    /// A record failed by the comparator.
    pub fn mismatch(case_id: CaseId, failure: CompareFailure) -> Self {
        Self::failed(case_id, CaseFailure::Mismatch(failure))
    }

    /// Returns true if the case passed.
    pub fn is_pass(&self) -> bool {
        self.verdict == Verdict::Pass
    }

    /// Human-readable failure reason.
    pub fn reason(&self) -> Option<String> {
        self.failure.as_ref().map(ToString::to_string)
    }

    /// Number of tolerant substitutions.
    pub fn substitution_count(&self) -> usize {
        self.substitutions.len()
    }

    /// Writes the per-case report.
    pub fn write_report<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        writeln!(w, "=== Compare Result for CASE {} ===", self.case_id)?;
        writeln!(w)?;

        if let Some(ref failure) = self.failure {
            writeln!(w, "[FAIL] {}", failure)?;
            return Ok(());
        }

        writeln!(w, "[PASS] Golden and candidate outputs are equivalent (0/x tolerant)")?;
        writeln!(w)?;
        if self.substitutions.is_empty() {
            writeln!(w, "No 0/x substitutions.")?;
        } else {
            writeln!(w, "0/x substitutions:")?;
            for sub in &self.substitutions {
                writeln!(
                    w,
                    "  line {}: golden={}, candidate={}",
                    sub.line, sub.golden, sub.candidate
                )?;
            }
        }
        Ok(())
    }

    /// Returns the per-case report as a string.
    pub fn report(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_report(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Writes `compare_case<id>.txt` into `dir` and returns its path.
    pub fn write_report_file<P: AsRef<Path>>(&self, dir: P) -> std::io::Result<PathBuf> {
        let path = dir.as_ref().join(case_report_file(self.case_id));
        std::fs::write(&path, self.report())?;
        Ok(path)
    }
}

/// One summary line: `CASE <id>: PASS (...)` or `CASE <id>: FAIL - <reason>`.
impl fmt::Display for ComparisonRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.failure {
            None => write!(
                f,
                "CASE {}: PASS (0/x substitutions: {})",
                self.case_id,
                self.substitutions.len()
            ),
            Some(ref failure) => write!(f, "CASE {}: FAIL - {}", self.case_id, failure),
        }
    }
}

/// Aggregate of every case in a run, ordered by case id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseSummary {
    records: Vec<ComparisonRecord>,
}

impl CaseSummary {
    /// Creates an empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a summary, sorting the records by case id.
    pub fn from_records(mut records: Vec<ComparisonRecord>) -> Self {
        records.sort_by_key(|r| r.case_id);
        Self { records }
    }

    /// Adds a record, keeping case-id order.
    pub fn push(&mut self, record: ComparisonRecord) {
        let at = self.records.partition_point(|r| r.case_id <= record.case_id);
        self.records.insert(at, record);
    }

    /// All records.
    pub fn records(&self) -> &[ComparisonRecord] {
        &self.records
    }

    /// Looks up one case.
    pub fn get(&self, case_id: CaseId) -> Option<&ComparisonRecord> {
        self.records.iter().find(|r| r.case_id == case_id)
    }

    /// Number of passing cases.
    pub fn passed(&self) -> usize {
        self.records.iter().filter(|r| r.is_pass()).count()
    }

    /// Number of failing cases.
    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    /// Number of cases.
    pub fn total(&self) -> usize {
        self.records.len()
    }

    /// Returns true if every case passed.
    pub fn all_passed(&self) -> bool {
        self.records.iter().all(ComparisonRecord::is_pass)
    }

    /// Tolerant substitutions summed over all cases.
    pub fn total_substitutions(&self) -> usize {
        self.records.iter().map(ComparisonRecord::substitution_count).sum()
    }

    /// Writes the human-readable summary.
    pub fn write_summary<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        write!(w, "{}", self)
    }

    /// Returns the summary as a string.
    pub fn summary(&self) -> String {
        self.to_string()
    }

    /// Writes `compare_summary.txt` into `dir` and returns its path.
    pub fn write_summary_file<P: AsRef<Path>>(&self, dir: P) -> std::io::Result<PathBuf> {
        let path = dir.as_ref().join(SUMMARY_FILE);
        std::fs::write(&path, self.summary())?;
        Ok(path)
    }

    /// Writes every per-case report plus the summary into `dir`.
    pub fn write_reports<P: AsRef<Path>>(&self, dir: P) -> std::io::Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        for record in &self.records {
            record.write_report_file(dir)?;
        }
        self.write_summary_file(dir)?;
        Ok(())
    }

    /// Exports the summary to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&serde_json::json!({
            "passed": self.passed(),
            "total": self.total(),
            "records": self.records,
        }))
    }

    /// Exports the summary to a JSON file.
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = self
            .to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }

    /// Exports one row per case to CSV.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();
        csv.push_str("case_id,verdict,substitutions,reason\n");
        for record in &self.records {
            csv.push_str(&format!(
                "{},{},{},{}\n",
                record.case_id,
                record.verdict,
                record.substitution_count(),
                csv_field(&record.reason().unwrap_or_default()),
            ));
        }
        csv
    }

    /// Exports the CSV to a file.
    pub fn to_csv_file<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        std::fs::write(path, self.to_csv())
    }
}

impl fmt::Display for CaseSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "========== Compare Summary ==========")?;
        writeln!(f)?;
        for record in &self.records {
            writeln!(f, "{}", record)?;
        }
        writeln!(f)?;
        writeln!(f, "=====================================")?;
        writeln!(f, "Total: {}/{} PASS", self.passed(), self.total())
    }
}

impl FromIterator<ComparisonRecord> for CaseSummary {
    fn from_iter<I: IntoIterator<Item = ComparisonRecord>>(iter: I) -> Self {
        Self::from_records(iter.into_iter().collect())
    }
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
