//! Core type definitions for the equivalence harness.
//!
//! This module defines the fundamental types shared by the stimulus
//! generator, the golden models and the comparator.

use serde::{Deserialize, Serialize};

/// Identifier of one test case.
///
/// Every case owns its configuration, stimulus, golden-model instance and
/// comparison record; nothing is shared between two case ids.
pub type CaseId = u32;

/// Clock cycle index within a case (0-based).
pub type Cycle = u64;

/// Name of a port on the circuit under test (e.g. `i_data`, `rst_n`).
pub type PortName = String;

/// Direction of a declared port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Input,
    Output,
    Inout,
}

impl Direction {
    /// Returns true for ports the harness drives.
    pub fn is_input(&self) -> bool {
        matches!(self, Direction::Input)
    }

    /// Returns true for ports the harness observes.
    pub fn is_output(&self) -> bool {
        matches!(self, Direction::Output)
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Direction::Input => "input",
            Direction::Output => "output",
            Direction::Inout => "inout",
        };
        f.write_str(s)
    }
}
