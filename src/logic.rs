//! Bit-exact signal values with an explicit unknown state.
//!
//! Every value flowing between the stimulus generator, the golden models and
//! the CSV renderer is a [`Logic`]: either a definite unsigned integer of
//! arbitrary width or the unknown (`x`) marker. Keeping the unknown state as
//! its own variant means no arithmetic can ever be performed on it by
//! accident.
//!
//! The module also carries the lane packing convention shared by all
//! packed-array ports: lane `i` of a flat value occupies bits
//! `[i * width, (i + 1) * width)`, least-significant lane first.

use num_bigint::BigUint;
use std::fmt;

/// A single sampled or computed signal value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Logic {
    /// A definite bit pattern.
    Known(BigUint),
    /// Not a definite 0/1 pattern (`x`).
    Unknown,
}

impl Logic {
    /// The definite all-zero value.
    pub fn zero() -> Self {
        Logic::Known(BigUint::default())
    }

    /// Returns true for the unknown marker.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Logic::Unknown)
    }

    /// Returns true for a definite zero.
    pub fn is_zero(&self) -> bool {
        matches!(self, Logic::Known(v) if v.bits() == 0)
    }

    /// Returns the definite value, if any.
    pub fn as_known(&self) -> Option<&BigUint> {
        match self {
            Logic::Known(v) => Some(v),
            Logic::Unknown => None,
        }
    }

    /// Parses one token of a stimulus file.
    ///
    /// An empty token or a token made only of `x`/`X` characters is the
    /// unknown marker. Returns `None` when the token is not valid hex.
    pub fn from_hex_token(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() || token.chars().all(|c| c.eq_ignore_ascii_case(&'x')) {
            return Some(Logic::Unknown);
        }
        if !token.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        BigUint::parse_bytes(token.as_bytes(), 16).map(Logic::Known)
    }

    /// Renders the value as zero-padded lowercase hex of `digits` characters.
    ///
    /// The unknown marker renders as `digits` `x` characters.
    pub fn to_hex(&self, digits: usize) -> String {
        match self {
            Logic::Known(v) => format!("{:0width$x}", v, width = digits),
            Logic::Unknown => "x".repeat(digits),
        }
    }
}

impl From<u64> for Logic {
    fn from(value: u64) -> Self {
        Logic::Known(BigUint::from(value))
    }
}

impl From<BigUint> for Logic {
    fn from(value: BigUint) -> Self {
        Logic::Known(value)
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Logic::Known(v) => write!(f, "{:x}", v),
            Logic::Unknown => f.write_str("x"),
        }
    }
}

/// Number of hex characters needed for a `width`-bit value: `ceil(width / 4)`.
pub fn hex_digits(width: u64) -> usize {
    width.div_ceil(4) as usize
}

/// All-ones mask of `width` bits.
pub fn lane_mask(width: u64) -> BigUint {
    (BigUint::from(1u8) << width) - 1u8
}

/// Splits a flat packed value into `count` lanes of `width` bits each.
pub fn unpack_lanes(flat: &BigUint, count: usize, width: u64) -> Vec<BigUint> {
    let mask = lane_mask(width);
    (0..count as u64)
        .map(|i| (flat >> (i * width)) & &mask)
        .collect()
}

/// Concatenates lanes back into one flat value, lane `i` at bit `i * width`.
pub fn pack_lanes(lanes: &[BigUint], width: u64) -> BigUint {
    lanes
        .iter()
        .enumerate()
        .fold(BigUint::default(), |acc, (i, lane)| acc | (lane << (i as u64 * width)))
}
