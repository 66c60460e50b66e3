//! Golden model definitions and the `GoldenModel` trait.
//!
//! A golden model is a hand-written behavioral reference for one circuit.
//! It does not emulate the circuit's internal structure; it reproduces the
//! combinational function and the pipeline latency, which is all the
//! comparison needs.
//!
//! Every model is split into two halves:
//!
//! - a pure `compute_raw` that maps one cycle's sampled inputs to the
//!   immediate result, and
//! - a [`LatencyQueue`] of exactly `latency` slots that delays each raw
//!   result until the cycle the circuit would present it.
//!
//! The trait supplies `reset` and `step` on top of those two halves, so a
//! concrete model only describes what it computes and how deep its pipeline
//! is.

use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::config::ConfigError;
use crate::logic::Logic;
use crate::types::PortName;

/// One cycle's sampled input values, keyed by port name.
pub type Inputs = HashMap<PortName, Logic>;

/// One cycle's output values, keyed by declared output port name.
pub type Outputs = HashMap<PortName, Logic>;

/// An output port a model drives, with its bit width.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputPort {
    pub name: PortName,
    pub width: u64,
}

impl OutputPort {
    /// Creates an output port description.
    pub fn new(name: impl Into<String>, width: u64) -> Self {
        Self {
            name: name.into(),
            width,
        }
    }
}

/// What a model factory gets to see of a case.
#[derive(Clone, Copy, Debug)]
pub struct ModelContext<'a> {
    /// Case parameters
    pub params: &'a BTreeMap<String, i64>,
    /// Active-low reset port name
    pub reset_port: &'a str,
}

impl<'a> ModelContext<'a> {
    /// Creates a context.
    pub fn new(params: &'a BTreeMap<String, i64>, reset_port: &'a str) -> Self {
        Self { params, reset_port }
    }

    /// Looks up a required parameter.
    pub fn require(&self, name: &str) -> Result<i64, ConfigError> {
        self.params
            .get(name)
            .copied()
            .ok_or_else(|| ConfigError::MissingParameter(name.to_string()))
    }

    /// Looks up a required parameter that must be at least 1.
    pub fn require_positive(&self, name: &str) -> Result<u64, ConfigError> {
        let value = self.require(name)?;
        if value < 1 {
            return Err(ConfigError::InvalidParameter {
                name: name.to_string(),
                message: format!("must be positive, got {}", value),
            });
        }
        Ok(value as u64)
    }
}

/// Fixed-length FIFO that models a pipeline's register stages.
///
/// The queue is unusable until it has been filled (by `fill` or at
/// construction via `primed`); afterwards its length is exactly `latency`
/// at every observation point.
#[derive(Clone, Debug)]
pub struct LatencyQueue {
    latency: usize,
    slots: Option<VecDeque<Logic>>,
}

impl LatencyQueue {
    /// Creates an uninitialized queue of the given latency.
    pub fn new(latency: usize) -> Self {
        Self {
            latency,
            slots: None,
        }
    }

    /// Creates a queue already filled with `value`.
    pub fn primed(latency: usize, value: Logic) -> Self {
        let mut queue = Self::new(latency);
        queue.fill(value);
        queue
    }

    /// Declared latency in cycles.
    pub fn latency(&self) -> usize {
        self.latency
    }

    /// Current number of slots (0 while uninitialized).
    pub fn len(&self) -> usize {
        self.slots.as_ref().map_or(0, VecDeque::len)
    }

    /// Returns true if the queue holds no slots.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true once the queue has been filled.
    pub fn is_initialized(&self) -> bool {
        self.slots.is_some()
    }

    /// Overwrites every slot with `value`.
    pub fn fill(&mut self, value: Logic) {
        self.slots = Some(std::iter::repeat(value).take(self.latency).collect());
    }

    /// Appends `raw` at the tail and returns the value popped from the head.
    ///
    /// A zero-latency queue returns `raw` unchanged.
    pub fn shift(&mut self, raw: Logic) -> Result<Logic, ConfigError> {
        let slots = self.slots.as_mut().ok_or(ConfigError::QueueNotInitialized)?;
        slots.push_back(raw);
        slots.pop_front().ok_or(ConfigError::QueueNotInitialized)
    }

    /// Iterates over the slots, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Logic> {
        self.slots.iter().flatten()
    }
}

/// The core trait every golden model implements.
///
/// Models are `Send` so that independent cases can run on separate workers;
/// a single instance is never shared between cases.
pub trait GoldenModel: Send {
    /// Short human-readable model name.
    fn name(&self) -> &str;

    /// Output ports this model drives.
    fn output_ports(&self) -> Vec<OutputPort>;

    /// Value every latency slot holds after `reset`.
    fn idle_value(&self) -> Logic;

    /// Immediate combinational result for one cycle's inputs.
    ///
    /// Must return `Logic::Unknown` when any input it depends on is unknown.
    fn compute_raw(&self, inputs: &Inputs) -> Result<Logic, ConfigError>;

    /// The model's latency queue.
    fn queue(&self) -> &LatencyQueue;

    /// Mutable access to the latency queue.
    fn queue_mut(&mut self) -> &mut LatencyQueue;

    /// Pipeline latency in cycles.
    fn latency(&self) -> usize {
        self.queue().latency()
    }

    /// Reinitializes every latency slot to the idle value.
    fn reset(&mut self) {
        let idle = self.idle_value();
        self.queue_mut().fill(idle);
    }

    /// Advances one clock cycle.
    ///
    /// Computes the raw result for `inputs`, pushes it into the latency
    /// queue and returns the value that falls out of the head, keyed by
    /// every output port.
    fn step(&mut self, inputs: &Inputs) -> Result<Outputs, ConfigError> {
        if !self.queue().is_initialized() {
            return Err(ConfigError::QueueNotInitialized);
        }
        let raw = self.compute_raw(inputs)?;
        let out = self.queue_mut().shift(raw)?;
        Ok(self
            .output_ports()
            .into_iter()
            .map(|port| (port.name, out.clone()))
            .collect())
    }
}

/// Reads an input that must be present in `inputs`.
pub fn required_input<'a>(inputs: &'a Inputs, port: &str) -> Result<&'a Logic, ConfigError> {
    inputs
        .get(port)
        .ok_or_else(|| ConfigError::MissingInput(port.to_string()))
}

/// Returns the reset state of an active-low reset input.
///
/// An absent reset port counts as released. `None` means the reset level
/// itself is unknown.
pub fn reset_asserted(inputs: &Inputs, reset_port: &str) -> Option<bool> {
    match inputs.get(reset_port) {
        None => Some(false),
        Some(Logic::Unknown) => None,
        Some(level) => Some(level.is_zero()),
    }
}
