//! Pipelined adder-tree golden model.
//!
//! Reference for a `generic_adder_tree` style circuit: `INPUT_COUNT` lanes of
//! `DATA_WIDTH` bits arrive packed in one flat input and are summed by a
//! binary tree with one register per level.

use num_bigint::BigUint;

use crate::config::ConfigError;
use crate::logic::{unpack_lanes, Logic};
use crate::model::{
    required_input, reset_asserted, GoldenModel, Inputs, LatencyQueue, ModelContext, OutputPort,
};
use crate::width::clog2;

/// Default packed input port name.
pub const TREE_INPUT_PORT: &str = "i_data";

/// Default sum output port name.
pub const TREE_OUTPUT_PORT: &str = "o_sum";

/// Register stages added on top of the `clog2(INPUT_COUNT)` tree levels.
///
/// The stage-0 operand register is sampled in the same cycle the testbench
/// drives the inputs, so it adds no observable delay.
pub const TREE_PIPELINE_OFFSET: usize = 0;

/// Golden model for a pipelined adder tree.
///
/// - Raw result: full-width sum of all lanes (no truncation).
/// - Output width: `DATA_WIDTH + clog2(INPUT_COUNT)`.
/// - Latency: `clog2(INPUT_COUNT) + TREE_PIPELINE_OFFSET`.
/// - Idle slots after reset are unknown; the queue only exists after the
///   first `reset`.
///
/// # Example
///
/// ```rust
/// use goldcheck::models::AdderTreeModel;
/// use goldcheck::model::{GoldenModel, Inputs, ModelContext};
/// use goldcheck::logic::Logic;
/// use std::collections::BTreeMap;
///
/// let params: BTreeMap<String, i64> =
///     [("INPUT_COUNT".to_string(), 4), ("DATA_WIDTH".to_string(), 4)].into();
/// let mut model = AdderTreeModel::new(&ModelContext::new(&params, "rst_n")).unwrap();
/// model.reset();
///
/// let inputs: Inputs = [("i_data".to_string(), Logic::from(0x4321))].into();
/// for _ in 0..model.latency() {
///     assert!(model.step(&inputs).unwrap()["o_sum"].is_unknown());
/// }
/// assert_eq!(model.step(&inputs).unwrap()["o_sum"].to_hex(2), "0a");
/// ```
#[derive(Debug)]
pub struct AdderTreeModel {
    input_count: usize,
    data_width: u64,
    final_width: u64,
    input_port: String,
    output_port: String,
    reset_port: String,
    queue: LatencyQueue,
}

impl AdderTreeModel {
    /// Builds the model from `INPUT_COUNT` and `DATA_WIDTH`.
    ///
    /// `INPUT_COUNT` must be a power of two.
    pub fn new(ctx: &ModelContext<'_>) -> Result<Self, ConfigError> {
        let input_count = ctx.require_positive("INPUT_COUNT")?;
        let data_width = ctx.require_positive("DATA_WIDTH")?;
        if !input_count.is_power_of_two() {
            return Err(ConfigError::InvalidParameter {
                name: "INPUT_COUNT".to_string(),
                message: format!("must be a power of two, got {}", input_count),
            });
        }

        let stages = clog2(input_count as i64) as u64;
        let latency = stages as usize + TREE_PIPELINE_OFFSET;

        Ok(Self {
            input_count: input_count as usize,
            data_width,
            final_width: data_width + stages,
            input_port: TREE_INPUT_PORT.to_string(),
            output_port: TREE_OUTPUT_PORT.to_string(),
            reset_port: ctx.reset_port.to_string(),
            queue: LatencyQueue::new(latency),
        })
    }

    /// Renames the packed input and sum output ports.
    pub fn with_ports(mut self, input: impl Into<String>, output: impl Into<String>) -> Self {
        self.input_port = input.into();
        self.output_port = output.into();
        self
    }

    /// Number of summed lanes.
    pub fn input_count(&self) -> usize {
        self.input_count
    }

    /// Width of one lane in bits.
    pub fn data_width(&self) -> u64 {
        self.data_width
    }

    /// Width of the sum output in bits.
    pub fn final_width(&self) -> u64 {
        self.final_width
    }

    /// Sums every lane of a packed value.
    pub fn sum_lanes(&self, flat: &BigUint) -> BigUint {
        unpack_lanes(flat, self.input_count, self.data_width)
            .into_iter()
            .fold(BigUint::default(), |acc, lane| acc + lane)
    }
}

impl GoldenModel for AdderTreeModel {
    fn name(&self) -> &str {
        "adder_tree"
    }

    fn output_ports(&self) -> Vec<OutputPort> {
        vec![OutputPort::new(self.output_port.clone(), self.final_width)]
    }

    fn idle_value(&self) -> Logic {
        Logic::Unknown
    }

    fn compute_raw(&self, inputs: &Inputs) -> Result<Logic, ConfigError> {
        let data = required_input(inputs, &self.input_port)?;
        match reset_asserted(inputs, &self.reset_port) {
            // Every lane is forced to zero while in reset.
            Some(true) => Ok(Logic::zero()),
            None => Ok(Logic::Unknown),
            Some(false) => Ok(match data {
                Logic::Known(flat) => Logic::Known(self.sum_lanes(flat)),
                Logic::Unknown => Logic::Unknown,
            }),
        }
    }

    fn queue(&self) -> &LatencyQueue {
        &self.queue
    }

    fn queue_mut(&mut self) -> &mut LatencyQueue {
        &mut self.queue
    }
}
