//! Registered multiplexer golden model.
//!
//! Only the latency and the functional mapping of a parameterized
//! synchronous mux are modeled, not its internal structure.

use num_bigint::BigUint;

use crate::config::ConfigError;
use crate::logic::{unpack_lanes, Logic};
use crate::model::{
    required_input, reset_asserted, GoldenModel, Inputs, LatencyQueue, ModelContext, OutputPort,
};

/// Default packed data input port name.
pub const MUX_DATA_PORT: &str = "data_in";

/// Default select input port name.
pub const MUX_SELECT_PORT: &str = "sel";

/// Default output port name.
pub const MUX_OUTPUT_PORT: &str = "data_out";

/// The mux registers its output once.
pub const MUX_LATENCY: usize = 1;

/// Golden model for a registered N:1 multiplexer.
///
/// - Raw result: lane `sel` of the packed data input, or zero when `sel` is
///   out of range.
/// - Output width: `DATA_WIDTH`.
/// - Latency: one cycle.
/// - The output register powers on unknown; `reset` loads it with zero.
#[derive(Debug)]
pub struct MuxModel {
    input_count: usize,
    data_width: u64,
    data_port: String,
    select_port: String,
    output_port: String,
    reset_port: String,
    queue: LatencyQueue,
}

impl MuxModel {
    /// Builds the model from `INPUT_COUNT` and `DATA_WIDTH`.
    pub fn new(ctx: &ModelContext<'_>) -> Result<Self, ConfigError> {
        let input_count = ctx.require_positive("INPUT_COUNT")? as usize;
        let data_width = ctx.require_positive("DATA_WIDTH")?;

        Ok(Self {
            input_count,
            data_width,
            data_port: MUX_DATA_PORT.to_string(),
            select_port: MUX_SELECT_PORT.to_string(),
            output_port: MUX_OUTPUT_PORT.to_string(),
            reset_port: ctx.reset_port.to_string(),
            queue: LatencyQueue::primed(MUX_LATENCY, Logic::Unknown),
        })
    }

    /// Renames the data, select and output ports.
    pub fn with_ports(
        mut self,
        data: impl Into<String>,
        select: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        self.data_port = data.into();
        self.select_port = select.into();
        self.output_port = output.into();
        self
    }

    /// Number of selectable lanes.
    pub fn input_count(&self) -> usize {
        self.input_count
    }

    /// Width of one lane in bits.
    pub fn data_width(&self) -> u64 {
        self.data_width
    }

    /// Extracts lane `sel`, or zero if `sel` is out of range.
    pub fn select(&self, flat: &BigUint, sel: &BigUint) -> BigUint {
        match usize::try_from(sel) {
            Ok(index) if index < self.input_count => {
                unpack_lanes(flat, self.input_count, self.data_width).swap_remove(index)
            }
            _ => BigUint::default(),
        }
    }
}

impl GoldenModel for MuxModel {
    fn name(&self) -> &str {
        "mux"
    }

    fn output_ports(&self) -> Vec<OutputPort> {
        vec![OutputPort::new(self.output_port.clone(), self.data_width)]
    }

    fn idle_value(&self) -> Logic {
        Logic::zero()
    }

    fn compute_raw(&self, inputs: &Inputs) -> Result<Logic, ConfigError> {
        let data = required_input(inputs, &self.data_port)?;
        let sel = required_input(inputs, &self.select_port)?;
        match reset_asserted(inputs, &self.reset_port) {
            Some(true) => Ok(Logic::zero()),
            None => Ok(Logic::Unknown),
            Some(false) => Ok(match (data, sel) {
                (Logic::Known(flat), Logic::Known(sel)) => Logic::Known(self.select(flat, sel)),
                _ => Logic::Unknown,
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
