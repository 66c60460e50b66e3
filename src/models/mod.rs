//! Built-in golden models.
//!
//! - [`AdderTreeModel`] - pipelined sum of packed lanes
//! - [`MuxModel`] - registered N:1 lane select

pub mod adder_tree;
pub mod mux;

pub use adder_tree::{AdderTreeModel, TREE_PIPELINE_OFFSET};
pub use mux::{MuxModel, MUX_LATENCY};
