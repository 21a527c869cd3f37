//! Error types for graph edits and processor preparation.

use thiserror::Error;

use crate::graph::NodeId;
use crate::processor::PortType;

/// Reasons a proposed connection is rejected.
///
/// Every rejection leaves the graph unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// No node with this id is registered.
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),

    /// The port index is outside the node's current channel configuration.
    #[error("port {port} is out of range for node {node}")]
    PortOutOfRange {
        /// Node whose port was addressed.
        node: NodeId,
        /// Offending port index.
        port: u32,
    },

    /// The two ports belong to different signal domains.
    #[error("cannot connect {output:?} output to {input:?} input")]
    TypeMismatch {
        /// Domain of the source port.
        output: PortType,
        /// Domain of the destination port.
        input: PortType,
    },

    /// An identical connection already exists.
    #[error("connection already exists")]
    Duplicate,

    /// The connection would close a feedback loop.
    #[error("connection would create a cycle")]
    WouldCycle,
}

/// Errors reported by [`Processor::prepare`](crate::Processor::prepare).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProcessorError {
    /// The processor cannot run at this sample rate.
    #[error("unsupported sample rate: {0} Hz")]
    UnsupportedSampleRate(f32),

    /// The processor cannot run with this block size.
    #[error("unsupported block size: {0}")]
    UnsupportedBlockSize(usize),

    /// Any other preparation failure.
    #[error("{0}")]
    Other(String),
}
