//! Compiled render sequence types.
//!
//! A [`RenderSequence`] is an immutable snapshot produced by
//! [`GraphProcessor::build_rendering_sequence`](super::GraphProcessor::build_rendering_sequence).
//! It holds a flat list of [`RenderOp`]s that the audio thread executes in
//! order, plus the channel map and buffer counts those ops refer to.
//!
//! A sequence is never patched. Every rebuild produces a new one and the old
//! one is dropped whole.

use std::fmt;
use std::ops::Range;

use crate::processor::IoType;

use super::node::NodeId;

/// A node's slice of the sequence's channel map.
///
/// `channel_map[start..start + audio + control]` lists the pool buffers that
/// make up the node's processing block: audio channels first, then control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSpan {
    /// First entry in the channel map.
    pub start: usize,
    /// Audio channels in the block.
    pub audio: usize,
    /// Control channels in the block.
    pub control: usize,
}

impl ChannelSpan {
    /// Channel-map range covered by this span.
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.audio + self.control
    }
}

/// A single instruction in a render sequence.
///
/// Buffer indices refer to the graph's [`BufferPool`](crate::BufferPool):
/// audio and control signals share the audio pool, MIDI has its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOp {
    /// Zero an audio buffer.
    ClearAudio {
        /// Buffer to clear.
        buffer: usize,
    },
    /// Copy one audio buffer over another.
    CopyAudio {
        /// Buffer to read.
        source: usize,
        /// Buffer to overwrite.
        dest: usize,
    },
    /// Sum one audio buffer into another.
    AddAudio {
        /// Buffer to read.
        source: usize,
        /// Buffer to add into.
        dest: usize,
    },
    /// Empty a MIDI buffer.
    ClearMidi {
        /// Buffer to clear.
        buffer: usize,
    },
    /// Replace one MIDI buffer's events with another's.
    CopyMidi {
        /// Buffer to read.
        source: usize,
        /// Buffer to overwrite.
        dest: usize,
    },
    /// Merge one MIDI buffer's events into another.
    AddMidi {
        /// Buffer to read.
        source: usize,
        /// Buffer to merge into.
        dest: usize,
    },
    /// Run a node's processor over its block.
    ProcessNode {
        /// Arena slot of the node.
        slot: usize,
        /// Node id, for inspection.
        node: NodeId,
        /// The node's processing block.
        channels: ChannelSpan,
        /// The node's MIDI buffer.
        midi: usize,
    },
    /// Move data across the graph boundary through an IO node.
    ProcessIo {
        /// Arena slot of the node.
        slot: usize,
        /// Node id, for inspection.
        node: NodeId,
        /// Boundary type.
        io: IoType,
        /// The node's processing block.
        channels: ChannelSpan,
        /// The node's MIDI buffer.
        midi: usize,
    },
    /// Leave an unprepared node's inputs in place as its outputs.
    PassThrough {
        /// Arena slot of the node.
        slot: usize,
        /// Node id, for inspection.
        node: NodeId,
        /// The node's processing block.
        channels: ChannelSpan,
        /// The node's MIDI buffer.
        midi: usize,
    },
}

impl RenderOp {
    /// The node this op runs, for the three node ops.
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Self::ProcessNode { node, .. }
            | Self::ProcessIo { node, .. }
            | Self::PassThrough { node, .. } => Some(*node),
            _ => None,
        }
    }
}

impl fmt::Display for RenderOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClearAudio { buffer } => write!(f, "ClearAudio buf[{buffer}]"),
            Self::CopyAudio { source, dest } => {
                write!(f, "CopyAudio buf[{source}] → buf[{dest}]")
            }
            Self::AddAudio { source, dest } => write!(f, "AddAudio buf[{source}] → buf[{dest}]"),
            Self::ClearMidi { buffer } => write!(f, "ClearMidi midi[{buffer}]"),
            Self::CopyMidi { source, dest } => {
                write!(f, "CopyMidi midi[{source}] → midi[{dest}]")
            }
            Self::AddMidi { source, dest } => write!(f, "AddMidi midi[{source}] → midi[{dest}]"),
            Self::ProcessNode {
                node,
                channels,
                midi,
                ..
            } => write!(
                f,
                "ProcessNode node {node} ({}a+{}c) midi[{midi}]",
                channels.audio, channels.control
            ),
            Self::ProcessIo {
                node, io, channels, ..
            } => write!(f, "ProcessIo node {node} {} ({}a)", io.name(), channels.audio),
            Self::PassThrough { node, .. } => write!(f, "PassThrough node {node}"),
        }
    }
}

/// Immutable compiled snapshot of a graph.
#[derive(Debug, Clone, Default)]
pub struct RenderSequence {
    pub(crate) ops: Vec<RenderOp>,
    pub(crate) channel_map: Vec<usize>,
    pub(crate) audio_buffers: usize,
    pub(crate) midi_buffers: usize,
    pub(crate) node_order: Vec<NodeId>,
}

impl RenderSequence {
    /// Instructions in execution order.
    pub fn ops(&self) -> &[RenderOp] {
        &self.ops
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns `true` for an empty graph.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Audio pool buffers required (peak number live at once).
    pub fn audio_buffer_count(&self) -> usize {
        self.audio_buffers
    }

    /// MIDI pool buffers required.
    pub fn midi_buffer_count(&self) -> usize {
        self.midi_buffers
    }

    /// Nodes in execution order.
    pub fn node_order(&self) -> &[NodeId] {
        &self.node_order
    }

    /// Position of `node` in the execution order.
    pub fn position_of(&self, node: NodeId) -> Option<usize> {
        self.node_order.iter().position(|&n| n == node)
    }

    /// Pool buffers backing a node's block.
    pub fn channels(&self, span: ChannelSpan) -> &[usize] {
        &self.channel_map[span.range()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn op_display() {
        let op = RenderOp::ProcessNode {
            slot: 0,
            node: NodeId::new(7),
            channels: ChannelSpan {
                start: 0,
                audio: 2,
                control: 1,
            },
            midi: 3,
        };
        assert_eq!(op.to_string(), "ProcessNode node 7 (2a+1c) midi[3]");
        assert_eq!(
            RenderOp::AddAudio { source: 1, dest: 0 }.to_string(),
            "AddAudio buf[1] → buf[0]"
        );
        assert_eq!(op.node(), Some(NodeId::new(7)));
        assert_eq!(RenderOp::ClearMidi { buffer: 0 }.node(), None);
    }

    #[test]
    fn span_range() {
        let span = ChannelSpan {
            start: 4,
            audio: 2,
            control: 1,
        };
        assert_eq!(span.range(), 4..7);
    }
}
