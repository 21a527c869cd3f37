//! Node graph for real-time audio and MIDI processing.
//!
//! Edit the graph on a control thread (add/remove nodes, connect ports),
//! compile it to a [`RenderSequence`] snapshot, and execute that snapshot once
//! per audio block with zero allocations.
//!
//! # Architecture
//!
//! - [`GraphProcessor`]: owns the nodes and connections, validates edits,
//!   compiles, and runs blocks. Edits need `&mut`, so the borrow checker
//!   serializes them with processing.
//! - [`GraphNode`]: one [`Processor`](crate::Processor) plus its shared
//!   [`NodeControls`] (gain, input gain, suspension) and [`NodeMeters`]. The
//!   control thread reaches these through `Arc` handles while audio runs.
//! - [`RenderSequence`]: immutable list of [`RenderOp`]s plus the channel map
//!   they index. Rebuilt whole after any edit and published through an `Arc`.
//!
//! # Buffer Efficiency
//!
//! Pool buffers are assigned by liveness: a buffer is live from the op that
//! writes it to the last op that reads it, then returns to the free list. A node
//! processes in place when it is the last reader of its input, so a 20-node
//! mono chain uses a single buffer.
//!
//! # Subgraphs
//!
//! [`GraphProcessor`] implements [`Processor`](crate::Processor), so a graph can
//! be added as a node of another. Inside, [`GraphIoProcessor`] nodes bridge the
//! block the outer graph hands over into the inner graph's own sequence.
//!
//! # Example
//!
//! ```rust,ignore
//! use patchbay_core::{GraphProcessor, IoType};
//!
//! let mut graph = GraphProcessor::new(2, 2);
//! let input = graph.add_io_node(IoType::AudioInput);
//! let output = graph.add_io_node(IoType::AudioOutput);
//! let reverb = graph.add_node(Box::new(Reverb::new()));
//!
//! graph.connect_audio(input, reverb);
//! graph.connect_audio(reverb, output);
//! graph.prepare_to_play(48000.0, 256);
//!
//! // Once per audio callback
//! graph.process_block(&mut block, &mut midi);
//! ```

mod compiler;
pub mod connection;
mod executor;
pub mod hooks;
pub mod io;
pub mod node;
mod processing;
pub mod sequence;

pub use connection::Connection;
pub use hooks::{GainAndMeters, NoHooks, RenderHooks, apply_gain_ramp, rms};
pub use io::GraphIoProcessor;
pub use node::{GraphNode, NodeControls, NodeId, NodeMeters};
pub use processing::GraphProcessor;
pub use sequence::{ChannelSpan, RenderOp, RenderSequence};
