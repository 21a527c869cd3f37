//! Patchbay Core - real-time audio/MIDI node graph
//!
//! This crate hosts arbitrary audio and MIDI processors as nodes of a directed
//! acyclic graph, compiles the graph into a flat render sequence, and runs that
//! sequence once per audio block without locking or allocating.
//!
//! # Core Abstractions
//!
//! ## Lock-free Cells
//!
//! - [`AtomicValue`] - Double-buffered value with wait-free reads and a single writer
//! - [`AtomicLock`] - Reentrant spin lock built on [`AtomicValue`]
//!
//! ## Processing
//!
//! - [`Processor`] - Object-safe trait for anything a node can host
//! - [`AudioBlock`] / [`AudioBuffer`] - Borrowed and owned multichannel audio
//! - [`MidiBuffer`] - Frame-ordered MIDI events
//!
//! ## Graph
//!
//! - [`GraphProcessor`] - Node registry, validator, compiler and executor
//! - [`GraphNode`] - A hosted processor with atomic gain and meters
//! - [`Connection`] - Typed edge between two node ports
//! - [`RenderSequence`] - Compiled, immutable execution plan
//!
//! # Threading
//!
//! One or more control threads edit the graph and write parameters; one audio
//! thread calls [`GraphProcessor::process_block`]. Parameters and meters cross
//! between them only through [`AtomicValue`] cells; the compiled sequence is
//! replaced whole.
//!
//! # Example
//!
//! ```rust,ignore
//! use patchbay_core::{GraphProcessor, IoType};
//!
//! let mut graph = GraphProcessor::new(2, 2);
//! let input = graph.add_io_node(IoType::AudioInput);
//! let output = graph.add_io_node(IoType::AudioOutput);
//! let delay = graph.add_node(Box::new(delay));
//! graph.connect_audio(input, delay);
//! graph.connect_audio(delay, output);
//! graph.prepare_to_play(48000.0, 256);
//!
//! let controls = graph.node_for_id(delay).map(|n| n.controls());
//! // hand `controls` to a UI thread, then per callback:
//! graph.process_block(&mut block, &mut midi);
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: No allocations or locks in the processing path
//! - **Stable ids**: Nodes live in an arena keyed by id; removal invalidates one slot
//! - **Whole-plan publication**: The audio thread never sees a half-built sequence
//! - **Partial failure**: A node that fails to prepare is passed through, not fatal

pub mod atomic;
pub mod buffer;
pub mod error;
pub mod graph;
pub mod processor;

pub use atomic::{AtomicLock, AtomicLockGuard, AtomicRepr, AtomicValue};
pub use buffer::{
    AudioBlock, AudioBuffer, BufferPool, DEFAULT_MIDI_CAPACITY, MidiBuffer, MidiEvent,
};
pub use error::{ConnectionError, ProcessorError};
pub use graph::{
    ChannelSpan, Connection, GainAndMeters, GraphIoProcessor, GraphNode, GraphProcessor,
    NoHooks, NodeControls, NodeId, NodeMeters, RenderHooks, RenderOp, RenderSequence,
};
pub use processor::{
    GraphContext, IoType, PlayConfig, PortDirection, PortLayout, PortType, Processor,
    ProcessorKind,
};
