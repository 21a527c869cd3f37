//! Graph nodes: one [`Processor`] plus the state the graph keeps around it.
//!
//! A [`GraphNode`] owns its processor exclusively. Parameters the control
//! thread may touch while audio runs (gain, input gain, suspension) live in a
//! shared [`NodeControls`]; per-channel RMS levels written by the audio thread
//! live in a shared [`NodeMeters`]. Both are plain [`AtomicValue`] cells behind
//! an `Arc`, so UI code can hold a handle without touching the graph.

use std::fmt;
use std::sync::Arc;

use crate::atomic::AtomicValue;
use crate::error::ProcessorError;
use crate::processor::{
    GraphContext, IoType, PlayConfig, PortDirection, PortLayout, PortType, Processor, ProcessorKind,
};

use super::GraphProcessor;

/// Identifier of a node within one graph.
///
/// Ids are unique per graph and never reassigned automatically; `0` is reserved
/// to mean "assign one for me" when adding a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Wraps a raw id.
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric id.
    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Node parameters shared between the control and audio threads.
///
/// The control thread writes the targets (`gain`, `input_gain`, `suspended`);
/// the audio thread writes the per-block snapshots (`last_gain`,
/// `last_input_gain`). Each cell therefore has a single writer.
#[derive(Debug)]
pub struct NodeControls {
    gain: AtomicValue<f32>,
    last_gain: AtomicValue<f32>,
    input_gain: AtomicValue<f32>,
    last_input_gain: AtomicValue<f32>,
    suspended: AtomicValue<bool>,
}

impl Default for NodeControls {
    fn default() -> Self {
        Self {
            gain: AtomicValue::new(1.0),
            last_gain: AtomicValue::new(1.0),
            input_gain: AtomicValue::new(1.0),
            last_input_gain: AtomicValue::new(1.0),
            suspended: AtomicValue::new(false),
        }
    }
}

impl NodeControls {
    /// Sets the output gain target (linear).
    pub fn set_gain(&self, gain: f32) {
        self.gain.exchange(gain);
    }

    /// Output gain target.
    pub fn gain(&self) -> f32 {
        self.gain.get()
    }

    /// Output gain applied at the end of the last processed block.
    pub fn last_gain(&self) -> f32 {
        self.last_gain.get()
    }

    /// Snapshots the gain target as the last applied gain. Audio thread only.
    pub fn update_gain(&self) {
        self.last_gain.exchange(self.gain.get());
    }

    /// Sets the input gain target (linear).
    pub fn set_input_gain(&self, gain: f32) {
        self.input_gain.exchange(gain);
    }

    /// Input gain target.
    pub fn input_gain(&self) -> f32 {
        self.input_gain.get()
    }

    /// Input gain applied at the end of the last processed block.
    pub fn last_input_gain(&self) -> f32 {
        self.last_input_gain.get()
    }

    /// Snapshots the input gain target. Audio thread only.
    pub fn update_input_gain(&self) {
        self.last_input_gain.exchange(self.input_gain.get());
    }

    /// Suspends or resumes processing. A suspended node outputs silence.
    pub fn set_suspended(&self, suspended: bool) {
        self.suspended.exchange(suspended);
    }

    /// Whether processing is suspended.
    pub fn is_suspended(&self) -> bool {
        self.suspended.get()
    }
}

/// Per-channel RMS levels written by the audio thread.
///
/// Out-of-range channels are ignored on write and read back as `0.0`.
#[derive(Debug)]
pub struct NodeMeters {
    inputs: Vec<AtomicValue<f32>>,
    outputs: Vec<AtomicValue<f32>>,
}

impl NodeMeters {
    /// Creates zeroed meters for the given channel counts.
    pub fn new(inputs: usize, outputs: usize) -> Self {
        Self {
            inputs: (0..inputs).map(|_| AtomicValue::new(0.0)).collect(),
            outputs: (0..outputs).map(|_| AtomicValue::new(0.0)).collect(),
        }
    }

    /// Number of input meters.
    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Number of output meters.
    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// Stores the RMS level of input `channel`.
    pub fn set_input_rms(&self, channel: usize, value: f32) {
        if let Some(cell) = self.inputs.get(channel) {
            cell.exchange(value);
        }
    }

    /// Stores the RMS level of output `channel`.
    pub fn set_output_rms(&self, channel: usize, value: f32) {
        if let Some(cell) = self.outputs.get(channel) {
            cell.exchange(value);
        }
    }

    /// RMS level of input `channel`.
    pub fn input_rms(&self, channel: usize) -> f32 {
        self.inputs.get(channel).map_or(0.0, AtomicValue::get)
    }

    /// RMS level of output `channel`.
    pub fn output_rms(&self, channel: usize) -> f32 {
        self.outputs.get(channel).map_or(0.0, AtomicValue::get)
    }
}

/// A processor hosted in a graph.
pub struct GraphNode {
    id: NodeId,
    processor: Box<dyn Processor>,
    controls: Arc<NodeControls>,
    meters: Option<Arc<NodeMeters>>,
    prepared: bool,
    parent: Option<GraphContext>,
    order: u64,
}

impl GraphNode {
    pub(crate) fn new(id: NodeId, processor: Box<dyn Processor>, order: u64) -> Self {
        Self {
            id,
            processor,
            controls: Arc::new(NodeControls::default()),
            meters: None,
            prepared: false,
            parent: None,
            order,
        }
    }

    /// This node's id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Display name of the wrapped processor.
    pub fn name(&self) -> &str {
        self.processor.name()
    }

    /// The wrapped processor.
    pub fn processor(&self) -> &dyn Processor {
        self.processor.as_ref()
    }

    /// The wrapped processor, mutably.
    ///
    /// Changing its channel configuration invalidates connections; follow up
    /// with [`GraphProcessor::remove_illegal_connections`].
    pub fn processor_mut(&mut self) -> &mut dyn Processor {
        self.processor.as_mut()
    }

    /// Current port counts of the wrapped processor.
    pub fn layout(&self) -> PortLayout {
        PortLayout::of(self.processor.as_ref())
    }

    /// Audio input channels.
    pub fn num_audio_inputs(&self) -> usize {
        self.processor.audio_inputs()
    }

    /// Audio output channels.
    pub fn num_audio_outputs(&self) -> usize {
        self.processor.audio_outputs()
    }

    /// Index of the MIDI input port, if the processor accepts MIDI.
    pub fn midi_input_port(&self) -> Option<u32> {
        self.layout().midi_port(PortDirection::Input)
    }

    /// Index of the MIDI output port, if the processor produces MIDI.
    pub fn midi_output_port(&self) -> Option<u32> {
        self.layout().midi_port(PortDirection::Output)
    }

    pub(crate) fn order(&self) -> u64 {
        self.order
    }

    /// Records the owning graph and forwards it to the processor.
    pub(crate) fn attach(&mut self, parent: &GraphContext) {
        self.parent = Some(*parent);
        self.processor.attach(parent);
    }

    /// Prepares the processor to run. Does nothing if already prepared.
    ///
    /// On success the RMS meters are reallocated for the processor's current
    /// channel counts. On failure the node stays unprepared.
    pub fn prepare(
        &mut self,
        config: &PlayConfig,
        parent: &GraphContext,
    ) -> Result<(), ProcessorError> {
        if self.prepared {
            return Ok(());
        }
        self.attach(parent);
        self.processor.prepare(config)?;
        let layout = self.layout();
        self.meters = Some(Arc::new(NodeMeters::new(
            layout.audio_inputs,
            layout.audio_outputs,
        )));
        self.prepared = true;
        Ok(())
    }

    /// Releases the processor and drops meters. Does nothing if not prepared.
    pub fn unprepare(&mut self) {
        if !self.prepared {
            return;
        }
        self.processor.release();
        self.meters = None;
        self.parent = None;
        self.prepared = false;
    }

    /// Whether [`prepare`](Self::prepare) has succeeded since the last unprepare.
    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    /// The owning graph's context, while attached.
    pub fn parent_graph(&self) -> Option<&GraphContext> {
        self.parent.as_ref()
    }

    /// Shared handle to this node's parameters.
    pub fn controls(&self) -> Arc<NodeControls> {
        Arc::clone(&self.controls)
    }

    /// Shared handle to this node's meters, while prepared.
    pub fn meters(&self) -> Option<Arc<NodeMeters>> {
        self.meters.clone()
    }

    /// See [`NodeControls::set_gain`].
    pub fn set_gain(&self, gain: f32) {
        self.controls.set_gain(gain);
    }

    /// See [`NodeControls::gain`].
    pub fn gain(&self) -> f32 {
        self.controls.gain()
    }

    /// See [`NodeControls::last_gain`].
    pub fn last_gain(&self) -> f32 {
        self.controls.last_gain()
    }

    /// See [`NodeControls::update_gain`].
    pub fn update_gain(&self) {
        self.controls.update_gain();
    }

    /// See [`NodeControls::set_input_gain`].
    pub fn set_input_gain(&self, gain: f32) {
        self.controls.set_input_gain(gain);
    }

    /// See [`NodeControls::input_gain`].
    pub fn input_gain(&self) -> f32 {
        self.controls.input_gain()
    }

    /// See [`NodeControls::last_input_gain`].
    pub fn last_input_gain(&self) -> f32 {
        self.controls.last_input_gain()
    }

    /// See [`NodeControls::update_input_gain`].
    pub fn update_input_gain(&self) {
        self.controls.update_input_gain();
    }

    /// Stores an input RMS level. Ignored when unprepared or out of range.
    pub fn set_input_rms(&self, channel: usize, value: f32) {
        if let Some(meters) = &self.meters {
            meters.set_input_rms(channel, value);
        }
    }

    /// Stores an output RMS level. Ignored when unprepared or out of range.
    pub fn set_output_rms(&self, channel: usize, value: f32) {
        if let Some(meters) = &self.meters {
            meters.set_output_rms(channel, value);
        }
    }

    /// Last input RMS level of `channel`.
    pub fn input_rms(&self, channel: usize) -> f32 {
        self.meters.as_ref().map_or(0.0, |m| m.input_rms(channel))
    }

    /// Last output RMS level of `channel`.
    pub fn output_rms(&self, channel: usize) -> f32 {
        self.meters.as_ref().map_or(0.0, |m| m.output_rms(channel))
    }

    /// Suspends or resumes processing.
    pub fn suspend_processing(&self, suspended: bool) {
        self.controls.set_suspended(suspended);
    }

    /// Whether processing is suspended.
    pub fn is_suspended(&self) -> bool {
        self.controls.is_suspended()
    }

    /// IO boundary type, if this node is one.
    pub fn io_type(&self) -> Option<IoType> {
        match self.processor.kind() {
            ProcessorKind::Io(io) => Some(io),
            _ => None,
        }
    }

    /// Whether this node is an audio IO boundary.
    pub fn is_audio_io_node(&self) -> bool {
        self.io_type().is_some_and(IoType::is_audio)
    }

    /// Whether this node is a MIDI IO boundary.
    pub fn is_midi_io_node(&self) -> bool {
        self.io_type().is_some_and(IoType::is_midi)
    }

    /// Whether this node hosts a nested graph.
    pub fn is_subgraph(&self) -> bool {
        self.processor.kind() == ProcessorKind::Graph
    }

    /// The nested graph, if this node hosts one.
    pub fn as_subgraph(&self) -> Option<&GraphProcessor> {
        self.processor.as_graph()
    }

    /// The nested graph, mutably.
    pub fn as_subgraph_mut(&mut self) -> Option<&mut GraphProcessor> {
        self.processor.as_graph_mut()
    }

    /// `(source_port, dest_port)` pairs wiring this node's audio outputs to
    /// `other`'s audio inputs, channel for channel, for
    /// `min(outputs, other inputs)` channels.
    pub fn audio_links_to(&self, other: &GraphNode) -> Vec<(u32, u32)> {
        let (ours, theirs) = (self.layout(), other.layout());
        (0..ours.audio_outputs.min(theirs.audio_inputs))
            .filter_map(|ch| {
                let src = ours.port_for_channel(PortDirection::Output, PortType::Audio, ch)?;
                let dst = theirs.port_for_channel(PortDirection::Input, PortType::Audio, ch)?;
                Some((src, dst))
            })
            .collect()
    }
}

impl fmt::Debug for GraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphNode")
            .field("id", &self.id)
            .field("name", &self.processor.name())
            .field("kind", &self.processor.kind())
            .field("prepared", &self.prepared)
            .finish_non_exhaustive()
    }
}
