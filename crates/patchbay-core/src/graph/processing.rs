//! Graph processor: node registry, topology validation, compilation and
//! block execution.
//!
//! [`GraphProcessor`] owns its nodes and connections. Edits happen on the
//! control thread through `&mut self`; each edit marks the topology dirty and
//! the next [`handle_pending_rebuild`](GraphProcessor::handle_pending_rebuild)
//! or [`process_block`](GraphProcessor::process_block) compiles it once, no
//! matter how many edits came before. The compiled [`RenderSequence`] is held
//! in an `Arc` and replaced whole.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::buffer::{AudioBlock, AudioBuffer, BufferPool, DEFAULT_MIDI_CAPACITY, MidiBuffer};
use crate::error::{ConnectionError, ProcessorError};
use crate::processor::{
    GraphContext, IoType, PlayConfig, PortDirection, PortType, Processor, ProcessorKind,
};

use super::compiler;
use super::connection::Connection;
use super::executor::{self, BoundaryIo};
use super::hooks::{GainAndMeters, RenderHooks};
use super::io::GraphIoProcessor;
use super::node::{GraphNode, NodeId};
use super::sequence::RenderSequence;

/// A graph of [`Processor`]s that is itself a [`Processor`].
///
/// # Usage
///
/// 1. Create a graph with [`new()`](Self::new), giving its external channel
///    counts
/// 2. Add nodes: [`add_node()`](Self::add_node), [`add_io_node()`](Self::add_io_node)
/// 3. Connect ports: [`add_connection()`](Self::add_connection),
///    [`connect_audio()`](Self::connect_audio)
/// 4. Prepare: [`prepare_to_play()`](Self::prepare_to_play)
/// 5. Process: [`process_block()`](Self::process_block)
///
/// Nesting a graph is just adding it as a node: its IO nodes bridge the outer
/// block into its own independently compiled sequence.
pub struct GraphProcessor {
    name: String,
    nodes: Vec<Option<GraphNode>>,
    slot_of: HashMap<NodeId, usize>,
    free_slots: Vec<usize>,
    connections: Vec<Connection>,
    last_node_id: u32,
    next_order: u64,
    sequence: Arc<RenderSequence>,
    pool: BufferPool,
    hooks: Box<dyn RenderHooks>,
    needs_rebuild: bool,
    rebuild_count: u64,
    sample_rate: f32,
    block_size: usize,
    prepared: bool,
    audio_inputs: usize,
    audio_outputs: usize,
    midi_capacity: usize,
    /// Graph output, summed by audio output nodes. Sized at prepare.
    output_scratch: AudioBuffer,
    /// Graph MIDI output, merged by MIDI output nodes.
    midi_output: MidiBuffer,
}

impl Default for GraphProcessor {
    /// A stereo-in, stereo-out graph.
    fn default() -> Self {
        Self::new(2, 2)
    }
}

impl GraphProcessor {
    /// Creates an empty, unprepared graph with the given external audio
    /// channel counts.
    pub fn new(audio_inputs: usize, audio_outputs: usize) -> Self {
        Self {
            name: String::from("Graph"),
            nodes: Vec::new(),
            slot_of: HashMap::new(),
            free_slots: Vec::new(),
            connections: Vec::new(),
            last_node_id: 0,
            next_order: 0,
            sequence: Arc::new(RenderSequence::default()),
            pool: BufferPool::new(),
            hooks: Box::new(GainAndMeters),
            needs_rebuild: false,
            rebuild_count: 0,
            sample_rate: 0.0,
            block_size: 0,
            prepared: false,
            audio_inputs,
            audio_outputs,
            midi_capacity: DEFAULT_MIDI_CAPACITY,
            output_scratch: AudioBuffer::default(),
            midi_output: MidiBuffer::new(),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Events preallocated per MIDI buffer. Applies from the next prepare.
    pub fn set_midi_capacity(&mut self, capacity: usize) {
        self.midi_capacity = capacity.max(1);
    }

    /// What nodes of this graph know about it.
    pub fn context(&self) -> GraphContext {
        GraphContext {
            sample_rate: self.sample_rate,
            block_size: self.block_size,
            audio_inputs: self.audio_inputs,
            audio_outputs: self.audio_outputs,
        }
    }

    fn play_config(&self) -> PlayConfig {
        PlayConfig {
            sample_rate: self.sample_rate,
            block_size: self.block_size,
        }
    }

    /// Audio channels entering the graph.
    pub fn audio_input_channels(&self) -> usize {
        self.audio_inputs
    }

    /// Audio channels leaving the graph.
    pub fn audio_output_channels(&self) -> usize {
        self.audio_outputs
    }

    /// Changes the external channel layout.
    ///
    /// Audio IO nodes resize to match and are re-prepared at the next
    /// rebuild; connections to ports that no longer exist are removed.
    pub fn set_channel_layout(&mut self, audio_inputs: usize, audio_outputs: usize) {
        if (audio_inputs, audio_outputs) == (self.audio_inputs, self.audio_outputs) {
            return;
        }
        self.audio_inputs = audio_inputs;
        self.audio_outputs = audio_outputs;
        let ctx = self.context();
        for node in self.nodes.iter_mut().flatten() {
            if node.is_audio_io_node() {
                node.unprepare();
            }
            node.attach(&ctx);
        }
        if self.prepared {
            self.output_scratch.resize(audio_outputs, self.block_size);
        }
        self.remove_illegal_connections();
        self.needs_rebuild = true;
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_layout: {audio_inputs} in, {audio_outputs} out");
    }

    /// Deletes every node and connection. The id counter is kept.
    pub fn clear(&mut self) {
        for node in self.nodes.iter_mut().flatten() {
            node.unprepare();
        }
        self.nodes.clear();
        self.slot_of.clear();
        self.free_slots.clear();
        self.connections.clear();
        self.needs_rebuild = true;
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_clear");
    }

    // --- Nodes ---

    /// Number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.slot_of.len()
    }

    /// The `index`-th node in insertion order.
    pub fn node(&self, index: usize) -> Option<&GraphNode> {
        self.nodes_in_order().nth(index)
    }

    /// The `index`-th node in insertion order, mutably.
    pub fn node_mut(&mut self, index: usize) -> Option<&mut GraphNode> {
        let id = self.nodes_in_order().nth(index)?.id();
        self.node_for_id_mut(id)
    }

    /// Looks a node up by id.
    pub fn node_for_id(&self, id: NodeId) -> Option<&GraphNode> {
        let slot = *self.slot_of.get(&id)?;
        self.nodes.get(slot)?.as_ref()
    }

    /// Looks a node up by id, mutably.
    pub fn node_for_id_mut(&mut self, id: NodeId) -> Option<&mut GraphNode> {
        let slot = *self.slot_of.get(&id)?;
        self.nodes.get_mut(slot)?.as_mut()
    }

    /// Iterates over nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes_in_order()
    }

    fn nodes_in_order(&self) -> impl Iterator<Item = &GraphNode> {
        let mut live: Vec<&GraphNode> = self.nodes.iter().flatten().collect();
        live.sort_by_key(|n| n.order());
        live.into_iter()
    }

    /// Adds a node with a freshly assigned id.
    pub fn add_node(&mut self, processor: Box<dyn Processor>) -> NodeId {
        self.add_node_with_id(processor, NodeId(0))
    }

    /// Adds a node under `id`.
    ///
    /// `NodeId(0)` assigns the next id above the highest ever seen, or the
    /// lowest unused id once `u32::MAX` has been taken. A node already
    /// registered under `id` is removed first, connections included.
    pub fn add_node_with_id(&mut self, processor: Box<dyn Processor>, id: NodeId) -> NodeId {
        let id = if id.0 == 0 { self.next_free_id() } else { id };
        if self.slot_of.contains_key(&id) {
            #[cfg(feature = "tracing")]
            tracing::debug!("graph_add: replacing node {id}");
            self.remove_node(id);
        }
        self.last_node_id = self.last_node_id.max(id.0);

        let mut node = GraphNode::new(id, processor, self.next_order);
        self.next_order += 1;
        node.attach(&self.context());

        let slot = if let Some(slot) = self.free_slots.pop() {
            self.nodes[slot] = Some(node);
            slot
        } else {
            self.nodes.push(Some(node));
            self.nodes.len() - 1
        };
        self.slot_of.insert(id, slot);
        self.needs_rebuild = true;
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_add: node {id} in slot {slot}");
        id
    }

    fn next_free_id(&self) -> NodeId {
        match self.last_node_id.checked_add(1) {
            Some(next) => NodeId(next),
            None => (1..=u32::MAX)
                .map(NodeId)
                .find(|id| !self.slot_of.contains_key(id))
                // Every id in use: the highest one is replaced.
                .unwrap_or(NodeId(u32::MAX)),
        }
    }

    /// Adds a boundary node of the given type.
    pub fn add_io_node(&mut self, io_type: IoType) -> NodeId {
        self.add_node(Box::new(GraphIoProcessor::new(io_type)))
    }

    /// Removes a node and every connection touching it.
    ///
    /// Returns `false` if no node has this id.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let Some(slot) = self.slot_of.remove(&id) else {
            return false;
        };
        self.connections.retain(|c| !c.involves(id));
        if let Some(mut node) = self.nodes[slot].take() {
            node.unprepare();
        }
        self.free_slots.push(slot);
        self.needs_rebuild = true;
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_remove: node {id}");
        true
    }

    /// Highest node id assigned so far.
    pub fn last_node_id(&self) -> NodeId {
        NodeId(self.last_node_id)
    }

    // --- Connections ---

    /// Number of connections.
    pub fn num_connections(&self) -> usize {
        self.connections.len()
    }

    /// The `index`-th connection in the order they were made.
    pub fn connection(&self, index: usize) -> Option<&Connection> {
        self.connections.get(index)
    }

    /// All connections in the order they were made.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// The connection with this four-tuple, if present.
    pub fn connection_between(
        &self,
        source: NodeId,
        source_port: u32,
        dest: NodeId,
        dest_port: u32,
    ) -> Option<&Connection> {
        self.connections
            .iter()
            .find(|c| c.matches(source, source_port, dest, dest_port))
    }

    /// Whether a connection with this four-tuple exists.
    pub fn is_connected(
        &self,
        source: NodeId,
        source_port: u32,
        dest: NodeId,
        dest_port: u32,
    ) -> bool {
        self.connection_between(source, source_port, dest, dest_port).is_some()
    }

    /// Whether any connection runs directly from `source` to `dest`.
    pub fn are_nodes_connected(&self, source: NodeId, dest: NodeId) -> bool {
        self.connections
            .iter()
            .any(|c| c.source_node == source && c.dest_node == dest)
    }

    /// Validates a proposed connection and returns it resolved to a domain.
    fn check_connection(
        &self,
        source: NodeId,
        source_port: u32,
        dest: NodeId,
        dest_port: u32,
    ) -> Result<Connection, ConnectionError> {
        let src = self
            .node_for_id(source)
            .ok_or(ConnectionError::UnknownNode(source))?;
        let dst = self
            .node_for_id(dest)
            .ok_or(ConnectionError::UnknownNode(dest))?;

        let output = src
            .layout()
            .port_type(PortDirection::Output, source_port)
            .ok_or(ConnectionError::PortOutOfRange {
                node: source,
                port: source_port,
            })?;
        let input = dst
            .layout()
            .port_type(PortDirection::Input, dest_port)
            .ok_or(ConnectionError::PortOutOfRange {
                node: dest,
                port: dest_port,
            })?;
        if output != input {
            return Err(ConnectionError::TypeMismatch { output, input });
        }

        if self.is_connected(source, source_port, dest, dest_port) {
            return Err(ConnectionError::Duplicate);
        }

        // source → dest closes a loop if dest already feeds source.
        if source == dest || self.is_an_input_to(dest, source) {
            return Err(ConnectionError::WouldCycle);
        }

        Ok(Connection {
            source_node: source,
            source_port,
            dest_node: dest,
            dest_port,
            port_type: output,
        })
    }

    /// Adds a connection, reporting why it was rejected.
    ///
    /// A rejected connection leaves the graph unchanged.
    pub fn try_connect(
        &mut self,
        source: NodeId,
        source_port: u32,
        dest: NodeId,
        dest_port: u32,
    ) -> Result<(), ConnectionError> {
        let connection = match self.check_connection(source, source_port, dest, dest_port) {
            Ok(c) => c,
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    "graph_connect: rejected {source}:{source_port} → {dest}:{dest_port}: {err}"
                );
                return Err(err);
            }
        };
        self.connections.push(connection);
        self.needs_rebuild = true;
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_connect: {connection}");
        Ok(())
    }

    /// Whether [`add_connection`](Self::add_connection) would succeed.
    pub fn can_connect(
        &self,
        source: NodeId,
        source_port: u32,
        dest: NodeId,
        dest_port: u32,
    ) -> bool {
        self.check_connection(source, source_port, dest, dest_port).is_ok()
    }

    /// Adds a connection between two ports. Returns `false`, changing
    /// nothing, if it is rejected.
    pub fn add_connection(
        &mut self,
        source: NodeId,
        source_port: u32,
        dest: NodeId,
        dest_port: u32,
    ) -> bool {
        self.try_connect(source, source_port, dest, dest_port).is_ok()
    }

    /// Connects channel `source_channel` of domain `port_type` on `source` to
    /// channel `dest_channel` of the same domain on `dest`.
    pub fn connect_channels(
        &mut self,
        port_type: PortType,
        source: NodeId,
        source_channel: usize,
        dest: NodeId,
        dest_channel: usize,
    ) -> bool {
        let ports = self.node_for_id(source).zip(self.node_for_id(dest)).and_then(|(s, d)| {
            let sp = s
                .layout()
                .port_for_channel(PortDirection::Output, port_type, source_channel)?;
            let dp = d
                .layout()
                .port_for_channel(PortDirection::Input, port_type, dest_channel)?;
            Some((sp, dp))
        });
        match ports {
            Some((sp, dp)) => self.add_connection(source, sp, dest, dp),
            None => false,
        }
    }

    /// Connects `source`'s audio outputs to `dest`'s audio inputs channel for
    /// channel, over `min(outputs, inputs)` channels.
    ///
    /// Returns `true` only if every channel connected. Links made before a
    /// failure are kept.
    pub fn connect_audio(&mut self, source: NodeId, dest: NodeId) -> bool {
        let links = match self.node_for_id(source).zip(self.node_for_id(dest)) {
            Some((s, d)) => s.audio_links_to(d),
            None => return false,
        };
        if links.is_empty() {
            return false;
        }
        let mut all = true;
        for (sp, dp) in links {
            all &= self.add_connection(source, sp, dest, dp);
        }
        all
    }

    /// Removes the `index`-th connection. Returns `false` if out of range.
    pub fn remove_connection(&mut self, index: usize) -> bool {
        if index >= self.connections.len() {
            return false;
        }
        let _removed = self.connections.remove(index);
        self.needs_rebuild = true;
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_disconnect: {_removed}");
        true
    }

    /// Removes the connection with this four-tuple. Returns `false` if absent.
    pub fn remove_connection_between(
        &mut self,
        source: NodeId,
        source_port: u32,
        dest: NodeId,
        dest_port: u32,
    ) -> bool {
        match self
            .connections
            .iter()
            .position(|c| c.matches(source, source_port, dest, dest_port))
        {
            Some(index) => self.remove_connection(index),
            None => false,
        }
    }

    /// Removes every connection touching `node`. Returns whether any were.
    pub fn disconnect_node(&mut self, node: NodeId) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| !c.involves(node));
        let changed = self.connections.len() != before;
        if changed {
            self.needs_rebuild = true;
            #[cfg(feature = "tracing")]
            tracing::debug!(
                "graph_disconnect: node {node}, {} connections",
                before - self.connections.len()
            );
        }
        changed
    }

    /// Whether both endpoints exist and both ports still carry the
    /// connection's domain.
    pub fn is_connection_legal(&self, connection: &Connection) -> bool {
        match (
            self.node_for_id(connection.source_node),
            self.node_for_id(connection.dest_node),
        ) {
            (Some(src), Some(dst)) => connection.fits(&src.layout(), &dst.layout()),
            _ => false,
        }
    }

    /// Drops connections whose ports no longer exist on their endpoints.
    ///
    /// Call after changing a processor's channel configuration. Returns
    /// whether anything was removed.
    pub fn remove_illegal_connections(&mut self) -> bool {
        let legal: Vec<bool> = self
            .connections
            .iter()
            .map(|c| self.is_connection_legal(c))
            .collect();
        let before = self.connections.len();
        let mut flags = legal.into_iter();
        self.connections.retain(|_| flags.next().unwrap_or(false));
        let changed = self.connections.len() != before;
        if changed {
            self.needs_rebuild = true;
            #[cfg(feature = "tracing")]
            tracing::debug!(
                "graph_prune: removed {} illegal connections",
                before - self.connections.len()
            );
        }
        changed
    }

    /// Whether `possible_input` feeds `node`, directly or through other nodes.
    pub fn is_an_input_to(&self, possible_input: NodeId, node: NodeId) -> bool {
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            for c in self.connections.iter().filter(|c| c.dest_node == current) {
                if c.source_node == possible_input {
                    return true;
                }
                if visited.insert(c.source_node) {
                    stack.push(c.source_node);
                }
            }
        }
        false
    }

    // --- Compilation ---

    /// Compiles the current topology and publishes it.
    ///
    /// When the graph is prepared, unprepared nodes are prepared first; a node
    /// whose processor refuses stays unprepared and is passed through.
    pub fn build_rendering_sequence(&mut self) {
        if self.prepared {
            let config = self.play_config();
            let ctx = self.context();
            for node in self.nodes.iter_mut().flatten() {
                if let Err(_err) = node.prepare(&config, &ctx) {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        "graph_prepare: node {} ({}) failed: {_err}",
                        node.id(),
                        node.name()
                    );
                }
            }
        }

        let sequence = compiler::compile(&self.nodes, &self.slot_of, &self.connections);
        self.pool.ensure(
            sequence.audio_buffer_count(),
            sequence.midi_buffer_count(),
            self.block_size,
            self.midi_capacity,
        );
        self.sequence = Arc::new(sequence);
        self.needs_rebuild = false;
        self.rebuild_count += 1;
    }

    /// Rebuilds if anything changed since the last build. Returns whether a
    /// rebuild ran.
    pub fn handle_pending_rebuild(&mut self) -> bool {
        if !self.needs_rebuild {
            return false;
        }
        self.build_rendering_sequence();
        true
    }

    /// Whether an edit is waiting to be compiled.
    pub fn needs_rebuild(&self) -> bool {
        self.needs_rebuild
    }

    /// Number of sequences built so far.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuild_count
    }

    /// The currently published sequence.
    pub fn rendering_sequence(&self) -> Arc<RenderSequence> {
        Arc::clone(&self.sequence)
    }

    /// Replaces the hooks run around each node.
    pub fn set_render_hooks(&mut self, hooks: impl RenderHooks + 'static) {
        self.hooks = Box::new(hooks);
    }

    // --- Playback ---

    /// Prepares every node for `sample_rate` and `block_size` and builds the
    /// sequence.
    ///
    /// Calling it again with new settings re-prepares every node.
    pub fn prepare_to_play(&mut self, sample_rate: f32, block_size: usize) {
        if self.prepared {
            for node in self.nodes.iter_mut().flatten() {
                node.unprepare();
            }
        }
        self.sample_rate = sample_rate;
        self.block_size = block_size;
        self.output_scratch.resize(self.audio_outputs, block_size);
        self.midi_output = MidiBuffer::with_capacity(self.midi_capacity);
        self.prepared = true;
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_prepare: {sample_rate} Hz, {block_size} frames");
        self.build_rendering_sequence();
    }

    /// Releases every node and frees scratch storage.
    pub fn release_resources(&mut self) {
        for node in self.nodes.iter_mut().flatten() {
            node.unprepare();
        }
        self.pool.release();
        self.output_scratch = AudioBuffer::default();
        self.midi_output = MidiBuffer::new();
        self.prepared = false;
        self.needs_rebuild = true;
    }

    /// Resets every node's processing state.
    pub fn reset(&mut self) {
        for node in self.nodes.iter_mut().flatten() {
            node.processor_mut().reset();
        }
    }

    /// Whether [`prepare_to_play`](Self::prepare_to_play) has run since the
    /// last release.
    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    /// Sample rate in Hz, `0.0` before the first prepare.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Maximum frames per block, `0` before the first prepare.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Processes one block in place.
    ///
    /// `audio` supplies the graph's input channels and receives its output
    /// channels; `midi` likewise. A pending topology edit is compiled first,
    /// which makes this call slower than usual. Frames beyond the prepared
    /// block size are silenced. An unprepared graph outputs silence.
    ///
    /// MIDI never reallocates here: each internal buffer holds at most the
    /// graph's MIDI capacity and `midi` keeps at most its own capacity, so
    /// later events in a crowded block are dropped.
    pub fn process_block(&mut self, audio: &mut AudioBlock<'_>, midi: &mut MidiBuffer) {
        if self.needs_rebuild {
            #[cfg(feature = "tracing")]
            tracing::debug!("graph_process: synchronous rebuild");
            self.build_rendering_sequence();
        }
        if !self.prepared {
            audio.clear();
            midi.clear();
            return;
        }

        let len = audio.len().min(self.block_size);
        let sequence = Arc::clone(&self.sequence);
        self.output_scratch.clear();
        self.midi_output.clear();
        {
            let mut io = BoundaryIo {
                input: &*audio,
                midi_in: &*midi,
                output: &mut self.output_scratch,
                midi_out: &mut self.midi_output,
            };
            executor::render(
                &mut self.nodes,
                &sequence,
                &mut self.pool,
                self.hooks.as_mut(),
                &mut io,
                len,
            );
        }

        for ch in 0..audio.num_channels() {
            let dst = audio.channel_mut(ch);
            if ch < self.output_scratch.num_channels() {
                dst[..len].copy_from_slice(&self.output_scratch.channel(ch)[..len]);
                dst[len..].fill(0.0);
            } else {
                dst.fill(0.0);
            }
        }
        midi.copy_from(&self.midi_output);
    }
}

impl fmt::Debug for GraphProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphProcessor")
            .field("name", &self.name)
            .field("nodes", &self.num_nodes())
            .field("connections", &self.connections.len())
            .field("prepared", &self.prepared)
            .field("needs_rebuild", &self.needs_rebuild)
            .finish_non_exhaustive()
    }
}

impl Processor for GraphProcessor {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ProcessorKind {
        ProcessorKind::Graph
    }

    fn audio_inputs(&self) -> usize {
        self.audio_inputs
    }

    fn audio_outputs(&self) -> usize {
        self.audio_outputs
    }

    fn accepts_midi(&self) -> bool {
        true
    }

    fn produces_midi(&self) -> bool {
        true
    }

    fn prepare(&mut self, config: &PlayConfig) -> Result<(), ProcessorError> {
        if config.sample_rate <= 0.0 {
            return Err(ProcessorError::UnsupportedSampleRate(config.sample_rate));
        }
        if config.block_size == 0 {
            return Err(ProcessorError::UnsupportedBlockSize(config.block_size));
        }
        self.prepare_to_play(config.sample_rate, config.block_size);
        Ok(())
    }

    fn release(&mut self) {
        self.release_resources();
    }

    fn reset(&mut self) {
        GraphProcessor::reset(self);
    }

    fn process(&mut self, audio: &mut AudioBlock<'_>, midi: &mut MidiBuffer) {
        self.process_block(audio, midi);
    }

    fn as_graph(&self) -> Option<&GraphProcessor> {
        Some(self)
    }

    fn as_graph_mut(&mut self) -> Option<&mut GraphProcessor> {
        Some(self)
    }
}
