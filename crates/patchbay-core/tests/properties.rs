//! Property-based tests for patchbay-core graph topology and atomics.
//!
//! Builds random graphs from random edit scripts and checks the invariants
//! that must hold after any sequence of edits.

use std::collections::HashSet;

use patchbay_core::{
    AtomicValue, AudioBlock, GraphProcessor, MidiBuffer, NodeId, PlayConfig, Processor,
    ProcessorError,
};
use proptest::prelude::*;

/// Mono pass-through with a configurable MIDI port.
struct Thru {
    midi: bool,
}

impl Processor for Thru {
    fn audio_inputs(&self) -> usize {
        1
    }

    fn audio_outputs(&self) -> usize {
        1
    }

    fn accepts_midi(&self) -> bool {
        self.midi
    }

    fn produces_midi(&self) -> bool {
        self.midi
    }

    fn prepare(&mut self, _config: &PlayConfig) -> Result<(), ProcessorError> {
        Ok(())
    }

    fn process(&mut self, _audio: &mut AudioBlock<'_>, _midi: &mut MidiBuffer) {}
}

/// Builds a graph of `nodes` mono nodes and applies every edge `(a, b)` that
/// the graph accepts.
fn build(nodes: usize, edges: &[(usize, usize)]) -> (GraphProcessor, Vec<NodeId>) {
    let mut graph = GraphProcessor::new(1, 1);
    let ids: Vec<NodeId> = (0..nodes)
        .map(|i| graph.add_node(Box::new(Thru { midi: i % 2 == 0 })))
        .collect();
    for &(a, b) in edges {
        graph.add_connection(ids[a % nodes], 0, ids[b % nodes], 0);
    }
    (graph, ids)
}

fn edge_strategy() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((0usize..16, 0usize..16), 0..48)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Whatever the edit script, an accepted connection is reported as
    /// connected, and removing it makes it disappear.
    #[test]
    fn add_then_remove_round_trips(nodes in 2usize..12, edges in edge_strategy()) {
        let (mut graph, _ids) = build(nodes, &edges);
        let existing: Vec<_> = graph.connections().to_vec();
        for c in &existing {
            let (src, sp, dst, dp) = (c.source_node, c.source_port, c.dest_node, c.dest_port);
            prop_assert!(graph.is_connected(src, sp, dst, dp));
        }
        for c in &existing {
            let (src, sp, dst, dp) = (c.source_node, c.source_port, c.dest_node, c.dest_port);
            prop_assert!(graph.remove_connection_between(src, sp, dst, dp));
            prop_assert!(!graph.is_connected(src, sp, dst, dp));
        }
        prop_assert_eq!(graph.num_connections(), 0);
    }

    /// A rejected connection leaves the connection set unchanged.
    #[test]
    fn rejected_connection_changes_nothing(
        nodes in 2usize..12,
        edges in edge_strategy(),
        extra in (0usize..16, 0usize..16),
    ) {
        let (mut graph, ids) = build(nodes, &edges);
        let before: Vec<_> = graph.connections().to_vec();
        let (src, dst) = (ids[extra.0 % nodes], ids[extra.1 % nodes]);
        if !graph.can_connect(src, 0, dst, 0) {
            prop_assert!(!graph.add_connection(src, 0, dst, 0));
            prop_assert_eq!(graph.connections(), before.as_slice());
            prop_assert_eq!(graph.num_nodes(), nodes);
        }
    }

    /// The graph never holds a cycle: following connections from any node
    /// never returns to it.
    #[test]
    fn graph_stays_acyclic(nodes in 2usize..12, edges in edge_strategy()) {
        let (graph, ids) = build(nodes, &edges);
        for &id in &ids {
            prop_assert!(!graph.is_an_input_to(id, id));
        }
    }

    /// Every connection's source is processed before its destination.
    #[test]
    fn sequence_respects_connections(nodes in 2usize..12, edges in edge_strategy()) {
        let (mut graph, ids) = build(nodes, &edges);
        graph.prepare_to_play(48000.0, 32);
        let sequence = graph.rendering_sequence();
        prop_assert_eq!(sequence.node_order().len(), ids.len());
        for c in graph.connections() {
            let src = sequence.position_of(c.source_node);
            let dst = sequence.position_of(c.dest_node);
            prop_assert!(src < dst, "{} out of order", c);
        }
    }

    /// Removing a node removes every connection touching it.
    #[test]
    fn remove_node_prunes_connections(
        nodes in 2usize..12,
        edges in edge_strategy(),
        victim in 0usize..16,
    ) {
        let (mut graph, ids) = build(nodes, &edges);
        let id = ids[victim % nodes];
        prop_assert!(graph.remove_node(id));
        prop_assert!(graph.connections().iter().all(|c| !c.involves(id)));
        prop_assert!(graph.node_for_id(id).is_none());
    }

    /// Auto-assigned ids are unique and strictly increasing.
    #[test]
    fn auto_ids_are_unique(explicit in prop::collection::vec(1u32..64, 0..8), auto in 1usize..16) {
        let mut graph = GraphProcessor::default();
        for id in explicit {
            graph.add_node_with_id(Box::new(Thru { midi: false }), NodeId::new(id));
        }
        let mut seen = HashSet::new();
        let mut last = graph.last_node_id();
        for _ in 0..auto {
            let id = graph.add_node(Box::new(Thru { midi: false }));
            prop_assert!(id > last);
            prop_assert!(seen.insert(id));
            last = id;
        }
    }

    /// `exchange` returns the previous value and `get` the new one.
    #[test]
    fn exchange_returns_previous(values in prop::collection::vec(-1.0e6f32..1.0e6, 1..64)) {
        let cell = AtomicValue::new(0.0f32);
        let mut previous = 0.0f32;
        for v in values {
            prop_assert_eq!(cell.exchange(v), previous);
            prop_assert_eq!(cell.get(), v);
            previous = v;
        }
    }
}
