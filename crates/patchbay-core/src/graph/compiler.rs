//! Render-sequence compiler.
//!
//! Turns the node arena and connection list into a [`RenderSequence`]:
//!
//! 1. Drop connections whose ports no longer fit the endpoints' current
//!    channel configuration.
//! 2. Order nodes with Kahn's algorithm, breaking ties by insertion order so
//!    the same graph always compiles to the same sequence.
//! 3. Walk the order assigning pool buffers. Each node's block channel reuses
//!    its first source's buffer in place when this node is that buffer's last
//!    reader, otherwise copies into a fresh one; further sources are summed in
//!    and unconnected channels are cleared. A buffer returns to the free list as
//!    soon as its last reader has been scheduled, so the pool ends up sized to
//!    the peak number of simultaneously live buffers. A 20-node mono chain
//!    needs one audio buffer.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap};

use crate::processor::{PortDirection, PortLayout, PortType};

use super::connection::Connection;
use super::node::{GraphNode, NodeId};
use super::sequence::{ChannelSpan, RenderOp, RenderSequence};

/// A connection resolved to arena slots.
struct Edge {
    src: usize,
    src_port: u32,
    dst: usize,
    dst_port: u32,
}

#[derive(Clone, Copy)]
enum Signal {
    Audio,
    Midi,
}

impl Signal {
    fn clear(self, buffer: usize) -> RenderOp {
        match self {
            Self::Audio => RenderOp::ClearAudio { buffer },
            Self::Midi => RenderOp::ClearMidi { buffer },
        }
    }

    fn copy(self, source: usize, dest: usize) -> RenderOp {
        match self {
            Self::Audio => RenderOp::CopyAudio { source, dest },
            Self::Midi => RenderOp::CopyMidi { source, dest },
        }
    }

    fn add(self, source: usize, dest: usize) -> RenderOp {
        match self {
            Self::Audio => RenderOp::AddAudio { source, dest },
            Self::Midi => RenderOp::AddMidi { source, dest },
        }
    }
}

/// Buffer allocator tracking outstanding reads per buffer.
#[derive(Default)]
struct Allocator {
    free: BTreeSet<usize>,
    reads: Vec<usize>,
}

impl Allocator {
    fn acquire(&mut self) -> usize {
        if let Some(buffer) = self.free.pop_first() {
            buffer
        } else {
            self.reads.push(0);
            self.reads.len() - 1
        }
    }

    fn retain(&mut self, buffer: usize, reads: usize) {
        self.reads[buffer] = reads;
    }

    fn release(&mut self, buffer: usize) {
        self.reads[buffer] = 0;
        self.free.insert(buffer);
    }

    fn consume(&mut self, buffer: usize) {
        self.reads[buffer] = self.reads[buffer].saturating_sub(1);
        if self.reads[buffer] == 0 {
            self.release(buffer);
        }
    }

    /// Routes `sources` into one buffer for the consuming channel.
    fn gather(&mut self, ops: &mut Vec<RenderOp>, sources: &[usize], signal: Signal) -> usize {
        let Some((&first, rest)) = sources.split_first() else {
            let buffer = self.acquire();
            ops.push(signal.clear(buffer));
            return buffer;
        };
        let buffer = if self.reads[first] == 1 {
            // Last reader: take the buffer over in place.
            self.reads[first] = 0;
            first
        } else {
            let buffer = self.acquire();
            ops.push(signal.copy(first, buffer));
            self.consume(first);
            buffer
        };
        for &src in rest {
            debug_assert_ne!(src, buffer);
            ops.push(signal.add(src, buffer));
            self.consume(src);
        }
        buffer
    }

    fn count(&self) -> usize {
        self.reads.len()
    }
}

/// Compiles the current topology.
pub(crate) fn compile(
    nodes: &[Option<GraphNode>],
    slot_of: &HashMap<NodeId, usize>,
    connections: &[Connection],
) -> RenderSequence {
    let layouts: Vec<Option<PortLayout>> = nodes
        .iter()
        .map(|n| n.as_ref().map(GraphNode::layout))
        .collect();

    let edges: Vec<Edge> = connections
        .iter()
        .filter_map(|c| {
            let src = *slot_of.get(&c.source_node)?;
            let dst = *slot_of.get(&c.dest_node)?;
            let fits = c.fits(layouts[src].as_ref()?, layouts[dst].as_ref()?);
            fits.then_some(Edge {
                src,
                src_port: c.source_port,
                dst,
                dst_port: c.dest_port,
            })
        })
        .collect();

    let order = schedule_order(nodes, &edges);

    let mut readers: HashMap<(usize, u32), usize> = HashMap::new();
    let mut feeds: HashMap<(usize, u32), Vec<(usize, u32)>> = HashMap::new();
    for e in &edges {
        *readers.entry((e.src, e.src_port)).or_default() += 1;
        feeds
            .entry((e.dst, e.dst_port))
            .or_default()
            .push((e.src, e.src_port));
    }

    let mut audio = Allocator::default();
    let mut midi = Allocator::default();
    // Output port -> buffer holding its signal, while it still has readers.
    let mut produced: HashMap<(usize, u32), usize> = HashMap::new();
    let mut ops = Vec::new();
    let mut channel_map = Vec::new();
    let mut node_order = Vec::with_capacity(order.len());

    let sources_of = |produced: &HashMap<(usize, u32), usize>, slot: usize, port: Option<u32>| {
        port.and_then(|p| feeds.get(&(slot, p)))
            .map(|srcs| {
                srcs.iter()
                    .filter_map(|s| produced.get(s).copied())
                    .collect::<Vec<usize>>()
            })
            .unwrap_or_default()
    };

    for &slot in &order {
        let (Some(node), Some(layout)) = (nodes[slot].as_ref(), layouts[slot]) else {
            continue;
        };
        let audio_channels = layout.block_audio_channels();
        let control_channels = layout.block_control_channels();
        let start = channel_map.len();

        for k in 0..audio_channels + control_channels {
            let port = if k < audio_channels {
                layout.port_for_channel(PortDirection::Input, PortType::Audio, k)
            } else {
                layout.port_for_channel(PortDirection::Input, PortType::Control, k - audio_channels)
            };
            let sources: Vec<usize> = sources_of(&produced, slot, port);
            channel_map.push(audio.gather(&mut ops, &sources, Signal::Audio));
        }
        let midi_sources: Vec<usize> =
            sources_of(&produced, slot, layout.midi_port(PortDirection::Input));
        let midi_buffer = midi.gather(&mut ops, &midi_sources, Signal::Midi);

        let channels = ChannelSpan {
            start,
            audio: audio_channels,
            control: control_channels,
        };
        let id = node.id();
        ops.push(match node.io_type() {
            Some(io) => RenderOp::ProcessIo {
                slot,
                node: id,
                io,
                channels,
                midi: midi_buffer,
            },
            None if !node.is_prepared() => RenderOp::PassThrough {
                slot,
                node: id,
                channels,
                midi: midi_buffer,
            },
            None => RenderOp::ProcessNode {
                slot,
                node: id,
                channels,
                midi: midi_buffer,
            },
        });
        node_order.push(id);

        let mut kept = vec![false; audio_channels + control_channels];
        for port in 0..layout.num_ports(PortDirection::Output) as u32 {
            let Some(k) = layout.block_channel(PortDirection::Output, port) else {
                continue;
            };
            let reads = readers.get(&(slot, port)).copied().unwrap_or(0);
            if reads > 0 {
                let buffer = channel_map[start + k];
                audio.retain(buffer, reads);
                produced.insert((slot, port), buffer);
                kept[k] = true;
            }
        }
        for (k, kept) in kept.into_iter().enumerate() {
            if !kept {
                audio.release(channel_map[start + k]);
            }
        }

        let midi_reads = layout
            .midi_port(PortDirection::Output)
            .map(|port| (port, readers.get(&(slot, port)).copied().unwrap_or(0)));
        match midi_reads {
            Some((port, reads)) if reads > 0 => {
                midi.retain(midi_buffer, reads);
                produced.insert((slot, port), midi_buffer);
            }
            _ => midi.release(midi_buffer),
        }
    }

    let sequence = RenderSequence {
        ops,
        channel_map,
        audio_buffers: audio.count(),
        midi_buffers: midi.count(),
        node_order,
    };

    #[cfg(feature = "tracing")]
    {
        tracing::debug!(
            "graph_compile: {} nodes, {} ops, {} audio buffers, {} midi buffers",
            sequence.node_order.len(),
            sequence.ops.len(),
            sequence.audio_buffers,
            sequence.midi_buffers
        );
        for (i, op) in sequence.ops.iter().enumerate() {
            tracing::debug!("  op[{i}]: {op}");
        }
    }

    sequence
}

/// Kahn's algorithm over arena slots, ready nodes taken in insertion order.
fn schedule_order(nodes: &[Option<GraphNode>], edges: &[Edge]) -> Vec<usize> {
    let mut in_degree = vec![0usize; nodes.len()];
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    for e in edges {
        in_degree[e.dst] += 1;
        outgoing[e.src].push(e.dst);
    }

    let mut ready: BinaryHeap<Reverse<(u64, usize)>> = nodes
        .iter()
        .enumerate()
        .filter_map(|(slot, node)| {
            let node = node.as_ref()?;
            (in_degree[slot] == 0).then_some(Reverse((node.order(), slot)))
        })
        .collect();

    let live = nodes.iter().filter(|n| n.is_some()).count();
    let mut sorted = Vec::with_capacity(live);
    while let Some(Reverse((_, slot))) = ready.pop() {
        sorted.push(slot);
        for &next in &outgoing[slot] {
            in_degree[next] -= 1;
            if in_degree[next] == 0
                && let Some(node) = &nodes[next]
            {
                ready.push(Reverse((node.order(), next)));
            }
        }
    }

    // Connections are checked for cycles when added, so this only trips on
    // an internal bug. Schedule the leftovers anyway rather than drop them.
    if sorted.len() < live {
        #[cfg(feature = "tracing")]
        tracing::warn!("graph_compile: {} nodes left on a cycle", live - sorted.len());
        let mut rest: Vec<(u64, usize)> = nodes
            .iter()
            .enumerate()
            .filter_map(|(slot, n)| Some((n.as_ref()?.order(), slot)))
            .filter(|(_, slot)| in_degree[*slot] > 0)
            .collect();
        rest.sort_unstable();
        sorted.extend(rest.into_iter().map(|(_, slot)| slot));
    }

    sorted
}
