//! Render-sequence execution.
//!
//! [`render`] walks a compiled [`RenderSequence`] once per block. It is a free
//! function over disjoint borrows so the graph can hand in its node arena, pool
//! and IO scratch without the borrow checker seeing one big `&mut self`.
//!
//! Zero allocations: the pool and IO scratch are sized before the call, and
//! MIDI buffers keep their capacity across blocks.

use crate::buffer::{AudioBlock, AudioBuffer, BufferPool, MidiBuffer};
use crate::processor::IoType;

use super::hooks::RenderHooks;
use super::node::GraphNode;
use super::sequence::{ChannelSpan, RenderOp, RenderSequence};

/// What crosses the graph boundary during one block.
pub(crate) struct BoundaryIo<'a, 'b> {
    /// Audio entering the graph.
    pub input: &'a AudioBlock<'b>,
    /// MIDI entering the graph.
    pub midi_in: &'a MidiBuffer,
    /// Audio leaving the graph (summed into).
    pub output: &'a mut AudioBuffer,
    /// MIDI leaving the graph (merged into).
    pub midi_out: &'a mut MidiBuffer,
}

/// Executes `sequence` for `len` frames.
pub(crate) fn render(
    nodes: &mut [Option<GraphNode>],
    sequence: &RenderSequence,
    pool: &mut BufferPool,
    hooks: &mut dyn RenderHooks,
    io: &mut BoundaryIo<'_, '_>,
    len: usize,
) {
    let BufferPool { audio, midi, .. } = pool;

    for op in &sequence.ops {
        match op {
            RenderOp::ClearAudio { buffer } => audio[*buffer][..len].fill(0.0),

            RenderOp::CopyAudio { source, dest } => {
                if source != dest {
                    let (src, dst) = crate::buffer::ref_and_mut(audio, *source, *dest);
                    dst[..len].copy_from_slice(&src[..len]);
                }
            }

            RenderOp::AddAudio { source, dest } => {
                if source != dest {
                    let (src, dst) = crate::buffer::ref_and_mut(audio, *source, *dest);
                    for (d, s) in dst[..len].iter_mut().zip(&src[..len]) {
                        *d += *s;
                    }
                }
            }

            RenderOp::ClearMidi { buffer } => midi[*buffer].clear(),

            RenderOp::CopyMidi { source, dest } => {
                if source != dest {
                    let (src, dst) = crate::buffer::ref_and_mut(midi, *source, *dest);
                    dst.copy_from(src);
                }
            }

            RenderOp::AddMidi { source, dest } => {
                if source != dest {
                    let (src, dst) = crate::buffer::ref_and_mut(midi, *source, *dest);
                    dst.add_from(src);
                }
            }

            RenderOp::ProcessNode {
                slot,
                channels,
                midi: midi_idx,
                ..
            } => {
                let Some(Some(node)) = nodes.get_mut(*slot) else {
                    continue;
                };
                // Prepared state can only drop between rebuilds via release,
                // which also forces a rebuild; treat it as pass-through anyway.
                if !node.is_prepared() {
                    continue;
                }
                let mut block = node_block(audio, sequence, *channels, len);
                let node_midi = &mut midi[*midi_idx];
                if node.is_suspended() {
                    block.clear();
                    node_midi.clear();
                    // Resume ramps from the targets set while suspended.
                    node.update_input_gain();
                    node.update_gain();
                    continue;
                }
                hooks.pre_render(node, &mut block, node_midi);
                node.processor_mut().process(&mut block, node_midi);
                hooks.post_render(node, &mut block, node_midi);
            }

            RenderOp::ProcessIo {
                slot,
                io: io_type,
                channels,
                midi: midi_idx,
                ..
            } => {
                let Some(Some(node)) = nodes.get(*slot) else {
                    continue;
                };
                let mut block = node_block(audio, sequence, *channels, len);
                let node_midi = &mut midi[*midi_idx];
                hooks.pre_render(node, &mut block, node_midi);
                match io_type {
                    IoType::AudioInput => {
                        for ch in 0..block.num_channels() {
                            let dst = block.channel_mut(ch);
                            if ch < io.input.num_channels() {
                                dst.copy_from_slice(&io.input.channel(ch)[..len]);
                            } else {
                                dst.fill(0.0);
                            }
                        }
                    }
                    IoType::AudioOutput => {
                        let channels = block.num_channels().min(io.output.num_channels());
                        for ch in 0..channels {
                            let out = &mut io.output.channel_mut(ch)[..len];
                            for (o, s) in out.iter_mut().zip(block.channel(ch)) {
                                *o += *s;
                            }
                        }
                    }
                    IoType::MidiInput => node_midi.copy_from(io.midi_in),
                    IoType::MidiOutput => io.midi_out.add_from(node_midi),
                }
                hooks.post_render(node, &mut block, node_midi);
            }

            // Inputs already sit in the node's block; extra outputs were cleared.
            RenderOp::PassThrough { .. } => {}
        }
    }
}

fn node_block<'a>(
    audio: &'a mut [Vec<f32>],
    sequence: &'a RenderSequence,
    span: ChannelSpan,
    len: usize,
) -> AudioBlock<'a> {
    AudioBlock::mapped(audio, sequence.channels(span), span.audio, span.control, len)
}
