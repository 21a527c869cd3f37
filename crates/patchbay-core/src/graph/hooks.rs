//! Per-node render hooks.
//!
//! The executor calls [`RenderHooks::pre_render`] immediately before and
//! [`RenderHooks::post_render`] immediately after each node's processing step.
//! The default [`GainAndMeters`] applies the node's input and output gain,
//! ramping from the previous block's value, and writes RMS meters.

use crate::buffer::{AudioBlock, MidiBuffer};

use super::node::GraphNode;

/// Hooks run around every node's processing step on the audio thread.
///
/// Implementations must be real-time safe.
pub trait RenderHooks: Send {
    /// Called with the node's block after its inputs have been routed in.
    fn pre_render(&mut self, node: &GraphNode, audio: &mut AudioBlock<'_>, midi: &mut MidiBuffer);

    /// Called with the node's block after it has been processed.
    fn post_render(&mut self, node: &GraphNode, audio: &mut AudioBlock<'_>, midi: &mut MidiBuffer);
}

/// Hooks that do nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl RenderHooks for NoHooks {
    fn pre_render(&mut self, _: &GraphNode, _: &mut AudioBlock<'_>, _: &mut MidiBuffer) {}
    fn post_render(&mut self, _: &GraphNode, _: &mut AudioBlock<'_>, _: &mut MidiBuffer) {}
}

/// Default hooks: ramped input/output gain plus RMS metering.
#[derive(Debug, Default, Clone, Copy)]
pub struct GainAndMeters;

impl RenderHooks for GainAndMeters {
    fn pre_render(&mut self, node: &GraphNode, audio: &mut AudioBlock<'_>, _midi: &mut MidiBuffer) {
        let channels = node.num_audio_inputs().min(audio.num_channels());
        let (start, end) = (node.last_input_gain(), node.input_gain());
        for ch in 0..channels {
            let samples = audio.channel_mut(ch);
            apply_gain_ramp(samples, start, end);
            node.set_input_rms(ch, rms(samples));
        }
        node.update_input_gain();
    }

    fn post_render(
        &mut self,
        node: &GraphNode,
        audio: &mut AudioBlock<'_>,
        _midi: &mut MidiBuffer,
    ) {
        let channels = node.num_audio_outputs().min(audio.num_channels());
        let (start, end) = (node.last_gain(), node.gain());
        for ch in 0..channels {
            let samples = audio.channel_mut(ch);
            apply_gain_ramp(samples, start, end);
            node.set_output_rms(ch, rms(samples));
        }
        node.update_gain();
    }
}

/// Multiplies `samples` by a gain moving linearly from `start` to `end`.
pub fn apply_gain_ramp(samples: &mut [f32], start: f32, end: f32) {
    if start == end {
        if start != 1.0 {
            for s in samples.iter_mut() {
                *s *= start;
            }
        }
        return;
    }
    let step = (end - start) / samples.len().max(1) as f32;
    let mut gain = start;
    for s in samples.iter_mut() {
        gain += step;
        *s *= gain;
    }
}

/// Root-mean-square level of `samples`, `0.0` when empty.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}
