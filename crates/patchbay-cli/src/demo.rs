//! Demo processors and graph topologies for the CLI.

use std::f32::consts::TAU;

use clap::ValueEnum;
use patchbay_config::ConfiguredGraph;
use patchbay_core::{
    AudioBlock, GraphProcessor, IoType, MidiBuffer, NodeId, PlayConfig, Processor,
    ProcessorError,
};

/// Sine oscillator writing the same signal to every output channel.
pub struct Sine {
    name: String,
    channels: usize,
    frequency: f32,
    amplitude: f32,
    phase: f32,
    phase_inc: f32,
}

impl Sine {
    pub fn new(name: &str, channels: usize, frequency: f32, amplitude: f32) -> Self {
        Self {
            name: name.to_string(),
            channels,
            frequency,
            amplitude,
            phase: 0.0,
            phase_inc: 0.0,
        }
    }
}

impl Processor for Sine {
    fn name(&self) -> &str {
        &self.name
    }

    fn audio_inputs(&self) -> usize {
        0
    }

    fn audio_outputs(&self) -> usize {
        self.channels
    }

    fn prepare(&mut self, config: &PlayConfig) -> Result<(), ProcessorError> {
        self.phase_inc = self.frequency / config.sample_rate;
        self.phase = 0.0;
        Ok(())
    }

    fn reset(&mut self) {
        self.phase = 0.0;
    }

    fn process(&mut self, audio: &mut AudioBlock<'_>, _midi: &mut MidiBuffer) {
        let start = self.phase;
        for ch in 0..audio.num_channels() {
            let mut phase = start;
            for sample in audio.channel_mut(ch) {
                *sample = (phase * TAU).sin() * self.amplitude;
                phase = (phase + self.phase_inc).fract();
            }
            self.phase = phase;
        }
    }
}

/// Fixed gain applied to every channel.
pub struct Gain {
    name: String,
    channels: usize,
    gain: f32,
}

impl Gain {
    pub fn new(name: &str, channels: usize, gain: f32) -> Self {
        Self {
            name: name.to_string(),
            channels,
            gain,
        }
    }
}

impl Processor for Gain {
    fn name(&self) -> &str {
        &self.name
    }

    fn audio_inputs(&self) -> usize {
        self.channels
    }

    fn audio_outputs(&self) -> usize {
        self.channels
    }

    fn prepare(&mut self, _config: &PlayConfig) -> Result<(), ProcessorError> {
        Ok(())
    }

    fn process(&mut self, audio: &mut AudioBlock<'_>, _midi: &mut MidiBuffer) {
        for ch in 0..audio.num_channels() {
            for sample in audio.channel_mut(ch) {
                *sample *= self.gain;
            }
        }
    }
}

/// Built-in graph topologies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Demo {
    /// Sine -> Pre -> Level -> out
    Chain,
    /// Sine split into two gains, summed into Level -> out
    Diamond,
    /// Sine -> nested graph -> Level -> out
    Subgraph,
}

/// Populate `built` with a demo topology and return the id of its "Level"
/// node, the last processor before the audio output.
pub fn build(demo: Demo, built: &mut ConfiguredGraph) -> anyhow::Result<NodeId> {
    let channels = built.graph.audio_output_channels();
    let Some(output) = built.audio_output else {
        anyhow::bail!("demo graphs need at least one audio output channel");
    };
    let graph = &mut built.graph;

    let sine = graph.add_node(Box::new(Sine::new("Sine", channels, 440.0, 0.5)));
    let level = graph.add_node(Box::new(Gain::new("Level", channels, 1.0)));

    let linked = match demo {
        Demo::Chain => {
            let pre = graph.add_node(Box::new(Gain::new("Pre", channels, 0.5)));
            graph.connect_audio(sine, pre) && graph.connect_audio(pre, level)
        }
        Demo::Diamond => {
            let left = graph.add_node(Box::new(Gain::new("Left", channels, 0.5)));
            let right = graph.add_node(Box::new(Gain::new("Right", channels, 0.25)));
            graph.connect_audio(sine, left)
                && graph.connect_audio(sine, right)
                && graph.connect_audio(left, level)
                && graph.connect_audio(right, level)
        }
        Demo::Subgraph => {
            let inner = graph.add_node(Box::new(inner_graph(channels)?));
            graph.connect_audio(sine, inner) && graph.connect_audio(inner, level)
        }
    };
    if !(linked && graph.connect_audio(level, output)) {
        anyhow::bail!("failed to wire the {demo:?} demo");
    }

    tracing::debug!(nodes = graph.num_nodes(), connections = graph.num_connections(), "demo built");
    Ok(level)
}

fn inner_graph(channels: usize) -> anyhow::Result<GraphProcessor> {
    let mut inner = GraphProcessor::new(channels, channels).with_name("Inner");
    let input = inner.add_io_node(IoType::AudioInput);
    let output = inner.add_io_node(IoType::AudioOutput);
    let gain = inner.add_node(Box::new(Gain::new("Inner Gain", channels, 0.5)));
    if !(inner.connect_audio(input, gain) && inner.connect_audio(gain, output)) {
        anyhow::bail!("failed to wire the nested graph");
    }
    Ok(inner)
}
