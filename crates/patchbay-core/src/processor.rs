//! The processing contract every graph node wraps.
//!
//! A [`Processor`] is anything that turns a block of audio (and optionally
//! control signals and MIDI) into another block. Plugin hosts, test signals,
//! the graph's own IO boundary and whole nested graphs all implement it; the
//! graph only ever talks to them through this trait plus a [`ProcessorKind`]
//! tag.
//!
//! # Port numbering
//!
//! Ports are numbered per direction: audio channels first, then control
//! channels, then the single MIDI port if the processor has one. A processor
//! with 2 audio inputs, 1 control input and MIDI input has input ports
//! `0, 1` (audio), `2` (control) and `3` (MIDI). [`PortLayout`] does the
//! arithmetic.

use crate::buffer::{AudioBlock, MidiBuffer};
use crate::error::ProcessorError;
use crate::graph::GraphProcessor;

/// Signal domain of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortType {
    /// Audio-rate sample stream.
    Audio,
    /// Audio-rate control (CV) stream.
    Control,
    /// Timestamped MIDI events.
    Midi,
}

/// Which side of a processor a port sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    /// Signal flows into the processor.
    Input,
    /// Signal flows out of the processor.
    Output,
}

/// Kind of graph IO boundary processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IoType {
    /// Feeds the graph's incoming audio into the graph.
    AudioInput,
    /// Collects audio leaving the graph.
    AudioOutput,
    /// Feeds the graph's incoming MIDI into the graph.
    MidiInput,
    /// Collects MIDI leaving the graph.
    MidiOutput,
}

impl IoType {
    /// Returns `true` for the two input kinds.
    pub fn is_input(self) -> bool {
        matches!(self, Self::AudioInput | Self::MidiInput)
    }

    /// Returns `true` for the two output kinds.
    pub fn is_output(self) -> bool {
        !self.is_input()
    }

    /// Returns `true` for the two audio kinds.
    pub fn is_audio(self) -> bool {
        matches!(self, Self::AudioInput | Self::AudioOutput)
    }

    /// Returns `true` for the two MIDI kinds.
    pub fn is_midi(self) -> bool {
        !self.is_audio()
    }

    /// Short display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::AudioInput => "Audio Input",
            Self::AudioOutput => "Audio Output",
            Self::MidiInput => "MIDI Input",
            Self::MidiOutput => "MIDI Output",
        }
    }
}

/// Capability tag reported by every [`Processor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessorKind {
    /// An ordinary processing unit.
    Plugin,
    /// A graph IO boundary of the given type.
    Io(IoType),
    /// A nested [`GraphProcessor`].
    Graph,
}

/// Play parameters handed to [`Processor::prepare`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayConfig {
    /// Sample rate in Hz.
    pub sample_rate: f32,
    /// Maximum number of frames per process call.
    pub block_size: usize,
}

/// What a node knows about the graph that owns it.
///
/// This is a description of the parent, not a handle to it: nodes never own
/// or reach into their graph. IO processors use it to size themselves to the
/// graph's external channel layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphContext {
    /// Parent sample rate in Hz (0 until the parent is prepared).
    pub sample_rate: f32,
    /// Parent block size (0 until the parent is prepared).
    pub block_size: usize,
    /// Audio channels entering the parent graph.
    pub audio_inputs: usize,
    /// Audio channels leaving the parent graph.
    pub audio_outputs: usize,
}

/// A unit of audio/MIDI processing hosted by a graph node.
///
/// Implementations must be `Send`: nodes are built on a control thread and
/// processed on the audio thread.
///
/// [`process`](Self::process) runs on the real-time thread and must not block
/// or allocate. The block it receives has `max(audio_inputs, audio_outputs)`
/// audio channels followed by `max(control_inputs, control_outputs)` control
/// channels; inputs arrive in the leading channels and outputs are written in
/// place.
pub trait Processor: Send {
    /// Display name.
    fn name(&self) -> &str {
        "Processor"
    }

    /// Capability tag. Defaults to [`ProcessorKind::Plugin`].
    fn kind(&self) -> ProcessorKind {
        ProcessorKind::Plugin
    }

    /// Number of audio input channels.
    fn audio_inputs(&self) -> usize;

    /// Number of audio output channels.
    fn audio_outputs(&self) -> usize;

    /// Number of control input channels.
    fn control_inputs(&self) -> usize {
        0
    }

    /// Number of control output channels.
    fn control_outputs(&self) -> usize {
        0
    }

    /// Whether the processor has a MIDI input port.
    fn accepts_midi(&self) -> bool {
        false
    }

    /// Whether the processor has a MIDI output port.
    fn produces_midi(&self) -> bool {
        false
    }

    /// Called when the processor is placed into a graph.
    fn attach(&mut self, _parent: &GraphContext) {}

    /// Allocates whatever the processor needs to run at `config`.
    fn prepare(&mut self, config: &PlayConfig) -> Result<(), ProcessorError>;

    /// Releases resources acquired in [`prepare`](Self::prepare).
    fn release(&mut self) {}

    /// Clears internal state (delay lines, envelopes) without reallocating.
    fn reset(&mut self) {}

    /// Processes one block in place.
    fn process(&mut self, audio: &mut AudioBlock<'_>, midi: &mut MidiBuffer);

    /// Downcast to a nested graph.
    fn as_graph(&self) -> Option<&GraphProcessor> {
        None
    }

    /// Mutable downcast to a nested graph.
    fn as_graph_mut(&mut self) -> Option<&mut GraphProcessor> {
        None
    }
}

/// Port and channel arithmetic for one processor, captured at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortLayout {
    /// Audio input channels.
    pub audio_inputs: usize,
    /// Audio output channels.
    pub audio_outputs: usize,
    /// Control input channels.
    pub control_inputs: usize,
    /// Control output channels.
    pub control_outputs: usize,
    /// Has a MIDI input port.
    pub midi_input: bool,
    /// Has a MIDI output port.
    pub midi_output: bool,
}

impl PortLayout {
    /// Reads the current counts from `processor`.
    pub fn of(processor: &dyn Processor) -> Self {
        Self {
            audio_inputs: processor.audio_inputs(),
            audio_outputs: processor.audio_outputs(),
            control_inputs: processor.control_inputs(),
            control_outputs: processor.control_outputs(),
            midi_input: processor.accepts_midi(),
            midi_output: processor.produces_midi(),
        }
    }

    fn counts(&self, direction: PortDirection) -> (usize, usize, bool) {
        match direction {
            PortDirection::Input => (self.audio_inputs, self.control_inputs, self.midi_input),
            PortDirection::Output => (self.audio_outputs, self.control_outputs, self.midi_output),
        }
    }

    /// Total ports on one side.
    pub fn num_ports(&self, direction: PortDirection) -> usize {
        let (audio, control, midi) = self.counts(direction);
        audio + control + usize::from(midi)
    }

    /// Domain of `port`, or `None` if out of range.
    pub fn port_type(&self, direction: PortDirection, port: u32) -> Option<PortType> {
        self.channel_for_port(direction, port).map(|(ty, _)| ty)
    }

    /// Splits `port` into its domain and per-domain channel index.
    pub fn channel_for_port(
        &self,
        direction: PortDirection,
        port: u32,
    ) -> Option<(PortType, usize)> {
        let (audio, control, midi) = self.counts(direction);
        let port = port as usize;
        if port < audio {
            Some((PortType::Audio, port))
        } else if port < audio + control {
            Some((PortType::Control, port - audio))
        } else if midi && port == audio + control {
            Some((PortType::Midi, 0))
        } else {
            None
        }
    }

    /// Port index of `channel` within domain `ty`, or `None` if out of range.
    pub fn port_for_channel(
        &self,
        direction: PortDirection,
        ty: PortType,
        channel: usize,
    ) -> Option<u32> {
        let (audio, control, midi) = self.counts(direction);
        let port = match ty {
            PortType::Audio if channel < audio => channel,
            PortType::Control if channel < control => audio + channel,
            PortType::Midi if midi && channel == 0 => audio + control,
            _ => return None,
        };
        Some(port as u32)
    }

    /// Index of the MIDI port on one side, if present.
    pub fn midi_port(&self, direction: PortDirection) -> Option<u32> {
        self.port_for_channel(direction, PortType::Midi, 0)
    }

    /// Audio channels in the node's processing block.
    pub fn block_audio_channels(&self) -> usize {
        self.audio_inputs.max(self.audio_outputs)
    }

    /// Control channels in the node's processing block.
    pub fn block_control_channels(&self) -> usize {
        self.control_inputs.max(self.control_outputs)
    }

    /// Position of a port's signal inside the node's processing block, for
    /// audio and control ports.
    pub fn block_channel(&self, direction: PortDirection, port: u32) -> Option<usize> {
        match self.channel_for_port(direction, port)? {
            (PortType::Audio, ch) => Some(ch),
            (PortType::Control, ch) => Some(self.block_audio_channels() + ch),
            (PortType::Midi, _) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> PortLayout {
        PortLayout {
            audio_inputs: 2,
            audio_outputs: 1,
            control_inputs: 1,
            control_outputs: 0,
            midi_input: true,
            midi_output: false,
        }
    }

    #[test]
    fn input_ports_are_audio_then_control_then_midi() {
        let l = layout();
        assert_eq!(l.num_ports(PortDirection::Input), 4);
        assert_eq!(l.port_type(PortDirection::Input, 0), Some(PortType::Audio));
        assert_eq!(l.port_type(PortDirection::Input, 1), Some(PortType::Audio));
        assert_eq!(l.port_type(PortDirection::Input, 2), Some(PortType::Control));
        assert_eq!(l.port_type(PortDirection::Input, 3), Some(PortType::Midi));
        assert_eq!(l.port_type(PortDirection::Input, 4), None);
    }

    #[test]
    fn output_side_has_no_midi() {
        let l = layout();
        assert_eq!(l.num_ports(PortDirection::Output), 1);
        assert_eq!(l.midi_port(PortDirection::Output), None);
        assert_eq!(l.port_type(PortDirection::Output, 1), None);
    }

    #[test]
    fn port_for_channel_inverts_channel_for_port() {
        let l = layout();
        for port in 0..4 {
            let (ty, ch) = l.channel_for_port(PortDirection::Input, port).unwrap();
            assert_eq!(l.port_for_channel(PortDirection::Input, ty, ch), Some(port));
        }
        assert_eq!(l.port_for_channel(PortDirection::Input, PortType::Control, 1), None);
    }

    #[test]
    fn block_channels_place_control_after_audio() {
        let l = layout();
        assert_eq!(l.block_audio_channels(), 2);
        assert_eq!(l.block_control_channels(), 1);
        assert_eq!(l.block_channel(PortDirection::Input, 2), Some(2));
        assert_eq!(l.block_channel(PortDirection::Input, 3), None);
    }

    #[test]
    fn io_type_classification() {
        assert!(IoType::AudioInput.is_input() && IoType::AudioInput.is_audio());
        assert!(IoType::MidiOutput.is_output() && IoType::MidiOutput.is_midi());
    }
}
