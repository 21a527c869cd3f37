//! Graph IO boundary processors.
//!
//! A graph exchanges signal with whatever hosts it through four pseudo
//! processors. They are ordinary nodes as far as topology and compilation are
//! concerned; the executor recognises them by their [`ProcessorKind::Io`] tag
//! and moves data across the boundary in place of calling `process`.

use crate::buffer::{AudioBlock, MidiBuffer};
use crate::error::ProcessorError;
use crate::processor::{GraphContext, IoType, PlayConfig, Processor, ProcessorKind};

/// One side of a graph's external audio or MIDI connection.
///
/// Audio IO nodes size themselves from the parent's channel layout when
/// attached: an [`IoType::AudioInput`] node has one output per graph input
/// channel, an [`IoType::AudioOutput`] node one input per graph output channel.
#[derive(Debug, Clone)]
pub struct GraphIoProcessor {
    io_type: IoType,
    channels: usize,
}

impl GraphIoProcessor {
    /// Creates an unattached boundary of the given type.
    pub fn new(io_type: IoType) -> Self {
        Self {
            io_type,
            channels: 0,
        }
    }

    /// Boundary type.
    pub fn io_type(&self) -> IoType {
        self.io_type
    }
}

impl Processor for GraphIoProcessor {
    fn name(&self) -> &str {
        self.io_type.name()
    }

    fn kind(&self) -> ProcessorKind {
        ProcessorKind::Io(self.io_type)
    }

    fn audio_inputs(&self) -> usize {
        if self.io_type == IoType::AudioOutput {
            self.channels
        } else {
            0
        }
    }

    fn audio_outputs(&self) -> usize {
        if self.io_type == IoType::AudioInput {
            self.channels
        } else {
            0
        }
    }

    fn accepts_midi(&self) -> bool {
        self.io_type == IoType::MidiOutput
    }

    fn produces_midi(&self) -> bool {
        self.io_type == IoType::MidiInput
    }

    fn attach(&mut self, parent: &GraphContext) {
        self.channels = match self.io_type {
            IoType::AudioInput => parent.audio_inputs,
            IoType::AudioOutput => parent.audio_outputs,
            IoType::MidiInput | IoType::MidiOutput => 0,
        };
    }

    fn prepare(&mut self, _config: &PlayConfig) -> Result<(), ProcessorError> {
        Ok(())
    }

    // The executor copies across the boundary itself.
    fn process(&mut self, _audio: &mut AudioBlock<'_>, _midi: &mut MidiBuffer) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(ins: usize, outs: usize) -> GraphContext {
        GraphContext {
            sample_rate: 44100.0,
            block_size: 128,
            audio_inputs: ins,
            audio_outputs: outs,
        }
    }

    #[test]
    fn audio_io_sizes_from_parent() {
        let mut input = GraphIoProcessor::new(IoType::AudioInput);
        let mut output = GraphIoProcessor::new(IoType::AudioOutput);
        assert_eq!(input.audio_outputs(), 0);
        input.attach(&ctx(3, 1));
        output.attach(&ctx(3, 1));
        assert_eq!((input.audio_inputs(), input.audio_outputs()), (0, 3));
        assert_eq!((output.audio_inputs(), output.audio_outputs()), (1, 0));
    }

    #[test]
    fn midi_io_ports() {
        let input = GraphIoProcessor::new(IoType::MidiInput);
        let output = GraphIoProcessor::new(IoType::MidiOutput);
        assert!(input.produces_midi() && !input.accepts_midi());
        assert!(output.accepts_midi() && !output.produces_midi());
        assert_eq!(input.kind(), ProcessorKind::Io(IoType::MidiInput));
        assert_eq!(output.name(), "MIDI Output");
    }
}
