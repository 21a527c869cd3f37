//! Graph configuration: playback settings and external IO layout.

use std::path::Path;

use patchbay_core::{DEFAULT_MIDI_CAPACITY, GraphProcessor, IoType, NodeId};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Largest block size accepted by [`GraphConfig::validate`].
pub const MAX_BLOCK_SIZE: usize = 8192;

/// Largest channel count accepted on either side of the graph.
pub const MAX_CHANNELS: usize = 64;

fn default_name() -> String {
    String::from("Graph")
}

fn default_sample_rate() -> u32 {
    48000
}

fn default_block_size() -> usize {
    256
}

fn default_channels() -> usize {
    2
}

fn default_midi_io() -> bool {
    true
}

fn default_midi_capacity() -> usize {
    DEFAULT_MIDI_CAPACITY
}

/// Settings for building and preparing a [`GraphProcessor`].
///
/// Every field has a default, so an empty TOML document is a valid config:
///
/// ```toml
/// name = "Main"
/// sample_rate = 44100
/// block_size = 128
/// audio_inputs = 1
/// audio_outputs = 2
/// midi_io = false
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Display name given to the graph.
    #[serde(default = "default_name")]
    pub name: String,

    /// Sample rate in Hz.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Maximum frames per block.
    #[serde(default = "default_block_size")]
    pub block_size: usize,

    /// Audio channels entering the graph.
    #[serde(default = "default_channels")]
    pub audio_inputs: usize,

    /// Audio channels leaving the graph.
    #[serde(default = "default_channels")]
    pub audio_outputs: usize,

    /// Whether to add MIDI input and output nodes.
    #[serde(default = "default_midi_io")]
    pub midi_io: bool,

    /// Events preallocated per MIDI buffer.
    #[serde(default = "default_midi_capacity")]
    pub midi_capacity: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            sample_rate: default_sample_rate(),
            block_size: default_block_size(),
            audio_inputs: default_channels(),
            audio_outputs: default_channels(),
            midi_io: default_midi_io(),
            midi_capacity: default_midi_capacity(),
        }
    }
}

/// A graph built from a [`GraphConfig`], with the ids of its IO nodes.
///
/// An IO node is only added when the config has something for it to carry,
/// so a graph with no audio inputs has no audio input node.
#[derive(Debug)]
pub struct ConfiguredGraph {
    /// The prepared graph.
    pub graph: GraphProcessor,
    /// Audio input node.
    pub audio_input: Option<NodeId>,
    /// Audio output node.
    pub audio_output: Option<NodeId>,
    /// MIDI input node.
    pub midi_input: Option<NodeId>,
    /// MIDI output node.
    pub midi_output: Option<NodeId>,
}

impl GraphConfig {
    /// Load a config from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load a config from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the config to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks every field is something a graph can run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::invalid("sample_rate", "must be positive"));
        }
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(ConfigError::invalid(
                "block_size",
                format!("{} is outside 1..={MAX_BLOCK_SIZE}", self.block_size),
            ));
        }
        for (field, channels) in [
            ("audio_inputs", self.audio_inputs),
            ("audio_outputs", self.audio_outputs),
        ] {
            if channels > MAX_CHANNELS {
                return Err(ConfigError::invalid(
                    field,
                    format!("{channels} exceeds {MAX_CHANNELS} channels"),
                ));
            }
        }
        if self.midi_capacity == 0 {
            return Err(ConfigError::invalid("midi_capacity", "must be at least 1"));
        }
        Ok(())
    }

    /// Validates the config, then builds and prepares a graph holding only
    /// its IO nodes.
    pub fn build_graph(&self) -> Result<ConfiguredGraph, ConfigError> {
        self.validate()?;

        let mut graph = GraphProcessor::new(self.audio_inputs, self.audio_outputs)
            .with_name(self.name.as_str());
        graph.set_midi_capacity(self.midi_capacity);

        let audio_input = (self.audio_inputs > 0).then(|| graph.add_io_node(IoType::AudioInput));
        let audio_output =
            (self.audio_outputs > 0).then(|| graph.add_io_node(IoType::AudioOutput));
        let (midi_input, midi_output) = if self.midi_io {
            (
                Some(graph.add_io_node(IoType::MidiInput)),
                Some(graph.add_io_node(IoType::MidiOutput)),
            )
        } else {
            (None, None)
        };

        graph.prepare_to_play(self.sample_rate as f32, self.block_size);

        Ok(ConfiguredGraph {
            graph,
            audio_input,
            audio_output,
            midi_input,
            midi_output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = GraphConfig::from_toml("").unwrap();
        assert_eq!(config, GraphConfig::default());
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.midi_capacity, DEFAULT_MIDI_CAPACITY);
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = GraphConfig::from_toml("block_size = 64\nmidi_io = false").unwrap();
        assert_eq!(config.block_size, 64);
        assert!(!config.midi_io);
        assert_eq!(config.audio_outputs, 2);
    }

    #[test]
    fn toml_roundtrip() {
        let config = GraphConfig {
            name: "Bus".to_string(),
            sample_rate: 96000,
            audio_inputs: 0,
            ..GraphConfig::default()
        };
        let text = config.to_toml().unwrap();
        assert_eq!(GraphConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let cases = [
            GraphConfig {
                sample_rate: 0,
                ..GraphConfig::default()
            },
            GraphConfig {
                block_size: 0,
                ..GraphConfig::default()
            },
            GraphConfig {
                block_size: MAX_BLOCK_SIZE + 1,
                ..GraphConfig::default()
            },
            GraphConfig {
                audio_outputs: MAX_CHANNELS + 1,
                ..GraphConfig::default()
            },
            GraphConfig {
                midi_capacity: 0,
                ..GraphConfig::default()
            },
        ];
        for config in cases {
            assert!(
                matches!(config.validate(), Err(ConfigError::Invalid { .. })),
                "{config:?} should be rejected"
            );
        }
        assert!(GraphConfig::default().validate().is_ok());
    }

    #[test]
    fn build_graph_adds_configured_io() {
        let built = GraphConfig::default().build_graph().unwrap();
        assert!(built.graph.is_prepared());
        assert_eq!(built.graph.num_nodes(), 4);
        assert!(built.midi_input.is_some() && built.midi_output.is_some());
        assert_eq!(built.graph.block_size(), 256);

        let mono_out = GraphConfig {
            audio_inputs: 0,
            audio_outputs: 1,
            midi_io: false,
            ..GraphConfig::default()
        }
        .build_graph()
        .unwrap();
        assert!(mono_out.audio_input.is_none());
        assert_eq!(mono_out.graph.num_nodes(), 1);
        let output = mono_out.audio_output.unwrap();
        assert_eq!(
            mono_out.graph.node_for_id(output).map(|n| n.num_audio_inputs()),
            Some(1)
        );
    }

    #[test]
    fn build_graph_validates_first() {
        let config = GraphConfig {
            block_size: 0,
            ..GraphConfig::default()
        };
        assert!(config.build_graph().is_err());
    }
}
