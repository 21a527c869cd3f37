//! Integration tests for patchbay-config: file round trips and building
//! runnable graphs from configs.

use patchbay_config::{ConfigError, GraphConfig};
use patchbay_core::{AudioBuffer, MidiBuffer, MidiEvent};
use tempfile::TempDir;

#[test]
fn test_config_save_load_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("graph.toml");

    let config = GraphConfig {
        name: "Roundtrip".to_string(),
        sample_rate: 44100,
        block_size: 128,
        audio_inputs: 1,
        ..GraphConfig::default()
    };
    config.save(&path).unwrap();
    assert!(path.exists());

    let loaded = GraphConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = GraphConfig::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
}

#[test]
fn test_load_malformed_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "block_size = \"large\"").unwrap();
    assert!(matches!(
        GraphConfig::load(&path),
        Err(ConfigError::TomlParse(_))
    ));
}

#[test]
fn test_configured_graph_passes_audio_and_midi() {
    let config = GraphConfig::from_toml(
        r#"
        sample_rate = 48000
        block_size = 32
        audio_inputs = 2
        audio_outputs = 2
        "#,
    )
    .unwrap();
    let built = config.build_graph().unwrap();
    let mut graph = built.graph;
    let (audio_in, audio_out) = (built.audio_input.unwrap(), built.audio_output.unwrap());
    let (midi_in, midi_out) = (built.midi_input.unwrap(), built.midi_output.unwrap());
    assert!(graph.connect_audio(audio_in, audio_out));
    let midi_ports = (
        graph.node_for_id(midi_in).and_then(|n| n.midi_output_port()),
        graph.node_for_id(midi_out).and_then(|n| n.midi_input_port()),
    );
    let (Some(sp), Some(dp)) = midi_ports else {
        panic!("MIDI IO nodes expose MIDI ports");
    };
    assert!(graph.add_connection(midi_in, sp, midi_out, dp));

    let mut audio = AudioBuffer::from_channels(vec![vec![0.5; 32], vec![-0.5; 32]]);
    let mut midi = MidiBuffer::with_capacity(8);
    midi.push(MidiEvent::note_on(4, 1, 60, 80));
    graph.process_block(&mut audio.as_block(), &mut midi);

    assert_eq!(audio.channel(0), &[0.5; 32]);
    assert_eq!(audio.channel(1), &[-0.5; 32]);
    assert_eq!(midi.events(), &[MidiEvent::note_on(4, 1, 60, 80)]);
}
