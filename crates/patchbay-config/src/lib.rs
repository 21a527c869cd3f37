//! Configuration for patchbay audio graphs.
//!
//! A [`GraphConfig`] describes how a [`GraphProcessor`](patchbay_core::GraphProcessor)
//! should be laid out and prepared: sample rate, block size, external audio
//! channel counts and whether MIDI flows in and out. Configs are stored as
//! TOML; every field is optional.
//!
//! # Example
//!
//! ```rust,no_run
//! use patchbay_config::GraphConfig;
//!
//! let config = GraphConfig::load("graph.toml").unwrap();
//! let built = config.build_graph().unwrap();
//! let mut graph = built.graph;
//! // add processors, connect them to built.audio_input / built.audio_output
//! ```

mod error;
mod graph_config;

pub use error::ConfigError;
pub use graph_config::{ConfiguredGraph, GraphConfig, MAX_BLOCK_SIZE, MAX_CHANNELS};
