//! Shared CLI helpers used across multiple commands.

use clap::Args;
use patchbay_config::GraphConfig;
use std::path::PathBuf;

/// Graph settings shared by every command.
///
/// Flags override values from `--config`, which override the defaults.
#[derive(Args, Debug)]
pub struct GraphArgs {
    /// TOML graph config to start from
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Sample rate in Hz
    #[arg(long)]
    pub sample_rate: Option<u32>,

    /// Frames per block
    #[arg(long)]
    pub block_size: Option<usize>,

    /// Audio channels on both sides of the graph
    #[arg(long)]
    pub channels: Option<usize>,
}

impl GraphArgs {
    /// Resolve the effective config.
    pub fn resolve(&self) -> anyhow::Result<GraphConfig> {
        let mut config = match &self.config {
            Some(path) => GraphConfig::load(path)?,
            None => GraphConfig::default(),
        };
        if let Some(sample_rate) = self.sample_rate {
            config.sample_rate = sample_rate;
        }
        if let Some(block_size) = self.block_size {
            config.block_size = block_size;
        }
        if let Some(channels) = self.channels {
            config.audio_inputs = channels;
            config.audio_outputs = channels;
        }
        config.validate()?;
        Ok(config)
    }
}
