//! Render a demo graph offline while a control thread changes its level.

use std::thread;

use clap::Args;
use patchbay_core::{AudioBuffer, MidiBuffer};

use super::common::GraphArgs;
use crate::demo::{self, Demo};

/// Render a demo graph and print per-node meters.
#[derive(Args)]
pub struct RunArgs {
    /// Topology to build
    #[arg(long, value_enum, default_value = "chain")]
    pub demo: Demo,

    #[command(flatten)]
    pub graph: GraphArgs,

    /// Number of blocks to render
    #[arg(long, default_value = "64")]
    pub blocks: usize,

    /// Level gain set from the control thread halfway through
    #[arg(long, default_value = "0.5")]
    pub gain: f32,
}

/// Run the run command.
pub fn run(args: RunArgs) -> anyhow::Result<()> {
    if args.blocks == 0 {
        anyhow::bail!("--blocks must be at least 1");
    }
    if !args.gain.is_finite() || args.gain < 0.0 {
        anyhow::bail!("--gain must be a finite, non-negative value");
    }

    let config = args.graph.resolve()?;
    let mut built = config.build_graph()?;
    let level = demo::build(args.demo, &mut built)?;
    let mut graph = built.graph;

    let controls = graph
        .node_for_id(level)
        .map(|node| node.controls())
        .ok_or_else(|| anyhow::anyhow!("level node {level} missing"))?;

    let channels = graph.audio_input_channels().max(graph.audio_output_channels());
    let mut audio = AudioBuffer::new(channels, config.block_size);
    let mut midi = MidiBuffer::with_capacity(config.midi_capacity);
    let mut peak = 0.0f32;

    let half = args.blocks / 2;
    let gain = args.gain;
    let mut control = Some(thread::spawn(move || controls.set_gain(gain)));

    for block in 0..args.blocks {
        // Blocks from the midpoint on must see the new target.
        if block == half
            && let Some(handle) = control.take()
        {
            handle
                .join()
                .map_err(|_| anyhow::anyhow!("control thread panicked"))?;
            tracing::debug!(block, gain, "level gain updated");
        }
        audio.clear();
        midi.clear();
        graph.process_block(&mut audio.as_block(), &mut midi);
        if block + 1 == args.blocks {
            peak = (0..audio.num_channels())
                .flat_map(|ch| audio.channel(ch).iter())
                .fold(0.0f32, |acc, s| acc.max(s.abs()));
        }
    }

    tracing::info!(
        blocks = args.blocks,
        rebuilds = graph.rebuild_count(),
        "render complete"
    );

    println!(
        "Rendered {} blocks of {} frames ({:?} demo)",
        args.blocks, config.block_size, args.demo
    );
    println!("\n  Node  Name          In RMS    Out RMS   Gain");
    for node in graph.nodes() {
        let Some(meters) = node.meters() else {
            continue;
        };
        let input = (meters.num_inputs() > 0).then(|| meters.input_rms(0));
        let output = (meters.num_outputs() > 0).then(|| meters.output_rms(0));
        println!(
            "  {:>4}  {:<12}  {:<8}  {:<8}  {:.3}",
            node.id().get(),
            node.name(),
            format_level(input),
            format_level(output),
            node.last_gain()
        );
    }
    println!("\nOutput peak: {peak:.4}");

    Ok(())
}

fn format_level(rms: Option<f32>) -> String {
    match rms {
        Some(value) => format!("{value:.4}"),
        None => "-".to_string(),
    }
}
