//! Print a demo graph's nodes, connections and compiled render sequence.

use clap::Args;
use std::path::PathBuf;

use super::common::GraphArgs;
use crate::demo::{self, Demo};

/// Inspect a demo graph.
#[derive(Args)]
pub struct InspectArgs {
    /// Topology to build
    #[arg(long, value_enum, default_value = "chain")]
    pub demo: Demo,

    #[command(flatten)]
    pub graph: GraphArgs,

    /// Write the effective graph config to this TOML file
    #[arg(long, value_name = "FILE")]
    pub save_config: Option<PathBuf>,
}

/// Run the inspect command.
pub fn run(args: InspectArgs) -> anyhow::Result<()> {
    let config = args.graph.resolve()?;
    if let Some(path) = &args.save_config {
        config.save(path)?;
        tracing::info!(path = %path.display(), "saved graph config");
    }

    let mut built = config.build_graph()?;
    demo::build(args.demo, &mut built)?;
    let graph = &mut built.graph;
    graph.handle_pending_rebuild();
    let sequence = graph.rendering_sequence();

    println!("Graph:       {}", config.name);
    println!("Sample Rate: {} Hz", config.sample_rate);
    println!("Block Size:  {}", config.block_size);
    println!(
        "Channels:    {} in / {} out",
        graph.audio_input_channels(),
        graph.audio_output_channels()
    );

    println!("\nNodes ({}):", graph.num_nodes());
    for node in graph.nodes() {
        println!(
            "  {:>3}  {:<12} {} in / {} out{}",
            node.id().get(),
            node.name(),
            node.num_audio_inputs(),
            node.num_audio_outputs(),
            if node.is_subgraph() { "  [subgraph]" } else { "" }
        );
    }

    println!("\nConnections ({}):", graph.num_connections());
    for connection in graph.connections() {
        println!("  {connection}");
    }

    println!("\nRender sequence ({} ops):", sequence.len());
    for (i, op) in sequence.ops().iter().enumerate() {
        println!("  {i:>3}  {op}");
    }
    println!(
        "\nBuffers:     {} audio, {} midi",
        sequence.audio_buffer_count(),
        sequence.midi_buffer_count()
    );

    Ok(())
}
