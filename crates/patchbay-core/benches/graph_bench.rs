//! Criterion benchmarks for the node graph (`patchbay-core::graph`).
//!
//! Measures graph overhead independently of DSP cost using a trivial `Gain`
//! processor. Two axes:
//!
//! - **Compile**: topology sort plus buffer liveness
//! - **Execute**: `process_block()` throughput at varying block sizes
//!
//! Run with: `cargo bench -p patchbay-core -- graph/`
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use patchbay_core::{
    AudioBlock, AudioBuffer, GraphProcessor, IoType, MidiBuffer, NodeId, PlayConfig, Processor,
    ProcessorError,
};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZE: usize = 256;
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512, 1024];

// ---------------------------------------------------------------------------
// Trivial Gain processor, isolates graph overhead from DSP cost
// ---------------------------------------------------------------------------

struct Gain(f32);

impl Processor for Gain {
    fn audio_inputs(&self) -> usize {
        2
    }

    fn audio_outputs(&self) -> usize {
        2
    }

    fn prepare(&mut self, _config: &PlayConfig) -> Result<(), ProcessorError> {
        Ok(())
    }

    fn process(&mut self, audio: &mut AudioBlock<'_>, _midi: &mut MidiBuffer) {
        for ch in 0..audio.num_channels() {
            for s in audio.channel_mut(ch) {
                *s *= self.0;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Graph constructors
// ---------------------------------------------------------------------------

fn make_linear(n: usize) -> GraphProcessor {
    let mut graph = GraphProcessor::new(2, 2);
    let input = graph.add_io_node(IoType::AudioInput);
    let mut prev = input;
    for _ in 0..n {
        let node = graph.add_node(Box::new(Gain(0.9)));
        graph.connect_audio(prev, node);
        prev = node;
    }
    let output = graph.add_io_node(IoType::AudioOutput);
    graph.connect_audio(prev, output);
    graph
}

fn make_diamond() -> GraphProcessor {
    let mut graph = GraphProcessor::new(2, 2);
    let input = graph.add_io_node(IoType::AudioInput);
    let a = graph.add_node(Box::new(Gain(0.8)));
    let b = graph.add_node(Box::new(Gain(0.7)));
    let output = graph.add_io_node(IoType::AudioOutput);
    for (from, to) in [(input, a), (input, b), (a, output), (b, output)] {
        graph.connect_audio(from, to);
    }
    graph
}

fn prepared(mut graph: GraphProcessor, block_size: usize) -> GraphProcessor {
    graph.prepare_to_play(SAMPLE_RATE, block_size);
    graph
}

// ---------------------------------------------------------------------------
// Compile benchmarks
// ---------------------------------------------------------------------------

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph/compile");

    for n in [5, 20] {
        let mut graph = prepared(make_linear(n), BLOCK_SIZE);
        group.bench_function(format!("linear_{n}"), |b| {
            b.iter(|| {
                graph.build_rendering_sequence();
                black_box(graph.rendering_sequence());
            });
        });
    }

    {
        let mut graph = prepared(make_diamond(), BLOCK_SIZE);
        group.bench_function("diamond", |b| {
            b.iter(|| {
                graph.build_rendering_sequence();
                black_box(graph.rendering_sequence());
            });
        });
    }

    // Wide fan-in: 32 sources summed into one output
    group.bench_function("fan_in_32", |b| {
        b.iter(|| {
            let mut graph = GraphProcessor::new(2, 2);
            let output = graph.add_io_node(IoType::AudioOutput);
            let sources: Vec<NodeId> =
                (0..32).map(|_| graph.add_node(Box::new(Gain(0.1)))).collect();
            for src in sources {
                graph.connect_audio(src, output);
            }
            graph.build_rendering_sequence();
            black_box(graph.rendering_sequence());
        });
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Execute benchmarks, fixed block size 256
// ---------------------------------------------------------------------------

fn bench_execute(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph/execute");
    let mut buffer = AudioBuffer::new(2, BLOCK_SIZE);
    let mut midi = MidiBuffer::with_capacity(64);

    let graphs = [
        ("linear_5_block256", make_linear(5)),
        ("linear_20_block256", make_linear(20)),
        ("diamond_block256", make_diamond()),
    ];
    for (name, graph) in graphs {
        let mut graph = prepared(graph, BLOCK_SIZE);
        group.bench_function(name, |b| {
            b.iter(|| {
                for ch in 0..2 {
                    buffer.channel_mut(ch).fill(0.5);
                }
                graph.process_block(&mut buffer.as_block(), &mut midi);
                black_box(&buffer);
            });
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Block size sweep, 5-node chain
// ---------------------------------------------------------------------------

fn bench_block_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph/block_size");

    for &size in BLOCK_SIZES {
        let mut graph = prepared(make_linear(5), size);
        let mut buffer = AudioBuffer::new(2, size);
        let mut midi = MidiBuffer::with_capacity(64);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                graph.process_block(&mut buffer.as_block(), &mut midi);
                black_box(&buffer);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compile, bench_execute, bench_block_sizes);
criterion_main!(benches);
