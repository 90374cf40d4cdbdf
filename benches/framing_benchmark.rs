//! Benchmarks for SSE framing, decoding and aggregation.
//!
//! Run with: cargo bench --bench framing_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use searchstream::sse::{decode, FrameSplitter};
use searchstream::turn::TurnState;

/// Summary-style body with `pieces` answer chunks.
fn generate_stream(pieces: usize) -> Vec<u8> {
    let mut body = String::from(
        "event: sources\ndata: [{\"title\":\"Rust\",\"url\":\"https://rust-lang.org\"}]\n\n",
    );
    for i in 0..pieces {
        body.push_str(&format!(
            "event: answer_chunk\ndata: \"token {} of the streamed answer \"\n\n",
            i
        ));
    }
    body.push_str("event: done\ndata: {}\n\n");
    body.into_bytes()
}

/// Benchmark frame splitting at different chunk sizes
fn bench_frame_splitting(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_splitting");
    let body = generate_stream(500);
    group.throughput(Throughput::Bytes(body.len() as u64));

    for chunk_size in [1, 16, 256, 4096].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_byte_chunks", chunk_size)),
            &body,
            |b, body| {
                b.iter(|| {
                    let mut splitter = FrameSplitter::new();
                    let mut frames = 0;
                    for chunk in body.chunks(*chunk_size) {
                        frames += splitter.feed(black_box(chunk)).len();
                    }
                    black_box(frames)
                });
            },
        );
    }

    group.finish();
}

/// Benchmark the full pipeline: split, decode, apply
fn bench_full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_pipeline");

    for pieces in [10, 100, 1000].iter() {
        let body = generate_stream(*pieces);
        group.throughput(Throughput::Bytes(body.len() as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_chunks", pieces)),
            &body,
            |b, body| {
                b.iter(|| {
                    let mut splitter = FrameSplitter::new();
                    let mut state = TurnState::new("bench");
                    for chunk in body.chunks(512) {
                        for frame in splitter.feed(chunk) {
                            if let Ok(event) = decode(&frame) {
                                state.apply(&event);
                            }
                        }
                    }
                    black_box(state)
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_frame_splitting, bench_full_pipeline);
criterion_main!(benches);
