use compkit::config::PipelineSpec;
use compkit::Compression;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const PIPELINES: &[&str] = &[
    "bwt:block_size=512+mtf+rle+huffman",
    "bwt:block_size=4096+mtf+rle-pair+huffman",
    "lz77:window_size=4096,lookahead_buffer_size=64+huffman",
    "lzw+huffman",
];

/// Bytes skewed towards a few values, as after a transform stage.
fn skewed(size: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(7);
    (0..size)
        .map(|_| {
            let r: f64 = rng.gen();
            (r * r * r * 64.0) as u8
        })
        .collect()
}

fn bench_pipelines(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let size = 1 << 14;
    let data = skewed(size);
    group.throughput(Throughput::Bytes(size as u64));
    for &text in PIPELINES {
        let pipeline = text.parse::<PipelineSpec>().unwrap().build().unwrap();
        group.bench_with_input(BenchmarkId::new("compress", text), &data, |b, data| {
            b.iter(|| pipeline.compress(black_box(data)).unwrap());
        });
        let packed = pipeline.compress(&data).unwrap();
        group.bench_with_input(BenchmarkId::new("decompress", text), &packed, |b, packed| {
            b.iter(|| pipeline.decompress(black_box(packed)).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_pipelines);
criterion_main!(benches);
