use compkit::compression::{Bwt, Compression, Huffman, Lz77, Lz78, Lzss, Lzw, Mtf, Rle, RlePair};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SIZES: &[usize] = &[1 << 10, 1 << 14];

/// Words drawn from a small vocabulary, so every codec has something to find.
fn text_like(size: usize) -> Vec<u8> {
    const WORDS: &[&[u8]] = &[
        b"the ", b"quick ", b"brown ", b"fox ", b"jumps ", b"over ", b"lazy ", b"dog ",
        b"and ", b"runs ", b"away\n",
    ];
    let mut rng = StdRng::seed_from_u64(42);
    let mut data = Vec::with_capacity(size + 8);
    while data.len() < size {
        data.extend_from_slice(WORDS[rng.gen_range(0..WORDS.len())]);
    }
    data.truncate(size);
    data
}

fn codecs() -> Vec<Box<dyn Compression>> {
    vec![
        Box::new(Rle::default()),
        Box::new(RlePair::default()),
        Box::new(Mtf::default()),
        Box::new(Bwt::new()),
        Box::new(Huffman),
        Box::new(Lz77::new(4096, 64).unwrap()),
        Box::new(Lzss::new(4096, 64, 3).unwrap()),
        Box::new(Lz78),
        Box::new(Lzw),
    ]
}

fn bench_compress(c: &mut Criterion) {
    let mut group = c.benchmark_group("compress");
    for &size in SIZES {
        let data = text_like(size);
        group.throughput(Throughput::Bytes(size as u64));
        for codec in codecs() {
            group.bench_with_input(BenchmarkId::new(codec.name(), size), &data, |b, data| {
                b.iter(|| codec.compress(black_box(data)).unwrap());
            });
        }
    }
    group.finish();
}

fn bench_decompress(c: &mut Criterion) {
    let mut group = c.benchmark_group("decompress");
    for &size in SIZES {
        let data = text_like(size);
        group.throughput(Throughput::Bytes(size as u64));
        for codec in codecs() {
            let packed = codec.compress(&data).unwrap();
            group.bench_with_input(BenchmarkId::new(codec.name(), size), &packed, |b, packed| {
                b.iter(|| codec.decompress(black_box(packed)).unwrap());
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_compress, bench_decompress);
criterion_main!(benches);
