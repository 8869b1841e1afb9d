//! Poly1305 benchmarks.
use criterion::{BenchmarkId, Throughput, criterion_group, criterion_main};
use poly1305::{Key, Poly1305, universal_hash::UniversalHash};
use std::hint::black_box;

mod utils;
use utils::{Benchmarker, config};

fn bench(c: &mut Benchmarker) {
    let mut group = c.benchmark_group("poly1305");
    let key = Key::from([0x42; poly1305::KEY_SIZE]);

    for size in &[10, 100, 1000, 10000] {
        let buf = vec![0u8; *size];

        group.throughput(Throughput::Bytes(*size as u64));

        group.bench_function(BenchmarkId::new("compute_unpadded", size), |b| {
            b.iter(|| Poly1305::new(black_box(&key)).compute_unpadded(&buf));
        });

        group.bench_function(BenchmarkId::new("update_64", size), |b| {
            b.iter(|| {
                let mut mac = Poly1305::new(black_box(&key));
                for chunk in buf.chunks(64) {
                    mac.update(chunk);
                }
                mac.finalize()
            });
        });

        group.bench_function(BenchmarkId::new("verify", size), |b| {
            let tag = Poly1305::new(&key).compute_unpadded(&buf);
            b.iter(|| poly1305::verify(black_box(&tag), &buf, &key));
        });
    }

    group.finish();
}

criterion_group!(
    name = benches;
    config = config();
    targets = bench
);

criterion_main!(benches);
