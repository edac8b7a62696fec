use criterion::{criterion_group, criterion_main, Criterion, Throughput};

use commp::Calc;

fn bench_digest(c: &mut Criterion) {
    let mut group = c.benchmark_group("commp-digest");

    for &size in &[1usize << 16, 1 << 20, 1 << 24] {
        let data = vec![0xabu8; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(format!("{}-bytes", size), &data, |b, data| {
            b.iter(|| {
                let mut calc = Calc::new();
                calc.write(data).unwrap();
                calc.digest().unwrap()
            });
        });
    }

    group.finish();
}

fn bench_chunked_writes(c: &mut Criterion) {
    let mut group = c.benchmark_group("commp-write-chunked");
    let size = 1usize << 20;
    let data = vec![0x5au8; size];

    for &chunk in &[127usize, 4096, 65536] {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(format!("chunk-{}", chunk), &chunk, |b, &chunk| {
            b.iter(|| {
                let mut calc = Calc::new();
                for piece in data.chunks(chunk) {
                    calc.write(piece).unwrap();
                }
                calc.digest().unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_digest, bench_chunked_writes);
criterion_main!(benches);
