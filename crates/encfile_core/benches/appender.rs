//! Appender throughput benchmarks.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use encfile_core::{Aes256GcmAead, Appender, EncryptionKey};
use encfile_storage::InMemoryBackend;

const CHUNK: usize = 4096;
const CHUNKS: usize = 64;

fn fresh_appender() -> Appender {
    let key = EncryptionKey::from_bytes(&[0x42u8; 32]).unwrap();
    Appender::new(
        Box::new(Aes256GcmAead::new(&key)),
        Box::new(InMemoryBackend::new()),
    )
    .unwrap()
}

fn bench_append(c: &mut Criterion) {
    let chunk = vec![0xA5u8; CHUNK];

    let mut group = c.benchmark_group("append");
    group.throughput(Throughput::Bytes((CHUNK * CHUNKS) as u64));
    group.bench_function("sequential_4k_chunks", |b| {
        b.iter_batched(
            fresh_appender,
            |appender| {
                let mut offset = 0u64;
                for _ in 0..CHUNKS {
                    appender.write_at(&chunk, offset).unwrap();
                    offset += CHUNK as u64;
                }
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

fn bench_unaligned_append(c: &mut Criterion) {
    // Odd-sized chunks force a tail re-encryption on every write.
    let chunk = vec![0xA5u8; 1000];

    let mut group = c.benchmark_group("append");
    group.throughput(Throughput::Bytes((1000 * CHUNKS) as u64));
    group.bench_function("sequential_unaligned_chunks", |b| {
        b.iter_batched(
            fresh_appender,
            |appender| {
                let mut offset = 0u64;
                for _ in 0..CHUNKS {
                    appender.write_at(&chunk, offset).unwrap();
                    offset += 1000;
                }
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

fn bench_random_reads(c: &mut Criterion) {
    let appender = fresh_appender();
    let total = 1 << 20;
    let mut rng = StdRng::seed_from_u64(0);
    let mut data = vec![0u8; total];
    rng.fill(&mut data[..]);
    appender.write_at(&data, 0).unwrap();

    let mut group = c.benchmark_group("read");
    group.throughput(Throughput::Bytes(CHUNK as u64));
    group.bench_function("random_4k_windows", |b| {
        b.iter(|| {
            let begin = rng.gen_range(0..(total - CHUNK) as u64);
            appender.read_at(begin, CHUNK).unwrap()
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_append,
    bench_unaligned_append,
    bench_random_reads
);
criterion_main!(benches);
