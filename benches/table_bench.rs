use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use probe_table::{discard, DefaultTable, Table};

const SLOTS: usize = 16_384;

// Distinct pseudo-random keys from a xorshift sequence.
fn keys(n: usize, mut state: u64) -> Vec<u64> {
    let mut out = Vec::with_capacity(n);
    while out.len() < n {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        out.push(state);
    }
    out
}

fn loaded(live: usize, seed: u64) -> (DefaultTable<u64, u64>, Vec<u64>) {
    let mut t = DefaultTable::with_capacity(SLOTS).unwrap();
    let ks = keys(live, seed);
    for &k in &ks {
        t.insert(k, k, discard).unwrap();
    }
    (t, ks)
}

fn bench_load_factors(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_load");
    group.sample_size(30);

    group.bench_function("fill_half", |b| {
        let ks = keys(SLOTS / 2, 0x9e37);
        b.iter_batched(
            || DefaultTable::<u64, u64>::with_capacity(SLOTS).unwrap(),
            |mut t| {
                for &k in &ks {
                    t.insert(k, k, discard).unwrap();
                }
                t
            },
            BatchSize::LargeInput,
        )
    });

    for (name, live) in [("hit_half", SLOTS / 2), ("hit_ninety", SLOTS * 9 / 10)] {
        group.bench_function(name, |b| {
            let (t, ks) = loaded(live, 0x51ed);
            let mut i = 0;
            b.iter(|| {
                i = (i + 1) % ks.len();
                black_box(t.search(&ks[i]).unwrap());
            })
        });
    }
    group.finish();
}

// Remove one key and put it back. At full load no empty slot is left and
// cleared records pile up between index rebuilds.
fn bench_full_load_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_churn");
    group.sample_size(20);
    for (name, live) in [("half", SLOTS / 2), ("full", SLOTS)] {
        group.bench_function(name, |b| {
            let (mut t, ks) = loaded(live, 0xc0ff_ee);
            let mut i = 0;
            b.iter(|| {
                i = (i + 1) % ks.len();
                t.remove(&ks[i], discard, discard).unwrap();
                t.insert(ks[i], 0, discard).unwrap();
            })
        });
    }
    group.finish();
}

// Every key hashes to the same home slot, so lookups walk one long chain,
// half of it tombstones.
fn bench_collision_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_chain");
    let hash = |_: &u32| 0u64;
    let eq = |a: &u32, b: &u32| a == b;
    let mut t = Table::new(512, hash, eq).unwrap();
    for k in 0..256u32 {
        t.insert(k, k, discard).unwrap();
    }
    for k in (0..256u32).step_by(2) {
        t.remove(&k, discard, discard).unwrap();
    }

    group.bench_function("tail_hit", |b| {
        b.iter(|| black_box(t.search(black_box(&255)).unwrap()))
    });
    group.bench_function("miss", |b| {
        b.iter(|| black_box(t.search(black_box(&1_000)).unwrap()))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_load_factors,
    bench_full_load_churn,
    bench_collision_chain
);
criterion_main!(benches);
