// Criterion benchmarks for the single-threaded `Store`.
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use meshcache::byteview::ByteView;
use meshcache::store::Store;

const CACHE_ENTRIES: usize = 1_000;
const NUM_OPERATIONS: usize = 10_000;

// Simple linear congruential generator for reproducible benchmarks, same
// shape as the cache-algorithm benchmarks this pack's caches use their own
// copy of.
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_usize(&mut self, bound: usize) -> usize {
        self.state = self.state.wrapping_mul(1103515245).wrapping_add(12345) & 0x7fff_ffff;
        (self.state as usize) % bound
    }
}

fn keyed_values(n: usize) -> Vec<(String, ByteView)> {
    (0..n)
        .map(|i| (format!("key-{i}"), ByteView::from_str(&format!("value-{i}"))))
        .collect()
}

fn bench_store(c: &mut Criterion) {
    let entries = keyed_values(CACHE_ENTRIES * 2);
    let mut rng = SimpleRng::new(42);
    let indices: Vec<usize> = (0..NUM_OPERATIONS)
        .map(|_| rng.next_usize(entries.len()))
        .collect();

    let mut group = c.benchmark_group("Store mixed access");

    group.bench_function("unbounded", |b| {
        b.iter(|| {
            let mut store = Store::new(0, None);
            for &idx in &indices {
                let (key, value) = &entries[idx];
                if idx % 4 == 0 {
                    black_box(store.add(key.clone(), value.clone()));
                } else {
                    black_box(store.get(key));
                }
            }
        });
    });

    group.bench_function("byte_bounded", |b| {
        let budget = entries
            .iter()
            .take(CACHE_ENTRIES)
            .map(|(k, v)| (k.len() + v.len()) as u64)
            .sum();
        b.iter(|| {
            let mut store = Store::new(budget, None);
            for &idx in &indices {
                let (key, value) = &entries[idx];
                if idx % 4 == 0 {
                    black_box(store.add(key.clone(), value.clone()));
                } else {
                    black_box(store.get(key));
                }
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_store);
criterion_main!(benches);
