// Criterion benchmarks for `ConcurrentCache` under multi-threaded load.
use std::sync::Arc;
use std::thread;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use meshcache::byteview::ByteView;
use meshcache::concurrent::ConcurrentCache;

const CACHE_BYTES: u64 = 1 << 20;
const OPS_PER_THREAD: usize = 2_000;

fn bench_concurrent_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("ConcurrentCache multi-threaded access");

    for &threads in &[1usize, 2, 4, 8] {
        group.bench_function(format!("{threads}_threads"), |b| {
            b.iter(|| {
                let cache = Arc::new(ConcurrentCache::new(CACHE_BYTES));
                let handles: Vec<_> = (0..threads)
                    .map(|t| {
                        let cache = Arc::clone(&cache);
                        thread::spawn(move || {
                            for i in 0..OPS_PER_THREAD {
                                let key = format!("t{t}-k{}", i % 256);
                                if i % 4 == 0 {
                                    cache.add(key.clone(), ByteView::from_str("v"));
                                } else {
                                    black_box(cache.get(&key));
                                }
                            }
                        })
                    })
                    .collect();
                for h in handles {
                    h.join().unwrap();
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_concurrent_cache);
criterion_main!(benches);
