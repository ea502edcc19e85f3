// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use understory_recycler::{ReinitMode, SizeIndex};

#[derive(Clone)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u32(&mut self) -> u32 {
        // Numerical Recipes LCG parameters.
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 32) as u32
    }

    fn gen_range_usize(&mut self, upper_exclusive: usize) -> usize {
        if upper_exclusive == 0 {
            return 0;
        }
        (self.next_u32() as usize) % upper_exclusive
    }
}

/// An index of `n` items where roughly one item in `every` has a custom size.
fn sparse_index(n: usize, every: usize, seed: u64) -> SizeIndex {
    let mut index = SizeIndex::new(40.0, 2.0).expect("valid default size");
    index.reset(n).expect("reset");
    let mut rng = Lcg::new(seed);
    let mut i = 0;
    while i < n {
        let size = 20.0 + rng.gen_range_usize(80) as f64;
        index.set_item_size(i, size).expect("in range");
        i += 1 + rng.gen_range_usize(2 * every);
    }
    index
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("size_index/query");
    for &n in &[1_000_usize, 100_000] {
        let index = sparse_index(n, 8, 7);
        let total = index.total_size().expect("total");
        group.bench_with_input(BenchmarkId::new("cumulative_up_to", n), &n, |b, &n| {
            let mut rng = Lcg::new(1);
            b.iter(|| {
                let i = rng.gen_range_usize(n);
                black_box(index.cumulative_up_to(black_box(i)).expect("in range"))
            });
        });
        group.bench_with_input(BenchmarkId::new("index_at_offset", n), &n, |b, _| {
            let mut rng = Lcg::new(2);
            b.iter(|| {
                let offset = rng.gen_range_usize(total as usize) as f64;
                black_box(index.index_at_offset(black_box(offset)).expect("finite"))
            });
        });
    }
    group.finish();
}

fn bench_mutations(c: &mut Criterion) {
    let mut group = c.benchmark_group("size_index/mutate");
    let n = 100_000;
    let base = sparse_index(n, 8, 11);

    group.bench_function("batch_resize_64", |b| {
        b.iter_batched(
            || base.clone(),
            |mut index| {
                index.begin_batch_resize(n / 2).expect("begin");
                for i in 0..64 {
                    index.set_batch_size(n / 2 + i, 55.0).expect("consecutive");
                }
                index.end_batch_resize().expect("end");
                index
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("insert_then_remove", |b| {
        b.iter_batched(
            || base.clone(),
            |mut index| {
                index
                    .reinitialize(ReinitMode::Insert, 10, n / 3, None)
                    .expect("insert");
                index
                    .reinitialize(ReinitMode::Remove, 10, n / 3, None)
                    .expect("remove");
                index
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("rotate_by_one", |b| {
        b.iter_batched(
            || base.clone(),
            |mut index| {
                index.rotate_by(1).expect("rotate");
                index
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_queries, bench_mutations);
criterion_main!(benches);
