//! Benchmarks for partition indexing, coverage statistics and redistribution

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use tenrso_partition::{analyze, redistribute, LocalCluster, PartitionIndex, PartitionUnit};
use tenrso_sparse::{CooTensor, CsfTensor};

/// Simple linear congruential generator for reproducible inputs
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self.0.wrapping_mul(1103515245).wrapping_add(12345);
        ((self.0 >> 16) % bound as u64) as usize
    }
}

/// Generate a random 3-mode tensor with `nnz` non-zeros
fn random_tensor(dim: usize, nnz: usize) -> CooTensor<f64> {
    let mut rng = Lcg(12345);
    let mut coo = CooTensor::with_capacity(vec![dim, dim, dim], nnz).unwrap();
    for n in 0..nnz {
        let coord = [rng.next(dim), rng.next(dim), rng.next(dim)];
        coo.push(&coord, n as f64).unwrap();
    }
    coo
}

fn random_labels(len: usize, nparts: usize) -> Vec<usize> {
    let mut rng = Lcg(54321);
    (0..len).map(|_| rng.next(nparts)).collect()
}

/// Benchmark counting-sort index construction
fn bench_index_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_build");

    for nvtxs in [10_000, 100_000, 1_000_000].iter() {
        for nparts in [4, 64, 1024].iter() {
            let labels = random_labels(*nvtxs, *nparts);
            group.throughput(Throughput::Elements(*nvtxs as u64));
            group.bench_with_input(
                BenchmarkId::new(format!("nparts_{}", nparts), nvtxs),
                &labels,
                |b, labels| b.iter(|| PartitionIndex::build(black_box(labels), *nparts).unwrap()),
            );
        }
    }

    group.finish();
}

/// Benchmark coverage statistics over fiber partitions
fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");

    for nnz in [10_000, 100_000].iter() {
        let coo = random_tensor(200, *nnz);
        let csf = CsfTensor::for_mode(&coo, 0).unwrap();

        for nparts in [8, 128].iter() {
            let labels = random_labels(csf.nfibs(), *nparts);
            let index = PartitionIndex::build(&labels, *nparts).unwrap();

            group.throughput(Throughput::Elements(*nnz as u64));
            group.bench_with_input(
                BenchmarkId::new(format!("nparts_{}", nparts), nnz),
                &index,
                |b, index| b.iter(|| analyze(&csf, black_box(index), PartitionUnit::Fiber).unwrap()),
            );
        }
    }

    group.finish();
}

/// Benchmark redistribution over an in-process cluster
fn bench_redistribute(c: &mut Criterion) {
    let mut group = c.benchmark_group("redistribute");
    group.sample_size(20);

    for size in [2, 4].iter() {
        let fragment = random_tensor(100, 20_000);
        let target = random_labels(fragment.nnz(), *size);

        group.throughput(Throughput::Elements((fragment.nnz() * size) as u64));
        group.bench_with_input(BenchmarkId::new("ranks", size), size, |b, &size| {
            b.iter(|| {
                LocalCluster::run(size, |comm| {
                    redistribute(fragment.clone(), &target, comm).unwrap()
                })
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_index_build, bench_analyze, bench_redistribute);
criterion_main!(benches);
