//! Criterion benchmarks for netlist compaction and ordering.
//!
//! Three benchmark groups:
//! - `compress_ids`: building the old-to-new map for a sparse id table
//! - `netlist_compress`: removing every fourth block then compressing
//! - `topological_order`: ordering a wide layered netlist

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use netlist_core::compact::{compress_ids, update_valid_refs};
use netlist_core::id::*;
use netlist_core::id_map::IdMap;
use netlist_core::test_utils::*;
use netlist_core::topo::topological_block_order;
use std::collections::BTreeSet;

// ===========================================================================
// Builders
// ===========================================================================

/// An id table of `len` entries with every third one dropped.
fn sparse_ids(len: usize) -> IdMap<PinId, PinId> {
    (0..len)
        .map(|i| if i % 3 == 0 { PinId::INVALID } else { PinId::new(i) })
        .collect()
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_compress_ids(c: &mut Criterion) {
    let ids = sparse_ids(100_000);
    let refs: Vec<PinId> = (0..100_000).rev().map(PinId::new).collect();
    let preserved = BTreeSet::from([0]);

    let mut group = c.benchmark_group("compress_ids");
    group.bench_function("build_map_100k", |b| {
        b.iter(|| compress_ids(black_box(&ids)))
    });
    let id_map = compress_ids(&ids);
    group.bench_function("update_valid_refs_100k", |b| {
        b.iter(|| update_valid_refs(black_box(&refs), &id_map, &preserved))
    });
    group.finish();
}

fn bench_netlist_compress(c: &mut Criterion) {
    let (netlist, grid) = layered_netlist(50, 40);

    c.bench_function("netlist_compress_2000_blocks", |b| {
        b.iter_batched(
            || {
                let mut netlist = netlist.clone();
                for &blk in grid.iter().flatten().step_by(4) {
                    netlist.remove_block(blk).unwrap();
                }
                netlist
            },
            |mut netlist| netlist.compress(),
            BatchSize::LargeInput,
        )
    });
}

fn bench_topological_order(c: &mut Criterion) {
    let (netlist, _) = layered_netlist(50, 40);
    let (chain, _) = chain_netlist(10_000);

    let mut group = c.benchmark_group("topological_order");
    group.bench_function("layered_50x40", |b| {
        b.iter(|| topological_block_order(black_box(&netlist)))
    });
    group.bench_function("chain_10k", |b| {
        b.iter(|| topological_block_order(black_box(&chain)))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_compress_ids,
    bench_netlist_compress,
    bench_topological_order
);
criterion_main!(benches);
