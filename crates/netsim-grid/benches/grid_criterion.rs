//! Grid benchmarks using criterion for historical comparison.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use netsim_grid::{GridConfig, GridIndex, Links, NodeId, Position, SimNode, UnitDiskGraph};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const RANGE: f64 = 10.0;

/// Constant density: roughly two nodes per cell whatever the count.
fn deployment(count: u32) -> (GridConfig, Vec<SimNode>) {
    let side = (f64::from(count) * RANGE * RANGE / 2.0).sqrt();
    let mut rng = StdRng::seed_from_u64(u64::from(count));
    let nodes = (0..count)
        .map(|i| {
            SimNode::new(
                NodeId(i),
                Position::planar(rng.gen_range(0.0..=side), rng.gen_range(0.0..=side)),
            )
        })
        .collect();
    (GridConfig::planar(side, side).with_cell_side(RANGE), nodes)
}

fn build(config: &GridConfig, nodes: &[SimNode]) -> GridIndex {
    let mut grid = GridIndex::new(config).unwrap();
    for node in nodes {
        grid.insert(node).unwrap();
    }
    grid
}

fn link_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("links");

    for count in [100, 1000, 5000] {
        let (config, nodes) = deployment(count);
        let grid = build(&config, &nodes);
        group.throughput(Throughput::Elements(u64::from(count)));

        group.bench_with_input(BenchmarkId::new("grid", count), &count, |b, _| {
            let mut links = Links::new(UnitDiskGraph::new(RANGE));
            b.iter(|| {
                let mut edges = 0_usize;
                links
                    .for_each_link(
                        &grid,
                        |id| Some(nodes[id.get() as usize].position),
                        |_, _| edges += 1,
                    )
                    .unwrap();
                black_box(edges)
            });
        });

        group.bench_with_input(BenchmarkId::new("all_pairs", count), &count, |b, _| {
            b.iter(|| {
                let mut edges = 0_usize;
                for (i, a) in nodes.iter().enumerate() {
                    for other in &nodes[i + 1..] {
                        if a.position.distance_squared(&other.position) <= RANGE * RANGE {
                            edges += 1;
                        }
                    }
                }
                black_box(edges)
            });
        });
    }

    group.finish();
}

fn mobility_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("mobility");

    for count in [1000, 10000] {
        let (config, nodes) = deployment(count);
        let extent = config.width;
        group.throughput(Throughput::Elements(u64::from(count)));

        group.bench_with_input(BenchmarkId::new("update", count), &count, |b, _| {
            let mut grid = build(&config, &nodes);
            let mut moving = nodes.clone();
            let mut rng = StdRng::seed_from_u64(9);
            b.iter(|| {
                for node in &mut moving {
                    let p = node.position;
                    node.move_to(Position::planar(
                        (p.x + rng.gen_range(-2.0..2.0)).clamp(0.0, extent),
                        (p.y + rng.gen_range(-2.0..2.0)).clamp(0.0, extent),
                    ));
                    black_box(grid.update(&*node).unwrap());
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("churn", count), &count, |b, _| {
            let mut grid = build(&config, &nodes);
            b.iter(|| {
                for node in &nodes {
                    grid.remove(node.id).unwrap();
                    grid.insert(node).unwrap();
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, link_benchmarks, mobility_benchmarks);

criterion_main!(benches);
