//! Benchmarks for the tree layout solver.
//!
//! Run with: cargo bench -p mindmap-layout

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use mindmap_core::{Direction, GraphNode, NodeId, generate_edges, refresh_derived};
use mindmap_layout::TreeLayout;
use std::hint::black_box;

/// Complete tree with `fanout` children per node down to `depth` levels.
fn bushy_tree(fanout: usize, depth: usize) -> Vec<GraphNode> {
    let root = NodeId::new("root");
    let mut nodes = vec![GraphNode::root(root.clone(), "Root")];
    let mut frontier = vec![root.clone()];
    let mut counter = 0usize;
    for _ in 0..depth {
        let mut next = Vec::new();
        for parent in &frontier {
            for _ in 0..fanout {
                counter += 1;
                let id = NodeId::new(format!("n{counter}"));
                nodes.push(GraphNode::child(id.clone(), "Topic", parent.clone(), 0));
                next.push(id);
            }
        }
        frontier = next;
    }
    refresh_derived(&mut nodes, &root).expect("bench tree is valid");
    nodes
}

/// Single chain `len` nodes deep.
fn chain(len: usize) -> Vec<GraphNode> {
    let root = NodeId::new("root");
    let mut nodes = vec![GraphNode::root(root.clone(), "Root")];
    for i in 0..len {
        let parent = nodes[i].id.clone();
        nodes.push(GraphNode::child(NodeId::new(format!("c{i}")), "Step", parent, 0));
    }
    refresh_derived(&mut nodes, &root).expect("bench chain is valid");
    nodes
}

fn bench_bushy(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/bushy");
    let layout = TreeLayout::default();
    let root = NodeId::new("root");

    for (fanout, depth) in [(3, 3), (4, 4), (5, 5)] {
        let nodes = bushy_tree(fanout, depth);
        let edges = generate_edges(&nodes, Direction::LeftRight);
        group.bench_with_input(
            BenchmarkId::new("compute", nodes.len()),
            &(nodes, edges),
            |b, (nodes, edges)| {
                b.iter(|| black_box(layout.compute(nodes, edges, &root, Direction::LeftRight)))
            },
        );
    }

    group.finish();
}

fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/chain");
    let layout = TreeLayout::default();
    let root = NodeId::new("root");

    for len in [100, 1_000] {
        let nodes = chain(len);
        let edges = generate_edges(&nodes, Direction::TopBottom);
        group.bench_with_input(
            BenchmarkId::new("compute", len),
            &(nodes, edges),
            |b, (nodes, edges)| {
                b.iter(|| black_box(layout.compute(nodes, edges, &root, Direction::TopBottom)))
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_bushy, bench_chain);
criterion_main!(benches);
