//! Benchmarks for the lane layout and the visible-window queries
//! over a synthetic history with regular merges.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lanegraph::graph::{layout, Viewport};
use lanegraph::models::{BranchHead, Commit};

/// Newest-first history where every 10th commit merges a short side branch.
fn synthetic_history(count: usize) -> Vec<Commit> {
    (0..count)
        .map(|i| {
            let mut parents = Vec::new();
            if i + 1 < count {
                parents.push(format!("{:040x}", i + 1));
            }
            if i % 10 == 0 && i + 5 < count {
                parents.push(format!("{:040x}", i + 5));
            }
            Commit::new(format!("{:040x}", i), parents)
        })
        .collect()
}

fn synthetic_heads(commits: &[Commit]) -> Vec<BranchHead> {
    commits
        .iter()
        .step_by(250)
        .enumerate()
        .map(|(i, commit)| BranchHead::new(format!("branch-{}", i), commit.id.clone(), i == 0))
        .collect()
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");

    for size in [500, 1_000, 5_000].iter() {
        let commits = synthetic_history(*size);
        let heads = synthetic_heads(&commits);

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("full_pass", size), size, |b, _| {
            b.iter(|| black_box(layout(black_box(&commits), black_box(&heads))))
        });
    }

    group.finish();
}

fn bench_visible_window(c: &mut Criterion) {
    let commits = synthetic_history(5_000);
    let graph = layout(&commits, &synthetic_heads(&commits));

    let mut viewport = Viewport::new(26.0, 15);
    viewport.on_resize(800.0);

    c.bench_function("visible_window_scroll", |b| {
        let mut offset = 0.0;
        b.iter(|| {
            offset = (offset + 97.0) % viewport.content_height(graph.len());
            viewport.set_scroll_offset(offset);
            let rows = viewport.visible_range(graph.len());
            black_box(graph.connections_through(rows).count())
        })
    });
}

criterion_group!(benches, bench_layout, bench_visible_window);
criterion_main!(benches);
