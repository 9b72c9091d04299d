use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use dagplan_core::{IssueNode, Priority, SchedulerConfig};
use dagplan_graph::analyze;

/// Issue-count tiers for the synthetic plans.
const TIERS: [usize; 4] = [10, 100, 1_000, 5_000];

/// Layered plan: `width` issues per layer, each depending on up to three
/// issues of the previous layer. One small cycle every 500 issues.
fn synthetic_plan(count: usize) -> Vec<IssueNode> {
    let width = 20_usize;
    (0..count)
        .map(|i| {
            let layer = i / width;
            let mut deps: Vec<String> = Vec::new();
            if layer > 0 {
                let base = (layer - 1) * width;
                for offset in [i % width, (i * 7) % width, (i * 13) % width] {
                    deps.push(format!("issue-{:05}", base + offset));
                }
            }
            if i % 500 == 499 {
                deps.push(format!("issue-{:05}", i + 1));
            }
            if i % 500 == 0 && i > 0 {
                deps.push(format!("issue-{:05}", i - 1));
            }
            let priority = Priority::ALL[i % Priority::ALL.len()];
            #[allow(clippy::cast_precision_loss)]
            let effort = (i % 8) as f64 + 0.5;
            IssueNode::new(format!("issue-{i:05}"), effort, priority).with_dependencies(deps)
        })
        .collect()
}

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze.tiered");
    let config = SchedulerConfig::default();

    for count in TIERS {
        let plan = synthetic_plan(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("full", count), &plan, |b, plan| {
            b.iter(|| black_box(analyze(plan, &config)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_analyze);
criterion_main!(benches);
