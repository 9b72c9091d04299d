use std::collections::{BTreeMap, HashMap, HashSet};

use dagplan_core::{IssueNode, Priority, SchedulerConfig};
use dagplan_graph::analyze;
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

fn arb_priority() -> impl Strategy<Value = Priority> {
    prop_oneof![
        Just(Priority::P0),
        Just(Priority::P1),
        Just(Priority::P2),
        Just(Priority::P3),
    ]
}

fn issue_id(i: usize) -> String {
    format!("i{i:03}")
}

/// Acyclic issue lists: issue `i` may only depend on issues `< i`.
fn arb_dag() -> impl Strategy<Value = Vec<IssueNode>> {
    (1_usize..24).prop_flat_map(|n| {
        let nodes = (0..n)
            .map(|i| {
                (
                    0_u8..10,
                    arb_priority(),
                    proptest::collection::vec(0..i.max(1), 0..4),
                )
                    .prop_map(move |(effort, priority, deps)| {
                        let deps: Vec<String> = if i == 0 {
                            Vec::new()
                        } else {
                            deps.into_iter().map(issue_id).collect()
                        };
                        IssueNode::new(issue_id(i), f64::from(effort), priority)
                            .with_dependencies(deps)
                    })
            })
            .collect::<Vec<_>>();
        nodes
    })
}

/// Arbitrary issue lists: dependencies may point anywhere, including at
/// missing ids and at the issue itself.
fn arb_issues() -> impl Strategy<Value = Vec<IssueNode>> {
    (1_usize..20).prop_flat_map(|n| {
        proptest::collection::vec(
            (
                0_u8..10,
                arb_priority(),
                proptest::collection::vec(0..n + 2, 0..4),
                any::<bool>(),
            ),
            n,
        )
        .prop_map(|specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(i, (effort, priority, deps, completed))| {
                    let mut node = IssueNode::new(issue_id(i), f64::from(effort), priority)
                        .with_dependencies(deps.into_iter().map(issue_id));
                    node.completed = completed;
                    node
                })
                .collect()
        })
    })
}

/// Longest effort-weighted chain ending at every issue, by memoized recursion.
fn longest_chains(issues: &[IssueNode]) -> HashMap<String, f64> {
    fn visit(
        id: &str,
        by_id: &HashMap<&str, &IssueNode>,
        memo: &mut HashMap<String, f64>,
    ) -> f64 {
        if let Some(&value) = memo.get(id) {
            return value;
        }
        let issue = by_id[id];
        let best = issue
            .dependencies
            .iter()
            .filter(|dep| by_id.contains_key(dep.as_str()))
            .map(|dep| visit(dep, by_id, memo))
            .fold(0.0, f64::max);
        let value = best + issue.effort_hours;
        memo.insert(id.to_string(), value);
        value
    }

    let by_id: HashMap<&str, &IssueNode> = issues.iter().map(|i| (i.id.as_str(), i)).collect();
    let mut memo = HashMap::new();
    for issue in issues {
        visit(&issue.id, &by_id, &mut memo);
    }
    memo
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(256))]

    #[test]
    fn execution_order_respects_dependencies(issues in arb_issues()) {
        let result = analyze(&issues, &SchedulerConfig::default()).expect("analyze");
        let position: HashMap<&str, usize> = result
            .execution_order
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();

        for (id, analyzed) in &result.issues {
            let Some(&pos) = position.get(id.as_str()) else { continue };
            for dep in &analyzed.dependencies {
                let dep_pos = position.get(dep.as_str()).copied();
                prop_assert!(dep_pos.is_some_and(|p| p < pos), "{dep} must precede {id}");
            }
        }
    }

    #[test]
    fn cycle_blocked_issues_never_scheduled(issues in arb_issues()) {
        let result = analyze(&issues, &SchedulerConfig::default()).expect("analyze");
        let blocked: HashSet<&String> = result.blocked_by_cycle.iter().collect();

        for cycle in &result.cycles {
            for id in &cycle.issue_ids {
                prop_assert!(blocked.contains(id));
            }
        }
        prop_assert!(result.execution_order.iter().all(|id| !blocked.contains(id)));
        prop_assert!(result.critical_path.issue_ids.iter().all(|id| !blocked.contains(id)));
        prop_assert!(result.prioritized_queue.queue.iter().all(|id| !blocked.contains(id)));
        prop_assert_eq!(
            result.execution_order.len() + result.blocked_by_cycle.len(),
            issues.len()
        );
    }

    #[test]
    fn each_issue_in_at_most_one_cycle(issues in arb_issues()) {
        let result = analyze(&issues, &SchedulerConfig::default()).expect("analyze");
        let mut seen = HashSet::new();
        for cycle in &result.cycles {
            for id in &cycle.issue_ids {
                prop_assert!(seen.insert(id.clone()), "{id} reported twice");
            }
        }
    }

    #[test]
    fn groups_partition_execution_order(issues in arb_issues()) {
        let result = analyze(&issues, &SchedulerConfig::default()).expect("analyze");

        let mut grouped: Vec<String> = result
            .parallel_groups
            .iter()
            .flat_map(|g| g.issue_ids.iter().cloned())
            .collect();
        grouped.sort();
        let mut ordered = result.execution_order.clone();
        ordered.sort();
        prop_assert_eq!(grouped, ordered);

        let group_of: BTreeMap<&str, usize> = result
            .parallel_groups
            .iter()
            .flat_map(|g| g.issue_ids.iter().map(move |id| (id.as_str(), g.group_index)))
            .collect();
        for (id, &k) in &group_of {
            for dep in &result.issues[*id].dependencies {
                prop_assert!(group_of[dep.as_str()] < k, "{dep} must be in an earlier group than {id}");
            }
        }
    }

    #[test]
    fn critical_path_is_longest_chain(issues in arb_dag()) {
        let result = analyze(&issues, &SchedulerConfig::default()).expect("analyze");
        let expected = longest_chains(&issues).into_values().fold(0.0, f64::max);

        prop_assert!((result.critical_path.total_effort - expected).abs() < 1e-9);

        // The path is a real dependency chain that adds up to its total.
        let path = &result.critical_path.issue_ids;
        for pair in path.windows(2) {
            prop_assert!(result.issues[&pair[1]].dependencies.contains(&pair[0]));
        }
        let summed: f64 = path.iter().map(|id| result.issues[id].issue.effort_hours).sum();
        prop_assert!((summed - result.critical_path.total_effort).abs() < 1e-9);
        if let Some(first) = path.first() {
            prop_assert!(result.issues[first].dependencies.is_empty());
        }
    }

    #[test]
    fn acyclic_input_schedules_everything(issues in arb_dag()) {
        let result = analyze(&issues, &SchedulerConfig::default()).expect("analyze");
        prop_assert!(result.cycles.is_empty());
        prop_assert_eq!(result.execution_order.len(), issues.len());
        prop_assert_eq!(result.prioritized_queue.queue.len(), issues.len());
    }

    #[test]
    fn analysis_is_deterministic(issues in arb_issues(), seed in any::<u64>()) {
        let mut shuffled = issues.clone();
        // Cheap deterministic shuffle driven by the seed.
        let len = shuffled.len();
        let mut state = seed;
        for i in (1..len).rev() {
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            let j = usize::try_from(state >> 33).unwrap_or(0) % (i + 1);
            shuffled.swap(i, j);
        }

        let config = SchedulerConfig::default();
        let a = serde_json::to_string(&analyze(&issues, &config).expect("analyze")).expect("json");
        let b = serde_json::to_string(&analyze(&shuffled, &config).expect("analyze")).expect("json");
        prop_assert_eq!(a, b);
    }
}
