#![no_main]

use dagplan_core::{IssueNode, SchedulerConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(issues) = serde_json::from_slice::<Vec<IssueNode>>(data) else {
        return;
    };

    let config = SchedulerConfig::default();
    let Ok(result) = dagplan_graph::analyze(&issues, &config) else {
        return;
    };

    // Every input issue lands in exactly one of: scheduled, cycle-blocked.
    assert_eq!(
        result.execution_order.len() + result.blocked_by_cycle.len(),
        issues.len()
    );
    // Analysis must be reproducible.
    let again = dagplan_graph::analyze(&issues, &config).expect("second run");
    assert_eq!(
        serde_json::to_vec(&result).expect("serialize"),
        serde_json::to_vec(&again).expect("serialize")
    );
});
