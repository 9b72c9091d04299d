use dagplan_core::{Priority, ScoringConfig};

/// Per-issue facts the priority score is computed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreInputs {
    pub priority: Priority,
    pub on_critical_path: bool,
    /// Direct dependents inside the scheduling view.
    pub dependent_count: usize,
    pub effort_hours: f64,
}

/// Compute the priority score:
///
/// `S(v) = weight(priority) + cp_bonus·[on CP] + multiplier·dependents + quick_win_bonus·[effort ≤ threshold]`
///
/// Pure and total; a validated [`ScoringConfig`] keeps it non-negative.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn priority_score(inputs: &ScoreInputs, config: &ScoringConfig) -> f64 {
    let mut score = config.priority_weights.weight(inputs.priority);

    if inputs.on_critical_path {
        score += config.critical_path_bonus;
    }

    score += config.dependent_multiplier * inputs.dependent_count as f64;

    if inputs.effort_hours <= config.quick_win_threshold_hours {
        score += config.quick_win_bonus;
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_approx_eq(actual: f64, expected: f64) {
        let tolerance = 1e-10;
        assert!(
            (actual - expected).abs() <= tolerance,
            "actual ({actual}) != expected ({expected})"
        );
    }

    fn inputs(priority: Priority) -> ScoreInputs {
        ScoreInputs {
            priority,
            on_critical_path: false,
            dependent_count: 0,
            effort_hours: 8.0,
        }
    }

    #[test]
    fn base_score_is_priority_weight() {
        let config = ScoringConfig::default();
        assert_approx_eq(priority_score(&inputs(Priority::P0), &config), 100.0);
        assert_approx_eq(priority_score(&inputs(Priority::P3), &config), 25.0);
    }

    #[test]
    fn all_bonuses_add_up() {
        let config = ScoringConfig::default();
        let score = priority_score(
            &ScoreInputs {
                priority: Priority::P1,
                on_critical_path: true,
                dependent_count: 3,
                effort_hours: 2.0,
            },
            &config,
        );
        // 75 + 20 + 3*10 + 15
        assert_approx_eq(score, 140.0);
    }

    #[test]
    fn quick_win_threshold_is_inclusive() {
        let config = ScoringConfig::default();
        let at = ScoreInputs {
            effort_hours: 4.0,
            ..inputs(Priority::P2)
        };
        let above = ScoreInputs {
            effort_hours: 4.5,
            ..inputs(Priority::P2)
        };
        assert_approx_eq(priority_score(&at, &config), 65.0);
        assert_approx_eq(priority_score(&above, &config), 50.0);
    }

    #[test]
    fn custom_weights_are_used() {
        let mut config = ScoringConfig::default();
        config.priority_weights.p2 = 60.0;
        config.dependent_multiplier = 1.5;
        let score = priority_score(
            &ScoreInputs {
                dependent_count: 2,
                ..inputs(Priority::P2)
            },
            &config,
        );
        assert_approx_eq(score, 63.0);
    }

    #[test]
    fn higher_priority_outranks_lower_all_else_equal() {
        let config = ScoringConfig::default();
        let scores: Vec<f64> = Priority::ALL
            .iter()
            .map(|&p| priority_score(&inputs(p), &config))
            .collect();
        assert!(scores.windows(2).all(|w| w[0] > w[1]));
    }
}
