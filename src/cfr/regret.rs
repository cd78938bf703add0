//! Regret matching.
//!
//! Converts accumulated regrets into the current strategy:
//!
//! ```text
//! Strategy(a) = max(0, Regret(a)) / sum(max(0, Regret(a')))
//! ```
//!
//! falling back to the uniform strategy when no action has positive regret.

/// Current strategy for a regret vector.
///
/// Returns a vector of action probabilities summing to 1.0. Freshly created
/// information states (all regrets zero) get the uniform strategy.
pub fn regret_matching(regrets: &[f64]) -> Vec<f64> {
    let positive: Vec<f64> = regrets.iter().map(|&r| r.max(0.0)).collect();
    normalize_or_uniform(&positive)
}

/// Normalize non-negative weights into a distribution.
///
/// If the weights do not sum to a strictly positive value, every action gets
/// probability `1 / len`.
pub fn normalize_or_uniform(weights: &[f64]) -> Vec<f64> {
    let sum: f64 = weights.iter().sum();
    if sum > 0.0 {
        weights.iter().map(|&w| w / sum).collect()
    } else {
        uniform(weights.len())
    }
}

/// Uniform distribution over `num_actions` actions.
pub fn uniform(num_actions: usize) -> Vec<f64> {
    vec![1.0 / num_actions as f64; num_actions]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn positive_regrets_are_normalized() {
        let strategy = regret_matching(&[1.0, 3.0, -2.0]);
        assert_relative_eq!(strategy[0], 0.25);
        assert_relative_eq!(strategy[1], 0.75);
        assert_eq!(strategy[2], 0.0);
    }

    #[test]
    fn non_positive_regrets_fall_back_to_uniform() {
        assert_eq!(regret_matching(&[0.0, 0.0]), vec![0.5, 0.5]);
        assert_eq!(regret_matching(&[-1.0, -4.0, 0.0, -0.5]), vec![0.25; 4]);
    }

    #[test]
    fn average_weights_fall_back_to_uniform() {
        let strategy = normalize_or_uniform(&[0.0, 0.0, 0.0]);
        for p in strategy {
            assert_relative_eq!(p, 1.0 / 3.0);
        }
        assert_eq!(normalize_or_uniform(&[2.0, 6.0]), vec![0.25, 0.75]);
    }
}
