//! Per-information-state accumulators.

use serde::{Deserialize, Serialize};

use crate::cfr::regret::{normalize_or_uniform, regret_matching};

/// Regret and average-strategy accumulators for one information state.
///
/// The action list is fixed when the node is created: the same key always
/// denotes the same legal-action set, so the accumulators never change
/// length afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfoStateNode {
    /// Labels of the legal actions, in the order the game lists them.
    actions: Vec<String>,

    /// Cumulative counterfactual regret per action.
    regrets: Vec<f64>,

    /// Cumulative strategy weight per action.
    average_strategy: Vec<f64>,
}

impl InfoStateNode {
    /// Create a node with zeroed accumulators.
    pub fn new(actions: Vec<String>) -> Self {
        let num_actions = actions.len();
        Self {
            actions,
            regrets: vec![0.0; num_actions],
            average_strategy: vec![0.0; num_actions],
        }
    }

    /// Rebuild a node from stored accumulators.
    ///
    /// Returns `None` unless both accumulators have one entry per action.
    pub fn from_parts(
        actions: Vec<String>,
        regrets: Vec<f64>,
        average_strategy: Vec<f64>,
    ) -> Option<Self> {
        if regrets.len() != actions.len() || average_strategy.len() != actions.len() {
            return None;
        }
        Some(Self {
            actions,
            regrets,
            average_strategy,
        })
    }

    /// Number of legal actions at this information state.
    pub fn num_actions(&self) -> usize {
        self.actions.len()
    }

    /// Action labels.
    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    /// Cumulative regrets.
    pub fn regrets(&self) -> &[f64] {
        &self.regrets
    }

    /// Cumulative (unnormalized) average strategy.
    pub fn average_strategy(&self) -> &[f64] {
        &self.average_strategy
    }

    /// Current strategy by regret matching.
    pub fn current_strategy(&self) -> Vec<f64> {
        regret_matching(&self.regrets)
    }

    /// Normalized average strategy, uniform if nothing has been accumulated.
    pub fn average_policy(&self) -> Vec<f64> {
        normalize_or_uniform(&self.average_strategy)
    }

    /// Add `value[a] - node_value` to each action's regret.
    pub fn accumulate_regrets(&mut self, action_values: &[f64], node_value: f64) {
        debug_assert_eq!(action_values.len(), self.regrets.len());
        for (regret, &value) in self.regrets.iter_mut().zip(action_values) {
            *regret += value - node_value;
        }
    }

    /// Fold `strategy * weight` into the average-strategy accumulator.
    pub fn accumulate_average(&mut self, strategy: &[f64], weight: f64) {
        debug_assert_eq!(strategy.len(), self.average_strategy.len());
        for (sum, &prob) in self.average_strategy.iter_mut().zip(strategy) {
            *sum += prob * weight;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(n: usize) -> Vec<String> {
        (0..n).map(|i| i.to_string()).collect()
    }

    #[test]
    fn new_node_is_uniform() {
        let node = InfoStateNode::new(labels(3));
        assert_eq!(node.num_actions(), 3);
        assert_eq!(node.regrets(), &[0.0; 3]);
        assert_eq!(node.current_strategy(), vec![1.0 / 3.0; 3]);
        assert_eq!(node.average_policy(), vec![1.0 / 3.0; 3]);
    }

    #[test]
    fn regrets_accumulate_relative_to_node_value() {
        let mut node = InfoStateNode::new(labels(2));
        node.accumulate_regrets(&[1.0, -1.0], 0.5);
        node.accumulate_regrets(&[2.0, 0.0], 1.0);
        assert_eq!(node.regrets(), &[1.5, -2.5]);
        assert_eq!(node.current_strategy(), vec![1.0, 0.0]);
    }

    #[test]
    fn average_is_weighted() {
        let mut node = InfoStateNode::new(labels(2));
        node.accumulate_average(&[0.5, 0.5], 1.0);
        node.accumulate_average(&[0.0, 1.0], 2.0);
        assert_eq!(node.average_strategy(), &[0.5, 2.5]);
        assert_eq!(node.average_policy(), vec![0.5 / 3.0, 2.5 / 3.0]);
    }

    #[test]
    fn from_parts_rejects_length_mismatch() {
        assert!(InfoStateNode::from_parts(labels(2), vec![0.0; 2], vec![0.0; 3]).is_none());
        assert!(InfoStateNode::from_parts(labels(2), vec![0.0; 1], vec![0.0; 2]).is_none());
        assert!(InfoStateNode::from_parts(labels(2), vec![1.0, 2.0], vec![3.0, 4.0]).is_some());
    }
}
