//! Average-strategy weighting modes.
//!
//! Both modes accumulate into the same [`InfoStateNode`](crate::cfr::InfoStateNode)
//! field; they differ only in where the current strategy is folded in and
//! with which weight.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How the solver builds the average strategy.
///
/// Fixed at construction; a run never switches modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AverageType {
    /// Stochastically-weighted averaging during the sampled passes.
    ///
    /// While player `i` is updated, decision nodes of player `(i + 1) % N`
    /// fold their current strategy with unit weight. That player's actions on
    /// the sampled history were drawn from its own current strategy, so the
    /// sampling frequency supplies its reach weighting in expectation.
    #[default]
    Simple,

    /// Exact averaging over a full walk of the tree after every iteration.
    ///
    /// Each decision node folds its current strategy weighted by the acting
    /// player's reach; subtrees no player can reach are skipped. Lower
    /// variance, but every iteration touches the whole tree.
    Full,
}

impl AverageType {
    /// Weight for folding the strategy of `acting` during the sampled pass
    /// that updates `updating`, or `None` if this node is not folded.
    pub fn sampled_weight(self, acting: usize, updating: usize, num_players: usize) -> Option<f64> {
        match self {
            AverageType::Simple if acting == (updating + 1) % num_players => Some(1.0),
            AverageType::Simple | AverageType::Full => None,
        }
    }

    /// Whether every iteration ends with a full averaging walk.
    pub fn needs_full_walk(self) -> bool {
        matches!(self, AverageType::Full)
    }
}

impl fmt::Display for AverageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AverageType::Simple => write!(f, "simple"),
            AverageType::Full => write!(f, "full"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_folds_only_the_next_player() {
        let mode = AverageType::Simple;
        assert_eq!(mode.sampled_weight(1, 0, 2), Some(1.0));
        assert_eq!(mode.sampled_weight(0, 1, 2), Some(1.0));
        assert_eq!(mode.sampled_weight(0, 0, 2), None);
        assert_eq!(mode.sampled_weight(2, 0, 3), None);
        assert_eq!(mode.sampled_weight(0, 2, 3), Some(1.0));
        assert!(!mode.needs_full_walk());
    }

    #[test]
    fn full_never_folds_during_sampling() {
        let mode = AverageType::Full;
        for acting in 0..3 {
            for updating in 0..3 {
                assert_eq!(mode.sampled_weight(acting, updating, 3), None);
            }
        }
        assert!(mode.needs_full_walk());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&AverageType::Full).unwrap(), "\"full\"");
        let mode: AverageType = serde_json::from_str("\"simple\"").unwrap();
        assert_eq!(mode, AverageType::Simple);
        assert_eq!(AverageType::default().to_string(), "simple");
    }
}
