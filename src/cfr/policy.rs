//! Policies: mappings from information state to action probabilities.

use std::borrow::Cow;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cfr::regret::uniform;

/// A (possibly partial) behaviour strategy for every player.
///
/// Information states the policy does not know about are played uniformly.
pub trait Policy: Sync {
    /// Action probabilities at an information state, if the policy has them.
    fn action_probabilities(&self, info_key: &str) -> Option<&[f64]>;

    /// Action probabilities, falling back to uniform over `num_actions`.
    fn probabilities_or_uniform(&self, info_key: &str, num_actions: usize) -> Cow<'_, [f64]> {
        match self.action_probabilities(info_key) {
            Some(probs) if probs.len() == num_actions => Cow::Borrowed(probs),
            _ => Cow::Owned(uniform(num_actions)),
        }
    }
}

/// Tabular policy snapshot.
///
/// Owns its probabilities, so it stays valid while the solver keeps
/// training.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabularPolicy {
    probabilities: FxHashMap<String, Vec<f64>>,
}

impl TabularPolicy {
    /// Empty policy (uniform everywhere).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the distribution for one information state.
    pub fn insert(&mut self, info_key: String, probabilities: Vec<f64>) {
        self.probabilities.insert(info_key, probabilities);
    }

    /// Number of information states with an explicit distribution.
    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    /// True if no information state has an explicit distribution.
    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    /// Iterate over `(key, probabilities)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<f64>)> {
        self.probabilities.iter()
    }
}

impl Policy for TabularPolicy {
    fn action_probabilities(&self, info_key: &str) -> Option<&[f64]> {
        self.probabilities.get(info_key).map(Vec::as_slice)
    }
}

impl FromIterator<(String, Vec<f64>)> for TabularPolicy {
    fn from_iter<I: IntoIterator<Item = (String, Vec<f64>)>>(iter: I) -> Self {
        Self {
            probabilities: iter.into_iter().collect(),
        }
    }
}
