//! Materialized game tree for exact policy evaluation.
//!
//! Flattens the recursive game into a dense array of nodes. The tree is
//! built once with an explicit DFS stack, so deep games do not grow the call
//! stack, and every node's children have larger indices than the node itself.
//!
//! ```text
//! GameTree { nodes: Vec<TreeNode>, info_sets: Vec<InfoSetEntry> }
//!     │
//!     ├── Decision nodes: player, info set index, children
//!     ├── Chance nodes: (child, probability) pairs
//!     └── Terminal nodes: per-player returns
//! ```

use std::borrow::Cow;

use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::cfr::game::{Game, InfoState};
use crate::cfr::policy::Policy;

/// Index of a node in [`GameTree`].
type NodeId = usize;

const UNSET: NodeId = NodeId::MAX;

#[derive(Debug, Clone)]
enum TreeNode {
    Terminal {
        returns: Vec<f64>,
    },
    Chance {
        children: Vec<(NodeId, f64)>,
    },
    Decision {
        player: usize,
        info_set: usize,
        children: Vec<NodeId>,
    },
}

/// One information set and the tree nodes it groups.
#[derive(Debug, Clone)]
struct InfoSetEntry {
    key: String,
    player: usize,
    num_actions: usize,
    nodes: Vec<NodeId>,
}

/// Statistics about a materialized game tree.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TreeStats {
    /// All nodes.
    pub total_nodes: usize,
    /// Player decision nodes.
    pub decision_nodes: usize,
    /// Chance nodes.
    pub chance_nodes: usize,
    /// Terminal nodes.
    pub terminal_nodes: usize,
    /// Distinct information sets.
    pub info_sets: usize,
}

/// The full game tree with its information-set index.
#[derive(Debug, Clone)]
pub struct GameTree {
    nodes: Vec<TreeNode>,
    info_sets: Vec<InfoSetEntry>,
    num_players: usize,
}

impl GameTree {
    /// Materialize every reachable history of `game`.
    pub fn build<G: Game>(game: &G) -> Self {
        let mut nodes: Vec<TreeNode> = Vec::new();
        let mut info_sets: Vec<InfoSetEntry> = Vec::new();
        let mut index: FxHashMap<String, usize> = FxHashMap::default();

        // DFS stack: (state, parent node and child slot)
        let mut stack: Vec<(G::State, Option<(NodeId, usize)>)> = vec![(game.initial_state(), None)];

        while let Some((state, parent)) = stack.pop() {
            let id = nodes.len();
            if let Some((parent_id, slot)) = parent {
                match &mut nodes[parent_id] {
                    TreeNode::Chance { children } => children[slot].0 = id,
                    TreeNode::Decision { children, .. } => children[slot] = id,
                    TreeNode::Terminal { .. } => unreachable!("terminal nodes have no children"),
                }
            }

            if game.is_terminal(&state) {
                nodes.push(TreeNode::Terminal {
                    returns: game.returns(&state),
                });
                continue;
            }

            if game.is_chance(&state) {
                let outcomes = game.chance_outcomes(&state);
                nodes.push(TreeNode::Chance {
                    children: outcomes.iter().map(|(_, p)| (UNSET, *p)).collect(),
                });
                for (slot, (outcome, _)) in outcomes.iter().enumerate() {
                    stack.push((game.apply_action(&state, outcome), Some((id, slot))));
                }
                continue;
            }

            let player = match game.current_player(&state) {
                Some(p) => p,
                None => {
                    nodes.push(TreeNode::Terminal {
                        returns: game.returns(&state),
                    });
                    continue;
                }
            };

            let actions = game.legal_actions(&state);
            let key = game.info_state(&state, player).key();
            let info_set = *index.entry(key.clone()).or_insert_with(|| {
                info_sets.push(InfoSetEntry {
                    key,
                    player,
                    num_actions: actions.len(),
                    nodes: Vec::new(),
                });
                info_sets.len() - 1
            });
            debug_assert_eq!(info_sets[info_set].player, player);
            debug_assert_eq!(info_sets[info_set].num_actions, actions.len());
            info_sets[info_set].nodes.push(id);

            nodes.push(TreeNode::Decision {
                player,
                info_set,
                children: vec![UNSET; actions.len()],
            });
            for (slot, action) in actions.iter().enumerate() {
                stack.push((game.apply_action(&state, action), Some((id, slot))));
            }
        }

        log::debug!(
            "built tree for {}: {} nodes, {} info sets",
            game.name(),
            nodes.len(),
            info_sets.len()
        );

        Self {
            nodes,
            info_sets,
            num_players: game.num_players(),
        }
    }

    /// Number of players.
    pub fn num_players(&self) -> usize {
        self.num_players
    }

    /// Number of distinct information sets.
    pub fn num_info_sets(&self) -> usize {
        self.info_sets.len()
    }

    /// Information-set keys, in discovery order.
    pub fn info_set_keys(&self) -> impl Iterator<Item = &str> {
        self.info_sets.iter().map(|info| info.key.as_str())
    }

    /// Node and information-set counts.
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats {
            total_nodes: self.nodes.len(),
            info_sets: self.info_sets.len(),
            ..TreeStats::default()
        };
        for node in &self.nodes {
            match node {
                TreeNode::Terminal { .. } => stats.terminal_nodes += 1,
                TreeNode::Chance { .. } => stats.chance_nodes += 1,
                TreeNode::Decision { .. } => stats.decision_nodes += 1,
            }
        }
        stats
    }

    /// Look up every information set's distribution once.
    fn strategies<'p, P: Policy>(&self, policy: &'p P) -> Vec<Cow<'p, [f64]>> {
        self.info_sets
            .iter()
            .map(|info| policy.probabilities_or_uniform(&info.key, info.num_actions))
            .collect()
    }

    /// Expected return of every player when all of them follow `policy`.
    pub fn expected_returns<P: Policy>(&self, policy: &P) -> Vec<f64> {
        self.expected_returns_with(&self.strategies(policy))
    }

    fn expected_returns_with(&self, strategies: &[Cow<'_, [f64]>]) -> Vec<f64> {
        let mut values: Vec<Vec<f64>> = vec![Vec::new(); self.nodes.len()];

        // Children always have larger ids than their parent.
        for id in (0..self.nodes.len()).rev() {
            let mut value = vec![0.0; self.num_players];
            match &self.nodes[id] {
                TreeNode::Terminal { returns } => value.copy_from_slice(returns),
                TreeNode::Chance { children } => {
                    for &(child, prob) in children {
                        for (v, c) in value.iter_mut().zip(&values[child]) {
                            *v += prob * c;
                        }
                    }
                }
                TreeNode::Decision {
                    info_set, children, ..
                } => {
                    for (&child, &prob) in children.iter().zip(strategies[*info_set].iter()) {
                        for (v, c) in value.iter_mut().zip(&values[child]) {
                            *v += prob * c;
                        }
                    }
                }
            }
            values[id] = value;
        }

        values.swap_remove(0)
    }

    /// Value `player` obtains by best-responding to everyone else playing
    /// `policy`.
    pub fn best_response_value<P: Policy>(&self, policy: &P, player: usize) -> f64 {
        BestResponse::new(self, &self.strategies(policy), player).value(0)
    }

    /// Sum over players of the gain from deviating to a best response.
    ///
    /// Best responses are computed for all players in parallel.
    pub fn nash_conv<P: Policy>(&self, policy: &P) -> f64 {
        let strategies = self.strategies(policy);
        let on_policy = self.expected_returns_with(&strategies);

        let best_responses: Vec<f64> = (0..self.num_players)
            .into_par_iter()
            .map(|player| BestResponse::new(self, &strategies, player).value(0))
            .collect();

        best_responses
            .iter()
            .zip(&on_policy)
            .map(|(br, value)| br - value)
            .sum()
    }

    /// NashConv divided by the number of players.
    pub fn exploitability<P: Policy>(&self, policy: &P) -> f64 {
        self.nash_conv(policy) / self.num_players as f64
    }
}

/// Best response of one player against fixed opponent strategies.
struct BestResponse<'t, 's> {
    tree: &'t GameTree,
    strategies: &'s [Cow<'s, [f64]>],
    player: usize,
    /// Probability that chance and the other players reach each node.
    reach: Vec<f64>,
    values: Vec<Option<f64>>,
    choices: Vec<Option<usize>>,
}

impl<'t, 's> BestResponse<'t, 's> {
    fn new(tree: &'t GameTree, strategies: &'s [Cow<'s, [f64]>], player: usize) -> Self {
        let mut reach = vec![0.0; tree.nodes.len()];
        if !reach.is_empty() {
            reach[0] = 1.0;
        }

        // Parents come before children.
        for id in 0..tree.nodes.len() {
            let here = reach[id];
            match &tree.nodes[id] {
                TreeNode::Terminal { .. } => {}
                TreeNode::Chance { children } => {
                    for &(child, prob) in children {
                        reach[child] = here * prob;
                    }
                }
                TreeNode::Decision {
                    player: acting,
                    info_set,
                    children,
                } => {
                    if *acting == player {
                        for &child in children {
                            reach[child] = here;
                        }
                    } else {
                        for (&child, &prob) in children.iter().zip(strategies[*info_set].iter()) {
                            reach[child] = here * prob;
                        }
                    }
                }
            }
        }

        Self {
            tree,
            strategies,
            player,
            reach,
            values: vec![None; tree.nodes.len()],
            choices: vec![None; tree.info_sets.len()],
        }
    }

    fn value(&mut self, id: NodeId) -> f64 {
        if let Some(value) = self.values[id] {
            return value;
        }

        let tree = self.tree;
        let value = match &tree.nodes[id] {
            TreeNode::Terminal { returns } => returns[self.player],
            TreeNode::Chance { children } => children
                .iter()
                .map(|&(child, prob)| prob * self.value(child))
                .sum::<f64>(),
            TreeNode::Decision {
                player,
                info_set,
                children,
            } if *player != self.player => {
                let strategies = self.strategies;
                children
                    .iter()
                    .zip(strategies[*info_set].iter())
                    .map(|(&child, &prob)| prob * self.value(child))
                    .sum::<f64>()
            }
            TreeNode::Decision {
                info_set, children, ..
            } => {
                let choice = self.choose(*info_set);
                self.value(children[choice])
            }
        };

        self.values[id] = Some(value);
        value
    }

    /// The action maximizing reach-weighted value over the whole info set.
    fn choose(&mut self, info_set: usize) -> usize {
        if let Some(choice) = self.choices[info_set] {
            return choice;
        }

        let tree = self.tree;
        let entry = &tree.info_sets[info_set];
        let mut totals = vec![0.0; entry.num_actions];
        for &node in &entry.nodes {
            let reach = self.reach[node];
            if let TreeNode::Decision { children, .. } = &tree.nodes[node] {
                for (total, &child) in totals.iter_mut().zip(children) {
                    *total += reach * self.value(child);
                }
            }
        }

        let mut best = 0;
        for (action, &total) in totals.iter().enumerate().skip(1) {
            if total > totals[best] {
                best = action;
            }
        }

        self.choices[info_set] = Some(best);
        best
    }
}
