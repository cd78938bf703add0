//! External-sampling tree walks.
//!
//! [`Traversal::update_regrets`] walks the tree for one updating player:
//! chance and the other players sample a single action, the updating player
//! enumerates all of its actions. The cost of a pass is proportional to the
//! updating player's own branching factor rather than the joint one.
//!
//! [`Traversal::full_update_average`] is the unsampled walk used by
//! [`AverageType::Full`].

use rand::Rng;

use crate::cfr::average::AverageType;
use crate::cfr::game::{Action, Game, InfoState};
use crate::cfr::node::InfoStateNode;
use crate::cfr::storage::InfoStateTable;

/// One walk over the tree, borrowing the game and the solver's table.
pub(crate) struct Traversal<'a, G: Game> {
    game: &'a G,
    table: &'a mut InfoStateTable,
    average_type: AverageType,
    num_players: usize,
}

impl<'a, G: Game> Traversal<'a, G> {
    pub(crate) fn new(game: &'a G, table: &'a mut InfoStateTable, average_type: AverageType) -> Self {
        Self {
            game,
            table,
            average_type,
            num_players: game.num_players(),
        }
    }

    /// Sampled counterfactual value of `state` for `player`, updating regrets
    /// at `player`'s nodes on the way back up.
    pub(crate) fn update_regrets<R: Rng + ?Sized>(
        &mut self,
        state: &G::State,
        player: usize,
        rng: &mut R,
    ) -> f64 {
        if self.game.is_terminal(state) {
            return self.game.player_return(state, player);
        }

        // The sampling probability cancels the chance probability.
        if self.game.is_chance(state) {
            let outcomes = self.game.chance_outcomes(state);
            let probs: Vec<f64> = outcomes.iter().map(|(_, p)| *p).collect();
            let (outcome, _) = &outcomes[sample_index(&probs, rng)];
            let child = self.game.apply_action(state, outcome);
            return self.update_regrets(&child, player, rng);
        }

        let current_player = match self.game.current_player(state) {
            Some(p) => p,
            None => return self.game.player_return(state, player),
        };

        let actions = self.game.legal_actions(state);
        let info_key = self.game.info_state(state, current_player).key();

        // Work on a copy: the children below may revisit this key.
        let strategy = self.node_strategy(&info_key, &actions);

        if current_player == player {
            self.traverse_player(state, player, rng, &actions, &strategy, info_key)
        } else {
            self.traverse_opponent(state, player, rng, &actions, &strategy, info_key, current_player)
        }
    }

    /// Updating player's node: enumerate every action and update regrets.
    ///
    /// Opponents and chance were sampled on-policy, so their reach cancels
    /// against the sampling probability and the sampled regret is unscaled.
    fn traverse_player<R: Rng + ?Sized>(
        &mut self,
        state: &G::State,
        player: usize,
        rng: &mut R,
        actions: &[G::Action],
        strategy: &[f64],
        info_key: String,
    ) -> f64 {
        let action_values: Vec<f64> = actions
            .iter()
            .map(|action| {
                let child = self.game.apply_action(state, action);
                self.update_regrets(&child, player, rng)
            })
            .collect();

        let node_value: f64 = strategy
            .iter()
            .zip(action_values.iter())
            .map(|(&s, &v)| s * v)
            .sum();

        log::trace!("update regret @ {} ({:.4})", info_key, node_value);
        self.table
            .get_or_create(info_key, || labels(actions))
            .accumulate_regrets(&action_values, node_value);

        node_value
    }

    /// Any other player's node: follow one action sampled from the current
    /// strategy.
    #[allow(clippy::too_many_arguments)]
    fn traverse_opponent<R: Rng + ?Sized>(
        &mut self,
        state: &G::State,
        player: usize,
        rng: &mut R,
        actions: &[G::Action],
        strategy: &[f64],
        info_key: String,
        current_player: usize,
    ) -> f64 {
        let action_idx = sample_index(strategy, rng);
        let child = self.game.apply_action(state, &actions[action_idx]);
        let value = self.update_regrets(&child, player, rng);

        if let Some(weight) = self
            .average_type
            .sampled_weight(current_player, player, self.num_players)
        {
            self.table
                .get_or_create(info_key, || labels(actions))
                .accumulate_average(strategy, weight);
        }

        value
    }

    /// Fold every reachable node's current strategy into its average,
    /// weighted by the acting player's entry of `reach`.
    pub(crate) fn full_update_average(&mut self, state: &G::State, reach: &[f64]) {
        if self.game.is_terminal(state) {
            return;
        }

        if self.game.is_chance(state) {
            for (outcome, _) in self.game.chance_outcomes(state) {
                let child = self.game.apply_action(state, &outcome);
                self.full_update_average(&child, reach);
            }
            return;
        }

        // Nobody gets here with positive probability.
        if reach.iter().sum::<f64>() == 0.0 {
            return;
        }

        let current_player = match self.game.current_player(state) {
            Some(p) => p,
            None => return,
        };

        let actions = self.game.legal_actions(state);
        let info_key = self.game.info_state(state, current_player).key();
        let strategy = self.node_strategy(&info_key, &actions);

        for (action, &prob) in actions.iter().zip(&strategy) {
            let mut child_reach = reach.to_vec();
            child_reach[current_player] *= prob;
            let child = self.game.apply_action(state, action);
            self.full_update_average(&child, &child_reach);
        }

        self.table
            .get_or_create(info_key, || labels(&actions))
            .accumulate_average(&strategy, reach[current_player]);
    }

    /// Current strategy at `info_key`, creating the node on first visit.
    ///
    /// A stored node whose action count differs from the live legal actions
    /// is replaced by a fresh one, so the strategy always has one entry per
    /// legal action.
    fn node_strategy(&mut self, info_key: &str, actions: &[G::Action]) -> Vec<f64> {
        let node = self
            .table
            .get_or_create(info_key.to_string(), || labels(actions));
        if node.num_actions() == actions.len() {
            return node.current_strategy();
        }

        log::warn!(
            "info state {} has {} actions stored but {} legal; resetting it",
            info_key,
            node.num_actions(),
            actions.len()
        );
        let fresh = InfoStateNode::new(labels(actions));
        let strategy = fresh.current_strategy();
        self.table.insert(info_key.to_string(), fresh);
        strategy
    }
}

/// Labels stored with a newly created node.
fn labels<A: Action>(actions: &[A]) -> Vec<String> {
    actions.iter().map(Action::label).collect()
}

/// Sample an index according to a probability distribution.
pub(crate) fn sample_index<R: Rng + ?Sized>(probs: &[f64], rng: &mut R) -> usize {
    let r: f64 = rng.gen();
    let mut cumsum = 0.0;

    for (i, &prob) in probs.iter().enumerate() {
        cumsum += prob;
        if r < cumsum {
            return i;
        }
    }

    // Fallback to last index (handles floating point imprecision)
    probs.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::kuhn::KuhnPoker;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn sample_index_follows_distribution() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut counts = [0usize; 3];
        for _ in 0..30_000 {
            counts[sample_index(&[0.2, 0.0, 0.8], &mut rng)] += 1;
        }
        assert_eq!(counts[1], 0);
        let share = counts[0] as f64 / 30_000.0;
        assert!((share - 0.2).abs() < 0.02, "share of first index was {}", share);
    }

    #[test]
    fn sample_index_handles_rounding() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..1000 {
            assert!(sample_index(&[0.0, 0.0], &mut rng) == 1);
        }
    }

    #[test]
    fn regret_pass_only_updates_the_updating_player() {
        let game = KuhnPoker::new(2);
        let mut table = InfoStateTable::new();
        let mut rng = StdRng::seed_from_u64(3);

        let mut traversal = Traversal::new(&game, &mut table, AverageType::Simple);
        for _ in 0..20 {
            traversal.update_regrets(&game.initial_state(), 0, &mut rng);
        }

        for (key, node) in table.iter() {
            let history = key.split(':').nth(1).unwrap_or_default();
            // Player 0 acts at even history lengths in two-player Kuhn.
            if history.len() % 2 == 1 {
                assert!(node.regrets().iter().all(|&r| r == 0.0), "{} has regret", key);
            } else {
                assert!(node.average_strategy().iter().all(|&s| s == 0.0), "{} averaged", key);
            }
        }
        // Player 0's root node was enumerated and must have moved.
        assert!(table.iter().any(|(k, n)| k.ends_with(':') && n.regrets().iter().any(|&r| r != 0.0)));
    }

    #[test]
    fn stale_node_with_wrong_action_count_is_replaced() {
        let game = KuhnPoker::new(2);
        let mut table = InfoStateTable::new();
        let stale = InfoStateNode::from_parts(
            vec!["p".into(), "b".into(), "x".into()],
            vec![0.0, 0.0, 5.0],
            vec![0.0; 3],
        )
        .unwrap();
        for card in 0..3 {
            table.insert(format!("{}:", card), stale.clone());
        }

        let mut rng = StdRng::seed_from_u64(4);
        let mut traversal = Traversal::new(&game, &mut table, AverageType::Simple);
        for player in [0, 1, 0, 1] {
            traversal.update_regrets(&game.initial_state(), player, &mut rng);
        }
        traversal.full_update_average(&game.initial_state(), &[1.0, 1.0]);

        assert_eq!(table.len(), 12);
        assert!(table.iter().all(|(_, n)| n.num_actions() == 2));
        assert!(table.iter().all(|(_, n)| n.actions() == ["p", "b"]));
    }

    #[test]
    fn full_walk_visits_every_info_state() {
        let game = KuhnPoker::new(2);
        let mut table = InfoStateTable::new();

        let mut traversal = Traversal::new(&game, &mut table, AverageType::Full);
        traversal.full_update_average(&game.initial_state(), &[1.0, 1.0]);

        // 3 cards x 4 decision histories.
        assert_eq!(table.len(), 12);
        // Fresh strategies are uniform. "0:" is reached through two deals,
        // each with own reach 1.
        assert_eq!(table.get("0:").unwrap().average_strategy(), &[1.0, 1.0]);
        // "0:pb" is reached through two deals with own reach 1/2.
        assert_eq!(table.get("0:pb").unwrap().average_strategy(), &[0.5, 0.5]);
        assert!(table.iter().all(|(_, n)| n.regrets().iter().all(|&r| r == 0.0)));
    }
}
