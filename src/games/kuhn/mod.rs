//! Kuhn Poker implementation for solver validation.
//!
//! Kuhn Poker is a simplified poker game used to validate CFR implementations
//! because the two-player game has a known, mathematically proven Nash
//! equilibrium. The N-player generalization keeps the same betting structure.
//!
//! ## Game Rules
//!
//! - N players, N + 1 cards ranked 0 (lowest) to N (highest)
//! - Each player antes 1 chip and receives 1 card, dealt in seat order
//! - While nobody has bet, players act in turn: Pass or Bet (1 chip)
//! - After the first bet, every other player responds once, in turn:
//!   Pass (fold) or Bet (call)
//! - Highest card among the players still in wins the pot
//!
//! ## Two-Player Game Tree
//!
//! ```text
//! P0 (first to act)
//! ├── Pass
//! │   └── P1
//! │       ├── Pass → Showdown (pot = 2)
//! │       └── Bet
//! │           └── P0
//! │               ├── Pass → P1 wins (pot = 3)
//! │               └── Bet → Showdown (pot = 4)
//! └── Bet
//!     └── P1
//!         ├── Pass → P0 wins (pot = 3)
//!         └── Bet → Showdown (pot = 4)
//! ```
//!
//! ## Known Nash Equilibrium (two players)
//!
//! - **P0 with Jack**: Bet with probability α ∈ [0, 1/3]
//! - **P0 with Queen**: Always Pass
//! - **P0 with King**: Bet with probability 3α
//! - **P1 facing Bet with Jack**: Always Fold
//! - **P1 facing Bet with Queen**: Call with probability 1/3
//! - **P1 facing Bet with King**: Always Call
//!
//! **Expected Value**: P0 EV = -1/18 ≈ -0.0556

use std::fmt;

use crate::cfr::game::{Action, Game, InfoState};
use crate::impl_game_state;

/// Actions in Kuhn Poker, including the deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KuhnAction {
    /// Chance deals this card to the next player
    Deal(u8),
    /// Pass (check if no bet, fold if facing bet)
    Pass,
    /// Bet (or call if facing bet)
    Bet,
}

impl Action for KuhnAction {
    fn label(&self) -> String {
        match self {
            KuhnAction::Deal(card) => format!("d{}", card),
            KuhnAction::Pass => "p".to_string(),
            KuhnAction::Bet => "b".to_string(),
        }
    }
}

impl fmt::Display for KuhnAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KuhnAction::Deal(card) => write!(f, "Deal {}", card),
            KuhnAction::Pass => write!(f, "Pass"),
            KuhnAction::Bet => write!(f, "Bet"),
        }
    }
}

/// Information state in Kuhn Poker.
///
/// What a player knows: their card and the action history.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KuhnInfoState {
    /// Player's card
    pub card: u8,
    /// Action history as string (e.g., "pb" = pass then bet)
    pub history: String,
}

impl InfoState for KuhnInfoState {
    fn key(&self) -> String {
        format!("{}:{}", self.card, self.history)
    }
}

/// Complete game state in Kuhn Poker.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KuhnState {
    /// Cards dealt so far; `cards[i]` belongs to player `i`
    pub cards: Vec<u8>,
    /// Betting history, one `p` or `b` per action
    pub history: String,
}

impl_game_state!(KuhnState);

impl fmt::Display for KuhnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cards:{:?} History:{}", self.cards, self.history)
    }
}

/// N-player Kuhn Poker.
#[derive(Debug, Clone)]
pub struct KuhnPoker {
    num_players: usize,
}

impl Default for KuhnPoker {
    fn default() -> Self {
        Self::new(2)
    }
}

impl KuhnPoker {
    /// Create a Kuhn Poker game for `num_players` players.
    pub fn new(num_players: usize) -> Self {
        Self { num_players }
    }

    fn first_bet(state: &KuhnState) -> Option<usize> {
        state.history.find('b')
    }

    /// Chips each player has put in the pot.
    pub fn contributions(&self, state: &KuhnState) -> Vec<u32> {
        let mut pot = vec![1; self.num_players];
        for (i, action) in state.history.chars().enumerate() {
            if action == 'b' {
                pot[i % self.num_players] += 1;
            }
        }
        pot
    }
}

impl Game for KuhnPoker {
    type State = KuhnState;
    type Action = KuhnAction;
    type InfoState = KuhnInfoState;

    fn name(&self) -> String {
        format!("kuhn_poker(players={})", self.num_players)
    }

    fn num_players(&self) -> usize {
        self.num_players
    }

    fn initial_state(&self) -> Self::State {
        KuhnState::default()
    }

    fn is_terminal(&self, state: &Self::State) -> bool {
        if self.is_chance(state) {
            return false;
        }
        // Everyone passed, or everyone responded to the first bet.
        match Self::first_bet(state) {
            None => state.history.len() == self.num_players,
            Some(bet) => state.history.len() == bet + self.num_players,
        }
    }

    fn returns(&self, state: &Self::State) -> Vec<f64> {
        debug_assert!(self.is_terminal(state), "returns called on non-terminal state");

        let n = self.num_players;
        let pot = self.contributions(state);

        // After a bet only the bettor and the callers contest the pot.
        let contesting: Vec<usize> = match Self::first_bet(state) {
            None => (0..n).collect(),
            Some(_) => state
                .history
                .char_indices()
                .filter(|&(_, a)| a == 'b')
                .map(|(i, _)| i % n)
                .collect(),
        };

        let winner = contesting
            .into_iter()
            .max_by_key(|&p| state.cards[p])
            .unwrap_or(0);
        let total: u32 = pot.iter().sum();

        (0..n)
            .map(|p| {
                let won = if p == winner { total } else { 0 };
                f64::from(won) - f64::from(pot[p])
            })
            .collect()
    }

    fn is_chance(&self, state: &Self::State) -> bool {
        state.cards.len() < self.num_players
    }

    fn chance_outcomes(&self, state: &Self::State) -> Vec<(Self::Action, f64)> {
        if !self.is_chance(state) {
            return vec![];
        }
        let remaining: Vec<u8> = (0..=self.num_players as u8)
            .filter(|card| !state.cards.contains(card))
            .collect();
        let prob = 1.0 / remaining.len() as f64;
        remaining
            .into_iter()
            .map(|card| (KuhnAction::Deal(card), prob))
            .collect()
    }

    fn current_player(&self, state: &Self::State) -> Option<usize> {
        if self.is_chance(state) || self.is_terminal(state) {
            return None;
        }
        Some(state.history.len() % self.num_players)
    }

    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action> {
        if self.current_player(state).is_none() {
            return vec![];
        }
        vec![KuhnAction::Pass, KuhnAction::Bet]
    }

    fn apply_action(&self, state: &Self::State, action: &Self::Action) -> Self::State {
        let mut new_state = state.clone();

        match action {
            KuhnAction::Deal(card) => new_state.cards.push(*card),
            KuhnAction::Pass => new_state.history.push('p'),
            KuhnAction::Bet => new_state.history.push('b'),
        }

        new_state
    }

    fn info_state(&self, state: &Self::State, player: usize) -> Self::InfoState {
        KuhnInfoState {
            card: state.cards[player],
            history: state.history.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfr::{ExternalSamplingSolver, Policy, SolverConfig};
    use crate::eval::GameTree;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn dealt(cards: &[u8], history: &str) -> KuhnState {
        KuhnState {
            cards: cards.to_vec(),
            history: history.to_string(),
        }
    }

    #[test]
    fn test_kuhn_game_tree() {
        let game = KuhnPoker::new(2);

        // Test initial state
        let state = game.initial_state();
        assert!(game.is_chance(&state));
        assert_eq!(game.current_player(&state), None);

        let outcomes = game.chance_outcomes(&state);
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes.iter().all(|(_, p)| (*p - 1.0 / 3.0).abs() < 1e-12));

        // Second deal excludes the first card
        let state = game.apply_action(&state, &KuhnAction::Deal(1));
        let outcomes = game.chance_outcomes(&state);
        assert_eq!(outcomes.len(), 2);
        assert!(!outcomes.iter().any(|(a, _)| *a == KuhnAction::Deal(1)));

        let state = game.apply_action(&state, &KuhnAction::Deal(2));
        assert!(!game.is_chance(&state));
        assert!(!game.is_terminal(&state));
        assert_eq!(game.current_player(&state), Some(0));
        assert_eq!(game.legal_actions(&state), vec![KuhnAction::Pass, KuhnAction::Bet]);

        // "pb" comes back to P0
        let state = dealt(&[1, 2], "pb");
        assert_eq!(game.current_player(&state), Some(0));
        assert!(game.is_terminal(&dealt(&[1, 2], "pbp")));
        assert!(game.legal_actions(&dealt(&[1, 2], "bb")).is_empty());
    }

    #[test]
    fn test_kuhn_terminal_payoffs() {
        let game = KuhnPoker::new(2);

        // "pp" - both pass, higher card wins the antes
        assert_eq!(game.returns(&dealt(&[2, 0], "pp")), vec![1.0, -1.0]);

        // "bp" - bet then fold
        assert_eq!(game.returns(&dealt(&[0, 2], "bp")), vec![1.0, -1.0]);

        // "pbp" - P0 folds to P1's bet
        assert_eq!(game.returns(&dealt(&[2, 0], "pbp")), vec![-1.0, 1.0]);

        // "bb" - bet then call, showdown
        assert_eq!(game.returns(&dealt(&[0, 2], "bb")), vec![-2.0, 2.0]);
        assert_eq!(game.returns(&dealt(&[1, 0], "pbb")), vec![2.0, -2.0]);
    }

    #[test]
    fn test_three_player_betting() {
        let game = KuhnPoker::new(3);
        assert_eq!(game.name(), "kuhn_poker(players=3)");
        assert_eq!(game.chance_outcomes(&game.initial_state()).len(), 4);

        // Everyone checks: highest card takes the antes
        let state = dealt(&[3, 1, 0], "ppp");
        assert!(game.is_terminal(&state));
        assert_eq!(game.returns(&state), vec![2.0, -1.0, -1.0]);

        // P1 bets, P2 folds, P0 calls: P0 holds the best contesting card
        let state = dealt(&[2, 1, 3], "pb");
        assert_eq!(game.current_player(&state), Some(2));
        assert!(!game.is_terminal(&dealt(&[2, 1, 3], "pbp")));
        let state = dealt(&[2, 1, 3], "pbpb");
        assert!(game.is_terminal(&state));
        assert_eq!(game.returns(&state), vec![3.0, -2.0, -1.0]);

        // Bet from the first seat, both fold
        let state = dealt(&[0, 3, 2], "bpp");
        assert!(game.is_terminal(&state));
        assert_eq!(game.returns(&state), vec![2.0, -1.0, -1.0]);
    }

    #[test]
    fn test_kuhn_info_states() {
        let game = KuhnPoker::new(2);
        let state = dealt(&[1, 2], "p");

        // Current player is P1 (index 1)
        assert_eq!(game.current_player(&state), Some(1));

        // Info state should show P1's card (K=2) and history
        let info = game.info_state(&state, 1);
        assert_eq!(info.card, 2);
        assert_eq!(info.history, "p");
        assert_eq!(info.key(), "2:p");
        assert_eq!(game.info_state(&state, 0).key(), "1:p");
    }

    #[test]
    fn test_kuhn_convergence() {
        let game = KuhnPoker::new(2);
        let tree = GameTree::build(&game);
        let mut solver = ExternalSamplingSolver::new(&game, SolverConfig::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(230398247);

        for _ in 0..10_000 {
            solver.run_iteration_with(&mut rng);
        }

        // 3 cards x 4 decision histories
        assert_eq!(solver.num_info_sets(), 12);

        let policy = solver.average_policy();
        let nash_conv = tree.nash_conv(&policy);
        assert!(nash_conv <= 0.05, "Kuhn NashConv {} above 0.05", nash_conv);

        // P1 with King facing a bet should nearly always call
        let king_vs_bet = policy.action_probabilities("2:b").unwrap();
        assert!(king_vs_bet[1] > 0.9, "King call probability {}", king_vs_bet[1]);
    }

    #[test]
    fn test_kuhn_exploitability_decreases_over_blocks() {
        let game = KuhnPoker::new(2);
        let tree = GameTree::build(&game);
        let mut solver = ExternalSamplingSolver::new(&game, SolverConfig::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(230398247);

        let mut series = vec![tree.exploitability(&solver.average_policy())];
        for _ in 0..10 {
            for _ in 0..1_000 {
                solver.run_iteration_with(&mut rng);
            }
            series.push(tree.exploitability(&solver.average_policy()));
        }

        // Sampling noise moves single blocks by a few thousandths
        for pair in series.windows(2) {
            assert!(pair[1] <= pair[0] + 0.01, "exploitability rose: {:?}", series);
        }
        assert!(series[1..].iter().all(|&e| e <= series[1]), "{:?}", series);
        assert!(series[10] < series[0] / 10.0, "{:?}", series);
    }

    #[test]
    fn test_three_player_both_averaging_modes() {
        let game = KuhnPoker::new(3);
        let tree = GameTree::build(&game);

        let mut simple =
            ExternalSamplingSolver::new(&game, SolverConfig::default().with_seed(230398247)).unwrap();
        simple.train(100);
        let nash_conv = tree.nash_conv(&simple.average_policy());
        assert!(nash_conv.is_finite() && nash_conv >= 0.0, "simple NashConv {}", nash_conv);
        assert!(simple.num_info_sets() <= 48);

        let mut full = ExternalSamplingSolver::new(&game, SolverConfig::full().with_seed(39693847)).unwrap();
        full.train(100);
        let nash_conv = tree.nash_conv(&full.average_policy());
        assert!(nash_conv.is_finite() && nash_conv >= 0.0, "full NashConv {}", nash_conv);
        // The full walk touches every information state each iteration.
        assert_eq!(full.num_info_sets(), 48);
    }
}
