//! Liar's Dice.
//!
//! Every player rolls their dice in secret, then players take turns raising
//! a bid on how many dice across the table show a given face. Instead of
//! raising, a player may call the previous bidder a liar, which ends the game.
//!
//! ## Game Rules
//!
//! - N players with d six-sided dice each; 6 is wild
//! - Bid `b` claims at least `b / 6 + 1` dice showing face `b % 6 + 1`
//! - Each bid must be strictly higher than the previous one
//! - Calling liar is legal once a bid exists; if the bid holds the caller
//!   loses, otherwise the bidder does
//! - The loser receives -1, every other player +1 / (N - 1)

use std::fmt;

use crate::cfr::game::{Action, Game, InfoState};
use crate::impl_game_state;

/// Faces on each die.
pub const DICE_SIDES: u8 = 6;

/// The wild face, counted towards every bid.
pub const WILD_FACE: u8 = 6;

/// Actions in Liar's Dice, including the rolls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiarsDiceAction {
    /// Chance rolls this face for the next die
    Roll(u8),
    /// Bid by index; see [`LiarsDice::bid`]
    Bid(usize),
    /// Challenge the previous bid
    Liar,
}

impl Action for LiarsDiceAction {
    fn label(&self) -> String {
        match self {
            LiarsDiceAction::Roll(face) => format!("r{}", face),
            LiarsDiceAction::Bid(bid) => {
                let (quantity, face) = LiarsDice::bid(*bid);
                format!("{}-{}", quantity, face)
            }
            LiarsDiceAction::Liar => "liar".to_string(),
        }
    }
}

impl fmt::Display for LiarsDiceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// What one player knows: their own dice and every bid so far.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LiarsDiceInfoState {
    /// The player's dice, sorted
    pub dice: Vec<u8>,
    /// Bid indices in the order they were made
    pub bids: Vec<usize>,
}

impl InfoState for LiarsDiceInfoState {
    fn key(&self) -> String {
        let dice: String = self.dice.iter().map(|d| d.to_string()).collect();
        let bids: Vec<String> = self.bids.iter().map(|b| b.to_string()).collect();
        format!("{}:{}", dice, bids.join(","))
    }
}

/// Complete game state in Liar's Dice.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LiarsDiceState {
    /// Dice rolled so far, player 0's first
    pub dice: Vec<u8>,
    /// Bid indices in the order they were made
    pub bids: Vec<usize>,
    /// Whether the last bid was challenged
    pub called: bool,
}

impl_game_state!(LiarsDiceState);

/// Liar's Dice for `N` players with `d` dice each.
#[derive(Debug, Clone)]
pub struct LiarsDice {
    num_players: usize,
    dice_per_player: usize,
}

impl Default for LiarsDice {
    fn default() -> Self {
        Self::new(2, 1)
    }
}

impl LiarsDice {
    /// Create a game for `num_players` players with `dice_per_player` dice each.
    pub fn new(num_players: usize, dice_per_player: usize) -> Self {
        Self {
            num_players,
            dice_per_player,
        }
    }

    /// Dice on the table.
    pub fn total_dice(&self) -> usize {
        self.num_players * self.dice_per_player
    }

    /// Number of distinct bids.
    pub fn num_bids(&self) -> usize {
        self.total_dice() * DICE_SIDES as usize
    }

    /// Quantity and face of bid index `bid`.
    pub fn bid(bid: usize) -> (usize, u8) {
        let sides = DICE_SIDES as usize;
        (bid / sides + 1, (bid % sides) as u8 + 1)
    }

    /// Dice belonging to `player`, sorted.
    fn player_dice(&self, state: &LiarsDiceState, player: usize) -> Vec<u8> {
        let mut dice: Vec<u8> = state
            .dice
            .iter()
            .skip(player * self.dice_per_player)
            .take(self.dice_per_player)
            .copied()
            .collect();
        dice.sort_unstable();
        dice
    }

    /// Dice on the table that count towards `face`.
    fn count_matching(state: &LiarsDiceState, face: u8) -> usize {
        state
            .dice
            .iter()
            .filter(|&&d| d == face || d == WILD_FACE)
            .count()
    }

    /// Player who lost the challenge, at a terminal state.
    pub fn loser(&self, state: &LiarsDiceState) -> Option<usize> {
        let last = *state.bids.last()?;
        let n = self.num_players;
        let bidder = (state.bids.len() - 1) % n;
        let caller = state.bids.len() % n;

        let (quantity, face) = Self::bid(last);
        if Self::count_matching(state, face) >= quantity {
            Some(caller)
        } else {
            Some(bidder)
        }
    }
}

impl Game for LiarsDice {
    type State = LiarsDiceState;
    type Action = LiarsDiceAction;
    type InfoState = LiarsDiceInfoState;

    fn name(&self) -> String {
        format!(
            "liars_dice(players={},numdice={})",
            self.num_players, self.dice_per_player
        )
    }

    fn num_players(&self) -> usize {
        self.num_players
    }

    fn initial_state(&self) -> Self::State {
        LiarsDiceState::default()
    }

    fn is_terminal(&self, state: &Self::State) -> bool {
        state.called
    }

    fn returns(&self, state: &Self::State) -> Vec<f64> {
        debug_assert!(self.is_terminal(state), "returns called on non-terminal state");

        let others = 1.0 / (self.num_players - 1) as f64;
        match self.loser(state) {
            Some(loser) => (0..self.num_players)
                .map(|p| if p == loser { -1.0 } else { others })
                .collect(),
            None => vec![0.0; self.num_players],
        }
    }

    fn is_chance(&self, state: &Self::State) -> bool {
        state.dice.len() < self.total_dice()
    }

    fn chance_outcomes(&self, state: &Self::State) -> Vec<(Self::Action, f64)> {
        if !self.is_chance(state) {
            return vec![];
        }
        let prob = 1.0 / f64::from(DICE_SIDES);
        (1..=DICE_SIDES)
            .map(|face| (LiarsDiceAction::Roll(face), prob))
            .collect()
    }

    fn current_player(&self, state: &Self::State) -> Option<usize> {
        if self.is_chance(state) || self.is_terminal(state) {
            return None;
        }
        Some(state.bids.len() % self.num_players)
    }

    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action> {
        if self.current_player(state).is_none() {
            return vec![];
        }

        let lowest = state.bids.last().map_or(0, |&b| b + 1);
        let mut actions: Vec<LiarsDiceAction> =
            (lowest..self.num_bids()).map(LiarsDiceAction::Bid).collect();
        if !state.bids.is_empty() {
            actions.push(LiarsDiceAction::Liar);
        }
        actions
    }

    fn apply_action(&self, state: &Self::State, action: &Self::Action) -> Self::State {
        let mut new_state = state.clone();

        match action {
            LiarsDiceAction::Roll(face) => new_state.dice.push(*face),
            LiarsDiceAction::Bid(bid) => new_state.bids.push(*bid),
            LiarsDiceAction::Liar => new_state.called = true,
        }

        new_state
    }

    fn info_state(&self, state: &Self::State, player: usize) -> Self::InfoState {
        LiarsDiceInfoState {
            dice: self.player_dice(state, player),
            bids: state.bids.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfr::{ExternalSamplingSolver, SolverConfig};
    use crate::eval::GameTree;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn called(dice: &[u8], bids: &[usize]) -> LiarsDiceState {
        LiarsDiceState {
            dice: dice.to_vec(),
            bids: bids.to_vec(),
            called: true,
        }
    }

    #[test]
    fn bid_encoding() {
        assert_eq!(LiarsDice::bid(0), (1, 1));
        assert_eq!(LiarsDice::bid(5), (1, 6));
        assert_eq!(LiarsDice::bid(7), (2, 2));
        assert_eq!(LiarsDiceAction::Bid(11).label(), "2-6");
        assert_eq!(LiarsDiceAction::Liar.label(), "liar");
    }

    #[test]
    fn legal_actions() {
        let game = LiarsDice::new(2, 1);
        assert_eq!(game.name(), "liars_dice(players=2,numdice=1)");

        let s = game.apply_action(&game.initial_state(), &LiarsDiceAction::Roll(3));
        assert!(game.is_chance(&s));
        assert_eq!(game.chance_outcomes(&s).len(), 6);

        let s = game.apply_action(&s, &LiarsDiceAction::Roll(5));
        assert_eq!(game.current_player(&s), Some(0));
        let actions = game.legal_actions(&s);
        assert_eq!(actions.len(), 12);
        assert!(!actions.contains(&LiarsDiceAction::Liar));

        let s = game.apply_action(&s, &LiarsDiceAction::Bid(4));
        assert_eq!(game.current_player(&s), Some(1));
        let actions = game.legal_actions(&s);
        assert_eq!(actions.first(), Some(&LiarsDiceAction::Bid(5)));
        assert_eq!(actions.last(), Some(&LiarsDiceAction::Liar));
        assert_eq!(actions.len(), 8);
        assert_eq!(game.info_state(&s, 1).key(), "5:4");

        let s = game.apply_action(&s, &LiarsDiceAction::Bid(11));
        assert_eq!(game.legal_actions(&s), vec![LiarsDiceAction::Liar]);
        assert_eq!(game.info_state(&s, 0).key(), "3:4,11");
    }

    #[test]
    fn challenge_resolution() {
        let game = LiarsDice::new(2, 1);

        // "two 2s" holds thanks to the wild 6: the caller loses
        let s = called(&[2, 6], &[7]);
        assert_eq!(game.loser(&s), Some(1));
        assert_eq!(game.returns(&s), vec![1.0, -1.0]);

        // "two 6s" with a single 6 on the table: the bidder loses
        let s = called(&[6, 3], &[0, 11]);
        assert_eq!(game.loser(&s), Some(1));
        assert_eq!(game.returns(&s), vec![1.0, -1.0]);

        // "one 4" fails, caller wins
        let s = called(&[1, 3], &[3]);
        assert_eq!(game.loser(&s), Some(0));
        assert_eq!(game.returns(&s), vec![-1.0, 1.0]);
    }

    #[test]
    fn three_player_returns() {
        let game = LiarsDice::new(3, 1);
        assert_eq!(game.num_bids(), 18);

        // Player 1 bids "two 1s" over "one 3"; one 1 and no wilds, so the
        // bidder loses to player 2's challenge
        let s = called(&[4, 4, 1], &[2, 6]);
        assert_eq!(game.loser(&s), Some(1));
        assert_eq!(game.returns(&s), vec![0.5, -1.0, 0.5]);
    }

    #[test]
    fn multiple_dice_per_player() {
        let game = LiarsDice::new(2, 2);
        let s = LiarsDiceState {
            dice: vec![5, 2, 6, 1],
            bids: vec![],
            called: false,
        };
        assert_eq!(game.info_state(&s, 0).key(), "25:");
        assert_eq!(game.info_state(&s, 1).key(), "16:");
        assert_eq!(game.legal_actions(&s).len(), 24);
    }

    #[test]
    fn tree_size() {
        let tree = GameTree::build(&LiarsDice::new(2, 1));
        assert_eq!(tree.num_info_sets(), 24_576);
    }

    #[test]
    fn test_liars_dice_convergence() {
        let game = LiarsDice::new(2, 1);
        let tree = GameTree::build(&game);
        let mut solver = ExternalSamplingSolver::new(&game, SolverConfig::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(230398247);

        for _ in 0..100 {
            solver.run_iteration_with(&mut rng);
        }

        let nash_conv = tree.nash_conv(&solver.average_policy());
        assert!(nash_conv <= 1.6, "Liar's dice NashConv {} above 1.6", nash_conv);
    }
}
