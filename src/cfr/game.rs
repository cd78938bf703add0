//! Game trait definition for the MCCFR solver.
//!
//! Any sequential extensive-form game that implements the `Game` trait can be
//! solved with [`ExternalSamplingSolver`](crate::cfr::ExternalSamplingSolver)
//! and evaluated with [`GameTree`](crate::eval::GameTree). The solver only
//! consumes this interface; it never builds game trees of its own.

use std::fmt::Debug;
use std::hash::Hash;

/// Trait for actions that can be taken in a game, including chance outcomes.
///
/// Actions must be cloneable, comparable, and hashable for storage in maps.
pub trait Action: Clone + Eq + Hash + Debug + Send + Sync {
    /// Short, stable label for this action.
    ///
    /// Labels are stored alongside each information state and written into
    /// serialized checkpoints, so they must not change between runs.
    fn label(&self) -> String;
}

/// Trait for information states (what a player knows at a decision point).
///
/// Two game states that look identical to a player (same private cards, same
/// public action history) must produce the same information state, and the
/// same information state must always offer the same legal actions.
pub trait InfoState: Clone + Eq + Hash + Debug + Send + Sync {
    /// Generate a unique string key for this information state.
    /// This key is used for storing regrets and strategies.
    fn key(&self) -> String;
}

/// Trait for game states.
///
/// A game state contains all information about the current state of the game,
/// including private information that players may not see.
pub trait GameState: Clone + Debug + Send + Sync {}

/// How players move at a decision node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dynamics {
    /// Exactly one player (or chance) acts at every node.
    #[default]
    Sequential,
    /// Several players choose an action at the same node.
    Simultaneous,
}

/// The main Game trait that defines the interface for any game.
///
/// # Type Parameters
/// - `State`: The game state type
/// - `Action`: The action type (player actions and chance outcomes)
/// - `InfoState`: The information state type
///
/// # Example
/// ```ignore
/// struct MyGame;
///
/// impl Game for MyGame {
///     type State = MyGameState;
///     type Action = MyAction;
///     type InfoState = MyInfoState;
///
///     // ... implement required methods
/// }
/// ```
pub trait Game: Send + Sync {
    /// The type representing a complete game state.
    type State: GameState;

    /// The type representing an action a player (or chance) can take.
    type Action: Action;

    /// The type representing what a player knows at a decision point.
    type InfoState: InfoState;

    /// Identifying tag for this game, including its parameters.
    ///
    /// Written into serialized checkpoints and checked when they are loaded,
    /// e.g. `kuhn_poker(players=3)`.
    fn name(&self) -> String;

    /// Get the total number of players in the game.
    fn num_players(&self) -> usize;

    /// Move dynamics of the game. Sequential unless overridden.
    fn dynamics(&self) -> Dynamics {
        Dynamics::Sequential
    }

    /// Create the initial game state (usually a chance node dealing cards).
    fn initial_state(&self) -> Self::State;

    /// Check if the given state is terminal (game over).
    fn is_terminal(&self, state: &Self::State) -> bool;

    /// Per-player returns at a terminal state.
    ///
    /// # Panics
    /// May panic if called on a non-terminal state.
    fn returns(&self, state: &Self::State) -> Vec<f64>;

    /// Return for a single player at a terminal state.
    fn player_return(&self, state: &Self::State, player: usize) -> f64 {
        self.returns(state)[player]
    }

    /// Check if the current state is a chance node.
    fn is_chance(&self, state: &Self::State) -> bool;

    /// Outcome distribution at a chance node.
    ///
    /// Probabilities must be positive and sum to 1. Returns an empty vector
    /// for non-chance states.
    fn chance_outcomes(&self, state: &Self::State) -> Vec<(Self::Action, f64)>;

    /// Get the index of the player who should act at the current state.
    ///
    /// # Returns
    /// - `Some(player_index)` if a player should act
    /// - `None` if the state is terminal or a chance node
    fn current_player(&self, state: &Self::State) -> Option<usize>;

    /// Legal actions for the acting player, in a fixed order.
    ///
    /// Returns an empty vector at terminal and chance states.
    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Apply an action (or chance outcome) and return the resulting state.
    ///
    /// This does not modify the input state.
    fn apply_action(&self, state: &Self::State, action: &Self::Action) -> Self::State;

    /// Information state of `player` at `state`.
    ///
    /// The solver only asks for the acting player's information state.
    fn info_state(&self, state: &Self::State, player: usize) -> Self::InfoState;
}

/// Macro to simplify implementing the GameState trait.
#[macro_export]
macro_rules! impl_game_state {
    ($type:ty) => {
        impl $crate::cfr::game::GameState for $type {}
    };
}
