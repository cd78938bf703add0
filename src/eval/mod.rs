//! Exact evaluation of policies: best response, NashConv and exploitability.
//!
//! [`GameTree`] materializes the game once; evaluating many policies against
//! the same tree (as the `nash_conv` driver does every few iterations) only
//! pays for the walks, not for rebuilding states.
//!
//! ```
//! use es_mccfr::cfr::TabularPolicy;
//! use es_mccfr::eval::GameTree;
//! use es_mccfr::games::kuhn::KuhnPoker;
//!
//! let tree = GameTree::build(&KuhnPoker::new(2));
//! let nash_conv = tree.nash_conv(&TabularPolicy::new());
//! assert!((nash_conv - 11.0 / 12.0).abs() < 1e-12);
//! ```

mod tree;

pub use tree::{GameTree, TreeStats};

use crate::cfr::game::Game;
use crate::cfr::policy::Policy;

/// NashConv of `policy` in `game`, building the tree on the fly.
pub fn nash_conv<G: Game, P: Policy>(game: &G, policy: &P) -> f64 {
    GameTree::build(game).nash_conv(policy)
}

/// Exploitability (NashConv / players) of `policy` in `game`.
pub fn exploitability<G: Game, P: Policy>(game: &G, policy: &P) -> f64 {
    GameTree::build(game).exploitability(policy)
}
