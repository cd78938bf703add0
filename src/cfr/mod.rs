//! External-sampling MCCFR solver module.
//!
//! This module provides the solver and everything it owns: the information
//! state table, regret matching, the two average-strategy modes, the sampled
//! traversal and the checkpoint format.
//!
//! # Overview
//!
//! Counterfactual regret minimization converges to a Nash equilibrium by:
//! 1. Computing counterfactual regret for each action at each decision point
//! 2. Deriving the next strategy from positive regrets (regret matching)
//! 3. Averaging strategies across iterations to converge to equilibrium
//!
//! External sampling estimates step 1 from one sampled path through chance
//! and the other players' actions while enumerating every action of the
//! player being updated.
//!
//! # Usage
//!
//! 1. Implement the `Game` trait for your game
//! 2. Create an `ExternalSamplingSolver` borrowing the game
//! 3. Call `run_iteration()` or `train()`
//! 4. Extract the equilibrium approximation with `average_policy()`
//!
//! # Example
//!
//! ```
//! use es_mccfr::cfr::{AverageType, ExternalSamplingSolver, SolverConfig};
//! use es_mccfr::games::kuhn::KuhnPoker;
//!
//! let game = KuhnPoker::new(2);
//! let config = SolverConfig::default()
//!     .with_seed(230398247)
//!     .with_average_type(AverageType::Simple);
//! let mut solver = ExternalSamplingSolver::new(&game, config).unwrap();
//!
//! for _ in 0..1_000 {
//!     solver.run_iteration();
//! }
//!
//! let policy = solver.average_policy();
//! let checkpoint = solver.serialize().unwrap();
//! let resumed = ExternalSamplingSolver::deserialize(&game, &checkpoint, None).unwrap();
//! assert_eq!(resumed.average_policy(), policy);
//! ```
//!
//! # References
//!
//! - Zinkevich, M., et al. "Regret Minimization in Games with Incomplete Information" (2007)
//! - Lanctot, M., et al. "Monte Carlo Sampling for Regret Minimization in Extensive Games" (2009)
//! - Lanctot, M. "Monte Carlo Sampling and Regret Minimization for Equilibrium Computation
//!   and Decision-Making in Large Extensive Form Games" (2013)

pub mod average;
pub mod config;
pub mod error;
pub mod game;
pub mod node;
pub mod policy;
pub mod regret;
pub mod serialize;
pub mod solver;
pub mod storage;
mod traversal;

// Re-export main types for convenient access
pub use average::AverageType;
pub use config::{ExploitabilityPoint, SolverConfig, SolverStats};
pub use error::{ParseError, SolverError};
pub use game::{Action, Dynamics, Game, GameState, InfoState};
pub use node::InfoStateNode;
pub use policy::{Policy, TabularPolicy};
pub use regret::regret_matching;
pub use solver::ExternalSamplingSolver;
pub use storage::InfoStateTable;
