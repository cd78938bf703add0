//! # es-mccfr
//!
//! External-sampling Monte Carlo Counterfactual Regret Minimization (MCCFR)
//! for sequential extensive-form games with imperfect information.
//!
//! ## Features
//!
//! - **Generic solver**: Works with any game implementing the `Game` trait
//! - **External sampling**: Enumerates the updating player's actions, samples
//!   chance and everyone else
//! - **Two averaging modes**: Cheap stochastic averaging or exact full-tree averaging
//! - **Checkpointing**: Serialize and resume without losing progress
//! - **Exploitability**: Exact best responses and NashConv for evaluation
//!
//! ## Quick Start
//!
//! ```ignore
//! use es_mccfr::cfr::{ExternalSamplingSolver, SolverConfig};
//! use es_mccfr::eval::GameTree;
//!
//! // 1. Implement the Game trait for your game
//! // 2. Create a solver borrowing it
//! let mut solver = ExternalSamplingSolver::new(&my_game, SolverConfig::default())?;
//!
//! // 3. Train
//! solver.train(10_000);
//!
//! // 4. Measure the average policy
//! let nash_conv = GameTree::build(&my_game).nash_conv(&solver.average_policy());
//! ```
//!
//! ## Modules
//!
//! - [`cfr`]: The solver, its table and checkpoint format
//! - [`eval`]: Best response, NashConv and exploitability
//! - [`games`]: Reference games (Kuhn, Leduc, Liar's dice)
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 ExternalSamplingSolver (Generic)                │
//! │  - Sampled traversal      - Regret matching                     │
//! │  - Average accumulation   - Serialize / deserialize             │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               │ consumes Game trait
//!                               ▼
//!         ┌─────────────────────┼─────────────────────┐
//!         │                     │                     │
//!         ▼                     ▼                     ▼
//!    ┌─────────┐         ┌───────────┐         ┌───────────┐
//!    │  Kuhn   │         │   Leduc   │         │   Liar's  │
//!    │  Poker  │         │   Poker   │         │    Dice   │
//!    └─────────┘         └───────────┘         └───────────┘
//! ```

#![warn(missing_docs)]

/// External-sampling MCCFR solver module.
///
/// This is the core module containing the solver and its storage.
pub mod cfr;

/// Policy evaluation: best response, NashConv and exploitability.
///
/// Used to measure solver output; the solver never calls it.
pub mod eval;

/// Game implementations module.
///
/// Contains reference games for testing and validation.
pub mod games;

// Re-export commonly used types at crate root for convenience
pub use cfr::{
    Action, AverageType, ExternalSamplingSolver, Game, GameState, InfoState, Policy, SolverConfig,
    SolverError, TabularPolicy,
};
