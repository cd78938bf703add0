//! Game implementations for the solver.
//!
//! This module contains implementations of small games that can be solved
//! with the generic external-sampling solver. These serve as:
//!
//! 1. **Validation**: Games with known Nash equilibria (like Kuhn Poker) verify
//!    that the solver is correct.
//!
//! 2. **Examples**: Demonstrate how to implement the `Game` trait for new games.
//!
//! 3. **Benchmarks**: Provide standardized games for performance testing.
//!
//! ## Available Games
//!
//! - [`kuhn`]: N-player Kuhn Poker, a one-card poker game with a known equilibrium
//! - [`leduc`]: Leduc Hold'em, two betting rounds and a public card
//! - [`liars_dice`]: Liar's Dice with any number of players and dice
//!
//! ## Adding New Games
//!
//! To add a new game:
//!
//! 1. Create a new module under `src/games/`
//! 2. Define state, action, and info state types
//! 3. Implement the `Game` trait, with a `name()` that encodes the parameters
//! 4. Add tests that verify expected behavior
//!
//! See the [`kuhn`] module for a complete example.

pub mod kuhn;
pub mod leduc;
pub mod liars_dice;
