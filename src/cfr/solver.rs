//! External-sampling Monte Carlo Counterfactual Regret Minimization solver.
//!
//! One iteration runs one sampled traversal per player, with that player as
//! the updating player, and (in [`AverageType::Full`] mode) one full walk of
//! the tree to update the average strategy. The solver is generic over any
//! game that implements the `Game` trait.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cfr::average::AverageType;
use crate::cfr::config::{SolverConfig, SolverStats};
use crate::cfr::error::SolverError;
use crate::cfr::game::{Dynamics, Game};
use crate::cfr::policy::TabularPolicy;
use crate::cfr::serialize::{self, Header};
use crate::cfr::storage::InfoStateTable;
use crate::cfr::traversal::Traversal;

/// The external-sampling MCCFR solver.
///
/// The solver borrows the game (which must outlive it) and exclusively owns
/// its information-state table and RNG. It is single-threaded: every method
/// that changes the table takes `&mut self`.
///
/// # Example
/// ```
/// use es_mccfr::cfr::{ExternalSamplingSolver, SolverConfig};
/// use es_mccfr::games::kuhn::KuhnPoker;
///
/// let game = KuhnPoker::new(2);
/// let mut solver = ExternalSamplingSolver::new(&game, SolverConfig::default().with_seed(1)).unwrap();
/// solver.train(100);
/// let policy = solver.average_policy();
/// assert_eq!(policy.len(), solver.num_info_sets());
/// ```
pub struct ExternalSamplingSolver<'g, G: Game> {
    /// The game being solved.
    game: &'g G,

    /// Configuration for the solver.
    config: SolverConfig,

    /// Regret and average-strategy accumulators.
    table: InfoStateTable,

    /// Completed iterations.
    iteration: u64,

    /// Statistics tracking.
    stats: SolverStats,

    /// Random number generator used when the caller does not supply one.
    rng: StdRng,
}

impl<'g, G: Game> ExternalSamplingSolver<'g, G> {
    /// Create a new solver for the given game.
    ///
    /// # Errors
    /// [`SolverError::UnsupportedGame`] if the game has simultaneous moves or
    /// no players.
    pub fn new(game: &'g G, config: SolverConfig) -> Result<Self, SolverError> {
        Self::with_table(game, config, InfoStateTable::new(), 0)
    }

    /// Create a solver with pre-allocated table capacity.
    ///
    /// Use this when you have an estimate of how many info sets the game has
    /// to avoid reallocations during training.
    pub fn with_capacity(
        game: &'g G,
        config: SolverConfig,
        capacity: usize,
    ) -> Result<Self, SolverError> {
        Self::with_table(game, config, InfoStateTable::with_capacity(capacity), 0)
    }

    fn with_table(
        game: &'g G,
        config: SolverConfig,
        table: InfoStateTable,
        iteration: u64,
    ) -> Result<Self, SolverError> {
        check_supported(game)?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let stats = SolverStats {
            iterations: iteration,
            info_sets: table.len(),
            ..SolverStats::default()
        };

        Ok(Self {
            game,
            config,
            table,
            iteration,
            stats,
            rng,
        })
    }

    /// Run a single iteration with the solver's own RNG.
    pub fn run_iteration(&mut self) {
        let Self {
            game,
            config,
            table,
            rng,
            ..
        } = self;
        Self::iterate(*game, table, config.average_type, rng);
        self.finish_iteration();
    }

    /// Run a single iteration drawing all samples from `rng`.
    ///
    /// The solver's own RNG is left untouched, so a caller-controlled
    /// generator makes the run reproducible.
    pub fn run_iteration_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        Self::iterate(self.game, &mut self.table, self.config.average_type, rng);
        self.finish_iteration();
    }

    fn iterate<R: Rng + ?Sized>(
        game: &G,
        table: &mut InfoStateTable,
        average_type: AverageType,
        rng: &mut R,
    ) {
        let num_players = game.num_players();
        let root = game.initial_state();
        let mut traversal = Traversal::new(game, table, average_type);

        for player in 0..num_players {
            traversal.update_regrets(&root, player, rng);
        }

        if average_type.needs_full_walk() {
            traversal.full_update_average(&root, &vec![1.0; num_players]);
        }
    }

    fn finish_iteration(&mut self) {
        self.iteration += 1;
        log::debug!(
            "iteration {} done, {} info states",
            self.iteration,
            self.table.len()
        );
    }

    /// Train the solver for a specified number of iterations.
    ///
    /// # Returns
    /// Statistics from the training run.
    pub fn train(&mut self, iterations: u64) -> &SolverStats {
        self.train_with_callback(iterations, 0, |_| {})
    }

    /// Train with a callback for progress tracking.
    ///
    /// # Arguments
    /// * `iterations` - Number of iterations to run
    /// * `callback_interval` - How often to call the callback (0 = never)
    /// * `callback` - Function called every `callback_interval` iterations
    pub fn train_with_callback<F>(
        &mut self,
        iterations: u64,
        callback_interval: u64,
        mut callback: F,
    ) -> &SolverStats
    where
        F: FnMut(&SolverStats),
    {
        log::info!(
            "training {} for {} iterations ({} averaging)",
            self.game.name(),
            iterations,
            self.config.average_type
        );
        let start_time = Instant::now();

        for i in 0..iterations {
            self.run_iteration();

            if callback_interval > 0 && (i + 1) % callback_interval == 0 {
                self.update_stats(start_time, i + 1);
                callback(&self.stats);
            }
        }

        self.update_stats(start_time, iterations);
        log::info!(
            "trained {} iterations, {} info states (~{} KiB), {:.0} it/s",
            self.iteration,
            self.stats.info_sets,
            self.table.memory_usage() / 1024,
            self.stats.iterations_per_second
        );

        &self.stats
    }

    fn update_stats(&mut self, start_time: Instant, iterations_run: u64) {
        self.stats.iterations = self.iteration;
        self.stats.info_sets = self.table.len();
        self.stats.elapsed_seconds = start_time.elapsed().as_secs_f64();
        self.stats.update_rate(iterations_run);
    }

    /// Snapshot of the average strategy at every visited information state.
    ///
    /// Does not change the solver; the snapshot does not alias the table.
    pub fn average_policy(&self) -> TabularPolicy {
        self.table
            .iter()
            .map(|(key, node)| (key.clone(), node.average_policy()))
            .collect()
    }

    /// Current (regret-matching) strategy for an information set.
    ///
    /// Unvisited information sets return `None`.
    pub fn current_strategy(&self, info_key: &str) -> Option<Vec<f64>> {
        self.table.get(info_key).map(|node| node.current_strategy())
    }

    /// Read view of the information-state table.
    pub fn info_state_table(&self) -> &InfoStateTable {
        &self.table
    }

    /// Get the current iteration count.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Get the number of information sets discovered.
    pub fn num_info_sets(&self) -> usize {
        self.table.len()
    }

    /// Get current statistics.
    pub fn stats(&self) -> &SolverStats {
        &self.stats
    }

    /// Record an exploitability measurement for the current iteration.
    pub fn record_exploitability(&mut self, exploitability: f64) {
        self.stats
            .record_exploitability(self.iteration, exploitability);
    }

    /// Get reference to the game.
    pub fn game(&self) -> &'g G {
        self.game
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Encode the table and solver metadata as a JSON document.
    ///
    /// The RNG state is not part of the checkpoint.
    pub fn serialize(&self) -> Result<String, SolverError> {
        let header = Header::new(
            self.game,
            self.iteration,
            self.config.average_type,
            self.table.len(),
        );
        let text = serialize::encode(&header, &self.table)?;
        log::info!(
            "serialized {} info states at iteration {}",
            self.table.len(),
            self.iteration
        );
        Ok(text)
    }

    /// Rebuild a solver from [`serialize`](Self::serialize) output.
    ///
    /// The iteration count and averaging mode come from the checkpoint. The
    /// RNG is fresh: seeded with `seed`, or from entropy.
    ///
    /// # Errors
    /// [`SolverError::Parse`] if the document is malformed or was written for
    /// another game; [`SolverError::UnsupportedGame`] as for [`new`](Self::new).
    pub fn deserialize(game: &'g G, text: &str, seed: Option<u64>) -> Result<Self, SolverError> {
        let (header, table) = serialize::decode(game, text)?;
        log::info!(
            "loaded {} info states for {} at iteration {}",
            table.len(),
            header.game,
            header.iteration
        );

        let config = SolverConfig {
            seed,
            average_type: header.average_type,
        };
        Self::with_table(game, config, table, header.iteration)
    }
}

/// Reject games the traversal cannot walk.
fn check_supported<G: Game>(game: &G) -> Result<(), SolverError> {
    let reason = if game.dynamics() == Dynamics::Simultaneous {
        "simultaneous-move nodes are not supported"
    } else if game.num_players() == 0 {
        "the game has no players"
    } else {
        return Ok(());
    };

    Err(SolverError::UnsupportedGame {
        game: game.name(),
        reason: reason.to_string(),
    })
}
