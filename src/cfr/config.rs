//! Configuration options for the MCCFR solver.
//!
//! This module provides the solver configuration (seed and averaging mode)
//! and the statistics tracked while training.

use serde::{Deserialize, Serialize};

use crate::cfr::average::AverageType;

/// Configuration for the external-sampling solver.
///
/// # Example
/// ```
/// use es_mccfr::cfr::{AverageType, SolverConfig};
///
/// let config = SolverConfig::default().with_seed(7);
/// assert_eq!(config.average_type, AverageType::Simple);
/// assert_eq!(config.seed, Some(7));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Random seed for the solver's own RNG.
    ///
    /// If set, iterations run without an explicit RNG are reproducible. If
    /// `None`, the RNG is seeded from entropy.
    #[serde(default)]
    pub seed: Option<u64>,

    /// How the average strategy is accumulated.
    #[serde(default)]
    pub average_type: AverageType,
}

impl SolverConfig {
    /// Create a new SolverConfig with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration using full averaging.
    pub fn full() -> Self {
        Self {
            average_type: AverageType::Full,
            ..Default::default()
        }
    }

    /// Builder method: set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder method: set the averaging mode.
    pub fn with_average_type(mut self, average_type: AverageType) -> Self {
        self.average_type = average_type;
        self
    }
}

/// Statistics tracked during training.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolverStats {
    /// Total number of iterations completed.
    pub iterations: u64,

    /// Number of unique information sets discovered.
    pub info_sets: usize,

    /// Time spent in the last training call (in seconds).
    pub elapsed_seconds: f64,

    /// Iterations per second of the last training call.
    pub iterations_per_second: f64,

    /// Latest exploitability measurement, if any.
    pub exploitability: Option<f64>,

    /// History of exploitability measurements.
    pub exploitability_history: Vec<ExploitabilityPoint>,
}

/// A single exploitability measurement at a specific iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExploitabilityPoint {
    /// Iteration number when this measurement was taken.
    pub iteration: u64,
    /// Measured value (NashConv or exploitability, as recorded by the caller).
    pub exploitability: f64,
}

impl SolverStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update iterations per second for `iterations` run in the elapsed time.
    pub fn update_rate(&mut self, iterations: u64) {
        if self.elapsed_seconds > 0.0 {
            self.iterations_per_second = iterations as f64 / self.elapsed_seconds;
        }
    }

    /// Record an exploitability measurement.
    pub fn record_exploitability(&mut self, iteration: u64, exploitability: f64) {
        self.exploitability = Some(exploitability);
        self.exploitability_history.push(ExploitabilityPoint {
            iteration,
            exploitability,
        });
    }
}
