//! Error types for the solver.

use thiserror::Error;

/// Errors that can occur when building, saving or loading a solver.
#[derive(Debug, Error)]
pub enum SolverError {
    /// The game has a structure the traversal cannot handle.
    #[error("unsupported game `{game}`: {reason}")]
    UnsupportedGame {
        /// Tag of the rejected game.
        game: String,
        /// What the solver cannot handle.
        reason: String,
    },

    /// A serialized solver could not be decoded.
    #[error("failed to parse serialized solver: {0}")]
    Parse(#[from] ParseError),

    /// The table contains values JSON cannot represent (NaN, infinity).
    #[error("failed to serialize solver: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Reasons a serialized solver is rejected.
///
/// Decoding is all-or-nothing: any of these aborts the load before a table
/// is handed out.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Not valid JSON, truncated, or missing fields.
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),

    /// The header carries a different format tag.
    #[error("unknown format tag `{0}`")]
    UnknownFormat(String),

    /// The header carries a version this build cannot read.
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u32),

    /// The checkpoint was written for another game.
    #[error("checkpoint is for game `{found}`, expected `{expected}`")]
    GameMismatch {
        /// Tag of the live game.
        expected: String,
        /// Tag stored in the checkpoint.
        found: String,
    },

    /// The checkpoint was written for a different number of players.
    #[error("checkpoint has {found} players, game has {expected}")]
    PlayerCountMismatch {
        /// Players in the live game.
        expected: usize,
        /// Players stored in the checkpoint.
        found: usize,
    },

    /// The node list is shorter or longer than the header says.
    #[error("header declares {expected} nodes, found {found}")]
    NodeCountMismatch {
        /// Count from the header.
        expected: usize,
        /// Nodes actually present.
        found: usize,
    },

    /// A node's action count disagrees with its labels, its accumulators, or
    /// the legal actions of the live game.
    #[error("info state `{key}` expects {expected} actions, found {found}")]
    ActionCountMismatch {
        /// Offending information state.
        key: String,
        /// Declared action count, or the live game's count.
        expected: usize,
        /// Length actually stored.
        found: usize,
    },

    /// A node lists different action labels than the live game.
    #[error("info state `{key}` has actions {found:?}, game has {expected:?}")]
    ActionLabelMismatch {
        /// Offending information state.
        key: String,
        /// Labels the live game produces.
        expected: Vec<String>,
        /// Labels stored in the checkpoint.
        found: Vec<String>,
    },

    /// The live game never reaches this information state.
    #[error("info state `{0}` does not exist in the game")]
    UnknownInfoState(String),

    /// The same information state is listed twice.
    #[error("info state `{0}` appears more than once")]
    DuplicateKey(String),
}
