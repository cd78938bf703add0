//! Checkpoint format for the solver.
//!
//! A checkpoint is a JSON document: a header with the solver metadata,
//! followed by every information state sorted by key. Floats are written with
//! shortest round-trip formatting and parsed with `float_roundtrip`, so a
//! decoded table is bit-for-bit equal to the encoded one.
//!
//! ```text
//! {
//!   "header": {"format": "es-mccfr", "version": 1, "iteration": 200,
//!              "average_type": "simple", "num_players": 2,
//!              "game": "kuhn_poker(players=2)", "num_nodes": 12},
//!   "nodes": [{"key": "0:", "num_actions": 2, "actions": ["p", "b"],
//!              "regrets": [..], "average_strategy": [..]}, ..]
//! }
//! ```

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cfr::average::AverageType;
use crate::cfr::error::{ParseError, SolverError};
use crate::cfr::game::{Action, Game, InfoState};
use crate::cfr::node::InfoStateNode;
use crate::cfr::storage::InfoStateTable;

/// Format tag written into every checkpoint.
pub const FORMAT: &str = "es-mccfr";

/// Current format version.
pub const VERSION: u32 = 1;

/// Solver metadata stored ahead of the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// Format tag, always [`FORMAT`].
    pub format: String,
    /// Format version.
    pub version: u32,
    /// Completed iterations.
    pub iteration: u64,
    /// Averaging mode of the run.
    pub average_type: AverageType,
    /// Players in the game.
    pub num_players: usize,
    /// Game tag, see [`Game::name`].
    pub game: String,
    /// Number of entries in the node list.
    pub num_nodes: usize,
}

impl Header {
    /// Header for a solver over `game`.
    pub fn new<G: Game>(game: &G, iteration: u64, average_type: AverageType, num_nodes: usize) -> Self {
        Self {
            format: FORMAT.to_string(),
            version: VERSION,
            iteration,
            average_type,
            num_players: game.num_players(),
            game: game.name(),
            num_nodes,
        }
    }
}

#[derive(Serialize)]
struct CheckpointRef<'a> {
    header: &'a Header,
    nodes: Vec<NodeRef<'a>>,
}

#[derive(Serialize)]
struct NodeRef<'a> {
    key: &'a str,
    num_actions: usize,
    actions: &'a [String],
    regrets: &'a [f64],
    average_strategy: &'a [f64],
}

#[derive(Deserialize)]
struct Checkpoint {
    header: Header,
    nodes: Vec<NodeRecord>,
}

#[derive(Deserialize)]
struct NodeRecord {
    key: String,
    num_actions: usize,
    actions: Vec<String>,
    regrets: Vec<f64>,
    average_strategy: Vec<f64>,
}

/// Encode `table` under `header`.
pub fn encode(header: &Header, table: &InfoStateTable) -> Result<String, SolverError> {
    let nodes = table
        .sorted()
        .into_iter()
        .map(|(key, node)| NodeRef {
            key,
            num_actions: node.num_actions(),
            actions: node.actions(),
            regrets: node.regrets(),
            average_strategy: node.average_strategy(),
        })
        .collect();

    serde_json::to_string(&CheckpointRef { header, nodes }).map_err(SolverError::Serialize)
}

/// Decode a checkpoint written for `game`.
///
/// Every node must belong to an information state of `game` and carry exactly
/// its legal actions. Either every node is valid and the whole table is
/// returned, or nothing is.
pub fn decode<G: Game>(game: &G, text: &str) -> Result<(Header, InfoStateTable), ParseError> {
    let checkpoint: Checkpoint = serde_json::from_str(text)?;
    let header = checkpoint.header;

    if header.format != FORMAT {
        return Err(ParseError::UnknownFormat(header.format));
    }
    if header.version != VERSION {
        return Err(ParseError::UnsupportedVersion(header.version));
    }
    if header.game != game.name() {
        return Err(ParseError::GameMismatch {
            expected: game.name(),
            found: header.game,
        });
    }
    if header.num_players != game.num_players() {
        return Err(ParseError::PlayerCountMismatch {
            expected: game.num_players(),
            found: header.num_players,
        });
    }
    if header.num_nodes != checkpoint.nodes.len() {
        return Err(ParseError::NodeCountMismatch {
            expected: header.num_nodes,
            found: checkpoint.nodes.len(),
        });
    }

    let live = live_actions(game);
    let mut table = InfoStateTable::with_capacity(checkpoint.nodes.len());
    for NodeRecord {
        key,
        num_actions,
        actions,
        regrets,
        average_strategy,
    } in checkpoint.nodes
    {
        let node = decode_node(&key, num_actions, actions, regrets, average_strategy)?;
        check_against_game(&live, &key, &node)?;
        if table.contains(&key) {
            return Err(ParseError::DuplicateKey(key));
        }
        table.insert(key, node);
    }

    Ok((header, table))
}

fn decode_node(
    key: &str,
    num_actions: usize,
    actions: Vec<String>,
    regrets: Vec<f64>,
    average_strategy: Vec<f64>,
) -> Result<InfoStateNode, ParseError> {
    let mismatch = |found: usize| ParseError::ActionCountMismatch {
        key: key.to_string(),
        expected: num_actions,
        found,
    };

    for len in [actions.len(), regrets.len(), average_strategy.len()] {
        if len != num_actions {
            return Err(mismatch(len));
        }
    }

    InfoStateNode::from_parts(actions, regrets, average_strategy).ok_or_else(|| mismatch(0))
}

/// Legal-action labels of every information state `game` can reach.
fn live_actions<G: Game>(game: &G) -> FxHashMap<String, Vec<String>> {
    let mut info_states: FxHashMap<String, Vec<String>> = FxHashMap::default();
    let mut stack = vec![game.initial_state()];

    while let Some(state) = stack.pop() {
        if game.is_terminal(&state) {
            continue;
        }

        if game.is_chance(&state) {
            for (outcome, _) in game.chance_outcomes(&state) {
                stack.push(game.apply_action(&state, &outcome));
            }
            continue;
        }

        let player = match game.current_player(&state) {
            Some(p) => p,
            None => continue,
        };

        let actions = game.legal_actions(&state);
        info_states
            .entry(game.info_state(&state, player).key())
            .or_insert_with(|| actions.iter().map(Action::label).collect());
        for action in &actions {
            stack.push(game.apply_action(&state, action));
        }
    }

    info_states
}

fn check_against_game(
    live: &FxHashMap<String, Vec<String>>,
    key: &str,
    node: &InfoStateNode,
) -> Result<(), ParseError> {
    let expected = live
        .get(key)
        .ok_or_else(|| ParseError::UnknownInfoState(key.to_string()))?;

    if expected.len() != node.num_actions() {
        return Err(ParseError::ActionCountMismatch {
            key: key.to_string(),
            expected: expected.len(),
            found: node.num_actions(),
        });
    }
    if expected.as_slice() != node.actions() {
        return Err(ParseError::ActionLabelMismatch {
            key: key.to_string(),
            expected: expected.clone(),
            found: node.actions().to_vec(),
        });
    }
    Ok(())
}
