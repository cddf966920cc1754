//! This module defines the core data structures and types used throughout the simulator,
//! including the program description, transition rules, configuration snapshots, and errors.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// File extension every program description carries.
pub const PROGRAM_EXTENSION: &str = ".tm.json";
/// Head position that asks for the head to start at the center of the tape.
pub const CENTER_HEAD: i64 = -1;

/// A single tape cell.
///
/// Tapes are split into one symbol per character, but rules may name any token.
/// A rule whose symbol is not a single character simply never matches.
pub type Symbol = String;

/// A Turing machine program as read from a `.tm.json` description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProgramSpec {
    /// Initial tape contents, one character per cell.
    pub tape: String,
    /// The state the machine starts in.
    pub initial_state: String,
    /// Ordered transition table. The first matching rule wins.
    pub rules: Vec<Rule>,
    /// Initial head index. `None` or `-1` place the head at the center of the tape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_position: Option<i64>,
    /// Reaching this state stops the run.
    pub halt_state: String,
}

impl ProgramSpec {
    /// Splits the initial tape string into symbols.
    pub fn tape_symbols(&self) -> Vec<Symbol> {
        self.tape.chars().map(String::from).collect()
    }

    /// Number of cells on the tape.
    pub fn tape_len(&self) -> usize {
        self.tape.chars().count()
    }

    /// Returns the head index the machine starts at, resolving the centering sentinel.
    pub fn resolved_head(&self) -> i64 {
        match self.head_position {
            None | Some(CENTER_HEAD) => (self.tape_len() / 2) as i64,
            Some(head) => head,
        }
    }
}

/// A transition `(current_state, tape_symbol) -> (next_state, write_symbol, move)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub current_state: String,
    pub tape_symbol: Symbol,
    pub next_state: String,
    pub write_symbol: Symbol,
    #[serde(rename = "move")]
    pub movement: Move,
}

impl Rule {
    /// Returns true if this rule applies to `state` reading `symbol`.
    pub fn matches(&self, state: &str, symbol: &str) -> bool {
        self.current_state == state && self.tape_symbol == symbol
    }
}

/// Head movement after a transition.
///
/// Move tokens are kept verbatim when they are not recognized so that a program
/// with a bad token still loads. The error only surfaces when the rule fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Move {
    /// Move the head one cell to the left (`"L"`).
    Left,
    /// Move the head one cell to the right (`"R"`).
    Right,
    /// Any other token.
    Unknown(String),
}

impl From<String> for Move {
    fn from(token: String) -> Self {
        match token.as_str() {
            "L" => Move::Left,
            "R" => Move::Right,
            _ => Move::Unknown(token),
        }
    }
}

impl From<Move> for String {
    fn from(movement: Move) -> Self {
        match movement {
            Move::Left => "L".to_string(),
            Move::Right => "R".to_string(),
            Move::Unknown(token) => token,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Left => f.write_str("L"),
            Move::Right => f.write_str("R"),
            Move::Unknown(token) => f.write_str(token),
        }
    }
}

/// An owned copy of the machine configuration at one point of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tape: Vec<Symbol>,
    pub head: i64,
    pub state: String,
}

impl Snapshot {
    /// The tape contents concatenated back into a string.
    pub fn tape_string(&self) -> String {
        self.tape.concat()
    }

    /// The symbol under the head, or `None` if the head is off the tape.
    pub fn symbol(&self) -> Option<&str> {
        usize::try_from(self.head)
            .ok()
            .and_then(|i| self.tape.get(i))
            .map(String::as_str)
    }
}

/// Represents the outcome of a single successful step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The machine moved and is not in the halt state.
    Continue,
    /// The machine entered the halt state.
    Halt,
}

/// The result of a run that reached the halt state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Halted {
    /// Total number of steps executed.
    pub steps: u64,
    /// The final configuration.
    pub snapshot: Snapshot,
}

/// Every configuration a run went through, in order, plus how it ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    /// One snapshot per step, each taken before the step was applied.
    pub snapshots: Vec<Snapshot>,
    pub halted: Halted,
}

/// Represents the errors that can occur while loading or running a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MachineError {
    /// The program file could not be read.
    #[error("Failed to read file {path}: {message}")]
    ConfigRead { path: String, message: String },
    /// The program description is not valid.
    #[error("{0}")]
    ConfigParse(String),
    /// A rule carries a move token other than `L` or `R`.
    #[error("unknown movement: {0:?}")]
    UnknownMovement(String),
    /// The head left the tape and the next step tried to read it.
    #[error("tape bounds exceeded: head at {head} on a tape of length {len}")]
    TapeBoundsExceeded { head: i64, len: usize },
    /// No rule is defined for the current state and symbol.
    #[error("no rule defined for state {state:?} and symbol {symbol:?}")]
    NoMatchingRule { state: String, symbol: Symbol },
    /// The run was stopped after the given number of steps without halting.
    #[error("step limit of {0} reached before halting")]
    StepLimitExceeded(u64),
}
