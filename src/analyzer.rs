//! This module provides a lint pass over Turing machine programs. It reports problems that
//! are likely mistakes, such as a head outside the tape, a halt state no rule leads to, or
//! rules that can never fire. Diagnostics are advisory: the engine runs any program it is
//! given, and these conditions surface as run-time errors or non-termination.

use crate::types::{Move, ProgramSpec};
use std::collections::HashMap;
use thiserror::Error;

/// A problem found while analyzing a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    /// The explicit head position is outside the initial tape.
    #[error("head position {head} is outside the tape (length {len})")]
    InvalidHead { head: i64, len: usize },
    /// A rule has a move token other than `L` or `R`.
    #[error("rule {index} has unknown move token {token:?}")]
    UnknownMovement { index: usize, token: String },
    /// The initial state has no rules and is not the halt state.
    #[error("initial state {0:?} has no rules")]
    InitialStateWithoutRules(String),
    /// No rule transitions into the halt state.
    #[error("no rule leads to halt state {0:?}")]
    HaltStateUnreachable(String),
    /// A rule repeats the state and symbol of an earlier one and never fires.
    #[error("rule {index} is shadowed by rule {shadowed_by}")]
    ShadowedRule { index: usize, shadowed_by: usize },
}

/// Analyzes a `ProgramSpec` and returns every diagnostic found, in check order.
///
/// An empty vector means no problems were detected.
pub fn analyze(program: &ProgramSpec) -> Vec<Diagnostic> {
    let checks: [fn(&ProgramSpec) -> Vec<Diagnostic>; 5] = [
        check_head,
        check_movements,
        check_initial_state,
        check_halt_state,
        check_shadowed_rules,
    ];

    checks.iter().flat_map(|check| check(program)).collect()
}

/// Checks that an explicit head position lies on the tape.
fn check_head(program: &ProgramSpec) -> Vec<Diagnostic> {
    let head = program.resolved_head();
    let len = program.tape_len();

    let on_tape = usize::try_from(head).is_ok_and(|i| i < len);
    if on_tape {
        Vec::new()
    } else {
        vec![Diagnostic::InvalidHead { head, len }]
    }
}

fn check_movements(program: &ProgramSpec) -> Vec<Diagnostic> {
    program
        .rules
        .iter()
        .enumerate()
        .filter_map(|(index, rule)| match &rule.movement {
            Move::Unknown(token) => Some(Diagnostic::UnknownMovement {
                index,
                token: token.clone(),
            }),
            _ => None,
        })
        .collect()
}

fn check_initial_state(program: &ProgramSpec) -> Vec<Diagnostic> {
    let has_rules = program
        .rules
        .iter()
        .any(|rule| rule.current_state == program.initial_state);

    if has_rules || program.initial_state == program.halt_state {
        Vec::new()
    } else {
        vec![Diagnostic::InitialStateWithoutRules(
            program.initial_state.clone(),
        )]
    }
}

fn check_halt_state(program: &ProgramSpec) -> Vec<Diagnostic> {
    let reachable = program
        .rules
        .iter()
        .any(|rule| rule.next_state == program.halt_state);

    if reachable {
        Vec::new()
    } else {
        vec![Diagnostic::HaltStateUnreachable(program.halt_state.clone())]
    }
}

/// Rules are matched first to last, so a later rule for the same state and symbol is dead.
fn check_shadowed_rules(program: &ProgramSpec) -> Vec<Diagnostic> {
    let mut first_seen: HashMap<(&str, &str), usize> = HashMap::new();
    let mut diagnostics = Vec::new();

    for (index, rule) in program.rules.iter().enumerate() {
        let key = (rule.current_state.as_str(), rule.tape_symbol.as_str());
        match first_seen.get(&key) {
            Some(&shadowed_by) => diagnostics.push(Diagnostic::ShadowedRule { index, shadowed_by }),
            None => {
                first_seen.insert(key, index);
            }
        }
    }

    diagnostics
}
