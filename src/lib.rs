//! This crate provides the core logic for a single-tape Turing machine simulator.
//! It includes modules for loading JSON program descriptions, executing them step by step,
//! rendering the configurations a run goes through, and linting programs before execution.

pub mod analyzer;
pub mod display;
pub mod loader;
pub mod machine;
pub mod types;

/// Re-exports the `analyze` function and `Diagnostic` enum from the analyzer module.
pub use analyzer::{analyze, Diagnostic};
/// Re-exports the `ProgramLoader` struct from the loader module.
pub use loader::ProgramLoader;
/// Re-exports the `Machine` struct from the machine module.
pub use machine::Machine;
/// Re-exports the program, execution and error types from the types module.
pub use types::{
    Halted, MachineError, Move, ProgramSpec, Rule, Snapshot, Step, Symbol, Trace,
    PROGRAM_EXTENSION,
};
