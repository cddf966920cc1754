//! This module provides the `ProgramLoader` struct, responsible for loading Turing machine
//! programs from `.tm.json` files and from string content.

use crate::types::{MachineError, ProgramSpec, PROGRAM_EXTENSION};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// `ProgramLoader` is a utility struct for loading Turing machine programs.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Returns the path of the program file for a base name.
    ///
    /// The extension is always appended, so `"inc"` maps to `inc.tm.json` and
    /// `"inc.tm.json"` maps to `inc.tm.json.tm.json`.
    pub fn program_path(name: &str) -> PathBuf {
        PathBuf::from(format!("{name}{PROGRAM_EXTENSION}"))
    }

    /// Loads the program stored in `<name>.tm.json`, relative to the working directory.
    pub fn load_by_name(name: &str) -> Result<ProgramSpec, MachineError> {
        Self::load_program(&Self::program_path(name))
    }

    /// Loads a single program from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(ProgramSpec)` if the file is successfully read and parsed.
    /// * `Err(MachineError::ConfigRead)` if the file cannot be read.
    /// * `Err(MachineError::ConfigParse)` if the file content is not a valid program.
    pub fn load_program(path: &Path) -> Result<ProgramSpec, MachineError> {
        let content = fs::read_to_string(path).map_err(|e| MachineError::ConfigRead {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        debug!(path = %path.display(), bytes = content.len(), "program file read");

        Self::load_program_from_string(&content)
    }

    /// Parses a program from JSON content.
    pub fn load_program_from_string(content: &str) -> Result<ProgramSpec, MachineError> {
        serde_json::from_str(content).map_err(|e| MachineError::ConfigParse(e.to_string()))
    }
}
