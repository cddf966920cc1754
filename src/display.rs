//! Human-readable rendering of snapshots and halt summaries.
//!
//! A snapshot renders as two lines: the tape cells separated by single spaces, and a
//! marker line with `^` under the head followed by the current state. A head off the
//! tape is drawn as `<` before the tape or `>` after it, annotated with its index.
//!
//! ```text
//! 1 0 1
//!   ^ A
//! ```

use std::fmt;

use crate::types::{Halted, Snapshot};

const CELL_SEPARATOR: &str = " ";

/// Where the head marker goes relative to the rendered tape.
enum Marker {
    Left,
    At(usize),
    Right(usize),
}

impl Snapshot {
    /// Padding is sized from the tape, never from the head value itself.
    fn marker(&self) -> Marker {
        let width = |cell: &String| cell.chars().count() + CELL_SEPARATOR.len();

        match usize::try_from(self.head) {
            Err(_) => Marker::Left,
            Ok(head) if head < self.tape.len() => {
                Marker::At(self.tape[..head].iter().map(width).sum::<usize>())
            }
            Ok(_) => Marker::Right(self.tape.iter().map(width).sum::<usize>()),
        }
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.tape.join(CELL_SEPARATOR))?;

        match self.marker() {
            Marker::Left => write!(f, "< {} (head {})", self.state, self.head),
            Marker::At(column) => write!(f, "{}^ {}", " ".repeat(column), self.state),
            Marker::Right(column) => {
                write!(f, "{}> {} (head {})", " ".repeat(column), self.state, self.head)
            }
        }
    }
}

impl fmt::Display for Halted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "The turing machine has halted")?;
        writeln!(f, "Final tape config is:")?;
        writeln!(f, "{}", self.snapshot)?;
        write!(f, "steps={}", self.steps)
    }
}
