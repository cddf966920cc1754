//! This module defines the `Machine` struct, which simulates a single-tape, single-head
//! deterministic Turing machine. It owns the tape, the head position and the current state,
//! selects transitions from the ordered rule list, and drives runs to the halt state.

use tracing::{debug, trace};

use crate::types::{
    Halted, MachineError, Move, ProgramSpec, Rule, Snapshot, Step, Symbol, Trace,
};

/// Represents a single-tape Turing machine.
///
/// The tape has a fixed length. Moving the head off either end is allowed, but the
/// next step that tries to read the tape fails with `MachineError::TapeBoundsExceeded`.
#[derive(Debug, Clone)]
pub struct Machine {
    state: String,
    tape: Vec<Symbol>,
    head: i64,
    spec: ProgramSpec,
    step_count: u64,
}

impl Machine {
    /// Creates a new `Machine` from a `ProgramSpec`.
    ///
    /// The tape is a copy of the program's tape and the head starts at the program's
    /// head position, or at the center of the tape when none is given. Nothing else
    /// is checked here: bad head positions, unknown states and empty rule lists all
    /// surface once the machine runs.
    pub fn new(spec: ProgramSpec) -> Self {
        let machine = Self {
            state: spec.initial_state.clone(),
            tape: spec.tape_symbols(),
            head: spec.resolved_head(),
            spec,
            step_count: 0,
        };

        debug!(
            state = %machine.state,
            head = machine.head,
            tape_len = machine.tape.len(),
            rules = machine.spec.rules.len(),
            "machine created"
        );

        machine
    }

    /// Executes a single step.
    ///
    /// The first rule matching the current state and the symbol under the head is
    /// applied: the state changes, the symbol is written, and then the head moves.
    /// An unknown move token fails the step after the state change and the write have
    /// already been applied; the step counter is left untouched in that case.
    ///
    /// # Returns
    ///
    /// * `Ok(Step::Halt)` if the machine is in the halt state after the step.
    /// * `Ok(Step::Continue)` otherwise.
    /// * `Err(MachineError)` if the head is off the tape, no rule matches, or the
    ///   rule's move token is unknown.
    pub fn step(&mut self) -> Result<Step, MachineError> {
        let index = self.index()?;

        let rule = self
            .spec
            .rules
            .iter()
            .find(|rule| rule.matches(&self.state, &self.tape[index]))
            .ok_or_else(|| MachineError::NoMatchingRule {
                state: self.state.clone(),
                symbol: self.tape[index].clone(),
            })?;

        trace!(
            step = self.step_count + 1,
            state = %self.state,
            symbol = %self.tape[index],
            next_state = %rule.next_state,
            write = %rule.write_symbol,
            movement = %rule.movement,
            "applying rule"
        );

        self.state = rule.next_state.clone();
        self.tape[index] = rule.write_symbol.clone();

        match &rule.movement {
            Move::Left => self.head -= 1,
            Move::Right => self.head += 1,
            Move::Unknown(token) => return Err(MachineError::UnknownMovement(token.clone())),
        }

        self.step_count += 1;

        Ok(if self.is_halted() {
            Step::Halt
        } else {
            Step::Continue
        })
    }

    /// Runs the machine until it reaches the halt state.
    ///
    /// `on_snapshot` receives the configuration before every step, starting with the
    /// initial one. There is no step ceiling: a program that never halts keeps this
    /// call running forever. Use [`Machine::run_with_limit`] for untrusted programs.
    pub fn run<F>(&mut self, on_snapshot: F) -> Result<Halted, MachineError>
    where
        F: FnMut(&Snapshot),
    {
        self.run_with_limit(None, on_snapshot)
    }

    /// Runs the machine until it halts, fails, or executes `limit` steps.
    ///
    /// The returned step count is the machine's total, so it includes any steps
    /// executed before this call. The limit only counts steps taken by this call.
    pub fn run_with_limit<F>(
        &mut self,
        limit: Option<u64>,
        mut on_snapshot: F,
    ) -> Result<Halted, MachineError>
    where
        F: FnMut(&Snapshot),
    {
        self.try_run(limit, |snapshot| {
            on_snapshot(snapshot);
            Ok::<(), MachineError>(())
        })
    }

    /// Like [`Machine::run_with_limit`], but `on_snapshot` may fail.
    ///
    /// The first error returned by `on_snapshot` stops the run before the pending
    /// step is applied and is handed back to the caller unchanged.
    pub fn try_run<F, E>(&mut self, limit: Option<u64>, mut on_snapshot: F) -> Result<Halted, E>
    where
        F: FnMut(&Snapshot) -> Result<(), E>,
        E: From<MachineError>,
    {
        let mut executed: u64 = 0;

        loop {
            if let Some(limit) = limit.filter(|&limit| executed >= limit) {
                debug!(limit, state = %self.state, "step limit reached");
                return Err(MachineError::StepLimitExceeded(limit).into());
            }

            on_snapshot(&self.snapshot())?;

            let step = self.step()?;
            executed += 1;

            if step == Step::Halt {
                break;
            }
        }

        debug!(steps = self.step_count, head = self.head, "machine halted");

        Ok(Halted {
            steps: self.step_count,
            snapshot: self.snapshot(),
        })
    }

    /// Runs the machine to completion and collects every snapshot it emitted.
    pub fn trace(&mut self) -> Result<Trace, MachineError> {
        let mut snapshots = Vec::new();
        let halted = self.run(|snapshot| snapshots.push(snapshot.clone()))?;

        Ok(Trace { snapshots, halted })
    }

    /// Resets the machine to the configuration it was created with.
    pub fn reset(&mut self) {
        self.state = self.spec.initial_state.clone();
        self.tape = self.spec.tape_symbols();
        self.head = self.spec.resolved_head();
        self.step_count = 0;
    }

    /// Returns the current state.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Returns the state that stops the run.
    pub fn halt_state(&self) -> &str {
        &self.spec.halt_state
    }

    /// Returns the tape contents.
    pub fn tape(&self) -> &[Symbol] {
        &self.tape
    }

    /// Returns the head position. It may lie outside the tape after a move off either end.
    pub fn head(&self) -> i64 {
        self.head
    }

    /// Returns the number of steps executed since creation or the last reset.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Returns the rules in the order they are matched.
    pub fn rules(&self) -> &[Rule] {
        &self.spec.rules
    }

    /// Returns the program this machine was built from.
    pub fn program(&self) -> &ProgramSpec {
        &self.spec
    }

    /// Checks whether the current state is the halt state.
    pub fn is_halted(&self) -> bool {
        self.state == self.spec.halt_state
    }

    /// Returns the symbol under the head, or `None` if the head is off the tape.
    pub fn symbol(&self) -> Option<&str> {
        self.index().ok().map(|i| self.tape[i].as_str())
    }

    /// Finds the rule the next step would apply.
    ///
    /// Rules are scanned in order and the first one whose state and symbol match wins.
    pub fn matching_rule(&self) -> Option<&Rule> {
        let symbol = self.symbol()?;
        self.spec
            .rules
            .iter()
            .find(|rule| rule.matches(&self.state, symbol))
    }

    /// Takes an owned copy of the current configuration.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tape: self.tape.clone(),
            head: self.head,
            state: self.state.clone(),
        }
    }

    fn index(&self) -> Result<usize, MachineError> {
        usize::try_from(self.head)
            .ok()
            .filter(|&i| i < self.tape.len())
            .ok_or(MachineError::TapeBoundsExceeded {
                head: self.head,
                len: self.tape.len(),
            })
    }
}
