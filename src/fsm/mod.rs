//! Table-driven finite state machines.
//!
//! [`Machine`] interprets whatever transition and output tables it is
//! handed; fixed instantiations are plain table-construction functions,
//! see [`mod3::mod3_machine`].

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::diag::{DiagLevel, DiagSink, NoopSink};

pub mod mod3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FsmError<S, I> {
    /// The transition table has no entry for the current state and symbol.
    #[error("no transition from state {state} on symbol '{symbol}' at position {position}")]
    InvalidSymbol {
        state: S,
        symbol: I,
        position: usize,
    },
    /// The output table has no entry for the state.
    #[error("no output recorded for state {state}")]
    UnknownState { state: S },
}

pub struct Machine<S, I, O> {
    transitions: BTreeMap<(S, I), S>,
    outputs: BTreeMap<S, O>,
    initial: S,
    current: S,
    diag: Box<dyn DiagSink>,
}

impl<S, I, O> fmt::Debug for Machine<S, I, O>
where
    S: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("initial", &self.initial)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

impl<S, I, O> Machine<S, I, O>
where
    S: Copy + Ord + fmt::Debug + fmt::Display,
    I: Copy + Ord + fmt::Debug + fmt::Display,
    O: Copy,
{
    pub fn new(transitions: BTreeMap<(S, I), S>, outputs: BTreeMap<S, O>, initial: S) -> Self {
        Self::with_diagnostics(transitions, outputs, initial, Box::new(NoopSink))
    }

    pub fn with_diagnostics(
        transitions: BTreeMap<(S, I), S>,
        outputs: BTreeMap<S, O>,
        initial: S,
        diag: Box<dyn DiagSink>,
    ) -> Self {
        Self {
            transitions,
            outputs,
            initial,
            current: initial,
            diag,
        }
    }

    pub fn initial_state(&self) -> S {
        self.initial
    }

    pub fn current_state(&self) -> S {
        self.current
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }

    pub fn output_of(&self, state: S) -> Result<O, FsmError<S, I>> {
        match self.outputs.get(&state) {
            Some(&output) => Ok(output),
            None => {
                self.diag.record(
                    DiagLevel::Error,
                    &format!("no output recorded for state {state}"),
                );
                Err(FsmError::UnknownState { state })
            }
        }
    }

    /// Consumes `symbols` in order and returns the output of the final
    /// state.
    ///
    /// A symbol with no transition from the current state fails
    /// immediately, and the machine keeps the state it held before that
    /// symbol; it does not reset. A missing output entry for the final
    /// state likewise leaves the machine sitting there. On success the
    /// machine resets to its initial state, so one instance is stateless
    /// across successful calls. Empty input yields the initial state's
    /// output.
    pub fn process<T>(&mut self, symbols: T) -> Result<O, FsmError<S, I>>
    where
        T: IntoIterator<Item = I>,
    {
        for (position, symbol) in symbols.into_iter().enumerate() {
            match self.transitions.get(&(self.current, symbol)) {
                Some(&next) => self.current = next,
                None => {
                    self.diag.record(
                        DiagLevel::Error,
                        &format!(
                            "no transition from state {} on symbol '{symbol}' at position {position}",
                            self.current
                        ),
                    );
                    return Err(FsmError::InvalidSymbol {
                        state: self.current,
                        symbol,
                        position,
                    });
                }
            }
        }
        let output = self.output_of(self.current)?;
        self.reset();
        Ok(output)
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/fsm/tests.rs"]
mod tests;
