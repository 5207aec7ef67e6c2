//! This module defines the `Automaton` capability and the bridge that hands the prepared tape
//! to it. The automaton's states and transitions are opaque to the runtime: it is only given
//! the tape and the initial head, and gives back the head it halted on.

use crate::tape::Tape;
use crate::types::{Position, TransitionFailure};
use std::time::Instant;
use tracing::debug;

/// A compiled transition function.
///
/// `run` owns the head for the duration of the call, may read and write any cell, and returns
/// the position it halted on. It fails with a [`TransitionFailure`] when no move is defined for
/// the current state and symbol.
pub trait Automaton<T: Tape + ?Sized> {
    fn run(&mut self, tape: &mut T, head: Position) -> Result<Position, TransitionFailure>;
}

impl<T, F> Automaton<T> for F
where
    T: Tape + ?Sized,
    F: FnMut(&mut T, Position) -> Result<Position, TransitionFailure>,
{
    fn run(&mut self, tape: &mut T, head: Position) -> Result<Position, TransitionFailure> {
        self(tape, head)
    }
}

/// Runs `automaton` to completion with the head on position 0.
///
/// The call blocks until the automaton halts or fails; there is no step limit and no timeout.
pub fn execute<T, A>(automaton: &mut A, tape: &mut T) -> Result<Position, TransitionFailure>
where
    T: Tape + ?Sized,
    A: Automaton<T> + ?Sized,
{
    let started = Instant::now();
    debug!(head = 0, "handing tape to automaton");

    let result = automaton.run(tape, 0);

    match &result {
        Ok(head) => debug!(head, elapsed = ?started.elapsed(), "automaton halted"),
        Err(failure) => debug!(
            state = %failure.state,
            symbol = %failure.symbol,
            elapsed = ?started.elapsed(),
            "automaton failed"
        ),
    }

    result
}
