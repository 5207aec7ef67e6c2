//! Reports the automaton's output: the run of output-alphabet symbols starting at the final head.

use crate::alphabet::Alphabet;
use crate::tape::Tape;
use crate::types::{Position, RuntimeError, Symbol};
use std::io::Write;
use tracing::debug;

/// Yields the symbols from `head` rightward while they belong to `alphabet`.
///
/// The scan is a strict prefix: it stops at the first non-member (a blank included), and
/// members further right are never visited. It also stops at [`Tape::end`], so an alphabet
/// containing the blank still yields a finite run.
pub fn scan<'a, T: Tape + ?Sized>(
    tape: &'a T,
    head: Position,
    alphabet: &'a Alphabet,
) -> impl Iterator<Item = Symbol> + 'a {
    let end = tape.end();

    (head..)
        .take_while(move |&position| end.map_or(true, |end| position < end))
        .map(move |position| tape.read(position))
        .take_while(move |&symbol| alphabet.contains(symbol))
}

/// Writes one `Symbol U+XXXX in output stream` line per scanned symbol and returns the count.
pub fn emit<T, W>(
    tape: &T,
    head: Position,
    alphabet: &Alphabet,
    mut out: W,
) -> Result<usize, RuntimeError>
where
    T: Tape + ?Sized,
    W: Write,
{
    let mut count = 0;
    for symbol in scan(tape, head, alphabet) {
        writeln!(out, "Symbol {} in output stream", symbol)
            .map_err(RuntimeError::OutputWriteFailure)?;
        count += 1;
    }
    out.flush().map_err(RuntimeError::OutputWriteFailure)?;

    debug!(head, symbols = count, "output emitted");
    Ok(count)
}
