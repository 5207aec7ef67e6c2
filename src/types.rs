//! This module defines the core data structures and types shared by the runtime: tape symbols,
//! positions, size constants and the error taxonomy reported by the driver.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use thiserror::Error;

/// The tag prepended to every diagnostic line written to the error stream.
pub const ERROR_PREFIX: &str = "turingrt: ";
/// The size of the tape reservation in bytes.
pub const TAPE_SIZE: usize = 1 << 31; // 2 GiB
/// The number of bytes read from the input stream per chunk.
pub const STDIN_BUFSIZE: usize = 8192; // 8 KiB
/// The width of one tape cell in bytes.
pub const CELL_SIZE: usize = std::mem::size_of::<Symbol>();

/// A signed offset from the tape origin. Position 0 is where input starts and where the
/// automaton's head is placed before execution.
pub type Position = isize;

/// A single tape cell value: a Unicode scalar value, or [`Symbol::BLANK`].
///
/// The representation is a bare `u32` so that compiled automata can address tape cells
/// directly as 32-bit words.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct Symbol(pub u32);

impl Symbol {
    /// The distinguished value of every cell that was never written.
    pub const BLANK: Symbol = Symbol(0);

    /// Returns the raw code point value.
    pub fn value(self) -> u32 {
        self.0
    }

    pub fn is_blank(self) -> bool {
        self == Self::BLANK
    }

    /// Returns the symbol as an ASCII character when it is printable (`' '..='~'`).
    pub fn printable_ascii(self) -> Option<char> {
        match self.0 {
            0x20..=0x7E => char::from_u32(self.0),
            _ => None,
        }
    }
}

impl From<char> for Symbol {
    fn from(c: char) -> Self {
        Symbol(c as u32)
    }
}

impl From<u32> for Symbol {
    fn from(value: u32) -> Self {
        Symbol(value)
    }
}

/// Renders the symbol as `U+XXXX`: uppercase hex, zero-padded to at least four digits.
impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U+{:04X}", self.0)
    }
}

/// The automaton reached a state with no move defined for the symbol under its head.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionFailure {
    pub state: String,
    pub symbol: Symbol,
}

impl TransitionFailure {
    pub fn new(state: impl Into<String>, symbol: impl Into<Symbol>) -> Self {
        Self {
            state: state.into(),
            symbol: symbol.into(),
        }
    }
}

impl fmt::Display for TransitionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = &self.state;
        let symbol = self.symbol;

        if symbol.is_blank() {
            write!(f, "No transition from {state} on symbol blank ({symbol})")
        } else if let Some(c) = symbol.printable_ascii() {
            write!(f, "No transition from {state} on symbol '{c}' ({symbol})")
        } else {
            // Non-ASCII scalars are reported by code point only.
            write!(f, "No transition from {state} on symbol {symbol}")
        }
    }
}

impl std::error::Error for TransitionFailure {}

/// Represents the fatal conditions the runtime can run into. None of them is recoverable:
/// the driver reports the error once and terminates the process.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The operating system refused the tape reservation.
    #[error("Failed to acquire tape memory: {0}")]
    AllocationFailure(#[source] io::Error),
    /// Reading the input stream failed for a reason other than end-of-stream.
    #[error("failed to read from standard input: {0}")]
    InputReadFailure(#[source] io::Error),
    /// The automaton had no transition for its current state and symbol.
    #[error("{0}")]
    TransitionFailure(#[from] TransitionFailure),
    /// Writing reported symbols to the output stream failed.
    #[error("failed to write to standard output: {0}")]
    OutputWriteFailure(#[source] io::Error),
    /// The runtime configuration could not be read or is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
