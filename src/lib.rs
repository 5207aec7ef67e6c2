//! This crate provides the runtime support layer for compiled Turing Machines.
//! It allocates the tape, streams UTF-8 input onto it filtered by an input alphabet, hands the
//! tape to the compiled transition function, and reports the output symbols found at the head
//! the machine halted on, or a diagnostic when the machine has no transition to take.

pub mod alphabet;
pub mod config;
pub mod decoder;
pub mod emit;
pub mod execute;
#[cfg(unix)]
pub mod ffi;
pub mod ingest;
pub mod logging;
pub mod report;
pub mod runtime;
pub mod tape;
pub mod types;

/// Re-exports the `Alphabet` struct from the alphabet module.
pub use alphabet::Alphabet;
/// Re-exports `RuntimeConfig` and `TapeKind` from the config module.
pub use config::{RuntimeConfig, TapeKind};
/// Re-exports the streaming decoder.
pub use decoder::Utf8Decoder;
/// Re-exports the output scan and emission functions.
pub use emit::{emit, scan};
/// Re-exports the `Automaton` trait and the `execute` bridge.
pub use execute::{execute, Automaton};
/// Re-exports the C ABI entry points for compiled automata.
#[cfg(unix)]
pub use ffi::{tm_fail, tm_run, CompiledAutomaton, TransitionFn};
/// Re-exports the `ingest` function and its summary.
pub use ingest::{ingest, IngestSummary};
/// Re-exports the fatal error reporting functions.
pub use report::{exit_with, report};
/// Re-exports the `Runtime` driver from the runtime module.
pub use runtime::{RunSummary, Runtime};
/// Re-exports the memory-mapped tape.
#[cfg(unix)]
pub use tape::ReservedTape;
/// Re-exports the tape abstraction and its implementations.
pub use tape::{ConfiguredTape, GrowableTape, Tape};
/// Re-exports core types from the types module.
pub use types::{Position, RuntimeError, Symbol, TransitionFailure, STDIN_BUFSIZE, TAPE_SIZE};
