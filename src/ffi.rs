//! C ABI entry points for natively compiled automata.
//!
//! A compiled program links against this library and calls [`tm_run`] from its `main` with its
//! transition function and alphabets. The transition function receives a pointer to the origin
//! cell, addresses cells as 32-bit words, and returns a pointer to the cell it halted on. When it
//! has no move for the current state and symbol it calls [`tm_fail`] instead of returning.

use crate::alphabet::Alphabet;
use crate::config::{RuntimeConfig, TapeKind};
use crate::execute::Automaton;
use crate::logging::init_logging;
use crate::report::exit_with;
use crate::runtime::Runtime;
use crate::tape::ReservedTape;
use crate::types::{Position, Symbol, TransitionFailure};
use std::ffi::CStr;
use std::os::raw::c_char;
use std::slice;
use tracing::{debug, warn};

/// Signature of a compiled transition function: origin cell in, halting cell out.
pub type TransitionFn = unsafe extern "C" fn(*mut u32) -> *mut u32;

/// Adapts a compiled transition function to the [`Automaton`] interface.
///
/// Compiled code reports failures through [`tm_fail`], which never returns, so `run` itself
/// only ever succeeds.
#[derive(Debug, Clone, Copy)]
pub struct CompiledAutomaton {
    func: TransitionFn,
}

impl CompiledAutomaton {
    /// # Safety
    ///
    /// `func` must only access cells inside the reservation it is handed and must either return
    /// a pointer into it or call [`tm_fail`].
    pub unsafe fn new(func: TransitionFn) -> Self {
        Self { func }
    }
}

impl Automaton<ReservedTape> for CompiledAutomaton {
    fn run(
        &mut self,
        tape: &mut ReservedTape,
        head: Position,
    ) -> Result<Position, TransitionFailure> {
        let start = tape.origin_ptr().wrapping_offset(head);

        // SAFETY: upheld by the contract of `CompiledAutomaton::new`.
        let end = unsafe { (self.func)(start) };

        Ok(tape.position_of(end))
    }
}

/// Copies `len` symbols from a compiled program's constant table.
unsafe fn alphabet_from_raw(symbols: *const u32, len: u32) -> Alphabet {
    if symbols.is_null() || len == 0 {
        return Alphabet::default();
    }

    Alphabet::from_raw(slice::from_raw_parts(symbols, len as usize))
}

/// Runs a compiled automaton on standard input and reports its output on standard output.
///
/// Returns normally on success. Every fatal error is reported on standard error and ends the
/// process with a failure status.
///
/// # Safety
///
/// `isyms` and `osyms` must point to `num_isyms` and `num_osyms` readable `u32` values (or be
/// null with a zero count), and `func` must satisfy the contract of [`CompiledAutomaton::new`].
#[no_mangle]
pub unsafe extern "C" fn tm_run(
    func: TransitionFn,
    isyms: *const u32,
    num_isyms: u32,
    osyms: *const u32,
    num_osyms: u32,
) {
    init_logging();

    let mut config = match RuntimeConfig::from_env() {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };
    if config.tape != TapeKind::Reserved {
        warn!("compiled automata address memory directly, ignoring configured tape kind");
        config.tape = TapeKind::Reserved;
    }

    let runtime = Runtime::new(
        alphabet_from_raw(isyms, num_isyms),
        alphabet_from_raw(osyms, num_osyms),
    )
    .with_config(config);

    debug!(
        input_symbols = runtime.input_alphabet().len(),
        output_symbols = runtime.output_alphabet().len(),
        "compiled automaton attached"
    );

    let mut automaton = CompiledAutomaton::new(func);
    let result = ReservedTape::allocate(runtime.config().tape_bytes)
        .and_then(|mut tape| runtime.run_stdio(&mut tape, &mut automaton));

    if let Err(e) = result {
        exit_with(&e);
    }
}

/// Reports that the automaton has no transition from `state` on `symbol`, then exits.
///
/// # Safety
///
/// `state` must be null or point to a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn tm_fail(state: *const c_char, symbol: u32) -> ! {
    let state = if state.is_null() {
        String::from("<unknown>")
    } else {
        CStr::from_ptr(state).to_string_lossy().into_owned()
    };

    exit_with(&TransitionFailure::new(state, Symbol(symbol)).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tape::Tape;
    use crate::types::CELL_SIZE;

    /// Writes 'Z' under the head, moves two cells right, halts.
    unsafe extern "C" fn write_z_and_skip(tp: *mut u32) -> *mut u32 {
        tp.write(u32::from('Z'));
        tp.add(2)
    }

    /// Walks right over non-blank cells and halts on the first blank.
    unsafe extern "C" fn seek_blank(mut tp: *mut u32) -> *mut u32 {
        while tp.read() != 0 {
            tp = tp.add(1);
        }
        tp
    }

    #[test]
    fn test_compiled_automaton_writes_through_pointer() {
        let mut tape = ReservedTape::allocate(1 << 16).unwrap();
        let mut automaton = unsafe { CompiledAutomaton::new(write_z_and_skip) };

        let head = automaton.run(&mut tape, 0).unwrap();

        assert_eq!(head, 2);
        assert_eq!(tape.read(0), Symbol::from('Z'));
    }

    #[test]
    fn test_compiled_automaton_halting_position() {
        let mut tape = ReservedTape::allocate(1 << 16).unwrap();
        for position in 0..5 {
            tape.write(position, Symbol::from('1'));
        }
        let mut automaton = unsafe { CompiledAutomaton::new(seek_blank) };

        assert_eq!(automaton.run(&mut tape, 0).unwrap(), 5);
        assert_eq!(automaton.run(&mut tape, -3).unwrap(), -3);
    }

    #[test]
    fn test_alphabet_from_raw() {
        let symbols = [u32::from('0'), u32::from('1')];

        let alphabet = unsafe { alphabet_from_raw(symbols.as_ptr(), symbols.len() as u32) };
        assert_eq!(alphabet, Alphabet::from("01"));

        let empty = unsafe { alphabet_from_raw(std::ptr::null(), 4) };
        assert!(empty.is_empty());
    }

    #[test]
    fn test_cells_are_32_bit_words() {
        assert_eq!(CELL_SIZE, std::mem::size_of::<u32>());
    }
}
