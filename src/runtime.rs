//! This module defines the `Runtime` driver, which runs the fixed pipeline for one automaton:
//! allocate the tape, ingest the input, execute the automaton, emit the output. Every stage
//! finishes before the next one starts, and the first error ends the run.

use crate::alphabet::Alphabet;
use crate::config::RuntimeConfig;
use crate::emit::emit;
use crate::execute::{execute, Automaton};
use crate::ingest::{ingest, IngestSummary};
use crate::report::exit_with;
use crate::tape::{self, ConfiguredTape, Tape};
use crate::types::{Position, RuntimeError};
use std::io::{self, BufWriter, Read, Write};
use tracing::info_span;

/// What a successful run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ingest: IngestSummary,
    /// The head position the automaton halted on.
    pub final_head: Position,
    /// Number of output lines written.
    pub symbols_emitted: usize,
}

/// The runtime for one automaton: its input and output alphabets plus the tape configuration.
#[derive(Debug, Clone)]
pub struct Runtime {
    config: RuntimeConfig,
    input_alphabet: Alphabet,
    output_alphabet: Alphabet,
}

impl Runtime {
    /// Creates a runtime with the default configuration.
    pub fn new(input_alphabet: Alphabet, output_alphabet: Alphabet) -> Self {
        Self {
            config: RuntimeConfig::default(),
            input_alphabet,
            output_alphabet,
        }
    }

    pub fn with_config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn input_alphabet(&self) -> &Alphabet {
        &self.input_alphabet
    }

    pub fn output_alphabet(&self) -> &Alphabet {
        &self.output_alphabet
    }

    /// Allocates a tape as configured and runs the whole pipeline on it.
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` if the automaton halted and its output was written.
    /// * `Err(RuntimeError)` for the first fatal error; output written before it is kept.
    pub fn run<A, R, W>(
        &self,
        automaton: &mut A,
        input: R,
        output: W,
    ) -> Result<RunSummary, RuntimeError>
    where
        A: Automaton<ConfiguredTape> + ?Sized,
        R: Read,
        W: Write,
    {
        self.config.validate()?;
        let mut tape = tape::allocate(&self.config)?;

        self.run_on(&mut tape, automaton, input, output)
    }

    /// Runs the ingest, execute and emit stages on an already allocated tape.
    ///
    /// The configuration is validated first; `tape_bytes` and `tape` are otherwise unused here.
    pub fn run_on<T, A, R, W>(
        &self,
        tape: &mut T,
        automaton: &mut A,
        input: R,
        output: W,
    ) -> Result<RunSummary, RuntimeError>
    where
        T: Tape + ?Sized,
        A: Automaton<T> + ?Sized,
        R: Read,
        W: Write,
    {
        self.config.validate()?;

        let ingest = {
            let _span = info_span!("ingest").entered();
            ingest(input, tape, &self.input_alphabet, self.config.chunk_size)?
        };

        let final_head = {
            let _span = info_span!("execute").entered();
            execute(automaton, tape)?
        };

        let symbols_emitted = {
            let _span = info_span!("emit").entered();
            emit(tape, final_head, &self.output_alphabet, output)?
        };

        Ok(RunSummary {
            ingest,
            final_head,
            symbols_emitted,
        })
    }

    /// Runs on `tape` with standard input and standard output.
    pub fn run_stdio<T, A>(
        &self,
        tape: &mut T,
        automaton: &mut A,
    ) -> Result<RunSummary, RuntimeError>
    where
        T: Tape + ?Sized,
        A: Automaton<T> + ?Sized,
    {
        let stdin = io::stdin();
        let stdout = io::stdout();

        self.run_on(
            tape,
            automaton,
            stdin.lock(),
            BufWriter::new(stdout.lock()),
        )
    }

    /// Allocates the configured tape and runs on standard input and output. Any error is
    /// reported and terminates the process.
    pub fn run_stdio_or_exit<A>(&self, automaton: &mut A) -> RunSummary
    where
        A: Automaton<ConfiguredTape> + ?Sized,
    {
        let result = self
            .config
            .validate()
            .and_then(|_| tape::allocate(&self.config))
            .and_then(|mut tape| self.run_stdio(&mut tape, automaton));

        match result {
            Ok(summary) => summary,
            Err(e) => exit_with(&e),
        }
    }
}
