use clap::{Parser, ValueEnum};
use std::path::Path;
use tracing::{info, warn};
use turingrt::logging::init_logging_with;
use turingrt::{
    exit_with, Alphabet, Automaton, Position, Runtime, RuntimeConfig, Tape, TapeKind,
    TransitionFailure,
};

#[derive(Parser)]
#[clap(author, version, about, long_about = None, arg_required_else_help = true)]
#[clap(after_help = "EXAMPLES:
  printf '1011bad01' | turingrt-cli -i 01
  printf 'abc' | turingrt-cli -i abc --automaton reject")]
struct Cli {
    /// Characters accepted onto the tape from standard input
    #[clap(short, long)]
    input_alphabet: String,

    /// Characters reported from the final head (defaults to the input alphabet)
    #[clap(short, long)]
    output_alphabet: Option<String>,

    /// The tape implementation to allocate
    #[clap(short, long, value_enum)]
    tape: Option<TapeArg>,

    /// A JSON runtime configuration file
    #[clap(short, long)]
    config: Option<String>,

    /// The built-in automaton to run
    #[clap(short, long, value_enum, default_value_t = Builtin::Echo)]
    automaton: Builtin,

    /// Log each pipeline stage to standard error
    #[clap(short = 'd', long)]
    debug: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TapeArg {
    Reserved,
    Growable,
}

impl From<TapeArg> for TapeKind {
    fn from(arg: TapeArg) -> Self {
        match arg {
            TapeArg::Reserved => TapeKind::Reserved,
            TapeArg::Growable => TapeKind::Growable,
        }
    }
}

/// Automata that exercise the runtime without a compiler in the loop.
#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
enum Builtin {
    /// Halt immediately on the origin, so the ingested input is reported back.
    Echo,
    /// Fail on the origin symbol without moving.
    Reject,
}

impl<T: Tape + ?Sized> Automaton<T> for Builtin {
    fn run(&mut self, tape: &mut T, head: Position) -> Result<Position, TransitionFailure> {
        match self {
            Builtin::Echo => Ok(head),
            Builtin::Reject => Err(TransitionFailure::new("reject", tape.read(head))),
        }
    }
}

fn load_config(cli: &Cli) -> Result<RuntimeConfig, turingrt::RuntimeError> {
    let mut config = match &cli.config {
        Some(path) => RuntimeConfig::load(Path::new(path))?,
        None => RuntimeConfig::from_env()?,
    };

    if let Some(tape) = cli.tape {
        config.tape = tape.into();
        config.validate()?;
    }

    Ok(config)
}

fn main() {
    let cli = Cli::parse();

    init_logging_with(if cli.debug { "debug" } else { "warn" });

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    if atty::is(atty::Stream::Stdin) {
        warn!("reading input from a terminal, end it with Ctrl-D");
    }

    let input = Alphabet::from(cli.input_alphabet.as_str());
    let output = match &cli.output_alphabet {
        Some(chars) => Alphabet::from(chars.as_str()),
        None => input.clone(),
    };

    let runtime = Runtime::new(input, output).with_config(config);
    let mut automaton = cli.automaton;
    let summary = runtime.run_stdio_or_exit(&mut automaton);

    info!(
        bytes_read = summary.ingest.bytes_read,
        symbols_written = summary.ingest.symbols_written,
        final_head = summary.final_head,
        symbols_emitted = summary.symbols_emitted,
        "run complete"
    );
}
