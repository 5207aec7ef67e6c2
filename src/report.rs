//! The single place where fatal errors are turned into a diagnostic line and a process exit.

use crate::types::{RuntimeError, ERROR_PREFIX};
use std::io::{self, Write};
use std::process;
use tracing::debug;

/// Exit status used for every fatal error.
pub const EXIT_FAILURE: i32 = 1;

/// Writes exactly one tagged diagnostic line for `err`.
pub fn report<W: Write>(err: &RuntimeError, mut out: W) -> io::Result<()> {
    writeln!(out, "{}{}", ERROR_PREFIX, err)?;
    out.flush()
}

/// Returns the process exit status for `err`.
pub fn exit_code(_err: &RuntimeError) -> i32 {
    EXIT_FAILURE
}

/// Reports `err` on standard error and terminates the process. Never returns.
pub fn exit_with(err: &RuntimeError) -> ! {
    debug!(error = ?err, "fatal runtime error");

    // Nothing is left to report to if stderr itself is gone.
    let _ = report(err, io::stderr().lock());
    process::exit(exit_code(err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Symbol, TransitionFailure};

    fn render(err: &RuntimeError) -> String {
        let mut out = Vec::new();
        report(err, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_transition_failure_on_blank() {
        let err = RuntimeError::from(TransitionFailure::new("q3", Symbol::BLANK));

        assert_eq!(
            render(&err),
            "turingrt: No transition from q3 on symbol blank (U+0000)\n"
        );
        assert_ne!(exit_code(&err), 0);
    }

    #[test]
    fn test_transition_failure_on_ascii() {
        let err = RuntimeError::from(TransitionFailure::new("q1", 'A'));

        assert!(render(&err).contains("'A' (U+0041)"));
        assert_ne!(exit_code(&err), 0);
    }

    #[test]
    fn test_transition_failure_on_emoji() {
        let err = RuntimeError::from(TransitionFailure::new("q2", Symbol(0x1F600)));
        let line = render(&err);

        assert_eq!(line, "turingrt: No transition from q2 on symbol U+1F600\n");
        assert!(!line.contains('\u{1F600}'));
    }

    #[test]
    fn test_allocation_failure_line() {
        let err = RuntimeError::AllocationFailure(io::Error::from(io::ErrorKind::OutOfMemory));
        let line = render(&err);

        assert!(line.starts_with("turingrt: Failed to acquire tape memory: "));
        assert_eq!(line.lines().count(), 1);
        assert_ne!(exit_code(&err), 0);
    }

    #[test]
    fn test_input_read_failure_line() {
        let err = RuntimeError::InputReadFailure(io::Error::new(io::ErrorKind::Other, "EIO"));

        assert_eq!(
            render(&err),
            "turingrt: failed to read from standard input: EIO\n"
        );
    }
}
