//! Streams the input onto the tape before the automaton runs.

use crate::alphabet::Alphabet;
use crate::decoder::Utf8Decoder;
use crate::tape::Tape;
use crate::types::{Position, RuntimeError, Symbol};
use std::io::{ErrorKind, Read};
use tracing::{debug, trace};

/// Counters describing one completed ingestion.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    /// Raw bytes read from the input stream.
    pub bytes_read: usize,
    /// Symbols written to the tape, i.e. decoded scalars that belong to the input alphabet.
    pub symbols_written: usize,
    /// Decoded scalars dropped because they are not in the input alphabet.
    pub symbols_discarded: usize,
    /// Bytes skipped as malformed UTF-8 or null.
    pub bytes_skipped: usize,
}

/// Reads `input` to end-of-stream in chunks of `chunk_size` bytes, decodes it as UTF-8 and
/// writes every scalar that belongs to `alphabet` to consecutive cells starting at position 0.
///
/// Malformed bytes, null bytes and scalars outside the alphabet are dropped without affecting
/// the order of the symbols around them. A read error other than an interrupted read is fatal.
///
/// # Returns
///
/// * `Ok(IngestSummary)` once the stream reports end-of-stream.
/// * `Err(RuntimeError::InputReadFailure)` if reading fails.
/// * `Err(RuntimeError::ConfigError)` if `chunk_size` is zero.
pub fn ingest<R, T>(
    mut input: R,
    tape: &mut T,
    alphabet: &Alphabet,
    chunk_size: usize,
) -> Result<IngestSummary, RuntimeError>
where
    R: Read,
    T: Tape + ?Sized,
{
    // A zero-length read would be taken for end-of-stream.
    if chunk_size == 0 {
        return Err(RuntimeError::ConfigError(
            "chunk_size must be greater than zero".to_string(),
        ));
    }

    let mut buffer = vec![0u8; chunk_size];
    let mut decoder = Utf8Decoder::new();
    let mut summary = IngestSummary::default();
    let mut cursor: Position = 0;

    loop {
        let bytes = match input.read(&mut buffer) {
            Ok(0) => break,
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(RuntimeError::InputReadFailure(e)),
        };
        summary.bytes_read += bytes;

        decoder.decode(&buffer[..bytes], |c| {
            let symbol = Symbol::from(c);
            if alphabet.contains(symbol) {
                tape.write(cursor, symbol);
                cursor += 1;
            } else {
                summary.symbols_discarded += 1;
            }
        });

        trace!(bytes, cursor, "input chunk decoded");
    }

    summary.bytes_skipped = decoder.finish();
    summary.symbols_written = cursor as usize;

    debug!(
        bytes_read = summary.bytes_read,
        symbols_written = summary.symbols_written,
        symbols_discarded = summary.symbols_discarded,
        bytes_skipped = summary.bytes_skipped,
        "input ingested"
    );

    Ok(summary)
}
