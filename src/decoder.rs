//! A streaming UTF-8 decoder that carries incomplete sequences from one chunk into the next.
//!
//! Malformed input is never an error here. Whenever the bytes at the current offset do not start
//! a well-formed scalar value, or decode to U+0000, exactly one byte is skipped and decoding
//! resumes at the following byte. This resynchronization is deliberately not length-aware.

/// The outcome of decoding at one offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decoded {
    /// A scalar value and the number of bytes it occupied.
    Scalar(char, usize),
    /// The bytes cannot start a well-formed sequence.
    Invalid,
    /// The bytes are a valid prefix but more are needed.
    Incomplete,
}

/// Returns the number of bytes announced by a lead byte and the accepted range of the byte that
/// follows it. Overlong forms, surrogates and values above U+10FFFF are excluded by the ranges.
fn sequence_shape(lead: u8) -> Option<(usize, u8, u8)> {
    match lead {
        0x00..=0x7F => Some((1, 0, 0)),
        0xC2..=0xDF => Some((2, 0x80, 0xBF)),
        0xE0 => Some((3, 0xA0, 0xBF)),
        0xE1..=0xEC | 0xEE..=0xEF => Some((3, 0x80, 0xBF)),
        0xED => Some((3, 0x80, 0x9F)),
        0xF0 => Some((4, 0x90, 0xBF)),
        0xF1..=0xF3 => Some((4, 0x80, 0xBF)),
        0xF4 => Some((4, 0x80, 0x8F)),
        _ => None,
    }
}

fn decode_one(bytes: &[u8]) -> Decoded {
    let Some(&lead) = bytes.first() else {
        return Decoded::Incomplete;
    };
    let Some((len, second_lo, second_hi)) = sequence_shape(lead) else {
        return Decoded::Invalid;
    };

    if len == 1 {
        return Decoded::Scalar(lead as char, 1);
    }

    let mut value = u32::from(lead) & (0x7F >> len);
    for i in 1..len {
        let Some(&byte) = bytes.get(i) else {
            return Decoded::Incomplete;
        };

        let (lo, hi) = if i == 1 {
            (second_lo, second_hi)
        } else {
            (0x80, 0xBF)
        };
        if byte < lo || byte > hi {
            return Decoded::Invalid;
        }

        value = (value << 6) | u32::from(byte & 0x3F);
    }

    match char::from_u32(value) {
        Some(c) => Decoded::Scalar(c, len),
        None => Decoded::Invalid,
    }
}

/// Decoder state threaded through successive chunks of one stream.
#[derive(Debug, Default, Clone)]
pub struct Utf8Decoder {
    pending: [u8; 3],
    pending_len: usize,
    skipped: usize,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes `chunk`, calling `emit` for every non-null scalar value in stream order.
    ///
    /// A sequence cut off at the end of the chunk is kept and completed by the next call.
    pub fn decode<F: FnMut(char)>(&mut self, chunk: &[u8], mut emit: F) {
        let mut offset = 0;

        if self.pending_len > 0 {
            // Stitch the carried bytes to enough of the new chunk to finish any sequence that
            // starts among them.
            let carried = self.pending_len;
            let borrowed = chunk.len().min(4);
            let mut window = [0u8; 7];
            window[..carried].copy_from_slice(&self.pending[..carried]);
            window[carried..carried + borrowed].copy_from_slice(&chunk[..borrowed]);
            let window = &window[..carried + borrowed];
            self.pending_len = 0;

            let mut pos = 0;
            while pos < carried {
                match self.step(&window[pos..], &mut emit) {
                    Some(consumed) => pos += consumed,
                    None => {
                        self.stash(&window[pos..]);
                        return;
                    }
                }
            }
            offset = pos - carried;
        }

        while offset < chunk.len() {
            match self.step(&chunk[offset..], &mut emit) {
                Some(consumed) => offset += consumed,
                None => {
                    self.stash(&chunk[offset..]);
                    return;
                }
            }
        }
    }

    /// Ends the stream, discarding any incomplete trailing sequence.
    ///
    /// Returns the total number of bytes skipped over the whole stream.
    pub fn finish(&mut self) -> usize {
        self.skipped += self.pending_len;
        self.pending_len = 0;
        self.skipped
    }

    /// Returns the number of bytes skipped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Returns true while part of a multi-byte sequence is waiting for more input.
    pub fn has_pending(&self) -> bool {
        self.pending_len > 0
    }

    /// Decodes at the start of `bytes`. Returns the bytes consumed, or `None` if more input is
    /// needed.
    fn step<F: FnMut(char)>(&mut self, bytes: &[u8], emit: &mut F) -> Option<usize> {
        match decode_one(bytes) {
            Decoded::Scalar('\0', _) | Decoded::Invalid => {
                self.skipped += 1;
                Some(1)
            }
            Decoded::Scalar(c, len) => {
                emit(c);
                Some(len)
            }
            Decoded::Incomplete => None,
        }
    }

    fn stash(&mut self, tail: &[u8]) {
        self.pending[..tail.len()].copy_from_slice(tail);
        self.pending_len = tail.len();
    }
}
