//! This module defines the `Tape` abstraction and its two backing strategies: a fixed virtual
//! memory reservation whose midpoint is the origin, and a portable pair of growable vectors that
//! share the origin between them. Both read as blank wherever nothing has been written.

use crate::config::{RuntimeConfig, TapeKind};
use crate::types::{Position, RuntimeError, Symbol};
use tracing::debug;

/// A bidirectional sequence of symbol cells addressed by signed offset from the origin.
pub trait Tape {
    /// Returns the symbol at `position`, or [`Symbol::BLANK`] if the cell was never written.
    fn read(&self, position: Position) -> Symbol;

    /// Stores `symbol` at `position`.
    fn write(&mut self, position: Position, symbol: Symbol);

    /// Returns one past the rightmost position that can hold anything but a blank, or `None` if
    /// the tape has no such bound.
    fn end(&self) -> Option<Position> {
        None
    }
}

/// The tape selected by a [`RuntimeConfig`].
#[derive(Debug)]
pub enum ConfiguredTape {
    #[cfg(unix)]
    Reserved(ReservedTape),
    Growable(GrowableTape),
}

impl Tape for ConfiguredTape {
    fn read(&self, position: Position) -> Symbol {
        match self {
            #[cfg(unix)]
            ConfiguredTape::Reserved(tape) => tape.read(position),
            ConfiguredTape::Growable(tape) => tape.read(position),
        }
    }

    fn write(&mut self, position: Position, symbol: Symbol) {
        match self {
            #[cfg(unix)]
            ConfiguredTape::Reserved(tape) => tape.write(position, symbol),
            ConfiguredTape::Growable(tape) => tape.write(position, symbol),
        }
    }

    fn end(&self) -> Option<Position> {
        match self {
            #[cfg(unix)]
            ConfiguredTape::Reserved(tape) => tape.end(),
            ConfiguredTape::Growable(tape) => tape.end(),
        }
    }
}

/// Allocates the tape selected by `config`.
///
/// `TapeKind::Reserved` is only available on unix targets; elsewhere the growable tape is
/// used instead.
pub fn allocate(config: &RuntimeConfig) -> Result<ConfiguredTape, RuntimeError> {
    match config.tape {
        #[cfg(unix)]
        TapeKind::Reserved => Ok(ConfiguredTape::Reserved(ReservedTape::allocate(
            config.tape_bytes,
        )?)),
        #[cfg(not(unix))]
        TapeKind::Reserved => {
            tracing::warn!("tape reservation unsupported on this target, using growable tape");
            Ok(ConfiguredTape::Growable(GrowableTape::new()))
        }
        TapeKind::Growable => Ok(ConfiguredTape::Growable(GrowableTape::new())),
    }
}

/// A tape that grows on demand in either direction.
///
/// ```text
///   left[1] left[0] | right[0] right[1] ...
///     -2      -1    |    0        1
/// ```
#[derive(Debug, Default, Clone)]
pub struct GrowableTape {
    left: Vec<Symbol>,
    right: Vec<Symbol>,
}

impl GrowableTape {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lowest position ever written (inclusive).
    pub fn min(&self) -> Position {
        -(self.left.len() as Position)
    }

    /// Returns one past the highest position ever written.
    pub fn max(&self) -> Position {
        self.right.len() as Position
    }
}

impl Tape for GrowableTape {
    fn read(&self, position: Position) -> Symbol {
        let cell = if position >= 0 {
            self.right.get(position as usize)
        } else {
            self.left.get((-position - 1) as usize)
        };

        cell.copied().unwrap_or(Symbol::BLANK)
    }

    fn write(&mut self, position: Position, symbol: Symbol) {
        let (half, index) = if position >= 0 {
            (&mut self.right, position as usize)
        } else {
            (&mut self.left, (-position - 1) as usize)
        };

        if index >= half.len() {
            half.resize(index + 1, Symbol::BLANK);
        }
        half[index] = symbol;
    }

    fn end(&self) -> Option<Position> {
        Some(self.max())
    }
}

#[cfg(unix)]
pub use reserved::ReservedTape;

#[cfg(unix)]
mod reserved {
    use super::*;
    use crate::types::CELL_SIZE;
    use std::io;
    use std::ptr::{self, NonNull};
    use std::slice;

    /// A fixed-size anonymous memory mapping used as tape.
    ///
    /// The operating system zero-fills the mapping and only commits pages as they are touched,
    /// so a large reservation costs little until the automaton wanders across it. Position 0 is
    /// the midpoint cell. There are no guard pages: compiled automata that run off either end
    /// touch unmapped memory.
    #[derive(Debug)]
    pub struct ReservedTape {
        base: NonNull<Symbol>,
        cells: usize,
    }

    impl ReservedTape {
        /// Reserves `bytes` of zeroed, private, read-write memory.
        pub fn allocate(bytes: usize) -> Result<Self, RuntimeError> {
            // SAFETY: anonymous mapping with no address hint and no file descriptor.
            let raw = unsafe {
                libc::mmap(
                    ptr::null_mut(),
                    bytes,
                    libc::PROT_READ | libc::PROT_WRITE,
                    libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                    -1,
                    0,
                )
            };

            if raw == libc::MAP_FAILED {
                return Err(RuntimeError::AllocationFailure(io::Error::last_os_error()));
            }

            let base = NonNull::new(raw.cast::<Symbol>()).ok_or_else(|| {
                RuntimeError::AllocationFailure(io::Error::new(
                    io::ErrorKind::Other,
                    "mmap returned a null mapping",
                ))
            })?;

            let cells = bytes / CELL_SIZE;
            debug!(bytes, cells, "tape reserved");

            Ok(Self { base, cells })
        }

        /// Returns the number of cells in the reservation.
        pub fn capacity(&self) -> usize {
            self.cells
        }

        fn origin_index(&self) -> usize {
            self.cells / 2
        }

        fn index(&self, position: Position) -> Option<usize> {
            self.origin_index()
                .checked_add_signed(position)
                .filter(|&i| i < self.cells)
        }

        /// Returns a raw pointer to the cell at position 0, for handing to compiled code.
        pub fn origin_ptr(&mut self) -> *mut u32 {
            // SAFETY: origin_index() < cells, so the offset stays inside the mapping.
            unsafe { self.base.as_ptr().add(self.origin_index()).cast() }
        }

        /// Converts a cell pointer returned by compiled code back into a tape position.
        pub fn position_of(&mut self, cell: *const u32) -> Position {
            let origin = self.origin_ptr() as isize;
            (cell as isize - origin).div_euclid(CELL_SIZE as isize)
        }

        fn cells(&self) -> &[Symbol] {
            // SAFETY: the mapping is `cells` symbols long and lives as long as `self`.
            unsafe { slice::from_raw_parts(self.base.as_ptr(), self.cells) }
        }

        fn cells_mut(&mut self) -> &mut [Symbol] {
            // SAFETY: as above, and `&mut self` guarantees exclusive access.
            unsafe { slice::from_raw_parts_mut(self.base.as_ptr(), self.cells) }
        }
    }

    impl Tape for ReservedTape {
        fn read(&self, position: Position) -> Symbol {
            self.index(position)
                .map(|i| self.cells()[i])
                .unwrap_or(Symbol::BLANK)
        }

        fn write(&mut self, position: Position, symbol: Symbol) {
            let index = match self.index(position) {
                Some(index) => index,
                None => panic!(
                    "tape position {} is outside the {}-cell reservation",
                    position, self.cells
                ),
            };
            self.cells_mut()[index] = symbol;
        }

        fn end(&self) -> Option<Position> {
            Some((self.cells - self.origin_index()) as Position)
        }
    }

    impl Drop for ReservedTape {
        fn drop(&mut self) {
            // SAFETY: base/cells describe exactly the mapping created in `allocate`.
            unsafe {
                libc::munmap(self.base.as_ptr().cast(), self.cells * CELL_SIZE);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_growable_tape_defaults_to_blank() {
        let tape = GrowableTape::new();

        assert_eq!(tape.read(0), Symbol::BLANK);
        assert_eq!(tape.read(-1), Symbol::BLANK);
        assert_eq!(tape.read(1_000_000), Symbol::BLANK);
    }

    #[test]
    fn test_growable_tape_writes_both_directions() {
        let mut tape = GrowableTape::new();

        tape.write(0, Symbol::from('a'));
        tape.write(-1, Symbol::from('b'));
        tape.write(3, Symbol::from('c'));
        tape.write(-3, Symbol::from('d'));

        assert_eq!(tape.read(0), Symbol::from('a'));
        assert_eq!(tape.read(-1), Symbol::from('b'));
        assert_eq!(tape.read(3), Symbol::from('c'));
        assert_eq!(tape.read(-3), Symbol::from('d'));
        // Cells skipped over while growing stay blank
        assert_eq!(tape.read(1), Symbol::BLANK);
        assert_eq!(tape.read(-2), Symbol::BLANK);

        assert_eq!(tape.min(), -3);
        assert_eq!(tape.max(), 4);
        assert_eq!(tape.end(), Some(4));
    }

    #[cfg(unix)]
    #[test]
    fn test_reserved_tape_starts_blank_around_origin() {
        let tape = ReservedTape::allocate(1 << 16).unwrap();

        assert_eq!(tape.capacity(), (1 << 16) / 4);
        for position in -8..8 {
            assert_eq!(tape.read(position), Symbol::BLANK);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_reserved_tape_read_write() {
        let mut tape = ReservedTape::allocate(1 << 16).unwrap();

        tape.write(0, Symbol::from('x'));
        tape.write(-1, Symbol::from('y'));
        tape.write(5, Symbol(0x1F600));

        assert_eq!(tape.read(0), Symbol::from('x'));
        assert_eq!(tape.read(-1), Symbol::from('y'));
        assert_eq!(tape.read(5), Symbol(0x1F600));
        assert_eq!(tape.read(1), Symbol::BLANK);
    }

    #[cfg(unix)]
    #[test]
    fn test_reserved_tape_reads_blank_outside_reservation() {
        let tape = ReservedTape::allocate(64).unwrap();

        assert_eq!(tape.read(8), Symbol::BLANK);
        assert_eq!(tape.read(-9), Symbol::BLANK);
        assert_eq!(tape.end(), Some(8));
    }

    #[cfg(unix)]
    #[test]
    #[should_panic(expected = "outside")]
    fn test_reserved_tape_write_outside_reservation_panics() {
        let mut tape = ReservedTape::allocate(64).unwrap();
        tape.write(8, Symbol::from('z'));
    }

    #[cfg(unix)]
    #[test]
    fn test_reserved_tape_pointer_round_trip() {
        let mut tape = ReservedTape::allocate(1 << 16).unwrap();
        let origin = tape.origin_ptr();

        assert_eq!(tape.position_of(origin), 0);

        // SAFETY: both offsets stay well inside the 64 KiB mapping.
        let (right, left) = unsafe { (origin.add(3), origin.sub(2)) };
        assert_eq!(tape.position_of(right), 3);
        assert_eq!(tape.position_of(left), -2);

        // SAFETY: `right` points into the mapping.
        unsafe { right.write(0x41) };
        assert_eq!(tape.read(3), Symbol::from('A'));
    }

    #[cfg(unix)]
    #[test]
    fn test_reserved_tape_allocation_failure() {
        let result = ReservedTape::allocate(usize::MAX & !7);

        assert!(matches!(result, Err(RuntimeError::AllocationFailure(_))));
    }

    #[test]
    fn test_allocate_growable_from_config() {
        let config = RuntimeConfig {
            tape: TapeKind::Growable,
            ..RuntimeConfig::default()
        };

        let mut tape = allocate(&config).unwrap();
        assert!(matches!(tape, ConfiguredTape::Growable(_)));

        tape.write(-10, Symbol::from('q'));
        assert_eq!(tape.read(-10), Symbol::from('q'));
    }
}
