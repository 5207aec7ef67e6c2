//! Input and output alphabets supplied by the automaton compiler.

use crate::types::Symbol;
use serde::{Deserialize, Serialize};

/// An ordered set of symbols. Alphabets are expected to hold a few dozen entries at most, so
/// membership is a linear scan over the backing slice.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Alphabet {
    symbols: Vec<Symbol>,
}

impl Alphabet {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self { symbols }
    }

    /// Builds an alphabet from the raw code points handed over by compiled code.
    pub fn from_raw(values: &[u32]) -> Self {
        Self::new(values.iter().copied().map(Symbol).collect())
    }

    pub fn contains(&self, symbol: Symbol) -> bool {
        self.symbols.iter().any(|&s| s == symbol)
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl From<&str> for Alphabet {
    fn from(chars: &str) -> Self {
        chars.chars().collect()
    }
}

impl FromIterator<char> for Alphabet {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Symbol::from).collect())
    }
}
