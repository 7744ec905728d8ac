use std::fmt;
use std::ops::Index;

use crate::alphabet::{AminoAcid, Nucleotide, Symbol};
use crate::{AlignerError, Result};

/// A named, mutable run of symbols from one alphabet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence<T: Symbol> {
    name: String,
    description: Option<String>,
    symbols: Vec<T>,
}

pub type NtSequence = Sequence<Nucleotide>;
pub type AaSequence = Sequence<AminoAcid>;

impl<T: Symbol> Sequence<T> {
    pub fn new(name: impl Into<String>, symbols: Vec<T>) -> Self {
        Self {
            name: name.into(),
            description: None,
            symbols,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Parses symbols from text, skipping ASCII whitespace.
    pub fn from_text(name: impl Into<String>, text: &[u8]) -> Result<Self> {
        let name = name.into();
        let mut symbols = Vec::with_capacity(text.len());
        for &byte in text.iter().filter(|b| !b.is_ascii_whitespace()) {
            match T::from_byte(byte) {
                Some(symbol) => symbols.push(symbol),
                None => {
                    return Err(AlignerError::InvalidSymbol {
                        symbol: byte as char,
                        sequence: name,
                    })
                }
            }
        }
        Ok(Self::new(name, symbols))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn symbols(&self) -> &[T] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<T> {
        self.symbols.get(i).copied()
    }

    pub fn push(&mut self, symbol: T) {
        self.symbols.push(symbol);
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.symbols.iter().copied()
    }

    /// Removes gap and missing symbols in place, returning how many were dropped.
    pub fn strip_gaps(&mut self) -> usize {
        let before = self.symbols.len();
        self.symbols.retain(|s| !s.is_gap() && !s.is_missing());
        before - self.symbols.len()
    }

    pub fn without_gaps(&self) -> Self {
        let mut copy = self.clone();
        copy.strip_gaps();
        copy
    }

    pub fn to_text(&self) -> String {
        self.symbols.iter().map(|s| s.to_char()).collect()
    }
}

impl<T: Symbol> Index<usize> for Sequence<T> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        &self.symbols[i]
    }
}

impl<T: Symbol> fmt::Display for Sequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for s in &self.symbols {
            write!(f, "{}", s.to_char())?;
        }
        Ok(())
    }
}

impl NtSequence {
    /// Replaces every ambiguity code by the first base it may stand for.
    pub fn resolve_ambiguities(&mut self) -> usize {
        let mut resolved = 0;
        for s in self.symbols.iter_mut().filter(|s| s.is_ambiguity()) {
            if let Some(base) = s.expansions().next() {
                *s = base;
                resolved += 1;
            }
        }
        resolved
    }
}
