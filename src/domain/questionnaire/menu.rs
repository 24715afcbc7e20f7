//! Numbered menus.
//!
//! Categories and answer options are shown as `1. text` lines and users
//! reply with the number. Parsing and formatting live together so the two
//! never disagree about where numbering starts.

use std::fmt::Write;

use thiserror::Error;

/// Why a menu reply was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("reply is not a number")]
    NotANumber,

    #[error("number {number} is outside 1..={max}")]
    OutOfRange { number: i64, max: usize },
}

/// A valid pick from a numbered menu, stored zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuSelection(usize);

impl MenuSelection {
    /// Parses a one-based reply against a menu of `len` entries.
    pub fn parse(reply: &str, len: usize) -> Result<Self, SelectionError> {
        let number: i64 = reply
            .trim()
            .parse()
            .map_err(|_| SelectionError::NotANumber)?;

        if number < 1 || number as u64 > len as u64 {
            return Err(SelectionError::OutOfRange { number, max: len });
        }

        Ok(Self((number - 1) as usize))
    }

    /// Zero-based position in the menu.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Renders entries as `1. first\n2. second\n`.
pub fn format_numbered<S: AsRef<str>>(entries: &[S]) -> String {
    let mut out = String::new();
    for (i, entry) in entries.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, entry.as_ref());
    }
    out
}
