//! Errors raised while turning external input into a [`crate::state::GameState`].
use std::error::Error;
use std::fmt;

/// Failure parsing an external grid snapshot, either the structured snapshot
/// passed to [`crate::observer::observe`] or the textual round-trip format of
/// [`crate::wire`]. These are fatal for the tick that produced them: the
/// caller must retain its previous `old_state` and return `Direction::NoChange`
/// rather than install a partially-decoded state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserveError {
    /// a row's character count did not match the declared/previously-seen width
    RowWidthMismatch {
        /// zero-based row index
        row: usize,
        /// expected character count for the row
        expected: usize,
        /// actual character count found
        actual: usize,
    },
    /// a two-character cell encoded a glyph outside the recognized alphabet
    UnknownGlyph {
        /// zero-based row index
        row: usize,
        /// zero-based column index
        col: usize,
        /// the offending glyph
        glyph: char,
    },
}

impl fmt::Display for ObserveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObserveError::RowWidthMismatch {
                row,
                expected,
                actual,
            } => write!(
                f,
                "row {row} has width {actual}, expected {expected}"
            ),
            ObserveError::UnknownGlyph { row, col, glyph } => {
                write!(f, "unknown glyph {glyph:?} at row {row}, col {col}")
            }
        }
    }
}

impl Error for ObserveError {}
