//! Error types for HashForge operations.
//!
//! All fallible construction and configuration paths in the crate return
//! [`Result<T>`] with [`HashForgeError`]. Search rejection is *not* an error:
//! a proposed mutation scoring worse than the best seen is the expected
//! steady-state outcome and is rolled back silently.
//!
//! # Error Propagation
//!
//! ```
//! use hashforge::{Result, Tunables};
//!
//! fn configure(t: &Tunables) -> Result<()> {
//!     t.set_seq_bounds(2, 6)?;
//!     t.set_aval_byte(47)?;
//!     Ok(())
//! }
//! # let t = Tunables::new();
//! # assert!(configure(&t).is_ok());
//! ```

use std::fmt;

/// Result type alias for HashForge operations.
pub type Result<T> = std::result::Result<T, HashForgeError>;

/// Errors that can occur while configuring or constructing search state.
///
/// # Design Notes
/// - `Clone` + `PartialEq` enable testing and error comparison
/// - All variants include sufficient context for debugging
/// - There is no I/O, network, or persistence error surface in this crate
#[derive(Debug, Clone, PartialEq)]
pub enum HashForgeError {
    /// Invalid parameters provided during construction or tuning.
    InvalidParameters {
        /// Human-readable description of what's invalid.
        message: String,
    },

    /// Shift or rotate amount outside the valid `1..=63` range.
    ///
    /// Shifting a 64-bit word by 0 is the identity and by 64+ is undefined
    /// for the search's purposes; normalized arguments never leave the range,
    /// so this only arises when a caller supplies a pre-built sequence.
    InvalidShiftAmount {
        /// The invalid amount that was supplied.
        amount: u64,
    },

    /// Sequence length bounds do not satisfy `1 <= min <= max`.
    InvalidSequenceBounds {
        /// Requested minimum length.
        min: usize,
        /// Requested maximum length.
        max: usize,
    },

    /// Sample count or buffer length that would make the scorer degenerate.
    InvalidSampleCount {
        /// The invalid count that was supplied.
        count: usize,
    },

    /// A supplied operation sequence violates the adjacency rule.
    AdjacencyViolation {
        /// Index of the first operation of the offending pair.
        position: usize,
    },

    /// A supplied operation sequence is outside the configured length bounds.
    SequenceLengthOutOfBounds {
        /// Length of the supplied sequence.
        length: usize,
        /// Configured minimum.
        min: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Internal invariant violated.
    ///
    /// This should never occur in correct usage. If it does, it indicates a
    /// bug in HashForge itself.
    InternalError {
        /// Description of the invariant that was violated.
        message: String,
    },
}

impl fmt::Display for HashForgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameters { message } => {
                write!(f, "Invalid search parameters: {}.", message)
            }
            Self::InvalidShiftAmount { amount } => {
                write!(
                    f,
                    "Invalid shift amount: {}. Must be in range [1, 63].",
                    amount
                )
            }
            Self::InvalidSequenceBounds { min, max } => {
                write!(
                    f,
                    "Invalid sequence bounds: min={}, max={}. Require 1 <= min <= max.",
                    min, max
                )
            }
            Self::InvalidSampleCount { count } => {
                write!(
                    f,
                    "Invalid sample count: {}. Must be greater than 0.",
                    count
                )
            }
            Self::AdjacencyViolation { position } => {
                write!(
                    f,
                    "Operations at positions {} and {} violate the adjacency rule.",
                    position,
                    position + 1
                )
            }
            Self::SequenceLengthOutOfBounds { length, min, max } => {
                write!(
                    f,
                    "Sequence length {} is outside the configured bounds [{}, {}].",
                    length, min, max
                )
            }
            Self::InternalError { message } => {
                write!(f, "Internal error (this is a bug in HashForge): {}.", message)
            }
        }
    }
}

impl std::error::Error for HashForgeError {}

impl HashForgeError {
    /// Create an `InvalidParameters` error with a formatted message.
    #[must_use]
    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            message: message.into(),
        }
    }

    /// Create an `InvalidShiftAmount` error.
    #[must_use]
    pub fn invalid_shift_amount(amount: u64) -> Self {
        Self::InvalidShiftAmount { amount }
    }

    /// Create an `InvalidSequenceBounds` error.
    #[must_use]
    pub fn invalid_sequence_bounds(min: usize, max: usize) -> Self {
        Self::InvalidSequenceBounds { min, max }
    }

    /// Create an `InvalidSampleCount` error.
    #[must_use]
    pub fn invalid_sample_count(count: usize) -> Self {
        Self::InvalidSampleCount { count }
    }

    /// Create an `AdjacencyViolation` error.
    #[must_use]
    pub fn adjacency_violation(position: usize) -> Self {
        Self::AdjacencyViolation { position }
    }

    /// Create a `SequenceLengthOutOfBounds` error.
    #[must_use]
    pub fn sequence_length_out_of_bounds(length: usize, min: usize, max: usize) -> Self {
        Self::SequenceLengthOutOfBounds { length, min, max }
    }

    /// Create an `InternalError`.
    ///
    /// This should only be used for conditions that indicate bugs in HashForge.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_parameters() {
        let err = HashForgeError::invalid_parameters("test message");
        let display = format!("{err}");
        assert!(display.contains("Invalid search parameters"));
        assert!(display.contains("test message"));
        assert!(display.ends_with('.'));
    }

    #[test]
    fn test_error_display_invalid_shift_amount() {
        let err = HashForgeError::invalid_shift_amount(64);
        let display = format!("{err}");
        assert!(display.contains("64"));
        assert!(display.contains("[1, 63]"));
    }

    #[test]
    fn test_error_display_invalid_sequence_bounds() {
        let err = HashForgeError::invalid_sequence_bounds(4, 2);
        let display = format!("{err}");
        assert!(display.contains("min=4"));
        assert!(display.contains("max=2"));
    }

    #[test]
    fn test_error_display_adjacency_violation() {
        let err = HashForgeError::adjacency_violation(3);
        let display = format!("{err}");
        assert!(display.contains("positions 3 and 4"));
    }

    #[test]
    fn test_error_display_sequence_length() {
        let err = HashForgeError::sequence_length_out_of_bounds(9, 2, 6);
        let display = format!("{err}");
        assert!(display.contains('9'));
        assert!(display.contains("[2, 6]"));
    }

    #[test]
    fn test_error_implements_std_error() {
        let _err: Box<dyn std::error::Error> =
            Box::new(HashForgeError::invalid_parameters("test"));
    }

    #[test]
    fn test_error_clone_eq() {
        let err1 = HashForgeError::invalid_sample_count(0);
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn inner() -> Result<()> {
            Err(HashForgeError::invalid_sample_count(0))
        }

        fn outer() -> Result<()> {
            inner()?;
            Ok(())
        }

        assert!(outer().is_err());
    }
}
