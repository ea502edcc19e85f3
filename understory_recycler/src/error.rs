// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types shared by the size index, the pools, and the controller.

/// Broad classification of a [`RecyclerError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller passed an invalid argument or called an operation at the
    /// wrong time. Fix the call site.
    Usage,
    /// The list is configured in a way that cannot work (for example a
    /// non-positive default item size).
    Configuration,
    /// Internal bookkeeping no longer holds. This is a bug in this crate.
    Invariant,
}

/// Errors raised by [`SizeIndex`](crate::SizeIndex) and
/// [`RecyclerList`](crate::RecyclerList).
///
/// Arguments are never clamped silently: anything out of range is reported.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum RecyclerError {
    /// An item index was outside `0..count`.
    #[error("index {index} is out of range for {count} items")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of items at the time of the call.
        count: usize,
    },

    /// A `start..start + len` range did not fit inside `0..=count`.
    #[error("range {start}..{end} does not fit in {count} items")]
    RangeOutOfBounds {
        /// Start of the range.
        start: usize,
        /// End of the range (exclusive).
        end: usize,
        /// Number of items at the time of the call.
        count: usize,
    },

    /// A floating point argument was NaN, infinite, negative, or otherwise
    /// outside its documented domain.
    #[error("invalid {what}: {value}")]
    InvalidArgument {
        /// Name of the argument.
        what: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A size was written outside of a batch resize session.
    #[error("no batch resize session is active")]
    NoBatchSession,

    /// A batch resize session was started while another one was open.
    #[error("a batch resize session is already active")]
    BatchSessionActive,

    /// Batch resize keys must be written in strictly consecutive order.
    #[error("batch resize expected index {expected}, got {got}")]
    NonConsecutiveResize {
        /// The only index that is accepted next.
        expected: usize,
        /// The index that was written.
        got: usize,
    },

    /// The default size may only change together with a reset.
    #[error("the default item size can only change together with a reset")]
    DefaultSizeWithoutReset,

    /// A mutation entry point was entered while another one was running, or
    /// after a host callback unwound out of a previous one.
    #[error("`{operation}` was called while another list mutation was in progress")]
    Reentrant {
        /// The entry point that was called.
        operation: &'static str,
    },

    /// The default item size must be strictly positive and finite.
    #[error("default item size must be positive and finite, got {0}")]
    InvalidDefaultSize(f64),

    /// A configuration value was outside its documented domain.
    #[error("invalid configuration: {what} = {value}")]
    InvalidConfig {
        /// Name of the parameter.
        what: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// Re-measuring rendered items kept changing the content size.
    #[error(
        "twin pass did not converge after {iterations} iterations; \
         the default item size is probably smaller than the rendered size"
    )]
    TwinPassDidNotConverge {
        /// Number of iterations that were attempted.
        iterations: usize,
    },

    /// The sorted key list and the entry map disagree.
    #[error("size index is corrupted: {keys} keys but {entries} entries")]
    CorruptedIndex {
        /// Length of the sorted key list.
        keys: usize,
        /// Length of the entry map.
        entries: usize,
    },
}

impl RecyclerError {
    /// Returns the broad category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidDefaultSize(_)
            | Self::InvalidConfig { .. }
            | Self::TwinPassDidNotConverge { .. } => ErrorKind::Configuration,
            Self::CorruptedIndex { .. } => ErrorKind::Invariant,
            _ => ErrorKind::Usage,
        }
    }
}

/// Returns `value` if it is finite and non-negative.
pub(crate) fn non_negative(what: &'static str, value: f64) -> Result<f64, RecyclerError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(RecyclerError::InvalidArgument { what, value })
    }
}

/// Returns `value` if it is finite and within `0.0..=1.0`.
pub(crate) fn fraction(what: &'static str, value: f64) -> Result<f64, RecyclerError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(RecyclerError::InvalidArgument { what, value })
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::{ErrorKind, RecyclerError, fraction, non_negative};

    #[test]
    fn kinds_follow_taxonomy() {
        let usage = RecyclerError::IndexOutOfRange { index: 4, count: 3 };
        assert_eq!(usage.kind(), ErrorKind::Usage);
        assert_eq!(
            RecyclerError::TwinPassDidNotConverge { iterations: 20 }.kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            RecyclerError::CorruptedIndex {
                keys: 1,
                entries: 2
            }
            .kind(),
            ErrorKind::Invariant
        );
    }

    #[test]
    fn twin_pass_message_names_likely_cause() {
        let msg = RecyclerError::TwinPassDidNotConverge { iterations: 20 }.to_string();
        assert!(
            msg.contains("default item size"),
            "message should point at the default size: {msg}"
        );
    }

    #[test]
    fn argument_validators_reject_non_finite() {
        assert!(non_negative("size", f64::NAN).is_err());
        assert!(non_negative("size", -1.0).is_err());
        assert_eq!(non_negative("size", 0.0), Ok(0.0));
        assert!(fraction("pivot", 1.5).is_err());
        assert_eq!(fraction("pivot", 0.5), Ok(0.5));
    }
}
