use std::num::TryFromIntError;

pub type BufferResult<T> = Result<T, BufferError>;

/// Failure modes a caller can hit while querying or editing a [`crate::tree::Tree`]
/// or [`crate::builder::Builder`].
///
/// Invariant violations inside the engine itself (a leaf whose line starts are
/// out of order, a CRLF pair split across a boundary) are not represented here —
/// those are bugs, not recoverable conditions, and are raised with `assert!` in
/// `assert_invariants` rather than returned.
#[derive(Debug)]
pub enum BufferError {
    /// An offset (or offset + length) fell outside `0..=length()`.
    OffsetOutOfRange { offset: usize, length: usize },
    /// A 1-indexed line number fell outside `1..=line_count()`.
    LineOutOfRange { line: usize, line_count: usize },
    /// Two edits in the same batch touched overlapping ranges.
    OverlappingEdits,
    /// An edit's `offset + length` exceeded the target's length, or a length
    /// wrapped during arithmetic.
    InvalidEditRange,
    ConversionFailed(TryFromIntError),
    Overflow,
}

impl From<TryFromIntError> for BufferError {
    fn from(err: TryFromIntError) -> Self {
        BufferError::ConversionFailed(err)
    }
}
