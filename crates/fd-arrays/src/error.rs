//! Error types for adjusted-array operations.

use thiserror::Error;

use crate::adjustment::AdjustmentKind;

/// Result type for adjusted-array operations.
pub type Result<T> = std::result::Result<T, ArrayError>;

/// Errors that can occur while building or traversing adjusted arrays.
///
/// Every variant is an eagerly-detected precondition violation: the failing
/// call aborts immediately and nothing is partially applied.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArrayError {
    /// Adjustment rectangle with `first > last` on either axis
    #[error(
        "malformed adjustment rectangle: rows {first_row}..={last_row}, \
         cols {first_col}..={last_col}"
    )]
    MalformedRectangle {
        /// First affected row (inclusive)
        first_row: usize,
        /// Last affected row (inclusive)
        last_row: usize,
        /// First affected column (inclusive)
        first_col: usize,
        /// Last affected column (inclusive)
        last_col: usize,
    },

    /// Adjustment rectangle extends past the buffer bounds
    #[error(
        "adjustment rectangle rows {last_row}, cols {last_col} out of bounds \
         for {rows}x{cols} buffer"
    )]
    RectangleOutOfBounds {
        /// Last affected row (inclusive)
        last_row: usize,
        /// Last affected column (inclusive)
        last_col: usize,
        /// Buffer row count
        rows: usize,
        /// Buffer column count
        cols: usize,
    },

    /// Adjustment kind the buffer's element kind does not support
    #[error("adjustment kind {kind} is not supported for {element} buffers")]
    UnsupportedKind {
        /// The offending adjustment kind
        kind: AdjustmentKind,
        /// Name of the buffer's element kind
        element: &'static str,
    },

    /// Column index past the buffer's column count
    #[error("column {column} out of bounds for buffer with {cols} columns")]
    ColumnOutOfBounds {
        /// The offending column index
        column: usize,
        /// Buffer column count
        cols: usize,
    },

    /// Window length of zero or longer than the buffer
    #[error("invalid window length {length} for buffer with {rows} rows")]
    InvalidWindowLength {
        /// Requested window length
        length: usize,
        /// Buffer row count
        rows: usize,
    },

    /// Mask shape differs from the data shape
    #[error("mask shape {mask_rows}x{mask_cols} does not match data shape {rows}x{cols}")]
    MaskShapeMismatch {
        /// Mask row count
        mask_rows: usize,
        /// Mask column count
        mask_cols: usize,
        /// Data row count
        rows: usize,
        /// Data column count
        cols: usize,
    },

    /// Decode of a code this factorizer never issued
    #[error("unknown factorizer code: {0}")]
    UnknownCode(i64),

    /// Encode of a value outside a fixed vocabulary
    #[error("value not in fixed vocabulary: {0}")]
    UnknownCategory(String),

    /// Duplicate value in a fixed vocabulary
    #[error("duplicate category in fixed vocabulary: {0}")]
    DuplicateCategory(String),
}
