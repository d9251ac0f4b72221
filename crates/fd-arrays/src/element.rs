//! The closed set of element kinds an adjusted array can hold.
//!
//! Buffers are generic over [`Element`] rather than inspected at runtime:
//! each kind carries its own missing-value sentinel and its own rule for
//! which adjustment kinds make sense on it. Prices are `f64`, ordinals are
//! `i64`, boolean masks are `u8`, and categorical columns are [`LabelCode`]s
//! produced by a [`Factorizer`](crate::Factorizer).

use std::fmt::Debug;

use crate::adjustment::AdjustmentKind;

/// An element kind storable in an [`AdjustedArray`](crate::AdjustedArray).
///
/// Implemented for exactly `f64`, `i64`, `u8`, and [`LabelCode`]. The trait
/// is deliberately closed: downstream terms dispatch on these four kinds at
/// compile time, never via runtime type inspection.
pub trait Element: Copy + PartialEq + Debug + Send + Sync + 'static {
    /// Name of this element kind, used in diagnostics.
    const KIND: &'static str;

    /// Sentinel marking a missing cell.
    const MISSING: Self;

    /// Whether this cell holds the missing sentinel.
    ///
    /// Not expressible as `self == Self::MISSING` because the float sentinel
    /// is NaN.
    fn is_missing(&self) -> bool;

    /// Whether `kind` adjustments are meaningful for this element kind.
    ///
    /// [`AdjustedArray::new`](crate::AdjustedArray::new) rejects adjustments
    /// whose kind is unsupported, so [`Element::apply`] only ever sees
    /// supported kinds.
    fn supports(kind: AdjustmentKind) -> bool;

    /// Compose one adjustment value onto one cell.
    fn apply(kind: AdjustmentKind, value: Self, cell: Self) -> Self;
}

impl Element for f64 {
    const KIND: &'static str = "float64";
    const MISSING: Self = f64::NAN;

    fn is_missing(&self) -> bool {
        self.is_nan()
    }

    fn supports(_kind: AdjustmentKind) -> bool {
        true
    }

    fn apply(kind: AdjustmentKind, value: Self, cell: Self) -> Self {
        // NaN propagates through Add and Multiply; that is a defined
        // outcome for missing cells, not an error.
        match kind {
            AdjustmentKind::Add => cell + value,
            AdjustmentKind::Multiply => cell * value,
            AdjustmentKind::Overwrite => value,
        }
    }
}

impl Element for i64 {
    const KIND: &'static str = "int64";
    const MISSING: Self = i64::MIN;

    fn is_missing(&self) -> bool {
        *self == Self::MISSING
    }

    fn supports(_kind: AdjustmentKind) -> bool {
        true
    }

    fn apply(kind: AdjustmentKind, value: Self, cell: Self) -> Self {
        match kind {
            AdjustmentKind::Add => cell.wrapping_add(value),
            AdjustmentKind::Multiply => cell.wrapping_mul(value),
            AdjustmentKind::Overwrite => value,
        }
    }
}

impl Element for u8 {
    const KIND: &'static str = "uint8";
    const MISSING: Self = 0;

    fn is_missing(&self) -> bool {
        *self == Self::MISSING
    }

    fn supports(kind: AdjustmentKind) -> bool {
        // Adding or scaling a flag is meaningless; corrections to boolean
        // columns are always rewrites.
        kind == AdjustmentKind::Overwrite
    }

    fn apply(kind: AdjustmentKind, value: Self, cell: Self) -> Self {
        match kind {
            AdjustmentKind::Overwrite => value,
            // Unreachable for validated arrays; leave the cell untouched.
            AdjustmentKind::Add | AdjustmentKind::Multiply => cell,
        }
    }
}

/// Dense integer code for one categorical value.
///
/// Codes are allocated from zero upward by a [`Factorizer`](crate::Factorizer),
/// so `-1` is reserved as the missing sentinel. A `LabelCode` is only
/// comparable to codes issued by the same factorizer (or by factorizers
/// built from the same fixed vocabulary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct LabelCode(
    /// Raw integer code.
    pub i64,
);

impl LabelCode {
    /// The raw integer code.
    pub const fn code(self) -> i64 {
        self.0
    }
}

impl Element for LabelCode {
    const KIND: &'static str = "label";
    const MISSING: Self = Self(-1);

    fn is_missing(&self) -> bool {
        *self == Self::MISSING
    }

    fn supports(kind: AdjustmentKind) -> bool {
        // Category codes are nominal; arithmetic on them is meaningless.
        kind == AdjustmentKind::Overwrite
    }

    fn apply(kind: AdjustmentKind, value: Self, cell: Self) -> Self {
        match kind {
            AdjustmentKind::Overwrite => value,
            AdjustmentKind::Add | AdjustmentKind::Multiply => cell,
        }
    }
}
