//! Rectangular correction records.
//!
//! Loaders translate business-level corporate actions (splits, dividends,
//! mergers) into [`Adjustment`]s: kind-tagged rectangles over an inclusive
//! session/asset range. This module only models the rectangles; what they
//! mean in business terms is the loader's concern.

use derive_more::Display;
use ndarray::{Array2, s};
use serde::{Deserialize, Serialize};

use crate::element::Element;
use crate::error::{ArrayError, Result};

/// How an adjustment value composes onto the cells it covers.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdjustmentKind {
    /// `cell += value`
    Add,
    /// `cell *= value`
    Multiply,
    /// `cell = value`
    Overwrite,
}

/// One rectangular correction to a session × asset buffer.
///
/// Row and column bounds are inclusive and zero-based. `first_row` doubles
/// as the adjustment's effective session: a window anchored at row `R` with
/// visibility offset `O` composes this adjustment only when
/// `first_row <= R + O`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Adjustment<T> {
    /// First affected row (inclusive); also the effective session.
    pub first_row: usize,
    /// Last affected row (inclusive).
    pub last_row: usize,
    /// First affected column (inclusive).
    pub first_col: usize,
    /// Last affected column (inclusive).
    pub last_col: usize,
    /// The correction value.
    pub value: T,
    /// How the value composes onto covered cells.
    pub kind: AdjustmentKind,
}

impl<T: Element> Adjustment<T> {
    /// Build an adjustment, rejecting rectangles with `first > last` on
    /// either axis.
    ///
    /// Bounds against a concrete buffer are checked later, when the
    /// adjustment is attached to an [`AdjustedArray`](crate::AdjustedArray).
    pub fn new(
        first_row: usize,
        last_row: usize,
        first_col: usize,
        last_col: usize,
        value: T,
        kind: AdjustmentKind,
    ) -> Result<Self> {
        if first_row > last_row || first_col > last_col {
            return Err(ArrayError::MalformedRectangle {
                first_row,
                last_row,
                first_col,
                last_col,
            });
        }
        Ok(Self {
            first_row,
            last_row,
            first_col,
            last_col,
            value,
            kind,
        })
    }

    /// Validate this adjustment against a `rows` × `cols` buffer.
    pub(crate) fn validate(&self, rows: usize, cols: usize) -> Result<()> {
        if self.first_row > self.last_row || self.first_col > self.last_col {
            return Err(ArrayError::MalformedRectangle {
                first_row: self.first_row,
                last_row: self.last_row,
                first_col: self.first_col,
                last_col: self.last_col,
            });
        }
        if self.last_row >= rows || self.last_col >= cols {
            return Err(ArrayError::RectangleOutOfBounds {
                last_row: self.last_row,
                last_col: self.last_col,
                rows,
                cols,
            });
        }
        if !T::supports(self.kind) {
            return Err(ArrayError::UnsupportedKind {
                kind: self.kind,
                element: T::KIND,
            });
        }
        Ok(())
    }

    /// Compose this adjustment onto every cell of its rectangle.
    ///
    /// Callers guarantee the rectangle fits `data` (enforced at
    /// construction of the owning array).
    pub(crate) fn apply_to(&self, data: &mut Array2<T>) {
        let mut region = data.slice_mut(s![
            self.first_row..=self.last_row,
            self.first_col..=self.last_col
        ]);
        region.mapv_inplace(|cell| T::apply(self.kind, self.value, cell));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::LabelCode;
    use ndarray::array;

    #[test]
    fn test_rejects_inverted_rows() {
        let err = Adjustment::new(3, 1, 0, 0, 1.0, AdjustmentKind::Add).unwrap_err();
        assert!(matches!(err, ArrayError::MalformedRectangle { .. }));
    }

    #[test]
    fn test_rejects_inverted_cols() {
        let err = Adjustment::new(0, 0, 2, 1, 1.0, AdjustmentKind::Add).unwrap_err();
        assert!(matches!(err, ArrayError::MalformedRectangle { .. }));
    }

    #[test]
    fn test_validate_bounds() {
        let adj = Adjustment::new(0, 4, 0, 1, 1.0, AdjustmentKind::Add).unwrap();
        assert!(adj.validate(5, 2).is_ok());
        assert_eq!(
            adj.validate(4, 2),
            Err(ArrayError::RectangleOutOfBounds {
                last_row: 4,
                last_col: 1,
                rows: 4,
                cols: 2,
            })
        );
    }

    #[test]
    fn test_validate_kind_against_element() {
        let adj = Adjustment::new(0, 0, 0, 0, LabelCode(7), AdjustmentKind::Multiply).unwrap();
        assert_eq!(
            adj.validate(1, 1),
            Err(ArrayError::UnsupportedKind {
                kind: AdjustmentKind::Multiply,
                element: "label",
            })
        );
        let adj = Adjustment::new(0, 0, 0, 0, LabelCode(7), AdjustmentKind::Overwrite).unwrap();
        assert!(adj.validate(1, 1).is_ok());
    }

    #[test]
    fn test_apply_touches_only_rectangle() {
        let mut data = array![[1.0, 1.0], [1.0, 1.0], [1.0, 1.0]];
        let adj = Adjustment::new(1, 2, 0, 0, 10.0, AdjustmentKind::Add).unwrap();
        adj.apply_to(&mut data);
        assert_eq!(data, array![[1.0, 1.0], [11.0, 1.0], [11.0, 1.0]]);
    }

    #[test]
    fn test_apply_overwrite() {
        let mut data = array![[1.0, 2.0], [3.0, 4.0]];
        let adj = Adjustment::new(0, 1, 1, 1, 0.0, AdjustmentKind::Overwrite).unwrap();
        adj.apply_to(&mut data);
        assert_eq!(data, array![[1.0, 0.0], [3.0, 0.0]]);
    }
}
