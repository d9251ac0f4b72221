//! Adjusted arrays: a base buffer plus an index of corrections.
//!
//! An [`AdjustedArray`] owns one immutable session × asset buffer and, per
//! column, the ordered list of [`Adjustment`]s affecting it. It hands out
//! [`Window`]s that materialize point-in-time-correct trailing slices; the
//! array itself is never mutated by traversal.

use std::collections::BTreeMap;

use ndarray::Array2;

use crate::adjustment::Adjustment;
use crate::element::Element;
use crate::error::{ArrayError, Result};
use crate::window::Window;

/// A 2-D buffer with rectangular corrections, traversed by rolling windows.
///
/// Rows are chronologically ordered sessions, columns are asset slots.
/// Within each column the adjustments are kept in ascending `first_row`
/// order, insertion order breaking ties; that is also the order in which
/// they compose onto any cell they share.
///
/// Many [`Window`]s may be driven concurrently over one array: each window
/// takes its own copy of the data and a snapshot of the adjustments at
/// [`traverse`](Self::traverse) time. Replacing a column's adjustments via
/// [`update_adjustments`](Self::update_adjustments) requires `&mut self`
/// and therefore cannot race with traversal.
#[derive(Debug, Clone)]
pub struct AdjustedArray<T> {
    data: Array2<T>,
    adjustments: BTreeMap<usize, Vec<Adjustment<T>>>,
}

impl<T: Element> AdjustedArray<T> {
    /// Build an adjusted array from a raw buffer and per-column adjustments.
    ///
    /// Fails if any map key is not a valid column, or if any adjustment has
    /// a malformed or out-of-bounds rectangle, or a kind the buffer's
    /// element kind does not support. Each column's list is sorted by
    /// `first_row` (stable, so ties keep insertion order).
    pub fn new(
        data: Array2<T>,
        mut adjustments: BTreeMap<usize, Vec<Adjustment<T>>>,
    ) -> Result<Self> {
        let (rows, cols) = data.dim();
        for (&column, list) in &mut adjustments {
            if column >= cols {
                return Err(ArrayError::ColumnOutOfBounds { column, cols });
            }
            for adj in list.iter() {
                adj.validate(rows, cols)?;
            }
            list.sort_by_key(|adj| adj.first_row);
        }
        Ok(Self { data, adjustments })
    }

    /// Build an adjusted array with no corrections.
    pub fn from_buffer(data: Array2<T>) -> Self {
        Self {
            data,
            adjustments: BTreeMap::new(),
        }
    }

    /// Number of sessions (rows).
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of asset slots (columns).
    pub fn columns(&self) -> usize {
        self.data.ncols()
    }

    /// The raw, unadjusted buffer.
    pub const fn data(&self) -> &Array2<T> {
        &self.data
    }

    /// The adjustments registered for `column`, in application order.
    pub fn adjustments(&self, column: usize) -> &[Adjustment<T>] {
        self.adjustments.get(&column).map_or(&[], Vec::as_slice)
    }

    /// One fully-adjusted copy of the whole buffer, every adjustment
    /// applied with no visibility cutoff.
    ///
    /// Diagnostic only; traversal never goes through this path.
    pub fn inspect(&self) -> Array2<T> {
        let mut out = self.data.clone();
        for adj in self.merged_adjustments() {
            adj.apply_to(&mut out);
        }
        out
    }

    /// Start a rolling traversal of trailing `window_length`-row slices.
    ///
    /// The first slice is anchored at row `window_length - 1` (the earliest
    /// fully-covered session) and successive slices advance one row at a
    /// time. `offset` widens adjustment visibility: a slice anchored at row
    /// `R` composes adjustments with `first_row <= R + offset`, the cutoff
    /// being inclusive so a correction effective on the anchor session
    /// itself is visible at `offset = 0`.
    ///
    /// Fails if `window_length` is zero or exceeds the row count. The
    /// returned window snapshots both data and adjustments; later
    /// [`update_adjustments`](Self::update_adjustments) calls do not affect
    /// it.
    pub fn traverse(&self, window_length: usize, offset: usize) -> Result<Window<T>> {
        let rows = self.rows();
        if window_length == 0 || window_length > rows {
            return Err(ArrayError::InvalidWindowLength {
                length: window_length,
                rows,
            });
        }
        let mut schedule: BTreeMap<usize, Vec<Adjustment<T>>> = BTreeMap::new();
        for adj in self.merged_adjustments() {
            schedule.entry(adj.first_row).or_default().push(adj);
        }
        Ok(Window::new(
            self.data.clone(),
            schedule,
            window_length,
            offset,
        ))
    }

    /// Replace one column's adjustment list.
    ///
    /// The new list is validated and sorted exactly as at construction.
    /// Windows created before this call keep their snapshot and are
    /// unaffected.
    pub fn update_adjustments(
        &mut self,
        column: usize,
        new_list: Vec<Adjustment<T>>,
    ) -> Result<()> {
        let (rows, cols) = self.data.dim();
        if column >= cols {
            return Err(ArrayError::ColumnOutOfBounds { column, cols });
        }
        for adj in &new_list {
            adj.validate(rows, cols)?;
        }
        let mut list = new_list;
        list.sort_by_key(|adj| adj.first_row);
        self.adjustments.insert(column, list);
        Ok(())
    }

    /// All adjustments across all columns, ascending by `first_row` with
    /// insertion order breaking ties.
    ///
    /// Ties across distinct columns touch disjoint cells when rectangles
    /// stay within their column, so their relative order is immaterial; the
    /// column-key order used here is just deterministic.
    fn merged_adjustments(&self) -> Vec<Adjustment<T>> {
        let mut merged: Vec<Adjustment<T>> = self
            .adjustments
            .values()
            .flat_map(|list| list.iter().copied())
            .collect();
        merged.sort_by_key(|adj| adj.first_row);
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjustment::AdjustmentKind;
    use crate::element::LabelCode;
    use approx::assert_relative_eq;
    use ndarray::{Array2, array};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn ones(rows: usize, cols: usize) -> Array2<f64> {
        Array2::from_elem((rows, cols), 1.0)
    }

    fn mul(first_row: usize, last_row: usize, col: usize, value: f64) -> Adjustment<f64> {
        Adjustment::new(first_row, last_row, col, col, value, AdjustmentKind::Multiply).unwrap()
    }

    #[test]
    fn test_new_rejects_out_of_bounds_column_key() {
        let err = AdjustedArray::new(
            ones(3, 2),
            BTreeMap::from([(2, vec![mul(0, 0, 0, 2.0)])]),
        )
        .unwrap_err();
        assert_eq!(err, ArrayError::ColumnOutOfBounds { column: 2, cols: 2 });
    }

    #[test]
    fn test_new_rejects_out_of_bounds_rectangle() {
        let err = AdjustedArray::new(
            ones(3, 2),
            BTreeMap::from([(0, vec![mul(0, 3, 0, 2.0)])]),
        )
        .unwrap_err();
        assert!(matches!(err, ArrayError::RectangleOutOfBounds { .. }));
    }

    #[test]
    fn test_new_rejects_unsupported_kind_for_labels() {
        let adj =
            Adjustment::new(0, 0, 0, 0, LabelCode(3), AdjustmentKind::Add).unwrap();
        let err = AdjustedArray::new(
            Array2::from_elem((2, 1), LabelCode(0)),
            BTreeMap::from([(0, vec![adj])]),
        )
        .unwrap_err();
        assert!(matches!(err, ArrayError::UnsupportedKind { .. }));
    }

    #[test]
    fn test_traverse_rejects_bad_window_lengths() {
        let arr = AdjustedArray::from_buffer(ones(4, 1));
        assert_eq!(
            arr.traverse(0, 0).unwrap_err(),
            ArrayError::InvalidWindowLength { length: 0, rows: 4 }
        );
        assert_eq!(
            arr.traverse(5, 0).unwrap_err(),
            ArrayError::InvalidWindowLength { length: 5, rows: 4 }
        );
    }

    #[test]
    fn test_inspect_applies_everything() {
        let data = array![[10.0, 20.0], [10.0, 20.0], [10.0, 20.0]];
        let arr = AdjustedArray::new(
            data,
            BTreeMap::from([(0, vec![mul(1, 2, 0, 0.5)])]),
        )
        .unwrap();
        assert_eq!(
            arr.inspect(),
            array![[10.0, 20.0], [5.0, 20.0], [5.0, 20.0]]
        );
    }

    #[test]
    fn test_inspect_orders_by_effective_row_then_insertion() {
        // Overwrite effective later than the multiply must win even though
        // it was registered first within the column list.
        let data = ones(3, 1);
        let over =
            Adjustment::new(2, 2, 0, 0, 7.0, AdjustmentKind::Overwrite).unwrap();
        let arr = AdjustedArray::new(
            data,
            BTreeMap::from([(0, vec![over, mul(0, 2, 0, 3.0)])]),
        )
        .unwrap();
        assert_eq!(arr.inspect(), array![[3.0], [3.0], [7.0]]);
    }

    #[test]
    fn test_same_effective_row_ties_apply_in_insertion_order() {
        // Two corrections to one rectangle, both effective session 1: the
        // Add registered first composes first, (10 + 2) * 3, not
        // 10 * 3 + 2.
        let add = Adjustment::new(1, 2, 0, 0, 2.0, AdjustmentKind::Add).unwrap();
        let times3 = mul(1, 2, 0, 3.0);
        let arr = AdjustedArray::new(
            Array2::from_elem((3, 1), 10.0),
            BTreeMap::from([(0, vec![add, times3])]),
        )
        .unwrap();
        assert_eq!(arr.inspect(), array![[10.0], [36.0], [36.0]]);
        let last = arr.traverse(3, 0).unwrap().last().unwrap();
        assert_eq!(last.column(0).to_vec(), vec![10.0, 36.0, 36.0]);

        // Reversed registration composes the other way around.
        let arr = AdjustedArray::new(
            Array2::from_elem((3, 1), 10.0),
            BTreeMap::from([(0, vec![times3, add])]),
        )
        .unwrap();
        assert_eq!(arr.inspect(), array![[10.0], [32.0], [32.0]]);
        let last = arr.traverse(3, 0).unwrap().last().unwrap();
        assert_eq!(last.column(0).to_vec(), vec![10.0, 32.0, 32.0]);
    }

    #[test]
    fn test_dividend_ratio_compounds_with_split() {
        // A cash-dividend ratio effective session 1 and a 3:1 split
        // effective session 2 compound multiplicatively on session 2.
        let arr = AdjustedArray::new(
            Array2::from_elem((3, 1), 30.0),
            BTreeMap::from([(0, vec![mul(1, 2, 0, 0.97), mul(2, 2, 0, 1.0 / 3.0)])]),
        )
        .unwrap();
        let out = arr.inspect();
        assert_relative_eq!(out[(0, 0)], 30.0, epsilon = 1e-12);
        assert_relative_eq!(out[(1, 0)], 30.0 * 0.97, epsilon = 1e-12);
        assert_relative_eq!(out[(2, 0)], 30.0 * 0.97 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_update_adjustments_replaces_and_validates() {
        let mut arr = AdjustedArray::from_buffer(ones(3, 2));
        arr.update_adjustments(1, vec![mul(0, 2, 1, 2.0)]).unwrap();
        assert_eq!(arr.inspect(), array![[1.0, 2.0], [1.0, 2.0], [1.0, 2.0]]);

        let err = arr.update_adjustments(5, vec![]).unwrap_err();
        assert_eq!(err, ArrayError::ColumnOutOfBounds { column: 5, cols: 2 });

        // A failed update must leave the previous list intact.
        let err = arr.update_adjustments(1, vec![mul(0, 9, 1, 2.0)]).unwrap_err();
        assert!(matches!(err, ArrayError::RectangleOutOfBounds { .. }));
        assert_eq!(arr.adjustments(1).len(), 1);
    }

    #[test]
    fn test_label_buffer_reclassification() {
        // Sector reclassification: asset 1 moves from energy to tech
        // effective session 2, recorded as an overwrite of its codes.
        let mut sectors = crate::Factorizer::with_categories(["tech", "energy"]).unwrap();
        let tech = sectors.encode(&"tech").unwrap();
        let energy = sectors.encode(&"energy").unwrap();
        let data =
            Array2::from_shape_fn((4, 2), |(_, col)| if col == 0 { tech } else { energy });
        let adj = Adjustment::new(2, 3, 1, 1, tech, AdjustmentKind::Overwrite).unwrap();
        let arr = AdjustedArray::new(data, BTreeMap::from([(1, vec![adj])])).unwrap();
        let out = arr.inspect();
        assert_eq!(out[(1, 1)], energy);
        assert_eq!(out[(2, 1)], tech);
        assert_eq!(*sectors.decode(out[(3, 1)]).unwrap(), "tech");
    }

    #[test]
    fn test_disjoint_rectangles_commute() {
        // Adjustments over non-overlapping regions must compose to the
        // same result in any registration order.
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let data = Array2::from_shape_fn((8, 6), |_| rng.gen_range(1.0..100.0));
            // Columns 0-2 and 3-5 never overlap.
            let left = Adjustment::new(
                rng.gen_range(0..4),
                rng.gen_range(4..8),
                0,
                2,
                rng.gen_range(0.1..2.0),
                AdjustmentKind::Multiply,
            )
            .unwrap();
            let right = Adjustment::new(
                rng.gen_range(0..4),
                rng.gen_range(4..8),
                3,
                5,
                rng.gen_range(-5.0..5.0),
                AdjustmentKind::Add,
            )
            .unwrap();

            let ab = AdjustedArray::new(
                data.clone(),
                BTreeMap::from([(0, vec![left, right])]),
            )
            .unwrap();
            let ba = AdjustedArray::new(
                data,
                BTreeMap::from([(0, vec![right, left])]),
            )
            .unwrap();
            assert_eq!(ab.inspect(), ba.inspect());
        }
    }
}
