//! Cross-sectional ranking of windowed slices.
//!
//! Each row ranks independently across its unmasked cells, so a row is one
//! session's cross-section of assets. Masked cells (and NaN cells, which
//! carry no ordering information) pass through as NaN and never influence
//! their neighbors' ranks.

use derive_more::Display;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{ArrayError, Result};

/// Tie-break policy for equal values within one row.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RankMethod {
    /// Ties broken by column index; ranks are strictly increasing.
    Ordinal,
    /// Every member of a tie group takes the group's lowest rank.
    Min,
    /// Every member of a tie group takes the group's highest rank.
    Max,
    /// Gapless ranks; a tie group advances the rank by one.
    Dense,
    /// Every member of a tie group takes the mean of the ranks the group
    /// occupies.
    Average,
}

/// Per-row ranking with masking and tie-break policies.
///
/// Ranks are 1-based among the unmasked cells of each row. Output cells for
/// masked positions hold NaN. Sorting is the whole cost: `O(n log n)` per
/// row in the unmasked count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankEngine {
    method: RankMethod,
    ascending: bool,
}

impl RankEngine {
    /// Build an engine with the given tie-break method and direction.
    pub const fn new(method: RankMethod, ascending: bool) -> Self {
        Self { method, ascending }
    }

    /// The configured tie-break method.
    pub const fn method(&self) -> RankMethod {
        self.method
    }

    /// Whether ranks ascend with value.
    pub const fn ascending(&self) -> bool {
        self.ascending
    }

    /// Rank every row of `data` independently.
    ///
    /// `mask` cells set to `true` are excluded: they receive NaN and do not
    /// occupy a rank. NaN data cells are excluded the same way whether or
    /// not a mask is given. A row with no rankable cells comes back all
    /// NaN. Fails if the mask's shape differs from the data's.
    pub fn rank(&self, data: &Array2<f64>, mask: Option<&Array2<bool>>) -> Result<Array2<f64>> {
        let (rows, cols) = data.dim();
        if let Some(mask) = mask {
            let (mask_rows, mask_cols) = mask.dim();
            if (mask_rows, mask_cols) != (rows, cols) {
                return Err(ArrayError::MaskShapeMismatch {
                    mask_rows,
                    mask_cols,
                    rows,
                    cols,
                });
            }
        }

        let mut out = Array2::from_elem((rows, cols), f64::NAN);
        let mut order: Vec<(usize, f64)> = Vec::with_capacity(cols);
        for row in 0..rows {
            order.clear();
            for col in 0..cols {
                let excluded = mask.is_some_and(|m| m[(row, col)]);
                let value = data[(row, col)];
                if !excluded && !value.is_nan() {
                    order.push((col, value));
                }
            }
            // Stable sort keeps column order within tie groups, which is
            // exactly the ordinal tie-break.
            if self.ascending {
                order.sort_by(|a, b| a.1.total_cmp(&b.1));
            } else {
                order.sort_by(|a, b| b.1.total_cmp(&a.1));
            }
            self.assign_row(&order, row, &mut out);
        }
        Ok(out)
    }

    /// Walk one sorted row, emitting ranks tie group by tie group.
    fn assign_row(&self, order: &[(usize, f64)], row: usize, out: &mut Array2<f64>) {
        let mut start = 0;
        let mut dense_rank = 0;
        while start < order.len() {
            let mut end = start + 1;
            while end < order.len() && order[end].1 == order[start].1 {
                end += 1;
            }
            dense_rank += 1;
            // Positions are 1-based; the tie group occupies
            // [start + 1, end].
            for (position, &(col, _)) in order[start..end].iter().enumerate() {
                let rank = match self.method {
                    RankMethod::Ordinal => (start + 1 + position) as f64,
                    RankMethod::Min => (start + 1) as f64,
                    RankMethod::Max => end as f64,
                    RankMethod::Dense => f64::from(dense_rank),
                    RankMethod::Average => (start + 1 + end) as f64 / 2.0,
                };
                out[(row, col)] = rank;
            }
            start = end;
        }
    }
}
