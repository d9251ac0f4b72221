//! Rolling window traversal over an adjusted array.
//!
//! A [`Window`] is an explicit cursor: each [`next`](Iterator::next) call
//! materializes one fresh trailing slice with every adjustment knowable at
//! that slice's anchor session composed in, then advances one row. The
//! generator-style laziness of the design is carried by the `Iterator`
//! implementation; there is no suspension machinery to reason about.

use std::collections::BTreeMap;
use std::iter::FusedIterator;

use ndarray::{Array2, s};

use crate::adjustment::Adjustment;
use crate::element::Element;

/// Stateful cursor yielding successive adjusted window-sized slices.
///
/// Created by [`AdjustedArray::traverse`](crate::AdjustedArray::traverse).
/// The window owns a private copy of the data and a snapshot of the
/// adjustments taken at creation time, keyed by effective row. As the
/// anchor advances past an adjustment's effective row (plus the visibility
/// offset), the adjustment is composed into the private copy exactly once;
/// the cutoff only ever grows, so each `next` call pays for the window-sized
/// copy plus the newly visible adjustments, never the full history.
///
/// A window is not restartable: once exhausted it keeps yielding `None`,
/// and a fresh traversal requires a new `traverse` call on the source
/// array. Emitted slices are independent copies; callers may mutate them
/// freely without affecting the source or later slices.
#[derive(Debug)]
pub struct Window<T> {
    data: Array2<T>,
    /// Not-yet-applied adjustments, keyed by effective row.
    pending: BTreeMap<usize, Vec<Adjustment<T>>>,
    window_length: usize,
    offset: usize,
    /// Row the next emitted slice ends at; rows() once exhausted.
    anchor: usize,
}

impl<T: Element> Window<T> {
    pub(crate) fn new(
        data: Array2<T>,
        pending: BTreeMap<usize, Vec<Adjustment<T>>>,
        window_length: usize,
        offset: usize,
    ) -> Self {
        Self {
            data,
            pending,
            window_length,
            offset,
            anchor: window_length - 1,
        }
    }

    /// Length of each emitted slice, in rows.
    pub const fn window_length(&self) -> usize {
        self.window_length
    }

    /// Visibility offset added to the anchor when deciding which
    /// adjustments are knowable.
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Whether the last slice has already been emitted.
    pub fn is_exhausted(&self) -> bool {
        self.anchor >= self.data.nrows()
    }

    /// Compose every adjustment whose effective row is `<= cutoff` into the
    /// private copy, removing it from the pending schedule.
    fn apply_through(&mut self, cutoff: usize) {
        let later = cutoff
            .checked_add(1)
            .map_or_else(BTreeMap::new, |first_later| self.pending.split_off(&first_later));
        for (_, batch) in std::mem::replace(&mut self.pending, later) {
            for adj in batch {
                adj.apply_to(&mut self.data);
            }
        }
    }
}

impl<T: Element> Iterator for Window<T> {
    type Item = Array2<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_exhausted() {
            return None;
        }
        self.apply_through(self.anchor.saturating_add(self.offset));
        let start = self.anchor + 1 - self.window_length;
        let slice = self.data.slice(s![start..=self.anchor, ..]).to_owned();
        self.anchor += 1;
        Some(slice)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.data.nrows() - self.anchor.min(self.data.nrows());
        (remaining, Some(remaining))
    }
}

impl<T: Element> ExactSizeIterator for Window<T> {}

impl<T: Element> FusedIterator for Window<T> {}
