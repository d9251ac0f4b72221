//! Dense integer coding for categorical columns.
//!
//! Classifier terms operate on label buffers, which store [`LabelCode`]s
//! rather than the raw values (tickers, sector names, exchange ids). A
//! [`Factorizer`] owns the bidirectional value ↔ code map for one
//! categorical column within one load chunk and is discarded with it.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::element::{Element, LabelCode};
use crate::error::{ArrayError, Result};

/// Bidirectional map from discrete values to dense integer codes.
///
/// Codes are allocated from zero in first-seen order and are stable for the
/// factorizer's lifetime: the same value always encodes to the same code.
/// `-1` is never issued; it is the label missing sentinel.
///
/// In the default growing mode the vocabulary extends on demand. A
/// fixed-vocabulary factorizer built with
/// [`with_categories`](Self::with_categories) is closed: codes come from
/// the supplied order, so two factorizers built from the same list agree on
/// every code without any shared state, and encoding an unlisted value is
/// an error. That determinism is what makes label codes comparable across
/// independently loaded chunks.
#[derive(Debug, Clone)]
pub struct Factorizer<T> {
    codes: HashMap<T, i64>,
    categories: Vec<T>,
    fixed: bool,
}

impl<T: Eq + Hash + Clone + Debug> Factorizer<T> {
    /// An empty factorizer with a growing vocabulary.
    pub fn new() -> Self {
        Self {
            codes: HashMap::new(),
            categories: Vec::new(),
            fixed: false,
        }
    }

    /// A fixed-vocabulary factorizer; codes follow the supplied order.
    ///
    /// Fails on a duplicate category, which would make codes ambiguous.
    pub fn with_categories<I>(categories: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
    {
        let mut factorizer = Self::new();
        for value in categories {
            if factorizer.codes.contains_key(&value) {
                return Err(ArrayError::DuplicateCategory(format!("{value:?}")));
            }
            factorizer.insert(value);
        }
        factorizer.fixed = true;
        Ok(factorizer)
    }

    /// Number of distinct values seen so far.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Whether no values have been registered.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Whether the vocabulary is closed.
    pub const fn is_fixed(&self) -> bool {
        self.fixed
    }

    /// The code for `value`, allocating the next unused code on first
    /// sight.
    ///
    /// Fails for a value outside a fixed vocabulary.
    pub fn encode(&mut self, value: &T) -> Result<LabelCode> {
        if let Some(&code) = self.codes.get(value) {
            return Ok(LabelCode(code));
        }
        if self.fixed {
            return Err(ArrayError::UnknownCategory(format!("{value:?}")));
        }
        Ok(LabelCode(self.insert(value.clone())))
    }

    /// Encode one optional-valued column, mapping `None` to the label
    /// missing sentinel.
    ///
    /// This is the bridge between a loader's raw categorical column and a
    /// label buffer.
    pub fn encode_all(&mut self, values: &[Option<T>]) -> Result<Vec<LabelCode>> {
        values
            .iter()
            .map(|value| match value {
                Some(value) => self.encode(value),
                None => Ok(LabelCode::MISSING),
            })
            .collect()
    }

    /// The value behind `code`.
    ///
    /// Fails for any code this factorizer never issued, including the
    /// missing sentinel.
    pub fn decode(&self, code: LabelCode) -> Result<&T> {
        usize::try_from(code.0)
            .ok()
            .and_then(|index| self.categories.get(index))
            .ok_or(ArrayError::UnknownCode(code.0))
    }

    fn insert(&mut self, value: T) -> i64 {
        let code = self.categories.len() as i64;
        self.codes.insert(value.clone(), code);
        self.categories.push(value);
        code
    }
}

impl<T: Eq + Hash + Clone + Debug> Default for Factorizer<T> {
    fn default() -> Self {
        Self::new()
    }
}
