//! Categorical encoders persisted between fit and apply runs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sentinel code for values unseen during fitting.
pub const UNSEEN_CODE: i64 = -1;

/// A bijection between the distinct string values seen during fitting and
/// dense integer codes `0..k-1`.
///
/// Codes are assigned over the sorted value set, so fitting the same values
/// in any order yields the same codes. Encoding a value outside the fitted
/// set returns [`UNSEEN_CODE`], never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalEncoder {
    classes: Vec<String>,
}

impl CategoricalEncoder {
    /// Fit an encoder over the distinct values in `values`.
    pub fn fit<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut classes: Vec<String> = values.into_iter().map(Into::into).collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    /// Encode a value, returning [`UNSEEN_CODE`] for anything not fitted.
    pub fn encode(&self, value: &str) -> i64 {
        // classes is sorted and deduplicated, so binary search doubles as the
        // code lookup
        match self.classes.binary_search_by(|c| c.as_str().cmp(value)) {
            Ok(idx) => idx as i64,
            Err(_) => UNSEEN_CODE,
        }
    }

    /// Reverse lookup of a code.
    pub fn decode(&self, code: i64) -> Option<&str> {
        if code < 0 {
            return None;
        }
        self.classes.get(code as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

/// The full set of fitted encoders, keyed by field name.
///
/// Built once during a fit run and persisted as a single artifact; loaded
/// wholesale at apply time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncoderTable {
    encoders: BTreeMap<String, CategoricalEncoder>,
}

impl EncoderTable {
    pub fn insert(&mut self, field: impl Into<String>, encoder: CategoricalEncoder) {
        self.encoders.insert(field.into(), encoder);
    }

    pub fn get(&self, field: &str) -> Option<&CategoricalEncoder> {
        self.encoders.get(field)
    }

    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.encoders.keys().map(String::as_str)
    }
}
