// 🏷️ Label Encoder - Categorical feature encoding
// Maps category names to stable integer codes (alphabetical order of the
// observed classes), so "accommodation" is always 0, "entertainment" 1, etc.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Fitted categorical encoder.
///
/// A label's code is its position in the sorted `classes` list. Fitting the
/// same set of labels always produces the same mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Fit the encoder on observed labels (duplicates allowed).
    pub fn fit<'a, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut classes: Vec<String> = labels.into_iter().map(|l| l.to_string()).collect();
        classes.sort();
        classes.dedup();
        LabelEncoder { classes }
    }

    /// Encode a label to its integer code.
    pub fn transform(&self, label: &str) -> Result<usize> {
        match self.classes.binary_search_by(|c| c.as_str().cmp(label)) {
            Ok(code) => Ok(code),
            Err(_) => bail!("unknown category label: '{}'", label),
        }
    }

    /// Decode an integer code back to its label.
    pub fn inverse_transform(&self, code: usize) -> Result<&str> {
        match self.classes.get(code) {
            Some(class) => Ok(class.as_str()),
            None => bail!(
                "category code {} out of range (have {} classes)",
                code,
                self.classes.len()
            ),
        }
    }

    /// Sorted class names.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================
