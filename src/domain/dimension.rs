//! Categorical dimension lookups (label -> surrogate key).

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

/// The categorical dimensions the feature vector depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Gender,
    Race,
    Ethnicity,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gender => write!(f, "gender"),
            Self::Race => write!(f, "race"),
            Self::Ethnicity => write!(f, "ethnicity"),
        }
    }
}

/// Lower-cased label to integer key mapping for one dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DimensionLookup {
    entries: HashMap<String, i64>,
}

impl DimensionLookup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a label, lower-casing it first.
    ///
    /// Returns the key previously stored under the normalized label, if any.
    /// The new key always wins.
    pub fn insert(&mut self, label: &str, key: i64) -> Option<i64> {
        self.entries.insert(label.to_lowercase(), key)
    }

    /// Resolve a label case-insensitively.
    #[must_use]
    pub fn resolve(&self, label: &str) -> Option<i64> {
        self.entries.get(&label.to_lowercase()).copied()
    }

    /// Known labels, sorted for stable output.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.entries.keys().cloned().collect();
        labels.sort();
        labels
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<(S, i64)> for DimensionLookup {
    fn from_iter<I: IntoIterator<Item = (S, i64)>>(iter: I) -> Self {
        let mut lookup = Self::new();
        for (label, key) in iter {
            lookup.insert(label.as_ref(), key);
        }
        lookup
    }
}

/// The three lookups consulted by the feature vector builder.
///
/// Immutable once built; a reload produces a whole new set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DimensionSet {
    pub gender: DimensionLookup,
    pub race: DimensionLookup,
    pub ethnicity: DimensionLookup,
}

impl DimensionSet {
    #[must_use]
    pub fn new(gender: DimensionLookup, race: DimensionLookup, ethnicity: DimensionLookup) -> Self {
        Self {
            gender,
            race,
            ethnicity,
        }
    }

    #[must_use]
    pub fn lookup(&self, dimension: Dimension) -> &DimensionLookup {
        match dimension {
            Dimension::Gender => &self.gender,
            Dimension::Race => &self.race,
            Dimension::Ethnicity => &self.ethnicity,
        }
    }
}
