use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placeholder name to column name association.
///
/// Entries are applied in key order. Keys need not cover every placeholder,
/// and a column missing from the current dataset leaves its entry inert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mapping(BTreeMap<String, String>);

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column_for(&self, placeholder: &str) -> Option<&str> {
        self.0.get(placeholder).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(p, c)| (p.as_str(), c.as_str()))
    }
}

impl<P: Into<String>, C: Into<String>> FromIterator<(P, C)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (P, C)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(p, c)| (p.into(), c.into()))
                .collect(),
        )
    }
}
