//! Core value types: crate names, implementor fragments and payloads.

use crate::error::InvalidCrateName;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

static CRATE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("valid crate name regex"));

/// A validated library identifier, the key of a [`Payload`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CrateName(String);

impl CrateName {
    /// Validate and wrap a crate name.
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidCrateName> {
        let name = name.into();
        if CRATE_NAME_RE.is_match(&name) {
            Ok(Self(name))
        } else {
            Err(InvalidCrateName(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CrateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CrateName {
    type Err = InvalidCrateName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CrateName {
    type Error = InvalidCrateName;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CrateName> for String {
    fn from(name: CrateName) -> Self {
        name.0
    }
}

impl Borrow<str> for CrateName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// One pre-rendered implementor fragment.
///
/// Opaque HTML produced by the documentation generator. It is displayed as-is and
/// never parsed; cloning shares the underlying buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Implementor(Arc<str>);

impl Implementor {
    pub fn new(html: impl Into<Arc<str>>) -> Self {
        Self(html.into())
    }

    pub fn html(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Implementor {
    fn from(html: &str) -> Self {
        Self::new(html)
    }
}

impl From<String> for Implementor {
    fn from(html: String) -> Self {
        Self::new(html)
    }
}

/// Implementor lists keyed by the crate that contributed them.
///
/// This is the wire shape shared by every data file: a JSON object mapping crate
/// name to an array of fragment strings. Each list keeps the order it was given in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload {
    entries: BTreeMap<CrateName, Vec<Implementor>>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, convenient for literals and tests.
    #[must_use]
    pub fn with<I, T>(mut self, crate_name: CrateName, implementors: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Implementor>,
    {
        self.insert(crate_name, implementors.into_iter().map(Into::into).collect());
        self
    }

    /// Set the implementor list for a crate, replacing any previous list.
    pub fn insert(
        &mut self,
        crate_name: CrateName,
        implementors: Vec<Implementor>,
    ) -> Option<Vec<Implementor>> {
        self.entries.insert(crate_name, implementors)
    }

    pub fn get(&self, crate_name: &str) -> Option<&[Implementor]> {
        self.entries.get(crate_name).map(Vec::as_slice)
    }

    pub fn contains(&self, crate_name: &str) -> bool {
        self.entries.contains_key(crate_name)
    }

    /// Fold `other` into `self`; keys present in both take `other`'s list.
    pub fn merge(&mut self, other: Self) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn crate_names(&self) -> impl Iterator<Item = &CrateName> {
        self.entries.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, CrateName, Vec<Implementor>> {
        self.entries.iter()
    }
}

impl IntoIterator for Payload {
    type Item = (CrateName, Vec<Implementor>);
    type IntoIter = btree_map::IntoIter<CrateName, Vec<Implementor>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Payload {
    type Item = (&'a CrateName, &'a Vec<Implementor>);
    type IntoIter = btree_map::Iter<'a, CrateName, Vec<Implementor>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<(CrateName, Vec<Implementor>)> for Payload {
    fn from_iter<T: IntoIterator<Item = (CrateName, Vec<Implementor>)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
