//! String tag sets used for rule matching.
//!
//! Tiles carry solidity-exception queries, characters carry their own tags,
//! and damage typing compares ability tags against weakness / resistance /
//! immunity lists. Tags are stored ordered so serialized state is stable.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Ordered set of lowercase string tags.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TagSet(BTreeSet<String>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn insert(&mut self, tag: impl AsRef<str>) {
        let tag = tag.as_ref().trim();
        if !tag.is_empty() {
            self.0.insert(tag.to_ascii_lowercase());
        }
    }

    pub fn remove(&mut self, tag: &str) {
        self.0.remove(&tag.to_ascii_lowercase());
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(&tag.to_ascii_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Evaluates `query` against this set.
    ///
    /// Every plain entry of the query must be present and every `!`-prefixed
    /// entry must be absent. An empty query never matches.
    pub fn matches(&self, query: &TagSet) -> bool {
        if query.is_empty() {
            return false;
        }
        query.iter().all(|entry| match entry.strip_prefix('!') {
            Some(forbidden) => !self.contains(forbidden),
            None => self.contains(entry),
        })
    }

    /// Number of tags shared with `other` (negations are ignored).
    pub fn overlap(&self, other: &TagSet) -> usize {
        self.0.intersection(&other.0).count()
    }
}

impl FromStr for TagSet {
    type Err = std::convert::Infallible;

    /// Parses a comma separated list such as `"flying, undead"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.split(',').collect())
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for tag in self.iter() {
            if !first {
                f.write_str(",")?;
            }
            f.write_str(tag)?;
            first = false;
        }
        Ok(())
    }
}
