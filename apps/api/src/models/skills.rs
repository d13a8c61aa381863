use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A duplicate-free set of canonical skill names.
///
/// Members are expected to come from a `SkillCatalog` (via extraction or
/// `SkillCatalog::resolve`). Iteration order is lexical so reports and
/// recommendations are reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillSet(BTreeSet<String>);

impl SkillSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, skill: impl Into<String>) -> bool {
        self.0.insert(skill.into())
    }

    pub fn contains(&self, skill: &str) -> bool {
        self.0.contains(skill)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn intersection(&self, other: &SkillSet) -> SkillSet {
        SkillSet(self.0.intersection(&other.0).cloned().collect())
    }

    /// Members of `self` that are not in `other`.
    pub fn difference(&self, other: &SkillSet) -> SkillSet {
        SkillSet(self.0.difference(&other.0).cloned().collect())
    }

    pub fn union(&self, other: &SkillSet) -> SkillSet {
        SkillSet(self.0.union(&other.0).cloned().collect())
    }
}

impl<S: Into<String>> FromIterator<S> for SkillSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        SkillSet(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a SkillSet {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
