//! PositionSet: ordered set algebra over buffer positions
//!
//! The engine diffs coverage before and after an edit position by position.
//! A `BTreeSet` keeps the positions ordered so they can be handed to the
//! presentation layer as-is or coalesced back into spans.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::span::{EditRecord, Span};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionSet(BTreeSet<usize>);

impl PositionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every position of `span`
    pub fn from_span(span: Span) -> Self {
        Self(span.to_range().collect())
    }

    pub fn insert(&mut self, pos: usize) -> bool {
        self.0.insert(pos)
    }

    pub fn insert_span(&mut self, span: Span) {
        self.0.extend(span.to_range());
    }

    pub fn contains(&self, pos: usize) -> bool {
        self.0.contains(&pos)
    }

    /// True if any position of `span` is in the set
    pub fn intersects_span(&self, span: Span) -> bool {
        self.0.range(span.to_range()).next().is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    pub fn union(&self, other: &PositionSet) -> PositionSet {
        Self(self.0.union(&other.0).copied().collect())
    }

    pub fn intersection(&self, other: &PositionSet) -> PositionSet {
        Self(self.0.intersection(&other.0).copied().collect())
    }

    pub fn difference(&self, other: &PositionSet) -> PositionSet {
        Self(self.0.difference(&other.0).copied().collect())
    }

    pub fn is_disjoint(&self, other: &PositionSet) -> bool {
        self.0.is_disjoint(&other.0)
    }

    pub fn is_subset(&self, other: &PositionSet) -> bool {
        self.0.is_subset(&other.0)
    }

    /// Carry positions through an edit's translation law.
    ///
    /// Positions inside the replaced range no longer exist after the edit
    /// and are dropped, so the result never lands on text the edit did not
    /// leave in place.
    pub fn adjusted(&self, edit: &EditRecord) -> PositionSet {
        let replaced = edit.range.to_range();
        Self(
            self.0
                .iter()
                .filter(|pos| !replaced.contains(pos))
                .map(|&pos| edit.adjust(pos))
                .collect(),
        )
    }

    /// Maximal runs of consecutive positions, in order
    pub fn spans(&self) -> Vec<Span> {
        let mut spans: Vec<Span> = Vec::new();
        for pos in self.iter() {
            match spans.last_mut() {
                Some(last) if last.end() == pos => last.len += 1,
                _ => spans.push(Span::new(pos, 1)),
            }
        }
        spans
    }
}

impl FromIterator<usize> for PositionSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<usize> for PositionSet {
    fn extend<I: IntoIterator<Item = usize>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

// =============================================================================
// Tests
// =============================================================================
