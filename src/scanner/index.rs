//! MatchIndex: the committed, non-overlapping matches of a document
//!
//! Matches are keyed by start position. Because no two matches overlap, the
//! ordering by start is also an ordering by end, which keeps region lookups
//! to a range scan plus one predecessor check.
//!
//! # Rebuild rule
//! Within one rebuild pass the first detector (list order) wins, and within a
//! detector the first returned span wins. A span that collides with any
//! position already claimed in the pass is discarded whole, never trimmed.

use std::collections::BTreeMap;
use tracing::{trace, warn};

use crate::error::{Result, ScanError};

use super::buffer::TextBuffer;
use super::detector::SharedDetector;
use super::intern::MatchTag;
use super::positions::PositionSet;
use super::span::{EditRecord, Span};

/// A committed detection result
#[derive(Debug, Clone, PartialEq)]
pub struct Match<S> {
    pub span: Span,
    pub tag: MatchTag,
    pub animates: bool,
    pub style: S,
}

#[derive(Debug, Clone)]
pub struct MatchIndex<S> {
    matches: BTreeMap<usize, Match<S>>,
    contract_violations: u64,
}

impl<S> Default for MatchIndex<S> {
    fn default() -> Self {
        Self {
            matches: BTreeMap::new(),
            contract_violations: 0,
        }
    }
}

impl<S: Clone> MatchIndex<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn clear(&mut self) {
        self.matches.clear();
    }

    /// All matches in position order
    pub fn iter(&self) -> impl Iterator<Item = &Match<S>> {
        self.matches.values()
    }

    /// Detector spans dropped for lying outside their fragment
    pub fn contract_violations(&self) -> u64 {
        self.contract_violations
    }

    fn intersecting_keys(&self, region: Span) -> Vec<usize> {
        if region.is_empty() {
            return Vec::new();
        }
        let mut keys = Vec::new();
        if let Some((&key, m)) = self.matches.range(..region.start).next_back() {
            if m.span.intersects(&region) {
                keys.push(key);
            }
        }
        keys.extend(self.matches.range(region.to_range()).map(|(&key, _)| key));
        keys
    }

    /// Matches sharing a position with `region`, in order
    pub fn intersecting(&self, region: Span) -> impl Iterator<Item = &Match<S>> {
        self.intersecting_keys(region)
            .into_iter()
            .filter_map(move |key| self.matches.get(&key))
    }

    /// Match covering `pos`, if any
    pub fn match_at(&self, pos: usize) -> Option<&Match<S>> {
        self.matches
            .range(..=pos)
            .next_back()
            .map(|(_, m)| m)
            .filter(|m| m.span.contains(pos))
    }

    pub fn style_at(&self, pos: usize) -> Option<&S> {
        self.match_at(pos).map(|m| &m.style)
    }

    /// Positions inside `region` that carry a match
    pub fn positions_covered(&self, region: Span) -> PositionSet {
        let mut covered = PositionSet::new();
        for m in self.intersecting(region) {
            if let Some(part) = m.span.intersection(&region) {
                covered.insert_span(part);
            }
        }
        covered
    }

    /// Spans of matches passing `predicate`, clipped to `within`
    pub fn matches_where<F>(&self, within: Span, predicate: F) -> Vec<Span>
    where
        F: Fn(&Match<S>) -> bool,
    {
        self.intersecting(within)
            .filter(|m| predicate(m))
            .filter_map(|m| m.span.intersection(&within))
            .collect()
    }

    pub fn ranges_of(&self, tag: MatchTag, within: Span) -> Vec<Span> {
        self.matches_where(within, |m| m.tag == tag)
    }

    pub fn animatable_ranges(&self, within: Span) -> Vec<Span> {
        self.matches_where(within, |m| m.animates)
    }

    pub fn static_ranges(&self, within: Span) -> Vec<Span> {
        self.matches_where(within, |m| !m.animates)
    }

    /// Carry stored matches through an edit.
    ///
    /// Matches ending at or before the edit start stay put, matches starting
    /// at or after the end of the replaced text move by `delta`. Anything
    /// else had its text touched and is removed; the post-edit extent it
    /// occupied is returned so the caller can re-examine it.
    pub fn shift(&mut self, edit: &EditRecord) -> Vec<Span> {
        let edit_start = edit.range.start;
        let old_end = edit.range.end();
        let mut invalidated = Vec::new();

        let invalidated_extent = |span: Span| {
            let start = span.start.min(edit_start);
            let end = if span.end() > old_end {
                (span.end() as i64 + edit.delta) as usize
            } else {
                edit_start + edit.replacement_len
            };
            Span::from_bounds(start, end)
        };

        let tail = self.matches.split_off(&edit_start);

        let straddles = self
            .matches
            .last_key_value()
            .is_some_and(|(_, m)| m.span.end() > edit_start);
        if straddles {
            if let Some((_, m)) = self.matches.pop_last() {
                invalidated.push(invalidated_extent(m.span));
            }
        }

        for (_, mut m) in tail {
            if m.span.start >= old_end {
                m.span.start = (m.span.start as i64 + edit.delta) as usize;
                self.matches.insert(m.span.start, m);
            } else {
                invalidated.push(invalidated_extent(m.span));
            }
        }

        invalidated
    }

    /// Drop every match intersecting `region`, returning their spans
    pub fn clear_region(&mut self, region: Span) -> Vec<Span> {
        self.intersecting_keys(region)
            .into_iter()
            .filter_map(|key| self.matches.remove(&key))
            .map(|m| m.span)
            .collect()
    }

    /// Re-run detection over `region` and commit the winners.
    ///
    /// Returns the positions covered inside `region` afterwards.
    pub fn rebuild(
        &mut self,
        region: Span,
        buffer: &TextBuffer,
        detectors: &[SharedDetector<S>],
    ) -> Result<PositionSet> {
        let fragment = buffer.substring(region)?;
        self.clear_region(region);

        let mut claimed = PositionSet::new();
        for detector in detectors {
            let tag = detector.tag();
            for span in detector.detect(fragment) {
                if span.is_empty() {
                    continue;
                }
                let in_bounds = span.end() <= fragment.len()
                    && fragment.is_char_boundary(span.start)
                    && fragment.is_char_boundary(span.end());
                if !in_bounds {
                    let violation = ScanError::DetectorContractViolation {
                        tag: tag.to_string(),
                        span,
                        fragment_len: fragment.len(),
                    };
                    warn!(%violation, "dropping detector span");
                    self.contract_violations += 1;
                    continue;
                }
                if claimed.intersects_span(span) {
                    trace!(%tag, start = span.start, len = span.len, "span lost to earlier claim");
                    continue;
                }
                claimed.insert_span(span);

                let absolute = span.offset_by(region.start);
                self.matches.insert(
                    absolute.start,
                    Match {
                        span: absolute,
                        tag,
                        animates: detector.animates(),
                        style: detector.style(),
                    },
                );
            }
        }

        Ok(self.positions_covered(region))
    }
}

// =============================================================================
// Tests
// =============================================================================
