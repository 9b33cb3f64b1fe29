//! Incremental detection engine: per-edit rescan and delta reporting
//!
//! Each edit re-runs detection only over the sentences it touched and
//! reports which positions gained or lost a match.
//!
//! # Pipeline
//! - **Snapshot**: positions covered before the edit
//! - **Replace**: mutate the buffer, get an `EditRecord`
//! - **Shift**: carry stored matches through the edit, drop touched ones
//! - **Scope**: pick sentence regions around the edit and any dropped matches
//! - **Rebuild**: rerun detectors over each region
//! - **Diff**: compare adjusted prior coverage with new coverage over the
//!   examined positions only

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Result, ScanError};

use super::buffer::TextBuffer;
use super::detector::SharedDetector;
use super::index::{Match, MatchIndex};
use super::intern::MatchTag;
use super::notifier::{ChangeNotifier, ChangeObserver};
use super::positions::PositionSet;
use super::segment::{full_scope, scan_scope, ScanGranularity, ScopeRequest};
use super::span::Span;

// =============================================================================
// State Machine
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// No edit in flight
    Idle,
    /// Buffer and stored matches are being updated
    Editing,
    /// Detectors are running over the scan scope
    Reconciling,
}

// =============================================================================
// Core Types
// =============================================================================

/// Positions that gained or lost a match in one committed change
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delta {
    pub added: PositionSet,
    pub removed: PositionSet,
}

impl Delta {
    /// `added = new - old`, `removed = old - new`
    pub fn between(old: &PositionSet, new: &PositionSet) -> Self {
        Self {
            added: new.difference(old),
            removed: old.difference(new),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    pub fn added_spans(&self) -> Vec<Span> {
        self.added.spans()
    }

    pub fn removed_spans(&self) -> Vec<Span> {
        self.removed.spans()
    }
}

/// Statistics for the engine's lifetime
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineStats {
    /// Edits committed through `apply_edit`
    pub edit_count: u64,
    /// Full-buffer rebuilds (refresh or detector swap)
    pub refresh_count: u64,
    /// Regions handed to `MatchIndex::rebuild`
    pub regions_rescanned: u64,
    /// Bytes of text those regions covered
    pub bytes_rescanned: u64,
    /// Detector spans dropped for violating the detector contract
    pub contract_violations: u64,
    /// Wall time of the last edit in milliseconds
    pub last_edit_ms: f64,
}

// =============================================================================
// IncrementalDetectionEngine
// =============================================================================

/// One engine per document. Owns the text and the committed matches;
/// detectors are shared with whoever configured them.
pub struct IncrementalDetectionEngine<S> {
    buffer: TextBuffer,
    index: MatchIndex<S>,
    detectors: Vec<SharedDetector<S>>,
    notifier: ChangeNotifier,
    granularity: ScanGranularity,
    rescan_trailing_deletion: bool,
    state: State,
    stats: EngineStats,
}

impl<S: Clone> IncrementalDetectionEngine<S> {
    /// Empty document with the given detectors, highest priority first
    pub fn new(detectors: Vec<SharedDetector<S>>) -> Self {
        Self {
            buffer: TextBuffer::new(),
            index: MatchIndex::new(),
            detectors,
            notifier: ChangeNotifier::new(),
            granularity: ScanGranularity::default(),
            rescan_trailing_deletion: true,
            state: State::Idle,
            stats: EngineStats::default(),
        }
    }

    pub fn with_granularity(mut self, granularity: ScanGranularity) -> Self {
        self.granularity = granularity;
        self
    }

    pub fn with_trailing_deletion_rescan(mut self, enabled: bool) -> Self {
        self.rescan_trailing_deletion = enabled;
        self
    }

    pub fn granularity(&self) -> ScanGranularity {
        self.granularity
    }

    pub fn text(&self) -> &str {
        self.buffer.as_str()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn detectors(&self) -> &[SharedDetector<S>] {
        &self.detectors
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// Current state name (for debugging)
    pub fn state_name(&self) -> &'static str {
        match self.state {
            State::Idle => "idle",
            State::Editing => "editing",
            State::Reconciling => "reconciling",
        }
    }

    pub fn subscribe(&mut self, observer: impl ChangeObserver + 'static) {
        self.notifier.subscribe(observer);
    }

    // -------------------------------------------------------------------------
    // Edits
    // -------------------------------------------------------------------------

    /// Replace `range` with `replacement`, rescan around it and report the
    /// change in coverage. A range outside the buffer or splitting a
    /// character is rejected before the buffer or the matches are touched.
    pub fn apply_edit(&mut self, range: Span, replacement: &str) -> Result<Delta> {
        let started = instant::Instant::now();
        self.state = State::Editing;
        let result = self.run_edit(range, replacement);
        self.state = State::Idle;

        let delta = result?;
        self.stats.edit_count += 1;
        self.stats.last_edit_ms = started.elapsed().as_secs_f64() * 1000.0;
        self.notifier.notify(&delta);
        Ok(delta)
    }

    pub fn insert(&mut self, position: usize, text: &str) -> Result<Delta> {
        self.apply_edit(Span::new(position, 0), text)
    }

    pub fn delete(&mut self, range: Span) -> Result<Delta> {
        self.apply_edit(range, "")
    }

    fn run_edit(&mut self, range: Span, replacement: &str) -> Result<Delta> {
        let prior = self.index.positions_covered(self.buffer.full_span());
        let record = self.buffer.replace(range, replacement)?;
        let invalidated = self.index.shift(&record);

        let scope = scan_scope(
            self.buffer.as_str(),
            ScopeRequest {
                edit: &record,
                invalidated: &invalidated,
                granularity: self.granularity,
                rescan_trailing_deletion: self.rescan_trailing_deletion,
            },
        );

        self.state = State::Reconciling;
        let mut examined = self.reconcile(&scope)?;
        for &extent in &invalidated {
            examined.insert_span(extent);
        }

        // Prior positions inside the replaced text have no post-edit
        // counterpart; the match that held them is already in `invalidated`.
        let old = prior.adjusted(&record).intersection(&examined);
        let new = self.index.positions_covered(self.buffer.full_span()).intersection(&examined);
        let delta = Delta::between(&old, &new);

        debug!(
            start = record.range.start,
            delta = record.delta,
            regions = scope.len(),
            invalidated = invalidated.len(),
            added = delta.added.len(),
            removed = delta.removed.len(),
            "edit committed"
        );
        Ok(delta)
    }

    /// Rebuild every region in `scope`. Returns the examined positions: the
    /// regions plus the full extent of any match cleared while rebuilding.
    fn reconcile(&mut self, scope: &[Span]) -> Result<PositionSet> {
        let mut examined = PositionSet::new();
        for &region in scope {
            let cleared: Vec<Span> = self.index.intersecting(region).map(|m| m.span).collect();
            for span in cleared {
                examined.insert_span(span);
            }
            examined.insert_span(region);

            let covered = self.index.rebuild(region, &self.buffer, &self.detectors)?;
            trace!(start = region.start, len = region.len, covered = covered.len(), "region rebuilt");

            self.stats.regions_rescanned += 1;
            self.stats.bytes_rescanned += region.len as u64;
        }
        self.stats.contract_violations = self.index.contract_violations();
        Ok(examined)
    }

    // -------------------------------------------------------------------------
    // Full rebuilds
    // -------------------------------------------------------------------------

    /// Discard every match and re-run detection over the whole buffer
    pub fn refresh(&mut self) -> Result<Delta> {
        self.state = State::Reconciling;
        let result = self.run_refresh();
        self.state = State::Idle;

        let delta = result?;
        self.stats.refresh_count += 1;
        self.notifier.notify(&delta);
        Ok(delta)
    }

    /// Replace the detector list and rebuild everything with it
    pub fn set_detectors(&mut self, detectors: Vec<SharedDetector<S>>) -> Result<Delta> {
        self.detectors = detectors;
        self.refresh()
    }

    fn run_refresh(&mut self) -> Result<Delta> {
        let whole = self.buffer.full_span();
        let prior = self.index.positions_covered(whole);

        self.index.clear();
        let scope = full_scope(self.buffer.as_str(), self.granularity);
        self.reconcile(&scope)?;

        let delta = Delta::between(&prior, &self.index.positions_covered(whole));
        debug!(
            regions = scope.len(),
            matches = self.index.len(),
            added = delta.added.len(),
            removed = delta.removed.len(),
            "full refresh"
        );
        Ok(delta)
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    fn check_window(&self, within: Span) -> Result<()> {
        if !within.fits_within(self.buffer.len()) {
            return Err(ScanError::OutOfBounds {
                span: within,
                len: self.buffer.len(),
            });
        }
        Ok(())
    }

    /// Spans tagged `tag` inside `within`, clipped and in order
    pub fn ranges_of(&self, tag: MatchTag, within: Span) -> Result<Vec<Span>> {
        self.check_window(within)?;
        Ok(self.index.ranges_of(tag, within))
    }

    /// Spans whose animation flag equals `animates`
    pub fn matches_where(&self, animates: bool, within: Span) -> Result<Vec<Span>> {
        self.check_window(within)?;
        Ok(self.index.matches_where(within, |m| m.animates == animates))
    }

    pub fn animatable_ranges(&self, within: Span) -> Result<Vec<Span>> {
        self.check_window(within)?;
        Ok(self.index.animatable_ranges(within))
    }

    pub fn static_ranges(&self, within: Span) -> Result<Vec<Span>> {
        self.check_window(within)?;
        Ok(self.index.static_ranges(within))
    }

    pub fn match_at(&self, position: usize) -> Option<&Match<S>> {
        self.index.match_at(position)
    }

    pub fn style_at(&self, position: usize) -> Option<&S> {
        self.index.style_at(position)
    }

    /// All committed matches in position order
    pub fn matches(&self) -> impl Iterator<Item = &Match<S>> {
        self.index.iter()
    }

    /// Positions currently carrying a match
    pub fn covered(&self) -> PositionSet {
        self.index.positions_covered(self.buffer.full_span())
    }
}

impl<S> std::fmt::Debug for IncrementalDetectionEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IncrementalDetectionEngine")
            .field("len", &self.buffer.len())
            .field("detectors", &self.detectors.len())
            .field("granularity", &self.granularity)
            .field("state", &self.state)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
