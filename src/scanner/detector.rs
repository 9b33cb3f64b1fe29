//! Detector contract
//!
//! A detector is an opaque pattern matcher: given a fragment of text it
//! reports the spans it recognises, relative to the fragment start. It also
//! carries the tag, animation flag and style payload stamped onto every match
//! it produces. Detectors are trusted: a panicking detector takes the edit
//! down with it, while out-of-bounds spans are merely dropped by the index.
//!
//! Priority is list order. When two detectors claim the same text, the one
//! earlier in the engine's detector list wins.

use regex::Regex;
use std::fmt;
use std::rc::Rc;

use crate::error::{Result, ScanError};

use super::intern::MatchTag;
use super::span::Span;

pub trait Detector<S> {
    /// Category stamped onto every match from this detector
    fn tag(&self) -> MatchTag;

    /// Whether the presentation layer should animate matches
    fn animates(&self) -> bool;

    /// Opaque style payload, copied onto every committed match
    fn style(&self) -> S;

    /// Spans within `fragment`, relative to its start, in priority order.
    ///
    /// Must be pure: identical input gives identical output.
    fn detect(&self, fragment: &str) -> Vec<Span>;
}

/// Detectors are shared with the host, never owned by the engine
pub type SharedDetector<S> = Rc<dyn Detector<S>>;

// =============================================================================
// RegexDetector
// =============================================================================

/// Detector backed by a compiled regular expression.
///
/// Every non-overlapping match of the pattern becomes one span, in
/// left-to-right order.
pub struct RegexDetector<S> {
    tag: MatchTag,
    regex: Regex,
    animates: bool,
    style: S,
}

impl<S> RegexDetector<S> {
    pub fn new(tag: impl Into<MatchTag>, pattern: &str, animates: bool, style: S) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| ScanError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            tag: tag.into(),
            regex,
            animates,
            style,
        })
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }
}

impl<S: Clone> Detector<S> for RegexDetector<S> {
    fn tag(&self) -> MatchTag {
        self.tag
    }

    fn animates(&self) -> bool {
        self.animates
    }

    fn style(&self) -> S {
        self.style.clone()
    }

    fn detect(&self, fragment: &str) -> Vec<Span> {
        self.regex
            .find_iter(fragment)
            .map(|m| Span::from_bounds(m.start(), m.end()))
            .collect()
    }
}

impl<S> fmt::Debug for RegexDetector<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegexDetector")
            .field("tag", &self.tag)
            .field("pattern", &self.regex.as_str())
            .field("animates", &self.animates)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
