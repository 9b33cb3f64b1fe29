//! Engine configuration
//!
//! A JSON-friendly description of an engine: scan granularity plus an ordered
//! list of regex detectors. Styles stay opaque `serde_json::Value`s.
//!
//! ```json
//! {
//!   "granularity": "sentence",
//!   "detectors": [
//!     { "tag": "important", "pattern": "\\w*!", "animates": true, "style": { "color": "#ff7f00" } }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::rc::Rc;

use crate::error::{Result, ScanError};
use crate::scanner::detector::{RegexDetector, SharedDetector};
use crate::scanner::incremental::IncrementalDetectionEngine;
use crate::scanner::segment::ScanGranularity;

// ==================== TYPE DEFINITIONS ====================

/// One regex detector. List position is priority.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DetectorSpec {
    pub tag: String,
    pub pattern: String,
    #[serde(default)]
    pub animates: bool,
    #[serde(default)]
    pub style: Value,
}

/// Configuration for an IncrementalDetectionEngine
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EngineConfig {
    #[serde(default)]
    pub granularity: ScanGranularity,
    #[serde(default = "default_true")]
    pub rescan_trailing_deletion: bool,
    #[serde(default)]
    pub detectors: Vec<DetectorSpec>,
}

fn default_true() -> bool { true }

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            granularity: ScanGranularity::Sentence,
            rescan_trailing_deletion: true,
            detectors: Vec::new(),
        }
    }
}

// ==================== IMPLEMENTATION ====================

impl DetectorSpec {
    pub fn new(tag: &str, pattern: &str, animates: bool, style: Value) -> Self {
        Self {
            tag: tag.to_string(),
            pattern: pattern.to_string(),
            animates,
            style,
        }
    }

    pub fn build(&self) -> Result<RegexDetector<Value>> {
        RegexDetector::new(self.tag.as_str(), &self.pattern, self.animates, self.style.clone())
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ScanError::InvalidConfig(e.to_string()))
    }

    /// Exclamations animate in orange, questions stay static in purple
    pub fn demo() -> Self {
        Self {
            detectors: vec![
                DetectorSpec::new(
                    "important",
                    r"\w*!",
                    true,
                    json!({ "color": "#ff7f00", "font": "title1" }),
                ),
                DetectorSpec::new(
                    "question",
                    r"\w*\?",
                    false,
                    json!({ "color": "#3802da", "font": "title1" }),
                ),
            ],
            ..Self::default()
        }
    }

    /// Compile every detector, preserving list order. Fails on the first bad pattern.
    pub fn build_detectors(&self) -> Result<Vec<SharedDetector<Value>>> {
        self.detectors
            .iter()
            .map(|spec| spec.build().map(|d| Rc::new(d) as SharedDetector<Value>))
            .collect()
    }

    pub fn build_engine(&self) -> Result<IncrementalDetectionEngine<Value>> {
        Ok(IncrementalDetectionEngine::new(self.build_detectors()?)
            .with_granularity(self.granularity)
            .with_trailing_deletion_rescan(self.rescan_trailing_deletion))
    }
}

// =============================================================================
// Tests
// =============================================================================
