//! Sprig: incremental highlight detection for editable text
//!
//! A Rust/WASM engine that keeps pattern matches ("ingredients") in sync with
//! a mutable document, re-running detectors only over the sentences an edit
//! touched and reporting exactly which positions gained or lost a match.
//!
//! # Architecture
//!
//! ## Scanner Components
//! - `span.rs` - Span / EditRecord: byte ranges and the position translation law
//! - `positions.rs` - PositionSet: ordered set algebra over positions
//! - `buffer.rs` - TextBuffer: the mutable document text
//! - `intern.rs` - MatchTag: interned detector categories
//! - `detector.rs` - Detector trait + RegexDetector
//! - `segment.rs` - Scan-scope selection (paragraphs, UAX #29 sentences)
//! - `index.rs` - MatchIndex: committed, non-overlapping matches
//! - `incremental.rs` - IncrementalDetectionEngine: the edit pipeline
//! - `notifier.rs` - ChangeNotifier: synchronous Delta fan-out
//!
//! ## Surface
//! - `config.rs` - EngineConfig / DetectorSpec (serde)
//! - `error.rs` - ScanError
//! - `wasm.rs` - SprigEngine browser binding
//!
//! # Usage (Rust)
//! ```rust
//! use std::rc::Rc;
//! use sprig::{IncrementalDetectionEngine, RegexDetector, SharedDetector, Span};
//!
//! let bang: SharedDetector<&str> = Rc::new(RegexDetector::new("important", r"\w*!", true, "orange").unwrap());
//! let mut engine = IncrementalDetectionEngine::new(vec![bang]);
//!
//! let delta = engine.insert(0, "This framework is great!").unwrap();
//! assert_eq!(delta.added_spans(), vec![Span::new(18, 6)]);
//!
//! // Backspace the '!' and the match goes away
//! let delta = engine.delete(Span::new(23, 1)).unwrap();
//! assert_eq!(delta.removed_spans(), vec![Span::new(18, 5)]);
//! ```

pub mod config;
pub mod error;
pub mod scanner;
pub mod wasm;

// Public exports
pub use config::*;
pub use error::ScanError;
pub use scanner::*;

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("sprig v{}", env!("CARGO_PKG_VERSION"))
}
