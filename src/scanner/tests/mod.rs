mod engine_tests;

use std::rc::Rc;

use crate::scanner::detector::{RegexDetector, SharedDetector};
use crate::scanner::incremental::IncrementalDetectionEngine;
use crate::scanner::intern::MatchTag;
use crate::scanner::span::Span;

type Style = &'static str;

fn bang_detector() -> SharedDetector<Style> {
    Rc::new(RegexDetector::new("test", r"\w*!", true, "orange").unwrap())
}

fn question_detector() -> SharedDetector<Style> {
    Rc::new(RegexDetector::new("question", r"\w*\?", false, "purple").unwrap())
}

fn engine_with(detectors: Vec<SharedDetector<Style>>) -> IncrementalDetectionEngine<Style> {
    IncrementalDetectionEngine::new(detectors)
}

/// Append one character at a time, the way a keyboard does
fn type_text(engine: &mut IncrementalDetectionEngine<Style>, text: &str) {
    let mut utf8 = [0u8; 4];
    for c in text.chars() {
        let end = engine.len();
        engine.insert(end, c.encode_utf8(&mut utf8)).unwrap();
    }
}

/// Delete `count` characters off the end
fn backspace(engine: &mut IncrementalDetectionEngine<Style>, count: usize) {
    for _ in 0..count {
        let last = engine.text().chars().next_back().map_or(0, char::len_utf8);
        let len = engine.len();
        engine.delete(Span::new(len - last, last)).unwrap();
    }
}

fn committed(engine: &IncrementalDetectionEngine<Style>) -> Vec<(MatchTag, Span)> {
    engine.matches().map(|m| (m.tag, m.span)).collect()
}

/// What a from-scratch scan of `text` commits
fn fresh_scan(text: &str, detectors: Vec<SharedDetector<Style>>) -> Vec<(MatchTag, Span)> {
    let mut engine = engine_with(detectors);
    engine.insert(0, text).unwrap();
    engine.refresh().unwrap();
    committed(&engine)
}
