use std::cell::RefCell;
use std::rc::Rc;

use super::{
    backspace, bang_detector, committed, engine_with, fresh_scan, question_detector, type_text,
    Style,
};
use crate::error::ScanError;
use crate::scanner::detector::{Detector, RegexDetector, SharedDetector};
use crate::scanner::incremental::{Delta, IncrementalDetectionEngine};
use crate::scanner::intern::MatchTag;
use crate::scanner::segment::ScanGranularity;
use crate::scanner::span::Span;

fn whole(engine: &IncrementalDetectionEngine<Style>) -> Span {
    Span::new(0, engine.len())
}

fn test_ranges(engine: &IncrementalDetectionEngine<Style>) -> Vec<Span> {
    engine.ranges_of(MatchTag::new("test"), whole(engine)).unwrap()
}

// ============================================================================
// Typing
// ============================================================================

#[test]
fn test_typing() {
    let mut engine = engine_with(vec![bang_detector()]);
    engine.insert(0, "12345").unwrap();
    type_text(&mut engine, " 67890");
    assert_eq!(engine.text(), "12345 67890");
}

#[test]
fn test_backspace() {
    let mut engine = engine_with(vec![bang_detector()]);
    engine.insert(0, "12345").unwrap();
    backspace(&mut engine, 2);
    assert_eq!(engine.text(), "123");
}

#[test]
fn test_undetect_after_backspace() {
    let mut engine = engine_with(vec![bang_detector()]);
    type_text(&mut engine, "This framework is great!");
    assert_eq!(test_ranges(&engine), vec![Span::new(18, 6)]);

    let len = engine.len();
    let delta = engine.delete(Span::new(len - 1, 1)).unwrap();

    assert!(test_ranges(&engine).is_empty(), "Should have no detected items");
    assert_eq!(delta.removed_spans(), vec![Span::new(18, 5)]);
    assert!(delta.added.is_empty());
}

#[test]
fn test_delete_in_middle_keeps_correct_location() {
    let initial = "I made some cheese! and kale and cheese! and onion!";
    let mut engine = engine_with(vec![bang_detector()]);
    type_text(&mut engine, initial);

    assert_eq!(test_ranges(&engine), bang_detector().detect(initial));
    assert_eq!(test_ranges(&engine).len(), 3);

    let start = initial.find("some cheese! and").unwrap();
    engine.delete(Span::new(start, "some cheese! and".len())).unwrap();

    assert_eq!(engine.text(), "I made  kale and cheese! and onion!");
    assert_eq!(test_ranges(&engine), bang_detector().detect(engine.text()));
}

#[test]
fn test_happy_path_paste() {
    let text = "I made some cheese potato with onion and kale and quinoa. delicious!";
    let mut engine = engine_with(vec![bang_detector()]);
    engine.insert(0, text).unwrap();

    let at = text.find("delicious!").unwrap();
    assert_eq!(test_ranges(&engine), vec![Span::new(at, "delicious!".len())]);
    assert_eq!(engine.style_at(at), Some(&"orange"));
}

// ============================================================================
// Multiple detectors
// ============================================================================

#[test]
fn test_two_detectors_coexist() {
    let mut engine = engine_with(vec![bang_detector(), question_detector()]);
    type_text(&mut engine, "Is it? Yes!");

    let all = whole(&engine);
    assert_eq!(engine.ranges_of(MatchTag::new("question"), all).unwrap(), vec![Span::new(3, 3)]);
    assert_eq!(engine.ranges_of(MatchTag::new("test"), all).unwrap(), vec![Span::new(7, 4)]);
    assert_eq!(engine.animatable_ranges(all).unwrap(), vec![Span::new(7, 4)]);
    assert_eq!(engine.static_ranges(all).unwrap(), vec![Span::new(3, 3)]);
    assert_eq!(engine.matches_where(false, all).unwrap(), vec![Span::new(3, 3)]);
    assert_eq!(engine.style_at(4), Some(&"purple"));
}

#[test]
fn test_priority_conflict_and_detector_swap() {
    let word: SharedDetector<Style> =
        Rc::new(RegexDetector::new("word", "great", false, "blue").unwrap());
    let mut engine = engine_with(vec![Rc::clone(&word), bang_detector()]);
    engine.insert(0, "so great!").unwrap();

    // "great!" overlaps the earlier claim on "great" and is dropped whole
    assert_eq!(committed(&engine), vec![(MatchTag::new("word"), Span::new(3, 5))]);

    let delta = engine.set_detectors(vec![bang_detector(), word]).unwrap();
    assert_eq!(committed(&engine), vec![(MatchTag::new("test"), Span::new(3, 6))]);
    assert_eq!(delta.added_spans(), vec![Span::new(8, 1)]);
    assert!(delta.removed.is_empty());
}

#[test]
fn test_clearing_detectors_removes_everything() {
    let mut engine = engine_with(vec![bang_detector()]);
    engine.insert(0, "Wow!").unwrap();

    let delta = engine.set_detectors(Vec::new()).unwrap();
    assert_eq!(delta.removed_spans(), vec![Span::new(0, 4)]);
    assert_eq!(engine.matches().count(), 0);
}

// ============================================================================
// Edit geometry
// ============================================================================

#[test]
fn test_edit_inside_match_reports_only_new_position() {
    let mut engine = engine_with(vec![bang_detector()]);
    engine.insert(0, "great!").unwrap();

    let delta = engine.insert(2, "t").unwrap();
    assert_eq!(engine.text(), "grteat!");
    assert_eq!(test_ranges(&engine), vec![Span::new(0, 7)]);
    assert_eq!(delta.added_spans(), vec![Span::new(2, 1)]);
    assert!(delta.removed.is_empty());
}

#[test]
fn test_matches_downstream_shift_without_delta() {
    let mut engine = engine_with(vec![bang_detector()]);
    engine.insert(0, "Hi! Bye!").unwrap();

    let delta = engine.insert(0, "Oh. ").unwrap();
    assert!(delta.is_empty());
    assert_eq!(test_ranges(&engine), vec![Span::new(4, 3), Span::new(8, 4)]);
}

#[test]
fn test_zero_length_edit_is_harmless() {
    let mut engine = engine_with(vec![bang_detector()]);
    engine.insert(0, "Hi!").unwrap();
    let regions = engine.stats().regions_rescanned;

    let delta = engine.apply_edit(Span::new(1, 0), "").unwrap();
    assert!(delta.is_empty());
    assert_eq!(engine.text(), "Hi!");
    assert_eq!(test_ranges(&engine), vec![Span::new(0, 3)]);
    assert_eq!(engine.stats().regions_rescanned, regions + 1);
}

#[test]
fn test_multibyte_text() {
    let mut engine = engine_with(vec![bang_detector()]);
    engine.insert(0, "caf\u{e9}!").unwrap();
    assert_eq!(test_ranges(&engine), vec![Span::new(0, 6)]);

    let result = engine.delete(Span::new(4, 1));
    assert!(matches!(result, Err(ScanError::NotCharBoundary { position: 4 })));
    assert_eq!(engine.text(), "caf\u{e9}!");

    engine.delete(Span::new(3, 2)).unwrap();
    assert_eq!(test_ranges(&engine), vec![Span::new(0, 4)]);
}

// ============================================================================
// Scope
// ============================================================================

#[test]
fn test_trailing_deletion_rescans_whole_paragraph() {
    let text = "One. Two. Three";

    let mut engine = engine_with(vec![bang_detector()]);
    engine.insert(0, text).unwrap();
    let before = engine.stats().regions_rescanned;
    backspace(&mut engine, 1);
    assert_eq!(engine.stats().regions_rescanned - before, 3);

    let mut engine = engine_with(vec![bang_detector()]).with_trailing_deletion_rescan(false);
    engine.insert(0, text).unwrap();
    let before = engine.stats().regions_rescanned;
    backspace(&mut engine, 1);
    assert_eq!(engine.stats().regions_rescanned - before, 1);
}

#[test]
fn test_match_across_sentences_needs_paragraph_scope() {
    let pair: SharedDetector<Style> =
        Rc::new(RegexDetector::new("pair", r"One\. Two", false, "green").unwrap());

    let mut engine = engine_with(vec![Rc::clone(&pair)]);
    engine.insert(0, "One. Two").unwrap();
    assert!(committed(&engine).is_empty());

    let mut engine = engine_with(vec![pair]).with_granularity(ScanGranularity::Paragraph);
    engine.insert(0, "One. Two").unwrap();
    assert_eq!(committed(&engine), vec![(MatchTag::new("pair"), Span::new(0, 8))]);
}

// ============================================================================
// Detector contract
// ============================================================================

/// Reports one span past the fragment end, then one valid span
struct Overreaching;

impl Detector<Style> for Overreaching {
    fn tag(&self) -> MatchTag {
        MatchTag::new("over")
    }
    fn animates(&self) -> bool {
        false
    }
    fn style(&self) -> Style {
        "grey"
    }
    fn detect(&self, fragment: &str) -> Vec<Span> {
        vec![Span::new(0, fragment.len() + 1), Span::new(0, 1)]
    }
}

#[test]
fn test_contract_violation_is_contained() {
    let over: SharedDetector<Style> = Rc::new(Overreaching);
    let mut engine = engine_with(vec![over]);
    engine.insert(0, "Hi.").unwrap();

    assert_eq!(committed(&engine), vec![(MatchTag::new("over"), Span::new(0, 1))]);
    assert_eq!(engine.stats().contract_violations, 1);
}

// ============================================================================
// Observers and refresh
// ============================================================================

#[test]
fn test_observer_receives_committed_deltas() {
    let deliveries = Rc::new(RefCell::new(Vec::new()));
    let mut engine = engine_with(vec![bang_detector()]);
    let sink = Rc::clone(&deliveries);
    engine.subscribe(move |delta: &Delta| sink.borrow_mut().push(delta.added_spans()));

    type_text(&mut engine, "Hi!");
    assert_eq!(
        *deliveries.borrow(),
        vec![vec![], vec![], vec![Span::new(0, 3)]],
        "One delivery per keystroke"
    );
}

#[test]
fn test_refresh_after_edits_changes_nothing() {
    let mut engine = engine_with(vec![bang_detector(), question_detector()]);
    type_text(&mut engine, "I made some cheese! and kale and cheese! Why? and onion!");
    engine.delete(Span::new(7, 16)).unwrap();
    engine.insert(0, "Wait? ").unwrap();

    let before = committed(&engine);
    let delta = engine.refresh().unwrap();
    assert!(delta.is_empty());
    assert_eq!(committed(&engine), before);
    assert_eq!(
        before,
        fresh_scan(engine.text(), vec![bang_detector(), question_detector()])
    );
}
