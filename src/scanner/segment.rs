//! Scan-scope selection
//!
//! Decides which regions of the post-edit buffer get re-examined after an
//! edit. The default granularity is the sentence: the paragraph around the
//! edit is split on UAX #29 sentence boundaries and only the sentences the
//! edit touched are rescanned.
//!
//! Known limitation: a match that spans a sentence boundary is not
//! re-detected when only one of its sentences is rescanned. The index will
//! drop it if the edit touched its text, but will not find it again.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use super::span::{EditRecord, Span};

/// Unit of re-scan after an edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanGranularity {
    /// Sentences touched by the edit
    #[default]
    Sentence,
    /// Whole paragraph(s) around the edit
    Paragraph,
    /// The entire buffer on every edit
    Document,
}

/// Inputs to scope selection beyond the buffer text itself
#[derive(Debug, Clone, Copy)]
pub struct ScopeRequest<'a> {
    pub edit: &'a EditRecord,
    /// Post-edit extents of matches the edit invalidated
    pub invalidated: &'a [Span],
    pub granularity: ScanGranularity,
    pub rescan_trailing_deletion: bool,
}

fn is_paragraph_separator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2029}')
}

/// Paragraph(s) enclosing `window`, including the trailing line terminator
pub fn paragraph_span(text: &str, window: Span) -> Span {
    let start = text[..window.start]
        .char_indices()
        .rev()
        .find(|&(_, c)| is_paragraph_separator(c))
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);

    let end = match text[window.end()..].char_indices().find(|&(_, c)| is_paragraph_separator(c)) {
        Some((i, c)) => {
            let after = window.end() + i + c.len_utf8();
            // CRLF terminates a single paragraph
            if c == '\r' && text[after..].starts_with('\n') {
                after + 1
            } else {
                after
            }
        }
        None => text.len(),
    };

    Span::from_bounds(start, end)
}

/// Every paragraph of `text`, in order
pub fn paragraphs(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut pos = 0;
    while pos < text.len() {
        let paragraph = paragraph_span(text, Span::new(pos, 0));
        spans.push(paragraph);
        pos = paragraph.end();
    }
    spans
}

/// Sentence boundaries inside `paragraph`, in buffer coordinates
pub fn sentence_spans(text: &str, paragraph: Span) -> Vec<Span> {
    text[paragraph.to_range()]
        .split_sentence_bound_indices()
        .map(|(offset, sentence)| Span::new(paragraph.start + offset, sentence.len()))
        .collect()
}

/// Does a rescan of `sentence` cover the change described by `touched`?
///
/// An empty span is an insertion point; it touches the sentence holding it
/// and the sentence ending right before it.
fn touches(sentence: &Span, touched: &Span) -> bool {
    if touched.is_empty() {
        let at = touched.start;
        sentence.contains(at) || (at > 0 && sentence.contains(at - 1))
    } else {
        sentence.intersects(touched)
    }
}

/// Regions to rebuild after `request.edit`, in order and disjoint
pub fn scan_scope(text: &str, request: ScopeRequest<'_>) -> Vec<Span> {
    if text.is_empty() {
        return Vec::new();
    }
    if request.granularity == ScanGranularity::Document {
        return vec![Span::new(0, text.len())];
    }

    let edited = request.edit.post_edit_range();
    let window = request
        .invalidated
        .iter()
        .fold(edited, |window, span| window.cover(span));
    let paragraph = paragraph_span(text, window);

    if request.granularity == ScanGranularity::Paragraph {
        return vec![paragraph];
    }

    // Backspacing at the end can un-match a pattern that relied on trailing
    // punctuation; the insertion point then sits past every sentence.
    let trailing_deletion = request.rescan_trailing_deletion
        && request.edit.is_deletion()
        && edited.end() == text.len();

    sentence_spans(text, paragraph)
        .into_iter()
        .filter(|sentence| {
            trailing_deletion
                || touches(sentence, &edited)
                || request.invalidated.iter().any(|span| touches(sentence, span))
        })
        .collect()
}

/// Regions covering the whole buffer at the given granularity
pub fn full_scope(text: &str, granularity: ScanGranularity) -> Vec<Span> {
    if text.is_empty() {
        return Vec::new();
    }
    match granularity {
        ScanGranularity::Document => vec![Span::new(0, text.len())],
        ScanGranularity::Paragraph => paragraphs(text),
        ScanGranularity::Sentence => paragraphs(text)
            .into_iter()
            .flat_map(|paragraph| sentence_spans(text, paragraph))
            .collect(),
    }
}

// =============================================================================
// Tests
// =============================================================================
