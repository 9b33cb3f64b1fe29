//! TextBuffer: the mutable document text
//!
//! Validates every span before touching the string, so a rejected edit
//! leaves the buffer exactly as it was.

use crate::error::{Result, ScanError};

use super::span::{EditRecord, Span};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whole buffer as a span
    pub fn full_span(&self) -> Span {
        Span::new(0, self.text.len())
    }

    /// Check that `span` lies within `[0, len]` and on character boundaries
    pub fn validate(&self, span: Span) -> Result<()> {
        if !span.fits_within(self.text.len()) {
            return Err(ScanError::OutOfBounds {
                span,
                len: self.text.len(),
            });
        }
        for position in [span.start, span.end()] {
            if !self.text.is_char_boundary(position) {
                return Err(ScanError::NotCharBoundary { position });
            }
        }
        Ok(())
    }

    pub fn substring(&self, span: Span) -> Result<&str> {
        self.validate(span)?;
        Ok(&self.text[span.to_range()])
    }

    /// Replace `range` with `replacement` and describe what changed
    pub fn replace(&mut self, range: Span, replacement: &str) -> Result<EditRecord> {
        self.validate(range)?;
        self.text.replace_range(range.to_range(), replacement);
        Ok(EditRecord::new(range, replacement.len()))
    }
}

impl From<&str> for TextBuffer {
    fn from(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
