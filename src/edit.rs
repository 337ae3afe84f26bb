use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// The fundamental rewrite primitive: a verified byte-span replacement
/// against a single source string.
///
/// The rewrite engine plans one `SpanEdit` per touched docstring region and
/// [`apply_edits`] splices them all at once. Intelligence lives in span
/// acquisition (the body classifier), not in the application logic.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a SpanEdit does nothing until applied"]
pub struct SpanEdit {
    /// Starting byte offset (inclusive)
    pub byte_start: usize,
    /// Ending byte offset (exclusive)
    pub byte_end: usize,
    /// New text to install at [byte_start, byte_end)
    pub new_text: String,
    /// Verification of what we expect to find before applying
    pub expected_before: EditVerification,
}

/// Verification strategy for edit safety.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditVerification {
    /// Exact text match required
    ExactMatch(String),
    /// xxh3 hash of expected text (faster for large spans)
    Hash(u64),
}

impl EditVerification {
    /// Check if the provided text matches the verification criteria.
    pub fn matches(&self, text: &str) -> bool {
        match self {
            EditVerification::ExactMatch(expected) => text == expected,
            EditVerification::Hash(expected_hash) => xxh3_64(text.as_bytes()) == *expected_hash,
        }
    }

    /// Create verification from text, using hash for text over 1KB.
    pub fn from_text(text: &str) -> Self {
        if text.len() > 1024 {
            EditVerification::Hash(xxh3_64(text.as_bytes()))
        } else {
            EditVerification::ExactMatch(text.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("before-text verification failed at byte {byte_start}..{byte_end}")]
    BeforeTextMismatch {
        byte_start: usize,
        byte_end: usize,
        found: String,
    },

    #[error("invalid byte range: [{byte_start}, {byte_end}) in source of length {source_len}")]
    InvalidByteRange {
        byte_start: usize,
        byte_end: usize,
        source_len: usize,
    },

    #[error("overlapping edits at byte {byte_start}..{byte_end}")]
    OverlappingEdits { byte_start: usize, byte_end: usize },

    #[error("edit boundary splits a UTF-8 character at byte {at}")]
    NotCharBoundary { at: usize },
}

impl SpanEdit {
    /// Create a new edit with automatic verification generation.
    pub fn new(
        byte_start: usize,
        byte_end: usize,
        new_text: impl Into<String>,
        expected_before: &str,
    ) -> Self {
        Self {
            byte_start,
            byte_end,
            new_text: new_text.into(),
            expected_before: EditVerification::from_text(expected_before),
        }
    }

    /// Validate this edit against the source it will be applied to.
    fn validate(&self, source: &str) -> Result<(), EditError> {
        if self.byte_start > self.byte_end || self.byte_end > source.len() {
            return Err(EditError::InvalidByteRange {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                source_len: source.len(),
            });
        }

        for at in [self.byte_start, self.byte_end] {
            if !source.is_char_boundary(at) {
                return Err(EditError::NotCharBoundary { at });
            }
        }

        let current = &source[self.byte_start..self.byte_end];

        // Already applied counts as verified (idempotent re-application).
        if current == self.new_text {
            return Ok(());
        }

        if !self.expected_before.matches(current) {
            return Err(EditError::BeforeTextMismatch {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                found: current.to_string(),
            });
        }

        Ok(())
    }
}

/// Apply a batch of edits to a source string in a single pass.
///
/// Edits are validated first, then applied bottom-to-top so earlier spans
/// stay valid. Overlapping spans are rejected rather than resolved.
pub fn apply_edits(source: &str, edits: &[SpanEdit]) -> Result<String, EditError> {
    if edits.is_empty() {
        return Ok(source.to_string());
    }

    let mut ordered: Vec<&SpanEdit> = edits.iter().collect();
    ordered.sort_by(|a, b| b.byte_start.cmp(&a.byte_start));

    for edit in &ordered {
        edit.validate(source)?;
    }

    // Sorted descending: the later-in-text edit comes first in `ordered`.
    for window in ordered.windows(2) {
        let (later, earlier) = (window[0], window[1]);
        if earlier.byte_end > later.byte_start {
            return Err(EditError::OverlappingEdits {
                byte_start: later.byte_start,
                byte_end: earlier.byte_end,
            });
        }
    }

    let mut output = source.to_string();
    for edit in ordered {
        output.replace_range(edit.byte_start..edit.byte_end, &edit.new_text);
    }

    Ok(output)
}
