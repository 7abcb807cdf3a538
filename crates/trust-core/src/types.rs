// trust-core/src/types.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Timestamp in Unix epoch seconds
pub type Timestamp = u64;

/// Byte-offset range into a response text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Whether two spans share at least one byte
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A verification request. Immutable once admitted.
///
/// `context` holds caller-provided facts keyed by name; the `BTreeMap`
/// iteration order is the sorted order the fingerprint requires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub id: Uuid,
    pub model_id: String,
    pub prompt: Vec<u8>,
    pub context: BTreeMap<String, Vec<u8>>,
    pub issued_at: Timestamp,
}

impl Request {
    pub fn new(model_id: impl Into<String>, prompt: impl Into<Vec<u8>>, issued_at: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            model_id: model_id.into(),
            prompt: prompt.into(),
            context: BTreeMap::new(),
            issued_at,
        }
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Prompt decoded as UTF-8 where possible
    pub fn prompt_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.prompt).ok()
    }
}

/// A model response being verified
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub text: String,
    pub token_spans: Vec<Span>,
    pub aux: BTreeMap<String, Vec<u8>>,
}

impl Response {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            token_spans: Vec::new(),
            aux: BTreeMap::new(),
        }
    }

    pub fn with_spans(mut self, spans: Vec<Span>) -> Self {
        self.token_spans = spans;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_overlap() {
        let a = Span::new(0, 10);
        let b = Span::new(5, 15);
        let c = Span::new(10, 20);

        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert_eq!(a.len(), 10);
    }

    #[test]
    fn test_request_context_sorted() {
        let request = Request::new("gpt-x", b"prompt".to_vec(), 1_700_000_000)
            .with_context("zebra", b"z".to_vec())
            .with_context("apple", b"a".to_vec());

        let keys: Vec<&str> = request.context.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["apple", "zebra"]);
    }

    #[test]
    fn test_prompt_text() {
        let request = Request::new("m", b"hello".to_vec(), 0);
        assert_eq!(request.prompt_text(), Some("hello"));

        let binary = Request::new("m", vec![0xff, 0xfe], 0);
        assert_eq!(binary.prompt_text(), None);
    }
}
