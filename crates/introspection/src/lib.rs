// introspection/src/lib.rs

//! Response introspection: deterministic claim extraction
//!
//! Segments a response into citation, statistical, temporal, and entity
//! claims. Extraction is pure over the response text: no I/O, no clocks,
//! no randomness, so the same response always yields the same claims.
//!
//! The text is normalized to Unicode NFC before matching; claim spans are
//! byte offsets into the normalized form.

pub mod overlap;
pub mod rules;
pub mod temporal;

pub use rules::ExtractionRuleset;
pub use temporal::normalized_year;

use trust_core::{Claim, Response};

/// Extract all claims from a response with the default ruleset.
///
/// Overlapping candidate spans resolve longest-first, then leftmost.
/// Claim ids are assigned in span order, so they are stable across runs.
pub fn introspect(response: &Response) -> Vec<Claim> {
    ExtractionRuleset::new().extract(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trust_core::ClaimKind;

    #[test]
    fn test_empty_response() {
        let claims = introspect(&Response::new(""));
        assert!(claims.is_empty());
    }

    #[test]
    fn test_extraction_deterministic() {
        let response = Response::new(
            "According to (Smith, 2021), 42% of projects ship late. \
             The European Union reported similar numbers in 2020.",
        );
        let a = introspect(&response);
        let b = introspect(&response);
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_claim_ids_in_span_order() {
        let response = Response::new("In 2019, Jane Doe measured 17% error rates.");
        let claims = introspect(&response);
        for window in claims.windows(2) {
            assert!(window[0].span.start <= window[1].span.start);
            assert!(window[0].id < window[1].id);
        }
    }

    #[test]
    fn test_mixed_kinds() {
        let response = Response::new(
            "See https://example.org/report. Alan Turing estimated 30 per cent \
             growth next year.",
        );
        let claims = introspect(&response);
        let kinds: Vec<ClaimKind> = claims.iter().map(|c| c.kind).collect();
        assert!(kinds.contains(&ClaimKind::Citation));
        assert!(kinds.contains(&ClaimKind::Entity));
        assert!(kinds.contains(&ClaimKind::Temporal));
    }
}
