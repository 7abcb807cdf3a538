// trust-core/src/fingerprint.rs

//! Stable identifiers for deduplication and caching.
//!
//! The request fingerprint is computed before the wrapped model is ever
//! invoked, so duplicate requests can hit the cache or join an in-flight
//! verification without paying for inference.

use crate::types::{Request, Response};
use trust_crypto::{CanonicalBuffer, Digest, HashAlgorithm};

/// Derive the validator-set identifier from the registered validator ids.
/// Sorted and joined so registration order does not matter.
pub fn validator_set_id(ids: &[String]) -> String {
    let mut sorted: Vec<&str> = ids.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.join(",")
}

/// 32-byte fingerprint over (model_id, prompt, sorted context,
/// ruleset_version, validator_set_id)
pub fn request_fingerprint(
    request: &Request,
    ruleset_version: &str,
    validator_set: &str,
    algorithm: HashAlgorithm,
) -> Digest {
    let mut buf = CanonicalBuffer::new();
    buf.tag("model_id").write_str(&request.model_id);
    buf.tag("prompt").write_bytes(&request.prompt);
    buf.tag("context")
        .write_map(request.context.iter().map(|(k, v)| (k.as_str(), v.as_slice())));
    buf.tag("ruleset_version").write_str(ruleset_version);
    buf.tag("validator_set_id").write_str(validator_set);
    buf.digest(algorithm)
}

/// 32-byte digest over the response text and its ordered token spans
pub fn response_digest(response: &Response, algorithm: HashAlgorithm) -> Digest {
    let mut buf = CanonicalBuffer::new();
    buf.tag("text").write_str(&response.text);
    buf.tag("token_spans").write_u64(response.token_spans.len() as u64);
    for span in &response.token_spans {
        buf.write_u64(span.start as u64).write_u64(span.end as u64);
    }
    buf.digest(algorithm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Span;

    fn request() -> Request {
        Request::new("model-a", b"What is the capital of France?".to_vec(), 1_700_000_000)
            .with_context("capital_of_France", b"Paris".to_vec())
    }

    #[test]
    fn test_fingerprint_deterministic() {
        let r = request();
        let a = request_fingerprint(&r, "tw-ruleset/1", "v1,v2,v3", HashAlgorithm::Sha256);
        let b = request_fingerprint(&r, "tw-ruleset/1", "v1,v2,v3", HashAlgorithm::Sha256);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_ignores_request_id() {
        // Two requests with the same content but fresh uuids dedupe together
        let a = request_fingerprint(&request(), "tw-ruleset/1", "v1", HashAlgorithm::Sha256);
        let b = request_fingerprint(&request(), "tw-ruleset/1", "v1", HashAlgorithm::Sha256);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_varies_with_ruleset() {
        let r = request();
        let a = request_fingerprint(&r, "tw-ruleset/1", "v1", HashAlgorithm::Sha256);
        let b = request_fingerprint(&r, "tw-ruleset/2", "v1", HashAlgorithm::Sha256);
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_varies_with_validator_set() {
        let r = request();
        let a = request_fingerprint(&r, "tw-ruleset/1", "v1,v2", HashAlgorithm::Sha256);
        let b = request_fingerprint(&r, "tw-ruleset/1", "v1,v3", HashAlgorithm::Sha256);
        assert_ne!(a, b);
    }

    #[test]
    fn test_validator_set_id_order_independent() {
        let a = validator_set_id(&["beta".into(), "alpha".into()]);
        let b = validator_set_id(&["alpha".into(), "beta".into()]);
        assert_eq!(a, b);
        assert_eq!(a, "alpha,beta");
    }

    #[test]
    fn test_response_digest_covers_spans() {
        let plain = Response::new("4");
        let spanned = Response::new("4").with_spans(vec![Span::new(0, 1)]);
        assert_ne!(
            response_digest(&plain, HashAlgorithm::Sha256),
            response_digest(&spanned, HashAlgorithm::Sha256)
        );
    }
}
