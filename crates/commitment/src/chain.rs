// commitment/src/chain.rs

use trust_core::Commitment;

/// Verify the linkage of an in-order sequence of chained commitments:
/// every commitment's `prev_hash` must equal its predecessor's
/// `record_hash`, and the first must have none.
pub fn verify_links(commitments: &[Commitment]) -> bool {
    let mut prev = None;
    for commitment in commitments {
        if commitment.prev_hash != prev {
            return false;
        }
        prev = Some(commitment.record_hash);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use trust_core::{SinkStatus, NONCE_SIZE};
    use trust_crypto::Digest;

    fn commitment(hash: u8, prev: Option<u8>) -> Commitment {
        Commitment {
            record_hash: Digest::new([hash; 32]),
            nonce: [0u8; NONCE_SIZE],
            timestamp: 1_700_000_000,
            prev_hash: prev.map(|p| Digest::new([p; 32])),
            sink_status: SinkStatus::LocalOnly,
        }
    }

    #[test]
    fn test_valid_chain() {
        let chain = vec![
            commitment(1, None),
            commitment(2, Some(1)),
            commitment(3, Some(2)),
        ];
        assert!(verify_links(&chain));
    }

    #[test]
    fn test_broken_link() {
        let chain = vec![
            commitment(1, None),
            commitment(2, Some(9)),
        ];
        assert!(!verify_links(&chain));
    }

    #[test]
    fn test_first_must_be_unchained() {
        let chain = vec![commitment(1, Some(0))];
        assert!(!verify_links(&chain));
    }

    #[test]
    fn test_empty_chain() {
        assert!(verify_links(&[]));
    }
}
