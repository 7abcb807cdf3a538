// introspection/src/overlap.rs

use trust_core::{ClaimKind, Span};

/// A matched span before overlap resolution
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub kind: ClaimKind,
    pub span: Span,
    pub normalized: String,
}

fn kind_rank(kind: ClaimKind) -> u8 {
    match kind {
        ClaimKind::Citation => 0,
        ClaimKind::Statistic => 1,
        ClaimKind::Temporal => 2,
        ClaimKind::Entity => 3,
        ClaimKind::Other => 4,
    }
}

/// Resolve overlapping candidates: longest span first, then leftmost.
/// The survivors come back in span order.
pub fn resolve(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(|a, b| {
        b.span
            .len()
            .cmp(&a.span.len())
            .then(a.span.start.cmp(&b.span.start))
            .then(kind_rank(a.kind).cmp(&kind_rank(b.kind)))
            .then_with(|| a.normalized.cmp(&b.normalized))
    });

    let mut kept: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if kept.iter().all(|k| !k.span.overlaps(&candidate.span)) {
            kept.push(candidate);
        }
    }

    kept.sort_by(|a, b| {
        a.span
            .start
            .cmp(&b.span.start)
            .then(kind_rank(a.kind).cmp(&kind_rank(b.kind)))
    });
    kept
}
