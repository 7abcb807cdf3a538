// trust-core/src/claim.rs

use crate::types::Span;
use serde::{Deserialize, Serialize};
use trust_crypto::{CanonicalBuffer, Canonicalize};

/// Identifier of a claim within one response
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClaimId(pub u32);

/// What kind of assertion a claim is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimKind {
    /// `<author, year>` or URL-like reference
    Citation,
    /// Numeric value with `%` or `per <unit>`
    Statistic,
    /// Absolute date, relative expression, or ordinal
    Temporal,
    /// Capitalized multi-token sequence
    Entity,
    Other,
}

impl ClaimKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Citation => "citation",
            Self::Statistic => "statistic",
            Self::Temporal => "temporal",
            Self::Entity => "entity",
            Self::Other => "other",
        }
    }
}

/// A self-contained assertion extracted from a response.
///
/// Extraction is deterministic, so the same response always yields the
/// same claims with the same ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    pub kind: ClaimKind,
    pub span: Span,
    /// Normalized form (lowercased citation key, calendar date, etc.)
    pub normalized: String,
}

impl Claim {
    pub fn new(id: u32, kind: ClaimKind, span: Span, normalized: impl Into<String>) -> Self {
        Self {
            id: ClaimId(id),
            kind,
            span,
            normalized: normalized.into(),
        }
    }
}

impl Canonicalize for Claim {
    fn canonicalize(&self, out: &mut CanonicalBuffer) {
        out.tag("id").write_u32(self.id.0);
        out.tag("kind").write_str(self.kind.name());
        out.tag("span").write_u64(self.span.start as u64).write_u64(self.span.end as u64);
        out.tag("normalized").write_str(&self.normalized);
    }
}
