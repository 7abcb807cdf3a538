// detection/src/rule.rs

use trust_core::{Claim, ClaimId, EvidenceKind, Request, Response, Span};

/// A fact retrieved from an external source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fact {
    pub value: String,
}

/// Optional external fact oracle. Responses must be stable for the
/// duration of a run, so detection stays deterministic.
pub trait FactSource: Send + Sync {
    fn lookup(&self, claim: &Claim) -> Option<Fact>;
}

/// Everything a rule may consult besides the response itself
pub struct DetectionContext<'a> {
    pub request: &'a Request,
    pub facts: Option<&'a dyn FactSource>,
}

impl DetectionContext<'_> {
    /// Context entry decoded as UTF-8, lossy
    pub fn context_text(&self, key: &str) -> Option<String> {
        self.request
            .context
            .get(key)
            .map(|v| String::from_utf8_lossy(v).into_owned())
    }

    /// All context values decoded as UTF-8, lossy
    pub fn context_values(&self) -> impl Iterator<Item = (&str, String)> {
        self.request
            .context
            .iter()
            .map(|(k, v)| (k.as_str(), String::from_utf8_lossy(v).into_owned()))
    }
}

/// A rule's raw finding, before prior weighting and thresholding
#[derive(Debug, Clone)]
pub struct RuleFinding {
    pub kind: EvidenceKind,
    pub claim: ClaimId,
    pub span: Span,
    /// Raw rule score in [0, 1]
    pub score: f64,
    pub note: String,
}

/// A single detector rule. Rules are pure over their inputs and must not
/// observe each other's findings.
pub trait DetectorRule: Send + Sync {
    fn id(&self) -> &str;

    /// Prior weight multiplied into every raw score, clamped to [0.5, 1.0]
    fn prior_weight(&self) -> f64 {
        1.0
    }

    fn apply(
        &self,
        response: &Response,
        claims: &[Claim],
        ctx: &DetectionContext<'_>,
    ) -> Vec<RuleFinding>;
}

/// The sentence containing a span, used for hedge and subject checks
pub fn sentence_around(text: &str, span: Span) -> &str {
    let start = text[..span.start.min(text.len())]
        .rfind(['.', '!', '?'])
        .map(|i| i + 1)
        .unwrap_or(0);
    let end = text[span.end.min(text.len())..]
        .find(['.', '!', '?'])
        .map(|i| span.end + i + 1)
        .unwrap_or(text.len());
    &text[start..end]
}
