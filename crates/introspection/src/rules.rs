// introspection/src/rules.rs

use crate::overlap::{self, Candidate};
use crate::temporal::{month_number, valid_date};
use regex::Regex;
use std::collections::HashSet;
use trust_core::{Claim, ClaimKind, Response, Span};
use unicode_normalization::UnicodeNormalization;

/// Max tokens captured around a statistic as its subject phrase
const SUBJECT_WINDOW: usize = 12;

/// Sentence-leading words that are not entity tokens
const STOP_WORDS: &[&str] = &[
    "The", "A", "An", "In", "On", "At", "If", "As", "By", "For", "From",
    "To", "With", "And", "But", "Or", "However", "This", "These", "Those",
    "It", "Its", "According", "After", "Before", "When", "While", "Since",
];

/// The versioned extraction ruleset.
///
/// Rules are compiled once and applied in a fixed order; every rule is
/// pure over the NFC-normalized response text.
pub struct ExtractionRuleset {
    url: Regex,
    citation_ref: Regex,
    percent: Regex,
    per_unit: Regex,
    iso_date: Regex,
    month_date: Regex,
    year: Regex,
    relative: Regex,
    ordinal: Regex,
    entity: Regex,
    singleton: Regex,
    stop_words: HashSet<&'static str>,
}

impl ExtractionRuleset {
    pub fn new() -> Self {
        Self {
            url: Regex::new(r#"https?://[^\s<>()\[\]{}"']+"#).unwrap(),
            citation_ref: Regex::new(
                r"\(\s*([A-Z][A-Za-z'\-]+(?:\s+(?:et\s+al\.?|&|and)\s+[A-Z][A-Za-z'\-]+)*)\s*,\s*(\d{4})\s*\)",
            )
            .unwrap(),
            percent: Regex::new(r"(\d+(?:\.\d+)?)\s*(?:%|percent\b)").unwrap(),
            per_unit: Regex::new(r"(\d+(?:\.\d+)?)\s+per\s+([A-Za-z]+)").unwrap(),
            iso_date: Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").unwrap(),
            month_date: Regex::new(
                r"\b(January|February|March|April|May|June|July|August|September|October|November|December)\s+(\d{1,2}),?\s+(\d{4})\b",
            )
            .unwrap(),
            year: Regex::new(r"\b(1[5-9]\d{2}|2\d{3})\b").unwrap(),
            relative: Regex::new(r"(?i)\b(?:next|last|this)\s+(?:year|month|week|quarter|decade)\b")
                .unwrap(),
            ordinal: Regex::new(r"\b(\d{1,3})(?:st|nd|rd|th)\b").unwrap(),
            entity: Regex::new(r"\b[A-Z][A-Za-z]+(?:\s+[A-Z][A-Za-z]+)+\b").unwrap(),
            singleton: Regex::new(r"\b[A-Z][a-z]+\b").unwrap(),
            stop_words: STOP_WORDS.iter().copied().collect(),
        }
    }

    /// Extract claims from a response. Ids are assigned in span order.
    pub fn extract(&self, response: &Response) -> Vec<Claim> {
        if response.text.is_empty() {
            return Vec::new();
        }

        let text: String = response.text.nfc().collect();
        let mut candidates = Vec::new();

        self.collect_citations(&text, &mut candidates);
        self.collect_statistics(&text, &mut candidates);
        self.collect_temporal(&text, &mut candidates);
        self.collect_entities(&text, &mut candidates);
        self.collect_singletons(&text, &mut candidates);

        overlap::resolve(candidates)
            .into_iter()
            .enumerate()
            .map(|(i, c)| Claim::new(i as u32, c.kind, c.span, c.normalized))
            .collect()
    }

    fn collect_citations(&self, text: &str, out: &mut Vec<Candidate>) {
        for m in self.url.find_iter(text) {
            // Trailing sentence punctuation is not part of the URL
            let trimmed = m.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?']);
            if trimmed.is_empty() {
                continue;
            }
            out.push(Candidate {
                kind: ClaimKind::Citation,
                span: Span::new(m.start(), m.start() + trimmed.len()),
                normalized: trimmed.to_string(),
            });
        }

        for caps in self.citation_ref.captures_iter(text) {
            let whole = caps.get(0).unwrap();
            let author: String = caps[1]
                .to_lowercase()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join("");
            out.push(Candidate {
                kind: ClaimKind::Citation,
                span: Span::new(whole.start(), whole.end()),
                normalized: format!("{},{}", author, &caps[2]),
            });
        }
    }

    fn collect_statistics(&self, text: &str, out: &mut Vec<Candidate>) {
        for caps in self.percent.captures_iter(text) {
            let whole = caps.get(0).unwrap();
            let subject = subject_window(text, whole.start(), whole.end());
            out.push(Candidate {
                kind: ClaimKind::Statistic,
                span: Span::new(whole.start(), whole.end()),
                normalized: format!("{}%|{}", &caps[1], subject),
            });
        }

        for caps in self.per_unit.captures_iter(text) {
            let whole = caps.get(0).unwrap();
            let subject = subject_window(text, whole.start(), whole.end());
            out.push(Candidate {
                kind: ClaimKind::Statistic,
                span: Span::new(whole.start(), whole.end()),
                normalized: format!("{} per {}|{}", &caps[1], caps[2].to_lowercase(), subject),
            });
        }
    }

    fn collect_temporal(&self, text: &str, out: &mut Vec<Candidate>) {
        for caps in self.iso_date.captures_iter(text) {
            let whole = caps.get(0).unwrap();
            let (y, m, d) = (
                caps[1].parse().unwrap_or(0),
                caps[2].parse().unwrap_or(0),
                caps[3].parse().unwrap_or(0),
            );
            if valid_date(y, m, d).is_none() {
                continue;
            }
            out.push(Candidate {
                kind: ClaimKind::Temporal,
                span: Span::new(whole.start(), whole.end()),
                normalized: format!("{:04}-{:02}-{:02}", y, m, d),
            });
        }

        for caps in self.month_date.captures_iter(text) {
            let whole = caps.get(0).unwrap();
            let month = match month_number(&caps[1]) {
                Some(m) => m,
                None => continue,
            };
            let day: u32 = caps[2].parse().unwrap_or(0);
            let year: i32 = caps[3].parse().unwrap_or(0);
            if valid_date(year, month, day).is_none() {
                continue;
            }
            out.push(Candidate {
                kind: ClaimKind::Temporal,
                span: Span::new(whole.start(), whole.end()),
                normalized: format!("{:04}-{:02}-{:02}", year, month, day),
            });
        }

        for m in self.year.find_iter(text) {
            out.push(Candidate {
                kind: ClaimKind::Temporal,
                span: Span::new(m.start(), m.end()),
                normalized: m.as_str().to_string(),
            });
        }

        for m in self.relative.find_iter(text) {
            let collapsed = m
                .as_str()
                .to_lowercase()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");
            out.push(Candidate {
                kind: ClaimKind::Temporal,
                span: Span::new(m.start(), m.end()),
                normalized: format!("relative:{}", collapsed),
            });
        }

        for caps in self.ordinal.captures_iter(text) {
            let whole = caps.get(0).unwrap();
            out.push(Candidate {
                kind: ClaimKind::Temporal,
                span: Span::new(whole.start(), whole.end()),
                normalized: format!("ordinal:{}", &caps[1]),
            });
        }
    }

    fn collect_entities(&self, text: &str, out: &mut Vec<Candidate>) {
        for m in self.entity.find_iter(text) {
            let sub = m.as_str();
            let mut token_starts = Vec::new();
            let mut in_token = false;
            for (i, ch) in sub.char_indices() {
                if ch.is_whitespace() {
                    in_token = false;
                } else if !in_token {
                    token_starts.push(i);
                    in_token = true;
                }
            }
            let tokens: Vec<&str> = sub.split_whitespace().collect();

            // Strip leading stop words ("The European Union" -> "European Union")
            let mut skip = 0;
            while skip < tokens.len() && self.stop_words.contains(tokens[skip]) {
                skip += 1;
            }
            let kept = &tokens[skip..];
            if kept.len() < 2 {
                continue;
            }

            out.push(Candidate {
                kind: ClaimKind::Entity,
                span: Span::new(m.start() + token_starts[skip], m.end()),
                normalized: kept.join(" "),
            });
        }
    }

    /// Mid-sentence single capitalized words become `Other` claims, so the
    /// detector has something to bind contradiction evidence to.
    /// Sentence-initial words are skipped: sentence case is not a signal.
    fn collect_singletons(&self, text: &str, out: &mut Vec<Candidate>) {
        for m in self.singleton.find_iter(text) {
            if self.stop_words.contains(m.as_str()) {
                continue;
            }
            let before = text[..m.start()].trim_end();
            let sentence_initial =
                before.is_empty() || before.ends_with(['.', '!', '?', ':', '"']);
            if sentence_initial {
                continue;
            }
            out.push(Candidate {
                kind: ClaimKind::Other,
                span: Span::new(m.start(), m.end()),
                normalized: m.as_str().to_string(),
            });
        }
    }
}

impl Default for ExtractionRuleset {
    fn default() -> Self {
        Self::new()
    }
}

/// Up to `SUBJECT_WINDOW` tokens around a statistic, inside its sentence
fn subject_window(text: &str, start: usize, end: usize) -> String {
    let before = &text[..start];
    let sentence_start = before
        .rfind(['.', '!', '?'])
        .map(|i| i + 1)
        .unwrap_or(0);
    let mut tokens: Vec<&str> = before[sentence_start..].split_whitespace().collect();
    if tokens.len() > SUBJECT_WINDOW / 2 {
        tokens.drain(..tokens.len() - SUBJECT_WINDOW / 2);
    }

    let after = &text[end..];
    let sentence_end = after.find(['.', '!', '?']).unwrap_or(after.len());
    let remaining = SUBJECT_WINDOW.saturating_sub(tokens.len());
    tokens.extend(after[..sentence_end].split_whitespace().take(remaining));

    tokens.join(" ").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> Vec<Claim> {
        ExtractionRuleset::new().extract(&Response::new(text))
    }

    #[test]
    fn test_url_citation() {
        let claims = extract("Details at https://example.org/study.");
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].kind, ClaimKind::Citation);
        assert_eq!(claims[0].normalized, "https://example.org/study");
    }

    #[test]
    fn test_author_year_citation() {
        let claims = extract("As shown in (Smith and Jones, 2021).");
        let citation = claims.iter().find(|c| c.kind == ClaimKind::Citation).unwrap();
        assert_eq!(citation.normalized, "smithandjones,2021");
    }

    #[test]
    fn test_citation_swallows_inner_year() {
        let claims = extract("As shown in (Smith, 2021).");
        assert_eq!(
            claims.iter().filter(|c| c.kind == ClaimKind::Temporal).count(),
            0
        );
    }

    #[test]
    fn test_percent_statistic_with_subject() {
        let claims = extract("0.0173% of humans have purple eyes.");
        let stat = claims.iter().find(|c| c.kind == ClaimKind::Statistic).unwrap();
        assert!(stat.normalized.starts_with("0.0173%|"));
        assert!(stat.normalized.contains("purple eyes"));
    }

    #[test]
    fn test_per_unit_statistic() {
        let claims = extract("Roughly 12 per capita each year.");
        let stat = claims.iter().find(|c| c.kind == ClaimKind::Statistic).unwrap();
        assert!(stat.normalized.starts_with("12 per capita"));
    }

    #[test]
    fn test_temporal_forms() {
        let claims = extract("Launched on 2021-06-15, revised March 3, 2022, shipping next year.");
        let temporal: Vec<&str> = claims
            .iter()
            .filter(|c| c.kind == ClaimKind::Temporal)
            .map(|c| c.normalized.as_str())
            .collect();
        assert!(temporal.contains(&"2021-06-15"));
        assert!(temporal.contains(&"2022-03-03"));
        assert!(temporal.contains(&"relative:next year"));
    }

    #[test]
    fn test_invalid_date_skipped() {
        let claims = extract("Recorded on 2021-02-30 apparently.");
        // The impossible date is dropped; the bare year survives
        let temporal: Vec<&str> = claims
            .iter()
            .filter(|c| c.kind == ClaimKind::Temporal)
            .map(|c| c.normalized.as_str())
            .collect();
        assert_eq!(temporal, vec!["2021"]);
    }

    #[test]
    fn test_entity_stop_word_stripped() {
        let claims = extract("The European Union issued a statement.");
        let entity = claims.iter().find(|c| c.kind == ClaimKind::Entity).unwrap();
        assert_eq!(entity.normalized, "European Union");
    }

    #[test]
    fn test_single_capitalized_word_not_entity() {
        let claims = extract("Paris is lovely.");
        assert!(claims.iter().all(|c| c.kind != ClaimKind::Entity));
    }

    #[test]
    fn test_mid_sentence_singleton_is_other() {
        let claims = extract("The capital of France is London.");
        let singles: Vec<&str> = claims
            .iter()
            .filter(|c| c.kind == ClaimKind::Other)
            .map(|c| c.normalized.as_str())
            .collect();
        assert_eq!(singles, vec!["France", "London"]);
    }

    #[test]
    fn test_sentence_initial_singleton_skipped() {
        let claims = extract("Paris hosts the event. Berlin does not host it.");
        assert!(claims
            .iter()
            .all(|c| c.normalized != "Paris" && c.normalized != "Berlin"));
    }

    #[test]
    fn test_subject_window_bounded() {
        let long = format!(
            "{} exactly 55% of the total.",
            "word ".repeat(30).trim_end()
        );
        let claims = extract(&long);
        let stat = claims.iter().find(|c| c.kind == ClaimKind::Statistic).unwrap();
        let subject = stat.normalized.split('|').nth(1).unwrap();
        assert!(subject.split_whitespace().count() <= SUBJECT_WINDOW);
    }
}
