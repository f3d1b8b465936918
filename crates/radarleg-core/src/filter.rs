//! Two-tier relevance filter over bill summaries.
//!
//! Tier 1: specific terms match by substring, except the literal token
//! `trans`, which needs a standalone-word hit plus identity or legislative
//! co-occurrence. Tier 2: contextual terms only count together with a
//! legislative-action word. Pure and deterministic over its [`TermSet`].

use std::sync::LazyLock;

use regex::Regex;

use crate::terms::TermSet;

/// Standalone-word matcher for the bare token `trans`. `\b` keeps
/// "transporte" and "transferência" from matching.
static TRANS_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\btrans\b").expect("static pattern"));

/// Decides whether a summary belongs in the protected-class policy domain.
#[derive(Debug, Clone, Default)]
pub struct RelevanceFilter {
    terms: TermSet,
}

impl RelevanceFilter {
    pub fn new(terms: TermSet) -> Self {
        Self { terms }
    }

    pub fn terms(&self) -> &TermSet {
        &self.terms
    }

    /// True iff the summary matches the specific tier, or the contextual
    /// tier gated by legislative-action vocabulary.
    pub fn is_relevant(&self, summary: &str) -> bool {
        if summary.trim().is_empty() {
            return false;
        }
        let text = summary.to_lowercase();
        self.matches_specific(&text) || self.matches_contextual(&text)
    }

    /// Number of term-set entries (both tiers) present in the summary.
    /// Annotates accepted records; not part of the inclusion decision.
    pub fn match_count(&self, summary: &str) -> usize {
        let text = summary.to_lowercase();
        self.terms
            .all_terms()
            .filter(|term| text.contains(term))
            .count()
    }

    fn matches_specific(&self, text: &str) -> bool {
        for term in &self.terms.specific {
            if term == "trans" {
                if TRANS_TOKEN.is_match(text) && self.has_trans_context(text) {
                    return true;
                }
            } else if text.contains(term.as_str()) {
                return true;
            }
        }
        false
    }

    /// The bare token needs an identity word or a legislative-action word
    /// nearby to count as evidence.
    fn has_trans_context(&self, text: &str) -> bool {
        self.terms
            .identity_words
            .iter()
            .any(|w| text.contains(w.as_str()))
            || self.has_action_verb(text)
    }

    fn matches_contextual(&self, text: &str) -> bool {
        let cutoff = self.terms.contextual_priority.min(self.terms.contextual.len());
        let prioritized = &self.terms.contextual[..cutoff];
        prioritized.iter().any(|t| text.contains(t.as_str())) && self.has_action_verb(text)
    }

    fn has_action_verb(&self, text: &str) -> bool {
        self.terms
            .action_verbs
            .iter()
            .any(|v| text.contains(v.as_str()))
    }
}
