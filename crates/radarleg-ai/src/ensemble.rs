//! Weighted combination of the four evidence signals into one verdict.

use serde::Serialize;

use crate::model::TextClassifier;
use crate::signals::{keyword_signal, pattern_signal, stance_signal, toxicity_signal};

/// Pattern score at which the dynamic reweighting kicks in.
const HIGH_PATTERN_THRESHOLD: f64 = 0.95;
/// How much weight moves onto the pattern signal when it fires.
const PATTERN_BOOST: f64 = 0.10;
/// The pattern signal never carries more than half the total weight.
const MAX_PATTERN_WEIGHT: f64 = 0.50;

/// Triage label derived from the final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Favorable,
    NeedsReview,
    Unfavorable,
}

impl Verdict {
    fn from_score(score: f64) -> Self {
        if score >= 0.5 {
            Self::Unfavorable
        } else if score >= 0.3 {
            Self::NeedsReview
        } else {
            Self::Favorable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Favorable => "FAVORÁVEL",
            Self::NeedsReview => "REVISÃO",
            Self::Unfavorable => "DESFAVORÁVEL",
        }
    }
}

/// The four signal scores for one summary, all in [0, 1].
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SignalSet {
    pub toxicity: f64,
    pub stance: f64,
    pub keywords: f64,
    pub patterns: f64,
}

/// Per-signal weights. Always sums to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightSet {
    pub toxicity: f64,
    pub stance: f64,
    pub keywords: f64,
    pub patterns: f64,
}

impl WeightSet {
    /// Lexical signals dominate: legislation announces restrictions in
    /// plain words far more reliably than hate-speech or stance models
    /// trained on social-media text detect them.
    pub const BASE: WeightSet = WeightSet {
        toxicity: 0.20,
        stance: 0.15,
        keywords: 0.35,
        patterns: 0.30,
    };

    pub fn sum(&self) -> f64 {
        self.toxicity + self.stance + self.keywords + self.patterns
    }

    /// Drop the stance weight and spread it proportionally over the rest.
    fn without_stance(self) -> Self {
        let remaining = self.sum() - self.stance;
        Self {
            toxicity: self.toxicity / remaining,
            stance: 0.0,
            keywords: self.keywords / remaining,
            patterns: self.patterns / remaining,
        }
    }

    fn weighted_sum(&self, signals: &SignalSet) -> f64 {
        self.toxicity * signals.toxicity
            + self.stance * signals.stance
            + self.keywords * signals.keywords
            + self.patterns * signals.patterns
    }
}

/// Full scoring breakdown for one summary.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreResult {
    pub final_score: f64,
    pub verdict: Verdict,
    pub signals: SignalSet,
    pub weights_used: WeightSet,
}

/// Stateless scorer over an immutable model configuration.
///
/// Both models are optional: an absent toxicity model scores neutral at
/// its configured weight, while an absent stance model additionally has
/// its weight redistributed, since neutrality at full weight would dilute
/// every verdict toward review.
pub struct EnsembleScorer {
    toxicity: Option<Box<dyn TextClassifier>>,
    stance: Option<Box<dyn TextClassifier>>,
    base: WeightSet,
}

impl EnsembleScorer {
    pub fn new(
        toxicity: Option<Box<dyn TextClassifier>>,
        stance: Option<Box<dyn TextClassifier>>,
    ) -> Self {
        let base = if stance.is_none() {
            WeightSet::BASE.without_stance()
        } else {
            WeightSet::BASE
        };
        Self {
            toxicity,
            stance,
            base,
        }
    }

    /// Scorer running on lexical signals alone.
    pub fn without_models() -> Self {
        Self::new(None, None)
    }

    pub fn classify(&self, summary: &str) -> ScoreResult {
        let signals = SignalSet {
            toxicity: toxicity_signal(self.toxicity.as_deref(), summary),
            stance: stance_signal(self.stance.as_deref(), summary),
            keywords: keyword_signal(summary),
            patterns: pattern_signal(summary),
        };
        let weights_used = adjust_weights(self.base, signals.patterns);
        let final_score = weights_used.weighted_sum(&signals);
        ScoreResult {
            final_score,
            verdict: Verdict::from_score(final_score),
            signals,
            weights_used,
        }
    }
}

/// When the pattern signal is near-certain, shift weight onto it and shrink
/// the others proportionally so the total stays at 1.0.
fn adjust_weights(base: WeightSet, pattern_score: f64) -> WeightSet {
    if pattern_score < HIGH_PATTERN_THRESHOLD {
        return base;
    }
    let boosted = (base.patterns + PATTERN_BOOST).min(MAX_PATTERN_WEIGHT);
    let increase = boosted - base.patterns;
    if increase <= 0.0 {
        return base;
    }
    let others = base.sum() - base.patterns;
    let factor = (others - increase) / others;
    WeightSet {
        toxicity: base.toxicity * factor,
        stance: base.stance * factor,
        keywords: base.keywords * factor,
        patterns: boosted,
    }
}
