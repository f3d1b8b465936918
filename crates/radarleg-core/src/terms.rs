//! Static term lists driving the relevance filter.
//!
//! Two tiers: specific terms are reliable standalone signals, contextual
//! terms are cheap false-positive generators ("banheiro", "vestiário") and
//! only count when paired with legislative-action vocabulary.

/// Domain-specific terms. Any substring hit is sufficient evidence, except
/// for the literal token `trans`, which gets a standalone-word check plus a
/// co-occurrence gate (see the filter).
pub const SPECIFIC_TERMS: &[&str] = &[
    "lgbt",
    "lgbtqia",
    "lgbtqia+",
    "trans",
    "transgênero",
    "transexual",
    "travesti",
    "homofobia",
    "transfobia",
    "homossexual",
    "identidade de gênero",
    "orientação sexual",
    "diversidade sexual",
    "nome social",
    "terapia de conversão",
    "cura gay",
    "reparação sexual",
];

/// Context-dependent terms, in priority order. Only the first
/// [`CONTEXTUAL_PRIORITY`] entries participate in the contextual pass.
pub const CONTEXTUAL_TERMS: &[&str] = &[
    "ideologia de gênero",
    "banheiro",
    "vestiário",
    "atleta trans",
    "esporte feminino",
    "competição feminina",
    "linguagem neutra",
    "todes",
    "lules",
    "símbolos religiosos.*parada",
    "menor.*evento.*lgbt",
    "comunidade lgbt",
];

/// How many contextual terms are trusted enough for the contextual pass.
pub const CONTEXTUAL_PRIORITY: usize = 8;

/// Legislative-action vocabulary gating contextual matches.
pub const ACTION_VERBS: &[&str] = &[
    "proíbe",
    "veda",
    "restringe",
    "garante",
    "reconhece",
    "criminaliza",
    "orientação",
    "identidade",
    "gênero",
    "sexual",
    "direito",
    "direitos",
    "dispõe",
    "altera",
    "estabelece",
    "define",
];

/// Gender/sexuality identity words used to disambiguate the bare token
/// `trans` from unrelated uses (transporte, transferência, ...).
pub const IDENTITY_WORDS: &[&str] = &[
    "gênero",
    "sexual",
    "identidade",
    "lgbt",
    "transfobia",
    "transexual",
    "transgênero",
];

/// Immutable, process-wide matching configuration for the relevance filter.
///
/// The default instance mirrors the static lists above; a caller-supplied
/// term override replaces the specific tier only.
#[derive(Debug, Clone)]
pub struct TermSet {
    pub specific: Vec<String>,
    pub contextual: Vec<String>,
    pub contextual_priority: usize,
    pub action_verbs: Vec<String>,
    pub identity_words: Vec<String>,
}

impl TermSet {
    /// Replace the specific tier with caller-supplied terms, keeping the
    /// contextual tier and gating vocabulary intact.
    pub fn with_specific(terms: Vec<String>) -> Self {
        Self {
            specific: terms,
            ..Self::default()
        }
    }

    /// All matching expressions, both tiers, in priority order.
    pub fn all_terms(&self) -> impl Iterator<Item = &str> {
        self.specific
            .iter()
            .chain(self.contextual.iter())
            .map(|s| s.as_str())
    }
}

impl Default for TermSet {
    fn default() -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            specific: owned(SPECIFIC_TERMS),
            contextual: owned(CONTEXTUAL_TERMS),
            contextual_priority: CONTEXTUAL_PRIORITY,
            action_verbs: owned(ACTION_VERBS),
            identity_words: owned(IDENTITY_WORDS),
        }
    }
}
