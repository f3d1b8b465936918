//! The four evidence extractors feeding the ensemble.
//!
//! Every signal scores in [0, 1]; higher means more evidence that a summary
//! restricts rights. Two signals wrap the optional local models and degrade
//! to a neutral 0.5 when a model is absent or errors out; the other two are
//! pure lexical extractors over curated Portuguese pattern lists.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::model::TextClassifier;

/// Score used when a model cannot contribute an opinion.
pub const NEUTRAL: f64 = 0.5;

/// Keyword override score when a strong favorable pattern matches.
const STRONG_FAVORABLE_SCORE: f64 = 0.15;

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(&format!("(?i){p}")).expect("static pattern"))
        .collect()
}

fn count_matches(patterns: &[Regex], text: &str) -> usize {
    patterns.iter().filter(|re| re.is_match(text)).count()
}

/// Phrases indicating recognition or protection of rights.
static FAVORABLE_KEYWORDS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"identidade de gênero",
        r"orientação sexual",
        r"lgbtqia\+",
        r"lgbt",
        r"diversidade sexual",
        r"nome social",
        r"autodeterminação",
        r"criminaliza.*homofobia",
        r"criminaliza.*transfobia",
        r"proteção.*lgbt",
        r"direitos.*lgbt",
        r"igualdade.*gênero",
        r"não discriminação",
        r"reconhecimento.*gênero",
        r"características sexuais",
        r"expressão de gênero",
        r"estatuto.*diversidade",
        r"transparência salarial.*orientação",
        r"misoginia.*orientação",
        r"proíbe.*terapias.*conversão",
        r"equipara.*(terapia|terapias).*conversão.*(à|a).*tortura",
        r"equipara.*(cura.*gay|terapia.*conversão).*tortura",
        r"garante.*(direito|direitos).*(lgbt|trans|gay|orientação)",
        r"reconhece.*(identidade|vivência|expressão)",
        r"inclui.*(orientação|identidade).*(censo|dados|pesquisa)",
        r"protege.*contra.*violência.*(lgbt|trans|gay)",
        r"cria.*mecanismos.*proteção.*(lgbt|trans|orientação)",
        r"visibilidade.*(lgbt|trans|diversidade)",
        r"representação.*(lgbt|trans|diversidade)",
        r"inclusão.*(lgbt|trans|diversidade)",
        r"comunidade.*(lgbt|trans|diversidade).*direitos",
        r"apoio.*(lgbt|trans|diversidade)",
        r"respeito.*(identidade|vivência|expressão).*gênero",
    ])
});

/// Phrases indicating restriction, exclusion or pathologisation.
static UNFAVORABLE_KEYWORDS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"sexo biológico",
        r"sexo de nascimento",
        r"ideologia de gênero",
        r"proíbe.*gênero",
        r"veda.*gênero",
        r"restringe.*gênero",
        r"valores familiares",
        r"proteção.*infância",
        r"banheiro.*sexo",
        r"vestiário.*sexo",
        r"separar.*sexo",
        r"exclusivamente.*(homem|mulher)",
        r"critério exclusivo.*sexo",
        r"proíbe.*linguagem neutra",
        r"veda.*linguagem neutra",
        r"proíbe.*educação sexual",
        r"atletas trans.*competições",
        r"escola sem partido",
        r"unissex.*separado",
        r"estatuto.*família",
        r"união.*(homem|mulher)",
        r"entre.*homem.*mulher",
        r"(proíbe|veda|proibição|vedação).*(uso|exibição|porte).*(símbolo|símbolos|ícone).*religios.*(parada|paradas|lgbtqia|lgbtt|comunidade|evento|eventos)",
        r"(proíbe|veda|proibição).*(uso|exibição).*(símbolo|símbolos).*religios.*(em|em paradas|nas paradas|de paradas).*(lgbtqia|lgbt|lgbtt)",
        r"proibição.*(uso|do uso).*(símbolo|símbolos).*(crist|religios).*(lgbt|lgbtqia|parada|evento)",
        r"(símbolo|símbolos).*(crist|religios).*(parada|paradas|lgbt|lgbtqia|evento|eventos).*(proíb|veta|veda)",
        r"impede.*presença.*menor",
        r"proíbe.*menor.*evento",
        r"criança.*evento.*lgbt",
        r"(impede|proíbe|veda).*(presença|participação|acesso).*(menor|menores|criança|crianças).*(evento|parada|manifestação|atividade).*(da|da comunidade).*(lgbtqia|lgbt|comunidade|diversidade)",
        r"(impede|proíbe|veda).*(menor|criança).*(evento|parada|comemoração).*(lgbtqia|comunidade|diversidade)",
        r"terapias.*conversão",
        r"cura.*gay",
        r"reparação.*sexual",
        r"tratamento.*orientação",
        r"laudo.*psiquiátrico.*trans",
        r"valores.*(cristão|religioso|bíblico).*educação",
        r"sagrado.*família",
        r"família.*tradicional",
        r"doença.*mental.*(trans|gay|lgbt)",
        r"transtorno.*(identidade|orientação)",
        r"desvio.*(sexual|gênero)",
        r"anormalidade.*(sexual|gênero)",
        r"proíbe.*participação.*(trans|lgbt).*evento",
        r"veda.*visibilidade.*(lgbt|gay|trans)",
        r"restringe.*acesso.*(trans|lgbt).*espaço",
    ])
});

/// Phrasings that, despite containing restriction vocabulary, describe a
/// bill outlawing a banned practice. Any match forces the keyword signal
/// far into the favorable range.
static STRONG_FAVORABLE_OVERRIDES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"equipara.*(terapia|terapias).*conversão.*(à|a).*tortura",
        r"equipara.*(cura.*gay|terapia.*conversão).*tortura",
        r"equipara.*terapia.*conversão.*tortura",
    ])
});

/// Narrow, high-precision restriction phrasings. A single match is treated
/// as near-certain evidence.
static HIGH_PRIORITY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(proíbe|veda|proibição|vedação).*(uso|do uso|exibição|porte).*(símbolo|símbolos|ícone).*religios.*(em|em paradas|nas paradas|de paradas).*(lgbtqia|lgbt|lgbtt)",
        r"(proíbe|veda|proibição).*(símbolo|símbolos).*religios.*(parada|paradas|evento|eventos).*(lgbtqia|lgbt|comunidade)",
        r"proibição.*(uso|do uso).*(símbolo|símbolos).*(crist|religios).*(lgbt|lgbtqia|parada|evento)",
        r"(símbolo|símbolos).*(crist|religios).*(parada|paradas|lgbt|lgbtqia|evento|eventos).*(proíb|veta|veda|proibição)",
        r"(impede|proíbe|veda|proibição|vedação).*(presença|participação|acesso).*(menor|menores|criança|crianças).*(em|em eventos|nos eventos|de eventos|em paradas).*(da|da comunidade|lgbtqia|lgbt|comunidade|diversidade)",
        r"(impede|proíbe|veda|proibição).*(menor|menores|criança|crianças).*(evento|parada|manifestação|atividade).*(lgbtqia|lgbt|comunidade)",
        r"proibição.*(presença|da presença).*(menor|menores|criança|crianças).*(em|nos|de).*evento.*(da|da comunidade|lgbtqia|lgbt|comunidade)",
    ])
});

/// Broader restriction phrasings; individually weaker evidence.
static GENERAL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"define.*(sexo|gênero).*biolog",
        r"(proíbe|proibição).*(ensino|divulgação).*gênero",
        r"(veda|vedação).*uso.*por.*(pessoas|indivíduos).*(diferentes|diversos)",
        r"exclusivamente.*(homem|mulher).*(cis|biologic)",
        r"(restringe|limita|restrição).*participação.*(sexo|gênero)",
        r"define.*entidade.*(homem|mulher)",
        r"(proíbe|proibição|impede|veda).*menor.*(evento|parada)",
        r"(proíbe|veda|proibição).*símbolo.*(religioso|parada|lgbt)",
    ])
});

/// High-priority matches count double in the mixed-density denominator.
const HIGH_PRIORITY_WEIGHT: usize = 2;

/// Hate-speech evidence from the toxicity model. `HATE` maps to the model's
/// probability, any other label to its complement.
pub fn toxicity_signal(model: Option<&dyn TextClassifier>, text: &str) -> f64 {
    let Some(model) = model else {
        return NEUTRAL;
    };
    match model.classify(text) {
        Ok(output) if output.label == "HATE" => output.probability,
        Ok(output) => 1.0 - output.probability,
        Err(e) => {
            debug!(error = %e, "toxicity model failed, using neutral score");
            NEUTRAL
        }
    }
}

/// Stance evidence from the position model (`LABEL_1` = favorable).
pub fn stance_signal(model: Option<&dyn TextClassifier>, text: &str) -> f64 {
    let Some(model) = model else {
        return NEUTRAL;
    };
    match model.classify(text) {
        Ok(output) => {
            let favorable = if output.label == "LABEL_1" {
                output.probability
            } else {
                1.0 - output.probability
            };
            1.0 - favorable
        }
        Err(e) => {
            debug!(error = %e, "stance model failed, using neutral score");
            NEUTRAL
        }
    }
}

/// Share of unfavorable keyword hits among all keyword hits, with the
/// strong favorable override short-circuiting to [`STRONG_FAVORABLE_SCORE`].
pub fn keyword_signal(text: &str) -> f64 {
    let lower = text.to_lowercase();
    if STRONG_FAVORABLE_OVERRIDES.iter().any(|re| re.is_match(&lower)) {
        return STRONG_FAVORABLE_SCORE;
    }
    let favorable = count_matches(&FAVORABLE_KEYWORDS, &lower);
    let unfavorable = count_matches(&UNFAVORABLE_KEYWORDS, &lower);
    let total = (favorable + unfavorable).max(1);
    (unfavorable as f64 / total as f64).min(1.0)
}

/// Tiered restriction-pattern density. Any high-priority match forces a
/// near-certain score; otherwise both tiers contribute to a weighted density.
pub fn pattern_signal(text: &str) -> f64 {
    let lower = text.to_lowercase();
    let high = count_matches(&HIGH_PRIORITY_PATTERNS, &lower);
    if high > 0 {
        return (0.99 + high as f64 * 0.002).clamp(0.99, 0.995);
    }
    let general = count_matches(&GENERAL_PATTERNS, &lower);
    let max_weighted =
        HIGH_PRIORITY_PATTERNS.len() * HIGH_PRIORITY_WEIGHT + GENERAL_PATTERNS.len();
    let weighted = high * HIGH_PRIORITY_WEIGHT + general;
    (weighted as f64 / max_weighted as f64).min(1.0)
}
