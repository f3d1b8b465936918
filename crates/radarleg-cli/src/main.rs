//! radarleg: harvests legislative bills from four public sources, filters
//! them for relevance, scores each one with the hybrid ensemble, and prints
//! a triage report.

use std::sync::Arc;

use chrono::Datelike;
use clap::Parser;

use radarleg_ai::EnsembleScorer;
use radarleg_core::{RelevanceFilter, SourceName, TermSet};
use radarleg_sources::{
    Aggregator, AlespAdapter, CamaraAdapter, CollectRequest, HttpTransport, MunicipalSpAdapter,
    ProgressSink, SenadoAdapter, SourceAdapter,
};

mod display;

#[derive(Parser)]
#[command(name = "radarleg", version, about = "Radar de projetos de lei")]
struct Args {
    /// First legislative year to search.
    #[arg(long)]
    from_year: i32,

    /// Last legislative year to search. Defaults to the current year.
    #[arg(long)]
    to_year: Option<i32>,

    /// Maximum number of bills in the report.
    #[arg(long, default_value_t = 50)]
    limit: usize,

    /// Source to search (camara, senado, alesp, municipal-sp). Repeatable;
    /// all four when omitted.
    #[arg(long = "source", value_name = "SOURCE")]
    sources: Vec<SourceName>,

    /// Directory with `toxicity/` and `stance/` model subdirectories, each
    /// holding `model.onnx` and `tokenizer.json`.
    #[cfg(feature = "onnx")]
    #[arg(long)]
    model_dir: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let to_year = args
        .to_year
        .unwrap_or_else(|| chrono::Utc::now().year());
    let sources = if args.sources.is_empty() {
        vec![
            SourceName::Camara,
            SourceName::Senado,
            SourceName::Alesp,
            SourceName::MunicipalSp,
        ]
    } else {
        args.sources.clone()
    };

    let transport = Arc::new(HttpTransport::new());
    let adapters: Vec<Box<dyn SourceAdapter>> = vec![
        Box::new(CamaraAdapter::new(transport.clone())),
        Box::new(SenadoAdapter::new(transport.clone())),
        Box::new(AlespAdapter::new(transport.clone())),
        Box::new(MunicipalSpAdapter::new(transport)),
    ];
    let aggregator = Aggregator::new(adapters, RelevanceFilter::new(TermSet::default()));
    let scorer = build_scorer(&args)?;

    let request = CollectRequest {
        start_year: args.from_year,
        end_year: to_year,
        sources,
        limit: args.limit,
    };
    let progress = ProgressSink::new(|event| display::progress(&event));
    let collection = aggregator.collect(&request, &progress).await?;

    let scored: Vec<display::ScoredBill> = collection
        .bills
        .into_iter()
        .map(|bill| {
            let result = scorer.classify(&bill.record.summary);
            display::ScoredBill { bill, result }
        })
        .collect();

    display::report(&scored, &collection.warnings);
    Ok(())
}

#[cfg(feature = "onnx")]
fn build_scorer(args: &Args) -> anyhow::Result<EnsembleScorer> {
    use radarleg_ai::{OnnxClassifier, TextClassifier, STANCE_LABELS, TOXICITY_LABELS};

    let Some(dir) = &args.model_dir else {
        return Ok(EnsembleScorer::without_models());
    };
    let toxicity: Box<dyn TextClassifier> =
        Box::new(OnnxClassifier::load(&dir.join("toxicity"), &TOXICITY_LABELS)?);
    // The stance model is a nice-to-have; its weight redistributes when
    // it cannot be loaded.
    let stance: Option<Box<dyn TextClassifier>> =
        match OnnxClassifier::load(&dir.join("stance"), &STANCE_LABELS) {
            Ok(model) => Some(Box::new(model)),
            Err(e) => {
                tracing::warn!(error = %e, "stance model unavailable, continuing without it");
                None
            }
        };
    Ok(EnsembleScorer::new(Some(toxicity), stance))
}

#[cfg(not(feature = "onnx"))]
fn build_scorer(_args: &Args) -> anyhow::Result<EnsembleScorer> {
    Ok(EnsembleScorer::without_models())
}
