//! Hybrid scoring of legislative summaries.
//!
//! Four evidence signals (two optional local models, two lexical
//! extractors) are combined by a weighted ensemble into a triage verdict.
//! The model-backed signals are feature-gated: without the `onnx` feature
//! the ensemble runs on lexical evidence alone.

pub mod ensemble;
pub mod model;
pub mod signals;

#[cfg(feature = "onnx")]
mod onnx;

pub use ensemble::{EnsembleScorer, ScoreResult, SignalSet, Verdict, WeightSet};
pub use model::{FixedClassifier, ModelOutput, TextClassifier};
#[cfg(feature = "onnx")]
pub use onnx::{OnnxClassifier, STANCE_LABELS, TOXICITY_LABELS};
