//! Classifier abstraction over the optional local models.
//!
//! The ensemble treats models as opaque scoring functions: a label and a
//! probability, nothing else. Everything downstream of this trait works
//! identically whether the backing implementation is a real ONNX session
//! or a canned stand-in.

/// One classification: the winning label and its probability.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOutput {
    pub label: String,
    pub probability: f64,
}

pub trait TextClassifier: Send + Sync {
    fn classify(&self, text: &str) -> anyhow::Result<ModelOutput>;
}

/// Classifier that always answers the same thing. Used in tests and
/// anywhere a deterministic stand-in for a model is wanted.
pub struct FixedClassifier {
    label: String,
    probability: f64,
}

impl FixedClassifier {
    pub fn new(label: impl Into<String>, probability: f64) -> Self {
        Self {
            label: label.into(),
            probability,
        }
    }
}

impl TextClassifier for FixedClassifier {
    fn classify(&self, _text: &str) -> anyhow::Result<ModelOutput> {
        Ok(ModelOutput {
            label: self.label.clone(),
            probability: self.probability,
        })
    }
}
