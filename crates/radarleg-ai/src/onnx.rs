//! ONNX Runtime text classification for the model-backed signals.
//!
//! Loads a fine-tuned BERT-style sequence classifier exported to ONNX. The
//! model directory must contain `model.onnx` and `tokenizer.json`. Output
//! logits are softmaxed and the winning label is reported with its
//! probability.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::info;

use crate::model::{ModelOutput, TextClassifier};

/// Label order of the hate-speech classifier's output head.
pub const TOXICITY_LABELS: [&str; 2] = ["NOT_HATE", "HATE"];
/// Label order of the stance classifier's output head (`LABEL_1` = favorable).
pub const STANCE_LABELS: [&str; 2] = ["LABEL_0", "LABEL_1"];

/// Summaries rarely exceed a paragraph; 256 tokens covers them.
const MAX_LENGTH: usize = 256;

pub struct OnnxClassifier {
    // ort sessions take &mut to run; the trait is &self.
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    labels: Vec<String>,
}

impl OnnxClassifier {
    /// Load a classifier from a directory containing `model.onnx` and
    /// `tokenizer.json`. `labels` gives the output head's label order.
    pub fn load(model_dir: &Path, labels: &[&str]) -> anyhow::Result<Self> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        anyhow::ensure!(model_path.exists(), "model.onnx not found in {model_dir:?}");
        anyhow::ensure!(
            tokenizer_path.exists(),
            "tokenizer.json not found in {model_dir:?}"
        );

        let session = Session::builder()?.commit_from_file(&model_path)?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("load tokenizer: {e}"))?;
        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: MAX_LENGTH,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("set truncation: {e}"))?;

        info!(model = %model_path.display(), labels = labels.len(), "loaded classifier");
        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            labels: labels.iter().map(|l| l.to_string()).collect(),
        })
    }
}

impl TextClassifier for OnnxClassifier {
    fn classify(&self, text: &str) -> anyhow::Result<ModelOutput> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow::anyhow!("tokenize: {e}"))?;

        let seq_len = encoding.get_ids().len();
        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();
        let token_type_ids: Vec<i64> = encoding
            .get_type_ids()
            .iter()
            .map(|&t| t as i64)
            .collect();

        let shape = [1i64, seq_len as i64];
        let ids_tensor = Tensor::from_array((shape, input_ids.into_boxed_slice()))?;
        let mask_tensor = Tensor::from_array((shape, attention_mask.into_boxed_slice()))?;
        let type_tensor = Tensor::from_array((shape, token_type_ids.into_boxed_slice()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("classifier session poisoned"))?;
        let outputs = session.run(ort::inputs![
            "input_ids" => ids_tensor,
            "attention_mask" => mask_tensor,
            "token_type_ids" => type_tensor,
        ])?;

        // Logits: [1, num_labels].
        let (output_shape, logits) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: &[i64] = output_shape;
        anyhow::ensure!(
            dims.len() == 2 && dims[1] as usize == self.labels.len(),
            "unexpected output shape {dims:?}, expected [1, {}]",
            self.labels.len()
        );

        let probabilities = softmax(logits);
        let (best, probability) = probabilities
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .ok_or_else(|| anyhow::anyhow!("empty output head"))?;

        Ok(ModelOutput {
            label: self.labels[best].clone(),
            probability: *probability as f64,
        })
    }
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}
