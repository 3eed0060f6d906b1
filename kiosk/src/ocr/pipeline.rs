use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::OcrConfig;
use crate::error::{KioskError, Result};
use crate::llm::{prompts, TextApiClient};

use super::classify::Classifier;
use super::engine::{EngineMode, OcrEngine, RecognitionSuccess};
use super::preprocess::{self, PreprocessTier};
use super::traineddata::TraineddataFetcher;

/// Final product of the full extraction flow.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct OcrOutcome {
    /// Cleaned text exactly as recognized.
    pub text: String,
    /// Remote-corrected text, or a copy of `text` when refinement was
    /// unavailable.
    pub refined_text: String,
    /// Classified document type, `"Unknown Document"` when undetermined.
    pub document_type: String,
}

/// The end-to-end analyze flow: validate, preprocess, recognize across the
/// parameter sweep (preprocessed buffer first, original buffer second),
/// then refine and classify via the remote text API. The remote stages are
/// best-effort; only ingest validation and recognition can fail a request.
#[derive(Clone)]
pub struct ExtractionPipeline {
    config: Arc<OcrConfig>,
    engine: OcrEngine,
    classifier: Classifier,
    text_api: TextApiClient,
    fetcher: TraineddataFetcher,
}

impl ExtractionPipeline {
    pub fn new(config: &OcrConfig, text_api: TextApiClient) -> Result<Self> {
        Ok(Self {
            config: Arc::new(config.clone()),
            engine: OcrEngine::new(config),
            classifier: Classifier::new(),
            text_api,
            fetcher: TraineddataFetcher::new(&config.tessdata_dir)?,
        })
    }

    pub fn engine(&self) -> &OcrEngine {
        &self.engine
    }

    pub fn fetcher(&self) -> &TraineddataFetcher {
        &self.fetcher
    }

    pub async fn analyze(&self, bytes: Vec<u8>, languages: &str) -> Result<OcrOutcome> {
        if bytes.is_empty() {
            return Err(KioskError::Validation("Empty image payload".into()));
        }
        if bytes.len() > self.config.absolute_max_bytes {
            return Err(KioskError::Validation(format!(
                "Image size exceeds {}MB limit",
                self.config.absolute_max_bytes / (1024 * 1024)
            )));
        }
        preprocess::validate_image(&bytes)?;

        let (processed, tier) = preprocess::preprocess(&bytes, &self.config);
        if tier != PreprocessTier::Primary {
            tracing::warn!(tier = tier.as_str(), "Preprocessing degraded");
        }

        let original = Arc::new(bytes);
        let processed = Arc::new(processed);

        let recognized = match self.sweep_buffer(processed, languages).await {
            Ok(success) => success,
            Err(first) => {
                tracing::warn!(
                    error = %first,
                    "Sweep over preprocessed buffer exhausted, retrying with original buffer"
                );
                self.sweep_buffer(original, languages).await.map_err(|second| {
                    KioskError::Extraction(format!(
                        "All recognition attempts failed (preprocessed: {first}; original: {second})"
                    ))
                })?
            }
        };

        tracing::info!(
            engine_mode = ?recognized.engine_mode,
            segmentation = recognized.segmentation.label(),
            chars = recognized.text.len(),
            "Recognition complete"
        );

        let refined_text = refine_text(&self.text_api, &recognized.text).await;
        let document_type = self.classifier.classify(&refined_text, &self.text_api).await;

        Ok(OcrOutcome {
            text: recognized.text,
            refined_text,
            document_type,
        })
    }

    /// One full priority-ordered sweep over a single buffer: fast models
    /// first, then best, fetching traineddata lazily per engine mode.
    async fn sweep_buffer(
        &self,
        bytes: Arc<Vec<u8>>,
        languages: &str,
    ) -> Result<RecognitionSuccess> {
        let mut last_err: Option<KioskError> = None;

        for mode in EngineMode::ALL {
            if let Err(e) = self.fetcher.ensure(mode, languages).await {
                // Missing models make the attempts below fail individually;
                // the sweep carries on to the next engine mode either way.
                tracing::warn!(mode = ?mode, error = %e, "Traineddata fetch failed");
            }

            match self.engine.sweep_mode(bytes.clone(), languages, mode).await {
                Ok(success) => return Ok(success),
                Err(e) => last_err = Some(e),
            }
        }

        Err(last_err
            .unwrap_or_else(|| KioskError::Extraction("No recognition attempts ran".into())))
    }
}

/// Best-effort remote refinement; any failure returns the input text
/// unchanged. A refinement outage must never fail the primary request.
pub async fn refine_text(client: &TextApiClient, text: &str) -> String {
    match client.complete_json(&prompts::refine_prompt(text)).await {
        Ok(value) => match value.get("refined_text").and_then(|v| v.as_str()) {
            Some(refined) => refined.to_string(),
            None => {
                tracing::warn!("Text API refinement reply missing refined_text, keeping original");
                text.to_string()
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "Text API refinement failed, keeping original");
            text.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn pipeline_with_base_url(base_url: &str) -> ExtractionPipeline {
        let config = Config::default();
        let mut text_api = config.text_api.clone();
        text_api.base_url = base_url.to_string();
        let client = TextApiClient::new(&text_api).unwrap();
        ExtractionPipeline::new(&config.ocr, client).unwrap()
    }

    #[tokio::test]
    async fn empty_payload_is_a_client_error() {
        let pipeline = pipeline_with_base_url("http://127.0.0.1:9");
        let err = pipeline.analyze(Vec::new(), "eng").await.unwrap_err();
        assert!(matches!(err, KioskError::Validation(_)));
    }

    #[tokio::test]
    async fn non_image_payload_is_a_client_error() {
        let pipeline = pipeline_with_base_url("http://127.0.0.1:9");
        let err = pipeline
            .analyze(vec![0u8; 64], "eng")
            .await
            .unwrap_err();
        assert!(matches!(err, KioskError::Validation(_)));
    }

    #[tokio::test]
    async fn oversized_payload_is_rejected_before_decoding() {
        let config = Config::default();
        let mut ocr = config.ocr.clone();
        ocr.absolute_max_bytes = 16;
        let client = TextApiClient::new(&config.text_api).unwrap();
        let pipeline = ExtractionPipeline::new(&ocr, client).unwrap();

        let err = pipeline.analyze(vec![0u8; 32], "eng").await.unwrap_err();
        match err {
            KioskError::Validation(msg) => assert!(msg.contains("limit")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
