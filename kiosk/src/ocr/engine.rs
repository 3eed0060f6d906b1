use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use leptess::{LepTess, Variable};

use crate::config::OcrConfig;
use crate::error::{KioskError, Result};

use super::text::{clean_text, is_valid_text};

/// Which traineddata variant the engine recognizes with. `Fast` models are
/// tried before `Best`: they cover the common case cheaply, and the larger
/// models only run when the fast ones produced nothing usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineMode {
    Fast,
    Best,
}

impl EngineMode {
    pub const ALL: [EngineMode; 2] = [EngineMode::Fast, EngineMode::Best];

    /// Subdirectory under the tessdata root holding this variant's models.
    pub fn subdir(&self) -> &'static str {
        match self {
            EngineMode::Fast => "fast",
            EngineMode::Best => "best",
        }
    }
}

/// Tesseract page segmentation modes, ordered from the most general page
/// assumption to the most specific. The order is part of the contract:
/// recognition stops at the first pair that yields valid text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentationMode {
    Auto,
    SparseText,
    SingleBlock,
    SingleBlockVertText,
}

impl SegmentationMode {
    pub const ALL: [SegmentationMode; 4] = [
        SegmentationMode::Auto,
        SegmentationMode::SparseText,
        SegmentationMode::SingleBlock,
        SegmentationMode::SingleBlockVertText,
    ];

    /// Numeric value for the `tessedit_pageseg_mode` variable.
    pub fn psm(&self) -> &'static str {
        match self {
            SegmentationMode::Auto => "3",
            SegmentationMode::SparseText => "11",
            SegmentationMode::SingleBlock => "6",
            SegmentationMode::SingleBlockVertText => "5",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SegmentationMode::Auto => "AUTO",
            SegmentationMode::SparseText => "SPARSE_TEXT",
            SegmentationMode::SingleBlock => "SINGLE_BLOCK",
            SegmentationMode::SingleBlockVertText => "SINGLE_BLOCK_VERT_TEXT",
        }
    }
}

/// The full (engine mode, segmentation mode) priority order for a sweep.
pub fn mode_pairs() -> Vec<(EngineMode, SegmentationMode)> {
    let mut pairs = Vec::with_capacity(EngineMode::ALL.len() * SegmentationMode::ALL.len());
    for engine in EngineMode::ALL {
        for seg in SegmentationMode::ALL {
            pairs.push((engine, seg));
        }
    }
    pairs
}

/// A successful recognition attempt: cleaned text plus the parameters that
/// produced it.
#[derive(Debug, Clone)]
pub struct RecognitionSuccess {
    pub text: String,
    pub engine_mode: EngineMode,
    pub segmentation: SegmentationMode,
}

/// Wrapper around Tesseract recognition.
///
/// Every attempt constructs its own `LepTess` handle and drops it before
/// the next attempt starts, so exactly one engine instance exists at a time
/// within a request and nothing leaks when an attempt errors out. The
/// blocking Tesseract work runs on the blocking pool.
#[derive(Clone)]
pub struct OcrEngine {
    config: Arc<OcrConfig>,
}

impl OcrEngine {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            config: Arc::new(config.clone()),
        }
    }

    pub fn languages(&self) -> &str {
        &self.config.languages
    }

    fn tessdata_path(&self, mode: EngineMode) -> PathBuf {
        Path::new(&self.config.tessdata_dir).join(mode.subdir())
    }

    /// Sweep every segmentation mode, in priority order, under one engine
    /// mode. Returns the first attempt that produces text passing the
    /// validity check, or an aggregate error once every pair has been
    /// tried. The caller iterates engine modes so traineddata for the
    /// larger models is only fetched when the fast ones have failed.
    pub async fn sweep_mode(
        &self,
        bytes: Arc<Vec<u8>>,
        languages: &str,
        mode: EngineMode,
    ) -> Result<RecognitionSuccess> {
        let engine = self.clone();
        let languages = languages.to_string();
        let timeout = Duration::from_secs(
            self.config.attempt_timeout_secs * SegmentationMode::ALL.len() as u64,
        );

        let result = tokio::time::timeout(
            timeout,
            tokio::task::spawn_blocking(move || engine.sweep_blocking(&bytes, &languages, mode)),
        )
        .await;

        match result {
            Ok(joined) => joined
                .map_err(|e| KioskError::Extraction(format!("Recognition task panicked: {e}")))?,
            Err(_) => Err(KioskError::Extraction(format!(
                "Recognition sweep timed out after {} seconds",
                timeout.as_secs()
            ))),
        }
    }

    fn sweep_blocking(
        &self,
        bytes: &[u8],
        languages: &str,
        engine_mode: EngineMode,
    ) -> Result<RecognitionSuccess> {
        let mut last_failure = String::from("no attempts ran");

        for segmentation in SegmentationMode::ALL {
            match self.attempt(bytes, languages, engine_mode, segmentation) {
                Ok(raw) => {
                    let cleaned = clean_text(&raw);
                    if is_valid_text(&cleaned) {
                        tracing::info!(
                            engine_mode = ?engine_mode,
                            segmentation = segmentation.label(),
                            chars = cleaned.len(),
                            "Recognition attempt succeeded"
                        );
                        return Ok(RecognitionSuccess {
                            text: cleaned,
                            engine_mode,
                            segmentation,
                        });
                    }
                    last_failure = format!(
                        "{:?}/{} produced text failing the validity check",
                        engine_mode,
                        segmentation.label()
                    );
                    tracing::debug!("{last_failure}");
                }
                Err(e) => {
                    last_failure =
                        format!("{:?}/{}: {e}", engine_mode, segmentation.label());
                    tracing::debug!("Recognition attempt failed: {last_failure}");
                }
            }
        }

        Err(KioskError::Extraction(format!(
            "All {:?} recognition attempts exhausted; last failure: {last_failure}",
            engine_mode
        )))
    }

    /// One recognition attempt with the given parameters. The `LepTess`
    /// handle lives only for the duration of this call.
    fn attempt(
        &self,
        bytes: &[u8],
        languages: &str,
        engine_mode: EngineMode,
        segmentation: SegmentationMode,
    ) -> Result<String> {
        let mut tess = self.init_instance(languages, engine_mode, segmentation)?;

        tess.set_image_from_mem(bytes)
            .map_err(|e| KioskError::Extraction(format!("Failed to load image: {e}")))?;

        self.read_text(&mut tess)
    }

    /// Single-shot recognition used by the plain extract endpoints: one
    /// attempt, single-block segmentation, fast models, strict whitelist.
    pub async fn recognize_single(
        &self,
        path: PathBuf,
        languages: &str,
        whitelist: &str,
    ) -> Result<String> {
        let engine = self.clone();
        let languages = languages.to_string();
        let whitelist = whitelist.to_string();
        let timeout = Duration::from_secs(self.config.attempt_timeout_secs);

        let result = tokio::time::timeout(
            timeout,
            tokio::task::spawn_blocking(move || {
                engine.recognize_single_blocking(&path, &languages, &whitelist)
            }),
        )
        .await;

        match result {
            Ok(joined) => joined
                .map_err(|e| KioskError::Extraction(format!("Recognition task panicked: {e}")))?,
            Err(_) => Err(KioskError::Extraction(format!(
                "Recognition timed out after {} seconds",
                timeout.as_secs()
            ))),
        }
    }

    /// Memory-based variant of [`OcrEngine::recognize_single`], used by the
    /// base64 extract endpoint where no upload file exists.
    pub async fn recognize_single_mem(
        &self,
        bytes: Vec<u8>,
        languages: &str,
        whitelist: &str,
    ) -> Result<String> {
        let engine = self.clone();
        let languages = languages.to_string();
        let whitelist = whitelist.to_string();
        let timeout = Duration::from_secs(self.config.attempt_timeout_secs);

        let result = tokio::time::timeout(
            timeout,
            tokio::task::spawn_blocking(move || {
                let mut tess = engine.single_shot_instance(&languages, &whitelist)?;
                tess.set_image_from_mem(&bytes)
                    .map_err(|e| KioskError::Extraction(format!("Failed to load image: {e}")))?;
                engine.read_text(&mut tess)
            }),
        )
        .await;

        match result {
            Ok(joined) => joined
                .map_err(|e| KioskError::Extraction(format!("Recognition task panicked: {e}")))?,
            Err(_) => Err(KioskError::Extraction(format!(
                "Recognition timed out after {} seconds",
                timeout.as_secs()
            ))),
        }
    }

    fn recognize_single_blocking(
        &self,
        path: &Path,
        languages: &str,
        whitelist: &str,
    ) -> Result<String> {
        let mut tess = self.single_shot_instance(languages, whitelist)?;

        let uri = path
            .to_str()
            .ok_or_else(|| KioskError::Validation("Upload path is not valid UTF-8".into()))?;
        tess.set_image(uri)
            .map_err(|e| KioskError::Extraction(format!("Failed to load image: {e}")))?;

        self.read_text(&mut tess)
    }

    fn single_shot_instance(&self, languages: &str, whitelist: &str) -> Result<LepTess> {
        let mut tess =
            self.init_instance(languages, EngineMode::Fast, SegmentationMode::SingleBlock)?;
        tess.set_variable(Variable::TesseditCharWhitelist, whitelist)
            .map_err(|e| KioskError::Extraction(format!("Failed to set whitelist: {e}")))?;
        Ok(tess)
    }

    fn read_text(&self, tess: &mut LepTess) -> Result<String> {
        let raw = tess
            .get_utf8_text()
            .map_err(|e| KioskError::Extraction(format!("Failed to extract text: {e}")))?;

        if raw.trim().is_empty() {
            return Err(KioskError::NoTextDetected);
        }

        Ok(raw)
    }

    fn init_instance(
        &self,
        languages: &str,
        engine_mode: EngineMode,
        segmentation: SegmentationMode,
    ) -> Result<LepTess> {
        let datapath = self.tessdata_path(engine_mode);
        let mut tess = LepTess::new(datapath.to_str(), languages)
            .map_err(|e| KioskError::Extraction(format!("Failed to initialize Tesseract: {e}")))?;

        tess.set_variable(Variable::TesseditPagesegMode, segmentation.psm())
            .map_err(|e| KioskError::Extraction(format!("Failed to set PSM mode: {e}")))?;

        if let Some(whitelist) = &self.config.char_whitelist {
            tess.set_variable(Variable::TesseditCharWhitelist, whitelist)
                .map_err(|e| KioskError::Extraction(format!("Failed to set whitelist: {e}")))?;
        }

        Ok(tess)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_pairs_follow_priority_order() {
        let pairs = mode_pairs();
        assert_eq!(pairs.len(), 8);

        // Fast models first, each swept general-to-specific.
        assert_eq!(pairs[0], (EngineMode::Fast, SegmentationMode::Auto));
        assert_eq!(pairs[1], (EngineMode::Fast, SegmentationMode::SparseText));
        assert_eq!(pairs[2], (EngineMode::Fast, SegmentationMode::SingleBlock));
        assert_eq!(
            pairs[3],
            (EngineMode::Fast, SegmentationMode::SingleBlockVertText)
        );
        assert_eq!(pairs[4], (EngineMode::Best, SegmentationMode::Auto));
        assert_eq!(
            pairs[7],
            (EngineMode::Best, SegmentationMode::SingleBlockVertText)
        );
    }

    #[test]
    fn psm_values_match_tesseract_constants() {
        assert_eq!(SegmentationMode::Auto.psm(), "3");
        assert_eq!(SegmentationMode::SparseText.psm(), "11");
        assert_eq!(SegmentationMode::SingleBlock.psm(), "6");
        assert_eq!(SegmentationMode::SingleBlockVertText.psm(), "5");
    }

    #[test]
    fn tessdata_paths_split_by_engine_mode() {
        let config = crate::config::Config::default().ocr;
        let engine = OcrEngine::new(&config);
        let fast = engine.tessdata_path(EngineMode::Fast);
        let best = engine.tessdata_path(EngineMode::Best);
        assert!(fast.ends_with("fast"));
        assert!(best.ends_with("best"));
        assert_ne!(fast, best);
    }
}
