use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;

use crate::error::{KioskError, Result};

use super::engine::EngineMode;

const TESSDATA_FAST_URL: &str = "https://github.com/tesseract-ocr/tessdata_fast/raw/main";
const TESSDATA_BEST_URL: &str = "https://github.com/tesseract-ocr/tessdata_best/raw/main";
const TESSDATA_OSD_URL: &str = "https://github.com/tesseract-ocr/tessdata/raw/main";

const DOWNLOAD_TIMEOUT_SECS: u64 = 120;

/// Downloads Tesseract traineddata files on first use.
///
/// Language files come from the repository matching the engine mode
/// (`tessdata_fast` or `tessdata_best`); the orientation/script model
/// (`osd`) always comes from the main `tessdata` repository. Files that
/// already exist on disk are left alone, so this is cheap after the first
/// request per language.
#[derive(Clone)]
pub struct TraineddataFetcher {
    client: Client,
    root: PathBuf,
}

impl TraineddataFetcher {
    pub fn new(tessdata_dir: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
            .build()
            .map_err(|e| KioskError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            root: PathBuf::from(tessdata_dir),
        })
    }

    /// Ensure every language in the '+'-separated selector, plus `osd`, is
    /// present for the given engine mode.
    pub async fn ensure(&self, mode: EngineMode, languages: &str) -> Result<()> {
        let dir = self.root.join(mode.subdir());
        tokio::fs::create_dir_all(&dir).await?;

        self.ensure_file(&dir, "osd", TESSDATA_OSD_URL).await?;

        let repo = match mode {
            EngineMode::Fast => TESSDATA_FAST_URL,
            EngineMode::Best => TESSDATA_BEST_URL,
        };
        for lang in languages.split('+').filter(|l| !l.is_empty()) {
            self.ensure_file(&dir, lang, repo).await?;
        }

        Ok(())
    }

    async fn ensure_file(&self, dir: &Path, lang: &str, repo: &str) -> Result<()> {
        let target = dir.join(format!("{lang}.traineddata"));
        if tokio::fs::try_exists(&target).await.unwrap_or(false) {
            return Ok(());
        }

        let url = format!("{repo}/{lang}.traineddata");
        tracing::info!(%url, "Downloading traineddata");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| KioskError::Upstream(format!("Traineddata download failed: {e}")))?;

        if !response.status().is_success() {
            return Err(KioskError::Upstream(format!(
                "Traineddata download for '{lang}' returned {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| KioskError::Upstream(format!("Traineddata download failed: {e}")))?;

        // Write through a temp name so a partial download never shows up as
        // a usable model file.
        let partial = dir.join(format!("{lang}.traineddata.partial"));
        tokio::fs::write(&partial, &bytes).await?;
        tokio::fs::rename(&partial, &target).await?;

        tracing::info!(path = %target.display(), bytes = bytes.len(), "Traineddata ready");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetcher_construction_does_not_touch_disk() {
        let fetcher = TraineddataFetcher::new("/nonexistent/tessdata");
        assert!(fetcher.is_ok());
    }

    #[tokio::test]
    async fn existing_file_is_not_redownloaded() {
        let dir = tempfile::tempdir().unwrap();
        let fast_dir = dir.path().join("fast");
        std::fs::create_dir_all(&fast_dir).unwrap();
        std::fs::write(fast_dir.join("eng.traineddata"), b"model").unwrap();
        std::fs::write(fast_dir.join("osd.traineddata"), b"model").unwrap();

        let fetcher = TraineddataFetcher::new(dir.path().to_str().unwrap()).unwrap();
        fetcher
            .ensure(EngineMode::Fast, "eng")
            .await
            .expect("existing files should satisfy ensure without network access");
    }
}
