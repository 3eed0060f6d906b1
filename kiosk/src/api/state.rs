use std::sync::Arc;

use crate::cache::ResponseCache;
use crate::config::Config;
use crate::error::Result;
use crate::llm::TextApiClient;
use crate::ocr::{ExtractionPipeline, OcrOutcome};
use crate::services::{PincodeService, ScrapeService};

/// Shared application state, built once at startup. Every cache lives
/// here and reaches handlers by injection; there is no module-level
/// mutable state anywhere in the service.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub text_api: TextApiClient,
    pub pipeline: ExtractionPipeline,
    pub pincode: PincodeService,
    pub scraper: ScrapeService,
    /// Results of the plain extract endpoints, keyed by content hash.
    pub extract_cache: ResponseCache<String>,
    /// Results of the full analyze endpoints, keyed by content hash plus
    /// language selector.
    pub analyze_cache: ResponseCache<OcrOutcome>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let text_api = TextApiClient::new(&config.text_api)?;
        let pipeline = ExtractionPipeline::new(&config.ocr, text_api.clone())?;
        let pincode = PincodeService::new(&config, text_api.clone());
        let scraper = ScrapeService::new(&config.scrape)?;
        let extract_cache = ResponseCache::from_config(&config.cache);
        let analyze_cache = ResponseCache::from_config(&config.cache);

        Ok(Self {
            config: Arc::new(config),
            text_api,
            pipeline,
            pincode,
            scraper,
            extract_cache,
            analyze_cache,
        })
    }

    /// Sweep expired entries out of every cache. Driven by the background
    /// purge task.
    pub fn purge_caches(&self) -> usize {
        self.extract_cache.purge_expired()
            + self.analyze_cache.purge_expired()
            + self.pincode.purge_expired()
    }
}
