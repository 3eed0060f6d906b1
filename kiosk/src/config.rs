use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub ocr: OcrConfig,
    pub text_api: TextApiConfig,
    pub cache: CacheConfig,
    pub scrape: ScrapeConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    /// '+'-separated Tesseract language codes, e.g. "eng+tam+hin".
    pub languages: String,
    /// Root directory for traineddata files; engine variants live in
    /// `fast/` and `best/` subdirectories underneath it.
    pub tessdata_dir: String,
    /// Optional character whitelist applied to every recognition attempt.
    pub char_whitelist: Option<String>,
    /// Size ceiling for the simple extract endpoints.
    pub simple_max_bytes: usize,
    /// Size ceiling for the full analyze endpoints.
    pub full_max_bytes: usize,
    /// Absolute buffer ceiling enforced inside the pipeline.
    pub absolute_max_bytes: usize,
    /// Per-side pixel cap applied during preprocessing; images are never
    /// upscaled.
    pub max_dimension: u32,
    /// A preprocessed buffer smaller than this is treated as a failed
    /// transform and triggers the fallback tier.
    pub min_output_bytes: usize,
    /// Timeout for a single recognition attempt.
    pub attempt_timeout_secs: u64,
}

/// Remote text-completion API used for refinement, classification, and
/// pincode lookups.
#[derive(Debug, Clone, Deserialize)]
pub struct TextApiConfig {
    pub base_url: String,
    pub model: String,
    pub private: bool,
    pub timeout_secs: u64,
    /// Retry cap for the lookup paths that retry; refinement and
    /// classification are always single-attempt.
    pub max_retries: u32,
    pub base_retry_delay_ms: u64,
    pub max_retry_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub ttl_secs: u64,
    pub max_entries: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeConfig {
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Transient directory for spooled uploads; files are deleted when the
    /// request guard drops.
    pub upload_dir: String,
    /// Directory where decoded base64 images are written.
    pub output_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("KIOSK_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("KIOSK_PORT", 5000),
            },
            ocr: OcrConfig {
                languages: env::var("OCR_LANGUAGES").unwrap_or_else(|_| "eng".to_string()),
                tessdata_dir: env::var("TESSDATA_DIR")
                    .unwrap_or_else(|_| "/tmp/tessdata".to_string()),
                char_whitelist: env::var("OCR_CHAR_WHITELIST").ok(),
                simple_max_bytes: parse_env_or("OCR_SIMPLE_MAX_BYTES", 5 * 1024 * 1024),
                full_max_bytes: parse_env_or("OCR_FULL_MAX_BYTES", 20 * 1024 * 1024),
                absolute_max_bytes: parse_env_or("OCR_ABSOLUTE_MAX_BYTES", 50 * 1024 * 1024),
                max_dimension: parse_env_or("OCR_MAX_DIMENSION", 1200),
                min_output_bytes: parse_env_or("OCR_MIN_OUTPUT_BYTES", 1000),
                attempt_timeout_secs: parse_env_or("OCR_ATTEMPT_TIMEOUT", 30),
            },
            text_api: TextApiConfig {
                base_url: env::var("TEXT_API_URL")
                    .unwrap_or_else(|_| "https://text.pollinations.ai/".to_string()),
                model: env::var("TEXT_API_MODEL").unwrap_or_else(|_| "openai-fast".to_string()),
                private: parse_env_or("TEXT_API_PRIVATE", true),
                timeout_secs: parse_env_or("TEXT_API_TIMEOUT", 8),
                max_retries: parse_env_or("TEXT_API_MAX_RETRIES", 3),
                base_retry_delay_ms: parse_env_or("TEXT_API_BASE_RETRY_DELAY_MS", 250),
                max_retry_delay_ms: parse_env_or("TEXT_API_MAX_RETRY_DELAY_MS", 4000),
            },
            cache: CacheConfig {
                ttl_secs: parse_env_or("CACHE_TTL_SECS", 3600),
                max_entries: parse_env_or("CACHE_MAX_ENTRIES", 1000),
            },
            scrape: ScrapeConfig {
                timeout_secs: parse_env_or("SCRAPE_TIMEOUT", 8),
            },
            storage: StorageConfig {
                upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "/tmp/uploads".to_string()),
                output_dir: env::var("OUTPUT_DIR").unwrap_or_else(|_| "outputs".to_string()),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_ocr_config_defaults() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        std::env::remove_var("OCR_LANGUAGES");
        std::env::remove_var("OCR_SIMPLE_MAX_BYTES");

        let config = Config::default();
        assert_eq!(config.ocr.languages, "eng");
        assert_eq!(config.ocr.simple_max_bytes, 5 * 1024 * 1024);
        assert_eq!(config.ocr.full_max_bytes, 20 * 1024 * 1024);
        assert_eq!(config.ocr.absolute_max_bytes, 50 * 1024 * 1024);
        assert_eq!(config.ocr.max_dimension, 1200);
    }

    #[test]
    fn test_text_api_defaults() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        std::env::remove_var("TEXT_API_URL");
        std::env::remove_var("TEXT_API_MAX_RETRIES");

        let config = Config::default();
        assert_eq!(config.text_api.base_url, "https://text.pollinations.ai/");
        assert_eq!(config.text_api.model, "openai-fast");
        assert!(config.text_api.private);
        assert_eq!(config.text_api.timeout_secs, 8);
        assert_eq!(config.text_api.max_retries, 3);
    }

    #[test]
    fn test_cache_config_from_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        std::env::set_var("CACHE_TTL_SECS", "120");
        std::env::set_var("CACHE_MAX_ENTRIES", "16");

        let config = Config::default();
        assert_eq!(config.cache.ttl_secs, 120);
        assert_eq!(config.cache.max_entries, 16);

        std::env::remove_var("CACHE_TTL_SECS");
        std::env::remove_var("CACHE_MAX_ENTRIES");
    }

    #[test]
    fn test_parse_env_or_invalid_value_falls_back() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        std::env::set_var("__KIOSK_TEST_PORT", "not-a-number");
        let result: u16 = parse_env_or("__KIOSK_TEST_PORT", 5000);
        assert_eq!(result, 5000);
        std::env::remove_var("__KIOSK_TEST_PORT");
    }
}
