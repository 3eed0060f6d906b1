use serde::{Deserialize, Serialize};

use crate::cache::ResponseCache;
use crate::config::Config;
use crate::error::{KioskError, Result};
use crate::llm::{prompts, TextApiClient};

/// City/state pair resolved for a pincode.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Location {
    pub city: String,
    pub state: String,
}

/// Pincode-to-location lookups backed by the remote text API.
///
/// This is the one remote path that retries (bounded, with backoff and
/// jitter) instead of degrading: there is no useful fallback value for a
/// location. Successful lookups are cached; the handler reports whether a
/// reply was served from cache.
#[derive(Clone)]
pub struct PincodeService {
    client: TextApiClient,
    cache: ResponseCache<Location>,
}

impl PincodeService {
    pub fn new(config: &Config, client: TextApiClient) -> Self {
        Self {
            client,
            cache: ResponseCache::from_config(&config.cache),
        }
    }

    /// Resolve a pincode. Returns the location and whether it came from
    /// the cache.
    pub async fn lookup(&self, pincode: &str) -> Result<(Location, bool)> {
        if !is_valid_pincode(pincode) {
            return Err(KioskError::Validation(
                "Invalid pincode. Must be a 6-digit number.".into(),
            ));
        }

        if let Some(location) = self.cache.get(pincode) {
            return Ok((location, true));
        }

        let reply = self
            .client
            .complete_json_with_retry(&prompts::pincode_prompt(pincode))
            .await?;

        // The pincode already passed local validation; an error reported by
        // the remote side is an upstream determination, not client input.
        if let Some(message) = reply.get("error").and_then(|v| v.as_str()) {
            return Err(KioskError::Upstream(message.to_string()));
        }

        let city = reply.get("city").and_then(|v| v.as_str());
        let state = reply.get("state").and_then(|v| v.as_str());
        let location = match (city, state) {
            (Some(city), Some(state)) => Location {
                city: city.to_string(),
                state: state.to_string(),
            },
            _ => {
                return Err(KioskError::Upstream(
                    "Response missing city or state fields".into(),
                ));
            }
        };

        self.cache.put(pincode.to_string(), location.clone());
        Ok((location, false))
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn purge_expired(&self) -> usize {
        self.cache.purge_expired()
    }
}

/// Indian pincodes are exactly six ASCII digits.
fn is_valid_pincode(pincode: &str) -> bool {
    pincode.len() == 6 && pincode.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_digits_are_valid() {
        assert!(is_valid_pincode("110001"));
    }

    #[test]
    fn wrong_lengths_are_invalid() {
        assert!(!is_valid_pincode("12345"));
        assert!(!is_valid_pincode("1234567"));
        assert!(!is_valid_pincode(""));
    }

    #[test]
    fn non_digits_are_invalid() {
        assert!(!is_valid_pincode("11000a"));
        assert!(!is_valid_pincode("11 001"));
        // Non-ASCII digits must not pass.
        assert!(!is_valid_pincode("١١٠٠٠١"));
    }

    #[tokio::test]
    async fn malformed_pincode_fails_before_any_network_call() {
        let config = Config::default();
        let mut text_api = config.text_api.clone();
        // Unroutable address: if validation did not short-circuit, this
        // test would hang on retries.
        text_api.base_url = "http://127.0.0.1:9".to_string();
        text_api.max_retries = 0;
        let client = TextApiClient::new(&text_api).unwrap();
        let service = PincodeService::new(&config, client);

        let err = service.lookup("12345").await.unwrap_err();
        assert!(matches!(err, KioskError::Validation(_)));
    }
}
