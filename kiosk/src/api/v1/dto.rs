//! Request and response DTOs for the v1 API.
//!
//! Query parameters are declared as `Option` so a missing value becomes a
//! structured `{"error": ...}` reply from the handler instead of an axum
//! rejection in a different shape.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct QrQuery {
    /// Text to encode into the QR code.
    pub data: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QrResponse {
    /// PNG rendition of the QR code as a base64 data URL.
    pub base64: String,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ScrapeQuery {
    /// Absolute http(s) URL of the page to scrape.
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaletteQuery {
    /// Palette scheme: analogous, complementary, monochromatic, triadic.
    /// Defaults to analogous.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Comma-separated seed colors in hex. Defaults to `#3498db`.
    pub seeds: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaletteResponse {
    #[serde(rename = "type")]
    pub kind: String,
    pub palettes: Vec<crate::services::palette::SeedPalette>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PincodeResponse {
    pub pincode: String,
    pub city: String,
    pub state: String,
    /// Whether this reply was served from the in-process cache.
    pub cached: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ExtractBase64Request {
    /// Base64 image payload; a `data:image/...;base64,` URL or bare base64.
    pub base64: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AnalyzeBase64Request {
    /// Base64 image payload. Must be a `data:image/...;base64,` URL.
    pub base64: Option<String>,
    /// '+'-separated Tesseract language codes; defaults to the configured
    /// selector.
    pub languages: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TextResponse {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DataUrlResponse {
    pub base64: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct FromBase64Request {
    /// Base64 data URL to decode.
    pub base64: Option<String>,
    /// Output filename; defaults to `output.png`.
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SavedImageResponse {
    pub message: String,
    pub path: String,
}
