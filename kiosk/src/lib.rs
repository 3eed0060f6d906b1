//! Kiosk: a collection of small HTTP utility endpoints.
//!
//! Each endpoint wraps a third-party capability behind light validation
//! and pre/post-processing: Tesseract OCR (with a multi-pass parameter
//! sweep, remote refinement, and document classification), QR code
//! generation, base64/image conversion, pincode-to-location lookup via a
//! remote text API, web scraping, and color palettes.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod llm;
pub mod ocr;
pub mod services;

pub use api::{create_router, AppState};
pub use config::Config;
pub use error::{KioskError, Result};
