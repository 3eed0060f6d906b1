//! OCR subsystem.
//!
//! The pipeline layers image preprocessing, a priority-ordered recognition
//! sweep over Tesseract parameters, and best-effort remote refinement and
//! classification:
//!
//! - `preprocess`: tiered image normalization with observable fallbacks
//! - `engine`: per-attempt Tesseract handles, segmentation/engine sweep
//! - `text`: pure cleanup and the validity predicate
//! - `classify`: regex signature table with a remote fallback tier
//! - `traineddata`: on-demand language model downloads
//! - `pipeline`: the end-to-end analyze flow

pub mod classify;
pub mod engine;
pub mod pipeline;
pub mod preprocess;
pub mod text;
pub mod traineddata;

pub use classify::Classifier;
pub use engine::{EngineMode, OcrEngine, SegmentationMode};
pub use pipeline::{ExtractionPipeline, OcrOutcome};
pub use preprocess::PreprocessTier;
pub use traineddata::TraineddataFetcher;
