//! Remote text-completion API client.
//!
//! The upstream endpoint accepts `{messages, model, private}` and replies
//! with either a bare JSON object or a markdown-fenced JSON string; the
//! client normalizes both into `serde_json::Value`. Call sites choose
//! between a single attempt (refinement and classification, which degrade
//! to fallback values) and a retried call with backoff and jitter (pincode
//! lookup).

mod client;
pub mod prompts;

pub use client::{unfence, TextApiClient};
