//! Prompt templates for the remote text API.
//!
//! Templates use `format!()` interpolation so a missing variable is a
//! compile error. Every prompt demands a strict single-object JSON reply;
//! the client unfences markdown-wrapped replies before parsing.

/// Prompt for correcting, completing, and translating OCR output.
///
/// The reply must be `{"refined_text": "..."}` and nothing else.
pub fn refine_prompt(text: &str) -> String {
    format!(
        r#"You are an expert text corrector and completer.
Given the following raw text, which may contain spelling errors, grammatical mistakes, incomplete words, or missing phrases due to OCR processing (especially from scanned documents or handwriting), your task is to:
1. Correct all spelling and grammatical errors.
2. Based on context, intelligently infer and complete any truncated or missing words/phrases. Do not hallucinate extensively, but make reasonable completions.
3. If the text is not in English, translate it accurately into English while preserving the original meaning.
4. Provide ONLY the corrected, completed, and translated text as a JSON object with a single key 'refined_text'.
Do NOT include any introductory or concluding remarks, explanations, summaries, or any text outside the specified JSON format.

Example of expected output:
{{"refined_text": "The quick brown fox jumps over the lazy dog."}}

Text to process: "{text}""#
    )
}

/// Prompt for open-ended document classification, used when no regex
/// signature matched. The reply must be `{"document_type": "..."}`.
pub fn classify_prompt(text: &str) -> String {
    format!(
        r#"Analyze the following text and identify the most likely document type from a broad range of possibilities. Examples include "Passport", "Driving License", "Bank Statement", "Invoice", "Marksheet", "Aadhaar", "PAN", "Voter ID", "Electricity Bill", "Utility Bill", "Birth Certificate", "Death Certificate", "Resume", "Contract", "Prescription", "Receipt", "Bank Passbook", "School ID", "Employee ID", "Property Document", "Court Order". Provide ONLY the document type as a JSON object, like {{"document_type": "Passport"}}. Do NOT include any other text or prose in the response. Text: "{text}""#
    )
}

/// Prompt for resolving an Indian pincode to its city and state.
/// The reply must be `{"city": "...", "state": "..."}`, or
/// `{"error": "Invalid pincode"}` when the code does not exist.
pub fn pincode_prompt(pincode: &str) -> String {
    format!(
        r#"Given the Indian pincode {pincode}, provide the corresponding city and state in JSON format like {{"city": "CityName", "state": "StateName"}}, if the pincode is valid. If invalid, return {{"error": "Invalid pincode"}}."#
    )
}
