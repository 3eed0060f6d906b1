use regex::Regex;
use std::sync::Arc;

use crate::llm::{prompts, TextApiClient};

/// Sentinel type returned when neither tier produces a confident answer.
pub const UNKNOWN_DOCUMENT: &str = "Unknown Document";

/// Two-tier document classifier.
///
/// Tier one is an ordered table of regex signatures for common Indian
/// document types; the first match in table order wins, deterministically
/// and without any network traffic. Tier two asks the remote text API, and
/// any failure there degrades to [`UNKNOWN_DOCUMENT`] rather than an error.
///
/// Constructed once at startup and shared through `AppState`.
#[derive(Clone)]
pub struct Classifier {
    signatures: Arc<Vec<(&'static str, Regex)>>,
}

impl Classifier {
    pub fn new() -> Self {
        let table: Vec<(&'static str, &'static str)> = vec![
            (
                "Aadhaar",
                r"(?i)\b\d{4}\s?\d{4}\s?\d{4}\b|\bAADHAAR\b|\bUNIQUE\sIDENTIFICATION\sAUTHORITY\sOF\sINDIA\b|\bENROLLMENT\sNO\b",
            ),
            (
                "PAN",
                r"(?i)\b[A-Z]{5}\d{4}[A-Z]\b|\bPERMANENT\sACCOUNT\sNUMBER\b|\bINCOME\sTAX\sDEPARTMENT\sINDIA\b",
            ),
            (
                "Driving License",
                r"(?i)\bDL\sNO\s*[A-Z]{2}\d{11,13}\b|\bDRIVING\sLICENCE\b|\bISSUING\sAUTHORITY\b|\bVALID\sTHRU\b",
            ),
            (
                "Passport",
                r"(?i)\b[A-Z]\d{7}\b|\bPASSPORT\sNO\b|\bMINISTRY\sOF\sEXTERNAL\sAFFAIRS\b|\bINDIAN\sPASSPORT\b",
            ),
            (
                "Bank Statement",
                r"(?i)\bBANK\sSTATEMENT\b|\bA/C\sNO\b.*?\d{9,18}\b|\bIFSC\sCODE\b.*?\w{4}\d{7}\b|\bSTATEMENT\sPERIOD\b",
            ),
            (
                "Invoice",
                r"(?i)\bINVOICE\sNO\s*\w+\b|\bGSTIN\s*\d{2}[A-Z]{5}\d{4}[A-Z]\d[Z][A-Z\d]\b|\bHSN\sCODE\b|\bTAX\sINVOICE\b",
            ),
            (
                "Marksheet",
                r"(?i)\bMARK\sSHEET\b|\bROLL\sNO\s*\w+\b|\bBOARD\sOF\s.*\sEXAMINATION\b|\bMARKS\sOBTAINED\b",
            ),
            (
                "Voter ID",
                r"(?i)\bEPIC\sNO\s*[A-Z]{3}\d{7}\b|\bELECTOR\sPHOTO\sIDENTITY\sCARD\b|\bELECTION\sCOMMISSION\sOF\sINDIA\b",
            ),
            (
                "Electricity Bill",
                r"(?i)\bELECTRICITY\sBILL\b|\bCONSUMER\sNO\s*\d+\b|\bUNITS\sCONSUMED\b|\bBILL\sAMOUNT\b",
            ),
            (
                "Utility Bill",
                r"(?i)\b(WATER|GAS)\sBILL\b|\bCONSUMER\sID\s*\w+\b|\bBILLING\sPERIOD\s*\d{2}-\d{2}-\d{4}\b",
            ),
            (
                "Birth Certificate",
                r"(?i)\bBIRTH\sCERTIFICATE\b|\bREGISTRATION\sNO\s*\w+\b|\bDATE\sAND\sPLACE\sOF\sBIRTH\b",
            ),
            (
                "Death Certificate",
                r"(?i)\bDEATH\sCERTIFICATE\b|\bDATE\sAND\sPLACE\sOF\sDEATH\b",
            ),
            (
                "Resume",
                r"(?i)\b(RESUME|CURRICULUM\sVITAE)\b|\bPROFESSIONAL\sEXPERIENCE\b|\bEDUCATIONAL\sQUALIFICATIONS\b",
            ),
            (
                "Contract",
                r"(?i)\b(CONTRACT|AGREEMENT)\sNO\s*\w+\b|\bPARTIES\sTO\sTHE\sAGREEMENT\b|\bEXECUTED\sON\b",
            ),
            (
                "Prescription",
                r"(?i)\bPRESCRIPTION\b|\bRX\sNO\s*\w+\b|\bMEDICATION\s.*DOSAGE\b|\bPHYSICIAN\sNAME\b",
            ),
            (
                "Receipt",
                r"(?i)\bRECEIPT\sNO\s*\w+\b|\bPAID\sAMOUNT\s*[\d,.]+\b|\bPURCHASE\sDATE\s*\d{2}-\d{2}-\d{4}\b",
            ),
            (
                "Bank Passbook",
                r"(?i)\bPASSBOOK\b|\bACCOUNT\sHOLDER\sNAME\b|\bIFSC\sCODE\s*\w{4}\d{7}\b|\bBRANCH\sADDRESS\b",
            ),
            (
                "School ID",
                r"(?i)\bSCHOOL\sID\sCARD\b|\bSTUDENT\sID\s*\w+\b|\bACADEMIC\sSESSION\b",
            ),
            (
                "Employee ID",
                r"(?i)\bEMPLOYEE\sID\s*\w+\b|\bDESIGNATION\s.*\b|\bEMPLOYEE\sCODE\b",
            ),
            (
                "Property Document",
                r"(?i)\b(SALE\sDEED|PROPERTY\sDOCUMENT)\b|\bKHASRA\sNO\b|\bREGISTRATION\sDATE\s*\d{2}-\d{2}-\d{4}\b",
            ),
            (
                "Court Order",
                r"(?i)\bCOURT\sORDER\b|\bCASE\sNO\s*\w+\b|\bJUDGMENT\sDATE\s*\d{2}-\d{2}-\d{4}\b|\bHIGH\sCOURT\b",
            ),
        ];

        let signatures = table
            .into_iter()
            .map(|(name, pattern)| {
                (name, Regex::new(pattern).expect("hardcoded signature pattern"))
            })
            .collect();

        Self {
            signatures: Arc::new(signatures),
        }
    }

    /// Tier one only: first signature match in table order, or `None`.
    pub fn classify_local(&self, text: &str) -> Option<&'static str> {
        self.signatures
            .iter()
            .find(|(_, regex)| regex.is_match(text))
            .map(|(name, _)| *name)
    }

    /// Full two-tier classification. Remote failures are logged and
    /// swallowed; the caller always gets a usable type string.
    pub async fn classify(&self, text: &str, client: &TextApiClient) -> String {
        if let Some(name) = self.classify_local(text) {
            return name.to_string();
        }

        match client.complete_json(&prompts::classify_prompt(text)).await {
            Ok(value) => match value.get("document_type").and_then(|v| v.as_str()) {
                Some(document_type) => document_type.to_string(),
                None => {
                    tracing::warn!(
                        "Text API classification reply missing document_type, using default"
                    );
                    UNKNOWN_DOCUMENT.to_string()
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "Text API classification failed, using default");
                UNKNOWN_DOCUMENT.to_string()
            }
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aadhaar_signature_matches_grouped_number() {
        let classifier = Classifier::new();
        let text = "Name: Ravi Kumar 1234 5678 9012 Government of India AADHAAR";
        assert_eq!(classifier.classify_local(text), Some("Aadhaar"));
    }

    #[test]
    fn pan_signature_matches_account_number() {
        let classifier = Classifier::new();
        assert_eq!(
            classifier.classify_local("PERMANENT ACCOUNT NUMBER ABCDE1234F"),
            Some("PAN")
        );
    }

    #[test]
    fn first_match_in_table_order_wins() {
        let classifier = Classifier::new();
        // Contains both an Aadhaar-style grouped number and invoice markers;
        // Aadhaar sits earlier in the table.
        let text = "TAX INVOICE for 1234 5678 9012";
        assert_eq!(classifier.classify_local(text), Some("Aadhaar"));
    }

    #[test]
    fn voter_id_signature() {
        let classifier = Classifier::new();
        assert_eq!(
            classifier.classify_local("ELECTION COMMISSION OF INDIA identity card"),
            Some("Voter ID")
        );
    }

    #[test]
    fn unmatched_text_returns_none_locally() {
        let classifier = Classifier::new();
        assert_eq!(
            classifier.classify_local("a plain note about groceries"),
            None
        );
    }
}
