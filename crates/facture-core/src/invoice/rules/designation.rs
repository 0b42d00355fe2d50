//! Designation text filtering.

use crate::models::config::DEFAULT_DENIED_PREFIXES;

/// Decides whether a non-numeric token may be part of an item designation.
///
/// Tokens starting with a denied prefix (invoice number, phone, registration
/// numbers, subtotal/total/tax labels) are rejected, as are blank tokens.
/// Prefix matching is case-sensitive.
#[derive(Debug, Clone)]
pub struct DesignationFilter {
    denied_prefixes: Vec<String>,
}

impl DesignationFilter {
    pub fn new(denied_prefixes: Vec<String>) -> Self {
        Self { denied_prefixes }
    }

    pub fn denied_prefixes(&self) -> &[String] {
        &self.denied_prefixes
    }

    /// Check whether `text` is usable designation material.
    pub fn is_valid(&self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        !self
            .denied_prefixes
            .iter()
            .any(|prefix| text.starts_with(prefix.as_str()))
    }
}

impl Default for DesignationFilter {
    fn default() -> Self {
        Self::new(DEFAULT_DENIED_PREFIXES.iter().map(|p| p.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_denylist() {
        let filter = DesignationFilter::default();
        for token in ["N° 2024-01", "Tel: 01 23", "R.C.S. Paris", "C.A.", "Sous-total", "Total TTC", "TVA 20%"] {
            assert!(!filter.is_valid(token), "{token:?} should be rejected");
        }
        assert!(filter.is_valid("Widget A"));
        assert!(filter.is_valid("Câble réseau"));
    }

    #[test]
    fn test_prefix_match_is_case_sensitive_and_trimmed() {
        let filter = DesignationFilter::default();
        assert!(filter.is_valid("total"));
        assert!(filter.is_valid("tva"));
        assert!(!filter.is_valid("  Total"));
    }

    #[test]
    fn test_blank_tokens_invalid() {
        let filter = DesignationFilter::default();
        assert!(!filter.is_valid(""));
        assert!(!filter.is_valid(" \t "));
    }

    #[test]
    fn test_custom_prefixes() {
        let filter = DesignationFilter::new(vec!["Remise".to_string()]);
        assert!(!filter.is_valid("Remise 10%"));
        assert!(filter.is_valid("Total"));
    }
}
