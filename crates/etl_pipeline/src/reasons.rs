use std::collections::HashSet;

use shared::models::normalize::{is_blank_like, normalize_key};

/// Decides whether a denial reason is a placeholder meaning "no reason given".
#[derive(Debug, Clone)]
pub struct ReasonFilter {
    placeholders: HashSet<String>,
}

impl ReasonFilter {
    pub fn new<S: AsRef<str>>(placeholders: &[S]) -> Self {
        Self {
            placeholders: placeholders.iter().map(|p| comparison_key(p.as_ref())).collect(),
        }
    }

    pub fn is_placeholder(&self, reason: &str) -> bool {
        is_blank_like(reason) || self.placeholders.contains(&comparison_key(reason))
    }

    /// The reason as it should be grouped and shown, or `None` for placeholders.
    pub fn meaningful<'a>(&self, reason: Option<&'a str>) -> Option<&'a str> {
        let reason = reason?.trim();
        if self.is_placeholder(reason) { None } else { Some(reason) }
    }
}

fn comparison_key(text: &str) -> String {
    normalize_key(text).trim_end_matches(['.', ';', ':', '!']).trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::config::DEFAULT_PLACEHOLDER_REASONS;

    fn filter() -> ReasonFilter {
        ReasonFilter::new(DEFAULT_PLACEHOLDER_REASONS)
    }

    #[test]
    fn test_placeholder_variants_are_excluded() {
        let filter = filter();
        for reason in ["Não Informado", "nao informado", "NAO INFORMADO ", "não informado.", "N/A", "", "  ", "-", "Sem motivo"] {
            assert!(filter.is_placeholder(reason), "expected placeholder: {:?}", reason);
        }
    }

    #[test]
    fn test_real_reasons_survive_with_original_text() {
        let filter = filter();
        assert_eq!(filter.meaningful(Some("  Cobrança em Duplicidade ")), Some("Cobrança em Duplicidade"));
        assert_eq!(filter.meaningful(Some("Não informado")), None);
        assert_eq!(filter.meaningful(None), None);
        assert!(!filter.is_placeholder("Informado fora do prazo"));
    }
}
