//! Text normalization used for grouping keys and blacklist comparison.
//!
//! Grouping always happens on a normalized key while the output keeps a cleaned
//! form of the text as it was first seen.

/// Maps an accented Latin character to its unaccented counterpart.
pub fn fold_char(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'Á' | 'À' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ç' => 'c',
        'Ç' => 'C',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ý' | 'ÿ' => 'y',
        'Ý' => 'Y',
        _ => c,
    }
}

/// Removes diacritics, keeping case and every other character.
///
/// # Example
/// ```rust
/// use shared::models::normalize::fold_diacritics;
///
/// assert_eq!(fold_diacritics("Não Informado"), "Nao Informado");
/// ```
pub fn fold_diacritics(text: &str) -> String {
    text.chars().map(fold_char).collect()
}

/// Lowercased, diacritic-free text with whitespace trimmed and collapsed.
///
/// # Example
/// ```rust
/// use shared::models::normalize::normalize_key;
///
/// assert_eq!(normalize_key("  NÃO   Informado "), "nao informado");
/// ```
pub fn normalize_key(text: &str) -> String {
    let folded = fold_diacritics(text).to_lowercase();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Grouping key for handler names: normalized, letters only, single spaces.
pub fn handler_key(name: &str) -> String {
    let letters: String = normalize_key(name)
        .chars()
        .map(|c| if c.is_alphabetic() { c } else { ' ' })
        .collect();
    letters.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Display form of a name: original case and accents, letters only.
pub fn clean_display_name(name: &str) -> String {
    let letters: String = name
        .chars()
        .map(|c| if c.is_alphabetic() { c } else { ' ' })
        .collect();
    letters.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True when the text carries no letter or digit at all ("-", ".", "  ").
pub fn is_blank_like(text: &str) -> bool {
    !text.chars().any(|c| c.is_alphanumeric())
}

/// Returns the first candidate that is present.
///
/// Candidates are evaluated in order; callers supply their own default with
/// `unwrap_or` so the fallback stays visible at the call site.
pub fn resolve_first<T, I>(candidates: I) -> Option<T>
where
    I: IntoIterator<Item = Option<T>>,
{
    candidates.into_iter().flatten().next()
}

/// Returns the first candidate with visible content, or `default`.
///
/// # Example
/// ```rust
/// use shared::models::normalize::resolve_text;
///
/// assert_eq!(resolve_text([Some(" "), None, Some("GUIA-1")], "sem-identificador"), "GUIA-1");
/// assert_eq!(resolve_text([None::<&str>], "sem-identificador"), "sem-identificador");
/// ```
pub fn resolve_text<'a, I>(candidates: I, default: &'a str) -> &'a str
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|candidate| !candidate.is_empty())
        .unwrap_or(default)
}
