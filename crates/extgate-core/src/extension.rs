//! Extension token normalization and filename parsing.
//!
//! Every extension that enters the system (admin input, stored rows, filenames)
//! passes through [`normalize_extension`] so comparisons are always made on the
//! canonical form. [`extract_candidate_extensions`] turns a filename into the
//! tokens that have to be checked against policy, including the ones hidden in
//! the middle of names like `document.pdf.exe`.

/// Canonicalize a raw extension token.
///
/// Trims whitespace, strips the leading dot and lowercases. Blank input yields
/// an empty string. A run of leading dots (`..exe`) collapses entirely so the
/// result is always a fixed point: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize_extension(token: &str) -> String {
    token
        .trim()
        .trim_start_matches('.')
        .trim()
        .to_lowercase()
}

/// Option-accepting variant of [`normalize_extension`].
pub fn normalize_optional_extension(token: Option<&str>) -> String {
    token.map(normalize_extension).unwrap_or_default()
}

/// Parse a filename into the ordered candidate extension tokens.
///
/// Every dot-delimited segment after the first is a candidate, in the order it
/// appears in the filename (left to right). Segments that are empty after
/// normalization or consist only of ASCII digits are skipped; a token is
/// reported once, at its first position.
///
/// ```
/// use extgate_core::extension::extract_candidate_extensions;
///
/// assert_eq!(extract_candidate_extensions("backup.2024.exe.txt"), vec!["exe", "txt"]);
/// assert!(extract_candidate_extensions("README").is_empty());
/// ```
pub fn extract_candidate_extensions(filename: &str) -> Vec<String> {
    let mut segments = filename.split('.');
    // The base name is never a candidate.
    if segments.next().is_none() {
        return Vec::new();
    }

    let mut candidates: Vec<String> = Vec::new();
    for segment in segments {
        let token = normalize_extension(segment);
        if token.is_empty() || is_numeric_segment(&token) {
            continue;
        }
        if !candidates.contains(&token) {
            candidates.push(token);
        }
    }
    candidates
}

/// The extension a stored file is recorded under: the normalized final segment,
/// or an empty string when the name has no extension.
pub fn final_extension(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((_, suffix)) => normalize_extension(suffix),
        None => String::new(),
    }
}

fn is_numeric_segment(token: &str) -> bool {
    token.chars().all(|c| c.is_ascii_digit())
}
