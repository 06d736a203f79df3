#![forbid(unsafe_code)]

//! Locale code normalization and closest-match fallback.
//!
//! When the requested locale has no data on disk, the engine degrades to
//! whichever existing locale *looks* most like the request. The distance
//! metric is deliberately crude: a positional character-mismatch count,
//! not an edit distance. It cannot see insertions or deletions, but for
//! `xx-YY` style codes ("en-GB" vs "en-US") that is all that is needed.

/// Normalize a locale code to the `xx-YY` convention.
///
/// Splits on `-`; exactly two parts get lowercase-language and
/// uppercase-region treatment. Anything else passes through unchanged.
///
/// ```
/// use glossa::locale::normalize;
///
/// assert_eq!(normalize("FR-fr"), "fr-FR");
/// assert_eq!(normalize("klingon"), "klingon");
/// ```
#[must_use]
pub fn normalize(locale: &str) -> String {
    let parts: Vec<&str> = locale.split('-').collect();
    if parts.len() == 2 {
        format!("{}-{}", parts[0].to_lowercase(), parts[1].to_uppercase())
    } else {
        locale.to_string()
    }
}

/// Positional character-mismatch count over `a`'s length.
///
/// Positions past the end of `b` compare against a space. Characters in
/// `b` beyond `a`'s length are not counted at all, so this is not
/// symmetric — callers always pass the requested locale as `a`.
#[must_use]
pub fn string_distance(a: &str, b: &str, case_sensitive: bool) -> usize {
    let (a, b) = if case_sensitive {
        (a.to_string(), b.to_string())
    } else {
        (a.to_lowercase(), b.to_lowercase())
    };
    let b_chars: Vec<char> = b.chars().collect();
    a.chars()
        .enumerate()
        .filter(|(i, ch)| *ch != b_chars.get(*i).copied().unwrap_or(' '))
        .count()
}

/// Pick the candidate with the smallest case-insensitive distance to
/// `requested`. Ties keep the earliest candidate. `None` when there are no
/// candidates at all.
#[must_use]
pub fn closest_locale<'a>(
    requested: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;
    for candidate in candidates {
        let distance = string_distance(requested, candidate, false);
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((candidate, distance));
        }
    }
    best.map(|(locale, _)| locale.to_string())
}

/// Extract locale-name candidates from a directory listing: the first path
/// segment of each entry, skipping names that start with `_` (private
/// directories like `_flags`) or contain a `.` (plain files).
#[must_use]
pub fn candidate_locales(entries: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for entry in entries {
        let segment = match entry.split_once('/') {
            Some((head, _)) => head,
            None => entry.as_str(),
        };
        if segment.is_empty() || segment.starts_with('_') || segment.contains('.') {
            continue;
        }
        if !out.iter().any(|seen| seen == segment) {
            out.push(segment.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{candidate_locales, closest_locale, normalize, string_distance};

    #[test]
    fn normalize_two_part_codes() {
        assert_eq!(normalize("fr-fr"), "fr-FR");
        assert_eq!(normalize("EN-us"), "en-US");
    }

    #[test]
    fn normalize_leaves_other_shapes_alone() {
        assert_eq!(normalize("klingon"), "klingon");
        assert_eq!(normalize("zh-Hant-TW"), "zh-Hant-TW");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn distance_of_equal_strings_is_zero() {
        assert_eq!(string_distance("en-US", "en-US", true), 0);
        assert_eq!(string_distance("en-us", "EN-US", false), 0);
    }

    #[test]
    fn distance_counts_positional_mismatches() {
        assert_eq!(string_distance("en-US", "en-GB", false), 2);
        // Shorter b pads with spaces; longer b is truncated to a's length.
        assert_eq!(string_distance("en-US", "en", false), 3);
        assert_eq!(string_distance("en", "en-US", false), 0);
    }

    #[test]
    fn closest_prefers_smaller_distance_and_first_tie() {
        let picked = closest_locale("en-GB", ["fr-FR", "en-US", "en-UD"]);
        assert_eq!(picked.as_deref(), Some("en-US"));
        assert_eq!(closest_locale("en-GB", std::iter::empty::<&str>()), None);
    }

    #[test]
    fn candidates_skip_private_and_dotted_entries() {
        let entries = vec![
            "_flags".to_string(),
            "en-US".to_string(),
            "fr-FR/data.tsv".to_string(),
            "index.xml".to_string(),
            "en-US".to_string(),
        ];
        assert_eq!(candidate_locales(&entries), vec!["en-US", "fr-FR"]);
    }
}
