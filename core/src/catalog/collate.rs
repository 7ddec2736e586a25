//! Locale-aware title ordering.
//!
//! Approximates the default collation of a Latin-script locale in three
//! levels: base letters first (accents and case ignored), then accents, then
//! case with lower-case first. Raw byte order would put "élan" after "Zelda".

use std::cmp::Ordering;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Compare two titles for catalog ordering.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    primary_key(a)
        .cmp(&primary_key(b))
        .then_with(|| secondary_key(a).cmp(&secondary_key(b)))
        .then_with(|| tertiary_key(a).cmp(&tertiary_key(b)))
}

/// Base letters only: decomposed, marks removed, lower-cased.
fn primary_key(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Accents matter, case does not.
fn secondary_key(s: &str) -> String {
    s.nfd().flat_map(char::to_lowercase).collect()
}

/// Case with lower-case sorting before upper-case.
fn tertiary_key(s: &str) -> Vec<(bool, char)> {
    s.nfd().map(|c| (c.is_uppercase(), c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(titles: &[&str]) -> Vec<String> {
        let mut out: Vec<String> = titles.iter().map(|t| t.to_string()).collect();
        out.sort_by(|a, b| compare_titles(a, b));
        out
    }

    #[test]
    fn test_accented_titles_sort_with_base_letter() {
        assert_eq!(sorted(&["Zelda", "Arkanoid", "élan"]), vec!["Arkanoid", "élan", "Zelda"]);
    }

    #[test]
    fn test_case_insensitive_primary() {
        assert_eq!(
            sorted(&["banjo", "Asterix", "Castlevania"]),
            vec!["Asterix", "banjo", "Castlevania"]
        );
    }

    #[test]
    fn test_accent_breaks_ties() {
        assert_eq!(compare_titles("elan", "élan"), Ordering::Less);
        assert_eq!(compare_titles("élan", "elan"), Ordering::Greater);
    }

    #[test]
    fn test_lower_case_first_on_exact_tie() {
        assert_eq!(compare_titles("tetris", "Tetris"), Ordering::Less);
        assert_eq!(compare_titles("Tetris", "Tetris"), Ordering::Equal);
    }

    #[test]
    fn test_prefix_sorts_first() {
        assert_eq!(
            sorted(&["Mega Man 2", "Mega Man", "Mega Man X"]),
            vec!["Mega Man", "Mega Man 2", "Mega Man X"]
        );
    }
}
