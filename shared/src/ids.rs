//! Helpers for deriving identifiers used in URLs and filesystem paths.

/// Derive a URL- and filename-safe slug.
///
/// Lower-cases the input, drops apostrophes (`'` and `’`), collapses every run
/// of characters outside `[a-z0-9]` into a single `-` and trims leading and
/// trailing hyphens. The output only ever contains `[a-z0-9-]`.
pub fn slugify(s: &str) -> String {
    let mut slug = String::with_capacity(s.len());
    let mut pending_hyphen = false;

    for c in s.to_lowercase().chars() {
        if c == '\'' || c == '’' {
            continue;
        }
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}
