//! Title derivation from ROM filenames.

/// Words kept lower-case unless they start the title.
const MINOR_WORDS: &[&str] = &["of", "the", "and", "a", "an", "vs", "vs.", "in", "on", "for", "to"];

/// Derive a display title from a ROM filename.
///
/// Strips the extension, turns `_` and `.` into spaces, removes parenthesized
/// and bracketed annotations (region, revision, dump tags), collapses
/// whitespace and applies title case. Minor words stay lower-case unless they
/// are the first word.
///
/// Running the result through this function again yields the same title.
pub fn title_from_filename(file_name: &str) -> String {
    let base = strip_extension(file_name);
    let spaced: String = base
        .chars()
        .map(|c| if c == '_' || c == '.' { ' ' } else { c })
        .collect();
    let without_parens = strip_annotations(&spaced, '(', ')');
    let cleaned = strip_annotations(&without_parens, '[', ']');

    cleaned
        .split_whitespace()
        .enumerate()
        .map(|(index, word)| title_case_word(word, index == 0))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Remove the final `.ext` (if any) from a filename.
fn strip_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(dot) if dot + 1 < file_name.len() => &file_name[..dot],
        _ => file_name,
    }
}

/// Replace every `open ... close` span with a single space.
///
/// An opener without a matching closer is kept as-is.
fn strip_annotations(s: &str, open: char, close: char) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(start) = rest.find(open) {
        let after_open = &rest[start + open.len_utf8()..];
        let Some(end) = after_open.find(close) else {
            break;
        };
        out.push_str(&rest[..start]);
        out.push(' ');
        rest = &after_open[end + close.len_utf8()..];
    }

    out.push_str(rest);
    out
}

fn title_case_word(word: &str, is_first: bool) -> String {
    let lower = word.to_lowercase();
    if !is_first && MINOR_WORDS.contains(&lower.as_str()) {
        return lower;
    }

    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
