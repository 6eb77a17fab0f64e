//! URL slugification.
//!
//! Converts titles and explicit slugs to the URL-safe segment used in
//! `{year}/{month}/{slug}`.

/// Characters that separate words. A run of them becomes a single `-`.
const SEPARATOR_CHARS: &[char] = &['-', '_', '/', '\\', '.', ',', ':', ';', '|', '+', '~', '='];

/// Convert text to a lowercase ASCII slug.
///
/// Letters and digits are kept, separators (whitespace and
/// [`SEPARATOR_CHARS`]) collapse into one dash, everything else is dropped.
/// The output only contains `[a-z0-9-]` with no leading, trailing or doubled
/// dashes, so `slugify(slugify(x)) == slugify(x)`.
pub fn slugify(text: &str) -> String {
    let ascii = deunicode::deunicode(text);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || SEPARATOR_CHARS.contains(&c) {
            pending_dash = true;
        }
    }

    slug
}
