//! URL slugs for articles, categories and tags.

use std::future::Future;

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Stem used when a title produces no slug characters at all.
pub const EMPTY_SLUG_STEM: &str = "untitled";

/// Normalizes free text into `[a-z0-9-]`.
///
/// Lower-cases, strips diacritics (NFD + drop combining marks), turns every
/// whitespace char into a hyphen, drops anything else outside the alphabet,
/// then collapses and trims hyphens. Input with no usable characters gives `""`.
pub fn generate_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());

    for c in text.nfd() {
        if is_combining_mark(c) {
            continue;
        }
        let c = c.to_ascii_lowercase();
        let mapped = if c.is_whitespace() {
            '-'
        } else if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            c
        } else {
            continue;
        };

        if mapped == '-' && (slug.is_empty() || slug.ends_with('-')) {
            continue;
        }
        slug.push(mapped);
    }

    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// The `attempt`-th candidate for `base`: `base`, `base-1`, `base-2`, ...
///
/// An empty base is never offered; its sequence is `untitled-1`, `untitled-2`, ...
pub fn slug_candidate(base: &str, attempt: u64) -> String {
    match (base.is_empty(), attempt) {
        (true, n) => format!("{}-{}", EMPTY_SLUG_STEM, n + 1),
        (false, 0) => base.to_string(),
        (false, n) => format!("{}-{}", base, n),
    }
}

/// Returns the first candidate for `text` that `exists` reports as free.
///
/// The loop has no upper bound; the predicate is the only thing that touches
/// the store.
pub async fn resolve_unique_slug<F, Fut, E>(text: &str, mut exists: F) -> Result<String, E>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let base = generate_slug(text);
    let mut attempt = 0;
    loop {
        let candidate = slug_candidate(&base, attempt);
        if !exists(candidate.clone()).await? {
            return Ok(candidate);
        }
        attempt += 1;
    }
}
