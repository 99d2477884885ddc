//! Output file name derivation.

use std::sync::LazyLock;

use regex::Regex;

/// Derive an `.epub` file name from a book title.
///
/// Runs of characters outside `[0-9a-zA-Z]` become `_` and outer underscores
/// are trimmed. A single trailing `_OC` is removed: `[OC]` ("original
/// content") is a common Reddit title tag and never belongs in a file name.
/// Nothing else is special-cased.
pub fn epub_file_name(title: &str) -> String {
    static NON_ALNUM_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[^0-9a-zA-Z]+").expect("valid regex"));

    let sanitized = NON_ALNUM_RE.replace_all(title, "_");
    let mut stem = sanitized.trim_matches('_');
    if let Some(stripped) = stem.strip_suffix("_OC") {
        stem = stripped.trim_end_matches('_');
    }

    if stem.is_empty() {
        "book.epub".to_string()
    } else {
        format!("{stem}.epub")
    }
}
