//! TOC (Table of Contents) builder.
//!
//! One flat entry per chapter, in chapter order, pointing at the chapter
//! document and back at the source post.

use tracing::{debug, instrument};

use reddit2epub_shared::{Chapter, Toc, TocEntry};

/// Build the navigation structure for a list of chapters.
///
/// Entries follow chapter ordinals, not input order.
#[instrument(skip_all, fields(chapters = chapters.len()))]
pub fn build_toc(chapters: &[Chapter]) -> Toc {
    let mut ordered: Vec<&Chapter> = chapters.iter().collect();
    ordered.sort_by_key(|c| c.ordinal);

    let entries: Vec<TocEntry> = ordered
        .into_iter()
        .map(|chapter| TocEntry {
            title: display_title(&chapter.title, chapter.ordinal),
            path: chapter.file_name.clone(),
            source_url: Some(chapter.source_url.clone()),
        })
        .collect();

    debug!(entries = entries.len(), "TOC built");

    Toc { entries }
}

/// A usable title for a chapter; blank titles fall back to `Chapter N`.
pub fn display_title(title: &str, ordinal: usize) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        format!("Chapter {ordinal}")
    } else {
        trimmed.to_string()
    }
}

/// Container file name for the chapter at `ordinal` (1-based).
pub fn chapter_file_name(ordinal: usize) -> String {
    format!("chapter_{ordinal:03}.xhtml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
