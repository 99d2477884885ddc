//! Book assembler.
//!
//! Turns an ordered list of posts into an in-memory [`Book`]: one chapter per
//! post, a shared stylesheet, and a table of contents. No I/O happens here;
//! see [`crate::writer`] for serialization.

use tracing::{debug, info, instrument};

use reddit2epub_markdown::{RenderOptions, render_chapter};
use reddit2epub_shared::{Book, Chapter, Post, Reddit2EpubError, Result};

use crate::toc::{self, chapter_file_name, display_title};

/// Href of the stylesheet inside the container, relative to chapter documents.
pub const STYLESHEET_HREF: &str = "stylesheet.css";

/// Stylesheet shared by every chapter.
pub const STYLESHEET: &str = "\
body { font-family: serif; line-height: 1.5; margin: 0 5%; }
h1 { font-size: 1.6em; text-align: center; margin: 1.5em 0 1em; }
p { margin: 0 0 0.8em; text-align: justify; }
blockquote { margin: 1em 2em; font-style: italic; }
hr { border: none; border-top: 1px solid #888; margin: 1.5em 20%; }
pre, code { font-family: monospace; font-size: 0.9em; }
pre { white-space: pre-wrap; }
table { border-collapse: collapse; margin: 1em auto; }
th, td { border: 1px solid #888; padding: 0.2em 0.5em; }
sup { font-size: 0.75em; }
";

/// Build a book from posts already in reading order (oldest first).
///
/// Chapter `n` is built from the `n`-th post; nothing is reordered, merged, or
/// skipped. Book metadata comes from the arguments only. A post without text
/// is a caller error and fails the whole assembly.
#[instrument(skip_all, fields(book_id = %book_id, title = %book_title))]
pub fn assemble<'a>(
    author: &str,
    book_id: &str,
    book_title: &str,
    posts: impl IntoIterator<Item = &'a Post>,
) -> Result<Book> {
    let mut chapters = Vec::new();

    for (index, post) in posts.into_iter().enumerate() {
        let ordinal = index + 1;
        let text = post.text().ok_or_else(|| {
            Reddit2EpubError::validation(format!(
                "post {} ('{}') has no text content and cannot become a chapter",
                post.id, post.title
            ))
        })?;

        let title = display_title(&post.title, ordinal);
        let opts = RenderOptions {
            title: title.clone(),
            stylesheet_href: STYLESHEET_HREF.to_string(),
            lang: "en".to_string(),
        };
        let rendered = render_chapter(text, &opts)?;

        debug!(ordinal, id = %post.id, words = rendered.word_count, "chapter built");

        chapters.push(Chapter {
            ordinal,
            title,
            file_name: chapter_file_name(ordinal),
            content: rendered.xhtml,
            source_id: post.id.clone(),
            source_url: post.url(),
        });
    }

    let toc = toc::build_toc(&chapters);

    info!(chapters = chapters.len(), "book assembled");

    Ok(Book {
        id: book_id.to_string(),
        title: book_title.to_string(),
        author: author.to_string(),
        stylesheet: STYLESHEET.to_string(),
        chapters,
        toc,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
