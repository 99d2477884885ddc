//! EPUB serialization.
//!
//! Packages an assembled [`Book`] with `epub-builder` and writes it to disk.
//! The file is written to a temp sibling first and renamed into place, so an
//! interrupted run never leaves a truncated `.epub` behind.

use std::fs::File;
use std::path::{Path, PathBuf};

use epub_builder::{EpubBuilder, EpubContent, EpubVersion, ReferenceType, ZipLibrary};
use tracing::{debug, info, instrument};

use reddit2epub_shared::{Book, Reddit2EpubError, Result};

/// Serialize `book` to `path`, returning the path written.
#[instrument(skip_all, fields(path = %path.display(), chapters = book.chapters.len()))]
pub fn write_epub(book: &Book, path: &Path) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Reddit2EpubError::io(parent, e))?;
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| Reddit2EpubError::validation(format!("{} is not a file path", path.display())))?;
    let temp = path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy()));

    {
        let mut file = File::create(&temp).map_err(|e| Reddit2EpubError::io(&temp, e))?;
        if let Err(e) = package(book, &mut file) {
            let _ = std::fs::remove_file(&temp);
            return Err(e);
        }
    }

    std::fs::rename(&temp, path).map_err(|e| Reddit2EpubError::io(path, e))?;

    info!(path = %path.display(), title = %book.title, "epub written");
    Ok(path.to_path_buf())
}

/// Build the container and stream it into `out`.
fn package(book: &Book, out: &mut File) -> Result<()> {
    let zip = ZipLibrary::new().map_err(epub_error)?;
    let mut builder = EpubBuilder::new(zip).map_err(epub_error)?;

    builder.epub_version(EpubVersion::V30);
    builder
        .metadata("title", book.title.as_str())
        .map_err(epub_error)?
        .metadata("author", book.author.as_str())
        .map_err(epub_error)?
        .metadata("lang", "en")
        .map_err(epub_error)?
        .metadata("generator", "reddit2epub")
        .map_err(epub_error)?;
    builder
        .stylesheet(book.stylesheet.as_bytes())
        .map_err(epub_error)?;
    builder.inline_toc();

    let titles = book.toc.entries.iter().map(|e| (e.path.as_str(), e.title.as_str()));
    for chapter in &book.chapters {
        let title = titles
            .clone()
            .find(|(path, _)| *path == chapter.file_name)
            .map(|(_, title)| title)
            .unwrap_or(chapter.title.as_str());

        builder
            .add_content(
                EpubContent::new(chapter.file_name.as_str(), chapter.content.as_bytes())
                    .title(title)
                    .reftype(ReferenceType::Text),
            )
            .map_err(epub_error)?;
        debug!(ordinal = chapter.ordinal, file = %chapter.file_name, "chapter packaged");
    }

    builder.generate(out).map_err(epub_error)?;
    Ok(())
}

fn epub_error(e: impl std::fmt::Display) -> Reddit2EpubError {
    Reddit2EpubError::Epub(e.to_string())
}
