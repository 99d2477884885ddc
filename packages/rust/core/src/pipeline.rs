//! End-to-end `build` pipeline: URL → locate → count checks → assemble → EPUB.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, instrument, warn};
use url::Url;

use reddit2epub_client::ContentClient;
use reddit2epub_shared::{Book, Reddit2EpubError, Result, TOO_MANY_CHAPTERS_WARNING};

use crate::assembler;
use crate::filename::epub_file_name;
use crate::locator::{self, LocateOptions, Located};
use crate::writer;

/// Configuration for the `build_book` pipeline.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// URL of any chapter of the series.
    pub url: Url,
    /// Title matching and subreddit scope.
    pub locate: LocateOptions,
    /// Explicit output path. Derived from the book title when `None`.
    pub output: Option<PathBuf>,
    /// Directory for derived output paths.
    pub output_dir: PathBuf,
}

/// Result of the `build_book` pipeline.
#[derive(Debug)]
pub struct BuildResult {
    /// Path of the written EPUB.
    pub path: PathBuf,
    /// Book identifier (id of the oldest chapter's post).
    pub book_id: String,
    pub title: String,
    pub author: String,
    /// Number of chapters in the book.
    pub chapter_count: usize,
    /// Title words shared by every chapter.
    pub title_prefix: String,
    /// Whether the pagination warning was raised.
    pub too_many: bool,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each page of the author listing.
    fn page_scanned(&self, page: usize, posts_seen: usize, matched: usize);
    /// Called once the series is located, before the count checks run.
    fn chapters_found(&self, title_prefix: &str, count: usize);
    /// Called for non-fatal conditions the user should see.
    fn warning(&self, message: &str);
    /// Called when the pipeline completes.
    fn done(&self, result: &BuildResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn page_scanned(&self, _page: usize, _posts_seen: usize, _matched: usize) {}
    fn chapters_found(&self, _title_prefix: &str, _count: usize) {}
    fn warning(&self, _message: &str) {}
    fn done(&self, _result: &BuildResult) {}
}

/// Outcome of the chapter count checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesSize {
    Ok,
    /// Large enough that the listing may have been cut off.
    TooMany,
}

/// Decide whether `count` located posts make a book.
///
/// Zero and one are fatal. Counts at or above [`TOO_MANY_CHAPTERS_WARNING`]
/// are accepted but flagged.
pub fn check_chapter_count(count: usize, prefix: &str, overlap: usize) -> Result<SeriesSize> {
    match count {
        0 => Err(Reddit2EpubError::NoChaptersFound {
            prefix: prefix.to_string(),
        }),
        1 => Err(Reddit2EpubError::SingleChapterOnly { overlap }),
        n if n >= TOO_MANY_CHAPTERS_WARNING => Ok(SeriesSize::TooMany),
        _ => Ok(SeriesSize::Ok),
    }
}

fn too_many_message(count: usize) -> String {
    format!(
        "Got {count} submissions, at or above the limit of {TOO_MANY_CHAPTERS_WARNING}. \
         Old chapters may not be included."
    )
}

/// Locate the series without building anything.
///
/// Zero or one chapter is returned as-is; callers decide what to show.
#[instrument(skip_all, fields(url = %url))]
pub async fn preview<C: ContentClient>(
    client: &C,
    url: &Url,
    opts: &LocateOptions,
    progress: &dyn ProgressReporter,
) -> Result<Located> {
    progress.phase("Locating chapters");
    locator::locate(client, url, opts, progress).await
}

/// A book in memory plus what the caller needs to report on it.
#[derive(Debug)]
pub struct Compiled {
    pub book: Book,
    pub title_prefix: String,
    pub too_many: bool,
}

/// Locate, check, and assemble; everything except writing to disk.
#[instrument(skip_all, fields(url = %url, overlap = opts.overlap))]
pub async fn compile<C: ContentClient>(
    client: &C,
    url: &Url,
    opts: &LocateOptions,
    progress: &dyn ProgressReporter,
) -> Result<Compiled> {
    progress.phase("Locating chapters");
    let located = locator::locate(client, url, opts, progress).await?;
    progress.chapters_found(&located.title_prefix, located.posts.len());

    let size = check_chapter_count(located.posts.len(), &located.title_prefix, opts.overlap)?;
    let too_many = size == SeriesSize::TooMany;
    if too_many {
        let message = too_many_message(located.posts.len());
        warn!(count = located.posts.len(), "{message}");
        progress.warning(&message);
    }

    // Listing order is newest first; the oldest post names the book.
    let Some(first) = located.posts.last() else {
        return Err(Reddit2EpubError::NoChaptersFound {
            prefix: located.title_prefix,
        });
    };
    let book_id = first.id.to_string();
    let book_title = first.title.clone();
    let author = first.author.clone();

    progress.phase("Rendering chapters");
    let book = assembler::assemble(&author, &book_id, &book_title, located.posts.iter().rev())?;

    Ok(Compiled {
        book,
        title_prefix: located.title_prefix,
        too_many,
    })
}

/// Run the full `build` pipeline.
///
/// 1. Locate every chapter of the anchor's series
/// 2. Reject empty and single-chapter series, warn on very large ones
/// 3. Assemble chapters oldest first
/// 4. Write the EPUB
#[instrument(skip_all, fields(url = %config.url))]
pub async fn build_book<C: ContentClient>(
    client: &C,
    config: &BuildConfig,
    progress: &dyn ProgressReporter,
) -> Result<BuildResult> {
    let start = Instant::now();
    info!(url = %config.url, "starting build pipeline");

    let compiled = compile(client, &config.url, &config.locate, progress).await?;
    let book = &compiled.book;

    progress.phase("Writing EPUB");
    let path = output_path(config.output.as_deref(), &config.output_dir, &book.title);
    let path = writer::write_epub(book, &path)?;

    let result = BuildResult {
        path,
        book_id: book.id.clone(),
        title: book.title.clone(),
        author: book.author.clone(),
        chapter_count: book.chapters.len(),
        title_prefix: compiled.title_prefix,
        too_many: compiled.too_many,
        elapsed: start.elapsed(),
    };

    info!(
        path = %result.path.display(),
        chapters = result.chapter_count,
        elapsed_ms = result.elapsed.as_millis() as u64,
        "build pipeline complete"
    );

    progress.done(&result);
    Ok(result)
}

fn output_path(explicit: Option<&Path>, output_dir: &Path, title: &str) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => output_dir.join(epub_file_name(title)),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::testing::{FakeClient, anchor_url, post};

    #[derive(Default)]
    struct RecordingProgress {
        warnings: Mutex<Vec<String>>,
        phases: Mutex<Vec<String>>,
        found: Mutex<Vec<(String, usize)>>,
    }

    impl ProgressReporter for RecordingProgress {
        fn phase(&self, name: &str) {
            self.phases.lock().unwrap().push(name.to_string());
        }
        fn page_scanned(&self, _page: usize, _posts_seen: usize, _matched: usize) {}
        fn chapters_found(&self, title_prefix: &str, count: usize) {
            self.found
                .lock()
                .unwrap()
                .push((title_prefix.to_string(), count));
        }
        fn warning(&self, message: &str) {
            self.warnings.lock().unwrap().push(message.to_string());
        }
        fn done(&self, _result: &BuildResult) {}
    }

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("r2e-pipeline-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn config(output_dir: &Path) -> BuildConfig {
        BuildConfig {
            url: anchor_url(),
            locate: LocateOptions::default(),
            output: None,
            output_dir: output_dir.to_path_buf(),
        }
    }

    /// Newest-first listing of `n` chapters titled `Chapter k: Part k`.
    fn series(n: usize) -> Vec<reddit2epub_shared::Post> {
        (1..=n)
            .rev()
            .map(|k| post(&format!("c{k}"), &format!("Chapter {k}: Part {k}"), k as i64 * 100))
            .collect()
    }

    #[test]
    fn count_policy() {
        assert!(matches!(
            check_chapter_count(0, "Chapter 1", 2),
            Err(Reddit2EpubError::NoChaptersFound { .. })
        ));
        assert!(matches!(
            check_chapter_count(1, "Chapter 1", 2),
            Err(Reddit2EpubError::SingleChapterOnly { overlap: 2 })
        ));
        assert_eq!(check_chapter_count(2, "x", 2).unwrap(), SeriesSize::Ok);
        assert_eq!(check_chapter_count(199, "x", 2).unwrap(), SeriesSize::Ok);
        assert_eq!(check_chapter_count(200, "x", 2).unwrap(), SeriesSize::TooMany);
    }

    #[test]
    fn derived_and_explicit_output_paths() {
        let dir = Path::new("/books");
        assert_eq!(
            output_path(None, dir, "The Last Stand [OC]"),
            PathBuf::from("/books/The_Last_Stand.epub")
        );
        assert_eq!(
            output_path(Some(Path::new("mine.epub")), dir, "ignored"),
            PathBuf::from("mine.epub")
        );
    }

    #[tokio::test]
    async fn single_chapter_aborts_without_writing() {
        let tmp = temp_dir();
        let anchor = post("a1", "Standalone story", 100);
        let client = FakeClient::new(anchor.clone(), vec![vec![anchor]]);
        let progress = RecordingProgress::default();

        let err = build_book(&client, &config(&tmp), &progress)
            .await
            .unwrap_err();

        assert!(matches!(err, Reddit2EpubError::SingleChapterOnly { overlap: 2 }));
        assert_eq!(std::fs::read_dir(&tmp).unwrap().count(), 0);
        // The searched prefix is reported even though the build fails.
        assert_eq!(
            progress.found.lock().unwrap().as_slice(),
            [("Standalone story".to_string(), 1)]
        );

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn builds_oldest_first_named_after_first_chapter() {
        let tmp = temp_dir();
        let listing = series(3);
        let anchor = listing[1].clone();
        let client = FakeClient::new(anchor, vec![listing]);
        let progress = RecordingProgress::default();

        let mut cfg = config(&tmp);
        cfg.locate.overlap = 1;
        let result = build_book(&client, &cfg, &progress).await.unwrap();

        assert_eq!(result.chapter_count, 3);
        assert_eq!(result.book_id, "c1");
        assert_eq!(result.title, "Chapter 1: Part 1");
        assert_eq!(result.author, "writer");
        assert_eq!(result.title_prefix, "Chapter");
        assert!(!result.too_many);
        assert_eq!(result.path, tmp.join("Chapter_1_Part_1.epub"));
        assert!(result.path.exists());
        assert!(progress.warnings.lock().unwrap().is_empty());
        assert_eq!(
            progress.phases.lock().unwrap().as_slice(),
            ["Locating chapters", "Rendering chapters", "Writing EPUB"]
        );

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn compile_orders_chapters_oldest_first() {
        let listing = series(4);
        let client = FakeClient::new(listing[0].clone(), vec![listing]);
        let opts = LocateOptions {
            overlap: 1,
            all_subreddits: false,
        };

        let compiled = compile(&client, &anchor_url(), &opts, &SilentProgress)
            .await
            .unwrap();

        let titles: Vec<&str> = compiled.book.chapters.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(
            titles,
            ["Chapter 1: Part 1", "Chapter 2: Part 2", "Chapter 3: Part 3", "Chapter 4: Part 4"]
        );
    }

    #[tokio::test]
    async fn large_series_warns_but_builds() {
        let tmp = temp_dir();
        let listing = series(205);
        let client = FakeClient::new(listing[0].clone(), vec![listing]);
        let progress = RecordingProgress::default();

        let mut cfg = config(&tmp);
        cfg.locate.overlap = 1;
        let result = build_book(&client, &cfg, &progress).await.unwrap();

        assert!(result.too_many);
        assert_eq!(result.chapter_count, 205);
        assert!(result.path.exists());
        let bytes = std::fs::read(&result.path).unwrap();
        let haystack = String::from_utf8_lossy(&bytes);
        assert!(haystack.contains("chapter_001.xhtml"));
        assert!(haystack.contains("chapter_205.xhtml"));

        let warnings = progress.warnings.lock().unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Old chapters may not be included"));
        assert_eq!(
            progress.found.lock().unwrap().as_slice(),
            [("Chapter".to_string(), 205)]
        );

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn preview_returns_single_match_unchanged() {
        let anchor = post("a1", "Standalone story", 100);
        let client = FakeClient::new(anchor.clone(), vec![vec![anchor.clone()]]);

        let located = preview(&client, &anchor_url(), &LocateOptions::default(), &SilentProgress)
            .await
            .unwrap();
        assert_eq!(located.posts, vec![anchor]);
    }
}
