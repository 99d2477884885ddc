//! Chapter discovery.
//!
//! Starting from one anchor post, collects every text post by the same author
//! (in the same subreddit unless told otherwise) whose title starts with the
//! same words as the anchor's title.

use std::collections::HashSet;

use tracing::{debug, info, instrument};
use url::Url;

use reddit2epub_client::{ContentClient, PostPager};
use reddit2epub_shared::{DEFAULT_OVERLAP, Post, PostId, Reddit2EpubError, Result};

use crate::pipeline::ProgressReporter;

/// How candidate posts are matched against the anchor.
#[derive(Debug, Clone)]
pub struct LocateOptions {
    /// Number of leading title words that must match (case-insensitive).
    pub overlap: usize,
    /// Scan the author's posts in every subreddit.
    pub all_subreddits: bool,
}

impl Default for LocateOptions {
    fn default() -> Self {
        Self {
            overlap: DEFAULT_OVERLAP,
            all_subreddits: false,
        }
    }
}

/// Outcome of a locate run.
#[derive(Debug, Clone)]
pub struct Located {
    /// Author of the anchor post.
    pub author: String,
    /// Matching posts in listing order (newest first).
    pub posts: Vec<Post>,
    /// The anchor title's leading words, original casing.
    pub title_prefix: String,
    /// The anchor post's id.
    pub anchor_id: PostId,
    /// Number of posts enumerated from the author listing.
    pub scanned: usize,
}

// ---------------------------------------------------------------------------
// Title prefix matching
// ---------------------------------------------------------------------------

/// The first `overlap` words of a title.
///
/// Words are split on whitespace and stripped of surrounding punctuation, so
/// `Chapter 5: The Return` and `chapter 5 - Aftermath` share a two-word prefix.
#[derive(Debug, Clone)]
pub struct TitlePrefix {
    display: String,
    folded: Vec<String>,
    overlap: usize,
}

impl TitlePrefix {
    pub fn new(title: &str, overlap: usize) -> Self {
        let words: Vec<&str> = title_words(title).take(overlap).collect();
        Self {
            display: words.join(" "),
            folded: words.iter().map(|w| w.to_lowercase()).collect(),
            overlap,
        }
    }

    /// The prefix as it appears in the anchor title (words joined by one space).
    pub fn as_str(&self) -> &str {
        &self.display
    }

    /// Whether `title` starts with the same words, ignoring case.
    ///
    /// Titles are compared on their first `overlap` words, so a title
    /// shorter than `overlap` only matches a title with exactly the same words.
    pub fn matches(&self, title: &str) -> bool {
        let mut words = title_words(title).take(self.overlap);
        let mut expected = self.folded.iter();
        loop {
            match (words.next(), expected.next()) {
                (Some(word), Some(want)) if word.to_lowercase() == *want => {}
                (None, None) => return true,
                _ => return false,
            }
        }
    }
}

fn title_words(title: &str) -> impl Iterator<Item = &str> {
    title
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
}

// ---------------------------------------------------------------------------
// Locator
// ---------------------------------------------------------------------------

/// Find every chapter of the series the anchor URL belongs to.
///
/// The author listing is drained completely; pages are filtered as they
/// arrive. Zero or one match is a valid result here; deciding whether that
/// makes a usable book is left to the caller.
#[instrument(skip_all, fields(url = %anchor_url, overlap = opts.overlap, all_subreddits = opts.all_subreddits))]
pub async fn locate<C: ContentClient>(
    client: &C,
    anchor_url: &Url,
    opts: &LocateOptions,
    progress: &dyn ProgressReporter,
) -> Result<Located> {
    if opts.overlap == 0 {
        return Err(Reddit2EpubError::validation(
            "overlap must be at least one word",
        ));
    }

    let anchor = client.fetch_post(anchor_url).await?;
    if !anchor.has_text() {
        return Err(Reddit2EpubError::NoTextContent {
            url: anchor_url.to_string(),
        });
    }

    let prefix = TitlePrefix::new(&anchor.title, opts.overlap);
    let scope = (!opts.all_subreddits).then_some(anchor.subreddit.as_str());

    info!(
        author = %anchor.author,
        subreddit = scope.unwrap_or("*"),
        prefix = prefix.as_str(),
        "scanning author posts"
    );

    let mut pager = client.author_posts(&anchor.author, scope);
    let mut seen: HashSet<PostId> = HashSet::new();
    let mut posts: Vec<Post> = Vec::new();
    let mut scanned = 0;
    let mut pages = 0;

    while let Some(page) = pager.next_page().await? {
        pages += 1;
        for post in page {
            scanned += 1;
            if !seen.insert(post.id.clone()) {
                continue;
            }
            if is_chapter(&post, &anchor, scope, &prefix) {
                debug!(id = %post.id, title = %post.title, "matched");
                posts.push(post);
            }
        }
        progress.page_scanned(pages, scanned, posts.len());
    }
    drop(pager);

    if !posts.iter().any(|p| p.id == anchor.id) {
        debug!(id = %anchor.id, "anchor missing from listing, inserting");
        let at = posts
            .iter()
            .position(|p| p.created_at < anchor.created_at)
            .unwrap_or(posts.len());
        posts.insert(at, anchor.clone());
    }

    info!(scanned, matched = posts.len(), "locate complete");

    Ok(Located {
        author: anchor.author,
        posts,
        title_prefix: prefix.as_str().to_string(),
        anchor_id: anchor.id,
        scanned,
    })
}

/// Author, subreddit, text, and title checks for one candidate.
fn is_chapter(post: &Post, anchor: &Post, scope: Option<&str>, prefix: &TitlePrefix) -> bool {
    if !post.author.eq_ignore_ascii_case(&anchor.author) {
        return false;
    }
    if let Some(sub) = scope {
        if !post.subreddit.eq_ignore_ascii_case(sub) {
            return false;
        }
    }
    post.has_text() && prefix.matches(&post.title)
}
