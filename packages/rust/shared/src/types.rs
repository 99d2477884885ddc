//! Core domain types: posts fetched from Reddit and the book built from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PostId
// ---------------------------------------------------------------------------

/// A Reddit submission id (base36, without the `t3_` prefix).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub String);

impl PostId {
    /// The fullname used by the API (`t3_<id>`).
    pub fn fullname(&self) -> String {
        format!("t3_{}", self.0)
    }
}

impl std::fmt::Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PostId {
    fn from(s: &str) -> Self {
        Self(s.trim_start_matches("t3_").to_string())
    }
}

// ---------------------------------------------------------------------------
// Post
// ---------------------------------------------------------------------------

/// A submission as seen by this tool. Read-only; validated by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    /// Author's username (without `u/`).
    pub author: String,
    /// Subreddit name (without `r/`).
    pub subreddit: String,
    /// Markdown body. `None` for link, image, and empty posts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Site-relative permalink, e.g. `/r/HFY/comments/abc123/chapter_1/`.
    pub permalink: String,
}

impl Post {
    /// Absolute URL of the post on reddit.com.
    pub fn url(&self) -> String {
        format!("https://www.reddit.com{}", self.permalink)
    }

    /// The body text, if the post has any non-blank text.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// Whether this post can become a chapter.
    pub fn has_text(&self) -> bool {
        self.text().is_some()
    }
}

// ---------------------------------------------------------------------------
// Book
// ---------------------------------------------------------------------------

/// One chapter of a [`Book`]; rendered from one post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    /// 1-based reading position.
    pub ordinal: usize,
    pub title: String,
    /// File name inside the EPUB container (e.g. `chapter_001.xhtml`).
    pub file_name: String,
    /// Complete XHTML document.
    pub content: String,
    /// Id of the post this chapter was built from.
    pub source_id: PostId,
    /// Absolute URL of that post.
    pub source_url: String,
}

/// A single entry in the table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Display title.
    pub title: String,
    /// Target document inside the container.
    pub path: String,
    /// Original post URL for traceability.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

/// Navigation structure shared by all chapters of a book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toc {
    pub entries: Vec<TocEntry>,
}

/// An in-memory e-book, ready to hand to the writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    /// Book identifier (id of the first chapter's post).
    pub id: String,
    pub title: String,
    pub author: String,
    /// Shared stylesheet linked by every chapter.
    pub stylesheet: String,
    pub chapters: Vec<Chapter>,
    pub toc: Toc,
}
