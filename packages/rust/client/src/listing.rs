//! Raw Reddit listing payloads and their validation into [`Post`].

use chrono::DateTime;
use serde::Deserialize;
use tracing::debug;

use reddit2epub_shared::{Post, PostId, Reddit2EpubError, Result};

/// `{"kind": "Listing", "data": {...}}` envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListingData {
    /// Cursor for the next page; `null` on the last page.
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub children: Vec<Thing>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Thing {
    #[serde(default)]
    pub kind: String,
    pub data: RawPost,
}

/// Submission fields as the API sends them. Everything is optional here;
/// [`RawPost::into_post`] decides what is required.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawPost {
    pub id: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub subreddit: Option<String>,
    pub selftext: Option<String>,
    pub is_self: Option<bool>,
    pub created_utc: Option<f64>,
    pub permalink: Option<String>,
}

impl RawPost {
    pub fn into_post(self) -> Result<Post> {
        let id = required(self.id, "id")?;
        let missing = |field: &str| Reddit2EpubError::parse(format!("post {id}: missing {field}"));

        let title = self.title.ok_or_else(|| missing("title"))?;
        let author = self.author.ok_or_else(|| missing("author"))?;
        let subreddit = self.subreddit.ok_or_else(|| missing("subreddit"))?;
        let created_at = self
            .created_utc
            .and_then(|secs| DateTime::from_timestamp(secs as i64, 0))
            .ok_or_else(|| missing("created_utc"))?;

        let text = match self.is_self {
            Some(false) => None,
            _ => self.selftext.filter(|t| !t.trim().is_empty()),
        };

        let permalink = self
            .permalink
            .unwrap_or_else(|| format!("/r/{subreddit}/comments/{id}/"));

        Ok(Post {
            id: PostId::from(id.as_str()),
            title,
            author,
            subreddit,
            text,
            created_at,
            permalink,
        })
    }
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Reddit2EpubError::parse(format!("listing entry without {field}")))
}

impl Listing {
    /// Validate every submission in the listing.
    ///
    /// Non-submission things and entries missing required fields are skipped,
    /// so one odd entry never discards the rest of the page.
    pub fn into_posts(self) -> Vec<Post> {
        self.data
            .children
            .into_iter()
            .filter(|thing| thing.kind.is_empty() || thing.kind == "t3")
            .filter_map(|thing| match thing.data.into_post() {
                Ok(post) => Some(post),
                Err(e) => {
                    debug!(error = %e, "skipping malformed listing entry");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"{
        "kind": "Listing",
        "data": {
            "after": "t3_def456",
            "children": [
                {"kind": "t3", "data": {
                    "id": "abc123", "title": "Chapter 5: The Return", "author": "writer",
                    "subreddit": "HFY", "selftext": "It was dark.\n\nThen light.",
                    "is_self": true, "created_utc": 1700000000.0,
                    "permalink": "/r/HFY/comments/abc123/chapter_5_the_return/"
                }},
                {"kind": "t3", "data": {
                    "id": "def456", "title": "Chapter 5 art", "author": "writer",
                    "subreddit": "HFY", "selftext": "", "is_self": false,
                    "created_utc": 1690000000.0
                }}
            ]
        }
    }"#;

    #[test]
    fn parses_listing_page() {
        let listing: Listing = serde_json::from_str(LISTING).expect("deserialize");
        assert_eq!(listing.data.after.as_deref(), Some("t3_def456"));

        let posts = listing.into_posts();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id.0, "abc123");
        assert_eq!(posts[0].text(), Some("It was dark.\n\nThen light."));
        assert_eq!(posts[0].created_at.timestamp(), 1_700_000_000);
    }

    #[test]
    fn link_posts_have_no_text() {
        let listing: Listing = serde_json::from_str(LISTING).unwrap();
        let posts = listing.into_posts();
        assert!(!posts[1].has_text());
        assert_eq!(posts[1].permalink, "/r/HFY/comments/def456/");
    }

    #[test]
    fn missing_author_is_a_parse_error() {
        let raw = RawPost {
            id: Some("abc".into()),
            title: Some("t".into()),
            subreddit: Some("HFY".into()),
            created_utc: Some(1.0),
            ..RawPost::default()
        };
        let err = raw.into_post().unwrap_err();
        assert!(err.to_string().contains("missing author"));
    }

    #[test]
    fn comment_things_are_skipped() {
        let json = r#"{"data": {"after": null, "children": [
            {"kind": "t1", "data": {"id": "c1"}}
        ]}}"#;
        let listing: Listing = serde_json::from_str(json).unwrap();
        assert!(listing.into_posts().is_empty());
    }

    #[test]
    fn malformed_entry_skipped_rest_of_page_kept() {
        let json = r#"{"data": {"after": null, "children": [
            {"kind": "t3", "data": {"id": "bad1", "title": "Chapter 2", "subreddit": "HFY",
                "selftext": "x", "is_self": true, "created_utc": 1.0}},
            {"kind": "t3", "data": {"id": "ok1", "title": "Chapter 3", "author": "writer",
                "subreddit": "HFY", "selftext": "y", "is_self": true, "created_utc": 2.0}}
        ]}}"#;
        let listing: Listing = serde_json::from_str(json).unwrap();
        let posts = listing.into_posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id.0, "ok1");
    }
}
