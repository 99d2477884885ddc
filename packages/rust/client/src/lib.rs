//! Reddit content client.
//!
//! This crate provides:
//! - [`ContentClient`] / [`PostPager`]: the interface the chapter locator consumes
//! - [`RedditClient`]: the OAuth-backed implementation
//! - [`post_id_from_url`]: permalink recognition

mod api;
mod listing;
mod permalink;

use url::Url;

use reddit2epub_shared::{Post, Result};

pub use api::{RedditClient, Submissions};
pub use permalink::post_id_from_url;

/// Source of posts: single lookups plus lazy author listings.
///
/// Implementations are not expected to be shared across concurrent series
/// fetches; give each pipeline run its own client.
#[allow(async_fn_in_trait)]
pub trait ContentClient {
    /// Resolve the post a URL points at.
    async fn fetch_post(&self, url: &Url) -> Result<Post>;

    /// Newest-first posts by `author`; all subreddits when `subreddit` is `None`.
    fn author_posts<'a>(
        &'a self,
        author: &'a str,
        subreddit: Option<&'a str>,
    ) -> impl PostPager + 'a;
}

/// Forward-only, page-at-a-time post sequence.
#[allow(async_fn_in_trait)]
pub trait PostPager {
    /// Next page of posts, or `None` once the sequence is drained.
    async fn next_page(&mut self) -> Result<Option<Vec<Post>>>;
}
