//! Core pipeline orchestration and domain logic for reddit2epub.
//!
//! This crate ties together chapter discovery, chapter rendering, and EPUB
//! packaging into end-to-end workflows (e.g., `build_book`).

pub mod assembler;
pub mod filename;
pub mod locator;
pub mod pipeline;
pub mod toc;
pub mod writer;

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory [`ContentClient`] for locator and pipeline tests.

    use std::cell::RefCell;

    use chrono::{DateTime, Utc};
    use url::Url;

    use reddit2epub_client::{ContentClient, PostPager};
    use reddit2epub_shared::{Post, PostId, Result};

    /// Serves one anchor post and a fixed sequence of listing pages.
    pub struct FakeClient {
        anchor: Post,
        pages: Vec<Vec<Post>>,
        requests: RefCell<Vec<(String, Option<String>)>>,
    }

    impl FakeClient {
        pub fn new(anchor: Post, pages: Vec<Vec<Post>>) -> Self {
            Self {
                anchor,
                pages,
                requests: RefCell::new(Vec::new()),
            }
        }

        /// `(author, subreddit)` of every listing requested so far.
        pub fn listing_requests(&self) -> Vec<(String, Option<String>)> {
            self.requests.borrow().clone()
        }
    }

    impl ContentClient for FakeClient {
        async fn fetch_post(&self, _url: &Url) -> Result<Post> {
            Ok(self.anchor.clone())
        }

        fn author_posts<'a>(
            &'a self,
            author: &'a str,
            subreddit: Option<&'a str>,
        ) -> impl PostPager + 'a {
            self.requests
                .borrow_mut()
                .push((author.to_string(), subreddit.map(String::from)));
            FakePager {
                pages: self.pages.clone().into_iter(),
            }
        }
    }

    pub struct FakePager {
        pages: std::vec::IntoIter<Vec<Post>>,
    }

    impl PostPager for FakePager {
        async fn next_page(&mut self) -> Result<Option<Vec<Post>>> {
            Ok(self.pages.next())
        }
    }

    pub fn anchor_url() -> Url {
        Url::parse("https://www.reddit.com/r/HFY/comments/abc123/chapter/").unwrap()
    }

    /// A text post by `writer` in `HFY`.
    pub fn post(id: &str, title: &str, created_secs: i64) -> Post {
        Post {
            id: PostId(id.to_string()),
            title: title.to_string(),
            author: "writer".to_string(),
            subreddit: "HFY".to_string(),
            text: Some(format!("Text of {title}.")),
            created_at: DateTime::<Utc>::from_timestamp(created_secs, 0).unwrap(),
            permalink: format!("/r/HFY/comments/{id}/chapter/"),
        }
    }
}
