//! Authenticated Reddit API client.
//!
//! Uses the app-only OAuth flow (`client_credentials`), then reads posts and
//! paginated submission listings from the OAuth API host.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use tracing::{debug, info, instrument};
use url::Url;

use reddit2epub_shared::{ClientConfig, Credentials, Post, Reddit2EpubError, Result};

use crate::listing::Listing;
use crate::permalink::post_id_from_url;
use crate::{ContentClient, PostPager};

// ---------------------------------------------------------------------------
// RedditClient
// ---------------------------------------------------------------------------

/// Reddit API session holding a bearer token.
pub struct RedditClient {
    config: ClientConfig,
    http: Client,
    api_base: Url,
    token: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
}

impl RedditClient {
    /// Build the HTTP client and obtain an application token.
    #[instrument(skip_all, fields(auth_base = %config.auth_base))]
    pub async fn connect(config: ClientConfig, credentials: &Credentials) -> Result<Self> {
        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Reddit2EpubError::Network(format!("failed to build HTTP client: {e}")))?;

        let api_base = parse_base(&config.api_base)?;
        let token_url = parse_base(&config.auth_base)?
            .join("api/v1/access_token")
            .map_err(|e| Reddit2EpubError::config(format!("invalid auth_base: {e}")))?;

        let response = http
            .post(token_url)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body("grant_type=client_credentials")
            .send()
            .await
            .map_err(|e| Reddit2EpubError::Network(format!("token request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Reddit2EpubError::Auth(format!(
                "token endpoint returned HTTP {status}; check the client id and API secret"
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| Reddit2EpubError::Auth(format!("unreadable token response: {e}")))?;

        let token = match body {
            TokenResponse {
                access_token: Some(token),
                ..
            } if !token.is_empty() => token,
            TokenResponse { error, .. } => {
                return Err(Reddit2EpubError::Auth(
                    error.unwrap_or_else(|| "no access token in response".into()),
                ));
            }
        };

        info!("authenticated against reddit API");

        Ok(Self {
            config,
            http,
            api_base,
            token,
        })
    }

    /// Look up a single post by its URL.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn fetch_post(&self, url: &Url) -> Result<Post> {
        let id = post_id_from_url(url)?;
        let mut endpoint = self.endpoint(&["by_id", &id.fullname()]);
        endpoint.query_pairs_mut().append_pair("raw_json", "1");

        let mut posts = self.get_listing(&endpoint).await?.into_posts();
        if posts.is_empty() {
            return Err(Reddit2EpubError::api(404, format!("post {id} not found")));
        }
        let post = posts.swap_remove(0);

        debug!(id = %post.id, title = %post.title, author = %post.author, "resolved post");
        Ok(post)
    }

    /// Newest-first submissions by `author`, restricted to `subreddit` when given.
    pub fn submissions<'a>(&'a self, author: &str, subreddit: Option<&str>) -> Submissions<'a> {
        let mut endpoint = match subreddit {
            Some(sub) => {
                let mut url = self.endpoint(&["r", sub, "search"]);
                url.query_pairs_mut()
                    .append_pair("q", &format!("author:{author}"))
                    .append_pair("restrict_sr", "on")
                    .append_pair("include_over_18", "on");
                url
            }
            None => self.endpoint(&["user", author, "submitted"]),
        };
        endpoint
            .query_pairs_mut()
            .append_pair("sort", "new")
            .append_pair("raw_json", "1");

        Submissions {
            client: self,
            endpoint,
            after: None,
            pages: 0,
            exhausted: false,
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_listing(&self, url: &Url) -> Result<Listing> {
        debug!(%url, "GET listing");

        let response = self
            .http
            .get(url.as_str())
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .send()
            .await
            .map_err(|e| Reddit2EpubError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Reddit2EpubError::api(
                status.as_u16(),
                format!("GET {}", url.path()),
            ));
        }

        response
            .json::<Listing>()
            .await
            .map_err(|e| Reddit2EpubError::parse(format!("{url}: unexpected listing payload: {e}")))
    }
}

impl ContentClient for RedditClient {
    async fn fetch_post(&self, url: &Url) -> Result<Post> {
        RedditClient::fetch_post(self, url).await
    }

    fn author_posts<'a>(
        &'a self,
        author: &'a str,
        subreddit: Option<&'a str>,
    ) -> impl PostPager + 'a {
        self.submissions(author, subreddit)
    }
}

fn parse_base(base: &str) -> Result<Url> {
    let url = Url::parse(base).map_err(|e| Reddit2EpubError::config(format!("{base}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(Reddit2EpubError::config(format!("{base}: not a base URL")));
    }
    Ok(url)
}

// ---------------------------------------------------------------------------
// Submissions pager
// ---------------------------------------------------------------------------

/// Forward-only cursor over a submission listing.
///
/// Each call to [`PostPager::next_page`] issues one request. The cursor is
/// never rewound; request a new one from [`RedditClient::submissions`].
pub struct Submissions<'a> {
    client: &'a RedditClient,
    endpoint: Url,
    after: Option<String>,
    pages: usize,
    exhausted: bool,
}

impl PostPager for Submissions<'_> {
    async fn next_page(&mut self) -> Result<Option<Vec<Post>>> {
        if self.exhausted {
            return Ok(None);
        }

        let rate_limit = self.client.config.rate_limit_ms;
        if self.pages > 0 && rate_limit > 0 {
            tokio::time::sleep(Duration::from_millis(rate_limit)).await;
        }

        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("limit", &self.client.config.page_size.to_string());
            if let Some(after) = &self.after {
                query.append_pair("after", after);
            }
        }

        let listing = self.client.get_listing(&url).await?;
        self.pages += 1;
        self.after = listing.data.after.clone().filter(|a| !a.is_empty());
        self.exhausted = self.after.is_none();

        let posts = listing.into_posts();
        debug!(
            page = self.pages,
            posts = posts.len(),
            last_page = self.exhausted,
            "listing page fetched"
        );
        Ok(Some(posts))
    }
}
