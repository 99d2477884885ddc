//! Post URL recognition.

use url::Url;

use reddit2epub_shared::{PostId, Reddit2EpubError, Result};

/// Extract the submission id from a Reddit post URL.
///
/// Accepted forms:
/// - `https://www.reddit.com/r/<sub>/comments/<id>/<slug>/` (any `*.reddit.com` host)
/// - `https://reddit.com/comments/<id>`
/// - `https://redd.it/<id>`
pub fn post_id_from_url(url: &Url) -> Result<PostId> {
    let invalid = || Reddit2EpubError::InvalidUrl(url.to_string());

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid());
    }

    let host = url.host_str().ok_or_else(invalid)?.to_ascii_lowercase();
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    let candidate = if host == "redd.it" {
        segments.first().copied()
    } else if host == "reddit.com" || host.ends_with(".reddit.com") {
        segments
            .iter()
            .position(|seg| *seg == "comments")
            .and_then(|i| segments.get(i + 1).copied())
    } else {
        None
    };

    match candidate {
        Some(id) if is_base36(id) => Ok(PostId(id.to_ascii_lowercase())),
        _ => Err(invalid()),
    }
}

fn is_base36(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> Result<PostId> {
        post_id_from_url(&Url::parse(s).unwrap())
    }

    #[test]
    fn full_permalink() {
        let got = id("https://www.reddit.com/r/HFY/comments/abc123/chapter_5_the_return/").unwrap();
        assert_eq!(got, PostId("abc123".into()));
    }

    #[test]
    fn alternate_hosts() {
        assert_eq!(
            id("https://old.reddit.com/r/HFY/comments/xyz9/").unwrap().0,
            "xyz9"
        );
        assert_eq!(id("https://reddit.com/comments/xyz9").unwrap().0, "xyz9");
        assert_eq!(id("https://redd.it/xyz9").unwrap().0, "xyz9");
    }

    #[test]
    fn query_and_fragment_ignored() {
        let got = id("https://www.reddit.com/r/HFY/comments/abc123/slug/?utm_source=share#top");
        assert_eq!(got.unwrap().0, "abc123");
    }

    #[test]
    fn rejects_non_post_urls() {
        assert!(matches!(
            id("https://www.reddit.com/r/HFY/"),
            Err(Reddit2EpubError::InvalidUrl(_))
        ));
        assert!(id("https://example.com/r/HFY/comments/abc123/").is_err());
        assert!(id("ftp://redd.it/abc123").is_err());
        assert!(id("https://www.reddit.com/r/HFY/comments/").is_err());
    }
}
