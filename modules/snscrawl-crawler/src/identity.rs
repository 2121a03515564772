//! Approximate dedup fingerprints. There is no stable post id across these
//! platforms, so identity is the post URL when one was extracted, otherwise
//! author plus a content prefix. Known failure modes, accepted as-is:
//! an author repeating the same short post collides (false positive), and an
//! edited or truncated repost gets a fresh key (false negative).

use snscrawl_common::Post;

use crate::text::cap_chars;

/// Chars of content used in the fallback fingerprint.
const CONTENT_PREFIX_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey(String);

impl IdentityKey {
    pub fn of(post: &Post) -> Self {
        match post.url {
            Some(ref url) if !url.is_empty() => IdentityKey(url.clone()),
            _ => IdentityKey(format!(
                "{}:{}",
                post.author,
                cap_chars(&post.content, CONTENT_PREFIX_CHARS)
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snscrawl_common::Platform;

    fn post(author: &str, content: &str, url: Option<&str>) -> Post {
        Post {
            platform: Platform::Threads,
            author: author.to_string(),
            content: content.to_string(),
            timestamp: "1h".to_string(),
            url: url.map(String::from),
            likes: None,
            comments: None,
            shares: None,
            views: None,
        }
    }

    #[test]
    fn test_url_wins() {
        let a = post("alice", "one thing", Some("https://t/p/1"));
        let b = post("alice", "another thing", Some("https://t/p/1"));
        assert_eq!(IdentityKey::of(&a), IdentityKey::of(&b));

        let c = post("alice", "one thing", Some("https://t/p/2"));
        assert_ne!(IdentityKey::of(&a), IdentityKey::of(&c));
    }

    #[test]
    fn test_fallback_uses_author_and_prefix() {
        let a = post("alice", "same words", None);
        let b = post("bob", "same words", None);
        assert_ne!(IdentityKey::of(&a), IdentityKey::of(&b));
    }

    #[test]
    fn test_prefix_truncation_collides_past_100_chars() {
        let head = "z".repeat(100);
        let a = post("alice", &format!("{head} tail one"), None);
        let b = post("alice", &format!("{head} tail two"), None);
        // Documented false negative turned false positive: differing tails
        // beyond the prefix dedup to the same key.
        assert_eq!(IdentityKey::of(&a), IdentityKey::of(&b));
    }

    #[test]
    fn test_prefix_is_char_boundary_safe() {
        let content = "게시글".repeat(60);
        let a = post("alice", &content, None);
        // Must not panic on multibyte content.
        let _ = IdentityKey::of(&a);
    }

    #[test]
    fn test_empty_url_falls_back() {
        let a = post("alice", "hello world", Some(""));
        let b = post("alice", "hello world", None);
        assert_eq!(IdentityKey::of(&a), IdentityKey::of(&b));
    }
}
