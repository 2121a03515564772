use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Platforms this crawler knows how to walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Threads,
    LinkedIn,
    X,
    Reddit,
    GeekNews,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Threads => "threads",
            Platform::LinkedIn => "linkedin",
            Platform::X => "x",
            Platform::Reddit => "reddit",
            Platform::GeekNews => "geeknews",
        }
    }

    /// Site origin, used for cookie restoration and relative-URL resolution.
    pub fn base_url(&self) -> &'static str {
        match self {
            Platform::Threads => "https://www.threads.net",
            Platform::LinkedIn => "https://www.linkedin.com",
            Platform::X => "https://x.com",
            Platform::Reddit => "https://www.reddit.com",
            Platform::GeekNews => "https://news.hada.io",
        }
    }

    /// The feed page a crawl starts from.
    pub fn feed_url(&self) -> &'static str {
        match self {
            Platform::Threads => "https://www.threads.net",
            Platform::LinkedIn => "https://www.linkedin.com/feed/",
            Platform::X => "https://x.com/home",
            Platform::Reddit => "https://www.reddit.com",
            Platform::GeekNews => "https://news.hada.io",
        }
    }

    pub fn requires_login(&self) -> bool {
        !matches!(self, Platform::GeekNews)
    }

    /// Site-level author used when the page doesn't attribute posts to a user.
    pub fn default_author(&self) -> Option<&'static str> {
        match self {
            Platform::GeekNews => Some("GeekNews"),
            _ => None,
        }
    }

    /// Minimum trimmed content length for a record to be accepted.
    pub fn min_content_len(&self) -> usize {
        match self {
            // Link aggregator titles are short
            Platform::GeekNews => 10,
            Platform::LinkedIn => 15,
            _ => 1,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "threads" => Ok(Platform::Threads),
            "linkedin" => Ok(Platform::LinkedIn),
            "x" | "twitter" => Ok(Platform::X),
            "reddit" => Ok(Platform::Reddit),
            "geeknews" => Ok(Platform::GeekNews),
            other => Err(format!("unknown platform: {other}")),
        }
    }
}

/// Author sentinel for candidates where no author could be extracted.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Content is capped at this many chars when a candidate is normalized.
pub const MAX_CONTENT_CHARS: usize = 500;

/// A raw field set handed back by an in-page extraction script, before
/// normalization. Interaction counts arrive as display strings ("1.2K").
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCandidate {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub likes: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub shares: Option<String>,
    #[serde(default)]
    pub views: Option<String>,
}

/// A normalized post record. Platform-specific feeds produce these from
/// raw candidates; every record in a crawl result passed validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub platform: Platform,
    pub author: String,
    pub content: String,
    /// Platform-formatted display time ("3h", "2일 전", ISO string...).
    pub timestamp: String,
    pub url: Option<String>,
    pub likes: Option<i64>,
    pub comments: Option<i64>,
    pub shares: Option<i64>,
    pub views: Option<i64>,
}

impl std::fmt::Display for Post {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let preview: String = self.content.chars().take(50).collect();
        write!(f, "[{}] @{}: {}...", self.platform, self.author, preview)
    }
}

/// Metadata attached to every exported crawl.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlMeta {
    pub platform: Platform,
    pub total_posts: usize,
    pub crawled_at: DateTime<Utc>,
}

/// The result of one crawl invocation. Immutable once built; both the JSON
/// file exporter and the webhook exporter serialize it as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    pub metadata: CrawlMeta,
    pub posts: Vec<Post>,
}

impl CrawlResult {
    pub fn new(platform: Platform, posts: Vec<Post>) -> Self {
        Self {
            metadata: CrawlMeta {
                platform,
                total_posts: posts.len(),
                crawled_at: Utc::now(),
            },
            posts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_roundtrip() {
        for p in [
            Platform::Threads,
            Platform::LinkedIn,
            Platform::X,
            Platform::Reddit,
            Platform::GeekNews,
        ] {
            let parsed: Platform = p.as_str().parse().unwrap();
            assert_eq!(parsed, p);
        }
    }

    #[test]
    fn test_platform_twitter_alias() {
        let parsed: Platform = "twitter".parse().unwrap();
        assert_eq!(parsed, Platform::X);
    }

    #[test]
    fn test_platform_serializes_lowercase() {
        let json = serde_json::to_string(&Platform::LinkedIn).unwrap();
        assert_eq!(json, "\"linkedin\"");
    }

    #[test]
    fn test_crawl_result_metadata_counts_posts() {
        let post = Post {
            platform: Platform::GeekNews,
            author: "GeekNews".into(),
            content: "A post about compilers".into(),
            timestamp: "2시간전".into(),
            url: None,
            likes: None,
            comments: None,
            shares: None,
            views: None,
        };
        let result = CrawlResult::new(Platform::GeekNews, vec![post.clone(), post]);
        assert_eq!(result.metadata.total_posts, 2);
        assert_eq!(result.metadata.platform, Platform::GeekNews);
    }

    #[test]
    fn test_raw_candidate_tolerates_missing_fields() {
        let raw: RawCandidate = serde_json::from_str(r#"{"content": "hello"}"#).unwrap();
        assert_eq!(raw.content.as_deref(), Some("hello"));
        assert!(raw.author.is_none());
        assert!(raw.likes.is_none());
    }
}
