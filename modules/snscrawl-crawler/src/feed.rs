//! The crawl core: a bounded scroll/extract/validate/dedup loop, generic over
//! a feed so tests can drive it without a browser.

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info, warn};

use snscrawl_common::{validate, Platform, Post, RawCandidate, MAX_CONTENT_CHARS, UNKNOWN_AUTHOR};

use crate::identity::IdentityKey;
use crate::text::{cap_chars, parse_count_nonzero};

/// A feed of post candidates: whatever is currently rendered, plus one way
/// to ask for more.
#[async_trait]
pub trait CandidateFeed: Send {
    fn platform(&self) -> Platform;

    /// Extract the currently rendered candidates. A failed scan is reported
    /// by the caller and treated as an empty round, not a crawl failure.
    async fn candidates(&mut self) -> Result<Vec<RawCandidate>>;

    /// One pagination advance (a scroll, usually).
    async fn advance(&mut self) -> Result<()>;
}

/// Bounds for one crawl.
#[derive(Debug, Clone)]
pub struct CrawlBudget {
    /// Stop as soon as this many records are accepted.
    pub target: usize,
    /// Hard cap on pagination advances.
    pub max_scrolls: u32,
    /// Consecutive rounds that rendered candidates but accepted nothing new
    /// before giving up early. Rounds with zero rendered candidates never
    /// count; the page may simply still be loading, so those spend the
    /// scroll budget instead.
    pub stagnation_limit: u32,
}

impl CrawlBudget {
    pub fn with_target(target: usize) -> Self {
        Self {
            target,
            max_scrolls: 15,
            stagnation_limit: 3,
        }
    }
}

impl Default for CrawlBudget {
    fn default() -> Self {
        Self::with_target(5)
    }
}

/// Turn a raw candidate into a record. Never fails: missing fields become
/// sentinels that validation then rejects.
pub fn normalize(platform: Platform, raw: RawCandidate) -> Post {
    let author = raw
        .author
        .filter(|a| !a.trim().is_empty())
        .unwrap_or_else(|| {
            platform
                .default_author()
                .unwrap_or(UNKNOWN_AUTHOR)
                .to_string()
        });

    Post {
        platform,
        author,
        content: cap_chars(raw.content.as_deref().unwrap_or(""), MAX_CONTENT_CHARS),
        timestamp: raw
            .timestamp
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "unknown".to_string()),
        url: raw.url.filter(|u| !u.is_empty()),
        likes: parse_count_nonzero(raw.likes.as_deref()),
        comments: parse_count_nonzero(raw.comments.as_deref()),
        shares: parse_count_nonzero(raw.shares.as_deref()),
        views: parse_count_nonzero(raw.views.as_deref()),
    }
}

/// Walk the feed until `target` records are accepted, the scroll budget is
/// spent, or the feed goes stale. A partial result is a result, not an error.
pub async fn collect_posts<F>(feed: &mut F, budget: &CrawlBudget) -> Result<Vec<Post>>
where
    F: CandidateFeed + ?Sized,
{
    let platform = feed.platform();
    let mut accepted: Vec<Post> = Vec::new();
    let mut seen: HashSet<IdentityKey> = HashSet::new();
    let mut rejected = 0usize;
    let mut scrolls = 0u32;
    let mut stagnant_rounds = 0u32;

    info!(
        %platform,
        target = budget.target,
        max_scrolls = budget.max_scrolls,
        "Crawl started"
    );

    loop {
        let candidates = match feed.candidates().await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(%platform, error = %e, "Candidate scan failed, skipping round");
                Vec::new()
            }
        };
        let rendered = candidates.len();

        let mut new_this_round = 0usize;
        for raw in candidates {
            let post = normalize(platform, raw);
            let key = IdentityKey::of(&post);
            if seen.contains(&key) {
                continue;
            }
            match validate::check(&post) {
                Ok(()) => {
                    seen.insert(key);
                    accepted.push(post);
                    new_this_round += 1;
                }
                Err(reason) => {
                    rejected += 1;
                    debug!(%platform, reason = reason.as_str(), "Candidate rejected");
                }
            }
        }
        debug!(
            %platform,
            rendered,
            new = new_this_round,
            total = accepted.len(),
            "Extraction round complete"
        );

        if accepted.len() >= budget.target {
            info!(%platform, collected = budget.target, rejected, scrolls, "Target reached");
            accepted.truncate(budget.target);
            return Ok(accepted);
        }

        if rendered > 0 && new_this_round == 0 {
            stagnant_rounds += 1;
            if stagnant_rounds >= budget.stagnation_limit {
                info!(%platform, collected = accepted.len(), "Feed stopped yielding, giving up early");
                break;
            }
        } else if new_this_round > 0 {
            stagnant_rounds = 0;
        }

        if scrolls >= budget.max_scrolls {
            break;
        }
        scrolls += 1;
        feed.advance().await?;
    }

    info!(
        %platform,
        collected = accepted.len(),
        rejected,
        scrolls,
        "Crawl finished with partial result"
    );
    Ok(accepted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(author: &str, content: &str, url: Option<&str>) -> RawCandidate {
        RawCandidate {
            author: Some(author.to_string()),
            content: Some(content.to_string()),
            timestamp: Some("2h".to_string()),
            url: url.map(String::from),
            ..Default::default()
        }
    }

    /// Replays scripted rounds of candidates; sticks on the last round once
    /// the script runs out, like a page that stopped loading new posts.
    struct ScriptedFeed {
        rounds: Vec<Vec<RawCandidate>>,
        cursor: usize,
        advances: u32,
    }

    impl ScriptedFeed {
        fn new(rounds: Vec<Vec<RawCandidate>>) -> Self {
            Self {
                rounds,
                cursor: 0,
                advances: 0,
            }
        }
    }

    #[async_trait]
    impl CandidateFeed for ScriptedFeed {
        fn platform(&self) -> Platform {
            Platform::Threads
        }

        async fn candidates(&mut self) -> Result<Vec<RawCandidate>> {
            Ok(self.rounds.get(self.cursor).cloned().unwrap_or_default())
        }

        async fn advance(&mut self) -> Result<()> {
            self.advances += 1;
            if self.cursor + 1 < self.rounds.len() {
                self.cursor += 1;
            }
            Ok(())
        }
    }

    fn budget(target: usize, max_scrolls: u32) -> CrawlBudget {
        CrawlBudget {
            target,
            max_scrolls,
            stagnation_limit: 3,
        }
    }

    #[tokio::test]
    async fn test_stops_at_target_without_further_scrolling() {
        // Five candidates, one duplicate identity, target three: exactly
        // three come back and the feed is never advanced.
        let mut feed = ScriptedFeed::new(vec![vec![
            raw("a", "first post body", None),
            raw("b", "second post body", None),
            raw("a", "first post body", None), // duplicate of the first
            raw("c", "third post body", None),
            raw("d", "fourth post body", None),
        ]]);

        let posts = collect_posts(&mut feed, &budget(3, 15)).await.unwrap();
        assert_eq!(posts.len(), 3);
        assert_eq!(feed.advances, 0);
        assert_eq!(posts[0].author, "a");
        assert_eq!(posts[2].author, "c");
    }

    #[tokio::test]
    async fn test_empty_feed_spends_budget_and_returns_empty() {
        let mut feed = ScriptedFeed::new(vec![]);
        let posts = collect_posts(&mut feed, &budget(5, 5)).await.unwrap();
        assert!(posts.is_empty());
        assert_eq!(feed.advances, 5);
    }

    #[tokio::test]
    async fn test_accumulates_across_rounds() {
        let mut feed = ScriptedFeed::new(vec![
            vec![raw("a", "round one post", None)],
            vec![
                raw("a", "round one post", None), // still rendered
                raw("b", "round two post", None),
            ],
            vec![raw("c", "round three post", None)],
        ]);

        let posts = collect_posts(&mut feed, &budget(3, 15)).await.unwrap();
        assert_eq!(posts.len(), 3);
        let authors: Vec<&str> = posts.iter().map(|p| p.author.as_str()).collect();
        assert_eq!(authors, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_output_never_exceeds_unique_identities() {
        // The same two posts re-rendered forever.
        let round = vec![
            raw("a", "one and only", Some("https://t/p/1")),
            raw("b", "the other one", Some("https://t/p/2")),
        ];
        let mut feed = ScriptedFeed::new(vec![round]);

        let posts = collect_posts(&mut feed, &budget(10, 15)).await.unwrap();
        assert_eq!(posts.len(), 2);
    }

    #[tokio::test]
    async fn test_stagnant_rendered_feed_stops_early() {
        let round = vec![raw("a", "the single post", None)];
        let mut feed = ScriptedFeed::new(vec![round]);

        let posts = collect_posts(&mut feed, &budget(10, 50)).await.unwrap();
        assert_eq!(posts.len(), 1);
        // One productive round, then three stagnant ones.
        assert!(feed.advances <= 4, "advances = {}", feed.advances);
    }

    #[tokio::test]
    async fn test_invalid_candidates_are_dropped_not_fatal() {
        let mut feed = ScriptedFeed::new(vec![vec![
            RawCandidate::default(), // no author, no content
            raw("Unknown", "content with sentinel author", None),
            raw("real", "an acceptable post", None),
        ]]);

        let posts = collect_posts(&mut feed, &budget(5, 2)).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].author, "real");
    }

    #[tokio::test]
    async fn test_dedup_is_idempotent() {
        // Feeding the identical candidate list twice admits nothing new the
        // second time around.
        let round = vec![
            raw("a", "alpha body text", None),
            raw("b", "beta body text", None),
        ];
        let mut once = ScriptedFeed::new(vec![round.clone()]);
        let mut twice = ScriptedFeed::new(vec![round.clone(), round]);

        let first = collect_posts(&mut once, &budget(10, 0)).await.unwrap();
        let second = collect_posts(&mut twice, &budget(10, 1)).await.unwrap();
        assert_eq!(first.len(), second.len());
    }

    #[tokio::test]
    async fn test_normalize_parses_counts_and_caps_content() {
        let candidate = RawCandidate {
            author: Some("someone".into()),
            content: Some("y".repeat(900)),
            timestamp: None,
            url: None,
            likes: Some("1.5K".into()),
            comments: Some("0".into()),
            shares: None,
            views: Some("2M".into()),
        };
        let post = normalize(Platform::X, candidate);
        assert_eq!(post.content.chars().count(), MAX_CONTENT_CHARS);
        assert_eq!(post.likes, Some(1500));
        assert_eq!(post.comments, None);
        assert_eq!(post.views, Some(2_000_000));
        assert_eq!(post.timestamp, "unknown");
    }
}
