//! Drives the crawl loop through a scripted feed the way a platform module
//! would: overlapping rounds, duplicates, junk candidates, and a feed that
//! dries up before the target is reached.

use anyhow::Result;
use async_trait::async_trait;

use snscrawl_common::{Platform, RawCandidate};
use snscrawl_crawler::{collect_posts, CandidateFeed, CrawlBudget};

struct PagedFeed {
    rounds: Vec<Vec<RawCandidate>>,
    cursor: usize,
    scrolls: u32,
}

impl PagedFeed {
    fn new(rounds: Vec<Vec<RawCandidate>>) -> Self {
        Self {
            rounds,
            cursor: 0,
            scrolls: 0,
        }
    }
}

#[async_trait]
impl CandidateFeed for PagedFeed {
    fn platform(&self) -> Platform {
        Platform::Reddit
    }

    async fn candidates(&mut self) -> Result<Vec<RawCandidate>> {
        Ok(self.rounds.get(self.cursor).cloned().unwrap_or_default())
    }

    async fn advance(&mut self) -> Result<()> {
        self.scrolls += 1;
        if self.cursor + 1 < self.rounds.len() {
            self.cursor += 1;
        }
        Ok(())
    }
}

fn candidate(author: &str, title: &str, permalink: &str) -> RawCandidate {
    RawCandidate {
        author: Some(author.to_string()),
        content: Some(title.to_string()),
        timestamp: Some("2025-08-07T10:00:00Z".to_string()),
        url: Some(format!("https://www.reddit.com{permalink}")),
        likes: Some("120".to_string()),
        comments: Some("14".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn collects_across_overlapping_pages() {
    // Each scroll keeps the previous posts rendered and adds two more, the
    // way an infinite-scroll feed actually behaves.
    let page1 = vec![
        candidate("a", "first thread", "/r/rust/comments/1/"),
        candidate("b", "second thread", "/r/rust/comments/2/"),
    ];
    let mut page2 = page1.clone();
    page2.push(candidate("c", "third thread", "/r/rust/comments/3/"));
    page2.push(candidate("d", "fourth thread", "/r/rust/comments/4/"));

    let mut feed = PagedFeed::new(vec![page1, page2]);
    let posts = collect_posts(&mut feed, &CrawlBudget::with_target(4))
        .await
        .unwrap();

    assert_eq!(posts.len(), 4);
    let urls: Vec<_> = posts.iter().filter_map(|p| p.url.as_deref()).collect();
    assert_eq!(urls.len(), 4);
    // Order of first sighting is preserved.
    assert!(urls[0].ends_with("/1/"));
    assert!(urls[3].ends_with("/4/"));
}

#[tokio::test]
async fn dried_up_feed_returns_partial_result() {
    let only_round = vec![
        candidate("a", "the one thread", "/r/rust/comments/1/"),
        candidate("b", "the other thread", "/r/rust/comments/2/"),
    ];
    let mut feed = PagedFeed::new(vec![only_round]);

    let posts = collect_posts(&mut feed, &CrawlBudget::with_target(10))
        .await
        .unwrap();

    // Partial result, not an error, and the loop gave up before burning
    // the whole default scroll budget on a stagnant page.
    assert_eq!(posts.len(), 2);
    assert!(feed.scrolls < 15);
}

#[tokio::test]
async fn junk_candidates_do_not_poison_the_round() {
    let round = vec![
        RawCandidate::default(), // extraction came back empty
        RawCandidate {
            content: Some("content without an author".to_string()),
            ..Default::default()
        },
        candidate("real", "an actual thread", "/r/rust/comments/9/"),
    ];
    let mut feed = PagedFeed::new(vec![round]);

    let posts = collect_posts(&mut feed, &CrawlBudget::with_target(3))
        .await
        .unwrap();

    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].author, "real");
    assert_eq!(posts[0].likes, Some(120));
    assert_eq!(posts[0].comments, Some(14));
}
