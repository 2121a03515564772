//! GeekNews feed. A link aggregator: topic rows, no login, no infinite
//! scroll; advancing walks the numbered pages instead.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;

use snscrawl_common::{Platform, RawCandidate};
use webdriver_client::PageDriver;

use crate::feed::CandidateFeed;
use crate::text::{absolutize, cap_chars};

const CONTAINER_PROBES: &[&str] = &[".topic_row", r#"div:has(> div a[href^="/topic/"])"#];

const EXTRACT_SCRIPT: &str = r##"
const out = [];
for (const el of document.querySelectorAll(arguments[0])) {
    const item = { author: null, content: null, timestamp: null, url: null,
                   likes: null, comments: null };
    try {
        const link = el.querySelector('a[href*="/topic/"]');
        if (link) {
            item.content = (link.innerText || '').trim();
            item.url = link.getAttribute('href');
        }
        const desc = el.querySelector('.topicdesc, .description, .summary');
        if (desc) {
            const extra = (desc.innerText || '').trim();
            if (extra.length > 10 && item.content) item.content += '\n' + extra;
        }
        const by = el.querySelector('.topicinfo .u, .author, .by');
        if (by) item.author = (by.innerText || '').trim();
        const time = el.querySelector('time, .time, .date');
        if (time) item.timestamp = (time.innerText || '').trim();
        const points = el.querySelector('.points, .score, .vote');
        if (points) item.likes = (points.innerText || '').trim();
        const comments = el.querySelector('a[href*="#comment"], .comment');
        if (comments) item.comments = (comments.innerText || '').trim();
    } catch (e) { /* partial item */ }
    out.push(item);
}
return out;
"##;

fn clean_candidate(mut raw: RawCandidate) -> RawCandidate {
    if let Some(content) = raw.content.take() {
        // Titles are the content; keep them verbatim apart from the cap.
        let trimmed = content.trim();
        raw.content = Some(cap_chars(trimmed, snscrawl_common::MAX_CONTENT_CHARS));
    }
    if let Some(url) = raw.url.take() {
        raw.url = absolutize(&url, Platform::GeekNews.base_url());
    }
    raw
}

pub struct GeekNewsFeed<'d> {
    driver: &'d PageDriver,
    page: u32,
}

impl<'d> GeekNewsFeed<'d> {
    pub fn new(driver: &'d PageDriver) -> Self {
        Self { driver, page: 1 }
    }
}

#[async_trait]
impl CandidateFeed for GeekNewsFeed<'_> {
    fn platform(&self) -> Platform {
        Platform::GeekNews
    }

    async fn candidates(&mut self) -> Result<Vec<RawCandidate>> {
        let Some(hit) = self.driver.probe(CONTAINER_PROBES).await? else {
            return Ok(Vec::new());
        };
        let raws: Vec<RawCandidate> = self
            .driver
            .execute_json(EXTRACT_SCRIPT, vec![json!(hit.selector)])
            .await?;
        Ok(raws.into_iter().map(clean_candidate).collect())
    }

    async fn advance(&mut self) -> Result<()> {
        self.page += 1;
        let url = format!("{}/?page={}", Platform::GeekNews.base_url(), self.page);
        self.driver.goto(&url).await?;
        self.driver
            .settle(std::time::Duration::from_millis(2000))
            .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_absolutizes_topic_url() {
        let raw = RawCandidate {
            content: Some("  러스트로 만든 정적 사이트 생성기  ".into()),
            url: Some("/topic/12345".into()),
            ..Default::default()
        };
        let cleaned = clean_candidate(raw);
        assert_eq!(cleaned.content.as_deref(), Some("러스트로 만든 정적 사이트 생성기"));
        assert_eq!(cleaned.url.as_deref(), Some("https://news.hada.io/topic/12345"));
    }
}
