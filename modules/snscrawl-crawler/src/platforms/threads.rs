//! Threads feed. Containers carry `data-pressable-container`; the fallback
//! walks up from post permalinks when that attribute disappears again.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;

use snscrawl_common::{Platform, RawCandidate};
use webdriver_client::PageDriver;

use super::{LoginSpec, SCROLL_SETTLE};
use crate::feed::CandidateFeed;
use crate::text::{absolutize, clean_content};

const CONTAINER_PROBES: &[&str] = &[
    r#"div[data-pressable-container="true"]"#,
    r#"div:has(> div a[href*="/post/"])"#,
];

/// Threads login rides on Instagram credentials.
pub static LOGIN: LoginSpec = LoginSpec {
    login_url: "https://www.threads.net/login",
    pre_login_texts: &["Continue with Instagram", "Log in"],
    username_selectors: &[r#"input[name="username"]"#, r#"input[autocomplete="username"]"#],
    advance_texts: &[],
    password_selectors: &[r#"input[name="password"]"#, r#"input[type="password"]"#],
    submit_selectors: &[r#"button[type="submit"]"#, r#"input[type="submit"]"#],
    submit_texts: &["Log in"],
    logged_out_probes: &[r#"input[name="username"]"#],
    success_probes: &[r#"svg[aria-label="Create"]"#, r#"svg[aria-label="Home"]"#],
    challenge_probes: &[
        r#"input[name="verificationCode"]"#,
        r#"input[aria-label*="code"]"#,
    ],
};

/// Pulls author, permalink, time, text, and interaction-count strings out of
/// every rendered container in one round trip.
const EXTRACT_SCRIPT: &str = r#"
const out = [];
for (const el of document.querySelectorAll(arguments[0])) {
    const item = { author: null, content: null, timestamp: null, url: null,
                   likes: null, comments: null, shares: null };
    try {
        for (const a of el.querySelectorAll('a[href*="/@"]')) {
            const href = a.getAttribute('href') || '';
            if (href.includes('/post/')) continue;
            const handle = (href.split('/@').pop() || '').split('/')[0].split('?')[0];
            if (handle && /^[A-Za-z0-9._]+$/.test(handle)) { item.author = handle; break; }
        }
        const time = el.querySelector('time');
        if (time) {
            item.timestamp = (time.textContent || '').trim();
            const link = time.closest('a');
            if (link) item.url = link.getAttribute('href');
        }
        item.content = el.innerText || '';
        const count = (label) => {
            const svg = el.querySelector('svg[aria-label="' + label + '"]');
            if (!svg) return null;
            const btn = svg.closest('div[role="button"]') || svg.closest('button');
            if (!btn) return null;
            const m = (btn.innerText || '').match(/\d[\d,.]*[KMB]?/);
            return m ? m[0] : null;
        };
        item.likes = count('Like');
        item.comments = count('Comment') || count('Reply');
        item.shares = count('Repost') || count('Share');
    } catch (e) { /* leave partial fields; validation sorts it out */ }
    out.push(item);
}
return out;
"#;

const SKIP_KEYWORDS: &[&str] = &[
    "What's new?",
    "Sorry,",
    "reposted",
    "Learn more",
    "Translate",
    "View activity",
];

fn clean_candidate(mut raw: RawCandidate) -> RawCandidate {
    if let Some(content) = raw.content.take() {
        // The author handle leads the innerText; drop it so the fallback
        // identity key doesn't double-count it.
        if let Some(ref author) = raw.author {
            let trimmed = content
                .lines()
                .filter(|line| line.trim() != author.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            raw.content = Some(clean_content(&trimmed, SKIP_KEYWORDS));
        } else {
            raw.content = Some(clean_content(&content, SKIP_KEYWORDS));
        }
    }
    if let Some(url) = raw.url.take() {
        raw.url = absolutize(&url, Platform::Threads.base_url());
    }
    raw
}

pub struct ThreadsFeed<'d> {
    driver: &'d PageDriver,
}

impl<'d> ThreadsFeed<'d> {
    pub fn new(driver: &'d PageDriver) -> Self {
        Self { driver }
    }
}

#[async_trait]
impl CandidateFeed for ThreadsFeed<'_> {
    fn platform(&self) -> Platform {
        Platform::Threads
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
        self.driver.scroll_to_bottom().await?;
        self.driver.settle(SCROLL_SETTLE).await;
        Ok(())
    }
}
