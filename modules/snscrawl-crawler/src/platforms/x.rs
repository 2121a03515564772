//! X feed. Tweets live in `article` containers; a candidate without a
//! `time` element is promoted content or a placeholder and gets skipped
//! in-page.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;

use snscrawl_common::{Platform, RawCandidate};
use webdriver_client::PageDriver;

use super::{LoginSpec, SCROLL_SETTLE};
use crate::feed::CandidateFeed;
use crate::text::{absolutize, cap_chars};

const CONTAINER_PROBES: &[&str] = &[
    r#"article[data-testid="tweet"]"#,
    r#"article[role="article"]"#,
    "article",
];

/// X's login is a two-step flow: username, then "Next", then password.
pub static LOGIN: LoginSpec = LoginSpec {
    login_url: "https://x.com/i/flow/login",
    pre_login_texts: &[],
    username_selectors: &[
        r#"input[autocomplete="username"]"#,
        r#"input[name="text"]"#,
    ],
    advance_texts: &["Next"],
    password_selectors: &[r#"input[name="password"]"#, r#"input[type="password"]"#],
    submit_selectors: &[r#"button[data-testid="LoginForm_Login_Button"]"#],
    submit_texts: &["Log in"],
    logged_out_probes: &[r#"a[href="/login"]"#, r#"input[autocomplete="username"]"#],
    success_probes: &[
        r#"a[data-testid="AppTabBar_Home_Link"]"#,
        r#"a[data-testid="SideNav_NewTweet_Button"]"#,
        r#"a[aria-label="Profile"]"#,
    ],
    challenge_probes: &[
        r#"input[data-testid="ocfEnterTextTextInput"]"#,
        r#"input[name="challenge_response"]"#,
    ],
};

/// Counts come from the action-bar aria-labels ("12 replies, 3 reposts,
/// 99 likes, 1.2K views"), which survive layout changes better than the
/// individual count spans.
const EXTRACT_SCRIPT: &str = r#"
const out = [];
const pick = (label, names) => {
    for (const name of names) {
        const m = label.match(new RegExp('([\\d,.]+[KMB]?)\\s+' + name, 'i'));
        if (m) return m[1];
    }
    return null;
};
for (const el of document.querySelectorAll(arguments[0])) {
    if (!el.querySelector('time')) continue;
    const item = { author: null, content: null, timestamp: null, url: null,
                   likes: null, comments: null, shares: null, views: null };
    try {
        const user = el.querySelector('div[data-testid="User-Name"] a[href^="/"]');
        if (user) {
            const handle = (user.getAttribute('href') || '').split('/')[1];
            if (handle) item.author = handle.split('?')[0];
        }
        const text = el.querySelector('div[data-testid="tweetText"]') || el.querySelector('div[lang]');
        if (text) item.content = text.innerText || '';
        const time = el.querySelector('time');
        item.timestamp = time.getAttribute('datetime') || (time.textContent || '').trim();
        const link = time.closest('a');
        if (link) item.url = link.getAttribute('href');
        const bar = el.querySelector('div[role="group"][aria-label]');
        if (bar) {
            const label = bar.getAttribute('aria-label') || '';
            item.comments = pick(label, ['replies', 'reply']);
            item.shares = pick(label, ['reposts', 'repost', 'retweets', 'retweet']);
            item.likes = pick(label, ['likes', 'like']);
            item.views = pick(label, ['views', 'view']);
        }
    } catch (e) { /* partial item */ }
    out.push(item);
}
return out;
"#;

fn clean_candidate(mut raw: RawCandidate) -> RawCandidate {
    if let Some(content) = raw.content.take() {
        // tweetText is already chrome-free; collapse whitespace and cap.
        let collapsed = content.split_whitespace().collect::<Vec<_>>().join(" ");
        raw.content = Some(cap_chars(&collapsed, snscrawl_common::MAX_CONTENT_CHARS));
    }
    if let Some(url) = raw.url.take() {
        raw.url = absolutize(&url, Platform::X.base_url());
    }
    raw
}

pub struct XFeed<'d> {
    driver: &'d PageDriver,
}

impl<'d> XFeed<'d> {
    pub fn new(driver: &'d PageDriver) -> Self {
        Self { driver }
    }
}

#[async_trait]
impl CandidateFeed for XFeed<'_> {
    fn platform(&self) -> Platform {
        Platform::X
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
