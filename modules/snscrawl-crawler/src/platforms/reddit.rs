//! Reddit feed. The current markup exposes everything as attributes on the
//! `shreddit-post` web component; older `article`/`t3_` markup is the
//! fallback and goes through innerText heuristics instead.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;

use snscrawl_common::{Platform, RawCandidate};
use webdriver_client::PageDriver;

use super::{LoginSpec, SCROLL_SETTLE};
use crate::feed::CandidateFeed;
use crate::text::{absolutize, clean_content};

const CONTAINER_PROBES: &[&str] = &[
    "shreddit-post",
    "article",
    r#"div[data-testid="post-container"]"#,
    r#"div[id^="t3_"]"#,
];

pub static LOGIN: LoginSpec = LoginSpec {
    login_url: "https://www.reddit.com/login/",
    pre_login_texts: &[],
    username_selectors: &[r#"input#login-username"#, r#"input[name="username"]"#],
    advance_texts: &[],
    password_selectors: &[r#"input#login-password"#, r#"input[name="password"]"#],
    submit_selectors: &[r#"button[type="submit"]"#],
    submit_texts: &["Log In", "Log in"],
    logged_out_probes: &[r#"input#login-username"#, r#"a[href*="/login"]"#],
    success_probes: &[
        r#"#expand-user-drawer-button"#,
        r#"faceplate-dropdown-menu"#,
        r#"a[href^="/user/"]"#,
    ],
    challenge_probes: &[r#"input[name="otp"]"#, r#"input[autocomplete="one-time-code"]"#],
};

const EXTRACT_SCRIPT: &str = r#"
const out = [];
for (const el of document.querySelectorAll(arguments[0])) {
    const item = { author: null, content: null, timestamp: null, url: null,
                   likes: null, comments: null };
    try {
        if (el.tagName.toLowerCase() === 'shreddit-post') {
            item.author = el.getAttribute('author');
            const title = el.getAttribute('post-title') || '';
            const body = el.querySelector('[slot="text-body"]');
            item.content = body ? (title + '\n' + (body.innerText || '')) : title;
            item.timestamp = el.getAttribute('created-timestamp');
            item.url = el.getAttribute('permalink') || el.getAttribute('content-href');
            item.likes = el.getAttribute('score');
            item.comments = el.getAttribute('comment-count');
        } else {
            const title = el.querySelector('a[href*="/comments/"]');
            if (title) {
                item.content = (title.innerText || '').trim();
                item.url = title.getAttribute('href');
            }
            const author = el.querySelector('a[href^="/user/"]');
            if (author) item.author = (author.getAttribute('href') || '').split('/')[2];
            const time = el.querySelector('time');
            if (time) item.timestamp = time.getAttribute('datetime') || (time.textContent || '').trim();
        }
    } catch (e) { /* partial item */ }
    out.push(item);
}
return out;
"#;

fn clean_candidate(mut raw: RawCandidate) -> RawCandidate {
    if let Some(content) = raw.content.take() {
        raw.content = Some(clean_content(&content, &[]));
    }
    if let Some(url) = raw.url.take() {
        raw.url = absolutize(&url, Platform::Reddit.base_url());
    }
    raw
}

pub struct RedditFeed<'d> {
    driver: &'d PageDriver,
}

impl<'d> RedditFeed<'d> {
    pub fn new(driver: &'d PageDriver) -> Self {
        Self { driver }
    }
}

#[async_trait]
impl CandidateFeed for RedditFeed<'_> {
    fn platform(&self) -> Platform {
        Platform::Reddit
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
