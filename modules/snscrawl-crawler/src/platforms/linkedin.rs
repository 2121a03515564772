//! LinkedIn feed. Collapsed posts are expanded in-page before extraction so
//! the "…see more" tail doesn't truncate content.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;

use snscrawl_common::{Platform, RawCandidate};
use webdriver_client::PageDriver;

use super::{LoginSpec, SCROLL_SETTLE};
use crate::feed::CandidateFeed;
use crate::text::{absolutize, clean_content};

const CONTAINER_PROBES: &[&str] = &[
    "div.feed-shared-update-v2",
    "div[data-id]",
    "div.occludable-update",
    "article",
];

pub static LOGIN: LoginSpec = LoginSpec {
    login_url: "https://www.linkedin.com/login",
    pre_login_texts: &[],
    username_selectors: &[r#"input#username"#, r#"input[name="session_key"]"#],
    advance_texts: &[],
    password_selectors: &[r#"input#password"#, r#"input[name="session_password"]"#],
    submit_selectors: &[r#"button[type="submit"]"#],
    submit_texts: &["Sign in"],
    logged_out_probes: &[r#"input[name="session_key"]"#, r#"a[href*="/login"]"#],
    success_probes: &[
        r#"img.global-nav__me-photo"#,
        r#"div.global-nav__me"#,
        r#"a[href*="/in/"]"#,
    ],
    challenge_probes: &[
        r#"input[name="pin"]"#,
        r#"input#input__email_verification_pin"#,
    ],
};

/// Expands every collapsed post currently rendered.
const EXPAND_SCRIPT: &str = r#"
let clicked = 0;
for (const btn of document.querySelectorAll('button')) {
    const label = (btn.innerText || '').toLowerCase();
    if (label.includes('see more') || label.includes('…more')) {
        try { btn.click(); clicked++; } catch (e) {}
    }
}
return clicked;
"#;

const EXTRACT_SCRIPT: &str = r#"
const out = [];
for (const el of document.querySelectorAll(arguments[0])) {
    const item = { author: null, content: null, timestamp: null, url: null,
                   likes: null, comments: null, shares: null };
    try {
        const author = el.querySelector('span.update-components-actor__name')
            || el.querySelector('a[href*="/in/"]')
            || el.querySelector('a[href*="/company/"]');
        if (author) item.author = (author.innerText || '').trim().split('\n')[0];
        const text = el.querySelector('div.update-components-text')
            || el.querySelector('span.break-words')
            || el.querySelector('div.feed-shared-text');
        if (text) item.content = text.innerText || '';
        const time = el.querySelector('time')
            || el.querySelector('span.update-components-actor__sub-description');
        if (time) item.timestamp = (time.innerText || '').trim().split('•')[0].trim();
        const link = el.querySelector('a[href*="/posts/"]') || el.querySelector('a[href*="/activity-"]');
        if (link) item.url = link.getAttribute('href');
        const reactions = el.querySelector('span.social-details-social-counts__reactions-count');
        if (reactions) item.likes = (reactions.innerText || '').trim();
        const comments = el.querySelector('li.social-details-social-counts__comments');
        if (comments) item.comments = (comments.innerText || '').trim();
    } catch (e) { /* partial item */ }
    out.push(item);
}
return out;
"#;

const SKIP_KEYWORDS: &[&str] = &[
    "connection",
    "followers",
    "Promoted",
    "Celebrate",
    "reactions",
];

fn clean_candidate(mut raw: RawCandidate) -> RawCandidate {
    if let Some(content) = raw.content.take() {
        raw.content = Some(clean_content(&content, SKIP_KEYWORDS));
    }
    if let Some(url) = raw.url.take() {
        raw.url = absolutize(&url, Platform::LinkedIn.base_url());
    }
    raw
}

pub struct LinkedInFeed<'d> {
    driver: &'d PageDriver,
}

impl<'d> LinkedInFeed<'d> {
    pub fn new(driver: &'d PageDriver) -> Self {
        Self { driver }
    }
}

#[async_trait]
impl CandidateFeed for LinkedInFeed<'_> {
    fn platform(&self) -> Platform {
        Platform::LinkedIn
    }

    async fn candidates(&mut self) -> Result<Vec<RawCandidate>> {
        let Some(hit) = self.driver.probe(CONTAINER_PROBES).await? else {
            return Ok(Vec::new());
        };

        let expanded: i64 = self.driver.execute_json(EXPAND_SCRIPT, vec![]).await?;
        if expanded > 0 {
            tracing::debug!(expanded, "Expanded collapsed posts");
            self.driver
                .settle(std::time::Duration::from_millis(800))
                .await;
        }

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
