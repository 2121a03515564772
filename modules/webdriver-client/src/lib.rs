pub mod error;
pub mod session;

pub use error::{DriverError, Result};
pub use session::{SessionState, SessionStore};

use std::path::Path;
use std::time::Duration;

use rand::Rng;
use serde::de::DeserializeOwned;
use thirtyfour::prelude::*;
use tracing::{debug, warn};

/// Options for opening a browser session.
#[derive(Debug, Clone)]
pub struct DriverOptions {
    pub headless: bool,
    pub user_agent: Option<String>,
    pub page_load_timeout: Duration,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            headless: true,
            user_agent: None,
            page_load_timeout: Duration::from_secs(30),
        }
    }
}

/// The selector that matched during a probe, plus how many elements it hit.
#[derive(Debug, Clone)]
pub struct ProbeHit {
    pub selector: String,
    pub count: usize,
}

/// One browser page, owned exclusively by a single crawl invocation.
/// Wraps a WebDriver session against a local chromedriver.
pub struct PageDriver {
    driver: WebDriver,
}

impl PageDriver {
    pub async fn connect(server_url: &str, opts: &DriverOptions) -> Result<Self> {
        let mut caps = DesiredCapabilities::chrome();
        if opts.headless {
            caps.add_chrome_arg("--headless=new")?;
        }
        caps.add_chrome_arg("--disable-gpu")?;
        caps.add_chrome_arg("--no-first-run")?;
        caps.add_chrome_arg("--window-size=1280,1024")?;
        if let Some(ref ua) = opts.user_agent {
            caps.add_chrome_arg(&format!("--user-agent={ua}"))?;
        }

        let driver = WebDriver::new(server_url, caps).await?;
        driver.set_page_load_timeout(opts.page_load_timeout).await?;

        debug!(server_url, headless = opts.headless, "WebDriver session opened");
        Ok(Self { driver })
    }

    pub async fn goto(&self, url: &str) -> Result<()> {
        debug!(url, "Navigating");
        self.driver.goto(url).await?;
        Ok(())
    }

    pub async fn current_url(&self) -> Result<String> {
        Ok(self.driver.current_url().await?.to_string())
    }

    /// Plain wait for the page to settle. Feed pages render asynchronously;
    /// there is no reliable load event to key off.
    pub async fn settle(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    /// One pagination advance: scroll to the bottom of the document.
    pub async fn scroll_to_bottom(&self) -> Result<()> {
        self.driver
            .execute("window.scrollTo(0, document.body.scrollHeight);", vec![])
            .await?;
        Ok(())
    }

    /// Run an ordered selector fallback chain; the first selector matching
    /// any element wins. Returns None when the whole chain misses.
    pub async fn probe(&self, chain: &[&str]) -> Result<Option<ProbeHit>> {
        for selector in chain {
            match self.driver.find_all(By::Css(*selector)).await {
                Ok(elements) if !elements.is_empty() => {
                    debug!(selector, count = elements.len(), "Probe hit");
                    return Ok(Some(ProbeHit {
                        selector: selector.to_string(),
                        count: elements.len(),
                    }));
                }
                Ok(_) => continue,
                Err(e) => {
                    // An invalid selector in the chain is a probe miss, not fatal.
                    debug!(selector, error = %e, "Probe selector failed");
                    continue;
                }
            }
        }
        Ok(None)
    }

    /// True when any selector in the chain matches at least one element.
    pub async fn any_present(&self, chain: &[&str]) -> Result<bool> {
        Ok(self.probe(chain).await?.is_some())
    }

    /// Execute a script and deserialize whatever it returns.
    pub async fn execute_json<T: DeserializeOwned>(
        &self,
        script: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<T> {
        let ret = self.driver.execute(script, args).await?;
        ret.convert()
            .map_err(|e| DriverError::Script(e.to_string()))
    }

    /// Execute a script for its side effects.
    pub async fn execute(&self, script: &str, args: Vec<serde_json::Value>) -> Result<()> {
        self.driver.execute(script, args).await?;
        Ok(())
    }

    /// Fill the first input matched by the chain, one character at a time
    /// with jittered delays. Returns false when no selector matched.
    pub async fn fill_slowly(&self, chain: &[&str], text: &str) -> Result<bool> {
        let Some(element) = self.find_first(chain).await? else {
            return Ok(false);
        };

        element.click().await?;
        element.clear().await?;
        tokio::time::sleep(Duration::from_millis(300)).await;

        for ch in text.chars() {
            element.send_keys(ch.to_string()).await?;
            let delay = rand::rng().random_range(50..150);
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        Ok(true)
    }

    /// Click the first element matched by the chain. Returns false on miss.
    pub async fn click_first(&self, chain: &[&str]) -> Result<bool> {
        let Some(element) = self.find_first(chain).await? else {
            return Ok(false);
        };
        element.click().await?;
        Ok(true)
    }

    /// Click the first button-like element whose visible text contains one of
    /// the given strings. CSS cannot express text matching, so this runs in-page.
    pub async fn click_by_text(&self, texts: &[&str]) -> Result<bool> {
        let script = r#"
        const wanted = arguments[0];
        const nodes = document.querySelectorAll('button, div[role="button"], input[type="submit"], span[role="button"]');
        for (const node of nodes) {
            const label = (node.innerText || node.value || '').trim();
            if (!label) continue;
            for (const t of wanted) {
                if (label.includes(t)) { node.click(); return true; }
            }
        }
        return false;
        "#;
        let wanted: Vec<serde_json::Value> = texts
            .iter()
            .map(|t| serde_json::Value::String(t.to_string()))
            .collect();
        self.execute_json(script, vec![serde_json::Value::Array(wanted)])
            .await
    }

    pub async fn screenshot_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.driver.screenshot(path).await?;
        debug!(path = %path.display(), "Screenshot saved");
        Ok(())
    }

    pub async fn cookies(&self) -> Result<Vec<session::SessionCookie>> {
        let cookies = self.driver.get_all_cookies().await?;
        Ok(cookies.iter().map(session::SessionCookie::from_browser).collect())
    }

    pub async fn add_cookies(&self, cookies: &[session::SessionCookie]) -> Result<()> {
        for cookie in cookies {
            if let Err(e) = self.driver.add_cookie(cookie.to_browser()).await {
                // Cookies for other subdomains are rejected; skip them.
                warn!(name = %cookie.name, error = %e, "Cookie restore skipped");
            }
        }
        Ok(())
    }

    pub async fn local_storage(&self) -> Result<Vec<session::LocalStorageItem>> {
        let script = r#"
        return Object.entries(localStorage).map(([name, value]) => ({ name, value }));
        "#;
        self.execute_json(script, vec![]).await
    }

    pub async fn set_local_storage(&self, items: &[session::LocalStorageItem]) -> Result<()> {
        for item in items {
            let result = self
                .execute(
                    "localStorage.setItem(arguments[0], arguments[1]);",
                    vec![
                        serde_json::Value::String(item.name.clone()),
                        serde_json::Value::String(item.value.clone()),
                    ],
                )
                .await;
            if let Err(e) = result {
                // Some origins block storage access; not fatal for a restore.
                warn!(name = %item.name, error = %e, "localStorage restore skipped");
            }
        }
        Ok(())
    }

    pub async fn quit(self) -> Result<()> {
        self.driver.quit().await?;
        Ok(())
    }

    async fn find_first(&self, chain: &[&str]) -> Result<Option<WebElement>> {
        for selector in chain {
            match self.driver.find_all(By::Css(*selector)).await {
                Ok(mut elements) if !elements.is_empty() => {
                    return Ok(Some(elements.remove(0)));
                }
                _ => continue,
            }
        }
        Ok(None)
    }
}
