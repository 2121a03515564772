use std::path::PathBuf;

use crate::error::CrawlError;
use crate::types::Platform;

/// Login credentials for one platform.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Application configuration loaded from environment variables.
/// Credentials are optional per platform; a crawl that needs a login fails
/// with guidance when its pair is missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// WebDriver server endpoint (chromedriver).
    pub webdriver_url: String,

    /// Overrides the browser user agent when set.
    pub user_agent: Option<String>,

    /// Spreadsheet webhook endpoint for `--sheet` exports.
    pub webhook_url: Option<String>,

    /// Root for crawl outputs, session blobs, and debug screenshots.
    pub data_dir: PathBuf,

    /// Headful browser + screenshots. Also settable via the CLI flag.
    pub debug: bool,

    pub login_timeout_ms: u64,
    pub login_attempts: u32,

    threads: Option<Credentials>,
    linkedin: Option<Credentials>,
    x: Option<Credentials>,
    reddit: Option<Credentials>,
}

impl Config {
    pub fn from_env() -> Result<Self, CrawlError> {
        dotenvy::dotenv().ok();

        let config = Self {
            webdriver_url: env_or("WEBDRIVER_URL", "http://localhost:9515"),
            user_agent: std::env::var("CRAWL_USER_AGENT").ok(),
            webhook_url: std::env::var("SHEETS_WEBHOOK_URL").ok(),
            data_dir: PathBuf::from(env_or("CRAWL_DATA_DIR", "data")),
            debug: env_or("CRAWL_DEBUG", "false").eq_ignore_ascii_case("true"),
            login_timeout_ms: env_or("LOGIN_TIMEOUT_MS", "30000")
                .parse()
                .map_err(|_| CrawlError::Config("LOGIN_TIMEOUT_MS must be a number".into()))?,
            login_attempts: env_or("LOGIN_RETRY_COUNT", "3")
                .parse()
                .map_err(|_| CrawlError::Config("LOGIN_RETRY_COUNT must be a number".into()))?,
            threads: credential_pair("THREADS_USERNAME", "THREADS_PASSWORD"),
            linkedin: credential_pair("LINKEDIN_USERNAME", "LINKEDIN_PASSWORD"),
            x: credential_pair("X_USERNAME", "X_PASSWORD"),
            reddit: credential_pair("REDDIT_USERNAME", "REDDIT_PASSWORD"),
        };

        config.log_redacted();
        Ok(config)
    }

    pub fn credentials(&self, platform: Platform) -> Option<&Credentials> {
        match platform {
            Platform::Threads => self.threads.as_ref(),
            Platform::LinkedIn => self.linkedin.as_ref(),
            Platform::X => self.x.as_ref(),
            Platform::Reddit => self.reddit.as_ref(),
            Platform::GeekNews => None,
        }
    }

    /// Where the session blob for a platform lives.
    pub fn session_path(&self, platform: Platform) -> PathBuf {
        self.data_dir
            .join("sessions")
            .join(format!("{platform}_session.json"))
    }

    pub fn screenshot_dir(&self) -> PathBuf {
        self.data_dir.join("debug_screenshots")
    }

    fn log_redacted(&self) {
        fn mark(c: &Option<Credentials>) -> &'static str {
            if c.is_some() {
                "set"
            } else {
                "unset"
            }
        }

        tracing::info!(
            webdriver_url = %self.webdriver_url,
            data_dir = %self.data_dir.display(),
            webhook = if self.webhook_url.is_some() { "set" } else { "unset" },
            threads = mark(&self.threads),
            linkedin = mark(&self.linkedin),
            x = mark(&self.x),
            reddit = mark(&self.reddit),
            "Config loaded"
        );
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn credential_pair(user_key: &str, pass_key: &str) -> Option<Credentials> {
    match (std::env::var(user_key), std::env::var(pass_key)) {
        (Ok(username), Ok(password)) if !username.is_empty() && !password.is_empty() => {
            Some(Credentials { username, password })
        }
        _ => None,
    }
}
