use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Login failed for {platform}: {reason}")]
    Login { platform: String, reason: String },

    #[error("Session error: {0}")]
    Session(String),

    #[error("Browser driver error: {0}")]
    Driver(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
