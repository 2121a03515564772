use thiserror::Error;

pub type Result<T> = std::result::Result<T, DriverError>;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("WebDriver error: {0}")]
    WebDriver(String),

    #[error("Script result error: {0}")]
    Script(String),

    #[error("Session state error: {0}")]
    Session(String),
}

impl From<thirtyfour::error::WebDriverError> for DriverError {
    fn from(err: thirtyfour::error::WebDriverError) -> Self {
        DriverError::WebDriver(err.to_string())
    }
}

impl From<std::io::Error> for DriverError {
    fn from(err: std::io::Error) -> Self {
        DriverError::Session(err.to_string())
    }
}
