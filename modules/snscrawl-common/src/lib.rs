pub mod config;
pub mod error;
pub mod types;
pub mod validate;

pub use config::{Config, Credentials};
pub use error::CrawlError;
pub use types::*;
pub use validate::*;
