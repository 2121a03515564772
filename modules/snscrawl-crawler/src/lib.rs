pub mod export;
pub mod feed;
pub mod identity;
pub mod login;
pub mod platforms;
pub mod text;

pub use feed::{collect_posts, CandidateFeed, CrawlBudget};
