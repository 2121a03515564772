//! Per-platform feeds: selector probe chains, in-page extraction scripts,
//! and the login form shapes. Selectors are hand-tuned against the live
//! sites and ordered newest-markup-first.

pub mod geeknews;
pub mod linkedin;
pub mod reddit;
pub mod threads;
pub mod x;

use std::time::Duration;

use snscrawl_common::Platform;
use webdriver_client::PageDriver;

use crate::feed::CandidateFeed;

pub use geeknews::GeekNewsFeed;
pub use linkedin::LinkedInFeed;
pub use reddit::RedditFeed;
pub use threads::ThreadsFeed;
pub use x::XFeed;

/// Wait after a scroll before rescanning; feeds hydrate lazily.
pub(crate) const SCROLL_SETTLE: Duration = Duration::from_millis(3000);

/// The shape of one platform's login form.
pub struct LoginSpec {
    pub login_url: &'static str,
    /// Buttons that reveal the form (clicked by visible text).
    pub pre_login_texts: &'static [&'static str],
    pub username_selectors: &'static [&'static str],
    /// Two-step flows: the control that reveals the password field.
    pub advance_texts: &'static [&'static str],
    pub password_selectors: &'static [&'static str],
    pub submit_selectors: &'static [&'static str],
    pub submit_texts: &'static [&'static str],
    /// Present only when logged out (login inputs, SSO buttons).
    pub logged_out_probes: &'static [&'static str],
    /// Present only when logged in (composer, profile menu).
    pub success_probes: &'static [&'static str],
    /// Two-factor / verification challenges.
    pub challenge_probes: &'static [&'static str],
}

pub fn login_spec(platform: Platform) -> Option<&'static LoginSpec> {
    match platform {
        Platform::Threads => Some(&threads::LOGIN),
        Platform::LinkedIn => Some(&linkedin::LOGIN),
        Platform::X => Some(&x::LOGIN),
        Platform::Reddit => Some(&reddit::LOGIN),
        Platform::GeekNews => None,
    }
}

pub fn feed_for<'d>(platform: Platform, driver: &'d PageDriver) -> Box<dyn CandidateFeed + 'd> {
    match platform {
        Platform::Threads => Box::new(ThreadsFeed::new(driver)),
        Platform::LinkedIn => Box::new(LinkedInFeed::new(driver)),
        Platform::X => Box::new(XFeed::new(driver)),
        Platform::Reddit => Box::new(RedditFeed::new(driver)),
        Platform::GeekNews => Box::new(GeekNewsFeed::new(driver)),
    }
}
