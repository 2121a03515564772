//! Session-first login: try the saved blob, verify against the live page,
//! and only then walk the platform's login form with typed-in credentials.

use std::time::Duration;

use rand::Rng;
use tracing::{info, warn};

use snscrawl_common::{Config, CrawlError, Credentials, Platform};
use webdriver_client::{PageDriver, SessionStore};

use crate::platforms::{login_spec, LoginSpec};

const FORM_SETTLE: Duration = Duration::from_millis(2000);
const SUBMIT_SETTLE: Duration = Duration::from_millis(3000);

fn driver_err(e: webdriver_client::DriverError) -> CrawlError {
    CrawlError::Driver(e.to_string())
}

/// Make sure the browser is logged in to `platform`, restoring a saved
/// session when possible and saving a fresh one after a successful login.
pub async fn ensure_logged_in(
    driver: &PageDriver,
    platform: Platform,
    config: &Config,
) -> Result<(), CrawlError> {
    if !platform.requires_login() {
        return Ok(());
    }

    let spec = login_spec(platform).ok_or_else(|| CrawlError::Login {
        platform: platform.to_string(),
        reason: "no login flow defined".into(),
    })?;

    let store = SessionStore::new(config.session_path(platform));

    // Cookies can only be set on the platform's own origin.
    driver.goto(platform.base_url()).await.map_err(driver_err)?;

    if let Some(state) = store.load(platform.as_str()).map_err(driver_err)? {
        SessionStore::apply(driver, &state)
            .await
            .map_err(driver_err)?;
        driver.goto(platform.feed_url()).await.map_err(driver_err)?;
        driver.settle(FORM_SETTLE).await;

        if verify_login(driver, spec).await {
            info!(%platform, "Logged in from saved session");
            return Ok(());
        }
        warn!(%platform, "Saved session no longer valid, discarding");
        store.discard();
    }

    let creds = config.credentials(platform).ok_or_else(|| CrawlError::Login {
        platform: platform.to_string(),
        reason: format!(
            "credentials not configured: set {0}_USERNAME and {0}_PASSWORD",
            platform.as_str().to_uppercase()
        ),
    })?;

    attempt_login(driver, platform, spec, creds, config).await?;

    match SessionStore::capture(driver, platform.as_str()).await {
        Ok(state) => {
            if let Err(e) = store.save(&state) {
                warn!(%platform, error = %e, "Could not persist session");
            }
        }
        Err(e) => warn!(%platform, error = %e, "Could not capture session"),
    }

    Ok(())
}

/// Positive login-state check. Conservative: an unmatched page counts as
/// logged out.
pub async fn verify_login(driver: &PageDriver, spec: &LoginSpec) -> bool {
    match driver.current_url().await {
        Ok(url) if url.contains("/login") => return false,
        Err(_) => return false,
        _ => {}
    }

    if driver
        .any_present(spec.logged_out_probes)
        .await
        .unwrap_or(false)
    {
        return false;
    }

    driver
        .any_present(spec.success_probes)
        .await
        .unwrap_or(false)
}

async fn attempt_login(
    driver: &PageDriver,
    platform: Platform,
    spec: &LoginSpec,
    creds: &Credentials,
    config: &Config,
) -> Result<(), CrawlError> {
    for attempt in 1..=config.login_attempts {
        info!(%platform, attempt, of = config.login_attempts, "Login attempt");

        driver.goto(spec.login_url).await.map_err(driver_err)?;
        driver.settle(FORM_SETTLE).await;

        if !spec.pre_login_texts.is_empty() {
            // e.g. Threads hides the form behind "Continue with Instagram".
            if driver
                .click_by_text(spec.pre_login_texts)
                .await
                .map_err(driver_err)?
            {
                driver.settle(FORM_SETTLE).await;
            }
        }

        let filled = driver
            .fill_slowly(spec.username_selectors, &creds.username)
            .await
            .map_err(driver_err)?;
        if !filled {
            // No username field; possibly already logged in.
            if verify_login(driver, spec).await {
                info!(%platform, "Already logged in");
                return Ok(());
            }
            warn!(%platform, attempt, "Login form not found");
            backoff().await;
            continue;
        }

        if !spec.advance_texts.is_empty() {
            // Two-step flows (X) reveal the password field behind "Next".
            driver
                .click_by_text(spec.advance_texts)
                .await
                .map_err(driver_err)?;
            driver.settle(FORM_SETTLE).await;
        }

        driver
            .fill_slowly(spec.password_selectors, &creds.password)
            .await
            .map_err(driver_err)?;

        let submitted = driver
            .click_first(spec.submit_selectors)
            .await
            .map_err(driver_err)?
            || driver
                .click_by_text(spec.submit_texts)
                .await
                .map_err(driver_err)?;
        if !submitted {
            warn!(%platform, attempt, "Submit control not found");
            backoff().await;
            continue;
        }
        driver.settle(SUBMIT_SETTLE).await;

        if driver
            .any_present(spec.challenge_probes)
            .await
            .map_err(driver_err)?
        {
            // Cannot answer 2FA in an unattended run; retrying won't help.
            return Err(CrawlError::Login {
                platform: platform.to_string(),
                reason: "two-factor challenge presented: complete it once in a headful \
                         session (--debug) so the saved session can be reused"
                    .into(),
            });
        }

        driver.goto(platform.feed_url()).await.map_err(driver_err)?;
        driver.settle(SUBMIT_SETTLE).await;

        if verify_login(driver, spec).await {
            info!(%platform, "Login succeeded");
            return Ok(());
        }

        warn!(%platform, attempt, "Login not confirmed");
        backoff().await;
    }

    Err(CrawlError::Login {
        platform: platform.to_string(),
        reason: format!(
            "gave up after {} attempts: check the credentials, or run with --debug \
             to watch the browser",
            config.login_attempts
        ),
    })
}

async fn backoff() {
    let ms = rand::rng().random_range(2000..4000);
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
