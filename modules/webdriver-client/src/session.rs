//! Persistent login state. The blob carries a schema tag so a shape change
//! invalidates old files instead of half-applying them.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{DriverError, Result};
use crate::PageDriver;

/// Bump when the blob shape changes; older files are discarded on load.
pub const SESSION_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    pub domain: Option<String>,
    pub path: Option<String>,
    pub secure: bool,
    pub http_only: bool,
}

impl SessionCookie {
    pub fn from_browser(cookie: &thirtyfour::Cookie) -> Self {
        Self {
            name: cookie.name().to_string(),
            value: cookie.value().to_string(),
            domain: cookie.domain().map(String::from),
            path: cookie.path().map(String::from),
            secure: cookie.secure().unwrap_or(false),
            http_only: cookie.http_only().unwrap_or(false),
        }
    }

    /// Rebuild a browser cookie. Expiry is deliberately not restored: blobs
    /// are re-applied on every run and stale auth shows up as a failed
    /// login-state probe, which discards the session anyway.
    pub fn to_browser(&self) -> thirtyfour::Cookie<'static> {
        let mut cookie = thirtyfour::Cookie::new(self.name.clone(), self.value.clone());
        if let Some(ref domain) = self.domain {
            cookie.set_domain(domain.clone());
        }
        if let Some(ref path) = self.path {
            cookie.set_path(path.clone());
        }
        cookie.set_secure(self.secure);
        cookie.set_http_only(self.http_only);
        cookie
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalStorageItem {
    pub name: String,
    pub value: String,
}

/// Everything needed to resume a logged-in browser session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub schema_version: u32,
    pub platform: String,
    pub saved_at: DateTime<Utc>,
    pub cookies: Vec<SessionCookie>,
    pub local_storage: Vec<LocalStorageItem>,
}

/// Reads and writes one platform's session blob.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the blob for `platform`. A missing file is `None`; a corrupt
    /// file, a schema mismatch, or a platform mismatch deletes the file and
    /// returns `None` so the caller falls back to a fresh login.
    pub fn load(&self, platform: &str) -> Result<Option<SessionState>> {
        if !self.path.exists() {
            debug!(platform, "No saved session");
            return Ok(None);
        }

        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(platform, error = %e, "Session file unreadable, discarding");
                self.discard();
                return Ok(None);
            }
        };

        let state: SessionState = match serde_json::from_str(&raw) {
            Ok(state) => state,
            Err(e) => {
                warn!(platform, error = %e, "Session file corrupt, discarding");
                self.discard();
                return Ok(None);
            }
        };

        if state.schema_version != SESSION_SCHEMA_VERSION || state.platform != platform {
            warn!(
                platform,
                found_version = state.schema_version,
                found_platform = %state.platform,
                "Stale session blob, discarding"
            );
            self.discard();
            return Ok(None);
        }

        info!(platform, saved_at = %state.saved_at, cookies = state.cookies.len(), "Session loaded");
        Ok(Some(state))
    }

    pub fn save(&self, state: &SessionState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(state)
            .map_err(|e| DriverError::Session(e.to_string()))?;
        std::fs::write(&self.path, json)?;
        info!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    /// Remove the blob. Missing files are fine.
    pub fn discard(&self) {
        if self.path.exists() {
            if let Err(e) = std::fs::remove_file(&self.path) {
                warn!(path = %self.path.display(), error = %e, "Failed to remove session file");
            }
        }
    }

    /// Capture the current browser session into a blob.
    pub async fn capture(driver: &PageDriver, platform: &str) -> Result<SessionState> {
        Ok(SessionState {
            schema_version: SESSION_SCHEMA_VERSION,
            platform: platform.to_string(),
            saved_at: Utc::now(),
            cookies: driver.cookies().await?,
            local_storage: driver.local_storage().await.unwrap_or_default(),
        })
    }

    /// Apply a blob to the browser. The caller must already be on the
    /// platform's origin; WebDriver only accepts cookies for the current
    /// document's domain.
    pub async fn apply(driver: &PageDriver, state: &SessionState) -> Result<()> {
        driver.add_cookies(&state.cookies).await?;
        driver.set_local_storage(&state.local_storage).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(platform: &str, version: u32) -> SessionState {
        SessionState {
            schema_version: version,
            platform: platform.to_string(),
            saved_at: Utc::now(),
            cookies: vec![SessionCookie {
                name: "sessionid".into(),
                value: "abc123".into(),
                domain: Some(".example.com".into()),
                path: Some("/".into()),
                secure: true,
                http_only: true,
            }],
            local_storage: vec![],
        }
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("threads_session.json"));

        store.save(&state("threads", SESSION_SCHEMA_VERSION)).unwrap();
        let loaded = store.load("threads").unwrap().expect("session should load");
        assert_eq!(loaded.platform, "threads");
        assert_eq!(loaded.cookies.len(), 1);
        assert_eq!(loaded.cookies[0].name, "sessionid");
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("absent.json"));
        assert!(store.load("threads").unwrap().is_none());
    }

    #[test]
    fn test_schema_mismatch_discards_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x_session.json");
        let store = SessionStore::new(&path);

        store.save(&state("x", SESSION_SCHEMA_VERSION + 1)).unwrap();
        assert!(store.load("x").unwrap().is_none());
        assert!(!path.exists(), "stale blob should be deleted");
    }

    #[test]
    fn test_platform_mismatch_discards_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x_session.json");
        let store = SessionStore::new(&path);

        store.save(&state("reddit", SESSION_SCHEMA_VERSION)).unwrap();
        assert!(store.load("x").unwrap().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn test_corrupt_file_discards_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = SessionStore::new(&path);
        assert!(store.load("threads").unwrap().is_none());
        assert!(!path.exists());
    }
}
