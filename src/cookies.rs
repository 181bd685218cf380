//! Browser cookie export for Google Scholar requests.
//!
//! A logged-in browser session keeps Scholar from throttling profile lookups.
//! The export is a JSON array of Playwright-style cookie objects; this crate
//! only reads it and never writes it back.

use crate::error::{ResearchError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Export file name looked up in the home directory
const EXPORT_FILE_NAME: &str = ".labscholar_cookies.json";

/// `~/.labscholar_cookies.json`, or the bare name when there is no home dir
pub fn default_export_path() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(EXPORT_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(EXPORT_FILE_NAME))
}

/// One exported browser cookie
#[derive(Debug, Clone, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    /// Unix seconds; missing or negative for session cookies
    #[serde(default)]
    pub expires: Option<f64>,
}

impl Cookie {
    fn is_expired(&self, now_secs: f64) -> bool {
        matches!(self.expires, Some(at) if at > 0.0 && at <= now_secs)
    }
}

/// Cookies read from a browser export
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    cookies: Vec<Cookie>,
}

impl CookieJar {
    pub fn new(cookies: Vec<Cookie>) -> Self {
        Self { cookies }
    }

    /// Read an export file.
    ///
    /// A missing file gives an empty jar. An unreadable or malformed export
    /// is an error so the caller can tell the user their export is broken.
    pub fn from_export(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No cookie export found");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let cookies: Vec<Cookie> = serde_json::from_str(&content).map_err(|e| {
            ResearchError::Config(format!("Invalid cookie export {}: {}", path.display(), e))
        })?;

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default();
        let total = cookies.len();
        let live: Vec<Cookie> = cookies.into_iter().filter(|c| !c.is_expired(now)).collect();
        if live.len() < total {
            warn!(
                expired = total - live.len(),
                "Ignoring expired cookies, re-export from the browser"
            );
        }

        info!(path = %path.display(), count = live.len(), "Loaded cookie export");
        Ok(Self::new(live))
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// `Cookie` header value for cookies whose domain mentions `domain`
    pub fn header_for(&self, domain: &str) -> String {
        self.cookies
            .iter()
            .filter(|c| c.domain.contains(domain))
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn cookie(name: &str, domain: &str, expires: Option<f64>) -> Cookie {
        Cookie {
            name: name.to_string(),
            value: "v".to_string(),
            domain: domain.to_string(),
            expires,
        }
    }

    #[test]
    fn test_missing_export_is_empty() -> Result<()> {
        let jar = CookieJar::from_export(Path::new("/nonexistent/cookies.json"))?;
        assert!(jar.is_empty());
        Ok(())
    }

    #[test]
    fn test_reads_playwright_export() -> Result<()> {
        let mut temp = NamedTempFile::new()?;
        write!(
            temp,
            r#"[{{"name":"GSP","value":"ID=1","domain":".scholar.google.com","path":"/",
                 "httpOnly":true,"expires":-1}},
                {{"name":"OLD","value":"x","domain":".google.com","expires":1000}}]"#
        )?;

        let jar = CookieJar::from_export(temp.path())?;
        assert_eq!(jar.len(), 1);
        assert_eq!(jar.header_for("google"), "GSP=ID=1");
        Ok(())
    }

    #[test]
    fn test_malformed_export_is_reported() -> Result<()> {
        let mut temp = NamedTempFile::new()?;
        write!(temp, "not json")?;
        assert!(matches!(
            CookieJar::from_export(temp.path()),
            Err(ResearchError::Config(_))
        ));
        Ok(())
    }

    #[test]
    fn test_header_keeps_matching_domains() {
        let jar = CookieJar::new(vec![
            cookie("GSP", ".scholar.google.com", None),
            cookie("other", ".example.com", None),
            cookie("NID", ".google.com", Some(-1.0)),
        ]);
        assert_eq!(jar.header_for("google"), "GSP=v; NID=v");
    }
}
