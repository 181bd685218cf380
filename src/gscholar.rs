//! Google Scholar author profile provider.
//!
//! Resolves a lab id as a Scholar user id, lists the profile's publications
//! page by page and fills each one from its citation view page.

use crate::cookies::{self, CookieJar};
use crate::error::{OptionExt, ResearchError, Result};
use crate::provider::{LabHandle, RawPublication, ResearchProvider};
use async_trait::async_trait;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::{BTreeMap, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Default Google Scholar URL
pub const DEFAULT_SCHOLAR_URL: &str = "https://scholar.google.com";

/// User agent string for requests
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Publications requested per profile page (Scholar's maximum)
const PROFILE_PAGE_SIZE: usize = 100;

/// Connection options for the live provider
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Proxy URL (e.g., "http://127.0.0.1:7890")
    pub proxy: Option<String>,
    /// Custom base URL for mirror sites
    pub base_url: Option<String>,
    /// Cookie file, defaults to `~/.labscholar_cookies.json`
    pub cookie_path: Option<PathBuf>,
}

/// One row of an author profile's publication table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileEntry {
    pub title: String,
    /// Relative link to the citation view page
    pub citation_link: Option<String>,
    pub year: Option<String>,
}

/// A parsed author profile page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePage {
    pub name: String,
    pub entries: Vec<ProfileEntry>,
}

/// Shared HTTP state for the provider and its lab handles
struct ScholarClient {
    http: reqwest::Client,
    base_url: String,
    cookie_header: String,
}

/// Live provider backed by Google Scholar author profiles
pub struct ScholarProvider {
    client: Arc<ScholarClient>,
}

impl ScholarProvider {
    /// Build a provider with the given connection options.
    ///
    /// # Errors
    ///
    /// Returns a config error if the proxy URL, HTTP client or cookie export
    /// is invalid.
    pub fn new(options: &QueryOptions) -> Result<Self> {
        let base_url = options
            .base_url
            .as_ref()
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_SCHOLAR_URL.to_string());

        let cookie_path = options
            .cookie_path
            .clone()
            .unwrap_or_else(cookies::default_export_path);
        let jar = CookieJar::from_export(&cookie_path)?;
        if jar.is_empty() {
            warn!(
                path = %cookie_path.display(),
                "No cookies loaded, Scholar may rate limit requests"
            );
        }

        Ok(Self {
            client: Arc::new(ScholarClient {
                http: build_http_client(options.proxy.as_deref())?,
                base_url,
                cookie_header: jar.header_for("google"),
            }),
        })
    }
}

#[async_trait]
impl ResearchProvider for ScholarProvider {
    fn name(&self) -> &str {
        "google_scholar"
    }

    async fn resolve(&self, lab_id: &str) -> Result<Option<Box<dyn LabHandle>>> {
        let url = build_profile_url(&self.client.base_url, lab_id, 0)?;
        let Some(html) = self.client.fetch(&url).await? else {
            return Ok(None);
        };

        let Some(page) = parse_profile_page(&html)? else {
            debug!(lab_id, "No author profile on page");
            return Ok(None);
        };

        info!(lab_id, name = %page.name, listed = page.entries.len(), "Resolved author profile");
        let exhausted = page.entries.len() < PROFILE_PAGE_SIZE;

        Ok(Some(Box::new(ScholarLabHandle {
            client: Arc::clone(&self.client),
            user_id: lab_id.to_string(),
            name: page.name,
            next_start: page.entries.len(),
            pending: page.entries.into(),
            exhausted,
        })))
    }
}

/// Lazily walks one author's publications
struct ScholarLabHandle {
    client: Arc<ScholarClient>,
    user_id: String,
    name: String,
    pending: VecDeque<ProfileEntry>,
    next_start: usize,
    exhausted: bool,
}

impl ScholarLabHandle {
    /// Fetch the next profile page into `pending`.
    async fn load_more(&mut self) -> Result<()> {
        let url = build_profile_url(&self.client.base_url, &self.user_id, self.next_start)?;
        let html = self
            .client
            .fetch(&url)
            .await?
            .ok_or_parse("profile page disappeared")?;
        let page = parse_profile_page(&html)?.ok_or_parse("profile page has no author")?;

        debug!(
            user = %self.user_id,
            start = self.next_start,
            count = page.entries.len(),
            "Loaded profile page"
        );
        self.exhausted = page.entries.len() < PROFILE_PAGE_SIZE;
        self.next_start += page.entries.len();
        self.pending.extend(page.entries);
        Ok(())
    }

    /// Fill one entry from its citation view page.
    async fn fill(&self, entry: &ProfileEntry) -> Result<RawPublication> {
        let link = entry.citation_link.as_deref().ok_or_else(|| {
            ResearchError::Fill(format!("no citation link for '{}'", entry.title))
        })?;
        let url = resolve_link(&self.client.base_url, link)?;
        let html = self.client.fetch(&url).await?.ok_or_else(|| {
            ResearchError::Fill(format!("citation page missing for '{}'", entry.title))
        })?;

        let mut raw = parse_citation_page(&html)?;
        if raw.title.is_none() && !entry.title.is_empty() {
            raw.title = Some(entry.title.clone());
        }
        if raw.year.is_none() {
            raw.year = entry.year.clone();
        }
        Ok(raw)
    }
}

#[async_trait]
impl LabHandle for ScholarLabHandle {
    fn display_name(&self) -> Option<&str> {
        Some(self.name.as_str())
    }

    async fn next_candidate(&mut self) -> Option<Result<RawPublication>> {
        if self.pending.is_empty() && !self.exhausted {
            if let Err(e) = self.load_more().await {
                warn!(user = %self.user_id, error = %e, "Failed to load more publications");
                self.exhausted = true;
            }
        }

        let entry = self.pending.pop_front()?;
        Some(self.fill(&entry).await)
    }
}

impl ScholarClient {
    /// GET a Scholar page. `Ok(None)` for 404.
    async fn fetch(&self, url: &Url) -> Result<Option<String>> {
        // Random delay to avoid detection
        let delay = rand::random::<u64>() % 1500 + 500;
        tokio::time::sleep(Duration::from_millis(delay)).await;

        debug!(url = %url, "Fetching page");
        let mut request = self
            .http
            .get(url.as_str())
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header("Accept-Language", "en-US,en;q=0.9");

        if !self.cookie_header.is_empty() {
            request = request.header("Cookie", &self.cookie_header);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ResearchError::RateLimited(60));
        }
        if !status.is_success() {
            return Err(ResearchError::Api {
                code: status.as_u16(),
                message: format!("HTTP error: {}", status),
            });
        }

        let html = response.text().await?;
        if html.contains("Solving the above CAPTCHA") || html.contains("unusual traffic") {
            warn!(url = %url, "CAPTCHA detected");
            return Err(ResearchError::Captcha);
        }
        Ok(Some(html))
    }
}

/// Build HTTP client with optional proxy
fn build_http_client(proxy: Option<&str>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .cookie_store(true);

    if let Some(proxy_url) = proxy {
        let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| {
            ResearchError::Config(format!("Invalid proxy URL '{}': {}", proxy_url, e))
        })?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| ResearchError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// Build an author profile URL for one page of publications
fn build_profile_url(base_url: &str, user_id: &str, start: usize) -> Result<Url> {
    let mut url = Url::parse(&format!("{}/citations", base_url))
        .map_err(|e| ResearchError::Config(format!("Invalid base URL: {}", e)))?;

    url.query_pairs_mut()
        .append_pair("user", user_id)
        // English locale keeps field labels stable for parsing
        .append_pair("hl", "en")
        .append_pair("cstart", &start.to_string())
        .append_pair("pagesize", &PROFILE_PAGE_SIZE.to_string());

    Ok(url)
}

/// Resolve a profile link (usually relative) against the base URL
fn resolve_link(base_url: &str, link: &str) -> Result<Url> {
    let base = Url::parse(base_url)
        .map_err(|e| ResearchError::Config(format!("Invalid base URL: {}", e)))?;
    base.join(link)
        .map_err(|e| ResearchError::Parse(format!("Invalid citation link '{}': {}", link, e)))
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ResearchError::Parse(e.to_string()))
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Parse an author profile page.
///
/// Returns `None` when the page carries no author name, i.e. the id did not
/// resolve to a profile.
pub fn parse_profile_page(html: &str) -> Result<Option<ProfilePage>> {
    let document = Html::parse_document(html);

    let name_selector = selector("#gsc_prf_in")?;
    let row_selector = selector("tr.gsc_a_tr")?;
    let title_selector = selector("a.gsc_a_at")?;
    let year_selector = selector("span.gsc_a_h")?;

    let Some(name) = document
        .select(&name_selector)
        .next()
        .map(element_text)
        .filter(|n| !n.is_empty())
    else {
        return Ok(None);
    };

    let mut entries = Vec::new();
    for row in document.select(&row_selector) {
        let Some(link) = row.select(&title_selector).next() else {
            continue;
        };

        // Newer profile pages keep the real link in data-href
        let citation_link = link
            .value()
            .attr("data-href")
            .or_else(|| link.value().attr("href"))
            .filter(|href| href.contains("citation_for_view"))
            .map(str::to_string);

        let year = row
            .select(&year_selector)
            .next()
            .map(element_text)
            .filter(|y| !y.is_empty());

        entries.push(ProfileEntry {
            title: element_text(link),
            citation_link,
            year,
        });
    }

    Ok(Some(ProfilePage { name, entries }))
}

/// Parse a citation view page into a raw publication.
pub fn parse_citation_page(html: &str) -> Result<RawPublication> {
    let document = Html::parse_document(html);

    let title_selector = selector("#gsc_oci_title")?;
    let field_row_selector = selector("div.gs_scl")?;
    let field_selector = selector("div.gsc_oci_field")?;
    let value_selector = selector("div.gsc_oci_value")?;
    let bar_selector = selector("a.gsc_oci_g_a")?;
    let bar_count_selector = selector("span.gsc_oci_g_al")?;

    let year_regex = Regex::new(r"\b\d{4}\b").map_err(|e| ResearchError::Parse(e.to_string()))?;
    let bar_year_regex =
        Regex::new(r"as_ylo=(\d{4})").map_err(|e| ResearchError::Parse(e.to_string()))?;

    let mut raw = RawPublication {
        title: document
            .select(&title_selector)
            .next()
            .map(element_text)
            .filter(|t| !t.is_empty()),
        ..Default::default()
    };

    for row in document.select(&field_row_selector) {
        let (Some(field), Some(value)) = (
            row.select(&field_selector).next().map(element_text),
            row.select(&value_selector).next().map(element_text),
        ) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }

        match field.to_ascii_lowercase().as_str() {
            "authors" | "inventors" => raw.author = Some(value),
            "publication date" => {
                raw.year = year_regex.find(&value).map(|m| m.as_str().to_string());
            }
            "publisher" => raw.publisher = Some(value),
            _ => {}
        }
    }

    let mut cites_per_year = BTreeMap::new();
    for bar in document.select(&bar_selector) {
        let year = bar
            .value()
            .attr("href")
            .and_then(|href| bar_year_regex.captures(href))
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<i32>().ok());
        let count = bar
            .select(&bar_count_selector)
            .next()
            .and_then(|span| element_text(span).replace(',', "").parse::<u64>().ok());

        if let (Some(year), Some(count)) = (year, count) {
            cites_per_year.insert(year, count);
        }
    }
    raw.cites_per_year = cites_per_year;

    Ok(raw)
}
