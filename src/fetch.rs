//! Stage one: download the listed pages and persist their raw HTML.
//!
//! Requests go out strictly one at a time, each preceded by a randomized
//! pause and carrying a browser-shaped header set, so the runs stay under
//! the radar of anti-scraping defenses. Every outcome is recorded for the
//! end-of-run summary; a failed page never touches the disk.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::Rng;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, DNT,
    UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};
use reqwest::Client;
use tokio::{fs, time};
use url::Url;

use crate::{info_time, Result, DELAY_RANGE, DOWNLOAD_DIR, PAGE_EXT};

/// The browser the fixed header set mimics.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

/// Network timeout applied to every request. No retries on top of it.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetcher settings, passed in explicitly so tests can point the stage at
/// fixture servers and throwaway directories.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Directory saved pages land in; created on demand.
    pub output_dir: PathBuf,
    /// Inclusive bounds (seconds) for the pre-request delay.
    pub delay_range: (f64, f64),
    /// Per-request network timeout.
    pub timeout: Duration,
    /// User-agent advertised to the server.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            output_dir: PathBuf::from(DOWNLOAD_DIR),
            delay_range: DELAY_RANGE,
            timeout: REQUEST_TIMEOUT,
            user_agent: BROWSER_USER_AGENT.to_owned(),
        }
    }
}

/// What happened to a single URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page body was written to `path`.
    Saved { url: String, path: PathBuf },
    /// The request or the write failed; nothing was written for this URL.
    Failed { url: String, reason: String },
}

impl FetchOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, FetchOutcome::Saved { .. })
    }

    pub fn url(&self) -> &str {
        match self {
            FetchOutcome::Saved { url, .. } | FetchOutcome::Failed { url, .. } => url,
        }
    }
}

/// Reads the URL list file. Entries may be separated by commas, newlines or
/// a mix of both; whitespace is trimmed and empty entries dropped.
pub async fn read_url_list(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).await?;
    Ok(split_url_list(&content))
}

/// Separator logic behind [`read_url_list`]. The list format started out
/// comma-separated, but one-URL-per-line files show up in practice too, so
/// both separators are accepted.
pub fn split_url_list(content: &str) -> Vec<String> {
    content
        .split([',', '\n'])
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Derives the output filename for a URL: the last non-empty path segment,
/// or the host when the path is empty, plus the fixed page extension.
pub fn filename_from_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url)?;
    let stem = match parsed
        .path_segments()
        .and_then(|segments| segments.rev().find(|segment| !segment.is_empty()))
    {
        Some(segment) => segment.to_owned(),
        None => parsed.host_str().unwrap_or_default().to_owned(),
    };
    Ok(format!("{stem}.{PAGE_EXT}"))
}

/// Builds the shared client carrying the browser header set and the fixed
/// request timeout.
///
/// `Accept-Encoding` is deliberately left to reqwest's compression features:
/// setting it by hand turns transparent decoding off, and the saved files
/// must be decoded text.
pub fn build_client(config: &FetchConfig) -> Result<Client> {
    let client = Client::builder()
        .default_headers(browser_headers(&config.user_agent)?)
        .timeout(config.timeout)
        .build()?;
    Ok(client)
}

/// The fixed header table that makes requests look like a regular browser
/// visit.
fn browser_headers(user_agent: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_str(user_agent)?);
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("document"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("navigate"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("none"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-user"),
        HeaderValue::from_static("?1"),
    );
    headers.insert(DNT, HeaderValue::from_static("1"));
    Ok(headers)
}

/// Downloads every URL in list order, strictly one at a time. Each request
/// is preceded by a randomized sleep, the first included. Per-URL failures
/// are recorded and the loop moves on; only an uncreatable output directory
/// aborts the run.
pub async fn fetch_all(
    client: &Client,
    urls: &[String],
    config: &FetchConfig,
) -> Result<Vec<FetchOutcome>> {
    fs::create_dir_all(&config.output_dir).await?;

    let mut outcomes = Vec::with_capacity(urls.len());
    for url in urls {
        let delay = sample_delay(config.delay_range);
        info_time!("Waiting {delay:.2} sec before the request");
        time::sleep(Duration::from_secs_f64(delay)).await;

        let outcome = match fetch_page(client, url, &config.output_dir).await {
            Ok(path) => FetchOutcome::Saved {
                url: url.clone(),
                path,
            },
            Err(e) => {
                let reason = e.to_string();
                info_time!("Failed {url}: {reason}");
                FetchOutcome::Failed {
                    url: url.clone(),
                    reason,
                }
            }
        };
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

/// One GET; any non-2xx status is an error. The file is written only after
/// the whole body has arrived, so a failed page never creates or clobbers
/// its output file.
async fn fetch_page(client: &Client, url: &str, output_dir: &Path) -> Result<PathBuf> {
    info_time!("Requesting: {url}");
    let response = client.get(url).send().await?.error_for_status()?;
    let body = response.text().await?;

    let path = output_dir.join(filename_from_url(url)?);
    fs::write(&path, &body).await?;
    info_time!("Wrote page to: {}", path.display());
    Ok(path)
}

/// Uniform draw from the inclusive delay bounds.
fn sample_delay(range: (f64, f64)) -> f64 {
    rand::thread_rng().gen_range(range.0..=range.1)
}
