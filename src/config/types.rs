use serde::Deserialize;

/// Main configuration structure for Doc-Harvest
///
/// Every section is optional; missing values fall back to their defaults so
/// a run can be driven entirely from the command line.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seed page locations, crawled in order
    pub seeds: Vec<String>,
    pub crawler: CrawlerConfig,
    pub download: DownloadConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// What to do with a page that has no `<title>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingTitle {
    /// Drop the page and everything under it
    #[default]
    Skip,
    /// Name the page after the file stem of the reference that led to it
    Reference,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of page fetches in flight at once
    #[serde(rename = "max-concurrent-fetches")]
    pub max_concurrent_fetches: u32,

    /// Maximum page nesting below a seed
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Per-request timeout for page fetches (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// File extensions treated as downloadable documents
    #[serde(rename = "document-extensions")]
    pub document_extensions: Vec<String>,

    /// File extensions treated as pages to crawl
    #[serde(rename = "page-extensions")]
    pub page_extensions: Vec<String>,

    #[serde(rename = "missing-title")]
    pub missing_title: MissingTitle,

    /// Abort the whole crawl on the first page fetch failure
    #[serde(rename = "abort-on-fetch-error")]
    pub abort_on_fetch_error: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 8,
            max_depth: 16,
            request_timeout_secs: 30,
            document_extensions: vec!["pdf".to_string()],
            page_extensions: vec!["html".to_string(), "htm".to_string()],
            missing_title: MissingTitle::Skip,
            abort_on_fetch_error: true,
        }
    }
}

/// Download pipeline configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Number of downloads allowed in flight at once
    pub concurrency: u32,

    /// Per-download timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            timeout_secs: 300,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    #[serde(rename = "crawler-version")]
    pub crawler_version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "doc-harvest".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory under which each run's timestamped root is created
    #[serde(rename = "root-dir")]
    pub root_dir: String,

    /// Where the settled manifest is written for inspection
    #[serde(rename = "manifest-path")]
    pub manifest_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root_dir: ".".to_string(),
            manifest_path: "fileManifest.txt".to_string(),
        }
    }
}
