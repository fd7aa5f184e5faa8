use crate::browser::ElementLocator;
use crate::error::{Result, ScrapeError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Configuration for a scrape run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Listings page to start from
    #[serde(default = "default_target_url")]
    pub target_url: String,

    /// Run the browser without a window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// WebDriver binary to launch (e.g. chromedriver). When unset, an already
    /// running server at `webdriver_url` is used.
    #[serde(default)]
    pub driver_path: Option<PathBuf>,

    /// Port the launched driver binary listens on
    #[serde(default = "default_driver_port")]
    pub driver_port: u16,

    /// URL of an externally managed WebDriver server
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Hard upper bound on the number of result pages visited
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Wait for listing cards on each page
    #[serde(default = "default_wait_timeout_secs")]
    pub wait_timeout_secs: u64,

    /// Wait for the detail panel after clicking a card
    #[serde(default = "default_detail_timeout_secs")]
    pub detail_timeout_secs: u64,

    /// Pause after triggering the next page
    #[serde(default = "default_settle_delay_secs")]
    pub settle_delay_secs: u64,

    /// Interval between presence checks while waiting
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// How long a launched driver binary gets to start accepting sessions
    #[serde(default = "default_driver_startup_secs")]
    pub driver_startup_secs: u64,

    /// Scrape result (JSON)
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// Cleaned result (CSV)
    #[serde(default = "default_cleaned_path")]
    pub cleaned_path: PathBuf,

    /// Keywords flagged by the cleaning stage
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,

    #[serde(default)]
    pub selectors: SelectorConfig,
}

/// Locators for each part of the listings markup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    pub card: ElementLocator,
    pub title: ElementLocator,
    pub company: ElementLocator,
    pub location: ElementLocator,
    pub date_posted: ElementLocator,
    pub description: ElementLocator,
    pub next_page: ElementLocator,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            card: ElementLocator::class("jobs-search-results__list-item"),
            title: ElementLocator::class("job-card-list__title"),
            company: ElementLocator::class("job-card-container__company-name"),
            location: ElementLocator::class("job-card-container__metadata-item"),
            date_posted: ElementLocator::class("job-card-container__metadata-item--date"),
            description: ElementLocator::class("jobs-description__content"),
            next_page: ElementLocator::class("artdeco-pagination__button--next"),
        }
    }
}

fn default_target_url() -> String {
    "https://www.linkedin.com/jobs/search/".to_string()
}

fn default_headless() -> bool {
    true
}

/// ChromeDriver default
fn default_driver_port() -> u16 {
    9515
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_max_pages() -> usize {
    5
}

fn default_wait_timeout_secs() -> u64 {
    10
}

fn default_detail_timeout_secs() -> u64 {
    5
}

fn default_settle_delay_secs() -> u64 {
    2
}

fn default_poll_interval_ms() -> u64 {
    250
}

fn default_driver_startup_secs() -> u64 {
    10
}

fn default_output_path() -> PathBuf {
    PathBuf::from("jobs_data.json")
}

fn default_cleaned_path() -> PathBuf {
    PathBuf::from("cleaned_jobs_data.csv")
}

fn default_keywords() -> Vec<String> {
    vec!["python".to_string(), "ai".to_string(), "data science".to_string()]
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            target_url: default_target_url(),
            headless: default_headless(),
            driver_path: None,
            driver_port: default_driver_port(),
            webdriver_url: default_webdriver_url(),
            max_pages: default_max_pages(),
            wait_timeout_secs: default_wait_timeout_secs(),
            detail_timeout_secs: default_detail_timeout_secs(),
            settle_delay_secs: default_settle_delay_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            driver_startup_secs: default_driver_startup_secs(),
            output_path: default_output_path(),
            cleaned_path: default_cleaned_path(),
            keywords: default_keywords(),
            selectors: SelectorConfig::default(),
        }
    }
}

impl ScrapeConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Apply the `WEBDRIVER_URL` environment override
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.webdriver_url = webdriver_url;
            }
        }
        self
    }

    /// Check values the crawl cannot run without
    pub fn validate(&self) -> Result<()> {
        if self.max_pages == 0 {
            return Err(ScrapeError::Config("max_pages must be at least 1".into()));
        }
        if self.poll_interval_ms == 0 {
            return Err(ScrapeError::Config(
                "poll_interval_ms must be greater than 0".into(),
            ));
        }
        Url::parse(&self.target_url).map_err(|e| {
            ScrapeError::Config(format!("invalid target_url {}: {}", self.target_url, e))
        })?;
        Ok(())
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    pub fn detail_timeout(&self) -> Duration {
        Duration::from_secs(self.detail_timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_delay_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn driver_startup(&self) -> Duration {
        Duration::from_secs(self.driver_startup_secs)
    }
}
