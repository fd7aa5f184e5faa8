use thiserror::Error;

/// Errors that can escape a scrape run.
///
/// Only [`ScrapeError::Environment`] is produced by the crawl itself; the other
/// variants come from configuration and the persistence/cleaning stages.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The driver could not be launched or the target page could not be loaded
    #[error("environment error: {0}")]
    Environment(String),

    /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors reported by a [`crate::browser::Browser`] backend.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// A WebDriver command failed
    #[error("webdriver command failed: {0}")]
    Command(#[from] fantoccini::error::CmdError),

    /// The backend cannot evaluate this kind of locator
    #[error("unsupported locator: {0}")]
    Unsupported(String),

    /// The element no longer belongs to the rendered page
    #[error("element detached from page: {0}")]
    Detached(String),

    /// The page could not be loaded
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// The session has already been released
    #[error("browser session already released")]
    Released,
}

pub type Result<T, E = ScrapeError> = std::result::Result<T, E>;
