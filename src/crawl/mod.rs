pub mod detail;
pub mod extract;
pub mod paginator;
pub mod wait;

#[cfg(test)]
mod tests;

use crate::browser::Browser;
use crate::browser::snapshot::SnapshotBrowser;
use crate::browser::webdriver::WebDriverSession;
use crate::config::ScrapeConfig;
use crate::error::{Result, ScrapeError};
use crate::results::ResultSequence;
use paginator::{CrawlOutcome, Paginator};
use std::path::Path;

/// Run one bounded crawl against a live browser.
///
/// The session is released whether the crawl succeeds or fails.
pub async fn run(config: &ScrapeConfig) -> Result<ResultSequence> {
    config.validate()?;

    let mut session = WebDriverSession::acquire(config).await?;
    let outcome = crawl(&mut session, config).await;
    session.release().await;

    Ok(outcome?.records)
}

/// Run one bounded crawl against saved pages in `dir`
pub async fn run_snapshot<P: AsRef<Path>>(dir: P, config: &ScrapeConfig) -> Result<ResultSequence> {
    config.validate()?;

    let mut browser = SnapshotBrowser::from_dir(dir, &config.selectors)?;
    Ok(crawl(&mut browser, config).await?.records)
}

/// Load the target page and paginate through it
pub async fn crawl<B: Browser>(browser: &mut B, config: &ScrapeConfig) -> Result<CrawlOutcome> {
    ::log::info!("Loading {}", config.target_url);
    browser.goto(&config.target_url).await.map_err(|e| {
        ScrapeError::Environment(format!("failed to load {}: {}", config.target_url, e))
    })?;

    let start_time = tokio::time::Instant::now();
    let outcome = Paginator::new(config).crawl(browser).await;

    ::log::info!(
        "Scraped {} listings from {} pages in {:.2} seconds",
        outcome.records.len(),
        outcome.pages_visited,
        start_time.elapsed().as_secs_f64()
    );
    Ok(outcome)
}
