pub mod analysis;
pub mod browser;
pub mod clean;
pub mod config;
pub mod crawl;
pub mod error;
pub mod output;
pub mod results;

// Re-export commonly used types for convenience
pub use config::ScrapeConfig;
pub use error::{Result, ScrapeError};
pub use results::{ListingRecord, ResultSequence};

use analysis::Report;
use clean::{CleanedTable, Cleaner};
use std::path::PathBuf;

/// Where the listings come from
#[derive(Debug, Clone)]
pub enum Source {
    /// A live browser session driven over WebDriver
    Live,
    /// Saved pages in a directory
    Snapshot(PathBuf),
}

/// What a pipeline run produced
#[derive(Debug)]
pub struct PipelineSummary {
    pub scraped: usize,
    pub cleaned: usize,
    pub report: Option<Report>,
}

/// Builder for the scrape, clean and analyze stages
pub struct Pipeline {
    config: ScrapeConfig,
    source: Source,
    analyze: bool,
}

impl Pipeline {
    /// Create a new pipeline over a live browser
    pub fn new(config: ScrapeConfig) -> Self {
        Self {
            config,
            source: Source::Live,
            analyze: true,
        }
    }

    /// Replay saved pages instead of driving a browser
    pub fn with_snapshot(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source = Source::Snapshot(dir.into());
        self
    }

    /// Stop after writing the cleaned table
    pub fn skip_analysis(mut self) -> Self {
        self.analyze = false;
        self
    }

    /// Crawl and write the scrape result.
    ///
    /// Nothing is written if the crawl fails.
    pub async fn scrape(&self) -> Result<ResultSequence> {
        let records = match &self.source {
            Source::Live => crawl::run(&self.config).await?,
            Source::Snapshot(dir) => crawl::run_snapshot(dir, &self.config).await?,
        };
        output::write_records(&self.config.output_path, &records)?;
        Ok(records)
    }

    /// Clean the scrape result file into the cleaned CSV
    pub fn clean(&self) -> Result<CleanedTable> {
        let records = output::read_records(&self.config.output_path)?;
        let table = Cleaner::new(&self.config.keywords).clean(records);
        table.write_csv(&self.config.cleaned_path)?;
        Ok(table)
    }

    /// Summarize the cleaned CSV
    pub fn analyze(&self) -> Result<Report> {
        let table = CleanedTable::read_csv(&self.config.cleaned_path)?;
        Ok(Report::from_table(&table))
    }

    /// Run every stage in order
    pub async fn run(self) -> Result<PipelineSummary> {
        let scraped = self.scrape().await?.len();
        let cleaned = self.clean()?.rows.len();
        let report = if self.analyze {
            Some(self.analyze()?)
        } else {
            None
        };

        Ok(PipelineSummary {
            scraped,
            cleaned,
            report,
        })
    }
}
