use clap::Parser;
use job_scrape::ScrapeConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "job-scrape")]
#[command(about = "Scrapes job listings, cleans them and reports summary statistics")]
#[command(version)]
pub struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Replay saved pages from this directory instead of a live browser
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Maximum number of result pages to visit
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Run the browser headless (true/false)
    #[arg(long)]
    pub headless: Option<bool>,

    /// WebDriver binary to launch (e.g. chromedriver)
    #[arg(long)]
    pub driver_path: Option<PathBuf>,

    /// Scrape result file (JSON)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Stop after writing the cleaned CSV
    #[arg(long)]
    pub skip_analysis: bool,
}

impl Args {
    /// Apply command-line overrides on top of a loaded configuration
    pub fn apply(&self, mut config: ScrapeConfig) -> ScrapeConfig {
        if let Some(max_pages) = self.max_pages {
            config.max_pages = max_pages;
        }
        if let Some(headless) = self.headless {
            config.headless = headless;
        }
        if let Some(driver_path) = &self.driver_path {
            config.driver_path = Some(driver_path.clone());
        }
        if let Some(output) = &self.output {
            config.output_path = output.clone();
        }
        config
    }
}
