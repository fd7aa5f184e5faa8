use clap::Parser;
use job_scrape::{Pipeline, ScrapeConfig};

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match ScrapeConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                ::log::error!("Failed to load config {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => ScrapeConfig::default(),
    };
    let config = args.apply(config).with_env_overrides();

    ::log::info!("Starting scrape of {}", config.target_url);
    if args.snapshot.is_none() && config.driver_path.is_none() {
        ::log::info!(
            "No driver binary configured, using the WebDriver server at {}",
            config.webdriver_url
        );
    }

    let mut pipeline = Pipeline::new(config);
    if let Some(dir) = &args.snapshot {
        pipeline = pipeline.with_snapshot(dir);
    }
    if args.skip_analysis {
        pipeline = pipeline.skip_analysis();
    }

    match pipeline.run().await {
        Ok(summary) => {
            ::log::info!(
                "Pipeline complete - {} listings scraped, {} after cleaning",
                summary.scraped,
                summary.cleaned
            );
            if let Some(report) = summary.report {
                ::log::info!("Analysis:\n{}", report);
            }
        }
        Err(e) => {
            ::log::error!("Scrape failed: {}", e);
            std::process::exit(1);
        }
    }
}
