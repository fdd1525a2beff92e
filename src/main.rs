use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{debug, error};

use mountain_forecast::pipeline::{self, ScrapeOptions};
use mountain_forecast::source::catalog::load_cached;
use mountain_forecast::{
    CacheLookup, ForecastError, HttpFetcher, MountainForecastConfig, ProcessingPeriod, logging,
};

#[derive(Parser)]
#[command(
    name = "mountain-forecast",
    version,
    about = "Collects mountain weather forecasts into a cumulative CSV dataset",
    long_about = "Crawls mountain-forecast.com for every elevation band of the listed mountains and \
                  merges the forecasts into a monthly dataset keyed by mountain, date, elevation and time"
)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Collect forecasts and merge them into this month's dataset (default)
    Scrape {
        /// Crawl the mountain directory even if a catalog cache exists
        #[arg(long)]
        refresh_catalog: bool,

        /// Only collect this mountain (repeatable)
        #[arg(long = "mountain", value_name = "NAME")]
        mountains: Vec<String>,
    },
    /// Crawl the mountain directory and rewrite the catalog cache
    Crawl,
    /// Print the cached mountain catalog
    Catalog,
}

async fn run(cli: Cli, config: MountainForecastConfig) -> Result<()> {
    let start = Instant::now();

    match cli.command.unwrap_or(Command::Scrape {
        refresh_catalog: false,
        mountains: Vec::new(),
    }) {
        Command::Scrape {
            refresh_catalog,
            mountains,
        } => {
            let fetcher = HttpFetcher::new(&config.source)?;
            let options = ScrapeOptions {
                refresh_catalog,
                mountains,
            };
            let summary =
                pipeline::scrape(&config, &fetcher, ProcessingPeriod::current(), &options).await?;

            println!(
                "Collected {} records from {} pages of {} mountains",
                summary.records, summary.pages, summary.mountains
            );
            println!(
                "{}: {} rows ({} inserted, {} updated, {} previously stored)",
                summary.dataset.display(),
                summary.merge.total,
                summary.merge.inserted,
                summary.merge.updated,
                summary.merge.prior
            );
        }
        Command::Crawl => {
            let fetcher = HttpFetcher::new(&config.source)?;
            let catalog = pipeline::crawl(&config, &fetcher).await?;
            println!(
                "Cached {} mountains ({} elevation pages) at {}",
                catalog.len(),
                catalog.url_count(),
                config.storage.catalog_cache.display()
            );
        }
        Command::Catalog => match load_cached(&config.storage.catalog_cache)? {
            CacheLookup::Hit(catalog) => {
                for (mountain, urls) in catalog.iter() {
                    println!("{mountain}");
                    for url in urls {
                        println!("  {url}");
                    }
                }
            }
            CacheLookup::Absent => bail!(
                "No catalog cache at {}. Run `mountain-forecast crawl` first.",
                config.storage.catalog_cache.display()
            ),
        },
    }

    println!("Finished in {:.1}s", start.elapsed().as_secs_f64());
    Ok(())
}

// Failures before the subscriber is installed return `Err`, later ones are logged
#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = MountainForecastConfig::load_from_path(cli.config.clone())
        .context("Failed to load configuration")?;
    logging::init(&config.logging, cli.verbose)?;
    debug!("Using configuration: {:?}", config);

    match run(cli, config).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            match e.downcast_ref::<ForecastError>() {
                Some(forecast_error) => error!("{}", forecast_error.user_message()),
                None => error!("{e:#}"),
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
