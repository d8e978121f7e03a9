pub mod clients;
pub mod config;
pub mod constants;
pub mod parser;
pub mod services;
pub mod table;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clients::TmdbClient;
pub use config::Config;
use services::fetch::FetchOutcome;
use table::Table;
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate()?;

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let fmt_layer = tracing_subscriber::fmt::layer();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    // Pick up TMDB_API_KEY from a local .env if present.
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_help();
        return Ok(());
    }

    match args[1].as_str() {
        "fetch" | "f" => {
            let mut movie_ids = Vec::new();
            for arg in &args[2..] {
                match arg.parse::<u64>() {
                    Ok(id) => movie_ids.push(id),
                    Err(_) => {
                        println!("Invalid movie id: {arg}");
                        println!("Usage: cinetab fetch [movie_id...]");
                        return Ok(());
                    }
                }
            }
            cmd_fetch(&config, &movie_ids).await
        }

        "clean" | "c" => cmd_clean(&config).await,

        "run" | "pipeline" => cmd_run(&config).await,

        "init" | "--init" => {
            Config::create_default_if_missing()?;
            println!("✓ Config file created. Edit config.toml and run again.");
            Ok(())
        }

        "help" | "-h" | "--help" => {
            print_help();
            Ok(())
        }

        _ => {
            println!("Unknown command: {}", args[1]);
            println!();
            print_help();
            Ok(())
        }
    }
}

fn print_help() {
    println!("Cinetab - TMDB Catalog Pipeline");
    println!("Fetches movie records and cleans them into a fixed tabular schema");
    println!();
    println!("USAGE:");
    println!("  cinetab <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("  fetch [id...]     Fetch raw movie records (default ids from config)");
    println!("  clean             Clean a previously fetched raw table");
    println!("  run               Fetch and clean in one pass");
    println!("  init              Create default config file");
    println!("  help              Show this help message");
    println!();
    println!("EXAMPLES:");
    println!("  cinetab fetch                  # Fetch the configured movie list");
    println!("  cinetab fetch 19995 597        # Fetch specific movie ids");
    println!("  cinetab clean                  # Clean data/raw into data/cleaned");
    println!("  cinetab run                    # Full pipeline");
    println!();
    println!("CONFIG:");
    println!("  Edit config.toml for paths, worker count and the default id list.");
    println!("  The API key comes from the TMDB_API_KEY environment variable.");
}

/// Fetches the batch and assembles the raw table. Requires a resolved API
/// credential; without one the run aborts before any network work.
async fn fetch_raw_table(config: &Config, movie_ids: &[u64]) -> anyhow::Result<(Table, FetchOutcome)> {
    let api_key = config.api_key()?;
    let timeout = Duration::from_secs(config.tmdb.request_timeout_seconds);
    let client = TmdbClient::new(api_key, timeout)?;

    let ids = if movie_ids.is_empty() {
        config.fetch.movie_ids.as_slice()
    } else {
        movie_ids
    };

    let outcome = services::fetch_all(Arc::new(client), ids, config.fetch.workers).await;
    let table = Table::from_records(&outcome.records);

    Ok((table, outcome))
}

fn print_fetch_summary(outcome: &FetchOutcome) {
    println!("Successfully fetched data for {} movies.", outcome.records.len());
    println!("Missing data for {} movies.", outcome.failed.len());
    if !outcome.failed.is_empty() {
        println!("Failed movie ids: {:?}", outcome.failed);
    }
}

async fn cmd_fetch(config: &Config, movie_ids: &[u64]) -> anyhow::Result<()> {
    let (table, outcome) = fetch_raw_table(config, movie_ids).await?;

    print_fetch_summary(&outcome);

    if table.is_empty() {
        println!("No movie data was fetched.");
        return Ok(());
    }

    let raw_path = Path::new(&config.data.raw_path);
    table.save_csv(raw_path)?;
    println!("Data saved to {}", raw_path.display());

    Ok(())
}

async fn cmd_clean(config: &Config) -> anyhow::Result<()> {
    let raw_path = Path::new(&config.data.raw_path);
    let raw = Table::load_csv(raw_path)?;

    let (cleaned, stats) = services::clean(raw);

    let cleaned_path = Path::new(&config.data.cleaned_path);
    cleaned.save_csv(cleaned_path)?;

    print_clean_summary(&stats, cleaned_path);

    Ok(())
}

fn print_clean_summary(stats: &services::CleanStats, path: &Path) {
    println!("Cleaned {} raw records down to {}.", stats.input_rows, stats.output_rows);
    println!(
        "Dropped: {} not released, {} missing id/title, {} too sparse.",
        stats.non_released, stats.missing_keys, stats.sparse
    );
    println!("Cleaned data saved to {}", path.display());
}

async fn cmd_run(config: &Config) -> anyhow::Result<()> {
    let (table, outcome) = fetch_raw_table(config, &[]).await?;

    print_fetch_summary(&outcome);

    if table.is_empty() {
        println!("No movie data was fetched. Exiting.");
        return Ok(());
    }

    let raw_path = Path::new(&config.data.raw_path);
    table.save_csv(raw_path)?;
    println!("Data saved to {}", raw_path.display());

    let (cleaned, stats) = services::clean(table);

    let cleaned_path = Path::new(&config.data.cleaned_path);
    cleaned.save_csv(cleaned_path)?;
    print_clean_summary(&stats, cleaned_path);

    Ok(())
}
