use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use client_core::{enrich_page, enrich_residents, PageRequest, PlanetSource, PlanetsClient};
use tracing_subscriber::EnvFilter;

mod browse;
mod config;
mod render;

#[derive(Parser, Debug)]
#[command(name = "planets", about = "Browse Star Wars planets and their residents")]
struct Cli {
    /// Base URL of the planets API (overrides config and environment).
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive list/detail browser (default).
    Browse {
        #[arg(long)]
        page: Option<u32>,
    },
    /// Print one page of planets.
    List {
        #[arg(long)]
        page: Option<u32>,
        /// Fetch every planet's residents before printing.
        #[arg(long)]
        with_residents: bool,
        #[arg(long)]
        json: bool,
    },
    /// Print the residents of one planet.
    Residents {
        planet: String,
        #[arg(long)]
        page: Option<u32>,
    },
}

fn page_request(page: Option<u32>) -> PageRequest {
    page.map_or(PageRequest::Default, PageRequest::Number)
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config::LoadedSettings {
        mut settings,
        warning,
    } = config::load_settings(cli.config.as_deref())?;
    if let Some(api_url) = &cli.api_url {
        settings.api_base_url = config::normalize_api_base_url(api_url);
    }
    init_tracing(&settings.log_filter);
    if let Some(err) = warning {
        let reason = format!("{err:#}");
        tracing::warn!(error = %reason, "config file ignored");
    }

    let client = PlanetsClient::new(&settings.api_base_url)?;
    tracing::debug!(api_base_url = %client.base_url(), "starting planets client");

    match cli.command.unwrap_or(Command::Browse { page: None }) {
        Command::Browse { page } => browse::run(client, page_request(page)).await?,
        Command::List {
            page,
            with_residents,
            json,
        } => {
            let page = client.fetch_page(&page_request(page)).await?;
            if with_residents {
                let details = enrich_page(&client, &page).await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&details)?);
                } else {
                    print!("{}", render::enriched_page(&details));
                }
            } else if json {
                println!("{}", serde_json::to_string_pretty(&page)?);
            } else {
                for (i, planet) in page.results.iter().enumerate() {
                    println!("{}", render::planet_card(Some(i + 1), planet));
                }
            }
        }
        Command::Residents { planet, page } => {
            let request = page_request(page);
            let listing = client.fetch_page(&request).await?;
            let found = listing
                .results
                .iter()
                .find(|p| p.name.eq_ignore_ascii_case(&planet))
                .ok_or_else(|| {
                    anyhow!(
                        "planet `{planet}` not found on page {}",
                        request.page_number().unwrap_or(1)
                    )
                })?;
            let residents = enrich_residents(&client, found).await?;
            print!("{}", render::planet_card(None, found));
            for resident in &residents {
                print!("{}", render::resident_card(resident));
            }
        }
    }

    Ok(())
}
