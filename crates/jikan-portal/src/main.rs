//! Jikan portal CLI.
//!
//! Loads a page template, bootstraps it against the Jikan API and prints the
//! resulting element markup. `search` turns stdin lines into search-box input
//! events.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use jikan_portal::{
    Bootstrapper, Document, JikanClient, Location, Page, Pipeline, ReqwestTransport, YearSearch,
};
use shared::{Config, LogConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a page template and print every element after the initial render
    Load {
        /// HTML template declaring the page's element ids
        #[arg(short, long)]
        page: PathBuf,

        /// Page location, e.g. "/anime-details.html?animeId=5114"
        #[arg(short, long, default_value = "/")]
        location: String,
    },

    /// Read search terms from stdin, one input event per line
    Search {
        /// Search manga instead of anime
        #[arg(long)]
        manga: bool,
    },

    /// Render the best-scored anime of one year
    Year {
        /// Four-digit year
        year: String,
    },

    /// Render the best-scored anime of one genre
    Genre {
        /// MAL genre id
        genre_id: u32,
    },

    /// Write the effective configuration to the config path
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    shared::logging::init(LogConfig::from_settings(
        &config.logging,
        "jikan-portal",
        args.verbose,
    ))?;

    info!(config_file = %args.config.display(), "Loaded configuration");

    let client = Arc::new(JikanClient::new(&config).context("Failed to create Jikan client")?);

    match args.command {
        Command::Load { page, location } => load(client, &config, &page, &location).await,
        Command::Search { manga } => search(client, &config, manga).await,
        Command::Year { year } => year_listing(client, &config, &year).await,
        Command::Genre { genre_id } => genre_listing(client, &config, genre_id).await,
        Command::InitConfig { force } => init_config(&config, &args.config, force),
    }
}

async fn boot(
    client: Arc<JikanClient<ReqwestTransport>>,
    config: &Config,
    document: Document,
) -> Page<ReqwestTransport> {
    Bootstrapper::new(client, document, config).boot().await
}

async fn load(
    client: Arc<JikanClient<ReqwestTransport>>,
    config: &Config,
    page: &Path,
    location: &str,
) -> Result<()> {
    let html = std::fs::read_to_string(page)
        .with_context(|| format!("Failed to read page template: {}", page.display()))?;

    let document = Document::from_html(&html, Location::parse(location));
    let page = boot(client, config, document).await;

    info!(activated = page.report.activated(), "Initial render complete");
    for alert in page.document().alerts() {
        eprintln!("alert: {alert}");
    }
    println!("{}", page.document().to_html());

    Ok(())
}

async fn search(
    client: Arc<JikanClient<ReqwestTransport>>,
    config: &Config,
    manga: bool,
) -> Result<()> {
    let ids = &config.containers;
    let (input, container) = if manga {
        (&ids.manga_search_box, &ids.manga_list)
    } else {
        (&ids.search_box, &ids.anime_list)
    };

    let document = Document::new(Location::default(), [input.as_str(), container.as_str()]);
    let mut changes = document.subscribe();
    let mut page = boot(client, config, document.clone()).await;
    println!("{}", document.html(container).unwrap_or_default());

    let controller = if manga {
        page.manga_search.as_mut()
    } else {
        page.anime_search.as_mut()
    };
    let Some(controller) = controller else {
        bail!("Search box is not bound");
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let _ = changes.borrow_and_update();

    loop {
        tokio::select! {
            line = lines.next_line() => match line.context("Failed to read stdin")? {
                Some(line) => controller.on_input(&line),
                None => break,
            },
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                println!("{}", document.html(container).unwrap_or_default());
            }
        }
    }

    // Input closed: let the last search land before exiting
    controller.settle().await;
    if changes.has_changed().unwrap_or(false) {
        println!("{}", document.html(container).unwrap_or_default());
    }

    Ok(())
}

async fn year_listing(
    client: Arc<JikanClient<ReqwestTransport>>,
    config: &Config,
    year: &str,
) -> Result<()> {
    let ids = &config.containers;
    let document = Document::new(Location::default(), [ids.anime_yearly.as_str()]);

    // Submitting the form directly; booting would also render the default year
    let form = YearSearch::new(
        Pipeline::new(client, document.clone()),
        &ids.anime_yearly,
        config.listing.min_year,
        config.listing.max_year,
    );

    if let Err(e) = form.submit(year).await {
        for alert in document.alerts() {
            eprintln!("alert: {alert}");
        }
        bail!(e);
    }

    println!("{}", document.html(&ids.anime_yearly).unwrap_or_default());
    Ok(())
}

async fn genre_listing(
    client: Arc<JikanClient<ReqwestTransport>>,
    config: &Config,
    genre_id: u32,
) -> Result<()> {
    let ids = &config.containers;
    let document = Document::new(
        Location::default(),
        [ids.genre_title.as_str(), ids.genre_results.as_str()],
    );

    let page = boot(client, config, document).await;
    page.load_genre(genre_id).await;

    println!("{}", page.document().to_html());
    Ok(())
}

fn init_config(config: &Config, path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Config file already exists: {} (use --force to overwrite)",
            path.display()
        );
    }

    config.save(path)?;
    println!("Wrote configuration to {}", path.display());
    Ok(())
}
