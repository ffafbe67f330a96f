use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;
use console::Emoji;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pulpitcast::config::DEFAULT_TTL_MINUTES;
use pulpitcast::{
    AppState, Catalog, FeedFormat, FileCatalog, ReqwestClient, RestCatalog, SiteConfig,
    check_feed, render_feed,
};

// Emoji with fallback for terminals without Unicode support
static MICROPHONE: Emoji<'_, '_> = Emoji("🎙️  ", "");
static HEADPHONES: Emoji<'_, '_> = Emoji("🎧 ", "[i] ");
static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "[~] ");
static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "[+] ");
static FOLDER: Emoji<'_, '_> = Emoji("📁 ", "");

/// Render and serve podcast RSS and Atom feeds
#[derive(Parser, Debug)]
#[command(name = "pulpitcast")]
#[command(about = "Render and serve podcast RSS and Atom feeds")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve feeds over HTTP
    Serve(ServeArgs),

    /// Render the feed of one podcast
    Render(RenderArgs),
}

#[derive(clap::Args, Debug)]
struct SiteArgs {
    /// Public base URL of the podcast site
    #[arg(long, env = "SITE_BASE_URL")]
    site_base_url: String,

    /// Base URL that relative cover art keys are resolved against
    #[arg(long, env = "ASSETS_BASE_URL")]
    assets_base_url: Option<String>,

    /// Minutes feed readers may cache a feed
    #[arg(long, env = "FEED_TTL_MINUTES", default_value_t = DEFAULT_TTL_MINUTES)]
    ttl: u32,
}

#[derive(clap::Args, Debug)]
struct CatalogArgs {
    /// JSON catalog snapshot to read podcasts from
    #[arg(long, env = "CATALOG_FILE", conflicts_with = "catalog_url")]
    catalog_file: Option<PathBuf>,

    /// REST endpoint of the podcast database
    #[arg(long, env = "CATALOG_URL")]
    catalog_url: Option<String>,

    /// API key sent to the REST endpoint
    #[arg(long, env = "CATALOG_API_KEY", hide_env_values = true)]
    catalog_api_key: Option<String>,
}

#[derive(clap::Args, Debug)]
struct ServeArgs {
    #[command(flatten)]
    site: SiteArgs,

    #[command(flatten)]
    catalog: CatalogArgs,

    /// Address to listen on
    #[arg(long, env = "BIND_ADDRESS", default_value = "0.0.0.0:3000")]
    bind: String,
}

#[derive(clap::Args, Debug)]
struct RenderArgs {
    /// Slug of the podcast to render
    slug: String,

    #[command(flatten)]
    site: SiteArgs,

    #[command(flatten)]
    catalog: CatalogArgs,

    /// Feed format: rss or atom
    #[arg(short, long, default_value = "rss")]
    format: FeedFormat,

    /// Write the feed to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Parse the rendered feed back as a self check
    #[arg(long)]
    check: bool,

    /// Quiet mode - suppress the summary
    #[arg(short, long)]
    quiet: bool,
}

fn site_config(args: &SiteArgs) -> Result<SiteConfig> {
    let mut config = SiteConfig::new(&args.site_base_url, args.assets_base_url.as_deref())
        .context("Invalid site configuration")?;
    config.ttl_minutes = args.ttl;
    Ok(config)
}

fn open_catalog(args: &CatalogArgs) -> Result<Arc<dyn Catalog>> {
    if let Some(path) = &args.catalog_file {
        let catalog = FileCatalog::open(path).context("Failed to load catalog snapshot")?;
        info!(path = %path.display(), podcasts = catalog.slugs().len(), "Loaded catalog snapshot");
        return Ok(Arc::new(catalog));
    }

    if let Some(url) = &args.catalog_url {
        let catalog = RestCatalog::new(ReqwestClient::new(), url, args.catalog_api_key.clone())
            .context("Invalid catalog URL")?;
        info!(%url, "Using REST catalog");
        return Ok(Arc::new(catalog));
    }

    bail!("Either --catalog-file or --catalog-url must be given")
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = site_config(&args.site)?;
    let catalog = open_catalog(&args.catalog)?;

    info!(site = %config.site_base_url, "Starting feed server");
    pulpitcast::serve(&args.bind, AppState::new(catalog, config))
        .await
        .with_context(|| format!("Failed to serve on {}", args.bind))
}

async fn run_render(args: RenderArgs) -> Result<()> {
    let config = site_config(&args.site)?;
    let catalog = open_catalog(&args.catalog)?;

    if !args.quiet {
        eprintln!(
            "\n{}{} {}\n",
            MICROPHONE,
            "pulpitcast".bold().magenta(),
            "- Podcast Feed Renderer".dimmed()
        );
    }

    let (podcast, episodes) =
        futures::try_join!(catalog.podcast(&args.slug), catalog.episodes(&args.slug))
            .context("Failed to load podcast from catalog")?;
    let podcast = podcast.with_context(|| format!("Podcast '{}' not found", args.slug))?;

    let xml = render_feed(&podcast, &episodes, &config, args.format, Utc::now())
        .context("Failed to render feed")?;

    let checked = if args.check {
        Some(check_feed(&xml, args.format).context("Rendered feed failed the self check")?)
    } else {
        None
    };

    match &args.output {
        Some(path) => tokio::fs::write(path, &xml)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => std::io::stdout()
            .write_all(xml.as_bytes())
            .context("Failed to write feed to stdout")?,
    }

    if !args.quiet {
        eprintln!(
            "{HEADPHONES}{} • {} episodes as {}",
            podcast.display_title().bold().green(),
            episodes.len().to_string().cyan(),
            args.format.to_string().yellow()
        );

        if let Some(summary) = checked {
            eprintln!(
                "{SEARCH}{} {} items, {} enclosures",
                "Self check passed:".bold().green(),
                summary.item_titles.len().to_string().cyan(),
                summary.enclosure_urls.len().to_string().cyan()
            );
        }

        if let Some(path) = &args.output {
            eprintln!(
                "{SUCCESS}{FOLDER}Output: {}\n",
                path.display().to_string().cyan()
            );
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Serve(args) => run_serve(args).await,
        Command::Render(args) => run_render(args).await,
    }
}
