//! Tessera command-line driver.
//!
//! Composes pages from exported CMS entries on disk and prints them as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use tessera_kernel::store::DirEntryStore;
use tessera_kernel::{Composer, Config, ContentError};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Command,
}

/// Flags that override environment configuration.
#[derive(Args, Debug)]
struct Overrides {
    /// Directory of exported entry files.
    #[arg(long, global = true)]
    content_dir: Option<PathBuf>,

    /// Content type holding configuration entries.
    #[arg(long, global = true)]
    config_type: Option<String>,

    /// Content type holding data entries.
    #[arg(long, global = true)]
    data_type: Option<String>,

    /// Resolver recursion limit.
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    /// Resolver node budget per tree.
    #[arg(long, global = true)]
    max_nodes: Option<usize>,
}

impl Overrides {
    fn apply(self, config: &mut Config) {
        if let Some(dir) = self.content_dir {
            config.content_dir = dir;
        }
        if let Some(config_type) = self.config_type {
            config.config_type = config_type;
        }
        if let Some(data_type) = self.data_type {
            config.data_type = data_type;
        }
        if let Some(max_depth) = self.max_depth {
            config.max_depth = max_depth;
        }
        if let Some(max_nodes) = self.max_nodes {
            config.max_nodes = max_nodes;
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List published pages.
    Pages,
    /// Print a page's render instruction tree.
    Render {
        /// Page slug, exactly as stored.
        #[arg(long)]
        slug: String,
    },
    /// Print every resolved node tree.
    Resolve,
}

#[derive(Serialize)]
struct PageListing<'a> {
    slug: &'a str,
    title: Option<&'a str>,
    template: Option<&'a str>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();

    let mut config = Config::from_env().context("failed to load configuration")?;
    cli.overrides.apply(&mut config);
    info!(content_dir = %config.content_dir.display(), "configuration loaded");

    let store = Arc::new(DirEntryStore::new(&config.content_dir));
    let composer = Composer::from_config(store, &config);

    match cli.command {
        Command::Pages => {
            let pages = composer.pages().await;
            let listing: Vec<PageListing<'_>> = pages
                .iter()
                .filter_map(|record| {
                    Some(PageListing {
                        slug: record.config.slug()?,
                        title: record.config.title(),
                        template: record.config.template(),
                    })
                })
                .collect();
            print_json(&listing)?;
        }
        Command::Render { slug } => {
            print_json(&composer.render_page(&slug).await?)?;
        }
        Command::Resolve => {
            print_json(&composer.resolve_all().await)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).map_err(ContentError::from)?;
    println!("{out}");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,tessera_kernel=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
