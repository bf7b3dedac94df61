//! Localized path repair tool.
//!
//! Loads a site snapshot, eagerly rebuilds materialized paths in
//! ancestor-to-descendant order, and writes the snapshot back. Exits 0
//! on completion and non-zero when the snapshot violates a structural
//! invariant.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sentiero::Site;
use sentiero::config::Config;
use sentiero::snapshot::SiteSnapshot;

#[derive(Debug, Parser)]
#[command(
    name = "sentiero",
    about = "Rebuild localized URL paths for a content tree"
)]
struct Cli {
    /// Site snapshot file (overrides SENTIERO_SITE_FILE).
    #[arg(long)]
    site: Option<PathBuf>,

    /// Rebuild paths for a single locale instead of all configured ones.
    #[arg(long)]
    locale: Option<String>,

    /// Increase log verbosity (-v: debug, -vv: trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::from_env().context("failed to load configuration")?;
    let site_file = cli.site.unwrap_or(config.site_file);

    let snapshot = SiteSnapshot::load(&site_file)?;
    let mut site =
        Site::from_snapshot(snapshot).context("site snapshot violates invariants")?;
    info!(
        nodes = site.tree().len(),
        locales = site.registry().locales().len(),
        "site loaded"
    );

    let written = match &cli.locale {
        Some(locale) => site.rebuild_locale_paths(locale)?,
        None => site.rebuild_all_paths()?,
    };

    site.snapshot().save(&site_file)?;
    info!(entries = written, site = %site_file.display(), "snapshot written");
    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
