use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use env_logger::{Builder, Target};
use log::LevelFilter;
use rowcast_config::{CatalogPaths, load_catalog, load_tuning_from_env};
use rowcast_core::HttpImageFetcher;

mod driver;
mod script;

use driver::Driver;

#[derive(Parser)]
#[command(name = "rowcast-player", about = "Drive a headless rowcast carousel from a key script")]
struct Cli {
    /// Menu document (defaults to $ROWCAST_MENU_PATH, then built-in test items)
    #[arg(long)]
    menu: Option<PathBuf>,
    /// UI layout settings (defaults to $ROWCAST_SETTINGS_PATH, then built-in layouts)
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Keys to press: L R U D for arrows, O for OK, I for Info
    #[arg(long, default_value = "")]
    keys: String,
    #[arg(long, default_value_t = 1280.0)]
    width: f32,
    #[arg(long, default_value_t = 720.0)]
    height: f32,
    /// How long to wait for outstanding image fetches after each key, in ms
    #[arg(long, default_value_t = 5_000)]
    fetch_wait_ms: u64,
}

fn init_logger() {
    Builder::new()
        .target(Target::Stderr)
        .filter_level(LevelFilter::Warn)
        .filter_module("rowcast_player", LevelFilter::Debug)
        .filter_module("rowcast_core", LevelFilter::Info)
        .filter_module("rowcast_config", LevelFilter::Info)
        .init();
}

fn main() -> anyhow::Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        init_logger();
    } else {
        env_logger::init();
    }

    let cli = Cli::parse();
    let keys = script::parse_keys(&cli.keys)?;

    let (tuning, tuning_source) = load_tuning_from_env()?;
    log::info!("tuning source: {tuning_source:?}");
    let paths = CatalogPaths::from_env().with_overrides(cli.menu, cli.settings);
    let catalog = load_catalog(&paths, &tuning);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;
    let fetcher = Arc::new(
        HttpImageFetcher::with_timeout(tuning.fetch_timeout())
            .context("failed to build image fetcher")?,
    );

    let mut driver = Driver::new(
        &runtime,
        tuning,
        fetcher,
        Duration::from_millis(cli.fetch_wait_ms),
    );
    driver.load(cli.width, cli.height, catalog.content, catalog.layout);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    driver.play(&runtime, &keys, &mut out)?;
    driver.finish();
    Ok(())
}
