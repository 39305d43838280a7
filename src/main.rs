use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use catalog_reconciler::catalog::{
    fetch_all_albums, sort_by_contributor_then_title, CatalogSource, JellyfinClient,
    DEFAULT_PAGE_SIZE,
};
use catalog_reconciler::config::{self, TOKEN_ENV_VAR};
use catalog_reconciler::server::{run_server, RequestsLoggingLevel, ServerConfig};

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Base URL of the Jellyfin server holding the local catalog.
    /// Can also be specified in config file.
    #[clap(long)]
    pub jellyfin_url: Option<String>,

    /// Jellyfin API token. Falls back to the JELLYFIN_TOKEN environment variable.
    #[clap(long)]
    pub jellyfin_token: Option<String>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 8080)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Timeout in seconds for each catalog page request.
    #[clap(long, default_value_t = 15)]
    pub request_timeout_sec: u64,

    /// Number of albums requested per catalog page.
    #[clap(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    /// Match local albums on the rayon thread pool.
    #[clap(long)]
    pub parallel_matching: bool,
}

impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            jellyfin_url: args.jellyfin_url.clone(),
            jellyfin_token: args
                .jellyfin_token
                .clone()
                .or_else(|| std::env::var(TOKEN_ENV_VAR).ok()),
            port: args.port,
            logging_level: args.logging_level.clone(),
            frontend_dir_path: args.frontend_dir_path.clone(),
            request_timeout_sec: args.request_timeout_sec,
            page_size: args.page_size,
            parallel_matching: args.parallel_matching,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // TOML overrides CLI
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  jellyfin_url: {}", app_config.jellyfin_url);
    info!("  port: {}", app_config.port);
    info!("  page_size: {}", app_config.page_size);
    info!(
        "  thresholds: title > {}, contributor > {}",
        app_config.match_policy.title_threshold, app_config.match_policy.contributor_threshold
    );

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for shutdown signal: {}", err);
            return;
        }
        info!("Shutdown signal received");
        signal_token.cancel();
    });

    let client = JellyfinClient::new(
        app_config.jellyfin_url.clone(),
        app_config.jellyfin_token.clone(),
        app_config.request_timeout_sec,
    )?;

    info!("Fetching local catalog from {}...", app_config.jellyfin_url);
    let mut local_catalog = fetch_all_albums(&client, app_config.page_size, &shutdown)
        .await
        .context("Failed to fetch the local catalog")?;
    sort_by_contributor_then_title(&mut local_catalog);
    info!("Local catalog ready with {} albums", local_catalog.len());

    let server_config = ServerConfig {
        requests_logging_level: app_config.logging_level,
        port: app_config.port,
        frontend_dir_path: app_config.frontend_dir_path,
        page_size: app_config.page_size,
        match_policy: app_config.match_policy,
    };

    let catalog_source: Arc<dyn CatalogSource> = Arc::new(client);
    info!("Ready to serve at port {}!", server_config.port);
    run_server(server_config, local_catalog, Some(catalog_source), shutdown).await
}
