/// Libra - self-hosted media aggregation server
use clap::{Parser, Subcommand};
use libra_core::{CatalogStore, Version};
use libra_server::{
    logging, router, AppState, AuthService, ContentCache, Library, LoadOptions, ServerConfig,
};
use libra_sources::{Aggregator, SourceRegistry};
use libra_storage::SqlCatalog;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "libra")]
#[command(about = "Libra media aggregation server", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the config file; relative paths resolve against it
    #[arg(long, global = true, env = "LIBRA_DATA_DIR", default_value = ".")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    #[command(alias = "start")]
    Server {
        /// Override application.port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Apply or revert database migrations
    Migrate {
        #[command(subcommand)]
        direction: Migration,
    },
    /// Print the version
    Version,
}

#[derive(Subcommand)]
enum Migration {
    /// Apply pending migrations
    Up {
        /// Number of migrations; -1 applies all
        #[arg(default_value_t = -1, allow_negative_numbers = true)]
        steps: i64,
    },
    /// Revert applied migrations
    Down {
        /// Number of migrations; -1 reverts all
        #[arg(default_value_t = -1, allow_negative_numbers = true)]
        steps: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let options = LoadOptions {
        config_file: cli.config,
        data_dir: cli.data_dir,
    };

    match cli.command {
        Commands::Server { port } => serve(&options, port).await,
        Commands::Migrate { direction } => migrate(&options, direction).await,
        Commands::Version => {
            println!("libra {}", Version::current());
            Ok(())
        }
    }
}

/// Load, override, validate, then start logging
fn load_config(options: &LoadOptions, port: Option<u16>) -> anyhow::Result<ServerConfig> {
    let mut config = ServerConfig::load(options)?;
    if let Some(port) = port {
        config.application.port = port;
    }
    config.validate()?;
    logging::init(&config.logs);
    Ok(config)
}

async fn serve(options: &LoadOptions, port: Option<u16>) -> anyhow::Result<()> {
    let config = load_config(options, port)?;
    tracing::info!("Starting Libra {}", Version::current());

    // Catalog
    let catalog: Arc<dyn CatalogStore> = Arc::new(SqlCatalog::connect(&config.database).await?);
    catalog.migrate_up(-1).await?;
    tracing::info!(engine = catalog.engine_name(), "Database ready");

    // Sources, in configured priority order
    let mut registry = SourceRegistry::with_builtin(config.source_settings()).await;
    let failures = registry.enable_all(&config.general.enabled_sources).await;
    if !failures.is_empty() && config.logs.all_errors_fatal {
        let reasons: Vec<String> = failures.iter().map(ToString::to_string).collect();
        anyhow::bail!("failed to enable sources: {}", reasons.join("; "));
    }
    tracing::info!(enabled = registry.len(), "Sources enabled");
    let aggregator = Arc::new(Aggregator::new(Arc::new(registry)));

    // Content cache
    let cache = Arc::new(
        ContentCache::new(
            config.storage.location.clone(),
            config.storage.size_limit,
            config.storage.minimum_age_threshold,
        )
        .with_error_warnings(config.logs.error_warnings),
    );
    cache.initialize().await?;
    if let Err(e) = cache.clean_overfilled_storage(catalog.as_ref()).await {
        tracing::warn!("Startup cache sweep failed: {}", e);
    }
    let shutdown = CancellationToken::new();
    let sweeper = Arc::clone(&cache).spawn_sweeper(
        Arc::clone(&catalog),
        config.storage.cleanup_interval,
        shutdown.clone(),
    );
    tracing::info!(root = %cache.root().display(), "Content cache initialized");

    // Auth
    let auth_service = Arc::new(AuthService::from_config(
        &config.auth.jwt,
        Arc::clone(&catalog),
    )?);
    tracing::info!(algorithm = ?auth_service.algorithm(), "Auth service initialized");

    let library = Arc::new(
        Library::new(Arc::clone(&catalog), aggregator, cache).with_limits(
            config.general.max_search_results,
            config.general.max_track_duration,
        ),
    );
    let config = Arc::new(config);
    let app = router(AppState::new(Arc::clone(&config), auth_service, library));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.application.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    shutdown.cancel();
    if let Err(e) = sweeper.await {
        tracing::warn!("Cache sweeper ended abnormally: {}", e);
    }
    catalog.close().await?;
    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
    shutdown.cancel();
}

async fn migrate(options: &LoadOptions, direction: Migration) -> anyhow::Result<()> {
    let config = load_config(options, None)?;
    let catalog = SqlCatalog::connect(&config.database).await?;

    match direction {
        Migration::Up { steps } => catalog.migrate_up(steps).await?,
        Migration::Down { steps } => catalog.migrate_down(steps).await?,
    }

    catalog.close().await?;
    Ok(())
}
