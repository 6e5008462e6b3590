// this_file: src/main.rs
//! Luxmeter CLI - image brightness analysis server

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;
use luxmeter::api::{self, AppState};
use luxmeter::fetch::ImageFetcher;
use luxmeter::{logging, shutdown, AnalysisCache, Analyzer, Settings};

/// Luxmeter - stateless image brightness analysis service
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Set log level (error, warn, info, debug, trace)
    #[arg(short = 'l', long, global = true, default_value = "info")]
    log_level: String,

    /// Enable quiet mode (only errors)
    #[arg(short = 'q', long, global = true, conflicts_with = "log_level")]
    quiet: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP analysis server
    Serve {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Maximum number of cached results
        #[arg(long)]
        cache_size: Option<usize>,

        /// Cache entry TTL in seconds
        #[arg(long)]
        cache_ttl: Option<u64>,

        /// Maximum upload size in bytes
        #[arg(long)]
        max_file_size: Option<usize>,

        /// Maximum image dimension before downscaling
        #[arg(long)]
        max_dimension: Option<u32>,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.quiet {
        "error".to_string()
    } else {
        cli.log_level.clone()
    };
    logging::init_logging(&log_level, cli.quiet, true);

    match cli.command {
        Commands::Serve {
            config,
            host,
            port,
            cache_size,
            cache_ttl,
            max_file_size,
            max_dimension,
        } => {
            let mut settings = Settings::load(config.as_deref())?;
            if let Some(host) = host {
                settings.host = host;
            }
            if let Some(port) = port {
                settings.port = port;
            }
            if let Some(cache_size) = cache_size {
                settings.cache_max_entries = cache_size;
            }
            if let Some(cache_ttl) = cache_ttl {
                settings.cache_ttl_seconds = cache_ttl;
            }
            if let Some(max_file_size) = max_file_size {
                settings.max_file_size = max_file_size;
            }
            if let Some(max_dimension) = max_dimension {
                settings.max_dimension = max_dimension;
            }
            serve(settings).await?;
        }
        Commands::Version => {
            println!("luxmeter version {}", luxmeter::VERSION);
            println!("Image brightness analysis service");
        }
    }

    Ok(())
}

/// Wire up state and run the HTTP server until a shutdown signal arrives.
async fn serve(settings: Settings) -> Result<()> {
    info!(
        "Result cache: {} entries, TTL {}s",
        settings.cache_max_entries, settings.cache_ttl_seconds
    );

    let cache = Arc::new(AnalysisCache::new(
        settings.cache_max_entries,
        settings.cache_ttl(),
    ));
    let fetcher = ImageFetcher::new(settings.fetch_timeout(), settings.max_file_size)?;
    let analyzer = Arc::new(Analyzer::new(
        Arc::clone(&cache),
        fetcher,
        settings.max_dimension,
    ));

    let addr = format!("{}:{}", settings.host, settings.port);
    let state = AppState::new(analyzer, cache, Arc::new(settings));
    let router = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown::shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
