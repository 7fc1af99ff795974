mod cli;

use vidserve::{catalog, config, server};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&std::path::Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    // CLI flags override the config file
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting vidserve");
    tracing::info!(
        "Server will listen on {}:{}{}",
        config.server.host,
        config.server.port,
        config.media.api_prefix
    );
    tracing::info!("Media root: {:?}", config.media.root);

    let catalog = catalog::VideoCatalog::load(&config.catalog.data_file)
        .map_err(|e| anyhow::anyhow!("Failed to load catalog: {e}"))?;

    server::start_server(config, catalog).await
}

fn validate(config_path: Option<&std::path::Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    println!("Configuration OK");
    println!("  listen:     {}:{}", config.server.host, config.server.port);
    println!("  api prefix: {}", config.media.api_prefix);
    println!("  media root: {}", config.media.root.display());

    match catalog::VideoCatalog::load(&config.catalog.data_file) {
        Ok(catalog) => {
            println!("  catalog:    {} records", catalog.len());
        }
        Err(e) => {
            anyhow::bail!("Catalog data invalid: {e}");
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on the
    // verbose flag.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "vidserve=trace,tower_http=debug".to_string()
        } else {
            "vidserve=debug,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate(path.as_deref())
        }
        Commands::Version => {
            println!("vidserve {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
