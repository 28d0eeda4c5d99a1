//! action-router command line.
//!
//! Loads engine settings, then builds, inspects or exercises the configured
//! modules.
//!
//! ```text
//! action-router --config router.toml warm
//! action-router --config router.toml show /admin
//! action-router --config router.toml route /admin/user.do --param method=save
//! action-router --config router.toml watch
//! ```

use std::path::PathBuf;
use clap::{Parser, Subcommand};
use tokio::sync::watch;

use action_router::action::HandlerRegistry;
use action_router::config::{load_config, ConfigWatcher};
use action_router::http::{SimpleRequest, SimpleResponse};
use action_router::lifecycle::{run_reloader, Engine};
use action_router::observability::{logging, metrics};
use action_router::routing::DispatchOutcome;

#[derive(Parser)]
#[command(name = "action-router")]
#[command(about = "Config-driven action routing and dispatch engine", long_about = None)]
struct Cli {
    /// Engine settings file (TOML).
    #[arg(short, long, default_value = "action-router.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build or load every configured module
    Warm,
    /// Print the configuration of one module
    Show {
        /// Module prefix ("" for the default module)
        #[arg(default_value = "")]
        prefix: String,
    },
    /// Dispatch one request path and print the outcome
    Route {
        path: String,
        /// Request parameter as name=value, repeatable
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
    /// Rebuild modules as their documents change, until Ctrl+C
    Watch,
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    logging::init(&config.observability.log_level);

    tracing::info!(
        settings = %cli.config.display(),
        modules = config.modules.len(),
        cache_dir = %config.cache.dir,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let engine = Engine::from_config(&config, HandlerRegistry::new())?;

    match cli.command {
        Commands::Warm => {
            let failed = engine.warm();
            if failed > 0 {
                return Err(format!("{failed} module(s) failed to load").into());
            }
        }
        Commands::Show { prefix } => {
            let module = engine.catalog.module(&prefix)?;
            print!("{}", module.render());
        }
        Commands::Route { path, params } => {
            let mut request = SimpleRequest::new(path);
            for (name, value) in params {
                request.set_parameter(name, value);
            }
            let mut response = SimpleResponse::new();
            match engine.router.dispatch(&mut request, &mut response) {
                Ok(DispatchOutcome::Forward(forward)) => {
                    println!(
                        "forward {} (module: {}, context-relative: {}, redirect: {})",
                        forward.path(),
                        forward.module().unwrap_or("-"),
                        forward.context_relative(),
                        forward.redirect()
                    );
                }
                Ok(DispatchOutcome::Completed) => {
                    println!("status {}", response.status().unwrap_or(200));
                    if !response.body().is_empty() {
                        println!("{}", response.body());
                    }
                }
                Err(e) => {
                    println!("status {} ({e})", e.status().http_status());
                }
            }
        }
        Commands::Watch => {
            engine.warm();
            let (watcher, changes) = ConfigWatcher::new(config.module_sources());
            let _guard = watcher.run()?;
            let (stop_tx, stop_rx) = watch::channel(false);
            let reloader = tokio::spawn(run_reloader(engine.catalog.clone(), changes, stop_rx));

            tracing::info!("Watching module documents, press Ctrl+C to stop");
            tokio::signal::ctrl_c().await?;
            tracing::info!("Received Ctrl+C, shutting down");
            let _ = stop_tx.send(true);
            let reloads = reloader.await?;
            tracing::info!(reloads, "Shutdown complete");
        }
    }

    Ok(())
}
