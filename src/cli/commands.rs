use anyhow::Context as _;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;

use crate::dispatcher::Dispatcher;
use crate::echo::demo_router;
use crate::logging::{init_logging, LogConfig};
use crate::runtime_config::RuntimeConfig;
use crate::server::{AppService, HttpServer};

/// Command-line interface for nsrouter
#[derive(Parser)]
#[command(name = "nsrouter")]
#[command(about = "Namespace HTTP router demo server", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Serve the demo application
    Serve {
        /// Address to listen on
        #[arg(short, long, env = "NSR_ADDR")]
        addr: Option<String>,

        /// Route `/health` to the router instead of answering it directly
        #[arg(long, default_value_t = false)]
        no_health: bool,
    },
    /// Print the demo routing table
    Routes,
}

/// Parse arguments and run the selected command.
///
/// # Errors
///
/// Fails if logging cannot be initialized, the demo router does not build,
/// or the server cannot bind or exits abnormally.
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Serve { addr, no_health } => serve(addr, no_health),
        Commands::Routes => {
            let router = demo_router().context("Failed to build demo router")?;
            router.dump_routes();
            Ok(())
        }
    }
}

fn serve(addr: Option<String>, no_health: bool) -> anyhow::Result<()> {
    let _log_guard = init_logging(&LogConfig::from_env())?;

    let runtime = RuntimeConfig::from_env();
    runtime.apply();
    let addr = addr.unwrap_or(runtime.addr);

    let router = demo_router().context("Failed to build demo router")?;
    info!(
        routes_count = router.route_count(),
        namespaces = router.namespace_count(),
        stack_size = runtime.stack_size,
        "Demo router ready"
    );

    let mut service = AppService::new(Arc::new(Dispatcher::new(router)));
    if no_health {
        service = service.without_health();
    }

    let handle = HttpServer(service)
        .start(addr.as_str())
        .with_context(|| format!("Failed to bind {addr}"))?;
    handle
        .join()
        .map_err(|e| anyhow::anyhow!("Server coroutine panicked: {e:?}"))?;
    Ok(())
}
