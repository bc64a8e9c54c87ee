//! app-bootstrap
//!
//! Starts the application server described by a script config.
//!
//! # Startup Overview
//!
//! ```text
//!   app.toml ──▶ config ──▶ credentials ──▶ transport ──▶ middleware
//!                                                            │
//!                                                            ▼
//!   listening ◀── plugin sync ◀── docs ◀── routes ◀── models
//! ```
//!
//! Exit codes: `0` success or nothing to serve, `1` startup failure,
//! `2` missing or invalid TLS credentials.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use app_bootstrap::config::{self, env, ConfigError};
use app_bootstrap::lifecycle::{Bootstrap, BootstrapOutcome, Collaborators, ExitStatus};
use app_bootstrap::observability::{console, logging, metrics};

#[derive(Parser)]
#[command(name = "app-bootstrap")]
#[command(about = "Start the application server described by a script config", long_about = None)]
struct Cli {
    /// Script configuration file.
    #[arg(short, long, default_value = "app.toml")]
    config: PathBuf,

    /// Directory scanned for route manifests.
    #[arg(long)]
    routes_dir: Option<PathBuf>,

    /// Listen port (overrides `PORT`).
    #[arg(short, long)]
    port: Option<u16>,
}

fn fail(err: &dyn Error, status: ExitStatus) -> ExitCode {
    console::print_failure(err);
    status.into()
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match config::load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => return fail(&e, ExitStatus::from(&e)),
    };
    if let Some(dir) = cli.routes_dir {
        config.server.routes_dir = dir;
    }

    logging::init_logging(&config.observability);
    tracing::info!(
        config = %cli.config.display(),
        version = env!("CARGO_PKG_VERSION"),
        "app-bootstrap starting"
    );

    let port = match cli.port.map(Ok).unwrap_or_else(env::resolve_port) {
        Ok(port) => port,
        Err(e) => return fail(&e, ExitStatus::from(&e)),
    };
    let listen_addr = match config.server.listen_addr(port) {
        Ok(addr) => addr,
        Err(source) => {
            let e = ConfigError::InvalidHost {
                host: config.server.host.clone(),
                source,
            };
            return fail(&e, ExitStatus::from(&e));
        }
    };

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

    let collaborators = match Collaborators::from_config(&config) {
        Ok(collaborators) => collaborators,
        Err(e) => return fail(&e, ExitStatus::Failure),
    };

    let mut bootstrap = Bootstrap::new(config, listen_addr, collaborators);
    match bootstrap.run().await {
        Ok(BootstrapOutcome::Listening(server)) => match server.wait().await {
            Ok(()) => {
                tracing::info!("Server stopped");
                ExitStatus::Success.into()
            }
            Err(e) => {
                tracing::error!(error = %e, "Server terminated");
                fail(&e, ExitStatus::Failure)
            }
        },
        Ok(BootstrapOutcome::NothingToServe) => ExitStatus::Success.into(),
        Err(e) => fail(&e, ExitStatus::from(&e)),
    }
}
