//! # SCIM Provisioning Server
//!
//! Serves the Users and Groups provisioning API over the in-memory store.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin scim-server -- --bind 127.0.0.1:3000 --base-url https://scim.example.com
//! ```
//!
//! Every flag can also be set through its `SCIM_*` environment variable.
//! Logging is controlled with `RUST_LOG` and defaults to `info`.

use clap::Parser;
use log::{error, info};
use scim_provisioner::config::{PathPolicy, ServerConfig};
use scim_provisioner::http;
use scim_provisioner::providers::StandardResourceProvider;
use scim_provisioner::storage::InMemoryStorage;
use std::process;

#[derive(Parser, Debug)]
#[command(version, about = "SCIM 2.0 provisioning server", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "SCIM_BIND", default_value = "0.0.0.0:3000")]
    bind: String,

    /// Public scheme and authority used in resource locations
    #[arg(long, env = "SCIM_BASE_URL", default_value = "http://localhost:3000")]
    base_url: String,

    /// Path the SCIM endpoints are mounted under
    #[arg(long, env = "SCIM_BASE_PATH", default_value = "/scim/v2")]
    base_path: String,

    /// Fail PATCH requests with 400 invalidPath instead of skipping unknown paths
    #[arg(long, env = "SCIM_REJECT_INVALID_PATHS")]
    reject_invalid_paths: bool,
}

impl Args {
    fn server_config(&self) -> ServerConfig {
        let path_policy = if self.reject_invalid_paths {
            PathPolicy::Reject
        } else {
            PathPolicy::Ignore
        };

        ServerConfig::default()
            .with_base_url(self.base_url.trim_end_matches('/'))
            .with_base_path(self.base_path.clone())
            .with_path_policy(path_policy)
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.server_config();
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        process::exit(2);
    }

    info!(
        "Mounting SCIM endpoints at {}{} (PATCH paths: {:?})",
        config.base_url, config.base_path, config.path_policy
    );

    let provider = StandardResourceProvider::with_config(InMemoryStorage::new(), config);
    let app = http::app(provider);

    let listener = match tokio::net::TcpListener::bind(&args.bind).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", args.bind, e);
            process::exit(1);
        }
    };
    info!("Server listening on http://{}", args.bind);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        process::exit(1);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install Ctrl+C handler: {}", e);
        return;
    }
    info!("Shutting down");
}
