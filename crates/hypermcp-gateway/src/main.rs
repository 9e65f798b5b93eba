use anyhow::{Context, Result};
use axum::http::StatusCode;
use clap::Parser;
use hypermcp::hypermcp_core::Network;
use hypermcp::hypermcp_tools::ErrorKind;
use hypermcp::{select_venue_client, HyperMcp, VenueConfig};
use hypermcp_gateway::{build_app, load_env_file, AppState};
use hypermcp_observability::{init_tracing, LogFormat};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use url::Url;

#[derive(Parser)]
#[command(
    name = "hypermcp-gateway",
    version,
    about = "HTTP tool gateway for a trading venue"
)]
struct Args {
    /// Bind address.
    #[arg(long, env = "HYPERMCP_BIND", default_value = "127.0.0.1:8000")]
    bind: String,

    /// Hex private key of the trading account. Without it the stub venue is used.
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// mainnet or testnet.
    #[arg(long, env = "HYPERLIQUID_NETWORK", default_value = "mainnet")]
    network: Network,

    /// Override the venue API endpoint.
    #[arg(long, env = "HYPERLIQUID_BASE_URL")]
    base_url: Option<Url>,

    /// Upper bound on a single venue call, in milliseconds.
    #[arg(long, default_value_t = 10_000)]
    call_timeout_ms: u64,

    /// Exit instead of falling back to the stub venue.
    #[arg(long)]
    require_live: bool,

    /// Answer unknown tool names with 404 instead of 200.
    #[arg(long)]
    unknown_tool_404: bool,

    /// text or json.
    #[arg(long, default_value = "text")]
    log_format: LogFormat,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Must run before clap reads its env fallbacks.
    let dotenv = load_env_file(None);
    let args = Args::parse();

    let filter = if args.debug {
        "hypermcp=debug"
    } else {
        "hypermcp=info"
    };
    init_tracing(args.log_format, filter);
    match dotenv {
        Ok(Some(path)) => info!(path = %path.display(), "loaded environment file"),
        Ok(None) => {}
        Err(err) => warn!(%err, "ignoring unreadable .env file"),
    }

    let timeout = Duration::from_millis(args.call_timeout_ms);
    let config = VenueConfig {
        private_key: args.private_key,
        network: args.network,
        base_url: args.base_url,
        request_timeout: timeout,
        require_live: args.require_live,
    };
    let selection = select_venue_client(&config)
        .inspect_err(|err| error!(kind = ?ErrorKind::ConfigurationError, %err, "refusing to start"))
        .context("venue client configuration")?;

    let service = HyperMcp::new(selection, timeout);
    info!(
        backend = ?service.backend(),
        venue = %service.venue().name,
        network = %service.venue().network,
        "venue client selected"
    );

    let state = Arc::new(AppState {
        service,
        unknown_tool_status: if args.unknown_tool_404 {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::OK
        },
    });

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("bind {}", args.bind))?;
    info!(bind = %args.bind, "hypermcp-gateway listening");

    axum::serve(listener, build_app(state))
        .await
        .context("serve")
}
