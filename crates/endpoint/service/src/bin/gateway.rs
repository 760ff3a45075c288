use std::{net::SocketAddr, path::PathBuf, time::Duration};

use chaingate::Resolver;
use chaingate_service::{forward::Forwarder, Config};
use clap::Parser;
use poem::listener::TcpListener;
use tracing_subscriber::{fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter};

#[derive(Parser)]
struct Cli {
    /// Bind to the provided socket, overriding the config file
    #[arg(short, long, value_name = "SOCKET")]
    bind: Option<SocketAddr>,

    /// Config file path. Fallback to the user config dir.
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Cli { bind, config } = Cli::parse();

    let filter_layer = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();

    let (path, config) = match config {
        Some(path) => Config::from_path(path)?,
        None => Config::create_or_read_default()?,
    };

    tracing::info!("config loaded from `{}`...", path.display());

    let socket = bind
        .map(|b| b.to_string())
        .unwrap_or_else(|| config.socket.clone());

    let resolver = Resolver::new(
        &config.contract,
        &config.selector,
        config.rpc_endpoints.clone(),
    )
    .with_ttl(Duration::from_secs(config.cache_ttl_secs));

    let forwarder = Forwarder::new().with_timeout(Duration::from_secs(config.upstream_timeout_secs));

    let app = chaingate_service::gateway(resolver, forwarder);

    tracing::info!("gateway loaded, listening on `{}`...", &socket);

    poem::Server::new(TcpListener::bind(socket)).run(app).await?;

    Ok(())
}
