use anyhow::Context;
use clap::Parser;
use ledger_core::{constants::PEER_TIMEOUT_MS, Node, NodeConfig};
use ledger_node::{constants::DEFAULT_LISTEN, router, sync::resolve_periodically, AppState, HttpTransport};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tracing::{info, warn, Level};

#[derive(Parser, Debug)]
struct Args {
    /// Address to listen on, e.g. 127.0.0.1:5500
    #[arg(long, default_value = DEFAULT_LISTEN)]
    listen: String,

    /// Leading hex zeros required of every proof digest
    #[arg(long, default_value_t = 4)]
    difficulty: usize,

    /// Per-peer fetch timeout during conflict resolution
    #[arg(long, default_value_t = PEER_TIMEOUT_MS)]
    peer_timeout_ms: u64,

    /// Peer to register at startup (repeatable), e.g. http://127.0.0.1:5501
    #[arg(long = "peer")]
    peers: Vec<String>,

    /// Resolve conflicts in the background every N seconds (0 disables)
    #[arg(long, default_value_t = 0)]
    resolve_interval_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = NodeConfig::default()
        .with_difficulty(args.difficulty)
        .with_peer_timeout(Duration::from_millis(args.peer_timeout_ms));
    let node = Arc::new(Node::new(config));
    for peer in &args.peers {
        node.register_node(peer)
            .with_context(|| format!("registering bootstrap peer {peer}"))?;
    }

    let transport = HttpTransport::new();
    if args.resolve_interval_secs > 0 {
        tokio::spawn(resolve_periodically(
            Arc::clone(&node),
            transport.clone(),
            Duration::from_secs(args.resolve_interval_secs),
        ));
    }

    let app = router(AppState::new(Arc::clone(&node), transport));
    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("invalid listen address {}", args.listen))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        difficulty = node.config().difficulty.zeros(),
        peers = node.peers().len(),
        "ledger-node listening on http://{addr}"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(node))
        .await?;
    Ok(())
}

async fn shutdown_signal(node: Arc<Node>) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for ctrl-c, running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutting down, cancelling any running proof search");
    node.shutdown();
}
