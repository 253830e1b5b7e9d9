use std::sync::Arc;

use drop_chain::{DetachedWallet, JsonRpcClient, RpcConnector, RpcWallet};
use drop_content::{ContentClient, HttpContentBackend, ImageUrlBuilder};
use drop_site::{serve, SiteConfig, Storefront};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = SiteConfig::from_env()?;
    let images = ImageUrlBuilder::new(&config.content.project_id, &config.content.dataset);
    let content = ContentClient::new(HttpContentBackend::new(config.content.clone())?);

    let storefront = match &config.rpc {
        Some(rpc) => {
            info!("Using JSON-RPC node at {}", rpc.url);
            let rpc = Arc::new(JsonRpcClient::new(rpc.clone())?);
            Storefront::new(content, images, Arc::new(RpcWallet::new(rpc.clone())))
                .with_connector(Arc::new(RpcConnector::new(rpc)))
        }
        None => {
            warn!("DROP_RPC_URL not set, minting is disabled");
            Storefront::new(content, images, Arc::new(DetachedWallet))
        }
    }
    .with_brand(config.brand.clone())
    .with_mint_config(config.mint.clone());

    let listener = TcpListener::bind(config.bind_addr).await?;
    let shutdown = CancellationToken::new();

    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutting down");
                signal.cancel();
            }
            Err(e) => error!("Failed to listen for shutdown signal: {}", e),
        }
    });

    serve(listener, Arc::new(storefront), shutdown).await?;
    Ok(())
}
