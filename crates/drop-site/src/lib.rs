//! # drop-site
//!
//! Server-rendered storefront for NFT drops.
//!
//! ## Pages
//!
//! - `GET /` lists every collection as a card linking to its page.
//! - `GET /nft/<slug>` shows one collection with its supply, price and the
//!   mint control. Unknown slugs get a 404 page.
//! - `POST /nft/<slug>/mint` claims one token for the connected wallet and
//!   redirects back to the collection page.
//! - `POST /nft/<slug>/session` signs the wallet in or out.
//!
//! While the supply is loading the collection page refreshes itself every
//! few seconds. Mint progress and outcome show up as toasts that expire on
//! their own.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use drop_chain::DetachedWallet;
//! use drop_content::{ContentClient, ContentConfig, HttpContentBackend, ImageUrlBuilder};
//! use drop_site::{serve, Storefront};
//! use tokio::net::TcpListener;
//! use tokio_util::sync::CancellationToken;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ContentConfig::new("abc123");
//!     let images = ImageUrlBuilder::new(&config.project_id, &config.dataset);
//!     let storefront = Storefront::new(
//!         ContentClient::new(HttpContentBackend::new(config)?),
//!         images,
//!         Arc::new(DetachedWallet),
//!     );
//!
//!     let listener = TcpListener::bind("127.0.0.1:3000").await?;
//!     serve(listener, Arc::new(storefront), CancellationToken::new()).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod render;
pub mod routes;
pub mod server;
pub mod storefront;

pub use config::SiteConfig;
pub use error::{SiteError, SiteResult};
pub use http::{HttpHeader, HttpRequest, HttpResponse};
pub use routes::Route;
pub use server::{serve, MAX_BODY_SIZE, MAX_HEAD_SIZE};
pub use storefront::Storefront;
