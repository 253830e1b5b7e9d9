//! # drop-content
//!
//! Read-only access to the collection documents that back the storefront.
//!
//! ## Overview
//!
//! Collections live in a hosted content API and are fetched with two GROQ
//! queries that project the same field set:
//!
//! - **All collections**: `*[_type == "collection"] { ... }`, used by the
//!   listing page. Ordering is whatever the API returns.
//! - **One collection by slug**: `*[_type == "collection" && slug.current == $id][0] { ... }`,
//!   used by the detail page. Evaluates to `null` when nothing matches.
//!
//! Image fields hold asset references which [`ImageUrlBuilder`] turns into
//! CDN URLs without any network round trip.
//!
//! ## Example
//!
//! ```rust,no_run
//! use drop_content::{ContentClient, ContentConfig, HttpContentBackend, ImageUrlBuilder};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ContentConfig::new("abc123").with_dataset("production");
//!     let images = ImageUrlBuilder::new(&config.project_id, &config.dataset);
//!     let client = ContentClient::new(HttpContentBackend::new(config)?);
//!
//!     for collection in client.list_collections().await? {
//!         println!("{} -> {}", collection.title, collection.path());
//!         println!("  {}", images.url(&collection.main_image)?);
//!     }
//!
//!     if client.collection_by_slug("ape-yacht").await?.is_none() {
//!         println!("not found");
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod image;
pub mod query;
pub mod types;

pub use client::{
    is_valid_slug, parse_query_response, ContentBackend, ContentClient, HttpContentBackend,
    MockContentBackend,
};
pub use config::ContentConfig;
pub use error::{ContentError, ContentResult};
pub use image::{AssetRef, ImageUrlBuilder};
pub use query::{all_collections_query, collection_by_slug_query, QueryParams};
pub use types::{Collection, Creator, Image, ImageAsset, Slug};
