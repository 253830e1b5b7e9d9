//! Request handling.
//!
//! [`Storefront`] answers every route. It keeps one mounted drop view at a
//! time: opening another collection tears the previous workflow down so
//! late supply reads for it are discarded. Each view has its own toast
//! board, so notifications never leak onto another collection's page.
//!
//! Every detail page load reads the supply again. The first load of a view
//! runs in the background behind a self-refreshing loading page; later
//! loads run before the page renders.

use std::sync::Arc;

use drop_chain::{Address, ContractConnector, DropContract, WalletSession};
use drop_content::{Collection, ContentBackend, ContentClient, ImageUrlBuilder};
use drop_mint::{
    MintConfig, MintError, MintWorkflow, NotificationKind, Notifier, Toast, ToastBoard,
};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::error::SiteResult;
use crate::http::{HttpRequest, HttpResponse};
use crate::render::{
    render_detail, render_listing, render_not_found, render_server_error, CollectionCard,
    DetailView,
};
use crate::routes::{collection_path, Route};

/// The mounted drop view.
#[derive(Clone)]
struct ActiveDrop {
    slug: String,
    workflow: Arc<MintWorkflow>,
    toasts: Arc<ToastBoard>,
}

/// The storefront: content, wallet and the active mint workflow.
pub struct Storefront<B: ContentBackend> {
    content: ContentClient<B>,
    images: ImageUrlBuilder,
    wallet: Arc<dyn WalletSession>,
    connector: Option<Arc<dyn ContractConnector>>,
    mint_config: MintConfig,
    brand: String,
    active: Mutex<Option<ActiveDrop>>,
}

impl<B: ContentBackend> Storefront<B> {
    /// Creates a storefront without a contract connector; detail pages
    /// then stay in the loading state.
    pub fn new(
        content: ContentClient<B>,
        images: ImageUrlBuilder,
        wallet: Arc<dyn WalletSession>,
    ) -> Self {
        Self {
            content,
            images,
            wallet,
            connector: None,
            mint_config: MintConfig::default(),
            brand: crate::config::DEFAULT_BRAND.to_string(),
            active: Mutex::new(None),
        }
    }

    pub fn with_connector(mut self, connector: Arc<dyn ContractConnector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Sets the mint configuration; toast lifetimes follow it.
    pub fn with_mint_config(mut self, config: MintConfig) -> Self {
        self.mint_config = config;
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    pub fn brand(&self) -> &str {
        &self.brand
    }

    /// Slug of the mounted drop view.
    pub async fn active_slug(&self) -> Option<String> {
        self.active.lock().await.as_ref().map(|d| d.slug.clone())
    }

    /// Workflow of the mounted drop view.
    pub async fn active_workflow(&self) -> Option<Arc<MintWorkflow>> {
        self.active.lock().await.as_ref().map(|d| d.workflow.clone())
    }

    /// Unexpired toasts of the mounted drop view.
    pub async fn active_toasts(&self) -> Vec<Toast> {
        match self.active.lock().await.as_ref() {
            Some(drop) => drop.toasts.active(),
            None => Vec::new(),
        }
    }

    /// Answers one request. Handler errors become a 500 page.
    pub async fn handle(&self, request: &HttpRequest) -> HttpResponse {
        let route = Route::parse(&request.method, &request.path);
        debug!(method = %request.method, path = %request.path, ?route, "request");

        let result = match route {
            Route::Listing => self.listing().await,
            Route::Detail { slug } => self.detail(&slug).await,
            Route::Mint { slug } => self.mint(&slug).await,
            Route::ToggleSession { slug } => self.toggle_session(&slug).await,
            Route::Health => Ok(HttpResponse::new(200)
                .with_header("Content-Type", "text/plain; charset=utf-8")
                .with_body(b"ok".to_vec())),
            Route::MethodNotAllowed { allow } => Ok(HttpResponse::method_not_allowed(allow)),
            Route::NotFound => Ok(self.not_found()),
        };

        match result {
            Ok(response) => response,
            Err(e) => {
                error!(path = %request.path, error = %e, "request failed");
                HttpResponse::server_error(render_server_error(&self.brand))
            }
        }
    }

    fn not_found(&self) -> HttpResponse {
        HttpResponse::not_found(render_not_found(&self.brand))
    }

    fn image_url(&self, image: &drop_content::Image, slug: &str) -> Option<String> {
        match self.images.url(image) {
            Ok(url) => Some(url),
            Err(e) => {
                debug!(slug = %slug, error = %e, "image without usable asset");
                None
            }
        }
    }

    async fn listing(&self) -> SiteResult<HttpResponse> {
        let collections = self.content.list_collections().await?;
        let cards: Vec<CollectionCard> = collections
            .iter()
            .map(|c| CollectionCard {
                href: collection_path(c.slug.as_str()),
                title: c.title.clone(),
                description: c.description.clone(),
                image_alt: c.nft_collection_name.clone(),
                image_url: self.image_url(&c.main_image, c.slug.as_str()),
            })
            .collect();
        Ok(HttpResponse::ok_html(render_listing(&self.brand, &cards)))
    }

    async fn detail(&self, slug: &str) -> SiteResult<HttpResponse> {
        let Some(collection) = self.content.collection_by_slug(slug).await? else {
            debug!(slug = %slug, "collection not found");
            return Ok(self.not_found());
        };

        let (view, mounted) = self.mount(&collection).await;
        let workflow = &view.workflow;
        if !mounted {
            match workflow.reload_supply().await {
                Ok(_) => {}
                Err(MintError::Cancelled) => debug!(slug = %slug, "supply reload cancelled"),
                // logged by the workflow
                Err(e) => debug!(slug = %slug, error = %e, "supply reload ended"),
            }
        }

        let state = workflow.snapshot().await;
        let address = workflow.current_address().await;
        let toasts = view.toasts.active();

        let page = DetailView {
            brand: &self.brand,
            slug: collection.slug.as_str(),
            title: &collection.title,
            collection_name: &collection.nft_collection_name,
            description: &collection.description,
            preview_image_url: self.image_url(&collection.preview_image, slug),
            main_image_url: self.image_url(&collection.main_image, slug),
            address,
            state: &state,
            toasts: &toasts,
            contract_attached: workflow.has_contract().await,
        };
        Ok(HttpResponse::ok_html(render_detail(&page)))
    }

    async fn mint(&self, slug: &str) -> SiteResult<HttpResponse> {
        let Some(view) = self.view_for(slug).await? else {
            return Ok(self.not_found());
        };

        match view.workflow.mint().await {
            Ok(results) => info!(slug = %slug, minted = results.len(), "mint completed"),
            Err(MintError::NotAllowed(reason)) => {
                warn!(slug = %slug, reason = %reason, "mint rejected")
            }
            Err(MintError::AlreadyMinting) => warn!(slug = %slug, "mint already in progress"),
            // logged by the workflow
            Err(e) => debug!(slug = %slug, error = %e, "mint failed"),
        }
        Ok(HttpResponse::redirect(&collection_path(slug)))
    }

    async fn toggle_session(&self, slug: &str) -> SiteResult<HttpResponse> {
        let Some(view) = self.view_for(slug).await? else {
            return Ok(self.not_found());
        };

        if let Err(e) = view.workflow.toggle_session().await {
            view.toasts
                .notify(NotificationKind::Error, &format!("Sign in failed: {}", e));
        }
        Ok(HttpResponse::redirect(&collection_path(slug)))
    }

    /// The view for `slug`, mounting it if another view is active.
    async fn view_for(&self, slug: &str) -> SiteResult<Option<ActiveDrop>> {
        if let Some(active) = self.active.lock().await.as_ref()
            && active.slug == slug
        {
            return Ok(Some(active.clone()));
        }

        match self.content.collection_by_slug(slug).await? {
            Some(collection) => Ok(Some(self.mount(&collection).await.0)),
            None => Ok(None),
        }
    }

    /// Mounts the drop view for `collection`, tearing down any other one.
    ///
    /// Returns the view and whether it was mounted by this call.
    async fn mount(&self, collection: &Collection) -> (ActiveDrop, bool) {
        let slug = collection.slug.as_str();
        let mut active = self.active.lock().await;

        if let Some(current) = active.as_ref()
            && current.slug == slug
        {
            return (current.clone(), false);
        }

        if let Some(previous) = active.take() {
            previous.workflow.teardown();
            info!(slug = %previous.slug, "drop view unmounted");
        }

        let toasts = Arc::new(ToastBoard::new(
            self.mint_config.success_duration,
            self.mint_config.error_duration,
        ));
        let workflow = Arc::new(MintWorkflow::new(
            self.wallet.clone(),
            toasts.clone(),
            self.mint_config.clone(),
        ));

        if let Some(contract) = self.resolve_contract(collection) {
            workflow.attach_contract(contract).await;
            let loader = workflow.clone();
            let task_slug = slug.to_string();
            tokio::spawn(async move {
                match loader.load_supply().await {
                    Ok(_) => {}
                    Err(MintError::Cancelled) => {
                        debug!(slug = %task_slug, "supply load cancelled")
                    }
                    // logged by the workflow
                    Err(e) => debug!(slug = %task_slug, error = %e, "supply load ended"),
                }
            });
        }

        info!(slug = %slug, "drop view mounted");
        let view = ActiveDrop {
            slug: slug.to_string(),
            workflow,
            toasts,
        };
        *active = Some(view.clone());
        (view, true)
    }

    fn resolve_contract(&self, collection: &Collection) -> Option<Arc<dyn DropContract>> {
        let connector = self.connector.as_ref()?;
        let address: Address = match collection.address.parse() {
            Ok(address) => address,
            Err(e) => {
                warn!(slug = %collection.slug, error = %e, "collection has no valid contract address");
                return None;
            }
        };
        match connector.connect(&address) {
            Ok(contract) => Some(contract),
            Err(e) => {
                warn!(slug = %collection.slug, address = %address, error = %e, "contract unavailable");
                None
            }
        }
    }
}
