use crate::api::{AdminApi, ApiFetcher, HttpApi};
use crate::auth::{run_loader, AuthStore, LoaderOutcome};
use crate::clients::{AdminClients, ClientContext};
use crate::config::AdminConfig;
use crate::error::AdminError;
use crate::notify::Notifier;
use list_sync::{
    ControllerOptions, ListController, ListResource, ParamActor, ParamStore, Params, QueryCache,
    QueryClient,
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// The runtime orchestrator of the dashboard.
///
/// `DashboardSystem` is responsible for:
/// - **Lifecycle Management**: starting and stopping the parameter store and
///   the query cache actors
/// - **Dependency Wiring**: handing the same cache, transport and notifier to
///   every resource client and every list screen
/// - **Session Gating**: running the route loader before a page is entered
///
/// # Example
///
/// ```ignore
/// let system = DashboardSystem::new(AdminConfig::load()?)?;
///
/// if system.enter("/book?categories=c1").await? == LoaderOutcome::Proceed {
///     let screen = system.list_screen::<Book>();
///     let state = screen.wait_until_settled().await?;
///     drop(screen);
/// }
///
/// system.shutdown().await?;
/// ```
pub struct DashboardSystem {
    /// Typed clients for reads and mutations
    pub clients: AdminClients,

    /// Session state shared with the route loaders
    pub auth: AuthStore,

    /// The query string of the current page
    pub params: ParamStore,

    /// Handle to the shared query cache
    pub cache: QueryClient,

    pub notifier: Notifier,

    api: Arc<dyn AdminApi>,
    config: AdminConfig,

    /// Task handles of the running actors (used for graceful shutdown)
    handles: Vec<JoinHandle<()>>,
}

impl DashboardSystem {
    /// Builds the HTTP transport from `config` and starts the system.
    pub fn new(config: AdminConfig) -> Result<Self, AdminError> {
        let api = HttpApi::new(
            config.base_url()?,
            config.api_token.clone(),
            config.request_timeout(),
        )?;
        Ok(Self::with_api(Arc::new(api), config))
    }

    /// Starts the system over any transport.
    pub fn with_api(api: Arc<dyn AdminApi>, config: AdminConfig) -> Self {
        // 1. Create actors
        let (cache_actor, cache) = QueryCache::new(
            ApiFetcher::new(api.clone()),
            config.cache_buffer,
            config.request_timeout(),
        );
        let (param_actor, params) = ParamActor::new(Params::default(), config.params_buffer);

        // 2. Start them
        let cache_handle = tokio::spawn(cache_actor.run());
        let param_handle = tokio::spawn(param_actor.run());

        // 3. Wire the clients
        let notifier = Notifier::default();
        let ctx = ClientContext::new(api.clone(), cache.clone(), notifier.clone());
        let clients = AdminClients::new(ctx, config.max_cover_bytes);

        info!(api_url = %config.api_url, "Dashboard started");
        Self {
            clients,
            auth: AuthStore::new(),
            params,
            cache,
            notifier,
            api,
            config,
            handles: vec![cache_handle, param_handle],
        }
    }

    pub fn api(&self) -> &dyn AdminApi {
        self.api.as_ref()
    }

    pub fn config(&self) -> &AdminConfig {
        &self.config
    }

    /// Opens the list screen of `R` on the current query string.
    pub fn list_screen<R: ListResource>(&self) -> ListController<R> {
        let options = ControllerOptions::for_resource::<R>()
            .with_limit(self.config.list_limit)
            .with_debounce(self.config.debounce());
        ListController::spawn(self.params.clone(), self.cache.clone(), options)
    }

    /// Navigates to `path` (`/book?page=2`).
    ///
    /// The route loader runs first; the query string is only applied when it
    /// lets the navigation through.
    pub async fn enter(&self, path: &str) -> Result<LoaderOutcome, AdminError> {
        let outcome = run_loader(path, self.api(), &self.auth).await;
        if outcome == LoaderOutcome::Proceed {
            let query = path.split_once('?').map(|(_, qs)| qs).unwrap_or_default();
            self.params.navigate(query).await?;
        }
        info!(path, ?outcome, "Route entered");
        Ok(outcome)
    }

    /// Gracefully shuts down the system.
    ///
    /// Dropping the handles closes the actor mailboxes; each actor then
    /// leaves its loop. List screens hold handles too, so drop them first.
    pub async fn shutdown(self) -> Result<(), AdminError> {
        info!("Shutting down dashboard...");

        drop(self.clients);
        drop(self.params);
        drop(self.cache);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(AdminError::System(format!("Actor task failed: {e}")));
            }
        }

        info!("Dashboard shutdown complete.");
        Ok(())
    }
}
