//! HTTP server mode for paginated list access

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::error::{Error, Result};
use crate::features::FeatureConfigStore;
use crate::pagination::{PaginationRequest, PaginationResolver};
use crate::response::{ApiError, ApiResponse, ListResponse};
use crate::service::ListService;
use crate::source::{InMemoryListSource, KubeListSource, ListSource};

/// Where listed items come from
#[derive(Debug, Clone)]
pub enum SourceConfig {
    /// Serve items from a JSON file
    Items(PathBuf),
    /// Proxy a Kubernetes-style list endpoint
    Upstream(String),
    /// Serve nothing
    Empty,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Pagination, cursor and flag settings
    pub gateway: GatewayConfig,
    /// Item source
    pub source: SourceConfig,
}

/// App state shared across handlers
#[derive(Debug, Clone)]
pub struct AppState {
    service: ListService,
}

impl AppState {
    /// Wrap a list service
    pub fn new(service: ListService) -> Self {
        Self { service }
    }

    /// Build the service described by a server config
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let source: Arc<dyn ListSource> = match &config.source {
            SourceConfig::Items(path) => Arc::new(InMemoryListSource::from_file(path)?),
            SourceConfig::Upstream(url) => Arc::new(KubeListSource::new(url)?),
            SourceConfig::Empty => Arc::new(InMemoryListSource::new(Vec::new())),
        };

        let store = Arc::new(config.gateway.feature_store());
        let resolver = Arc::new(PaginationResolver::with_policy(
            config.gateway.mode_resolver(),
            store,
        ));
        let service = ListService::new(resolver, source)
            .with_max_scan_items(config.gateway.upstream.max_scan_items);

        Ok(Self::new(service))
    }

    fn store(&self) -> &Arc<FeatureConfigStore> {
        self.service.resolver().store()
    }
}

/// Build the router
pub fn router(state: AppState) -> Router {
    // Allow all origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/flags", get(get_flags))
        .route("/flags/invalidate", post(invalidate_flags))
        .route("/items", get(list_items))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Start the HTTP server
pub async fn serve(config: ServerConfig, port: u16) -> Result<()> {
    let state = AppState::from_config(&config)?;

    // Warm the flag cache
    if let Err(e) = state.store().load().await {
        tracing::warn!(error = %e, "initial feature flag load failed");
    }

    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting HTTP server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to port {port}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")))?;

    Ok(())
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Current flags, reloading if the cache is stale
///
/// A failed reload is only an error when no snapshot was ever published;
/// otherwise the carried-over snapshot is returned with `degraded` set.
async fn get_flags(
    State(state): State<Arc<AppState>>,
) -> std::result::Result<Json<ApiResponse<Value>>, ApiError> {
    let store = state.store();
    let snapshot = match store.load().await {
        Ok(snapshot) => snapshot,
        Err(e) => match store.snapshot().await {
            Some(snapshot) => {
                tracing::warn!(error = %e, "serving carried-over feature flags");
                snapshot
            }
            None => return Err(e.into()),
        },
    };

    Ok(Json(ApiResponse::success(json!({
        "flags": snapshot.flags,
        "origin": snapshot.origin,
        "loadedAt": snapshot.loaded_at,
        "degraded": snapshot.degraded,
        "cacheState": store.cache_state().await,
        "reloadCount": store.reload_count(),
    }))))
}

/// Drop cached flags so the next request reloads them
async fn invalidate_flags(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.store().invalidate().await;
    tracing::info!("feature flag cache invalidated via API");
    Json(ApiResponse::success(json!({ "invalidated": true })))
}

/// One page of items in whichever mode the request resolves to
async fn list_items(
    State(state): State<Arc<AppState>>,
    Query(request): Query<PaginationRequest>,
) -> std::result::Result<Json<ApiResponse<ListResponse>>, ApiError> {
    let response = state.service.list(&request).await?;
    Ok(Json(ApiResponse::success(response)))
}
