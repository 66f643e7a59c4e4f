// cobuy/core/api/src/server.rs

use axum::{
    extract::{DefaultBodyLimit, State},
    http::HeaderName,
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use cobuy_recommender::{RecommendationRequest, RecommendationResponse, Recommender};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::extract::ValidatedJson;
use crate::trace::{make_request_span, propagate_trace_id, TRACE_ID_HEADER};

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Largest accepted request body
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Largest accepted `order_items` list
    #[serde(default = "default_max_order_items")]
    pub max_order_items: usize,

    /// Allow any origin, method and header
    #[serde(default = "default_permissive_cors")]
    pub permissive_cors: bool,
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8000))
}

fn default_max_body_bytes() -> usize {
    1024 * 1024 // 1 MiB
}

fn default_max_order_items() -> usize {
    1000
}

fn default_permissive_cors() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            max_body_bytes: default_max_body_bytes(),
            max_order_items: default_max_order_items(),
            permissive_cors: default_permissive_cors(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_body_bytes == 0 {
            return Err("server.max_body_bytes must be at least 1".to_string());
        }
        if self.max_order_items == 0 {
            return Err("server.max_order_items must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Server state for Axum handlers
#[derive(Clone)]
pub struct AppState {
    recommender: Recommender,
    max_order_items: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Recommendation REST API server
pub struct RecommendServer {
    config: ServerConfig,
    recommender: Recommender,
}

impl RecommendServer {
    pub fn new(config: ServerConfig, recommender: Recommender) -> Self {
        Self {
            config,
            recommender,
        }
    }

    /// Create the Axum router with all API endpoints
    pub fn router(&self) -> Router {
        let state = AppState {
            recommender: self.recommender,
            max_order_items: self.config.max_order_items,
        };

        let cors = if self.config.permissive_cors {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers([HeaderName::from_static(TRACE_ID_HEADER)])
        } else {
            CorsLayer::new()
        };

        Router::new()
            .route("/recommend", post(recommend))
            .route("/health", get(health_check))
            .route("/", get(root))
            .layer(
                ServiceBuilder::new()
                    .layer(middleware::from_fn(propagate_trace_id))
                    .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
                    .layer(cors)
                    .layer(DefaultBodyLimit::max(self.config.max_body_bytes)),
            )
            .with_state(state)
    }

    /// Serve until `shutdown` resolves
    pub async fn start<F>(&self, addr: SocketAddr, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();

        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Recommendation API listening on http://{}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Recommendation API stopped");
        Ok(())
    }
}

/// GET /
async fn root() -> &'static str {
    "Cobuy recommender - POST /recommend with {\"user_id\": 1, \"order_items\": [{\"user_id\": 1, \"product_id\": 100, \"quantity\": 2}]}"
}

/// GET /health
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// POST /recommend
async fn recommend(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RecommendationRequest>,
) -> Result<Json<RecommendationResponse>, ApiError> {
    let count = request.order_items.len();
    if count > state.max_order_items {
        return Err(ApiError::TooManyItems {
            count,
            max: state.max_order_items,
        });
    }

    debug!(user = request.user_id, items = count, "Recommendation requested");

    let recommender = state.recommender;
    let response = tokio::task::spawn_blocking(move || recommender.recommend(&request)).await??;

    info!(
        recommended = response.recommended_product_ids.len(),
        "Recommendation served"
    );

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.listen_addr.port(), 8000);
        assert_eq!(config.max_order_items, 1000);
        assert!(config.permissive_cors);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_server_config_validation() {
        let config = ServerConfig {
            max_order_items: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ServerConfig {
            max_body_bytes: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: ServerConfig = serde_json::from_str(r#"{"max_order_items": 5}"#).unwrap();
        assert_eq!(config.max_order_items, 5);
        assert_eq!(config.max_body_bytes, 1024 * 1024);
    }
}
