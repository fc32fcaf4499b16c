//! Location API Server
//!
//! HTTP API exposing IP lookups and CRUD over cached locations.
//! Every response uses a `{"result": ...}` or `{"error": "..."}` envelope.

use crate::application::LocationService;
use crate::domain::entities::IpLocation;
use crate::domain::errors::LocationError;
use crate::infrastructure::ShutdownController;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Body of create and update requests.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationRequest {
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub city: String,
}

/// Optional query of `GET /location`.
#[derive(Debug, Default, Deserialize)]
pub struct LocationQuery {
    pub ip: Option<String>,
}

/// Success envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub result: T,
}

/// Failure envelope.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error returned by handlers, rendered as an error envelope.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// Map a service error: validation failures are 400, everything else 500.
    fn from_service(context: &str, err: LocationError) -> Self {
        let status = if err.is_validation() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            message: format!("{context}: {err}"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

fn ok<T>(result: T) -> ApiResult<T> {
    Ok(Json(ApiResponse { result }))
}

/// Unwrap the `:ip` path parameter, keeping rejections in the error envelope.
fn ip_param(path: Result<Path<String>, PathRejection>) -> Result<String, ApiError> {
    let Path(ip) = path.map_err(|e| ApiError::bad_request(format!("Invalid path: {e}")))?;
    Ok(ip)
}

/// API Server state.
#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<LocationService>,
}

impl ApiState {
    pub fn new(service: Arc<LocationService>) -> Self {
        Self { service }
    }
}

/// Build the CORS layer. An empty origin list allows any origin.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        let values: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!("ignoring invalid CORS origin: {}", o);
                    None
                }
            })
            .collect();
        AllowOrigin::list(values)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Build the application router.
pub fn router(state: ApiState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/location", get(self_location_handler))
        .route(
            "/location/:ip",
            get(get_location_handler)
                .post(create_location_handler)
                .put(update_location_handler)
                .delete(delete_location_handler),
        )
        .route("/locations", get(list_locations_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// HTTP server for the location API.
pub struct ApiServer {
    listen_addr: String,
    state: ApiState,
    cors_origins: Vec<String>,
}

impl ApiServer {
    pub fn new(listen_addr: String, service: Arc<LocationService>, cors_origins: Vec<String>) -> Self {
        Self {
            listen_addr,
            state: ApiState::new(service),
            cors_origins,
        }
    }

    /// Run the API server until `shutdown` fires.
    pub async fn run(&self, shutdown: ShutdownController) -> anyhow::Result<()> {
        let app = router(self.state.clone(), cors_layer(&self.cors_origins));

        let listener = TcpListener::bind(&self.listen_addr).await?;
        tracing::info!("location API listening on {}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.wait().await })
            .await?;

        tracing::info!("location API stopped");
        Ok(())
    }
}

// Handler functions

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn self_location_handler(
    State(state): State<ApiState>,
    Query(query): Query<LocationQuery>,
) -> ApiResult<IpLocation> {
    let ip = match query.ip.filter(|ip| !ip.trim().is_empty()) {
        Some(ip) => ip,
        None => state
            .service
            .external_self_ip()
            .await
            .map_err(|e| ApiError::from_service("Unable to retrieve external IP", e))?,
    };

    let location = state
        .service
        .resolve(&ip)
        .await
        .map_err(|e| ApiError::from_service("Can't get location", e))?;
    ok(location)
}

async fn get_location_handler(
    State(state): State<ApiState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<IpLocation> {
    let ip = ip_param(path)?;
    let location = state
        .service
        .resolve(&ip)
        .await
        .map_err(|e| ApiError::from_service("Can't get location", e))?;
    ok(location)
}

async fn create_location_handler(
    State(state): State<ApiState>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<LocationRequest>, JsonRejection>,
) -> ApiResult<&'static str> {
    let ip = ip_param(path)?;
    let Json(req) = payload.map_err(|_| ApiError::bad_request("Invalid request body"))?;

    state
        .service
        .create(&ip, &req.country, &req.city)
        .await
        .map_err(|e| ApiError::from_service("Can't create location", e))?;
    ok("Location created")
}

async fn update_location_handler(
    State(state): State<ApiState>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<LocationRequest>, JsonRejection>,
) -> ApiResult<&'static str> {
    let ip = ip_param(path)?;
    let Json(req) = payload.map_err(|_| ApiError::bad_request("Invalid request body"))?;

    state
        .service
        .update(&ip, &req.country, &req.city)
        .await
        .map_err(|e| ApiError::from_service("Can't update location", e))?;
    ok("Location updated")
}

async fn delete_location_handler(
    State(state): State<ApiState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<&'static str> {
    let ip = ip_param(path)?;
    state
        .service
        .delete(&ip)
        .await
        .map_err(|e| ApiError::from_service("Can't delete location", e))?;
    ok("Location deleted")
}

async fn list_locations_handler(State(state): State<ApiState>) -> ApiResult<Vec<IpLocation>> {
    let locations = state
        .service
        .list_all()
        .await
        .map_err(|e| ApiError::from_service("Can't fetch all locations", e))?;
    ok(locations)
}
