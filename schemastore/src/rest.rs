//! REST transport over a [`Manager`].
//!
//! Successful responses are wrapped as `{"data": ...}`. Failures are wrapped as
//! `{"error": {"kind", "message", "violations"?}}` with a status derived from the
//! [`StoreError`] variant.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

use schemastore_core::{
    collection::{Metadata, Schema},
    error::StoreError,
    item::{ID_FIELD, Item},
    manager::Manager,
    query::QueryMeta,
    validation::ValidationIssue,
};

type AppState = Arc<Manager>;

/// Builds the router with tracing and CORS layers applied.
pub fn router(manager: Arc<Manager>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .route("/ping", get(ping))
        .route(
            "/api/collections",
            get(list_collections).post(create_collection),
        )
        .route("/api/collections/:collection", get(get_schema))
        .route(
            "/api/collections/:collection/items",
            get(list_items).post(save_item),
        )
        .route("/api/collections/:collection/items/:id", get(get_item))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(manager)
}

/// Serves the REST API on `bind` until Ctrl-C or SIGTERM.
pub async fn serve(manager: Arc<Manager>, bind: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(address = %listener.local_addr()?, "serving REST API");

    axum::serve(listener, router(manager))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("REST API stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    #[cfg(not(unix))]
    ctrl_c.await;

    info!("shutting down");
}

#[derive(Debug, Deserialize)]
struct CreateCollectionRequest {
    name: String,
    #[serde(default)]
    schema: Schema,
    #[serde(default)]
    meta: Metadata,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    kind: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    violations: Option<Vec<ValidationIssue>>,
}

/// A request failure rendered as an error envelope.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn bad_request(message: impl ToString) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                kind: "bad_request",
                message: message.to_string(),
                violations: None,
            },
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        let (status, kind) = match &err {
            StoreError::CollectionNotFound(_) => (StatusCode::NOT_FOUND, "collection_not_found"),
            StoreError::ItemNotFound(..) => (StatusCode::NOT_FOUND, "item_not_found"),
            StoreError::CollectionAlreadyExists(_) => (StatusCode::CONFLICT, "collection_exists"),
            StoreError::ItemAlreadyExists(..) => (StatusCode::CONFLICT, "item_exists"),
            StoreError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_failed"),
            StoreError::InvalidCollectionName(_) => {
                (StatusCode::BAD_REQUEST, "invalid_collection_name")
            }
            StoreError::SchemaCompile(_) => (StatusCode::BAD_REQUEST, "invalid_schema"),
            StoreError::InvalidDocument(_) => (StatusCode::BAD_REQUEST, "invalid_document"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };

        if status.is_server_error() {
            error!(error = %err, "request failed");
        }

        let violations = err
            .validation_errors()
            .map(|errors| errors.issues().to_vec());
        let message = match &err {
            StoreError::Validation(errors) => {
                format!("item violates {} schema rule(s)", errors.len())
            }
            other => other.to_string(),
        };

        Self {
            status,
            body: ErrorBody {
                kind,
                message,
                violations,
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorEnvelope { error: self.body })).into_response()
    }
}

fn data<T: Serialize>(status: StatusCode, value: T) -> Response {
    (status, Json(json!({ "data": value }))).into_response()
}

async fn ping() -> &'static str {
    "pong"
}

async fn create_collection(
    State(manager): State<AppState>,
    payload: Result<Json<CreateCollectionRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;

    manager
        .create_collection(&request.name, request.schema, request.meta)
        .await?;

    Ok(data(StatusCode::CREATED, json!({ "name": request.name })))
}

async fn list_collections(State(manager): State<AppState>) -> Result<Response, ApiError> {
    Ok(data(StatusCode::OK, manager.get_collections().await?))
}

async fn get_schema(
    State(manager): State<AppState>,
    Path(collection): Path<String>,
) -> Result<Response, ApiError> {
    Ok(data(StatusCode::OK, manager.get_schema(&collection).await?))
}

async fn save_item(
    State(manager): State<AppState>,
    Path(collection): Path<String>,
    payload: Result<Json<Item>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(item) = payload?;
    let id = manager.save_item(&collection, item).await?;

    Ok(data(StatusCode::CREATED, json!({ ID_FIELD: id })))
}

async fn list_items(
    State(manager): State<AppState>,
    Path(collection): Path<String>,
    query: Result<Query<QueryMeta>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let (items, info) = manager.get_items(&collection, &query).await?;

    Ok((StatusCode::OK, Json(json!({ "data": items, "meta": info }))).into_response())
}

async fn get_item(
    State(manager): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    Ok(data(StatusCode::OK, manager.get_item(&collection, &id).await?))
}
