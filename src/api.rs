//! HTTP surface: routes, response envelopes and error mapping.

use axum::{
    extract::{Query, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument, Span};
use utoipa::OpenApi;
use uuid::Uuid;

use crate::{
    error::AirQualityError,
    model::{FieldMetadata, FilterParams, QueriedRecord, DATASET_MAX_DATE, DATASET_MIN_DATE, METADATA},
    service::AirQualityService,
};

const SUCCESS: &str = "success";
const FAILURE: &str = "error";
const ROUTE_NOT_FOUND: &str = "Route not found";

pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(title = "Air Quality API", version = "1.0.0"),
    paths(health, get_metadata, insert_data, get_data),
    tags(
        (name = "Health", description = "Server liveness"),
        (name = "Air Quality", description = "Measurement import, queries and field metadata")
    )
)]
pub struct ApiDoc;

pub fn router(service: Arc<AirQualityService>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/air-quality-data", post(insert_data).get(get_data))
        .route("/air-quality-metadata", get(get_metadata))
        .route(OPENAPI_PATH, get(openapi_doc))
        .fallback(not_found)
        .with_state(service)
}

#[derive(Debug, Serialize)]
pub struct Status {
    pub operation_id: String,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: Status,
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct StatusOnly {
    pub status: Status,
}

#[derive(Debug, Serialize)]
pub struct InsertData {
    pub response: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ListData {
    pub list: Vec<QueriedRecord>,
    pub filters: FilterParams,
}

#[derive(Debug, Serialize)]
pub struct MetadataData {
    pub metadata: &'static [FieldMetadata],
    pub min_date: &'static str,
    pub max_date: &'static str,
}

/// Per-request id, carried in the tracing span and echoed to the client.
struct Operation {
    id: String,
    span: Span,
}

impl Operation {
    fn start(route: &'static str) -> Self {
        let id = Uuid::new_v4().to_string();
        let span = info_span!("request", operation_id = %id, route);
        Self { id, span }
    }

    fn ok<T>(&self, data: T) -> Json<Envelope<T>> {
        Json(Envelope {
            status: self.status(SUCCESS),
            data,
        })
    }

    fn status(&self, message: &'static str) -> Status {
        Status {
            operation_id: self.id.clone(),
            message,
        }
    }

    fn fail(&self, error: AirQualityError) -> ApiError {
        error!(error = %error, "request failed");
        let code = if error.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        ApiError {
            operation_id: self.id.clone(),
            code,
            error: error.to_string(),
        }
    }
}

/// Error response: `{status: {operation_id, message: "error"}, error}`.
#[derive(Debug)]
pub struct ApiError {
    operation_id: String,
    code: StatusCode,
    error: String,
}

#[derive(Serialize)]
struct ErrorBody {
    status: Status,
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            status: Status {
                operation_id: self.operation_id,
                message: FAILURE,
            },
            error: self.error,
        };
        (self.code, Json(body)).into_response()
    }
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Server is up")),
)]
async fn health() -> Json<StatusOnly> {
    let op = Operation::start("GET /health");
    let _entered = op.span.enter();
    info!("health");
    Json(StatusOnly {
        status: op.status(SUCCESS),
    })
}

async fn openapi_doc() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn not_found(uri: Uri) -> ApiError {
    let op = Operation::start("fallback");
    let _entered = op.span.enter();
    warn!(%uri, "no route");
    ApiError {
        operation_id: op.id.clone(),
        code: StatusCode::NOT_FOUND,
        error: ROUTE_NOT_FOUND.into(),
    }
}

#[utoipa::path(
    post,
    path = "/air-quality-data",
    tag = "Air Quality",
    responses(
        (status = 200, description = "Records inserted, or already present"),
        (status = 500, description = "Source file unreadable or storage failure"),
    ),
)]
async fn insert_data(
    State(service): State<Arc<AirQualityService>>,
) -> Result<Json<Envelope<InsertData>>, ApiError> {
    let op = Operation::start("POST /air-quality-data");
    let span = op.span.clone();
    async move {
        info!("start");
        let result = service.ingest_source().await.map_err(|e| op.fail(e))?;
        info!(?result, "end");
        Ok(op.ok(InsertData {
            response: result.message(),
        }))
    }
    .instrument(span)
    .await
}

#[utoipa::path(
    get,
    path = "/air-quality-data",
    tag = "Air Quality",
    params(
        ("from_date_time" = String, Query, description = "Inclusive lower bound, ISO 8601"),
        ("to_date_time" = String, Query, description = "Inclusive upper bound, ISO 8601"),
        ("field" = Option<String>, Query, description = "Return only this measurement field"),
    ),
    responses(
        (status = 200, description = "Measurements in range"),
        (status = 400, description = "Missing or invalid filter"),
        (status = 500, description = "Storage failure"),
    ),
)]
async fn get_data(
    State(service): State<Arc<AirQualityService>>,
    Query(params): Query<FilterParams>,
) -> Result<Json<Envelope<ListData>>, ApiError> {
    let op = Operation::start("GET /air-quality-data");
    let span = op.span.clone();
    async move {
        info!(?params, "start");
        let filter = params.validate().map_err(|e| op.fail(e))?;
        let list = service.query(&filter).await.map_err(|e| op.fail(e))?;
        info!(rows = list.len(), "end");
        Ok(op.ok(ListData {
            list,
            filters: params,
        }))
    }
    .instrument(span)
    .await
}

#[utoipa::path(
    get,
    path = "/air-quality-metadata",
    tag = "Air Quality",
    responses((status = 200, description = "Field metadata and dataset date range")),
)]
async fn get_metadata() -> Json<Envelope<MetadataData>> {
    let op = Operation::start("GET /air-quality-metadata");
    let _entered = op.span.enter();
    info!("metadata");
    op.ok(MetadataData {
        metadata: &METADATA,
        min_date: DATASET_MIN_DATE,
        max_date: DATASET_MAX_DATE,
    })
}
