use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Json, Multipart, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::error::Error;
use crate::pdf::{extract_pages, PdfDocument};
use crate::selection::PageEntry;
use crate::storage::{Storage, EXTRACTED_SUFFIX};

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Shared, read-only state for request handlers
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<Storage>,
    pub config: Arc<ServerConfig>,
}

/// Request body for `POST /extract-pages`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequest {
    /// Requested pages, in output order
    pub pages: Vec<PageEntry>,
    /// Storage key of the uploaded source
    pub original_filename: String,
}

/// Response for a successful upload or extraction
#[derive(Debug, Serialize, Deserialize)]
pub struct StoredResponse {
    pub message: String,
    /// Storage key, usable with `GET /pdf/{filename}`
    pub filename: String,
    pub page_count: u32,
}

/// Error payload returned for every failed request
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

/// Error wrapper turning library errors into HTTP responses
#[derive(Debug)]
pub struct AppError(pub Error);

impl AppError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            Error::EmptySelection
            | Error::InvalidPageNumber { .. }
            | Error::BadRequest { .. }
            | Error::BadUpload { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Codec(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() || status == StatusCode::UNPROCESSABLE_ENTITY {
            error!(error = %self.0, "request failed");
        } else {
            warn!(error = %self.0, "request rejected");
        }

        let body = ErrorResponse {
            error: self.0.client_message(),
            kind: self.0.kind().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        AppError(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError(Error::BadRequest {
            reason: rejection.body_text(),
        })
    }
}

/// Build the application router with all routes configured
pub fn app(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health_check))
        .route("/upload", post(upload))
        .route("/pdf/{filename}", get(retrieve))
        .route("/extract-pages", post(extract))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the page-picker UI
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Health check endpoint for monitoring
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "pdfpick",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Store an uploaded PDF (multipart field `pdf`)
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut payload = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| Error::BadUpload {
        reason: format!("Failed to read multipart field: {e}"),
    })? {
        if field.name() == Some("pdf") {
            payload = Some(field.bytes().await.map_err(|e| Error::BadUpload {
                reason: format!("Failed to read file data: {e}"),
            })?);
            break;
        }
    }

    let bytes = payload
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| Error::BadUpload {
            reason: "No file uploaded".to_string(),
        })?;

    let decoded = bytes.clone();
    let page_count = tokio::task::spawn_blocking(move || {
        PdfDocument::from_bytes(&decoded).map(|doc| doc.page_count())
    })
    .await
    .map_err(|e| Error::Io(std::io::Error::other(e)))?
    .map_err(|e| Error::BadUpload {
        reason: format!("Not a readable PDF: {}", e.client_message()),
    })?;

    let filename = state.storage.put(&bytes, "").await?;
    info!(filename = %filename, page_count, size = bytes.len(), "stored upload");

    let response = StoredResponse {
        message: "File uploaded successfully".to_string(),
        filename,
        page_count,
    };
    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Return a stored PDF
pub async fn retrieve(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let bytes = state.storage.get(&filename).await?;
    let disposition = format!("inline; filename=\"{filename}\"");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// Build a new PDF from selected pages of a stored upload
pub async fn extract(
    State(state): State<AppState>,
    request: Result<Json<ExtractRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = request?;
    let source = state.storage.get(&request.original_filename).await?;
    let selection = request.pages;

    let (bytes, page_count) = tokio::task::spawn_blocking(move || {
        let doc = PdfDocument::from_bytes(&source)?;
        let mut result = extract_pages(&doc, &selection)?;
        let page_count = selection.len() as u32;
        PdfDocument::to_bytes(&mut result).map(|bytes| (bytes, page_count))
    })
    .await
    .map_err(|e| Error::Io(std::io::Error::other(e)))??;

    let filename = state.storage.put(&bytes, EXTRACTED_SUFFIX).await?;
    info!(
        source = %request.original_filename,
        filename = %filename,
        page_count,
        "extracted pages"
    );

    let response = StoredResponse {
        message: "New PDF created successfully".to_string(),
        filename,
        page_count,
    };
    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Bind the configured address and serve until shutdown
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let storage = Storage::open(&config.storage_dir).await?;
    let bind = config.bind;
    let state = AppState {
        storage: Arc::new(storage),
        config: Arc::new(config),
    };

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(
        "pdfpick listening on http://{} (storage: {})",
        listener.local_addr()?,
        state.storage.root().display()
    );

    axum::serve(listener, app(state)).await?;
    Ok(())
}
