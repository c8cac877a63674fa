//! HTTP server for lesion classification and hospital lookup.

use crate::config::ServerConfig;
use crate::service::{
    ClassifyResponse, HospitalQuery, HospitalsResponse, ServeError, SharedPredictor,
    build_predictor, describe_search, lookup_hospitals,
};
use crate::storage::{UploadStore, sanitize_file_name};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{
        DefaultBodyLimit, Multipart, Query, State, multipart::MultipartRejection,
        rejection::QueryRejection,
    },
    http::StatusCode,
    routing::{get, post},
};
use dermascan::geo::{HospitalRankingService, NominatimClient, PlaceSearch};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Application state shared across handlers
pub struct AppState<S> {
    pub predictor: SharedPredictor,
    pub hospitals: HospitalRankingService<S>,
    pub uploads: Option<UploadStore>,
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    model_loaded: bool,
}

/// A file received in the `file` multipart field
struct Upload {
    file_name: Option<String>,
    bytes: Bytes,
}

/// Run the HTTP server
pub async fn run_server(
    config: ServerConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let predictor = build_predictor(&config.classifier)?;
    if config.eager_load {
        info!("Loading classifier before accepting requests...");
        let warm = predictor.clone();
        tokio::task::spawn_blocking(move || warm.warm_up()).await??;
    } else {
        info!(
            model = %config.classifier.model_path.display(),
            "Classifier will load on first request"
        );
    }

    let client = NominatimClient::new(&config.search)?;
    info!("Hospital search provider: {}", describe_search(&config.search));
    let hospitals = HospitalRankingService::new(client, &config.search);

    let uploads = match &config.upload_dir {
        Some(dir) => {
            let store = UploadStore::open(dir).await?;
            info!(dir = %store.root().display(), "Storing uploads");
            Some(store)
        }
        None => None,
    };

    let state = Arc::new(AppState {
        predictor,
        hospitals,
        uploads,
    });
    let app = build_router(state, config.max_upload_bytes);

    // Parse address
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| format!("Invalid address: {}", e))?;

    info!("Server listening on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /health                   - Health check");
    info!("  POST /classify                 - Lesion classification");
    info!("  POST /api/v1/classify          - Lesion classification (versioned API)");
    info!("  GET  /nearby_hospitals         - Nearby hospital lookup");
    info!("  GET  /api/v1/nearby_hospitals  - Nearby hospital lookup (versioned API)");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Build the application router
pub fn build_router<S: PlaceSearch + 'static>(
    state: Arc<AppState<S>>,
    max_upload_bytes: usize,
) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler::<S>))
        .route("/classify", post(classify_handler::<S>))
        .route("/api/v1/classify", post(classify_handler::<S>))
        .route("/nearby_hospitals", get(hospitals_handler::<S>))
        .route("/api/v1/nearby_hospitals", get(hospitals_handler::<S>))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_handler<S: PlaceSearch + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model_loaded: state.predictor.is_ready(),
    })
}

/// Lesion classification endpoint
async fn classify_handler<S: PlaceSearch + 'static>(
    State(state): State<Arc<AppState<S>>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> (StatusCode, Json<ClassifyResponse>) {
    let request_id = uuid::Uuid::new_v4().to_string();
    let start = Instant::now();

    let result = match multipart {
        Ok(multipart) => classify_upload(&state, multipart, &request_id).await,
        Err(rejection) => Err(ServeError::BadRequest(rejection.body_text())),
    };

    match result {
        Ok(response) => {
            info!(
                request_id = %request_id,
                total_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Classify request completed"
            );
            (StatusCode::OK, Json(response))
        }
        Err(e) => {
            let status = e.status();
            if status.is_server_error() {
                error!(request_id = %request_id, error = %e, "Classification failed");
            } else {
                warn!(request_id = %request_id, error = %e, "Classify request rejected");
            }
            (status, Json(ClassifyResponse::error(e.to_string())))
        }
    }
}

async fn classify_upload<S: PlaceSearch>(
    state: &AppState<S>,
    mut multipart: Multipart,
    request_id: &str,
) -> Result<ClassifyResponse, ServeError> {
    let upload = read_upload(&mut multipart).await?;
    let file_name = sanitize_file_name(upload.file_name.as_deref());
    info!(
        request_id = %request_id,
        file = %file_name,
        bytes = upload.bytes.len(),
        "Processing classify request"
    );

    if let Some(store) = &state.uploads {
        store
            .save(&file_name, &upload.bytes)
            .await
            .map_err(|e| ServeError::Storage(e.to_string()))?;
    }

    // Decoding and inference are CPU bound
    let predictor = state.predictor.clone();
    let bytes = upload.bytes;
    let classify_start = Instant::now();
    let result = tokio::task::spawn_blocking(move || predictor.predict(&bytes))
        .await
        .map_err(|e| ServeError::Internal(e.to_string()))?
        .map_err(ServeError::Classification)?;
    let classify_ms = classify_start.elapsed().as_secs_f64() * 1000.0;

    info!(
        request_id = %request_id,
        class_id = result.class.id(),
        label = result.label(),
        confidence = result.confidence,
        classify_ms,
        "Classification completed"
    );

    Ok(ClassifyResponse::from_result(
        &result,
        Some(file_name),
        classify_ms,
    ))
}

/// Pulls the `file` field out of a multipart body.
async fn read_upload(multipart: &mut Multipart) -> Result<Upload, ServeError> {
    let field_error = |e: axum::extract::multipart::MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServeError::TooLarge(e.body_text())
        } else {
            ServeError::BadRequest(e.body_text())
        }
    };

    while let Some(field) = multipart.next_field().await.map_err(field_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map_err(field_error)?;
        return Ok(Upload { file_name, bytes });
    }

    Err(ServeError::BadRequest(
        "missing multipart field 'file'".to_string(),
    ))
}

/// Nearby hospital lookup endpoint
async fn hospitals_handler<S: PlaceSearch + 'static>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> (StatusCode, Json<HospitalsResponse>) {
    let request_id = uuid::Uuid::new_v4().to_string();
    let query = match query {
        Ok(Query(pairs)) => HospitalQuery::from_pairs(pairs),
        Err(rejection) => {
            let e = ServeError::BadRequest(rejection.body_text());
            warn!(request_id = %request_id, error = %e, "Hospital lookup rejected");
            return (e.status(), Json(HospitalsResponse::error(e.to_string())));
        }
    };
    info!(
        request_id = %request_id,
        lat = ?query.lat,
        lng = ?query.lng,
        "Processing hospital lookup"
    );

    let start = Instant::now();
    match lookup_hospitals(&state.hospitals, &query).await {
        Ok(response) => {
            info!(
                request_id = %request_id,
                candidates = response.hospitals.as_ref().map_or(0, Vec::len),
                total_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Hospital lookup completed"
            );
            (StatusCode::OK, Json(response))
        }
        Err(e) => {
            error!(request_id = %request_id, error = %e, "Hospital lookup failed");
            (e.status(), Json(HospitalsResponse::error(e.to_string())))
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown...");
        }
    }
}
