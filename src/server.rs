//! HTTP surface.
//!
//! `GET /` returns a welcome message; `POST /get_prayer_times` runs the
//! router on a blocking thread and maps `PrayerError` to a status code and a
//! `{"detail": "..."}` body.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::logging::{self, Component};
use crate::model::{DerivedResult, PrayerError, PrayerRequest};
use crate::router::PrayerRouter;

pub const WELCOME_MESSAGE: &str =
    "Welcome to Hijri Clock API. Use /get_prayer_times to get timings.";

#[derive(Debug, Serialize, Deserialize)]
pub struct WelcomeResponse {
    pub message: String,
}

/// Error envelope shared by every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

fn error_response(status: StatusCode, detail: String) -> Response {
    (status, Json(ErrorBody { detail })).into_response()
}

impl PrayerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PrayerError::InvalidInput(_) | PrayerError::Upstream(_) => StatusCode::BAD_REQUEST,
            PrayerError::Format(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PrayerError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), self.detail())
    }
}

/// Build the application router around a shared `PrayerRouter`.
pub fn app(router: PrayerRouter) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/get_prayer_times", post(get_prayer_times))
        .with_state(router)
}

async fn root() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: WELCOME_MESSAGE.to_string(),
    })
}

async fn get_prayer_times(
    State(router): State<PrayerRouter>,
    payload: Result<Json<PrayerRequest>, JsonRejection>,
) -> Result<Json<DerivedResult>, Response> {
    let Json(req) = payload.map_err(|rejection| {
        logging::warn(Component::Server, None, &format!("Rejected body: {}", rejection.body_text()));
        error_response(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text())
    })?;

    // The provider client blocks, so it must not run on an async worker.
    let outcome = tokio::task::spawn_blocking(move || router.handle(&req))
        .await
        .map_err(|e| {
            logging::error(Component::Server, None, &format!("Request task failed: {}", e));
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    match outcome {
        Ok(result) => Ok(Json(result)),
        Err(err) => {
            if err.status_code().is_server_error() {
                logging::error(Component::Server, None, &err.to_string());
            } else {
                logging::info(Component::Server, None, &err.to_string());
            }
            Err(err.into_response())
        }
    }
}

/// Bind `addr` and serve until the process receives Ctrl-C.
pub async fn serve(addr: &str, router: PrayerRouter) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    logging::info(Component::Server, None, &format!("Listening on {}", listener.local_addr()?));

    axum::serve(listener, app(router))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            logging::info(Component::Server, None, "Shutdown requested");
        })
        .await
}
