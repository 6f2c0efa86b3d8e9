//! Axum [`handlers`](axum#handlers) for the root path.
//!
//! Trackers are not websites; `GET /` answers a redirect to the
//! configured URL (typically the project or stats page) or a plain `404`.
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::core::Tracker;

/// It handles the `GET /` request.
#[allow(clippy::unused_async)]
pub async fn handle(State(tracker): State<Arc<Tracker>>) -> Response {
    match tracker.get_redirect_url() {
        Some(redirect_url) => (StatusCode::FOUND, [(header::LOCATION, redirect_url.to_owned())]).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
