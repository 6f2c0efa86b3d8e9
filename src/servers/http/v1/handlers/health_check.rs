//! Axum [`handlers`](axum#handlers) for the health check endpoint.
use axum::Json;
use serde::{Deserialize, Serialize};

/// The response to the `GET /health_check` request.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Report {
    pub status: Status,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Status {
    Ok,
}

/// Endpoint for container health check.
#[allow(clippy::unused_async)]
pub async fn handler() -> Json<Report> {
    Json(Report { status: Status::Ok })
}
