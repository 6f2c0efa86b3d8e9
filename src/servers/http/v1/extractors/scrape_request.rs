//! Axum [`extractor`](axum::extract) for the [`Scrape`]
//! request.
//!
//! A scrape URL may carry zero or more `info_hash` params; zero means a
//! full scrape:
//!
//! ```text
//! http://0.0.0.0:7070/scrape?info_hash=%81%00%00%00%00%00%00%00%00%00%00%00%00%00%00%00%00%00%00%00
//! ```
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};

use crate::servers::http::v1::query::Query;
use crate::servers::http::v1::requests::scrape::Scrape;
use crate::servers::http::v1::responses;

/// Extractor for the [`Scrape`] request.
pub struct ExtractRequest(pub Scrape);

#[async_trait]
impl<S> FromRequestParts<S> for ExtractRequest
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match extract_scrape_from(parts.uri.query()) {
            Ok(scrape_request) => Ok(ExtractRequest(scrape_request)),
            Err(error) => Err(error.into_response()),
        }
    }
}

fn extract_scrape_from(maybe_raw_query: Option<&str>) -> Result<Scrape, responses::error::Error> {
    // No query at all is a full scrape.
    let query = maybe_raw_query.unwrap_or_default().parse::<Query>()?;

    Ok(Scrape::try_from(query)?)
}
