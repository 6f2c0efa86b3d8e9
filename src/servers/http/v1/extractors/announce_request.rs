//! Axum [`extractor`](axum::extract) for the [`Announce`]
//! request.
//!
//! It parses the query params in the URL and returns an [`Announce`]
//! request.
//!
//! Sample announce URL:
//!
//! ```text
//! http://0.0.0.0:7070/announce?info_hash=%81%00%00%00%00%00%00%00%00%00%00%00%00%00%00%00%00%00%00%00&peer_id=-qB00000000000000001&port=17548
//! ```
//!
//! If the query params are missing or invalid the extractor returns a
//! bencoded [`error`](crate::servers::http::v1::responses::error) response.
use std::panic::Location;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};

use crate::servers::http::v1::query::Query;
use crate::servers::http::v1::requests::announce::{Announce, ParseAnnounceQueryError};
use crate::servers::http::v1::responses;

/// Extractor for the [`Announce`] request.
pub struct ExtractRequest(pub Announce);

#[async_trait]
impl<S> FromRequestParts<S> for ExtractRequest
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match extract_announce_from(parts.uri.query()) {
            Ok(announce_request) => Ok(ExtractRequest(announce_request)),
            Err(error) => Err(error.into_response()),
        }
    }
}

fn extract_announce_from(maybe_raw_query: Option<&str>) -> Result<Announce, responses::error::Error> {
    if maybe_raw_query.is_none() {
        return Err(responses::error::Error::from(ParseAnnounceQueryError::MissingParam {
            location: Location::caller(),
            param_name: "info_hash".to_owned(),
        }));
    }

    let query = maybe_raw_query.unwrap().parse::<Query>()?;

    let announce_request = Announce::try_from(query)?;

    Ok(announce_request)
}
