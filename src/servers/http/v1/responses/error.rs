//! The error response for the HTTP tracker.
//!
//! `BitTorrent` clients do not parse HTTP error statuses: a failed request
//! is answered `200 OK` with a bencoded dictionary whose only key is
//! `failure reason`, per [BEP 3](https://www.bittorrent.org/beps/bep_0003.html).
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bip_bencode::{ben_bytes, ben_map};

/// The error response. For example:
///
/// ```text
/// d14:failure reason42:Cannot parse query params for announce requeste
/// ```
#[derive(Debug, PartialEq, Eq)]
pub struct Error {
    pub failure_reason: String,
}

impl Error {
    /// Returns the bencoded body of the error response.
    #[must_use]
    pub fn body(&self) -> Vec<u8> {
        (ben_map! {
            "failure reason" => ben_bytes!(self.failure_reason.clone())
        })
        .encode()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (StatusCode::OK, self.body()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn it_should_be_bencoded() {
        let error = Error {
            failure_reason: "unknown request".to_owned(),
        };

        assert_eq!(
            String::from_utf8(error.body()).unwrap(),
            "d14:failure reason15:unknown requeste"
        );
    }
}
