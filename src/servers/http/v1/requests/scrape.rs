//! `Scrape` request for the HTTP tracker.
//!
//! Data structures and logic for parsing the `scrape` request.
use std::panic::Location;

use swarm_tracker_located_error::{Located, LocatedError};
use swarm_tracker_primitives::info_hash::{ConversionError, InfoHash};
use thiserror::Error;

use crate::servers::http::percent_encoding::percent_decode_info_hash;
use crate::servers::http::v1::query::Query;
use crate::servers::http::v1::responses;
use crate::shared::bit_torrent::common::MAX_SCRAPE_TORRENTS;

pub const INFO_HASH_SCRAPE_PARAM: &str = "info_hash";

/// The `Scrape` request.
///
/// An empty infohash list is a **full scrape**: the client is asking for
/// the metadata of every torrent the tracker knows.
#[derive(Debug, PartialEq)]
pub struct Scrape {
    /// The infohashes of the torrents you want to get data from. Can be
    /// empty (full scrape).
    pub info_hashes: Vec<InfoHash>,
}

/// Errors that can occur when parsing the `Scrape` request.
#[derive(Error, Debug)]
pub enum ParseScrapeQueryError {
    /// More infohashes than a single scrape may carry.
    #[error("exceeded the maximum of {MAX_SCRAPE_TORRENTS} info_hash params, got {number_of_valid_info_hashes} in {location}")]
    TooManyInfoHashes {
        location: &'static Location<'static>,
        number_of_valid_info_hashes: usize,
    },
    /// The `info_hash` is invalid.
    #[error("invalid param value {param_value} for {param_name} in {source}")]
    InvalidInfoHashParam {
        param_name: String,
        param_value: String,
        source: LocatedError<'static, ConversionError>,
    },
}

impl From<ParseScrapeQueryError> for responses::error::Error {
    fn from(err: ParseScrapeQueryError) -> Self {
        responses::error::Error {
            failure_reason: format!("Cannot parse query params for scrape request: {err}"),
        }
    }
}

impl TryFrom<Query> for Scrape {
    type Error = ParseScrapeQueryError;

    fn try_from(query: Query) -> Result<Self, Self::Error> {
        Ok(Self {
            info_hashes: extract_info_hashes(&query)?,
        })
    }
}

fn extract_info_hashes(query: &Query) -> Result<Vec<InfoHash>, ParseScrapeQueryError> {
    let Some(raw_params) = query.get_param_vec(INFO_HASH_SCRAPE_PARAM) else {
        // Full scrape.
        return Ok(vec![]);
    };

    if raw_params.len() > MAX_SCRAPE_TORRENTS {
        return Err(ParseScrapeQueryError::TooManyInfoHashes {
            location: Location::caller(),
            number_of_valid_info_hashes: raw_params.len(),
        });
    }

    let mut info_hashes = vec![];

    for raw_param in raw_params {
        let info_hash = percent_decode_info_hash(&raw_param).map_err(|err| ParseScrapeQueryError::InvalidInfoHashParam {
            param_name: INFO_HASH_SCRAPE_PARAM.to_owned(),
            param_value: raw_param.clone(),
            source: Located(err).into(),
        })?;

        info_hashes.push(info_hash);
    }

    Ok(info_hashes)
}

#[cfg(test)]
mod tests {

    mod scrape_request {

        use crate::servers::http::v1::query::Query;
        use crate::servers::http::v1::requests::scrape::Scrape;
        use crate::shared::bit_torrent::common::MAX_SCRAPE_TORRENTS;

        #[test]
        fn should_be_parsed_from_the_url_query_with_one_infohash() {
            let query = Query::from(vec![("info_hash", "%3B%24U%04%CF%5F%11%BB%DB%E1%20%1C%EAjk%F4Z%EE%1B%C0")]);

            let scrape_request = Scrape::try_from(query).unwrap();

            assert_eq!(scrape_request.info_hashes.len(), 1);
            assert_eq!(
                scrape_request.info_hashes[0].to_hex_string(),
                "3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0"
            );
        }

        #[test]
        fn should_be_parsed_from_the_url_query_with_multiple_infohashes() {
            let query = "info_hash=%3B%24U%04%CF%5F%11%BB%DB%E1%20%1C%EAjk%F4Z%EE%1B%C0&info_hash=%AA%AA%AA%AA%AA%AA%AA%AA%AA%AA%AA%AA%AA%AA%AA%AA%AA%AA%AA%AA"
                .parse::<Query>()
                .unwrap();

            let scrape_request = Scrape::try_from(query).unwrap();

            assert_eq!(scrape_request.info_hashes.len(), 2);
        }

        #[test]
        fn should_be_a_full_scrape_without_any_infohash() {
            let query = Query::from(vec![]);

            let scrape_request = Scrape::try_from(query).unwrap();

            assert!(scrape_request.info_hashes.is_empty());
        }

        #[test]
        fn should_fail_with_an_invalid_infohash() {
            let query = Query::from(vec![("info_hash", "invalid infohash")]);

            assert!(Scrape::try_from(query).is_err());
        }

        #[test]
        fn should_fail_with_too_many_infohashes() {
            let raw_query = vec![("info_hash", "%3B%24U%04%CF%5F%11%BB%DB%E1%20%1C%EAjk%F4Z%EE%1B%C0"); MAX_SCRAPE_TORRENTS + 1];

            assert!(Scrape::try_from(Query::from(raw_query)).is_err());
        }
    }
}
