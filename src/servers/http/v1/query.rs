//! The `Query` struct used to parse and store the URL query parameters.
//!
//! ```text
//! URI = scheme ":" ["//" authority] path ["?" query] ["#" fragment]
//! ```
use std::panic::Location;
use std::str::FromStr;

use multimap::MultiMap;
use thiserror::Error;

type ParamName = String;

/// It represents a URL query component.
///
/// ```text
/// URI = scheme ":" ["//" authority] path ["?" query] ["#" fragment]
/// ```
#[derive(Debug)]
pub struct Query {
    params: MultiMap<ParamName, NameValuePair>,
}

impl Query {
    /// It return `Some(value)` for a URL query param if the param with the
    /// input `name` exists. For example:
    ///
    /// ```rust
    /// use swarm_tracker::servers::http::v1::query::Query;
    ///
    /// let raw_query = "param1=value1&param2=value2";
    ///
    /// let query = raw_query.parse::<Query>().unwrap();
    ///
    /// assert_eq!(query.get_param("param1").unwrap(), "value1");
    /// assert_eq!(query.get_param("param2").unwrap(), "value2");
    /// ```
    ///
    /// It returns only the first param value even if it has multiple values:
    ///
    /// ```rust
    /// use swarm_tracker::servers::http::v1::query::Query;
    ///
    /// let raw_query = "param1=value1&param1=value2";
    ///
    /// let query = raw_query.parse::<Query>().unwrap();
    ///
    /// assert_eq!(query.get_param("param1").unwrap(), "value1");
    /// ```
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<String> {
        self.params.get(name).map(|pair| pair.value.clone())
    }

    /// Returns all the param values as a vector, `None` if the param is
    /// missing entirely.
    ///
    /// ```rust
    /// use swarm_tracker::servers::http::v1::query::Query;
    ///
    /// let query = "param1=value1&param1=value2".parse::<Query>().unwrap();
    ///
    /// assert_eq!(
    ///     query.get_param_vec("param1"),
    ///     Some(vec!["value1".to_string(), "value2".to_string()])
    /// );
    /// ```
    #[must_use]
    pub fn get_param_vec(&self, name: &str) -> Option<Vec<String>> {
        self.params
            .get_vec(name)
            .map(|pairs| pairs.iter().map(|pair| pair.value.clone()).collect())
    }
}

/// This error can be returned when parsing a [`Query`]
/// from a string.
#[derive(Error, Debug)]
pub enum ParseQueryError {
    /// Invalid URL query param. For example: `"name=value=value"`. It contains
    /// an unescaped `=` character.
    #[error("invalid param {raw_param} in {location}")]
    InvalidParam {
        location: &'static Location<'static>,
        raw_param: String,
    },
}

impl FromStr for Query {
    type Err = ParseQueryError;

    fn from_str(raw_query: &str) -> Result<Self, Self::Err> {
        let mut params: MultiMap<ParamName, NameValuePair> = MultiMap::new();

        let raw_params = raw_query.trim().trim_start_matches('?').split('&').collect::<Vec<&str>>();

        for raw_param in raw_params {
            let pair: NameValuePair = raw_param.parse()?;
            let param_name = pair.name.clone();
            params.insert(param_name, pair);
        }

        Ok(Self { params })
    }
}

impl From<Vec<(&str, &str)>> for Query {
    fn from(raw_params: Vec<(&str, &str)>) -> Self {
        let mut params: MultiMap<ParamName, NameValuePair> = MultiMap::new();

        for raw_param in raw_params {
            params.insert(raw_param.0.to_owned(), NameValuePair::new(raw_param.0, raw_param.1));
        }

        Self { params }
    }
}

/// One `name=value` pair of the query component.
#[derive(Debug, Clone, PartialEq, Eq)]
struct NameValuePair {
    name: String,
    value: String,
}

impl NameValuePair {
    fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_owned(),
            value: value.to_owned(),
        }
    }
}

impl FromStr for NameValuePair {
    type Err = ParseQueryError;

    fn from_str(raw_param: &str) -> Result<Self, Self::Err> {
        let pair = raw_param.split('=').collect::<Vec<&str>>();

        match pair.as_slice() {
            // A parameter without a value, like `compact` in `?compact&foo=1`
            [name] => Ok(Self::new(name, "")),
            [name, value] => Ok(Self::new(name, value)),
            _ => Err(ParseQueryError::InvalidParam {
                location: Location::caller(),
                raw_param: raw_param.to_owned(),
            }),
        }
    }
}
