use std::fmt;
use thiserror::Error;

/// Message shown while a search is in flight.
pub const SEARCHING_MESSAGE: &str = "Searching...";
const EMPTY_PHRASE_MESSAGE: &str = "Phrase Empty.";
const BAD_COORDINATES_MESSAGE: &str = "Lat should be [-90, 90].\nLon should be [-180, 180].";
const NO_PHOTO_MESSAGE: &str = "No photo returned. Try again!";

/// Why a search input was rejected before any request was made.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    EmptyPhrase,
    UnparsableCoordinate(String),
    CoordinatesOutOfRange { latitude: f64, longitude: f64 },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPhrase => f.write_str("phrase is empty"),
            Self::UnparsableCoordinate(raw) => write!(f, "{raw:?} is not a coordinate"),
            Self::CoordinatesOutOfRange {
                latitude,
                longitude,
            } => write!(
                f,
                "({latitude}, {longitude}) is outside lat [-90, 90] / lon [-180, 180]"
            ),
        }
    }
}

/// Terminal outcome of a failed search. None of these are retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    #[error("invalid search input: {0}")]
    Validation(ValidationIssue),

    #[error("request failed before a response arrived: {0}")]
    Transport(String),

    #[error("search endpoint answered HTTP {0}")]
    HttpStatus(u16),

    #[error("search endpoint returned an empty body")]
    EmptyBody,

    #[error("response body is not valid JSON: {0}")]
    MalformedJson(String),

    #[error("API reported failure (stat={stat:?}, code={code:?}): {message}")]
    ApiStatus {
        stat: Option<String>,
        code: Option<i64>,
        message: String,
    },

    #[error("response is missing `{0}`")]
    MissingField(&'static str),

    #[error("search returned no photos")]
    NoResults,
}

impl SearchError {
    /// Stable label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Transport(_) => "transport",
            Self::HttpStatus(_) => "http_status",
            Self::EmptyBody => "empty_body",
            Self::MalformedJson(_) => "malformed_json",
            Self::ApiStatus { .. } => "api_status",
            Self::MissingField(_) => "missing_field",
            Self::NoResults => "no_results",
        }
    }

    /// Text for the status line of a front end; details go to the logs.
    ///
    /// ```
    /// use flick_search::{SearchError, ValidationIssue};
    ///
    /// assert_eq!(
    ///     SearchError::Validation(ValidationIssue::EmptyPhrase).user_message(),
    ///     "Phrase Empty."
    /// );
    /// assert_eq!(SearchError::NoResults.user_message(), "No photo returned. Try again!");
    /// ```
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Validation(ValidationIssue::EmptyPhrase) => EMPTY_PHRASE_MESSAGE,
            Self::Validation(_) => BAD_COORDINATES_MESSAGE,
            _ => NO_PHOTO_MESSAGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_problems_share_one_message() {
        let unparsable = SearchError::Validation(ValidationIssue::UnparsableCoordinate("x".into()));
        let out_of_range = SearchError::Validation(ValidationIssue::CoordinatesOutOfRange {
            latitude: 91.0,
            longitude: 0.0,
        });
        assert_eq!(unparsable.user_message(), BAD_COORDINATES_MESSAGE);
        assert_eq!(out_of_range.user_message(), BAD_COORDINATES_MESSAGE);
    }

    #[test]
    fn display_includes_details() {
        let err = SearchError::ApiStatus {
            stat: Some("fail".into()),
            code: Some(100),
            message: "Invalid API Key".into(),
        };
        let shown = err.to_string();
        assert!(shown.contains("100"));
        assert!(shown.contains("Invalid API Key"));
        assert_eq!(err.kind(), "api_status");
        assert_eq!(
            SearchError::HttpStatus(404).to_string(),
            "search endpoint answered HTTP 404"
        );
    }
}
