//! Search modes and the `flickr.photos.search` request builder.
//!
//! [`QueryBuilder::build`] is pure and never fails: input validation happens
//! before it is called (see [`SearchMode::validate`]).
use crate::error::{SearchError, ValidationIssue};
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

/// Rendered in place of a real box when the coordinates are not usable numbers.
pub const DEGENERATE_BBOX: &str = "0,0,0,0";

/// Wire names of the request parameters.
pub mod param {
    pub const METHOD: &str = "method";
    pub const API_KEY: &str = "api_key";
    pub const SAFE_SEARCH: &str = "safe_search";
    pub const EXTRAS: &str = "extras";
    pub const FORMAT: &str = "format";
    pub const NO_JSON_CALLBACK: &str = "nojsoncallback";
    pub const TEXT: &str = "text";
    pub const BOUNDING_BOX: &str = "bbox";
}

const SEARCH_METHOD: &str = "flickr.photos.search";
const MEDIUM_URL_EXTRA: &str = "url_m";
const RESPONSE_FORMAT: &str = "json";
const DISABLE_JSON_CALLBACK: &str = "1";

/// What to search for. Exactly one mode per search.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchMode {
    ByPhrase(String),
    ByLocation { latitude: f64, longitude: f64 },
}

impl SearchMode {
    pub fn phrase(text: impl Into<String>) -> Self {
        Self::ByPhrase(text.into())
    }

    pub fn location(latitude: f64, longitude: f64) -> Self {
        Self::ByLocation {
            latitude,
            longitude,
        }
    }

    /// Build a location search from two raw text inputs.
    ///
    /// ```
    /// use flick_search::SearchMode;
    ///
    /// let mode = SearchMode::from_location_text(" -8.05", "-34.9").unwrap();
    /// assert_eq!(mode, SearchMode::location(-8.05, -34.9));
    ///
    /// assert!(SearchMode::from_location_text("", "10").is_err());
    /// assert!(SearchMode::from_location_text("91", "0").is_err());
    /// ```
    pub fn from_location_text(latitude: &str, longitude: &str) -> Result<Self, SearchError> {
        let latitude = parse_coordinate(latitude)?;
        let longitude = parse_coordinate(longitude)?;
        let mode = Self::location(latitude, longitude);
        mode.validate()?;
        Ok(mode)
    }

    /// Check the preconditions [`QueryBuilder::build`] relies on.
    pub fn validate(&self) -> Result<(), SearchError> {
        match self {
            Self::ByPhrase(text) => {
                if text.is_empty() {
                    return Err(SearchError::Validation(ValidationIssue::EmptyPhrase));
                }
            }
            Self::ByLocation {
                latitude,
                longitude,
            } => {
                if !in_range(*latitude, LATITUDE_RANGE) || !in_range(*longitude, LONGITUDE_RANGE) {
                    return Err(SearchError::Validation(
                        ValidationIssue::CoordinatesOutOfRange {
                            latitude: *latitude,
                            longitude: *longitude,
                        },
                    ));
                }
            }
        }
        Ok(())
    }

    /// Short label for logs; never includes the phrase itself.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ByPhrase(_) => "phrase",
            Self::ByLocation { .. } => "location",
        }
    }
}

fn parse_coordinate(raw: &str) -> Result<f64, SearchError> {
    let trimmed = raw.trim();
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            SearchError::Validation(ValidationIssue::UnparsableCoordinate(trimmed.to_string()))
        })
}

fn in_range(value: f64, (min, max): (f64, f64)) -> bool {
    value.is_finite() && value >= min && value <= max
}

/// A lon/lat rectangle in the order Flickr expects: min_lon, min_lat, max_lon, max_lat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Box centred on a point, clamped to the legal coordinate domain.
    ///
    /// `half_width` is applied to the latitude and `half_height` to the longitude.
    /// Returns `None` for non-finite input.
    ///
    /// ```
    /// use flick_search::query::BoundingBox;
    ///
    /// let bbox = BoundingBox::around(89.5, 179.5, 1.0, 1.0).unwrap();
    /// assert_eq!(bbox.max_lat, 90.0);
    /// assert_eq!(bbox.max_lon, 180.0);
    /// assert_eq!(bbox.to_string(), "178.5,88.5,180,90");
    /// ```
    pub fn around(
        latitude: f64,
        longitude: f64,
        half_width: f64,
        half_height: f64,
    ) -> Option<Self> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return None;
        }
        let half_width = half_width.abs();
        let half_height = half_height.abs();
        Some(Self {
            min_lon: (longitude - half_height).max(LONGITUDE_RANGE.0),
            min_lat: (latitude - half_width).max(LATITUDE_RANGE.0),
            max_lon: (longitude + half_height).min(LONGITUDE_RANGE.1),
            max_lat: (latitude + half_width).min(LATITUDE_RANGE.1),
        })
    }

    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        self.min_lat <= latitude
            && latitude <= self.max_lat
            && self.min_lon <= longitude
            && longitude <= self.max_lon
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}

/// `bbox` value for raw text inputs; unparsable text yields [`DEGENERATE_BBOX`].
pub fn bbox_from_text(
    latitude: &str,
    longitude: &str,
    half_width: f64,
    half_height: f64,
) -> String {
    match (
        latitude.trim().parse::<f64>(),
        longitude.trim().parse::<f64>(),
    ) {
        (Ok(lat), Ok(lon)) => bbox_param(lat, lon, half_width, half_height),
        _ => DEGENERATE_BBOX.to_string(),
    }
}

fn bbox_param(latitude: f64, longitude: f64, half_width: f64, half_height: f64) -> String {
    BoundingBox::around(latitude, longitude, half_width, half_height)
        .map(|b| b.to_string())
        .unwrap_or_else(|| DEGENERATE_BBOX.to_string())
}

/// Request parameters keyed by wire name. Keys are unique by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequestParams(BTreeMap<String, String>);

impl SearchRequestParams {
    fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `endpoint` with every parameter appended as a URL-encoded query pair.
    pub fn to_url(&self, endpoint: &Url) -> Url {
        let mut url = endpoint.clone();
        url.set_query(None);
        url.query_pairs_mut().extend_pairs(self.iter());
        url
    }

    /// Parse the query string of `url` back into a parameter mapping.
    pub fn from_url(url: &Url) -> Self {
        Self(url.query_pairs().into_owned().collect())
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

/// Endpoint, credentials and fixed tuning for search requests.
#[derive(Clone)]
pub struct SearchSettings {
    pub endpoint: Url,
    pub api_key: String,
    pub safe_search: u8,
    pub bbox_half_width: f64,
    pub bbox_half_height: f64,
}

impl fmt::Debug for SearchSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchSettings")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"<redacted>")
            .field("safe_search", &self.safe_search)
            .field("bbox_half_width", &self.bbox_half_width)
            .field("bbox_half_height", &self.bbox_half_height)
            .finish()
    }
}

impl SearchSettings {
    pub const DEFAULT_ENDPOINT: &'static str = "https://api.flickr.com/services/rest";

    /// Default endpoint and tuning with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: Url::parse(Self::DEFAULT_ENDPOINT).expect("default endpoint URL"),
            api_key: api_key.into(),
            safe_search: 1,
            bbox_half_width: 1.0,
            bbox_half_height: 1.0,
        }
    }

    /// Replace the endpoint with `scheme://host/path`.
    ///
    /// ```
    /// use flick_search::SearchSettings;
    ///
    /// let settings = SearchSettings::new("key")
    ///     .with_endpoint("http", "127.0.0.1:8080", "/services/rest")
    ///     .unwrap();
    /// assert_eq!(settings.endpoint.as_str(), "http://127.0.0.1:8080/services/rest");
    /// ```
    pub fn with_endpoint(
        mut self,
        scheme: &str,
        host: &str,
        path: &str,
    ) -> Result<Self, url::ParseError> {
        let path = path.trim_start_matches('/');
        self.endpoint = Url::parse(&format!("{scheme}://{host}/{path}"))?;
        Ok(self)
    }

    pub fn with_safe_search(mut self, level: u8) -> Self {
        self.safe_search = level;
        self
    }

    pub fn with_bbox_half_extents(mut self, half_width: f64, half_height: f64) -> Self {
        self.bbox_half_width = half_width;
        self.bbox_half_height = half_height;
        self
    }
}

/// Turns a [`SearchMode`] into request parameters and a request URL.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    settings: SearchSettings,
}

impl QueryBuilder {
    pub fn new(settings: SearchSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Parameters for one search request.
    ///
    /// ```
    /// use flick_search::{QueryBuilder, SearchMode, SearchSettings};
    ///
    /// let builder = QueryBuilder::new(SearchSettings::new("k"));
    /// let params = builder.build(&SearchMode::phrase("harbour at dusk"));
    /// assert_eq!(params.get("text"), Some("harbour at dusk"));
    /// assert_eq!(params.get("method"), Some("flickr.photos.search"));
    /// assert!(!params.contains_key("bbox"));
    /// ```
    pub fn build(&self, mode: &SearchMode) -> SearchRequestParams {
        let mut params = SearchRequestParams::default();
        params.insert(param::METHOD, SEARCH_METHOD);
        params.insert(param::API_KEY, self.settings.api_key.as_str());
        params.insert(param::SAFE_SEARCH, self.settings.safe_search.to_string());
        params.insert(param::EXTRAS, MEDIUM_URL_EXTRA);
        params.insert(param::FORMAT, RESPONSE_FORMAT);
        params.insert(param::NO_JSON_CALLBACK, DISABLE_JSON_CALLBACK);

        match mode {
            SearchMode::ByPhrase(text) => {
                params.insert(param::TEXT, text.as_str());
            }
            SearchMode::ByLocation {
                latitude,
                longitude,
            } => {
                params.insert(
                    param::BOUNDING_BOX,
                    bbox_param(
                        *latitude,
                        *longitude,
                        self.settings.bbox_half_width,
                        self.settings.bbox_half_height,
                    ),
                );
            }
        }
        params
    }

    pub fn url(&self, params: &SearchRequestParams) -> Url {
        params.to_url(&self.settings.endpoint)
    }

    pub fn build_url(&self, mode: &SearchMode) -> Url {
        self.url(&self.build(mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> QueryBuilder {
        QueryBuilder::new(SearchSettings::new("test-key"))
    }

    fn parse_bbox(s: &str) -> [f64; 4] {
        let parts: Vec<f64> = s.split(',').map(|p| p.parse().unwrap()).collect();
        [parts[0], parts[1], parts[2], parts[3]]
    }

    #[test]
    fn phrase_params_include_fixed_constants() {
        let params = builder().build(&SearchMode::phrase("baby asian elephant"));
        assert_eq!(params.get(param::TEXT), Some("baby asian elephant"));
        assert_eq!(params.get(param::API_KEY), Some("test-key"));
        assert_eq!(params.get(param::SAFE_SEARCH), Some("1"));
        assert_eq!(params.get(param::EXTRAS), Some("url_m"));
        assert_eq!(params.get(param::FORMAT), Some("json"));
        assert_eq!(params.get(param::NO_JSON_CALLBACK), Some("1"));
        assert_eq!(params.get(param::METHOD), Some("flickr.photos.search"));
        assert_eq!(params.len(), 7);
    }

    #[test]
    fn phrase_is_kept_verbatim() {
        for phrase in ["  padded  ", "a&b=c", "çà et là", "100%", "#tag +plus"] {
            let params = builder().build(&SearchMode::phrase(phrase));
            assert_eq!(params.get(param::TEXT), Some(phrase));
        }
    }

    #[test]
    fn location_params_use_bbox_instead_of_coordinates() {
        let params = builder().build(&SearchMode::location(-8.05, -34.9));
        assert!(params.contains_key(param::BOUNDING_BOX));
        assert!(!params.contains_key(param::TEXT));
        assert!(!params.contains_key("lat"));
        assert!(!params.contains_key("lon"));
        assert_eq!(params.len(), 7);
    }

    #[test]
    fn bbox_contains_the_point_for_a_grid_of_coordinates() {
        let b = builder();
        let mut lat = -90.0;
        while lat <= 90.0 {
            let mut lon = -180.0;
            while lon <= 180.0 {
                let params = b.build(&SearchMode::location(lat, lon));
                let [min_lon, min_lat, max_lon, max_lat] =
                    parse_bbox(params.get(param::BOUNDING_BOX).unwrap());
                assert!(min_lon <= lon && lon <= max_lon, "lon {lon}");
                assert!(min_lat <= lat && lat <= max_lat, "lat {lat}");
                assert!(min_lat >= -90.0 && max_lat <= 90.0);
                assert!(min_lon >= -180.0 && max_lon <= 180.0);
                lon += 22.5;
            }
            lat += 15.0;
        }
    }

    #[test]
    fn bbox_clamps_longitude_to_its_own_range() {
        let bbox = BoundingBox::around(0.0, -179.5, 1.0, 1.0).unwrap();
        assert_eq!(bbox.min_lon, -180.0);
        assert_eq!(bbox.max_lon, -178.5);
        assert_eq!(bbox.min_lat, -1.0);
        assert_eq!(bbox.max_lat, 1.0);
        // Longitudes beyond ±90 must survive the clamp untouched.
        let inland = BoundingBox::around(10.0, 120.0, 1.0, 1.0).unwrap();
        assert_eq!(inland.min_lon, 119.0);
        assert_eq!(inland.max_lon, 121.0);
    }

    #[test]
    fn half_extents_apply_to_the_right_axis() {
        let bbox = BoundingBox::around(10.0, 20.0, 0.5, 2.0).unwrap();
        assert_eq!(bbox.to_string(), "18,9.5,22,10.5");
        assert!(bbox.contains(10.0, 20.0));
        assert!(!bbox.contains(11.0, 20.0));
    }

    #[test]
    fn unusable_coordinates_produce_degenerate_bbox() {
        assert_eq!(bbox_from_text("abc", "10", 1.0, 1.0), DEGENERATE_BBOX);
        assert_eq!(bbox_from_text("10", "", 1.0, 1.0), DEGENERATE_BBOX);
        assert_eq!(bbox_from_text("10", "20", 1.0, 1.0), "19,9,21,11");
        let params = builder().build(&SearchMode::location(f64::NAN, 0.0));
        assert_eq!(params.get(param::BOUNDING_BOX), Some(DEGENERATE_BBOX));
    }

    #[test]
    fn url_round_trips_to_the_same_mapping() {
        let b = builder();
        for mode in [
            SearchMode::phrase("sunset & sea = calm?"),
            SearchMode::location(45.5, -122.6),
        ] {
            let params = b.build(&mode);
            let url = b.url(&params);
            assert_eq!(url.host_str(), Some("api.flickr.com"));
            assert_eq!(url.path(), "/services/rest");
            assert_eq!(SearchRequestParams::from_url(&url), params);
        }
    }

    #[test]
    fn every_key_appears_exactly_once_in_the_url() {
        let url = builder().build_url(&SearchMode::phrase("owl"));
        let keys: Vec<String> = url.query_pairs().map(|(k, _)| k.into_owned()).collect();
        let mut deduped = keys.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(keys.len(), deduped.len());
        assert_eq!(keys.len(), 7);
    }

    #[test]
    fn validation_rejects_bad_input() {
        assert!(SearchMode::phrase("").validate().is_err());
        assert!(SearchMode::phrase("   ").validate().is_ok());
        assert!(SearchMode::phrase("x").validate().is_ok());
        assert!(SearchMode::location(91.0, 0.0).validate().is_err());
        assert!(SearchMode::location(0.0, 181.0).validate().is_err());
        assert!(SearchMode::location(-90.0, 180.0).validate().is_ok());
        assert!(SearchMode::location(f64::NAN, 0.0).validate().is_err());
    }

    #[test]
    fn location_text_rejects_garbage() {
        let err = SearchMode::from_location_text("north", "10").unwrap_err();
        assert_eq!(
            err,
            SearchError::Validation(ValidationIssue::UnparsableCoordinate("north".into()))
        );
        assert!(SearchMode::from_location_text("inf", "10").is_err());
    }

    #[test]
    fn settings_debug_hides_the_key() {
        let shown = format!("{:?}", SearchSettings::new("super-secret"));
        assert!(!shown.contains("super-secret"));
    }
}
