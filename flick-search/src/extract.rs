//! Turns a raw search response into one [`SelectedPhoto`].
//!
//! Checks run in a fixed order and stop at the first failure, so a response
//! that is wrong in several ways always reports the earliest problem.
use crate::error::SearchError;
use crate::transport::TransportError;
use crate::types::{EnvelopeStatus, PhotoRecord, SelectedPhoto, key};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Mutex;

/// Source of the random index used to pick a photo.
///
/// Implementations must return a value in `[0, len)`; `len` is never zero.
pub trait IndexPicker: Send + Sync {
    fn pick(&self, len: usize) -> usize;
}

/// Uniform pick from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngPicker;

impl IndexPicker for ThreadRngPicker {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Uniform pick from a seeded RNG; the same seed replays the same picks.
#[derive(Debug)]
pub struct SeededPicker {
    rng: Mutex<StdRng>,
}

impl SeededPicker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl IndexPicker for SeededPicker {
    fn pick(&self, len: usize) -> usize {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_range(0..len)
    }
}

/// Always the same index (clamped to the list).
#[derive(Debug, Clone, Copy)]
pub struct FixedPicker(pub usize);

impl IndexPicker for FixedPicker {
    fn pick(&self, len: usize) -> usize {
        self.0.min(len.saturating_sub(1))
    }
}

impl<P: IndexPicker + ?Sized> IndexPicker for Box<P> {
    fn pick(&self, len: usize) -> usize {
        (**self).pick(len)
    }
}

#[derive(Debug, Default)]
pub struct ResponseExtractor<P = ThreadRngPicker> {
    picker: P,
}

impl ResponseExtractor<ThreadRngPicker> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: IndexPicker> ResponseExtractor<P> {
    pub fn with_picker(picker: P) -> Self {
        Self { picker }
    }

    /// Validate a search response and pick one photo from it.
    ///
    /// ```
    /// use flick_search::extract::{FixedPicker, ResponseExtractor};
    ///
    /// let body = br#"{"stat":"ok","photos":{"photo":[
    ///     {"title":"A","url_m":"http://x/a.jpg"},
    ///     {"title":"B","url_m":"http://x/b.jpg"}]}}"#;
    /// let photo = ResponseExtractor::with_picker(FixedPicker(1))
    ///     .extract(200, Some(&body[..]), None)
    ///     .unwrap();
    /// assert_eq!(photo.title, "B");
    /// ```
    pub fn extract(
        &self,
        http_status: u16,
        raw_body: Option<&[u8]>,
        transport_error: Option<&TransportError>,
    ) -> Result<SelectedPhoto, SearchError> {
        if let Some(err) = transport_error {
            return Err(SearchError::Transport(err.to_string()));
        }
        if !(200..=299).contains(&http_status) {
            return Err(SearchError::HttpStatus(http_status));
        }
        let body = match raw_body {
            Some(body) if !body.is_empty() => body,
            _ => return Err(SearchError::EmptyBody),
        };

        let parsed: Value = serde_json::from_slice(body)
            .map_err(|e| SearchError::MalformedJson(e.to_string()))?;

        if !parsed.is_object() {
            return Err(SearchError::ApiStatus {
                stat: None,
                code: None,
                message: "response is not a JSON object".to_string(),
            });
        }
        let status = EnvelopeStatus::deserialize(&parsed).unwrap_or_default();
        if !status.is_ok() {
            return Err(SearchError::ApiStatus {
                stat: status.stat,
                code: status.code,
                message: status
                    .message
                    .unwrap_or_else(|| "missing or unexpected status".to_string()),
            });
        }

        let photos = parsed
            .get(key::PHOTOS)
            .and_then(|p| p.get(key::PHOTO))
            .and_then(Value::as_array)
            .ok_or(SearchError::MissingField("photos.photo"))?;

        if photos.is_empty() {
            return Err(SearchError::NoResults);
        }

        let index = self.picker.pick(photos.len()).min(photos.len() - 1);
        let record = PhotoRecord::from_json(&photos[index]);
        tracing::debug!(
            index,
            candidates = photos.len(),
            total = ?parsed.get(key::PHOTOS).and_then(|p| p.get(key::TOTAL)),
            photo_id = ?record.id,
            "flickr.extract.picked"
        );

        let image_url = record
            .medium_url
            .ok_or(SearchError::MissingField(key::MEDIUM_URL))?;
        let title = record.title.ok_or(SearchError::MissingField(key::TITLE))?;

        Ok(SelectedPhoto { title, image_url })
    }
}
