//! Response shapes for `flickr.photos.search` (`format=json&nojsoncallback=1`).
//!
//! Success:
//! ```json
//! {"photos":{"page":1,"pages":10,"perpage":100,"total":1000,
//!   "photo":[{"id":"1","owner":"o","title":"A","url_m":"https://..."}]},
//!  "stat":"ok"}
//! ```
//! Failure: `{"stat":"fail","code":100,"message":"Invalid API Key (Key has invalid format)"}`
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const OK_STATUS: &str = "ok";

pub mod key {
    pub const STATUS: &str = "stat";
    pub const PHOTOS: &str = "photos";
    pub const PHOTO: &str = "photo";
    pub const TITLE: &str = "title";
    pub const MEDIUM_URL: &str = "url_m";
    pub const TOTAL: &str = "total";
}

/// Top-level status fields, present on both success and failure envelopes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnvelopeStatus {
    #[serde(default)]
    pub stat: Option<String>,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

impl EnvelopeStatus {
    pub fn is_ok(&self) -> bool {
        self.stat.as_deref() == Some(OK_STATUS)
    }
}

/// One entry of `photos.photo`. Only `title` and `url_m` matter; the rest is kept for logs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotoRecord {
    pub id: Option<String>,
    pub owner: Option<String>,
    pub title: Option<String>,
    pub medium_url: Option<String>,
}

impl PhotoRecord {
    /// Read the string fields of a photo entry; a wrong type or a non-object gives `None`.
    pub fn from_json(value: &Value) -> Self {
        let text = |name: &str| value.get(name).and_then(Value::as_str).map(str::to_owned);
        Self {
            id: text("id"),
            owner: text("owner"),
            title: text(key::TITLE),
            medium_url: text(key::MEDIUM_URL),
        }
    }
}

/// The single photo a search resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedPhoto {
    pub title: String,
    pub image_url: String,
}
