//! Random-photo search against the Flickr REST API.
//!
//! A search is either a free-text phrase or a latitude/longitude pair. The
//! [`QueryBuilder`] turns it into `flickr.photos.search` parameters, the
//! [`SearchPipeline`] performs one GET through a [`Transport`], and the
//! [`ResponseExtractor`] validates the JSON and picks one photo at random.
//! [`ImageFetcher`] then downloads the picked photo.
//!
//! ```no_run
//! use flick_http::HttpClient;
//! use flick_search::{SearchMode, SearchPipeline, SearchSettings};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let http = HttpClient::new("https://api.flickr.com")?;
//! let pipeline = SearchPipeline::new(SearchSettings::new("my-key"), http);
//! let photo = pipeline.run(&SearchMode::phrase("lighthouse")).await?;
//! println!("{} {}", photo.title, photo.image_url);
//! # Ok(())
//! # }
//! ```
pub mod error;
pub mod extract;
pub mod fetch;
pub mod generation;
pub mod pipeline;
pub mod query;
pub mod transport;
pub mod types;

pub use error::{SEARCHING_MESSAGE, SearchError, ValidationIssue};
pub use extract::{FixedPicker, IndexPicker, ResponseExtractor, SeededPicker, ThreadRngPicker};
pub use fetch::{FetchedImage, ImageError, ImageFetcher};
pub use generation::{GenerationTracker, SearchTicket};
pub use pipeline::{SearchPipeline, TrackedOutcome};
pub use query::{BoundingBox, QueryBuilder, SearchMode, SearchRequestParams, SearchSettings};
pub use transport::{Transport, TransportError, TransportResponse};
pub use types::SelectedPhoto;
