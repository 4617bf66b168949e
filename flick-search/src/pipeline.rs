//! validate → build URL → one GET → extract.
//!
//! A pipeline holds no mutable state and may be shared behind an `Arc` by
//! concurrent searches. It never retries: one `run` is at most one request.
use crate::error::SearchError;
use crate::extract::{IndexPicker, ResponseExtractor, ThreadRngPicker};
use crate::generation::{GenerationTracker, SearchTicket};
use crate::query::{QueryBuilder, SearchMode, SearchSettings};
use crate::transport::Transport;
use crate::types::SelectedPhoto;
use std::time::Instant;

/// Result of a search together with the ticket it was started under.
#[derive(Debug)]
pub struct TrackedOutcome {
    pub ticket: SearchTicket,
    pub result: Result<SelectedPhoto, SearchError>,
}

impl TrackedOutcome {
    /// False once a newer search has begun; such results should be dropped.
    pub fn is_current(&self, tracker: &GenerationTracker) -> bool {
        tracker.is_current(&self.ticket)
    }
}

pub struct SearchPipeline<T, P = ThreadRngPicker> {
    builder: QueryBuilder,
    transport: T,
    extractor: ResponseExtractor<P>,
}

impl<T: Transport> SearchPipeline<T, ThreadRngPicker> {
    pub fn new(settings: SearchSettings, transport: T) -> Self {
        Self::with_picker(settings, transport, ThreadRngPicker)
    }
}

impl<T: Transport, P: IndexPicker> SearchPipeline<T, P> {
    pub fn with_picker(settings: SearchSettings, transport: T, picker: P) -> Self {
        Self {
            builder: QueryBuilder::new(settings),
            transport,
            extractor: ResponseExtractor::with_picker(picker),
        }
    }

    pub fn query_builder(&self) -> &QueryBuilder {
        &self.builder
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn run(&self, mode: &SearchMode) -> Result<SelectedPhoto, SearchError> {
        if let Err(err) = mode.validate() {
            tracing::info!(mode = mode.kind(), error = %err, "flickr.search.rejected");
            return Err(err);
        }

        let url = self.builder.build_url(mode);
        let started = Instant::now();
        tracing::info!(
            target: "flick.search",
            mode = mode.kind(),
            url = %flick_http::redact_url(&url),
            "flickr.search.start"
        );

        let (status, body, transport_error) = match self.transport.get(&url).await {
            Ok(resp) => (resp.status, resp.body, None),
            Err(err) => (0, None, Some(err)),
        };
        let result = self
            .extractor
            .extract(status, body.as_deref(), transport_error.as_ref());

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(photo) => tracing::info!(
                target: "flick.search",
                mode = mode.kind(),
                status,
                elapsed_ms,
                title = %photo.title,
                image_url = %photo.image_url,
                "flickr.search.success"
            ),
            Err(err) => tracing::warn!(
                target: "flick.search",
                mode = mode.kind(),
                status,
                elapsed_ms,
                kind = err.kind(),
                error = %err,
                "flickr.search.error"
            ),
        }
        result
    }

    /// [`run`](Self::run) under a fresh ticket from `tracker`.
    pub async fn run_tracked(
        &self,
        mode: &SearchMode,
        tracker: &GenerationTracker,
    ) -> TrackedOutcome {
        let ticket = tracker.begin();
        let result = self.run(mode).await;
        if !tracker.is_current(&ticket) {
            tracing::debug!(
                generation = ticket.generation,
                latest = tracker.current(),
                "flickr.search.superseded"
            );
        }
        TrackedOutcome { ticket, result }
    }
}
