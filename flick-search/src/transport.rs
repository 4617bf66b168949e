//! The HTTP capability the pipeline is handed; it never opens sockets itself.
use async_trait::async_trait;
use bytes::Bytes;
use flick_http::{HttpClient, RequestOpts};
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Status and body of a response that did arrive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Option<Bytes>,
}

/// No response arrived (connect, DNS, timeout, truncated body).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<TransportResponse, TransportError>;
}

#[async_trait]
impl Transport for HttpClient {
    async fn get(&self, url: &Url) -> Result<TransportResponse, TransportError> {
        let raw = self
            .get_raw(
                url.as_str(),
                RequestOpts {
                    allow_absolute: true,
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        Ok(TransportResponse {
            status: raw.status.as_u16(),
            body: (!raw.body.is_empty()).then_some(raw.body),
        })
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn get(&self, url: &Url) -> Result<TransportResponse, TransportError> {
        (**self).get(url).await
    }
}
