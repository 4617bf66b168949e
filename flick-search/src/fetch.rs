//! Download and decode the photo a search selected.
use crate::types::SelectedPhoto;
use bytes::Bytes;
use flick_http::{HttpClient, HttpError};
use image::{GenericImageView, ImageFormat};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("invalid image url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("image download failed: {0}")]
    Fetch(#[from] HttpError),
    #[error("image decode failed: {0}")]
    Decode(String),
}

/// Raw bytes of a photo plus what decoding learned about them.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub bytes: Bytes,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

impl FetchedImage {
    /// Conventional file extension for the detected format, e.g. `jpg`.
    pub fn extension(&self) -> &'static str {
        self.format.extensions_str().first().copied().unwrap_or("img")
    }
}

#[derive(Debug, Clone)]
pub struct ImageFetcher {
    http: HttpClient,
}

impl ImageFetcher {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn fetch(&self, photo: &SelectedPhoto) -> Result<FetchedImage, ImageError> {
        let url = Url::parse(&photo.image_url).map_err(|e| ImageError::InvalidUrl {
            url: photo.image_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ImageError::InvalidUrl {
                url: photo.image_url.clone(),
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }

        let bytes = self.http.get_bytes(url.as_str()).await?;
        let image = decode(bytes)?;
        tracing::info!(
            url = %url,
            format = ?image.format,
            width = image.width,
            height = image.height,
            size = image.bytes.len(),
            "flickr.image.fetched"
        );
        Ok(image)
    }
}

/// Sniff the format from the leading bytes and decode fully to learn the dimensions.
pub fn decode(bytes: Bytes) -> Result<FetchedImage, ImageError> {
    let format = image::guess_format(&bytes).map_err(|e| ImageError::Decode(e.to_string()))?;
    let decoded = image::load_from_memory_with_format(&bytes, format)
        .map_err(|e| ImageError::Decode(e.to_string()))?;
    let (width, height) = decoded.dimensions();
    Ok(FetchedImage {
        bytes,
        format,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_pixel(width, height, Rgb([200u8, 30, 30]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn decodes_png_dimensions() {
        let got = decode(Bytes::from(png(4, 3))).unwrap();
        assert_eq!(got.format, ImageFormat::Png);
        assert_eq!((got.width, got.height), (4, 3));
        assert_eq!(got.extension(), "png");
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(
            decode(Bytes::from_static(b"<html>not an image</html>")),
            Err(ImageError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn rejects_non_http_urls_before_fetching() {
        let fetcher = ImageFetcher::new(HttpClient::new("http://127.0.0.1:9").unwrap());
        for bad in ["", "not a url", "file:///etc/passwd"] {
            let photo = SelectedPhoto {
                title: "t".into(),
                image_url: bad.into(),
            };
            assert!(matches!(
                fetcher.fetch(&photo).await,
                Err(ImageError::InvalidUrl { .. })
            ));
        }
    }
}
