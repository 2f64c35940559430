//! Downloading images referenced by URL.

use crate::error::{Error, Result};
use futures_util::StreamExt;
use reqwest::Client;
use tracing::debug;

/// Download `url` into memory, failing once more than `limit` bytes arrive.
pub async fn fetch_image(client: &Client, url: &str, limit: usize) -> Result<Vec<u8>> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| Error::ImageFetch {
            url: url.to_string(),
            source: Box::new(e),
        })?;

    if !response.status().is_success() {
        return Err(Error::ImageFetch {
            url: url.to_string(),
            source: format!("HTTP {}", response.status()).into(),
        });
    }

    let too_large = || Error::ImageTooLarge {
        url: url.to_string(),
        limit,
    };

    if response
        .content_length()
        .is_some_and(|len| len > limit as u64)
    {
        return Err(too_large());
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| Error::ImageFetch {
            url: url.to_string(),
            source: Box::new(e),
        })?;

        if bytes.len() + chunk.len() > limit {
            return Err(too_large());
        }
        bytes.extend_from_slice(&chunk);
    }

    debug!("Fetched {} bytes from {url}", bytes.len());
    Ok(bytes)
}
