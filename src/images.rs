//! Placeholder image URLs for the games.

use crate::error::{GameError, Result};
use chrono::Utc;
use url::Url;

const PICSUM_BASE: &str = "https://picsum.photos/";

pub trait ImageSource
{
    fn fetch_random_image(&mut self, query: &str, width: u32, height: u32) -> Result<String>;

    /// Checks that `url` can actually be shown. Failing here is a load
    /// failure, distinct from failing to produce the URL at all.
    fn preload(&mut self, url: &str) -> Result<()>;

    fn fetch_multiple_images(
        &mut self,
        count: usize,
        query: &str,
        width: u32,
        height: u32,
    ) -> Result<Vec<String>>
    {
        (0..count)
            .map(|_| self.fetch_random_image(query, width, height))
            .collect()
    }
}

/// Lorem Picsum random photos. No API key, no network access until the
/// URL is opened.
pub struct PicsumSource
{
    base: String,
    counter: u64,
}

impl PicsumSource
{
    pub fn new() -> Self
    {
        Self::with_base(PICSUM_BASE)
    }

    pub fn with_base(base: &str) -> Self
    {
        Self {
            base: base.to_string(),
            counter: 0,
        }
    }

    fn nonce(&mut self) -> u64
    {
        self.counter += 1;
        let millis = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        millis.wrapping_mul(1000).wrapping_add(self.counter)
    }
}

impl Default for PicsumSource
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl ImageSource for PicsumSource
{
    fn fetch_random_image(&mut self, query: &str, width: u32, height: u32) -> Result<String>
    {
        if width == 0 || height == 0 {
            return Err(GameError::ImageFetch {
                query: query.to_string(),
                reason: format!("invalid size {width}x{height}"),
            });
        }
        let nonce = self.nonce();
        let url = format!("{}{width}/{height}?random={nonce}", self.base);
        tracing::debug!(query, %url, "picked image");
        Ok(url)
    }

    fn preload(&mut self, url: &str) -> Result<()>
    {
        let parsed = Url::parse(url).map_err(|err| GameError::ImageLoad {
            url: url.to_string(),
            reason: err.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            tracing::warn!(%url, "image url is not loadable");
            return Err(GameError::ImageLoad {
                url: url.to_string(),
                reason: "not an http(s) image url".to_string(),
            });
        }
        Ok(())
    }
}
