//! Image URL resolution for content assets.
//!
//! Asset references encode everything needed to build a CDN URL:
//!
//! ```text
//! image-Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000-jpg
//!       └──────── asset id ────┘ └ dims ┘ └fmt┘
//!
//! https://cdn.sanity.io/images/<project>/<dataset>/Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000.jpg
//! ```

use crate::error::{ContentError, ContentResult};
use crate::types::Image;

/// Default CDN base for image assets.
pub const DEFAULT_IMAGE_CDN: &str = "https://cdn.sanity.io/images";

/// Parsed parts of an image asset reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub format: String,
}

impl AssetRef {
    /// Parses `image-<id>-<W>x<H>-<format>`.
    pub fn parse(reference: &str) -> ContentResult<Self> {
        let invalid = || ContentError::InvalidImageRef(reference.to_string());

        let rest = reference.strip_prefix("image-").ok_or_else(invalid)?;
        let (rest, format) = rest.rsplit_once('-').ok_or_else(invalid)?;
        let (id, dims) = rest.rsplit_once('-').ok_or_else(invalid)?;
        let (width, height) = dims.split_once('x').ok_or_else(invalid)?;

        if id.is_empty() || format.is_empty() || !format.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(invalid());
        }

        Ok(Self {
            id: id.to_string(),
            width: width.parse().map_err(|_| invalid())?,
            height: height.parse().map_err(|_| invalid())?,
            format: format.to_string(),
        })
    }

    /// File name on the CDN: `<id>-<W>x<H>.<format>`.
    pub fn file_name(&self) -> String {
        format!("{}-{}x{}.{}", self.id, self.width, self.height, self.format)
    }
}

/// Builds displayable URLs for image fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUrlBuilder {
    base_url: String,
    project_id: String,
    dataset: String,
    width: Option<u32>,
    height: Option<u32>,
}

impl ImageUrlBuilder {
    /// Creates a builder for the given project and dataset.
    pub fn new(project_id: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_IMAGE_CDN.to_string(),
            project_id: project_id.into(),
            dataset: dataset.into(),
            width: None,
            height: None,
        }
    }

    /// Overrides the CDN base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Requests a resized width.
    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    /// Requests a resized height.
    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    /// Resolves an image field to a URL.
    pub fn url(&self, image: &Image) -> ContentResult<String> {
        let reference = image
            .reference()
            .ok_or_else(|| ContentError::InvalidImageRef("image has no asset".to_string()))?;
        self.url_for_ref(reference)
    }

    /// Resolves a raw asset reference to a URL.
    pub fn url_for_ref(&self, reference: &str) -> ContentResult<String> {
        let asset = AssetRef::parse(reference)?;
        let mut url = format!(
            "{}/{}/{}/{}",
            self.base_url,
            self.project_id,
            self.dataset,
            asset.file_name()
        );

        let mut sep = '?';
        if let Some(w) = self.width {
            url.push_str(&format!("{}w={}", sep, w));
            sep = '&';
        }
        if let Some(h) = self.height {
            url.push_str(&format!("{}h={}", sep, h));
        }

        Ok(url)
    }
}
