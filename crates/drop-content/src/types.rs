//! Collection records as projected by the content queries.
//!
//! Field names follow the API documents (`_id`, `nftCollectionName`, ...)
//! through serde renames so the Rust side keeps snake_case.

use serde::{Deserialize, Deserializer, Serialize};

/// A URL slug wrapper, stored by the API as `{ "current": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Slug {
    /// The slug string used in URLs.
    pub current: String,
}

impl Slug {
    /// Creates a slug.
    pub fn new(current: impl Into<String>) -> Self {
        Self {
            current: current.into(),
        }
    }

    /// Returns the slug string.
    pub fn as_str(&self) -> &str {
        &self.current
    }
}

impl std::fmt::Display for Slug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.current)
    }
}

/// Reference to an uploaded image asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    /// Asset document id, e.g. `image-Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000-jpg`.
    #[serde(rename = "_ref")]
    pub reference: String,
    /// Reference type, normally `reference`.
    #[serde(rename = "_type", default)]
    pub kind: String,
}

/// An image field. The asset is absent when the editor left the field empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Image {
    #[serde(default)]
    pub asset: Option<ImageAsset>,
}

impl Image {
    /// Creates an image pointing at the given asset reference.
    pub fn from_ref(reference: impl Into<String>) -> Self {
        Self {
            asset: Some(ImageAsset {
                reference: reference.into(),
                kind: "reference".to_string(),
            }),
        }
    }

    /// Returns the asset reference, if any.
    pub fn reference(&self) -> Option<&str> {
        self.asset.as_ref().map(|a| a.reference.as_str())
    }
}

/// The creator of a collection, resolved from a reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    /// Creator wallet address.
    pub address: String,
    pub slug: Slug,
    /// Not projected by the storefront queries.
    #[serde(default)]
    pub bio: Option<String>,
    /// Not projected by the storefront queries.
    #[serde(default)]
    pub image: Option<Image>,
}

/// A collection (drop) record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Display name of the NFT collection.
    #[serde(rename = "nftCollectionName", default, deserialize_with = "null_as_default")]
    pub nft_collection_name: String,
    /// On-chain address of the drop contract. Empty when unset.
    #[serde(default, deserialize_with = "null_as_default")]
    pub address: String,
    pub slug: Slug,
    /// `None` when the creator reference is missing or dangling.
    #[serde(default)]
    pub creator: Option<Creator>,
    #[serde(rename = "mainImage", default, deserialize_with = "null_as_default")]
    pub main_image: Image,
    #[serde(rename = "previewImage", default, deserialize_with = "null_as_default")]
    pub preview_image: Image,
}

/// Projections of unset fields come back as `null` rather than being omitted.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Collection {
    /// Storefront path of the collection's detail page.
    pub fn path(&self) -> String {
        format!("/nft/{}", self.slug.current)
    }
}
