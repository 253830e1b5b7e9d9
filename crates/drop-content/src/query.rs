//! GROQ queries issued by the storefront.
//!
//! Both queries project the same field set so listing cards and the detail
//! page decode into the same [`Collection`](crate::types::Collection) type.

use serde_json::Value;

/// Name of the slug parameter in [`collection_by_slug_query`].
pub const SLUG_PARAM: &str = "id";

/// Field projection shared by all collection queries.
pub const COLLECTION_PROJECTION: &str = r#"{
  _id,
  title,
  address,
  description,
  nftCollectionName,
  mainImage {
    asset
  },
  previewImage {
    asset
  },
  slug {
    current
  },
  creator-> {
    _id,
    name,
    address,
    slug {
      current
    }
  }
}"#;

/// Query for every collection document.
pub fn all_collections_query() -> String {
    format!(r#"*[_type == "collection"] {}"#, COLLECTION_PROJECTION)
}

/// Query for the first collection whose slug equals `$id`.
///
/// Evaluates to `null` when nothing matches.
pub fn collection_by_slug_query() -> String {
    format!(
        r#"*[_type == "collection" && slug.current == ${}][0] {}"#,
        SLUG_PARAM, COLLECTION_PROJECTION
    )
}

/// Named query parameters.
///
/// Values are JSON; on the wire each one becomes `$name=<json>`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    entries: Vec<(String, Value)>,
}

impl QueryParams {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a parameter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
        self
    }

    /// Looks up a parameter by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Query-string pairs in insertion order: (`$name`, JSON-encoded value).
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(name, value)| (format!("${}", name), value.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_collections_query() {
        let query = all_collections_query();
        assert!(query.starts_with(r#"*[_type == "collection"] {"#));
        assert!(!query.contains("[0]"));
        assert!(query.contains("nftCollectionName"));
        assert!(query.contains("creator-> {"));
    }

    #[test]
    fn test_collection_by_slug_query() {
        let query = collection_by_slug_query();
        assert!(query.starts_with(r#"*[_type == "collection" && slug.current == $id][0] {"#));
    }

    #[test]
    fn test_projection_fields() {
        for field in [
            "_id",
            "title",
            "address",
            "description",
            "nftCollectionName",
            "mainImage",
            "previewImage",
            "slug",
            "creator->",
            "current",
        ] {
            assert!(COLLECTION_PROJECTION.contains(field), "missing {}", field);
        }
    }

    #[test]
    fn test_query_params() {
        let params = QueryParams::new()
            .with("id", "ape-yacht")
            .with("limit", 3)
            .with("id", "other");

        assert_eq!(params.get("id"), Some(&Value::from("other")));
        assert_eq!(
            params.to_query_pairs(),
            vec![
                ("$id".to_string(), "\"other\"".to_string()),
                ("$limit".to_string(), "3".to_string()),
            ]
        );
        assert!(QueryParams::new().is_empty());
    }
}
