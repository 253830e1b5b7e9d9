//! URL routing.
//!
//! | Method | Path                   | Route           |
//! |--------|------------------------|-----------------|
//! | GET    | `/`                    | `Listing`       |
//! | GET    | `/nft/<slug>`          | `Detail`        |
//! | POST   | `/nft/<slug>/mint`     | `Mint`          |
//! | POST   | `/nft/<slug>/session`  | `ToggleSession` |
//! | GET    | `/healthz`             | `Health`        |

/// A resolved route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Listing,
    Detail { slug: String },
    Mint { slug: String },
    ToggleSession { slug: String },
    Health,
    /// Known path, wrong method. Carries the allowed method.
    MethodNotAllowed { allow: &'static str },
    NotFound,
}

impl Route {
    /// Resolves a method and path. A single trailing slash is ignored.
    pub fn parse(method: &str, path: &str) -> Self {
        let path = match path.strip_suffix('/') {
            Some(stripped) if !stripped.is_empty() => stripped,
            _ => path,
        };
        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

        let (route, allow) = match segments.as_slice() {
            [""] => (Route::Listing, "GET"),
            ["healthz"] => (Route::Health, "GET"),
            ["nft", slug] if !slug.is_empty() => (
                Route::Detail {
                    slug: slug.to_string(),
                },
                "GET",
            ),
            ["nft", slug, "mint"] if !slug.is_empty() => (
                Route::Mint {
                    slug: slug.to_string(),
                },
                "POST",
            ),
            ["nft", slug, "session"] if !slug.is_empty() => (
                Route::ToggleSession {
                    slug: slug.to_string(),
                },
                "POST",
            ),
            _ => return Route::NotFound,
        };

        let method_ok = method == allow || (allow == "GET" && method == "HEAD");
        if method_ok {
            route
        } else {
            Route::MethodNotAllowed { allow }
        }
    }
}

/// Path of a collection's detail page.
pub fn collection_path(slug: &str) -> String {
    format!("/nft/{}", slug)
}

pub fn mint_path(slug: &str) -> String {
    format!("/nft/{}/mint", slug)
}

pub fn session_path(slug: &str) -> String {
    format!("/nft/{}/session", slug)
}
