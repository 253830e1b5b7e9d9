//! Storefront configuration.
//!
//! Loaded from the process environment by [`SiteConfig::from_env`]:
//!
//! | Variable                   | Default          |
//! |----------------------------|------------------|
//! | `DROP_BIND_ADDR`           | `127.0.0.1:3000` |
//! | `DROP_BRAND`               | `NFT Market Place` |
//! | `SANITY_PROJECT_ID`        | required         |
//! | `SANITY_DATASET`           | `production`     |
//! | `SANITY_API_VERSION`       | `2021-10-21`     |
//! | `SANITY_USE_CDN`           | `true`           |
//! | `SANITY_TOKEN`             | unset            |
//! | `DROP_RPC_URL`             | unset (no wallet) |
//! | `DROP_REFRESH_AFTER_MINT`  | `never`          |
//! | `DROP_SUCCESS_TOAST_SECS`  | `8`              |

use std::net::SocketAddr;
use std::time::Duration;

use drop_chain::RpcConfig;
use drop_content::ContentConfig;
use drop_mint::{MintConfig, RefreshPolicy};

use crate::error::{SiteError, SiteResult};

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Default brand heading.
pub const DEFAULT_BRAND: &str = "NFT Market Place";

/// Configuration for the storefront binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub bind_addr: SocketAddr,
    /// Heading and page title.
    pub brand: String,
    pub content: ContentConfig,
    /// JSON-RPC endpoint for wallet and contracts; `None` disables minting.
    pub rpc: Option<RpcConfig>,
    pub mint: MintConfig,
}

impl SiteConfig {
    /// Creates a configuration with defaults for the given content config.
    pub fn new(content: ContentConfig) -> SiteResult<Self> {
        Ok(Self {
            bind_addr: parse_addr(DEFAULT_BIND_ADDR)?,
            brand: DEFAULT_BRAND.to_string(),
            content,
            rpc: None,
            mint: MintConfig::default(),
        })
    }

    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    pub fn with_rpc(mut self, rpc: RpcConfig) -> Self {
        self.rpc = Some(rpc);
        self
    }

    pub fn with_mint(mut self, mint: MintConfig) -> Self {
        self.mint = mint;
        self
    }

    /// Loads configuration from the process environment.
    pub fn from_env() -> SiteResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from a variable lookup.
    pub fn from_lookup<F>(lookup: F) -> SiteResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let project_id = get("SANITY_PROJECT_ID")
            .ok_or_else(|| SiteError::Config("SANITY_PROJECT_ID is required".to_string()))?;
        let mut content = ContentConfig::new(project_id);
        if let Some(dataset) = get("SANITY_DATASET") {
            content = content.with_dataset(dataset);
        }
        if let Some(version) = get("SANITY_API_VERSION") {
            content = content.with_api_version(version);
        }
        if let Some(use_cdn) = get("SANITY_USE_CDN") {
            content = content.with_cdn(parse_bool("SANITY_USE_CDN", &use_cdn)?);
        }
        if let Some(token) = get("SANITY_TOKEN") {
            content = content.with_token(token);
        }
        content
            .validate()
            .map_err(|e| SiteError::Config(e.to_string()))?;

        let mut config = Self::new(content)?;
        if let Some(addr) = get("DROP_BIND_ADDR") {
            config.bind_addr = parse_addr(&addr)?;
        }
        if let Some(brand) = get("DROP_BRAND") {
            config.brand = brand;
        }
        if let Some(url) = get("DROP_RPC_URL") {
            config.rpc = Some(RpcConfig::new(url));
        }
        if let Some(policy) = get("DROP_REFRESH_AFTER_MINT") {
            let policy: RefreshPolicy = policy
                .parse()
                .map_err(|e: String| SiteError::Config(format!("DROP_REFRESH_AFTER_MINT: {}", e)))?;
            config.mint = config.mint.with_refresh_policy(policy);
        }
        if let Some(secs) = get("DROP_SUCCESS_TOAST_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                SiteError::Config(format!("DROP_SUCCESS_TOAST_SECS is not a number: {}", secs))
            })?;
            config.mint = config.mint.with_success_duration(Duration::from_secs(secs));
        }

        Ok(config)
    }
}

fn parse_addr(addr: &str) -> SiteResult<SocketAddr> {
    addr.trim()
        .parse()
        .map_err(|_| SiteError::Config(format!("invalid bind address: {}", addr)))
}

fn parse_bool(key: &str, value: &str) -> SiteResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(SiteError::Config(format!("{} is not a boolean: {}", key, other))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SiteConfig::from_lookup(lookup(&[("SANITY_PROJECT_ID", "abc123")])).unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:3000".parse().unwrap());
        assert_eq!(config.brand, "NFT Market Place");
        assert_eq!(config.content.project_id, "abc123");
        assert_eq!(config.content.dataset, "production");
        assert!(config.content.use_cdn);
        assert!(config.rpc.is_none());
        assert_eq!(config.mint.refresh_after_mint, RefreshPolicy::Never);
    }

    #[test]
    fn test_requires_project_id() {
        assert!(matches!(
            SiteConfig::from_lookup(lookup(&[])),
            Err(SiteError::Config(_))
        ));
        assert!(SiteConfig::from_lookup(lookup(&[("SANITY_PROJECT_ID", "  ")])).is_err());
    }

    #[test]
    fn test_all_variables() {
        let config = SiteConfig::from_lookup(lookup(&[
            ("SANITY_PROJECT_ID", "abc123"),
            ("SANITY_DATASET", "staging"),
            ("SANITY_API_VERSION", "2023-01-01"),
            ("SANITY_USE_CDN", "false"),
            ("SANITY_TOKEN", "sk-test"),
            ("DROP_BIND_ADDR", "0.0.0.0:8080"),
            ("DROP_BRAND", "Tushar's NFT Market Place"),
            ("DROP_RPC_URL", "http://127.0.0.1:8545"),
            ("DROP_REFRESH_AFTER_MINT", "refetch"),
            ("DROP_SUCCESS_TOAST_SECS", "3"),
        ]))
        .unwrap();

        assert_eq!(config.content.dataset, "staging");
        assert_eq!(config.content.api_version, "2023-01-01");
        assert!(!config.content.use_cdn);
        assert_eq!(config.content.token.as_deref(), Some("sk-test"));
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.brand, "Tushar's NFT Market Place");
        assert_eq!(
            config.rpc.as_ref().map(|r| r.url.as_str()),
            Some("http://127.0.0.1:8545")
        );
        assert_eq!(config.mint.refresh_after_mint, RefreshPolicy::Refetch);
        assert_eq!(config.mint.success_duration, Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_values() {
        let base = [("SANITY_PROJECT_ID", "abc123")];
        for (key, value) in [
            ("DROP_BIND_ADDR", "nowhere"),
            ("SANITY_USE_CDN", "maybe"),
            ("DROP_REFRESH_AFTER_MINT", "sometimes"),
            ("DROP_SUCCESS_TOAST_SECS", "soon"),
            ("SANITY_PROJECT_ID", "bad/id"),
        ] {
            let mut vars = base.to_vec();
            vars.retain(|(k, _)| *k != key);
            vars.push((key, value));
            assert!(
                matches!(SiteConfig::from_lookup(lookup(&vars)), Err(SiteError::Config(_))),
                "{}={} should be rejected",
                key,
                value
            );
        }
    }

    #[test]
    fn test_builders() {
        let config = SiteConfig::new(ContentConfig::new("abc123"))
            .unwrap()
            .with_brand("Drops")
            .with_bind_addr("127.0.0.1:0".parse().unwrap())
            .with_rpc(RpcConfig::new("http://node:8545"))
            .with_mint(MintConfig::default().with_refresh_policy(RefreshPolicy::Optimistic));
        assert_eq!(config.brand, "Drops");
        assert_eq!(config.bind_addr.port(), 0);
        assert!(config.rpc.is_some());
        assert_eq!(config.mint.refresh_after_mint, RefreshPolicy::Optimistic);
    }
}
