//! Mint workflow configuration.

use std::str::FromStr;
use std::time::Duration;

/// Default lifetime of a success toast.
pub const DEFAULT_SUCCESS_DURATION: Duration = Duration::from_secs(8);

/// Default lifetime of an error toast.
pub const DEFAULT_ERROR_DURATION: Duration = Duration::from_secs(4);

pub const MINTING_MESSAGE: &str = "Minting...";
pub const SUCCESS_MESSAGE: &str = "HOORAY.. You Successfully Minted!";
pub const FAILURE_MESSAGE: &str = "Whoops... Something went wrong!";

/// What happens to the displayed supply after a successful mint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPolicy {
    /// Keep the counts from the last load.
    #[default]
    Never,
    /// Re-read claimed tokens, supply and conditions from the contract.
    Refetch,
    /// Add the minted quantity to the claimed count locally.
    Optimistic,
}

impl FromStr for RefreshPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "never" => Ok(RefreshPolicy::Never),
            "refetch" => Ok(RefreshPolicy::Refetch),
            "optimistic" => Ok(RefreshPolicy::Optimistic),
            other => Err(format!("unknown refresh policy: {}", other)),
        }
    }
}

/// Notification texts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintMessages {
    pub in_progress: String,
    pub success: String,
    pub failure: String,
}

impl Default for MintMessages {
    fn default() -> Self {
        Self {
            in_progress: MINTING_MESSAGE.to_string(),
            success: SUCCESS_MESSAGE.to_string(),
            failure: FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Configuration for [`MintWorkflow`](crate::workflow::MintWorkflow).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintConfig {
    /// Tokens claimed per mint.
    pub quantity: u64,
    pub refresh_after_mint: RefreshPolicy,
    /// Lifetime of success toasts.
    pub success_duration: Duration,
    /// Lifetime of error toasts.
    pub error_duration: Duration,
    pub messages: MintMessages,
}

impl Default for MintConfig {
    fn default() -> Self {
        Self {
            quantity: 1,
            refresh_after_mint: RefreshPolicy::Never,
            success_duration: DEFAULT_SUCCESS_DURATION,
            error_duration: DEFAULT_ERROR_DURATION,
            messages: MintMessages::default(),
        }
    }
}

impl MintConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_refresh_policy(mut self, policy: RefreshPolicy) -> Self {
        self.refresh_after_mint = policy;
        self
    }

    pub fn with_success_duration(mut self, duration: Duration) -> Self {
        self.success_duration = duration;
        self
    }

    pub fn with_error_duration(mut self, duration: Duration) -> Self {
        self.error_duration = duration;
        self
    }

    pub fn with_messages(mut self, messages: MintMessages) -> Self {
        self.messages = messages;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MintConfig::default();
        assert_eq!(config.quantity, 1);
        assert_eq!(config.refresh_after_mint, RefreshPolicy::Never);
        assert_eq!(config.success_duration, Duration::from_secs(8));
        assert_eq!(config.messages.in_progress, "Minting...");
        assert_eq!(config.messages.success, "HOORAY.. You Successfully Minted!");
        assert_eq!(config.messages.failure, "Whoops... Something went wrong!");
    }

    #[test]
    fn test_refresh_policy_from_str() {
        assert_eq!("never".parse::<RefreshPolicy>().unwrap(), RefreshPolicy::Never);
        assert_eq!("Refetch".parse::<RefreshPolicy>().unwrap(), RefreshPolicy::Refetch);
        assert_eq!(
            "OPTIMISTIC".parse::<RefreshPolicy>().unwrap(),
            RefreshPolicy::Optimistic
        );
        assert!("sometimes".parse::<RefreshPolicy>().is_err());
    }

    #[test]
    fn test_builders() {
        let config = MintConfig::new()
            .with_refresh_policy(RefreshPolicy::Optimistic)
            .with_success_duration(Duration::from_secs(2))
            .with_error_duration(Duration::from_secs(1));
        assert_eq!(config.refresh_after_mint, RefreshPolicy::Optimistic);
        assert_eq!(config.success_duration, Duration::from_secs(2));
        assert_eq!(config.error_duration, Duration::from_secs(1));
    }
}
