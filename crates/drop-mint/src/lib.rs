//! # drop-mint
//!
//! Mint workflow for a single NFT drop view.
//!
//! [`MintWorkflow`] ties together a [`WalletSession`](drop_chain::WalletSession),
//! a [`DropContract`](drop_chain::DropContract) and a [`Notifier`]. It loads the
//! drop's supply and price, gates the mint control, claims one token and
//! reports progress through notifications.
//!
//! The mint control is enabled exactly when the supply has loaded, the drop
//! is not sold out and a wallet is connected; see [`MintState::can_mint`].

pub mod config;
pub mod error;
pub mod notify;
pub mod state;
pub mod workflow;

pub use config::{MintConfig, MintMessages, RefreshPolicy};
pub use error::{MintError, MintResult};
pub use notify::{
    NotificationHandle, NotificationKind, Notifier, RecordingNotifier, Toast, ToastBoard,
};
pub use state::{MintButton, MintPhase, MintState};
pub use workflow::MintWorkflow;
