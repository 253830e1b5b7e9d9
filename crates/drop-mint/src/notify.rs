//! User notifications.
//!
//! The workflow only needs to post a notification and later dismiss it by
//! handle. [`ToastBoard`] keeps them in memory with per-kind lifetimes so a
//! page can render whatever is currently showing.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tracing::debug;

/// Kind of notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// In-progress; stays until dismissed.
    Loading,
    Success,
    Error,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Loading => "loading",
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
        }
    }
}

/// Handle returned by [`Notifier::notify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationHandle(pub u64);

/// Something that can show and dismiss notifications.
pub trait Notifier: Send + Sync {
    /// Shows a notification and returns its handle.
    fn notify(&self, kind: NotificationKind, message: &str) -> NotificationHandle;

    /// Removes a notification. Unknown handles are ignored.
    fn dismiss(&self, handle: NotificationHandle);
}

/// A notification currently on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub handle: NotificationHandle,
    pub kind: NotificationKind,
    pub message: String,
    /// `None` for toasts that stay until dismissed.
    pub expires_at: Option<Instant>,
}

impl Toast {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// In-memory notifier with expiry.
#[derive(Debug)]
pub struct ToastBoard {
    toasts: Mutex<Vec<Toast>>,
    next_handle: AtomicU64,
    success_duration: Duration,
    error_duration: Duration,
}

impl Default for ToastBoard {
    fn default() -> Self {
        Self::new(
            crate::config::DEFAULT_SUCCESS_DURATION,
            crate::config::DEFAULT_ERROR_DURATION,
        )
    }
}

impl ToastBoard {
    pub fn new(success_duration: Duration, error_duration: Duration) -> Self {
        Self {
            toasts: Mutex::new(Vec::new()),
            next_handle: AtomicU64::new(1),
            success_duration,
            error_duration,
        }
    }

    fn lifetime(&self, kind: NotificationKind) -> Option<Duration> {
        match kind {
            NotificationKind::Loading => None,
            NotificationKind::Success => Some(self.success_duration),
            NotificationKind::Error => Some(self.error_duration),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Toast>> {
        self.toasts.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Toasts that have not expired, oldest first. Expired ones are dropped.
    pub fn active(&self) -> Vec<Toast> {
        self.active_at(Instant::now())
    }

    /// Like [`active`](Self::active) with an explicit clock.
    pub fn active_at(&self, now: Instant) -> Vec<Toast> {
        let mut toasts = self.lock();
        toasts.retain(|t| !t.is_expired(now));
        toasts.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.active().is_empty()
    }
}

impl Notifier for ToastBoard {
    fn notify(&self, kind: NotificationKind, message: &str) -> NotificationHandle {
        let handle = NotificationHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        let expires_at = self.lifetime(kind).map(|d| Instant::now() + d);
        self.lock().push(Toast {
            handle,
            kind,
            message: message.to_string(),
            expires_at,
        });
        debug!(handle = handle.0, kind = kind.as_str(), "toast posted");
        handle
    }

    fn dismiss(&self, handle: NotificationHandle) {
        self.lock().retain(|t| t.handle != handle);
    }
}

/// Notifier that records everything, for tests.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    posted: Mutex<Vec<(NotificationHandle, NotificationKind, String)>>,
    dismissed: Mutex<Vec<NotificationHandle>>,
    next_handle: AtomicU64,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of notifications of `kind` posted so far.
    pub fn count(&self, kind: NotificationKind) -> usize {
        self.posted
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .count()
    }

    /// Messages posted so far, in order.
    pub fn messages(&self) -> Vec<(NotificationKind, String)> {
        self.posted
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .iter()
            .map(|(_, k, m)| (*k, m.clone()))
            .collect()
    }

    /// Handles posted with `kind`.
    pub fn handles(&self, kind: NotificationKind) -> Vec<NotificationHandle> {
        self.posted
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(h, _, _)| *h)
            .collect()
    }

    pub fn is_dismissed(&self, handle: NotificationHandle) -> bool {
        self.dismissed
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .contains(&handle)
    }

    /// Loading notifications that were never dismissed.
    pub fn open_loading(&self) -> usize {
        self.handles(NotificationKind::Loading)
            .into_iter()
            .filter(|h| !self.is_dismissed(*h))
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) -> NotificationHandle {
        let handle = NotificationHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        self.posted
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push((handle, kind, message.to_string()));
        handle
    }

    fn dismiss(&self, handle: NotificationHandle) {
        self.dismissed
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_notify_and_dismiss() {
        let board = ToastBoard::default();
        let loading = board.notify(NotificationKind::Loading, "Minting...");
        let done = board.notify(NotificationKind::Success, "done");
        assert_ne!(loading, done);
        assert_eq!(board.active().len(), 2);

        board.dismiss(loading);
        let active = board.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].message, "done");

        // dismissing twice is harmless
        board.dismiss(loading);
        assert_eq!(board.active().len(), 1);
    }

    #[test]
    fn test_board_expiry() {
        let board = ToastBoard::new(Duration::from_secs(8), Duration::from_secs(4));
        board.notify(NotificationKind::Loading, "Minting...");
        board.notify(NotificationKind::Success, "yay");
        board.notify(NotificationKind::Error, "nope");

        let now = Instant::now();
        assert_eq!(board.active_at(now).len(), 3);

        let kinds: Vec<_> = board
            .active_at(now + Duration::from_secs(5))
            .into_iter()
            .map(|t| t.kind)
            .collect();
        assert_eq!(kinds, vec![NotificationKind::Loading, NotificationKind::Success]);

        let kinds: Vec<_> = board
            .active_at(now + Duration::from_secs(60))
            .into_iter()
            .map(|t| t.kind)
            .collect();
        assert_eq!(kinds, vec![NotificationKind::Loading]);
    }

    #[test]
    fn test_recording_notifier() {
        let notifier = RecordingNotifier::new();
        let loading = notifier.notify(NotificationKind::Loading, "Minting...");
        notifier.notify(NotificationKind::Error, "Whoops");
        assert_eq!(notifier.count(NotificationKind::Loading), 1);
        assert_eq!(notifier.count(NotificationKind::Error), 1);
        assert_eq!(notifier.count(NotificationKind::Success), 0);
        assert_eq!(notifier.open_loading(), 1);

        notifier.dismiss(loading);
        assert!(notifier.is_dismissed(loading));
        assert_eq!(notifier.open_loading(), 0);
        assert_eq!(notifier.messages()[1], (NotificationKind::Error, "Whoops".to_string()));
    }
}
