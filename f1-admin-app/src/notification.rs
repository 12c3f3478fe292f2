//! Transient user facing messages.
//!
//! Notifications never block the caller. They expire on their own after the
//! configured display duration and can be dismissed earlier.

use core::fmt::{self, Display};
use core::time::Duration;

use f1_admin_config::Config;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    /// The requested record already exists. Not an error from the user's
    /// point of view.
    Conflict,
    InvalidSelection,
    Failure,
    Validation,
}

impl Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Conflict => "conflict",
            Self::InvalidSelection => "invalid selection",
            Self::Failure => "error",
            Self::Validation => "validation",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NotificationId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub expires_at: Instant,
}

impl Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.title, self.message)
    }
}

#[derive(Debug)]
pub struct NotificationCenter {
    duration: Duration,
    next_id: u64,
    notifications: Vec<Notification>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(Duration::from_millis(
            f1_admin_config::DEFAULT_NOTIFICATION_DURATION_MS,
        ))
    }
}

impl NotificationCenter {
    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self {
            duration,
            next_id: 0,
            notifications: Vec::new(),
        }
    }

    #[must_use]
    pub const fn from_config(config: &Config) -> Self {
        Self::new(config.notification_duration())
    }

    pub fn push(
        &mut self,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> NotificationId {
        let id = NotificationId(self.next_id);
        self.next_id += 1;
        self.notifications.push(Notification {
            id,
            kind,
            title: title.into(),
            message: message.into(),
            expires_at: Instant::now() + self.duration,
        });
        id
    }

    /// Returns `false` if the notification already expired or was dismissed.
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        let before = self.notifications.len();
        self.notifications.retain(|notification| notification.id != id);
        self.notifications.len() != before
    }

    /// Drops expired notifications and returns the remaining ones, oldest first.
    pub fn active(&mut self) -> &[Notification] {
        let now = Instant::now();
        self.notifications
            .retain(|notification| notification.expires_at > now);
        &self.notifications
    }

    /// Removes and returns all notifications that have not expired yet.
    pub fn drain(&mut self) -> Vec<Notification> {
        self.active();
        core::mem::take(&mut self.notifications)
    }
}
