use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NotificationKind {
    Success,
    Warning,
    Error,
    Info,
    Entry,
    Exit,
    Alert,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NotificationKind::Success => "SUCCESS",
            NotificationKind::Warning => "WARNING",
            NotificationKind::Error => "ERROR",
            NotificationKind::Info => "INFO",
            NotificationKind::Entry => "ENTRY",
            NotificationKind::Exit => "EXIT",
            NotificationKind::Alert => "ALERT",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// A transient event fanned out to subscribers and then discarded. No
/// persistence, no delivery guarantees beyond the bus contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub priority: Priority,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>, priority: Priority) -> Self {
        Self {
            kind,
            message: message.into(),
            priority,
            timestamp: Utc::now(),
        }
    }
}
