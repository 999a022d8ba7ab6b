//! User-facing feedback and read policies.
//!
//! Remote cart mutations report their outcome as a [`Notification`] that the
//! page shows as a toast. Reads that must never fail the page (the cart badge
//! on first load) return a [`SoftRead`], which says whether the value is fresh
//! or a fallback kept from an earlier read.

use serde::{Deserialize, Serialize};

/// Visual weight of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotificationVariant {
    #[default]
    Default,
    Destructive,
}

/// A short message for the visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: NotificationVariant,
}

impl Notification {
    /// A confirmation message.
    #[must_use]
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Default,
        }
    }

    /// A failure message, rendered in the destructive style.
    #[must_use]
    pub fn error(description: impl Into<String>) -> Self {
        Self {
            title: "Error".to_owned(),
            description: description.into(),
            variant: NotificationVariant::Destructive,
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.variant == NotificationVariant::Destructive
    }
}

/// Result of a read whose failure falls back to a default instead of erroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "snake_case")]
pub enum SoftRead<T> {
    /// The read succeeded.
    Fresh(T),
    /// The read failed; this is the fallback value.
    Fallback(T),
}

impl<T> SoftRead<T> {
    /// Build from a fallible read, substituting `fallback` on error.
    pub fn from_result<E>(result: Result<T, E>, fallback: T) -> Self {
        result.map_or(Self::Fallback(fallback), Self::Fresh)
    }

    /// The value, fresh or not.
    pub fn into_value(self) -> T {
        match self {
            Self::Fresh(value) | Self::Fallback(value) => value,
        }
    }

    /// A reference to the value, fresh or not.
    pub const fn value(&self) -> &T {
        match self {
            Self::Fresh(value) | Self::Fallback(value) => value,
        }
    }

    /// Whether the read failed and the value is a fallback.
    pub const fn is_stale(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}
