// ABOUTME: Phantom-typed identifiers for compile-time type safety.
// ABOUTME: Prevents accidental swapping of environment, notification, backup, and preview IDs.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Marker types for phantom type parameters.
/// Using empty enums prevents instantiation and requires no trait bounds.
pub enum EnvironmentMarker {}
pub enum NotificationMarker {}
pub enum BackupMarker {}
pub enum PreviewMarker {}

/// A type-safe identifier that prevents accidental mixing of different ID types.
///
/// A `NotificationId` cannot be passed where an `EnvironmentId` is expected,
/// even though both are opaque UUID strings on the wire.
#[must_use = "IDs reference remote resources and should not be ignored"]
pub struct Id<T> {
    value: String,
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_inner(self) -> String {
        self.value
    }
}

impl NotificationId {
    /// Extract a notification ID from a notification link.
    ///
    /// Operation responses only carry a link such as
    /// `https://cloud.acquia.com/api/notifications/<uuid>`; the ID is its
    /// last path segment.
    pub fn from_href(href: &str) -> Self {
        let trimmed = href.trim_end_matches('/');
        let last = trimmed.rsplit('/').next().unwrap_or(trimmed);
        Self::new(last)
    }
}

// Manual trait implementations that don't require T to implement the trait.

impl<T> std::fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Id").field("value", &self.value).finish()
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> std::fmt::Display for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::new(value))
    }
}

pub type EnvironmentId = Id<EnvironmentMarker>;
pub type NotificationId = Id<NotificationMarker>;
pub type BackupId = Id<BackupMarker>;
pub type PreviewId = Id<PreviewMarker>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_id_from_href_takes_last_segment() {
        let id = NotificationId::from_href(
            "https://cloud.acquia.com/api/notifications/42b56cff-0b55-4bdf-a949-1fd0fca61c6c",
        );
        assert_eq!(id.as_str(), "42b56cff-0b55-4bdf-a949-1fd0fca61c6c");
    }

    #[test]
    fn notification_id_from_href_ignores_trailing_slash() {
        let id = NotificationId::from_href("https://example.com/notifications/abc/");
        assert_eq!(id.as_str(), "abc");
    }

    #[test]
    fn notification_id_from_bare_id() {
        assert_eq!(NotificationId::from_href("abc").as_str(), "abc");
    }
}
