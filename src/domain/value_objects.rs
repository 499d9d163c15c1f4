//! Value Objects - Immutable domain primitives

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reachability of the metrics engine, derived from the latest applied poll.
///
/// There is no intermediate state. Before the first poll completes the
/// health is simply absent (`Option::None`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionHealth {
    /// Last poll succeeded
    Online,
    /// Last poll failed (transport error, bad status or bad payload)
    Offline,
}

impl ConnectionHealth {
    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online)
    }

    /// Label shown on the dashboard status badge.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Online => "Engine Active",
            Self::Offline => "System Offline",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }
}

impl fmt::Display for ConnectionHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_online() {
        assert!(ConnectionHealth::Online.is_online());
        assert!(!ConnectionHealth::Offline.is_online());
    }

    #[test]
    fn test_labels() {
        assert_eq!(ConnectionHealth::Online.label(), "Engine Active");
        assert_eq!(ConnectionHealth::Offline.label(), "System Offline");
    }

    #[test]
    fn test_display() {
        assert_eq!(ConnectionHealth::Online.to_string(), "online");
        assert_eq!(format!("{}", ConnectionHealth::Offline), "offline");
    }
}
