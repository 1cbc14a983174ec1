//! Location domain model.
//!
//! Cameras optionally reference a physical location. The lifecycle
//! orchestrator only needs existence/active checks and the display name, so
//! the model stays minimal here.

use serde::{Deserialize, Serialize};

/// A physical site a camera can be assigned to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub is_active: bool,
    pub is_deleted: bool,
}

impl Location {
    /// Whether cameras may be assigned to this location.
    pub fn is_assignable(&self) -> bool {
        self.is_active && !self.is_deleted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_assignable() {
        let mut location = Location {
            id: 1,
            name: "Lobby".to_string(),
            is_active: true,
            is_deleted: false,
        };
        assert!(location.is_assignable());

        location.is_active = false;
        assert!(!location.is_assignable());

        location.is_active = true;
        location.is_deleted = true;
        assert!(!location.is_assignable());
    }
}
