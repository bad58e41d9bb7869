//! SCIM resource metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Common metadata carried by every User and Group (RFC 7643 §3.1).
///
/// `created` is fixed when the resource is created. `lastModified` moves
/// forward each time a PATCH batch is written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub resource_type: String,
    pub created: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Meta {
    /// Create metadata for a resource created now.
    pub fn new(resource_type: impl Into<String>, location: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            resource_type: resource_type.into(),
            created: now,
            last_modified: now,
            location: Some(location.into()),
        }
    }

    /// Get the location URI.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Refresh `lastModified`.
    pub fn touch(&mut self) {
        self.last_modified = Utc::now().max(self.created);
    }
}
