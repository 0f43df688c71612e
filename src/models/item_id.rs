use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a todo or note as seen by a client.
///
/// Items drafted in the UI only have a local `Pending` id until the store
/// assigns a `Persisted` one. On the wire a persisted id is a UUID string and
/// a pending id is an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Persisted(Uuid),
    Pending(u64),
}

impl ItemId {
    pub fn persisted(self) -> Option<Uuid> {
        match self {
            Self::Persisted(id) => Some(id),
            Self::Pending(_) => None,
        }
    }

    pub fn is_pending(self) -> bool {
        matches!(self, Self::Pending(_))
    }
}

impl From<Uuid> for ItemId {
    fn from(id: Uuid) -> Self {
        Self::Persisted(id)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Persisted(id) => write!(f, "{}", id),
            Self::Pending(local) => write!(f, "pending-{}", local),
        }
    }
}
