//! Visibility and ownership rules for library documents.

use serde::{Deserialize, Serialize};

use super::Document;

/// Identity of the caller as asserted by the fronting proxy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    pub user_id: Option<String>,
    pub is_staff: bool,
}

impl Requester {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            is_staff: false,
        }
    }

    pub fn staff(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            is_staff: true,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    fn owns(&self, document: &Document) -> bool {
        match (&self.user_id, &document.owner_id) {
            (Some(user), Some(owner)) => user == owner,
            _ => false,
        }
    }
}

/// Public documents are visible to everyone; private ones to their owner and staff.
pub fn can_view(requester: &Requester, document: &Document) -> bool {
    document.is_public || requester.is_staff || requester.owns(document)
}

pub fn can_delete(requester: &Requester, document: &Document) -> bool {
    requester.is_staff || requester.owns(document)
}
