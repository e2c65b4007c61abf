//! Session token claims

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use super::user::Role;

/// Claims read from the backend-issued bearer token.
///
/// Ids may be encoded as numbers or numeric strings.
#[serde_as]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub role: Option<String>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default, rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// `userId`, falling back to `id`
    pub fn subject_id(&self) -> Option<i64> {
        self.user_id.or(self.id)
    }

    pub fn role(&self) -> Option<Role> {
        self.role
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .map(Role::from)
    }
}

/// A successfully decoded session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedSession {
    pub token: String,
    pub role: Option<Role>,
    pub user_id: Option<i64>,
}

impl VerifiedSession {
    pub fn is_admin(&self) -> bool {
        self.role.as_ref().is_some_and(Role::is_admin)
    }

    pub fn has_role(&self, required: &Role) -> bool {
        self.role.as_ref() == Some(required)
    }
}

/// Result of checking a stored token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Valid(VerifiedSession),
    Invalid(String),
}
