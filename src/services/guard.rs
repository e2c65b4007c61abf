//! Route guard decisions

use crate::models::{Role, Verification, VerifiedSession};

use super::session::SessionVerifier;

pub const LOGIN_PATH: &str = "/login";
pub const ADMIN_LOGIN_PATH: &str = "/admin/login";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

/// Terminal state of one guard check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Render the wrapped page
    Verified(VerifiedSession),
    /// No usable token; `clear_token` is set when a stored token failed to decode
    RedirectToLogin { clear_token: bool },
    /// Token is fine but carries the wrong role
    RedirectUnauthorized,
}

/// Authentication and optional role gate in front of a page
#[derive(Clone)]
pub struct RouteGuard {
    verifier: SessionVerifier,
}

impl RouteGuard {
    pub fn new(verifier: SessionVerifier) -> Self {
        Self { verifier }
    }

    pub fn verifier(&self) -> &SessionVerifier {
        &self.verifier
    }

    /// Check the stored token against `required` (any role when `None`).
    pub fn check(&self, stored_token: Option<&str>, required: Option<&Role>) -> GuardOutcome {
        let Some(token) = stored_token.filter(|t| !t.trim().is_empty()) else {
            tracing::debug!("No token stored, redirecting to login");
            return GuardOutcome::RedirectToLogin { clear_token: false };
        };

        let session = match self.verifier.verify(token) {
            Verification::Valid(session) => session,
            Verification::Invalid(reason) => {
                tracing::warn!("Stored token could not be decoded: {}", reason);
                return GuardOutcome::RedirectToLogin { clear_token: true };
            }
        };

        if let Some(required) = required {
            if !session.has_role(required) {
                tracing::warn!(
                    "Role {:?} does not match required role {}",
                    session.role.as_ref().map(Role::as_str),
                    required
                );
                return GuardOutcome::RedirectUnauthorized;
            }
        }

        GuardOutcome::Verified(session)
    }
}
