//! Login, registration and post-login routing

use std::sync::Arc;

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    gateway::LibraryGateway,
    models::{NewUser, Role, Verification, VerifiedSession},
};

use super::session::SessionVerifier;

pub const ADMIN_HOME: &str = "/admin/dashboard";
pub const MEMBER_HOME: &str = "/peminjaman";

/// Login form
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// A completed login
#[derive(Debug, Clone)]
pub struct LoginSuccess {
    pub session: VerifiedSession,
    pub user_id: i64,
    /// Where to send the browser
    pub landing: String,
}

/// What the login page does with an already stored token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredTokenOutcome {
    /// Valid token: go straight to the landing page
    Redirect { landing: String, user_id: Option<i64> },
    /// Nothing stored, or a role with no landing page: show the form
    ShowForm,
    /// Token failed to decode: clear it (and the derived user id) and show the form
    Clear,
}

/// Only same-site absolute paths are honored as post-login targets
fn is_local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.contains("://")
}

/// Landing page for a verified session.
///
/// Admins go to the dashboard; members go to `redirect_after_login` when it is a local
/// path, else to the catalog. Other roles have no landing page.
pub fn landing_path(session: &VerifiedSession, redirect_after_login: Option<&str>) -> AppResult<String> {
    match session.role {
        Some(Role::Admin) => Ok(ADMIN_HOME.to_string()),
        Some(Role::User) => Ok(redirect_after_login
            .filter(|p| is_local_path(p))
            .unwrap_or(MEMBER_HOME)
            .to_string()),
        _ => Err(AppError::Authorization(
            "Invalid role. Contact an administrator.".to_string(),
        )),
    }
}

#[derive(Clone)]
pub struct AuthService {
    gateway: Arc<dyn LibraryGateway>,
    verifier: SessionVerifier,
}

impl AuthService {
    pub fn new(gateway: Arc<dyn LibraryGateway>, verifier: SessionVerifier) -> Self {
        Self { gateway, verifier }
    }

    /// Authenticate against the backend and resolve the landing page
    pub async fn login(&self, form: &LoginForm, redirect_after_login: Option<&str>) -> AppResult<LoginSuccess> {
        let form = LoginForm {
            email: form.email.trim().to_string(),
            password: form.password.clone(),
        };
        form.validate()?;
        let email = form.email.as_str();

        let token = self.gateway.login(email, &form.password).await?;

        let session = match self.verifier.verify(&token) {
            Verification::Valid(session) => session,
            Verification::Invalid(reason) => return Err(AppError::TokenDecode(reason)),
        };

        let Some(user_id) = session.user_id else {
            tracing::error!("Token issued for {} carries no user id", email);
            return Err(AppError::TokenDecode(
                "Login failed. The token carries no user id.".to_string(),
            ));
        };

        let landing = landing_path(&session, redirect_after_login)?;
        tracing::info!("User {} logged in as {:?}", user_id, session.role);

        Ok(LoginSuccess {
            session,
            user_id,
            landing,
        })
    }

    /// Decide what the login page does with a token that is already stored
    pub fn resume(&self, stored_token: Option<&str>, redirect_after_login: Option<&str>) -> StoredTokenOutcome {
        let Some(token) = stored_token.filter(|t| !t.is_empty()) else {
            return StoredTokenOutcome::ShowForm;
        };

        match self.verifier.verify(token) {
            Verification::Valid(session) => match landing_path(&session, redirect_after_login) {
                Ok(landing) => StoredTokenOutcome::Redirect {
                    landing,
                    user_id: session.user_id,
                },
                Err(_) => StoredTokenOutcome::ShowForm,
            },
            Verification::Invalid(_) => StoredTokenOutcome::Clear,
        }
    }

    /// Self registration; the backend receives `role = "user"`
    pub async fn register(&self, user: NewUser) -> AppResult<()> {
        user.validate()?;
        self.gateway.register(user.into()).await
    }
}
