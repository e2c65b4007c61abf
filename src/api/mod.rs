//! Portal page handlers

pub mod auth;
pub mod books;
pub mod dashboard;
pub mod health;
pub mod loans;
pub mod openapi;
pub mod session;
pub mod users;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, Method},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;

use crate::{
    error::AppError,
    models::{Role, VerifiedSession},
    services::guard::{GuardOutcome, ADMIN_LOGIN_PATH, LOGIN_PATH, UNAUTHORIZED_PATH},
    AppState,
};

pub use session::Session;

/// Redirect issued when a guarded page refuses the request
pub struct GuardRedirect {
    session: Option<Session>,
    location: &'static str,
}

impl IntoResponse for GuardRedirect {
    fn into_response(self) -> Response {
        let redirect = Redirect::to(self.location);
        match self.session {
            Some(session) => (session.into_jar(), redirect).into_response(),
            None => redirect.into_response(),
        }
    }
}

/// Run the route guard for the current request
async fn guarded(parts: &mut Parts, state: &AppState, required: Role) -> Result<VerifiedSession, GuardRedirect> {
    let session = Session::from_request_parts(parts, state)
        .await
        .unwrap_or_else(|never| match never {});

    match state.services.guard.check(session.token(), Some(&required)) {
        GuardOutcome::Verified(verified) => Ok(verified),
        GuardOutcome::RedirectToLogin { clear_token } => {
            let mut session = if clear_token { session.clear_token() } else { session };
            if parts.method == Method::GET {
                let target = parts
                    .uri
                    .path_and_query()
                    .map_or(parts.uri.path(), |pq| pq.as_str());
                session = session.remember_redirect(target);
            }
            Err(GuardRedirect {
                session: Some(session),
                location: LOGIN_PATH,
            })
        }
        GuardOutcome::RedirectUnauthorized => Err(GuardRedirect {
            session: None,
            location: UNAUTHORIZED_PATH,
        }),
    }
}

/// A member with role `user`
pub struct UserSession(pub VerifiedSession);

/// A member with role `admin`
pub struct AdminSession(pub VerifiedSession);

#[async_trait]
impl FromRequestParts<AppState> for UserSession {
    type Rejection = GuardRedirect;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        guarded(parts, state, Role::User).await.map(UserSession)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = GuardRedirect;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        guarded(parts, state, Role::Admin).await.map(AdminSession)
    }
}

/// Routing gate in front of the admin pages, checking the `adminToken` cookie.
///
/// Missing or undecodable token goes to the admin login, any other role to the
/// unauthorized page. The admin login page is routed outside the gate.
pub async fn admin_gate(State(state): State<AppState>, session: Session, request: Request, next: Next) -> Response {
    match state
        .services
        .guard
        .check(session.admin_token(), Some(&Role::Admin))
    {
        GuardOutcome::Verified(_) => next.run(request).await,
        GuardOutcome::RedirectToLogin { clear_token } => {
            tracing::debug!("Admin gate: no usable admin token");
            let redirect = Redirect::to(ADMIN_LOGIN_PATH);
            if clear_token {
                (session.clear_admin_token().into_jar(), redirect).into_response()
            } else {
                redirect.into_response()
            }
        }
        GuardOutcome::RedirectUnauthorized => Redirect::to(UNAUTHORIZED_PATH).into_response(),
    }
}

/// Page body returned alongside a failure status
#[derive(Serialize)]
pub struct PageError<T: Serialize> {
    #[serde(flatten)]
    pub page: T,
    pub error: String,
}

/// Render `page` with the error's message and status
pub fn page_error<T: Serialize>(err: AppError, page: T) -> Response {
    let (status, _) = err.status();
    if status.is_server_error() {
        tracing::error!("Page failed: {}", err);
    } else {
        tracing::debug!("Page refused: {}", err);
    }
    (
        status,
        Json(PageError {
            page,
            error: err.user_message(),
        }),
    )
        .into_response()
}
