//! Login, registration and session pages

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    models::{NewUser, Role, Verification},
    services::{
        auth::{LoginForm, StoredTokenOutcome, ADMIN_HOME},
        guard::{GuardOutcome, LOGIN_PATH},
    },
    AppState,
};

use super::{page_error, Session};

/// Login page view model
#[derive(Serialize, ToSchema)]
pub struct LoginPage {
    /// Whether this is the admin login page
    pub admin: bool,
    /// Page the member is sent to after logging in, if any
    pub redirect_after_login: Option<String>,
}

impl LoginPage {
    fn new(admin: bool, session: &Session) -> Self {
        Self {
            admin,
            redirect_after_login: session.redirect_after_login().map(str::to_string),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct RegisterResult {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct UnauthorizedPage {
    pub message: String,
    pub login_path: String,
}

/// What the browser currently holds
#[derive(Serialize, ToSchema)]
pub struct SessionInfo {
    pub logged_in: bool,
    pub role: Option<Role>,
    pub user_id: Option<i64>,
}

/// Login page; a valid stored token skips the form
#[utoipa::path(
    get,
    path = "/login",
    tag = "auth",
    responses(
        (status = 200, description = "Login form", body = LoginPage),
        (status = 303, description = "Already logged in, redirected to the landing page")
    )
)]
pub async fn login_page(State(state): State<AppState>, session: Session) -> Response {
    let outcome = state
        .services
        .auth
        .resume(session.token(), session.redirect_after_login());

    match outcome {
        StoredTokenOutcome::Redirect { landing, user_id } => {
            let mut session = if session.redirect_after_login() == Some(landing.as_str()) {
                session.consume_redirect()
            } else {
                session
            };
            if let Some(id) = user_id {
                session = session.set_user_id(id);
            }
            (session.into_jar(), Redirect::to(&landing)).into_response()
        }
        StoredTokenOutcome::ShowForm => Json(LoginPage::new(false, &session)).into_response(),
        StoredTokenOutcome::Clear => {
            let session = session.clear_token();
            let page = LoginPage::new(false, &session);
            (session.into_jar(), Json(page)).into_response()
        }
    }
}

/// Submit credentials; redirects by role
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginForm,
    responses(
        (status = 303, description = "Logged in, redirected to the landing page"),
        (status = 400, description = "Missing email or password"),
        (status = 401, description = "Wrong credentials or unusable token"),
        (status = 403, description = "Role has no landing page")
    )
)]
pub async fn login(State(state): State<AppState>, session: Session, Json(form): Json<LoginForm>) -> Response {
    submit_login(&state, session, &form, false).await
}

async fn submit_login(state: &AppState, session: Session, form: &LoginForm, admin_page: bool) -> Response {
    match state
        .services
        .auth
        .login(form, session.redirect_after_login())
        .await
    {
        Ok(success) => {
            let admin = success.session.is_admin();
            let jar = session
                .login(&success.session.token, success.user_id, admin)
                .into_jar();
            (jar, Redirect::to(&success.landing)).into_response()
        }
        Err(e) => {
            let page = LoginPage::new(admin_page, &session);
            page_error(e, page)
        }
    }
}

/// Admin login page; a stored admin token resumes the session, any other is discarded
#[utoipa::path(
    get,
    path = "/admin/login",
    tag = "auth",
    responses(
        (status = 200, description = "Admin login form", body = LoginPage),
        (status = 303, description = "Already logged in as admin")
    )
)]
pub async fn admin_login_page(State(state): State<AppState>, session: Session) -> Response {
    let Some(token) = session.token() else {
        return Json(LoginPage::new(true, &session)).into_response();
    };

    match state.services.guard.verifier().verify(token) {
        Verification::Valid(verified) if verified.is_admin() => {
            // Re-issue the cookie the admin gate reads
            let session = session.set_admin_token(&verified.token);
            (session.into_jar(), Redirect::to(ADMIN_HOME)).into_response()
        }
        _ => {
            tracing::debug!("Discarding non-admin token on the admin login page");
            let session = session.clear_token().clear_admin_token();
            let page = LoginPage::new(true, &session);
            (session.into_jar(), Json(page)).into_response()
        }
    }
}

/// Submit admin credentials
#[utoipa::path(
    post,
    path = "/admin/login",
    tag = "auth",
    request_body = LoginForm,
    responses(
        (status = 303, description = "Logged in, redirected by role"),
        (status = 401, description = "Wrong credentials")
    )
)]
pub async fn admin_login(State(state): State<AppState>, session: Session, Json(form): Json<LoginForm>) -> Response {
    submit_login(&state, session, &form, true).await
}

/// Self registration
#[utoipa::path(
    post,
    path = "/register",
    tag = "auth",
    request_body = NewUser,
    responses(
        (status = 201, description = "Account created", body = RegisterResult),
        (status = 400, description = "Invalid form")
    )
)]
pub async fn register(State(state): State<AppState>, Json(user): Json<NewUser>) -> Response {
    match state.services.auth.register(user).await {
        Ok(()) => (
            StatusCode::CREATED,
            Json(RegisterResult {
                success: true,
                message: "Registration successful. Please log in.".to_string(),
            }),
        )
            .into_response(),
        Err(e) => page_error(
            e,
            RegisterResult {
                success: false,
                message: "Registration failed".to_string(),
            },
        ),
    }
}

/// Clear the session
#[utoipa::path(
    post,
    path = "/logout",
    tag = "auth",
    responses(
        (status = 303, description = "Logged out, redirected to the login page")
    )
)]
pub async fn logout(session: Session) -> Response {
    (session.logout().into_jar(), Redirect::to(LOGIN_PATH)).into_response()
}

#[utoipa::path(
    get,
    path = "/unauthorized",
    tag = "auth",
    responses(
        (status = 403, description = "Access denied page", body = UnauthorizedPage)
    )
)]
pub async fn unauthorized() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(UnauthorizedPage {
            message: "You do not have access to this page.".to_string(),
            login_path: LOGIN_PATH.to_string(),
        }),
    )
        .into_response()
}

/// Current session summary for page chrome
#[utoipa::path(
    get,
    path = "/session",
    tag = "auth",
    responses(
        (status = 200, description = "Session summary", body = SessionInfo)
    )
)]
pub async fn session_info(State(state): State<AppState>, session: Session) -> Json<SessionInfo> {
    let anonymous = SessionInfo {
        logged_in: false,
        role: None,
        user_id: None,
    };
    if !session.is_logged_in() {
        return Json(anonymous);
    }

    let info = match state.services.guard.check(session.token(), None) {
        GuardOutcome::Verified(verified) => SessionInfo {
            logged_in: true,
            role: verified.role,
            user_id: session.user_id().or(verified.user_id),
        },
        _ => anonymous,
    };
    Json(info)
}
