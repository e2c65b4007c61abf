//! Per-request browser session held in cookies

use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::AppState;

pub const TOKEN_COOKIE: &str = "token";
pub const USER_ID_COOKIE: &str = "userId";
pub const REDIRECT_COOKIE: &str = "redirectAfterLogin";
pub const ADMIN_TOKEN_COOKIE: &str = "adminToken";

/// Typed view over the session cookies.
///
/// Mutating methods consume and return the session; hand [`Session::into_jar`] back in the
/// response so the browser applies the changes.
#[derive(Debug, Clone)]
pub struct Session {
    jar: CookieJar,
    secure: bool,
}

impl Session {
    pub fn new(jar: CookieJar, secure: bool) -> Self {
        Self { jar, secure }
    }

    fn value(&self, name: &str) -> Option<&str> {
        self.jar
            .get(name)
            .map(|c| c.value())
            .filter(|v| !v.trim().is_empty())
    }

    pub fn token(&self) -> Option<&str> {
        self.value(TOKEN_COOKIE)
    }

    pub fn admin_token(&self) -> Option<&str> {
        self.value(ADMIN_TOKEN_COOKIE)
    }

    /// Stored user id; a non-numeric value counts as missing
    pub fn user_id(&self) -> Option<i64> {
        self.value(USER_ID_COOKIE)?.trim().parse().ok()
    }

    pub fn redirect_after_login(&self) -> Option<&str> {
        self.value(REDIRECT_COOKIE)
    }

    /// Logged-in flag: a token is stored, decodable or not
    pub fn is_logged_in(&self) -> bool {
        self.token().is_some()
    }

    fn cookie(&self, name: &'static str, value: String) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .build()
    }

    fn without(mut self, name: &'static str) -> Self {
        self.jar = self.jar.remove(Cookie::build(name).path("/"));
        self
    }

    /// Store a fresh login and consume the post-login redirect.
    ///
    /// Only an admin login keeps an `adminToken`; any earlier one is dropped otherwise.
    pub fn login(mut self, token: &str, user_id: i64, admin: bool) -> Self {
        let token_cookie = self.cookie(TOKEN_COOKIE, token.to_string());
        let user_cookie = self.cookie(USER_ID_COOKIE, user_id.to_string());
        self.jar = self.jar.add(token_cookie).add(user_cookie);
        let session = if admin {
            self.set_admin_token(token)
        } else {
            self.clear_admin_token()
        };
        session.without(REDIRECT_COOKIE)
    }

    /// Cookie checked by the `/admin` routing gate
    pub fn set_admin_token(mut self, token: &str) -> Self {
        let cookie = self.cookie(ADMIN_TOKEN_COOKIE, token.to_string());
        self.jar = self.jar.add(cookie);
        self
    }

    pub fn set_user_id(mut self, user_id: i64) -> Self {
        let cookie = self.cookie(USER_ID_COOKIE, user_id.to_string());
        self.jar = self.jar.add(cookie);
        self
    }

    /// Remember where to go once the user has logged in
    pub fn remember_redirect(mut self, path: &str) -> Self {
        let cookie = self.cookie(REDIRECT_COOKIE, path.to_string());
        self.jar = self.jar.add(cookie);
        self
    }

    pub fn consume_redirect(self) -> Self {
        if self.redirect_after_login().is_some() {
            self.without(REDIRECT_COOKIE)
        } else {
            self
        }
    }

    /// Drop the token and the user id derived from it
    pub fn clear_token(self) -> Self {
        self.without(TOKEN_COOKIE).without(USER_ID_COOKIE)
    }

    pub fn clear_admin_token(self) -> Self {
        self.without(ADMIN_TOKEN_COOKIE)
    }

    pub fn logout(self) -> Self {
        self.clear_token().clear_admin_token().without(REDIRECT_COOKIE)
    }

    pub fn into_jar(self) -> CookieJar {
        self.jar
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(Session::new(jar, state.config.auth.secure_cookies))
    }
}
