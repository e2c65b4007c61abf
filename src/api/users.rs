//! Member administration pages

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{NewUser, UpdateUser, User},
    AppState,
};

use super::{books::SearchQuery, page_error, AdminSession};

#[derive(Serialize, ToSchema)]
pub struct MembersPage {
    pub search: String,
    pub members: Vec<User>,
    pub message: Option<String>,
}

impl MembersPage {
    fn empty() -> Self {
        Self {
            search: String::new(),
            members: Vec::new(),
            message: None,
        }
    }
}

async fn members_page(state: &AppState, token: &str, search: String, message: Option<String>) -> AppResult<MembersPage> {
    let members = state.services.users.members(token, Some(&search)).await?;
    Ok(MembersPage {
        search,
        members,
        message,
    })
}

/// Members with role `user`, searchable by name, faculty or student number
#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "admin",
    params(SearchQuery),
    responses(
        (status = 200, description = "Members", body = MembersPage)
    )
)]
pub async fn list_members(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
    Query(query): Query<SearchQuery>,
) -> Response {
    let search = query.search.unwrap_or_default();
    match members_page(&state, &session.token, search, None).await {
        Ok(page) => Json(page).into_response(),
        Err(e) => page_error(e, MembersPage::empty()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/users",
    tag = "admin",
    request_body = NewUser,
    responses(
        (status = 201, description = "Member added", body = MembersPage),
        (status = 400, description = "Invalid form")
    )
)]
pub async fn create_member(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
    Json(user): Json<NewUser>,
) -> Response {
    let result: AppResult<MembersPage> = async {
        let name = user.nama.clone();
        state.services.users.create(user).await?;
        members_page(&state, &session.token, String::new(), Some(format!("{} added", name))).await
    }
    .await;

    match result {
        Ok(page) => (StatusCode::CREATED, Json(page)).into_response(),
        Err(e) => page_error(e, MembersPage::empty()),
    }
}

/// One member, for the edit form
#[utoipa::path(
    get,
    path = "/admin/users/{id}",
    tag = "admin",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "Member", body = User),
        (status = 404, description = "Member not found")
    )
)]
pub async fn get_member(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
    Path(id): Path<i64>,
) -> AppResult<Json<User>> {
    let user = state.services.users.get(&session.token, id).await?;
    Ok(Json(user))
}

#[utoipa::path(
    put,
    path = "/admin/users/{id}",
    tag = "admin",
    params(("id" = i64, Path, description = "User ID")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "Member updated", body = MembersPage),
        (status = 400, description = "Invalid form")
    )
)]
pub async fn update_member(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
    Path(id): Path<i64>,
    Json(user): Json<UpdateUser>,
) -> Response {
    let result: AppResult<MembersPage> = async {
        state.services.users.update(&session.token, id, user).await?;
        members_page(&state, &session.token, String::new(), Some("Member updated".to_string())).await
    }
    .await;

    match result {
        Ok(page) => Json(page).into_response(),
        Err(e) => page_error(e, MembersPage::empty()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/users/{id}",
    tag = "admin",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "Member deleted", body = MembersPage)
    )
)]
pub async fn delete_member(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
    Path(id): Path<i64>,
) -> Response {
    let result: AppResult<MembersPage> = async {
        state.services.users.delete(&session.token, id).await?;
        members_page(&state, &session.token, String::new(), Some("Member deleted".to_string())).await
    }
    .await;

    match result {
        Ok(page) => Json(page).into_response(),
        Err(e) => page_error(e, MembersPage::empty()),
    }
}
