//! Library member model and related types

use serde::{Deserialize, Serialize};
use utoipa::{
    openapi::{ObjectBuilder, RefOr, Schema, SchemaType},
    ToSchema,
};
use validator::Validate;

/// Member role as carried by user records and session tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    User,
    /// Any other role string, kept verbatim (trimmed, lower-cased)
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
            Role::Other(s) => s.as_str(),
        }
    }

    pub fn is_admin(&self) -> bool {
        *self == Role::Admin
    }
}

impl<'s> ToSchema<'s> for Role {
    fn schema() -> (&'s str, RefOr<Schema>) {
        let object = ObjectBuilder::new()
            .schema_type(SchemaType::String)
            .description(Some("Member role, usually `admin` or `user`"))
            .build();
        ("Role", RefOr::T(Schema::Object(object)))
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "admin" => Role::Admin,
            "user" => Role::User,
            other => Role::Other(other.to_string()),
        }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        Role::from(s.as_str())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

/// Member record as returned by `GET /users`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: i64,
    pub nama: String,
    pub email: String,
    #[serde(default)]
    pub fakultas: Option<String>,
    #[serde(default)]
    pub nim: Option<String>,
    pub role: Role,
}

impl User {
    /// Case-insensitive match on name, faculty or student number
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.nama.to_lowercase().contains(&needle)
            || self
                .fakultas
                .as_deref()
                .is_some_and(|f| f.to_lowercase().contains(&needle))
            || self
                .nim
                .as_deref()
                .is_some_and(|n| n.to_lowercase().contains(&needle))
    }
}

/// Registration form (self sign-up and admin "add member")
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewUser {
    #[validate(length(min = 1, message = "Name is required"))]
    pub nama: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Student number is required"))]
    pub nim: String,
    #[validate(length(min = 1, message = "Faculty is required"))]
    pub fakultas: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Body sent to `POST /users/register`; the role is always forced to `user`
#[derive(Debug, Serialize)]
pub struct RegisterUser {
    #[serde(flatten)]
    pub user: NewUser,
    pub role: Role,
}

impl From<NewUser> for RegisterUser {
    fn from(user: NewUser) -> Self {
        Self {
            user,
            role: Role::User,
        }
    }
}

/// Member edit form; an empty password leaves it unchanged
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 1, message = "Name is required"))]
    pub nama: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Student number is required"))]
    pub nim: String,
    #[validate(length(min = 1, message = "Faculty is required"))]
    pub fakultas: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Body sent to `PUT /users/:id`
#[derive(Debug, Serialize)]
pub struct UpdateUserBody {
    #[serde(flatten)]
    pub user: UpdateUser,
    pub role: Role,
}

impl From<UpdateUser> for UpdateUserBody {
    fn from(mut user: UpdateUser) -> Self {
        if user.password.as_deref().is_some_and(|p| p.is_empty()) {
            user.password = None;
        }
        Self {
            user,
            role: Role::User,
        }
    }
}

/// Member counts by role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct RoleCounts {
    pub admins: usize,
    pub users: usize,
}

impl RoleCounts {
    pub fn tally(users: &[User]) -> Self {
        users.iter().fold(Self::default(), |mut counts, user| {
            match user.role {
                Role::Admin => counts.admins += 1,
                Role::User => counts.users += 1,
                Role::Other(_) => {}
            }
            counts
        })
    }
}
