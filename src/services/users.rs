//! Member administration

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::AppResult,
    gateway::LibraryGateway,
    models::{NewUser, Role, UpdateUser, User},
};

#[derive(Clone)]
pub struct UsersService {
    gateway: Arc<dyn LibraryGateway>,
}

impl UsersService {
    pub fn new(gateway: Arc<dyn LibraryGateway>) -> Self {
        Self { gateway }
    }

    /// Every account known to the backend
    pub async fn all(&self, token: &str) -> AppResult<Vec<User>> {
        self.gateway.list_users(token).await
    }

    /// Members (role `user`) matching `search` on name, faculty or student number
    pub async fn members(&self, token: &str, search: Option<&str>) -> AppResult<Vec<User>> {
        let needle = search.unwrap_or_default();
        Ok(self
            .all(token)
            .await?
            .into_iter()
            .filter(|u| u.role == Role::User && u.matches(needle))
            .collect())
    }

    pub async fn get(&self, token: &str, id: i64) -> AppResult<User> {
        self.gateway.get_user(token, id).await
    }

    /// Add a member; goes through registration with the role forced to `user`
    pub async fn create(&self, user: NewUser) -> AppResult<()> {
        user.validate()?;
        tracing::info!("Adding member {}", user.email);
        self.gateway.register(user.into()).await
    }

    pub async fn update(&self, token: &str, id: i64, user: UpdateUser) -> AppResult<()> {
        user.validate()?;
        tracing::info!("Updating member {}", id);
        self.gateway.update_user(token, id, user.into()).await
    }

    pub async fn delete(&self, token: &str, id: i64) -> AppResult<()> {
        tracing::info!("Deleting member {}", id);
        self.gateway.delete_user(token, id).await
    }
}
