//! Page logic services

pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod guard;
pub mod loans;
pub mod notifications;
pub mod session;
pub mod users;

use std::sync::Arc;

use crate::{config::AppConfig, gateway::LibraryGateway};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub gateway: Arc<dyn LibraryGateway>,
    pub guard: guard::RouteGuard,
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub users: users::UsersService,
    pub dashboard: dashboard::DashboardService,
}

impl Services {
    /// Create all services on top of `gateway`
    pub fn new(gateway: Arc<dyn LibraryGateway>, config: &AppConfig) -> Self {
        let verifier = session::SessionVerifier::new(&config.auth);
        let catalog = catalog::CatalogService::new(gateway.clone());

        Self {
            guard: guard::RouteGuard::new(verifier.clone()),
            auth: auth::AuthService::new(gateway.clone(), verifier),
            loans: loans::LoansService::new(gateway.clone(), catalog.clone()),
            catalog,
            users: users::UsersService::new(gateway.clone()),
            dashboard: dashboard::DashboardService::new(gateway.clone(), config.polling.clone()),
            gateway,
        }
    }
}
