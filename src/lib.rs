//! Pustaka library portal
//!
//! Web front end of a campus library: members browse the catalog and request loans,
//! administrators manage books, members and loans. Every page is served as a JSON view
//! model built from the library REST backend.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    pub fn new(config: AppConfig, gateway: Arc<dyn gateway::LibraryGateway>) -> Self {
        let services = services::Services::new(gateway, &config);
        Self {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Everything under /admin except the login page sits behind the adminToken gate
    let admin = Router::new()
        .route("/dashboard", get(api::dashboard::dashboard))
        .route("/notifications", get(api::dashboard::notifications))
        .route("/books", get(api::books::admin_books).post(api::books::add_book))
        .route("/books/:id", delete(api::books::delete_book))
        .route("/users", get(api::users::list_members).post(api::users::create_member))
        .route(
            "/users/:id",
            get(api::users::get_member)
                .put(api::users::update_member)
                .delete(api::users::delete_member),
        )
        .route("/loans", get(api::loans::history))
        .route("/loans/:id/confirm", post(api::loans::confirm))
        .route("/loans/:id/complete", post(api::loans::complete))
        .route_layer(middleware::from_fn_with_state(state.clone(), api::admin_gate));

    let pages = Router::new()
        .route("/health", get(api::health::health_check))
        .route("/session", get(api::auth::session_info))
        .route("/login", get(api::auth::login_page).post(api::auth::login))
        .route("/register", post(api::auth::register))
        .route("/logout", post(api::auth::logout))
        .route("/unauthorized", get(api::auth::unauthorized))
        .route("/pencarianbuku", get(api::books::public_search))
        .route("/peminjaman", get(api::books::catalog))
        .route("/peminjaman/borrow", post(api::books::borrow))
        .route("/bukti-peminjaman", get(api::loans::proof_of_borrowing))
        .route("/admin/login", get(api::auth::admin_login_page).post(api::auth::admin_login))
        .nest("/admin", admin)
        .with_state(state);

    Router::new()
        .merge(pages)
        .merge(api::openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
