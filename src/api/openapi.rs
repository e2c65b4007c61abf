//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, dashboard, health, loans, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pustaka Portal",
        version = "0.1.0",
        description = "Library management web portal: page view models over the library REST backend"
    ),
    paths(
        // Health
        health::health_check,
        // Auth
        auth::login_page,
        auth::login,
        auth::admin_login_page,
        auth::admin_login,
        auth::register,
        auth::logout,
        auth::unauthorized,
        auth::session_info,
        // Books
        books::catalog,
        books::borrow,
        books::public_search,
        books::admin_books,
        books::add_book,
        books::delete_book,
        // Loans
        loans::proof_of_borrowing,
        loans::history,
        loans::confirm,
        loans::complete,
        // Members
        users::list_members,
        users::create_member,
        users::get_member,
        users::update_member,
        users::delete_member,
        // Dashboard
        dashboard::dashboard,
        dashboard::notifications,
    ),
    components(
        schemas(
            // Auth
            crate::services::auth::LoginForm,
            auth::LoginPage,
            auth::RegisterResult,
            auth::UnauthorizedPage,
            auth::SessionInfo,
            // Books
            crate::models::Availability,
            crate::models::StatusColor,
            crate::models::Book,
            crate::models::BookCard,
            crate::models::BookCounts,
            books::CatalogPage,
            books::BorrowForm,
            books::BorrowPage,
            books::AdminBooksPage,
            // Loans
            crate::models::TransactionStatus,
            crate::models::TransactionAction,
            crate::models::TransactionRow,
            loans::LoansPage,
            // Members
            crate::models::Role,
            crate::models::User,
            crate::models::NewUser,
            crate::models::UpdateUser,
            crate::models::RoleCounts,
            users::MembersPage,
            // Dashboard
            crate::models::ReportPeriod,
            crate::models::ReportSeries,
            crate::services::dashboard::Dashboard,
            crate::services::dashboard::DashboardCounts,
            crate::services::dashboard::PeriodReport,
            crate::services::notifications::NewTransaction,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check"),
        (name = "auth", description = "Login, registration and session"),
        (name = "books", description = "Catalog and borrowing"),
        (name = "loans", description = "Member loans"),
        (name = "admin", description = "Administration pages")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
