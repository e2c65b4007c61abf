//! reqwest implementation of [`LibraryGateway`]

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, RequestBuilder, Response, StatusCode,
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;

use crate::{
    config::BackendConfig,
    error::{AppError, AppResult},
    models::{
        report::normalize_rows,
        user::{RegisterUser, UpdateUserBody},
        Book, BorrowRequest, NewBook, ReportEntry, ReportPeriod, Transaction, TransactionAction,
        User,
    },
};

use super::LibraryGateway;

#[derive(Deserialize)]
struct LoginResponse {
    token: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(config: &BackendConfig) -> AppResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("pustaka-portal/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(builder: RequestBuilder, token: &str) -> RequestBuilder {
        builder.bearer_auth(token)
    }

    /// Turn a non-2xx response into [`AppError::Upstream`], keeping the backend `message`.
    async fn check(response: Response, fallback: &str) -> AppResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string());

        tracing::warn!("Backend responded {}: {}", status, message);
        Err(AppError::Upstream {
            status: status.as_u16(),
            message,
        })
    }

    async fn fetch<T: DeserializeOwned>(builder: RequestBuilder, fallback: &str) -> AppResult<T> {
        let response = Self::check(builder.send().await?, fallback).await?;
        Ok(response.json::<T>().await?)
    }

    async fn execute(builder: RequestBuilder, fallback: &str) -> AppResult<()> {
        Self::check(builder.send().await?, fallback).await?;
        Ok(())
    }
}

#[async_trait]
impl LibraryGateway for HttpGateway {
    async fn login(&self, email: &str, password: &str) -> AppResult<String> {
        tracing::debug!("Login request for {}", email);
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        let fallback = if response.status() == StatusCode::UNAUTHORIZED {
            "Login failed. Wrong email or password."
        } else {
            "Login failed."
        };
        let body: LoginResponse = Self::check(response, fallback).await?.json().await?;

        body.token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Authentication("Login failed. No token received.".to_string()))
    }

    async fn register(&self, user: RegisterUser) -> AppResult<()> {
        let request = self.client.post(self.url("/users/register")).json(&user);
        Self::execute(request, "Registration failed.").await
    }

    async fn list_users(&self, token: &str) -> AppResult<Vec<User>> {
        let request = Self::authorized(self.client.get(self.url("/users")), token);
        Self::fetch(request, "Failed to load members").await
    }

    async fn get_user(&self, token: &str, id: i64) -> AppResult<User> {
        let request = Self::authorized(self.client.get(self.url(&format!("/users/{}", id))), token);
        Self::fetch(request, "Failed to load member").await
    }

    async fn update_user(&self, token: &str, id: i64, user: UpdateUserBody) -> AppResult<()> {
        let request =
            Self::authorized(self.client.put(self.url(&format!("/users/{}", id))), token).json(&user);
        Self::execute(request, "Failed to save member").await
    }

    async fn delete_user(&self, token: &str, id: i64) -> AppResult<()> {
        let request =
            Self::authorized(self.client.delete(self.url(&format!("/users/{}", id))), token);
        Self::execute(request, "Failed to delete member").await
    }

    async fn list_books(&self, token: Option<String>) -> AppResult<Vec<Book>> {
        let mut request = self.client.get(self.url("/books"));
        if let Some(token) = token {
            request = Self::authorized(request, &token);
        }
        Self::fetch(request, "Failed to load books").await
    }

    async fn add_book(&self, token: &str, book: NewBook) -> AppResult<()> {
        let mut form = Form::new()
            .text("title", book.title)
            .text("author", book.author)
            .text("isbn", book.isbn.unwrap_or_default());

        if let Some(image) = book.image {
            let mut part = Part::bytes(image.bytes).file_name(image.file_name);
            if let Some(content_type) = image.content_type {
                part = part.mime_str(&content_type)?;
            }
            form = form.part("image", part);
        }

        let request =
            Self::authorized(self.client.post(self.url("/books/add")), token).multipart(form);
        Self::execute(request, "Failed to add book").await
    }

    async fn delete_book(&self, token: &str, id: i64) -> AppResult<()> {
        let request =
            Self::authorized(self.client.delete(self.url(&format!("/books/{}", id))), token);
        Self::execute(request, "Failed to delete book").await
    }

    async fn borrow(&self, token: &str, request: BorrowRequest) -> AppResult<()> {
        let builder = Self::authorized(self.client.post(self.url("/transactions/borrow")), token)
            .json(&request);
        Self::execute(builder, "Failed to borrow book").await
    }

    async fn list_transactions(&self, token: &str) -> AppResult<Vec<Transaction>> {
        let request = Self::authorized(self.client.get(self.url("/transactions")), token);
        Self::fetch(request, "Failed to load loan history").await
    }

    async fn user_transactions(&self, token: &str, user_id: i64) -> AppResult<Vec<Transaction>> {
        let request = Self::authorized(
            self.client
                .get(self.url(&format!("/transactions/user/{}", user_id))),
            token,
        );
        Self::fetch(request, "Failed to load your loans").await
    }

    async fn apply_action(&self, token: &str, id: i64, action: TransactionAction) -> AppResult<()> {
        let path = format!("/transactions/{}/{}", action.as_str(), id);
        tracing::debug!("PATCH {}", path);
        let request = Self::authorized(self.client.patch(self.url(&path)), token);
        Self::execute(request, &format!("Failed to {} loan", action)).await
    }

    async fn report(&self, token: &str, period: ReportPeriod) -> AppResult<Vec<ReportEntry>> {
        let path = format!("/transactions/report/{}", period.as_str());
        let request = Self::authorized(self.client.get(self.url(&path)), token);
        let rows: Vec<Value> =
            Self::fetch(request, &format!("Failed to load {} report", period)).await?;
        Ok(normalize_rows(period, &rows))
    }
}
