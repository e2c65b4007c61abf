//! In-memory library backend and request helpers

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response, StatusCode},
    Router,
};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

use pustaka_portal::{
    config::AppConfig,
    create_router,
    error::{AppError, AppResult},
    gateway::LibraryGateway,
    models::{
        transaction::{TransactionBook, TransactionUser},
        user::{RegisterUser, UpdateUserBody},
        Book, BorrowRequest, NewBook, ReportEntry, ReportPeriod, Role, Transaction,
        TransactionAction, TransactionStatus, User,
    },
    AppState,
};

pub const ADMIN_EMAIL: &str = "admin@pustaka.id";
pub const MEMBER_EMAIL: &str = "budi@kampus.ac.id";
pub const PASSWORD: &str = "rahasia";

pub fn token_for(role: &str, user_id: i64) -> String {
    encode(
        &Header::default(),
        &json!({ "role": role, "userId": user_id }),
        &EncodingKey::from_secret(b"backend-secret"),
    )
    .unwrap()
}

struct Account {
    user: User,
    password: String,
}

#[derive(Default)]
struct BackendState {
    accounts: Vec<Account>,
    books: Vec<Book>,
    transactions: Vec<Transaction>,
}

/// Library backend keeping everything in memory
#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<BackendState>>,
}

impl FakeBackend {
    /// One admin, one member, three books (available, pending, borrowed)
    pub fn seeded() -> Self {
        let backend = Self::default();
        {
            let mut state = backend.state.lock().unwrap();
            state.accounts = vec![
                Account {
                    user: User {
                        id: 1,
                        nama: "Admin Perpus".into(),
                        email: ADMIN_EMAIL.into(),
                        fakultas: None,
                        nim: None,
                        role: Role::Admin,
                    },
                    password: PASSWORD.into(),
                },
                Account {
                    user: User {
                        id: 2,
                        nama: "Budi".into(),
                        email: MEMBER_EMAIL.into(),
                        fakultas: Some("Teknik".into()),
                        nim: Some("2101".into()),
                        role: Role::User,
                    },
                    password: PASSWORD.into(),
                },
            ];
            state.books = vec![
                book(10, "Laskar Pelangi", 2),
                book(11, "Bumi Manusia", 1),
                book(12, "Ronggeng Dukuh Paruk", 0),
            ];
        }
        backend
    }

    pub fn book(&self, id: i64) -> Option<Book> {
        self.state
            .lock()
            .unwrap()
            .books
            .iter()
            .find(|b| b.id == id)
            .cloned()
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.state.lock().unwrap().transactions.clone()
    }

    /// Record a pending transaction the way a member borrow would
    pub fn push_pending(&self, user_id: i64, book_id: i64) -> i64 {
        let mut state = self.state.lock().unwrap();
        let id = state.transactions.len() as i64 + 1;
        let title = state
            .books
            .iter()
            .find(|b| b.id == book_id)
            .map(|b| b.title.clone());
        let nama = state
            .accounts
            .iter()
            .find(|a| a.user.id == user_id)
            .map(|a| a.user.nama.clone());
        if let Some(b) = state.books.iter_mut().find(|b| b.id == book_id) {
            b.available = 1;
        }
        state.transactions.insert(
            0,
            Transaction {
                id,
                user_id: Some(user_id),
                book_id: Some(book_id),
                user: Some(TransactionUser { id: Some(user_id), nama }),
                book: Some(TransactionBook { id: Some(book_id), title }),
                borrow_date: Some(Utc::now()),
                due_date: None,
                status: TransactionStatus::Pending,
            },
        );
        id
    }
}

fn book(id: i64, title: &str, available: i32) -> Book {
    Book {
        id,
        title: title.into(),
        author: "Penulis".into(),
        isbn: None,
        available,
        image_url: None,
        category: Some("Sastra".into()),
    }
}

fn not_found(what: &str) -> AppError {
    AppError::Upstream {
        status: 404,
        message: format!("{} not found", what),
    }
}

#[async_trait]
impl LibraryGateway for FakeBackend {
    async fn login(&self, email: &str, password: &str) -> AppResult<String> {
        let state = self.state.lock().unwrap();
        state
            .accounts
            .iter()
            .find(|a| a.user.email == email && a.password == password)
            .map(|a| token_for(a.user.role.as_str(), a.user.id))
            .ok_or_else(|| AppError::Upstream {
                status: 401,
                message: "Login failed. Wrong email or password.".into(),
            })
    }

    async fn register(&self, user: RegisterUser) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        let id = state.accounts.len() as i64 + 1;
        state.accounts.push(Account {
            user: User {
                id,
                nama: user.user.nama,
                email: user.user.email,
                fakultas: Some(user.user.fakultas),
                nim: Some(user.user.nim),
                role: user.role,
            },
            password: user.user.password,
        });
        Ok(())
    }

    async fn list_users(&self, _token: &str) -> AppResult<Vec<User>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .accounts
            .iter()
            .map(|a| a.user.clone())
            .collect())
    }

    async fn get_user(&self, _token: &str, id: i64) -> AppResult<User> {
        self.state
            .lock()
            .unwrap()
            .accounts
            .iter()
            .find(|a| a.user.id == id)
            .map(|a| a.user.clone())
            .ok_or_else(|| not_found("User"))
    }

    async fn update_user(&self, _token: &str, id: i64, body: UpdateUserBody) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        let account = state
            .accounts
            .iter_mut()
            .find(|a| a.user.id == id)
            .ok_or_else(|| not_found("User"))?;
        account.user.nama = body.user.nama;
        account.user.email = body.user.email;
        if let Some(password) = body.user.password {
            account.password = password;
        }
        Ok(())
    }

    async fn delete_user(&self, _token: &str, id: i64) -> AppResult<()> {
        self.state.lock().unwrap().accounts.retain(|a| a.user.id != id);
        Ok(())
    }

    async fn list_books(&self, _token: Option<String>) -> AppResult<Vec<Book>> {
        Ok(self.state.lock().unwrap().books.clone())
    }

    async fn add_book(&self, _token: &str, new: NewBook) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        let id = state.books.iter().map(|b| b.id).max().unwrap_or(0) + 1;
        state.books.push(Book {
            id,
            title: new.title,
            author: new.author,
            isbn: new.isbn,
            available: 2,
            image_url: None,
            category: None,
        });
        Ok(())
    }

    async fn delete_book(&self, _token: &str, id: i64) -> AppResult<()> {
        self.state.lock().unwrap().books.retain(|b| b.id != id);
        Ok(())
    }

    async fn borrow(&self, _token: &str, request: BorrowRequest) -> AppResult<()> {
        self.push_pending(request.user_id, request.book_id);
        Ok(())
    }

    async fn list_transactions(&self, _token: &str) -> AppResult<Vec<Transaction>> {
        Ok(self.transactions())
    }

    async fn user_transactions(&self, _token: &str, user_id: i64) -> AppResult<Vec<Transaction>> {
        Ok(self
            .transactions()
            .into_iter()
            .filter(|t| t.user_id == Some(user_id))
            .collect())
    }

    async fn apply_action(&self, _token: &str, id: i64, action: TransactionAction) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        let tx = state
            .transactions
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| not_found("Transaction"))?;
        tx.status = tx.status.apply(action).ok_or_else(|| AppError::Upstream {
            status: 400,
            message: "Invalid status change".into(),
        })?;
        let (book_id, available) = (
            tx.book_id,
            match tx.status {
                TransactionStatus::Borrowed => 0,
                _ => 2,
            },
        );
        if let Some(b) = state.books.iter_mut().find(|b| Some(b.id) == book_id) {
            b.available = available;
        }
        Ok(())
    }

    async fn report(&self, _token: &str, period: ReportPeriod) -> AppResult<Vec<ReportEntry>> {
        let count = self.state.lock().unwrap().transactions.len() as u64;
        Ok(vec![ReportEntry {
            label: period.as_str().to_string(),
            borrow_count: count,
        }])
    }
}

/// The full portal wired to `backend`
pub fn app(backend: &FakeBackend) -> Router {
    create_router(AppState::new(AppConfig::default(), Arc::new(backend.clone())))
}

pub fn get(uri: &str, cookies: &str) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if !cookies.is_empty() {
        builder = builder.header(header::COOKIE, cookies);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn send_json(method: &str, uri: &str, cookies: &str, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if !cookies.is_empty() {
        builder = builder.header(header::COOKIE, cookies);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn call(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

/// `Set-Cookie` headers of the response
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok().map(str::to_string))
        .collect()
}

pub fn sets_cookie(response: &Response<Body>, name: &str) -> bool {
    set_cookies(response)
        .iter()
        .any(|c| c.starts_with(&format!("{}=", name)) && !c.starts_with(&format!("{}=;", name)))
}

pub fn clears_cookie(response: &Response<Body>, name: &str) -> bool {
    set_cookies(response)
        .iter()
        .any(|c| c.starts_with(&format!("{}=;", name)) || (c.starts_with(&format!("{}=", name)) && c.contains("Max-Age=0")))
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn admin_cookies() -> String {
    let token = token_for("admin", 1);
    format!("token={}; adminToken={}; userId=1", token, token)
}

pub fn member_cookies() -> String {
    format!("token={}; userId=2", token_for("user", 2))
}

pub fn is_redirect(response: &Response<Body>) -> bool {
    response.status() == StatusCode::SEE_OTHER
}

const MAX_HOPS: usize = 5;

/// Issue a GET and follow `Location` headers the way a browser would, carrying cookies
/// between hops. Returns the visited locations and the response that finally rendered.
pub async fn follow_redirects(backend: &FakeBackend, uri: &str, cookies: &str) -> (Vec<String>, Response<Body>) {
    let mut jar: Vec<(String, String)> = cookies
        .split(';')
        .filter_map(|c| c.trim().split_once('='))
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();
    let mut uri = uri.to_string();
    let mut hops = Vec::new();

    for _ in 0..MAX_HOPS {
        let header = jar
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ");
        let response = call(app(backend), get(&uri, &header)).await;

        for cookie in set_cookies(&response) {
            let pair = cookie.split(';').next().unwrap_or_default();
            if let Some((name, value)) = pair.split_once('=') {
                jar.retain(|(n, _)| n != name);
                if !value.is_empty() && !cookie.contains("Max-Age=0") {
                    jar.push((name.to_string(), value.to_string()));
                }
            }
        }

        if !is_redirect(&response) {
            return (hops, response);
        }
        uri = location(&response).unwrap().to_string();
        hops.push(uri.clone());
    }

    panic!("no page rendered after {} hops: {:?}", MAX_HOPS, hops);
}
