//! Integration tests for Schoolhouse.
//!
//! The tests run the real client against [`MockBackend`], an in-process
//! `axum` server that answers with canned responses and records every
//! request it sees (method, path, `Authorization` header and JSON body).
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p schoolhouse-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `session_gate` - Login, registration, verification and invalidation
//! - `dashboard_sync` - Mutations and the reload that follows each one

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use schoolhouse_client::api::ApiClient;
use schoolhouse_client::navigator::{Navigator, Screen};
use schoolhouse_client::notify::Notifier;
use schoolhouse_client::session::keys;
use schoolhouse_client::store::{MemoryStore, SessionStore, StoreError};
use schoolhouse_client::{ApiError, ClientConfig, SessionManager};
use serde_json::{Value, json};
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use url::Url;

/// An address nothing listens on.
const DEAD_API_URL: &str = "http://127.0.0.1:9/api";

/// A request as seen by the mock backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    /// Full path, including the `/api` prefix.
    pub path: String,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

impl RecordedRequest {
    /// `"METHOD /path"`, handy for asserting request order.
    #[must_use]
    pub fn line(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

#[derive(Debug, Clone)]
struct CannedResponse {
    status: StatusCode,
    body: String,
}

#[derive(Default)]
struct MockState {
    requests: Mutex<Vec<RecordedRequest>>,
    routes: Mutex<HashMap<(Method, String), CannedResponse>>,
}

/// In-process stand-in for the school-management backend.
pub struct MockBackend {
    addr: SocketAddr,
    state: Arc<MockState>,
    shutdown: Mutex<Option<oneshot::Sender<()>>>,
    server: Mutex<Option<JoinHandle<()>>>,
}

impl MockBackend {
    /// Bind to an ephemeral port and start serving.
    ///
    /// Unconfigured routes answer 404 "Not found".
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn start() -> std::io::Result<Self> {
        let state = Arc::new(MockState::default());
        let app = Router::new().fallback(handle).with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (shutdown, stopped) = oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = stopped.await;
            });
            if let Err(e) = serve.await {
                tracing::error!(error = %e, "Mock backend stopped");
            }
        });

        Ok(Self {
            addr,
            state,
            shutdown: Mutex::new(Some(shutdown)),
            server: Mutex::new(Some(server)),
        })
    }

    /// Stop serving and close every open connection. Later requests fail at
    /// the transport level.
    pub async fn stop(&self) {
        let shutdown = self
            .shutdown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(shutdown) = shutdown {
            let _ = shutdown.send(());
        }

        let server = self
            .server
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(server) = server
            && let Err(e) = server.await
        {
            tracing::error!(error = %e, "Mock backend task failed");
        }
    }

    /// Start with the standard school fixture: two students, two teachers,
    /// a working login for `alice` and every mutation answering 200.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn with_school() -> std::io::Result<Self> {
        let backend = Self::start().await?;
        backend.json(Method::GET, "/api/students", 200, &fixtures::students());
        backend.json(Method::GET, "/api/teachers", 200, &fixtures::teachers());
        backend.json(Method::POST, "/api/auth/login", 200, &fixtures::login("ADMIN"));
        backend.json(Method::GET, "/health", 200, &json!({"status": "UP"}));
        backend.on(Method::POST, "/api/auth/register", 200, "User registered successfully");
        backend.on(Method::POST, "/api/admin/users", 200, "");
        for id in [1, 2, 10, 11] {
            backend.on(Method::PUT, &format!("/api/admin/users/{id}"), 200, "");
            backend.on(Method::DELETE, &format!("/api/admin/users/{id}"), 200, "");
            backend.on(Method::PUT, &format!("/api/admin/unassign/{id}"), 200, "");
            for teacher in [10, 11] {
                backend.on(
                    Method::PUT,
                    &format!("/api/admin/assign/{id}/to/{teacher}"),
                    200,
                    "",
                );
            }
        }
        Ok(backend)
    }

    /// Answer `method path` with `status` and a raw body.
    pub fn on(&self, method: Method, path: &str, status: u16, body: &str) {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self.state
            .routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                (method, path.to_owned()),
                CannedResponse {
                    status,
                    body: body.to_owned(),
                },
            );
    }

    /// Answer `method path` with `status` and a JSON body.
    pub fn json(&self, method: Method, path: &str, status: u16, body: &Value) {
        self.on(method, path, status, &body.to_string());
    }

    /// Every request received so far, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// `"METHOD /path"` of every request so far.
    #[must_use]
    pub fn request_lines(&self) -> Vec<String> {
        self.requests().iter().map(RecordedRequest::line).collect()
    }

    /// `"METHOD /path"` of every non-GET request so far.
    #[must_use]
    pub fn mutation_lines(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter(|r| r.method != Method::GET)
            .map(RecordedRequest::line)
            .collect()
    }

    /// Forget the recorded requests.
    pub fn clear_requests(&self) {
        self.state
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Server root, e.g. `http://127.0.0.1:4321`.
    #[must_use]
    pub fn root_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client configuration pointing at this backend's `/api`.
    ///
    /// # Errors
    ///
    /// Returns an error if the address does not form a valid URL.
    pub fn config(&self, session_file: PathBuf) -> Result<ClientConfig, url::ParseError> {
        let api_url = Url::parse(&format!("{}/api", self.root_url()))?;
        Ok(ClientConfig::for_api(api_url, session_file))
    }

    /// A session manager on `store`, starting on the login screen.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn manager(&self, store: impl SessionStore + 'static) -> Result<SessionManager, TestError> {
        let config = self.config(temp_session_file())?;
        let api = ApiClient::new(&config)?;
        Ok(SessionManager::new(
            &config,
            api,
            store,
            Navigator::new(Screen::Login),
            Notifier::new(config.toast_ttl),
        ))
    }
}

/// A session manager whose API points at a port nothing listens on.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn offline_manager(store: impl SessionStore + 'static) -> Result<SessionManager, TestError> {
    let config = ClientConfig::for_api(Url::parse(DEAD_API_URL)?, temp_session_file());
    let api = ApiClient::new(&config)?;
    Ok(SessionManager::new(
        &config,
        api,
        store,
        Navigator::new(Screen::Login),
        Notifier::new(config.toast_ttl),
    ))
}

/// Failures while wiring a test client.
#[derive(Debug, Error)]
pub enum TestError {
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Client error: {0}")]
    Api(#[from] ApiError),
}

/// A memory store holding a persisted session for `role`.
///
/// # Errors
///
/// Never fails for a memory store; the signature follows [`SessionStore`].
pub fn logged_in_store(token: &str, role: &str) -> Result<MemoryStore, StoreError> {
    let store = MemoryStore::new();
    store.set(keys::TOKEN, token)?;
    store.set(keys::EMAIL, "alice@school.edu")?;
    store.set(keys::ROLE, role)?;
    Ok(store)
}

/// A fresh path under the system temp directory.
#[must_use]
pub fn temp_session_file() -> PathBuf {
    std::env::temp_dir()
        .join(format!("schoolhouse-it-{}", uuid::Uuid::new_v4()))
        .join("session.json")
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_owned();
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let body = serde_json::from_slice(&body).ok();

    state
        .requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            authorization,
            body,
        });

    let canned = state
        .routes
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&(method, path))
        .cloned();

    match canned {
        Some(CannedResponse { status, body }) if body.starts_with(['{', '[']) => (
            status,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Some(CannedResponse { status, body }) => (status, body).into_response(),
        None => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

/// JSON bodies shaped like the backend's responses.
pub mod fixtures {
    use serde_json::{Value, json};

    /// `ada` (unassigned) and `ben` (assigned to `curie`).
    #[must_use]
    pub fn students() -> Value {
        json!([
            {
                "id": 1,
                "username": "ada",
                "email": "ada@school.edu",
                "department": "Math",
                "role": "STUDENT",
                "assignedTeacher": null
            },
            {
                "id": 2,
                "username": "ben",
                "email": "ben@school.edu",
                "department": "Physics",
                "role": "STUDENT",
                "assignedTeacher": {
                    "id": 10,
                    "username": "curie",
                    "email": "curie@school.edu",
                    "department": "Physics",
                    "role": "TEACHER"
                }
            }
        ])
    }

    /// `curie` (teaching `ben`) and `bohr` (no students, null list).
    #[must_use]
    pub fn teachers() -> Value {
        json!([
            {
                "id": 10,
                "username": "curie",
                "email": "curie@school.edu",
                "department": "Physics",
                "role": "TEACHER",
                "assignedStudents": [
                    {"id": 2, "username": "ben", "email": "ben@school.edu", "department": "Physics"}
                ]
            },
            {
                "id": 11,
                "username": "bohr",
                "email": "bohr@school.edu",
                "department": "Physics",
                "role": "TEACHER",
                "assignedStudents": null
            }
        ])
    }

    /// A login response for `alice` with token `abc`.
    #[must_use]
    pub fn login(role: &str) -> Value {
        json!({"token": "abc", "email": "a@b.com", "role": role, "username": "alice"})
    }
}
