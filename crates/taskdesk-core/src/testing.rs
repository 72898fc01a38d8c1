//! Test doubles shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::StatusCode;

use crate::api::pipeline::{AuthEndpoints, AuthPipeline};
use crate::api::transport::{ApiRequest, ApiResponse, Transport};
use crate::api::ApiError;
use crate::auth::SessionStore;
use crate::models::{Task, User};
use crate::navigation::Navigator;
use crate::storage::{
    KeyValueStore, MemoryStore, StorageError, StorageResult, ACCESS_CREDENTIAL_KEY, IDENTITY_KEY,
    RENEWAL_CREDENTIAL_KEY,
};

type Handler = dyn Fn(&ApiRequest) -> Result<ApiResponse, ApiError> + Send + Sync;

/// Transport answering from a closure and recording every request it sees.
pub struct FakeTransport {
    handler: Box<Handler>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl FakeTransport {
    pub fn new(
        handler: impl Fn(&ApiRequest) -> Result<ApiResponse, ApiError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests sent to `path`
    pub fn count(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .count()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        // Suspend once so concurrent callers interleave like real network calls
        tokio::task::yield_now().await;
        self.requests.lock().unwrap().push(request.clone());
        (self.handler)(request)
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    redirects: AtomicUsize,
}

impl RecordingNavigator {
    pub fn redirects(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl Navigator for RecordingNavigator {
    fn redirect_to_login(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}

/// Backend whose every operation fails
#[derive(Default)]
pub struct FailingStore;

impl FailingStore {
    fn error() -> StorageError {
        StorageError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk unavailable"))
    }
}

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> StorageResult<Option<String>> {
        Err(Self::error())
    }

    fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
        Err(Self::error())
    }

    fn remove(&self, _key: &str) -> StorageResult<()> {
        Err(Self::error())
    }
}

/// Memory backend whose `set` fails on exactly the n-th call
pub struct FlakyStore {
    inner: MemoryStore,
    fail_on: usize,
    sets: AtomicUsize,
}

impl FlakyStore {
    pub fn failing_on_set(fail_on: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_on,
            sets: AtomicUsize::new(0),
        }
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        if self.sets.fetch_add(1, Ordering::SeqCst) + 1 == self.fail_on {
            return Err(FailingStore::error());
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.inner.remove(key)
    }
}

pub fn identity(id: i64, admin: bool) -> User {
    User {
        id,
        email: format!("user{}@example.com", id),
        first_name: "Test".to_string(),
        last_name: format!("User{}", id),
        is_staff: admin,
        is_superuser: false,
    }
}

pub fn task(id: &str, title: &str, completed: bool) -> Task {
    let created = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
    Task {
        id: id.to_string(),
        title: title.to_string(),
        description: String::new(),
        completed,
        is_confirmed_by_admin: false,
        created_at: created,
        updated_at: created,
        user: Some(1),
        user_email: Some("user1@example.com".to_string()),
        user_name: Some("Test User1".to_string()),
        time_spent_minutes: None,
        completion_notes: String::new(),
    }
}

pub fn json_response(status: u16, body: &str) -> ApiResponse {
    ApiResponse::new(StatusCode::from_u16(status).unwrap(), body)
}

/// Build a pipeline over `transport`. `session` is `(access, renewal)`; the
/// stored identity is `identity(1, false)`.
pub fn pipeline_with(
    transport: Arc<FakeTransport>,
    session: Option<(&str, Option<&str>)>,
) -> (AuthPipeline, Arc<SessionStore>, Arc<RecordingNavigator>) {
    let backend = Arc::new(MemoryStore::new());
    if let Some((access, renewal)) = session {
        backend.set(ACCESS_CREDENTIAL_KEY, access).unwrap();
        if let Some(renewal) = renewal {
            backend.set(RENEWAL_CREDENTIAL_KEY, renewal).unwrap();
        }
        let json = serde_json::to_string(&identity(1, false)).unwrap();
        backend.set(IDENTITY_KEY, &json).unwrap();
    }

    let sessions = Arc::new(SessionStore::load(backend));
    let navigator = Arc::new(RecordingNavigator::default());
    let pipeline = AuthPipeline::new(
        transport,
        sessions.clone(),
        navigator.clone(),
        AuthEndpoints::default(),
    );
    (pipeline, sessions, navigator)
}
