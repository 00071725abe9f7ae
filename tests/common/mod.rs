//! In-process mock of the student-management backend.

#![allow(dead_code)]

use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use studentdesk::config::Config;
use studentdesk::notify::ToastLog;
use studentdesk::AppState;

/// A request as the backend saw it
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Default)]
pub struct Backend {
    requests: Mutex<Vec<Recorded>>,
    students: Mutex<Vec<Value>>,
    expired: AtomicBool,
    broken: AtomicBool,
}

const TOKENS: [&str; 4] = ["abc", "fast", "slow", "persisted"];

impl Backend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_students(ids: &[i64]) -> Arc<Self> {
        let backend = Self::default();
        *backend.students.lock() = ids.iter().map(|&id| student(id)).collect();
        Arc::new(backend)
    }

    /// From now on every authenticated route answers 401
    pub fn expire_sessions(&self) {
        self.expired.store(true, Ordering::SeqCst);
    }

    /// From now on every student and photo route answers a bare 500
    pub fn break_server(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().clone()
    }

    pub fn requests_to(&self, method: &str, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    pub fn student_ids(&self) -> Vec<i64> {
        self.students
            .lock()
            .iter()
            .filter_map(|s| s["id"].as_i64())
            .collect()
    }

    fn record(&self, method: &str, path: &str, headers: &HeaderMap, body: Value) {
        self.requests.lock().push(Recorded {
            method: method.to_string(),
            path: path.to_string(),
            authorization: headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body,
        });
    }

    /// Response to send instead of the real one, if any
    fn reject(&self, headers: &HeaderMap) -> Option<Response> {
        if self.broken.load(Ordering::SeqCst) {
            return Some(StatusCode::INTERNAL_SERVER_ERROR.into_response());
        }
        if !self.authorized(headers) {
            return Some(login_required());
        }
        None
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        if self.expired.load(Ordering::SeqCst) {
            return false;
        }
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|token| TOKENS.contains(&token))
            .unwrap_or(false)
    }
}

pub fn student(id: i64) -> Value {
    json!({
        "id": id,
        "name": format!("Student{}", id),
        "surname": "Silva",
        "email": format!("student{}@school.com", id),
        "age": 18 + id,
        "weight": 60.5,
        "height": 1.7,
        "Photos": if id % 2 == 1 {
            json!([{ "id": id, "url": format!("http://cdn/{}.jpg", id) }])
        } else {
            json!([])
        },
    })
}

fn errors(status: StatusCode, messages: &[&str]) -> Response {
    (status, Json(json!({ "errors": messages }))).into_response()
}

fn login_required() -> Response {
    errors(StatusCode::UNAUTHORIZED, &["Login required"])
}

async fn create_token(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    backend.record("POST", "/tokens", &headers, body.clone());

    let email = body["email"].as_str().unwrap_or_default().to_string();
    let token = match body["password"].as_str().unwrap_or_default() {
        "secret" if email == "a@b.com" => "abc",
        "slowpass" => {
            tokio::time::sleep(Duration::from_millis(300)).await;
            "slow"
        }
        "fastpass" => "fast",
        "badtoken" => "bad\ntoken",
        _ => return errors(StatusCode::UNAUTHORIZED, &["Invalid credentials"]),
    };

    Json(json!({
        "token": token,
        "user": { "id": 1, "name": "A", "email": email },
    }))
    .into_response()
}

async fn create_user(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    backend.record("POST", "/users", &headers, body.clone());

    match body["email"].as_str().unwrap_or_default() {
        "taken@b.com" => errors(
            StatusCode::BAD_REQUEST,
            &["Email already exists", "Choose another email"],
        ),
        "boom@b.com" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        "slow@b.com" => {
            tokio::time::sleep(Duration::from_millis(300)).await;
            Json(json!({ "id": 3, "name": body["name"], "email": "slow@b.com" })).into_response()
        }
        email => Json(json!({ "id": 2, "name": body["name"], "email": email })).into_response(),
    }
}

async fn update_user(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    backend.record("PUT", "/users", &headers, body.clone());

    if let Some(rejected) = backend.reject(&headers) {
        return rejected;
    }
    Json(json!({ "id": 1, "name": body["name"], "email": body["email"] })).into_response()
}

async fn list_students(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    backend.record("GET", "/students", &headers, Value::Null);

    if let Some(rejected) = backend.reject(&headers) {
        return rejected;
    }
    Json(Value::Array(backend.students.lock().clone())).into_response()
}

async fn create_student(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    backend.record("POST", "/students", &headers, body.clone());

    if let Some(rejected) = backend.reject(&headers) {
        return rejected;
    }
    if body["email"] == "dup@school.com" {
        return errors(StatusCode::BAD_REQUEST, &["Email already exists"]);
    }

    let mut students = backend.students.lock();
    let id = students
        .iter()
        .filter_map(|s| s["id"].as_i64())
        .max()
        .unwrap_or(0)
        + 1;
    let mut created = body;
    created["id"] = json!(id);
    created["Photos"] = json!([]);
    students.push(created.clone());
    Json(created).into_response()
}

async fn show_student(
    State(backend): State<Arc<Backend>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    backend.record("GET", &format!("/students/{}", id), &headers, Value::Null);

    if let Some(rejected) = backend.reject(&headers) {
        return rejected;
    }
    let students = backend.students.lock();
    match students.iter().find(|s| s["id"] == id) {
        Some(student) => Json(student.clone()).into_response(),
        None => errors(StatusCode::BAD_REQUEST, &["Student not found"]),
    }
}

async fn update_student(
    State(backend): State<Arc<Backend>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    backend.record("PUT", &format!("/students/{}", id), &headers, body.clone());

    if let Some(rejected) = backend.reject(&headers) {
        return rejected;
    }
    let mut students = backend.students.lock();
    let Some(student) = students.iter_mut().find(|s| s["id"] == id) else {
        return errors(StatusCode::BAD_REQUEST, &["Student not found"]);
    };
    if let (Some(target), Some(changes)) = (student.as_object_mut(), body.as_object()) {
        for (key, value) in changes {
            target.insert(key.clone(), value.clone());
        }
    }
    Json(student.clone()).into_response()
}

async fn delete_student(
    State(backend): State<Arc<Backend>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    backend.record("DELETE", &format!("/students/{}", id), &headers, Value::Null);

    if let Some(rejected) = backend.reject(&headers) {
        return rejected;
    }
    backend.students.lock().retain(|s| s["id"] != id);
    StatusCode::OK.into_response()
}

async fn upload_photo(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let mut fields = serde_json::Map::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        if name == "photo" {
            fields.insert("file_name".into(), json!(field.file_name()));
            fields.insert("content_type".into(), json!(field.content_type()));
            let bytes = field.bytes().await.unwrap_or_default();
            fields.insert("size".into(), json!(bytes.len()));
        } else {
            let text = field.text().await.unwrap_or_default();
            fields.insert(name, json!(text));
        }
    }
    let body = Value::Object(fields);
    backend.record("POST", "/photos", &headers, body.clone());

    if let Some(rejected) = backend.reject(&headers) {
        return rejected;
    }
    let file_name = body["file_name"].as_str().unwrap_or("photo").to_string();
    Json(json!({
        "id": 10,
        "filename": file_name,
        "url": format!("http://cdn/{}", file_name),
    }))
    .into_response()
}

/// Serve `backend` on an ephemeral port and return its base URL
pub async fn spawn(backend: Arc<Backend>) -> String {
    let router = Router::new()
        .route("/tokens", post(create_token))
        .route("/users", post(create_user).put(update_user))
        .route("/students", get(list_students).post(create_student))
        .route(
            "/students/:id",
            get(show_student).put(update_student).delete(delete_student),
        )
        .route("/photos", post(upload_photo))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind 127.0.0.1:0");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            eprintln!("mock backend error: {e:?}");
        }
    });

    format!("http://{}", addr)
}

/// Everything a test needs to drive pages against a mock backend
pub struct Harness {
    pub backend: Arc<Backend>,
    pub app: Arc<AppState>,
    pub toasts: Arc<ToastLog>,
    pub config: Config,
    _dir: Arc<TempDir>,
}

impl Harness {
    pub async fn start(backend: Arc<Backend>) -> Self {
        let base_url = spawn(backend.clone()).await;
        let dir = Arc::new(TempDir::new().expect("temp dir"));

        let mut config = Config::default();
        config.api.base_url = base_url;
        config.api.timeout_secs = 5;
        config.session.file = dir.path().join("session.json");

        Self::with_config(backend, config, dir)
    }

    /// A second process sharing the same backend and session file
    pub fn restart(&self) -> Self {
        Self::with_config(self.backend.clone(), self.config.clone(), self._dir.clone())
    }

    fn with_config(backend: Arc<Backend>, config: Config, dir: Arc<TempDir>) -> Self {
        let toasts = Arc::new(ToastLog::new());
        let app = Arc::new(AppState::new(config.clone(), toasts.clone()).expect("app state"));
        Self {
            backend,
            app,
            toasts,
            config,
            _dir: dir,
        }
    }

    /// Log in as a@b.com and forget the toasts it produced
    pub async fn logged_in(backend: Arc<Backend>) -> Self {
        let harness = Self::start(backend).await;
        let mut page = studentdesk::pages::LoginPage::new(harness.app.clone());
        page.email = "a@b.com".to_string();
        page.password = "secret".to_string();
        assert!(page.submit().await.is_done());
        harness.toasts.drain();
        harness
    }
}
