use project_tracker::{
    api::router::create_router,
    state::AppState,
    config::Config,
    infra::{
        repositories::{sqlite_project_repo::SqliteProjectRepo, sqlite_user_repo::SqliteUserRepo},
        storage::local_file_store::LocalFileStore,
    },
};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use project_tracker::domain::{
    models::project::{NewProject, Project, ProjectDetails},
    ports::ProjectRepository,
};
use project_tracker::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, header, StatusCode},
    response::Response,
    Router,
};
use std::str::FromStr;
use tower::ServiceExt;
use serde_json::Value;

pub const MULTIPART_BOUNDARY: &str = "----project-tracker-boundary";

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub upload_dir: String,
    pub state: Arc<AppState>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);
        let upload_dir = format!("test_uploads_{}", Uuid::new_v4());

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .busy_timeout(std::time::Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            jwt_secret: "integration-test-secret".to_string(),
            upload_dir: upload_dir.clone(),
            session_ttl_days: 15,
            cookie_secure: false,
        };

        let state = Arc::new(AppState::new(
            config,
            Arc::new(SqliteUserRepo::new(pool.clone())),
            Arc::new(SqliteProjectRepo::new(pool.clone())),
            Arc::new(LocalFileStore::new(upload_dir.clone())),
        ));

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            upload_dir,
            state,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn send_json(&self, method: &str, uri: &str, body: Value) -> Response {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap()
        ).await
    }

    pub async fn send_json_authed(&self, method: &str, uri: &str, cookie: &str, body: Value) -> Response {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::COOKIE, cookie)
                .body(Body::from(body.to_string()))
                .unwrap()
        ).await
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.send(Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn delete_authed(&self, uri: &str, cookie: &str) -> Response {
        self.send(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap()
        ).await
    }

    /// Signs up an account and returns `(user_id, session cookie header value)`.
    pub async fn signup(&self, username: &str, password: &str, roles: &[&str]) -> (String, String) {
        let response = self.send_json("POST", "/api/v1/auth/signup", serde_json::json!({
            "username": username,
            "password": password,
            "roles": roles,
        })).await;

        if response.status() != StatusCode::CREATED {
            panic!("Signup failed in test helper: status {}", response.status());
        }

        let cookie = session_cookie(&response).expect("No jwt cookie returned");
        let body = parse_body(response).await;
        (body["id"].as_str().unwrap().to_string(), cookie)
    }

    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self.send_json("POST", "/api/v1/auth/login", serde_json::json!({
            "username": username,
            "password": password,
        })).await;

        if !response.status().is_success() {
            panic!("Login failed in test helper: status {}", response.status());
        }

        session_cookie(&response).expect("No jwt cookie returned")
    }

    pub async fn create_student(&self, username: &str, extra: Value) -> String {
        let mut payload = serde_json::json!({
            "username": username,
            "password": "student-pass",
            "roles": ["Student"],
        });
        if let (Some(obj), Some(extra)) = (payload.as_object_mut(), extra.as_object()) {
            for (k, v) in extra {
                obj.insert(k.clone(), v.clone());
            }
        }

        let response = self.send_json("POST", "/api/v1/users/students", payload).await;
        assert_eq!(response.status(), StatusCode::CREATED, "student creation failed");

        let user = self.state.user_repo.find_by_username(username).await.unwrap().unwrap();
        user.id
    }

    pub async fn create_text_project(&self, teacher_name: &str, title: &str, scale: &str) -> Value {
        let response = self.send_json("POST", "/api/v1/projects/text", serde_json::json!({
            "teacherName": teacher_name,
            "title": title,
            "scale": scale,
        })).await;
        assert_eq!(response.status(), StatusCode::CREATED, "text project creation failed");
        parse_body(response).await
    }

    pub async fn create_file_project(&self, fields: &[(&str, &str)], pdf: Option<(&str, &[u8])>) -> Response {
        let body = multipart_body(fields, pdf);
        self.send(
            Request::builder()
                .method("POST")
                .uri("/api/v1/projects")
                .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY))
                .body(Body::from(body))
                .unwrap()
        ).await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
        let _ = std::fs::remove_dir_all(&self.upload_dir);
    }
}

#[allow(dead_code)]
pub fn session_cookie(response: &Response) -> Option<String> {
    response.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .find(|c| c.starts_with("jwt="))
        .map(|c| c.split(';').next().unwrap_or_default().to_string())
}

#[allow(dead_code)]
pub fn multipart_body(fields: &[(&str, &str)], pdf: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
            MULTIPART_BOUNDARY, name, value
        ).as_bytes());
    }
    if let Some((file_name, data)) = pdf {
        body.extend_from_slice(format!(
            "--{}\r\nContent-Disposition: form-data; name=\"pdf\"; filename=\"{}\"\r\nContent-Type: application/pdf\r\n\r\n",
            MULTIPART_BOUNDARY, file_name
        ).as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
    body
}

#[allow(dead_code)]
pub async fn parse_body(response: Response) -> Value {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    if bytes.is_empty() {
        panic!("Response body is empty. Status: {}", status);
    }
    match serde_json::from_slice(&bytes) {
        Ok(v) => v,
        Err(e) => panic!("Failed to parse JSON: {:?}. Status: {}. Body: {:?}", e, status, String::from_utf8_lossy(&bytes))
    }
}

/// Delegating project repository that can slow down reads, hide existing
/// qrnumbers from lookups, and count inserts.
#[allow(dead_code)]
pub struct InstrumentedProjectRepo {
    inner: Arc<dyn ProjectRepository>,
    pub find_by_id_delay: Duration,
    pub hide_qrnumbers: bool,
    pub creates: AtomicUsize,
}

#[allow(dead_code)]
impl InstrumentedProjectRepo {
    pub fn wrap(inner: Arc<dyn ProjectRepository>) -> Self {
        Self {
            inner,
            find_by_id_delay: Duration::ZERO,
            hide_qrnumbers: false,
            creates: AtomicUsize::new(0),
        }
    }

    pub fn create_calls(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProjectRepository for InstrumentedProjectRepo {
    async fn create(&self, project: &NewProject) -> Result<Project, AppError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.inner.create(project).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Project>, AppError> {
        let found = self.inner.find_by_id(id).await;
        if !self.find_by_id_delay.is_zero() {
            tokio::time::sleep(self.find_by_id_delay).await;
        }
        found
    }

    async fn find_by_qrnumber(&self, qrnumber: &str) -> Result<Option<Project>, AppError> {
        if self.hide_qrnumbers {
            return Ok(None);
        }
        self.inner.find_by_qrnumber(qrnumber).await
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Project>, AppError> {
        self.inner.find_by_title(title).await
    }

    async fn list_all(&self) -> Result<Vec<Project>, AppError> {
        self.inner.list_all().await
    }

    async fn list_by_student(&self, student_id: &str, active: bool) -> Result<Vec<Project>, AppError> {
        self.inner.list_by_student(student_id, active).await
    }

    async fn list_by_teacher(&self, teacher_name: &str, active: bool, unassigned_only: bool) -> Result<Vec<Project>, AppError> {
        self.inner.list_by_teacher(teacher_name, active, unassigned_only).await
    }

    async fn list_by_teacher_and_student(&self, teacher_name: &str, student_id: &str, active: bool) -> Result<Vec<Project>, AppError> {
        self.inner.list_by_teacher_and_student(teacher_name, student_id, active).await
    }

    async fn exists_for_student(&self, student_id: &str) -> Result<bool, AppError> {
        self.inner.exists_for_student(student_id).await
    }

    async fn set_note(&self, id: &str, note: &str, at: DateTime<Utc>) -> Result<Option<Project>, AppError> {
        self.inner.set_note(id, note, at).await
    }

    async fn activate_by_qrnumber(&self, qrnumber: &str, at: DateTime<Utc>) -> Result<Option<Project>, AppError> {
        self.inner.activate_by_qrnumber(qrnumber, at).await
    }

    async fn update_details(&self, id: &str, details: &ProjectDetails, at: DateTime<Utc>) -> Result<Option<Project>, AppError> {
        self.inner.update_details(id, details, at).await
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.inner.delete(id).await
    }
}
