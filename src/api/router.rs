use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Request},
    routing::{get, post, patch},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{health, auth, user, project};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Auth
        .route("/api/v1/auth/signup", post(auth::signup))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/logout", post(auth::logout))

        // Users
        .route("/api/v1/users", get(user::list_users))
        .route("/api/v1/users/{id}", patch(user::update_user).delete(user::delete_user))
        .route("/api/v1/users/students", get(user::list_students).post(user::create_student))
        .route("/api/v1/users/students/class", post(user::students_by_class))
        .route("/api/v1/users/students/{id}/teacher", get(user::student_teacher))
        .route("/api/v1/users/teachers", get(user::list_teachers).post(user::create_teacher))

        // Project lifecycle
        .route(
            "/api/v1/projects",
            get(project::list_projects)
                .post(project::create_project)
                .layer(DefaultBodyLimit::max(project::MAX_UPLOAD_BYTES)),
        )
        .route("/api/v1/projects/text", post(project::create_text_project))
        .route("/api/v1/projects/activate", patch(project::activate_project))
        .route("/api/v1/projects/{id}", get(project::get_project).patch(project::update_project).delete(project::delete_project))
        .route("/api/v1/projects/{id}/note", patch(project::attach_note))
        .route("/api/v1/projects/{id}/pdf", get(project::get_project_pdf))

        // Scoped project queries
        .route("/api/v1/projects/student/{student_id}", get(project::inactive_by_student))
        .route("/api/v1/projects/student/{student_id}/active", get(project::active_by_student))
        .route("/api/v1/projects/teacher/{teacher_name}", get(project::by_teacher))
        .route("/api/v1/projects/active/{teacher_name}/{student_id}", get(project::active_by_teacher_and_student))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
