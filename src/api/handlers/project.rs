use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use crate::state::AppState;
use crate::api::extractors::body::{ApiJson, ApiMultipart, ApiQuery};
use crate::api::dtos::{
    requests::{ActivateProjectRequest, AttachNoteRequest, CreateTextProjectRequest, TeacherProjectsQuery, UpdateProjectRequest},
    responses::MessageResponse,
};
use crate::domain::services::project_service::{FileUpload, ProjectPatch};
use crate::error::AppError;
use std::sync::Arc;
use tracing::debug;

pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

fn bad_multipart(e: impl std::fmt::Display) -> AppError {
    AppError::Validation(format!("Invalid multipart body: {}", e))
}

/// Multipart submission: `studentId`, `title`, `scale`, `teacherName` text parts and an optional `pdf` file part.
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    ApiMultipart(mut multipart): ApiMultipart,
) -> Result<impl IntoResponse, AppError> {
    let mut student_id = None;
    let mut title = String::new();
    let mut scale = String::new();
    let mut teacher_name = String::new();
    let mut upload = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "pdf" => {
                let file_name = field.file_name().unwrap_or("upload.pdf").to_string();
                let data = field.bytes().await.map_err(bad_multipart)?;
                if !data.is_empty() {
                    upload = Some(FileUpload { file_name, data: data.to_vec() });
                }
            }
            "studentId" | "student_id" => student_id = Some(field.text().await.map_err(bad_multipart)?),
            "title" => title = field.text().await.map_err(bad_multipart)?,
            "scale" => scale = field.text().await.map_err(bad_multipart)?,
            "teacherName" | "teacher_name" => teacher_name = field.text().await.map_err(bad_multipart)?,
            other => debug!("Ignoring multipart field {}", other),
        }
    }

    let project = state.project_service
        .create_file_project(student_id, title, scale, teacher_name, upload)
        .await?;

    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn create_text_project(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<CreateTextProjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    let project = state.project_service
        .create_text_project(payload.teacher_name, payload.title, payload.scale)
        .await?;

    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn list_projects(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.project_service.list_all().await?))
}

pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.project_service.get_by_id(&id).await?))
}

pub async fn update_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateProjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    let patch = ProjectPatch {
        title: payload.title,
        scale: payload.scale,
        teacher_name: payload.teacher_name,
    };
    Ok(Json(state.project_service.update_details(&id, patch).await?))
}

pub async fn attach_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<AttachNoteRequest>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.project_service.attach_note(&id, payload.note).await?))
}

pub async fn activate_project(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<ActivateProjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.project_service.activate_by_token(&payload.qrnumber).await?))
}

pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let confirmation = state.project_service.delete_by_id(&id).await?;
    Ok(Json(MessageResponse::new(confirmation)))
}

pub async fn get_project_pdf(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let bytes = state.project_service.pdf_for(&id).await?;
    Ok(([(header::CONTENT_TYPE, "application/pdf")], bytes))
}

pub async fn inactive_by_student(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.project_service.by_student(&student_id, false).await?))
}

pub async fn active_by_student(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.project_service.by_student(&student_id, true).await?))
}

/// Defaults to the unclaimed, not yet activated templates of a teacher.
pub async fn by_teacher(
    State(state): State<Arc<AppState>>,
    Path(teacher_name): Path<String>,
    ApiQuery(query): ApiQuery<TeacherProjectsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let active = query.active.unwrap_or(false);
    let unassigned = query.unassigned.unwrap_or(!active);
    Ok(Json(state.project_service.by_teacher(&teacher_name, active, unassigned).await?))
}

pub async fn active_by_teacher_and_student(
    State(state): State<Arc<AppState>>,
    Path((teacher_name, student_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.project_service.by_teacher_and_student(&teacher_name, &student_id).await?))
}
