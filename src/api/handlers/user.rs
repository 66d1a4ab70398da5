use axum::{extract::{State, Path}, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::api::extractors::{auth::AuthUser, body::{ApiJson, ApiQuery}};
use crate::api::dtos::{
    requests::{CreateStudentRequest, CreateTeacherRequest, StudentsQuery, UpdateUserRequest},
    responses::{MessageResponse, StudentTeacherResponse},
};
use crate::domain::models::user::{ClassFilter, Role, User, UserProfile};
use crate::domain::services::non_empty;
use crate::error::AppError;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, error};

async fn create_account(
    state: &AppState,
    username: String,
    password: String,
    roles: Vec<Role>,
    profile: UserProfile,
) -> Result<User, AppError> {
    if state.user_repo.find_by_username(&username).await?.is_some() {
        return Err(AppError::Conflict("Duplicate username".into()));
    }

    let password_hash = state.auth_service.hash_password(&password).await?;
    let user = User::new(username, password_hash, roles, profile);
    let created = state.user_repo.create(&user).await?;

    info!("Created user {} with roles {:?}", created.id, created.roles);
    Ok(created)
}

pub async fn create_student(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<CreateStudentRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.username.trim().is_empty() || payload.password.is_empty() || payload.roles.is_empty() {
        return Err(AppError::Validation("Username, password and roles are required".into()));
    }

    let created = create_account(&state, payload.username, payload.password, payload.roles, payload.profile).await?;

    Ok((StatusCode::CREATED, Json(MessageResponse::new(format!("New user {} created", created.username)))))
}

pub async fn create_teacher(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<CreateTeacherRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = payload.email.filter(|v| !v.trim().is_empty());
    let phone_number = payload.phone_number.filter(|v| !v.trim().is_empty());

    if payload.username.trim().is_empty() || payload.password.is_empty() || payload.roles.is_empty()
        || email.is_none() || phone_number.is_none()
    {
        return Err(AppError::Validation("Username, password, roles, email, and phone number are required".into()));
    }

    let profile = UserProfile {
        email,
        phone_number,
        description: payload.description,
        ..Default::default()
    };
    let created = create_account(&state, payload.username, payload.password, payload.roles, profile).await?;

    Ok((StatusCode::CREATED, Json(MessageResponse::new(format!("New user {} created", created.username)))))
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let users = non_empty(state.user_repo.list_all().await?, "No users found")?;
    Ok(Json(users))
}

pub async fn list_students(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<StudentsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let students = match query.teacher_name.filter(|t| !t.trim().is_empty()) {
        Some(teacher_name) => non_empty(
            state.user_repo.list_students_by_teacher(&teacher_name).await?,
            "No students found for the specified teacher",
        )?,
        None => non_empty(state.user_repo.list_by_role(Role::Student).await?, "No users found")?,
    };
    Ok(Json(students))
}

pub async fn list_teachers(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let teachers = non_empty(state.user_repo.list_by_role(Role::Teacher).await?, "No users found")?;
    Ok(Json(teachers))
}

pub async fn students_by_class(
    State(state): State<Arc<AppState>>,
    ApiJson(filter): ApiJson<ClassFilter>,
) -> Result<impl IntoResponse, AppError> {
    let students = non_empty(state.user_repo.list_by_class(&filter).await?, "No users found")?;
    Ok(Json(students))
}

pub async fn student_teacher(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let student = state.user_repo.find_by_id(&id).await?
        .filter(|u| u.has_role(Role::Student))
        .ok_or(AppError::NotFound("Student not found".into()))?;

    Ok(Json(StudentTeacherResponse {
        id: student.id,
        teacher_name: student.teacher_name,
    }))
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    _admin: AuthUser,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.username.trim().is_empty() || payload.roles.is_empty() {
        return Err(AppError::Validation("All fields except password are required".into()));
    }

    let mut user = state.user_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    if let Some(duplicate) = state.user_repo.find_by_username(&payload.username).await? {
        if duplicate.id != user.id {
            return Err(AppError::Conflict("Duplicate username".into()));
        }
    }

    user.username = payload.username;
    user.roles = payload.roles;
    user.active = payload.active;
    if let Some(password) = payload.password.filter(|p| !p.is_empty()) {
        user.password_hash = state.auth_service.hash_password(&password).await?;
    }
    user.updated_at = Utc::now();

    let updated = state.user_repo.update(&user).await?;
    info!("Updated user {}", updated.id);

    Ok(Json(MessageResponse::new(format!("{} updated", updated.username))))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    _admin: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if state.project_repo.exists_for_student(&id).await? {
        return Err(AppError::Validation("User has assigned projects".into()));
    }

    let target = state.user_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    match state.user_repo.delete(&target.id).await {
        Ok(_) => {
            info!("Deleted user {}", target.id);
            Ok(Json(MessageResponse::new(format!("Username {} with ID {} deleted", target.username, target.id))))
        },
        Err(e) => {
            error!("Failed to delete user {}: {:?}", id, e);
            Err(e)
        }
    }
}
