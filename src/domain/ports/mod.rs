use crate::domain::models::{
    project::{NewProject, Project, ProjectDetails},
    user::{ClassFilter, Role, User},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    async fn list_all(&self) -> Result<Vec<User>, AppError>;
    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, AppError>;
    async fn list_students_by_teacher(&self, teacher_name: &str) -> Result<Vec<User>, AppError>;
    async fn list_by_class(&self, filter: &ClassFilter) -> Result<Vec<User>, AppError>;
    async fn update(&self, user: &User) -> Result<User, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

/// Project persistence. `create` must reject a duplicate `qrnumber` with a
/// unique-violation error so callers can retry with a fresh token.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn create(&self, project: &NewProject) -> Result<Project, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Project>, AppError>;
    async fn find_by_qrnumber(&self, qrnumber: &str) -> Result<Option<Project>, AppError>;
    async fn find_by_title(&self, title: &str) -> Result<Option<Project>, AppError>;
    async fn list_all(&self) -> Result<Vec<Project>, AppError>;
    async fn list_by_student(&self, student_id: &str, active: bool) -> Result<Vec<Project>, AppError>;
    async fn list_by_teacher(&self, teacher_name: &str, active: bool, unassigned_only: bool) -> Result<Vec<Project>, AppError>;
    async fn list_by_teacher_and_student(&self, teacher_name: &str, student_id: &str, active: bool) -> Result<Vec<Project>, AppError>;
    async fn exists_for_student(&self, student_id: &str) -> Result<bool, AppError>;
    // Column-scoped writes: none of them touch `active` except activation,
    // which only ever sets it. `None` means no row matched.
    async fn set_note(&self, id: &str, note: &str, at: DateTime<Utc>) -> Result<Option<Project>, AppError>;
    async fn activate_by_qrnumber(&self, qrnumber: &str, at: DateTime<Utc>) -> Result<Option<Project>, AppError>;
    async fn update_details(&self, id: &str, details: &ProjectDetails, at: DateTime<Utc>) -> Result<Option<Project>, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait FileStore: Send + Sync {
    /// Persists the upload and returns the reference stored on the project.
    async fn save(&self, original_name: &str, data: &[u8]) -> Result<String, AppError>;
    async fn read(&self, reference: &str) -> Result<Vec<u8>, AppError>;
    async fn remove(&self, reference: &str) -> Result<(), AppError>;
}
