use std::sync::Arc;
use chrono::Utc;
use tracing::{info, warn};
use crate::domain::models::{
    project::{NewProject, Project, ProjectDetails, ProjectWithUsername},
    user::Role,
};
use crate::domain::ports::{FileStore, ProjectRepository, UserRepository};
use crate::domain::services::{non_empty, token_allocator::{TokenAllocator, MAX_ALLOCATION_ATTEMPTS}};
use crate::error::AppError;

pub const UNKNOWN_USER: &str = "Unknown User";

pub struct FileUpload {
    pub file_name: String,
    pub data: Vec<u8>,
}

#[derive(Default)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub scale: Option<String>,
    pub teacher_name: Option<String>,
}

/// Create / note / activate / delete transitions for projects plus the
/// scoped read queries over them.
pub struct ProjectService {
    projects: Arc<dyn ProjectRepository>,
    users: Arc<dyn UserRepository>,
    files: Arc<dyn FileStore>,
    allocator: TokenAllocator,
}

fn required(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

impl ProjectService {
    pub fn new(projects: Arc<dyn ProjectRepository>, users: Arc<dyn UserRepository>, files: Arc<dyn FileStore>) -> Self {
        let allocator = TokenAllocator::new(projects.clone());
        Self::with_allocator(projects, users, files, allocator)
    }

    pub fn with_allocator(
        projects: Arc<dyn ProjectRepository>,
        users: Arc<dyn UserRepository>,
        files: Arc<dyn FileStore>,
        allocator: TokenAllocator,
    ) -> Self {
        Self { projects, users, files, allocator }
    }

    pub async fn create_file_project(
        &self,
        student_id: Option<String>,
        title: String,
        scale: String,
        teacher_name: String,
        upload: Option<FileUpload>,
    ) -> Result<Project, AppError> {
        required(&title, "title")?;
        required(&scale, "scale")?;
        required(&teacher_name, "teacherName")?;

        let student_id = student_id.filter(|s| !s.trim().is_empty());
        if let Some(sid) = &student_id {
            let student = self.users.find_by_id(sid).await?;
            if !student.map(|u| u.has_role(Role::Student)).unwrap_or(false) {
                return Err(AppError::Validation(format!("Student {} not found", sid)));
            }
        }

        let pdf = match upload {
            Some(file) => Some(self.files.save(&file.file_name, &file.data).await?),
            None => None,
        };

        match self.insert_with_fresh_token(student_id, title, scale, teacher_name, pdf.clone()).await {
            Ok(project) => Ok(project),
            Err(e) => {
                if let Some(path) = pdf {
                    if let Err(cleanup) = self.files.remove(&path).await {
                        warn!("Failed to remove orphaned upload {}: {:?}", path, cleanup);
                    }
                }
                Err(e)
            }
        }
    }

    pub async fn create_text_project(&self, teacher_name: String, title: String, scale: String) -> Result<Project, AppError> {
        required(&teacher_name, "teacherName")?;
        required(&title, "title")?;
        required(&scale, "scale")?;

        self.insert_with_fresh_token(None, title, scale, teacher_name, None).await
    }

    async fn insert_with_fresh_token(
        &self,
        student_id: Option<String>,
        title: String,
        scale: String,
        teacher_name: String,
        pdf: Option<String>,
    ) -> Result<Project, AppError> {
        let mut last_err = None;

        for _ in 0..MAX_ALLOCATION_ATTEMPTS {
            let qrnumber = self.allocator.allocate().await?;
            let new_project = NewProject::new(
                student_id.clone(), title.clone(), scale.clone(), teacher_name.clone(), qrnumber, pdf.clone(),
            );

            match self.projects.create(&new_project).await {
                Ok(project) => {
                    info!(project_id = %project.id, ticket = project.ticket, "Project created with {}", project.qrnumber);
                    return Ok(project);
                }
                Err(e) if e.is_unique_violation() => {
                    warn!("qrnumber {} lost an insert race, retrying", new_project.qrnumber);
                    last_err = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_err.unwrap_or(AppError::Internal))
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Project, AppError> {
        self.projects.find_by_id(id).await?
            .ok_or(AppError::NotFound("Project not found".into()))
    }

    pub async fn list_all(&self) -> Result<Vec<Project>, AppError> {
        non_empty(self.projects.list_all().await?, "No projects found")
    }

    pub async fn attach_note(&self, id: &str, note: String) -> Result<Project, AppError> {
        required(&note, "note")?;

        let updated = self.projects.set_note(id, &note, Utc::now()).await?
            .ok_or(AppError::NotFound("Project not found".into()))?;
        info!("Note attached to project {}", id);
        Ok(updated)
    }

    /// Re-activating an already active project is accepted.
    pub async fn activate_by_token(&self, qrnumber: &str) -> Result<Project, AppError> {
        required(qrnumber, "qrnumber")?;

        let updated = self.projects.activate_by_qrnumber(qrnumber, Utc::now()).await?
            .ok_or(AppError::NotFound("Project not found".into()))?;
        info!("Project {} activated via {}", updated.id, qrnumber);
        Ok(updated)
    }

    pub async fn update_details(&self, id: &str, patch: ProjectPatch) -> Result<Project, AppError> {
        let current = self.get_by_id(id).await?;
        let mut details = ProjectDetails {
            title: current.title,
            scale: current.scale,
            teacher_name: current.teacher_name,
        };

        if let Some(title) = patch.title {
            required(&title, "title")?;
            if let Some(existing) = self.projects.find_by_title(&title).await? {
                if existing.id != current.id {
                    return Err(AppError::Conflict("Duplicate project title".into()));
                }
            }
            details.title = title;
        }
        if let Some(scale) = patch.scale {
            required(&scale, "scale")?;
            details.scale = scale;
        }
        if let Some(teacher_name) = patch.teacher_name {
            required(&teacher_name, "teacherName")?;
            details.teacher_name = teacher_name;
        }

        let updated = self.projects.update_details(id, &details, Utc::now()).await?
            .ok_or(AppError::NotFound("Project not found".into()))?;
        info!("Project {} updated", id);
        Ok(updated)
    }

    pub async fn delete_by_id(&self, id: &str) -> Result<String, AppError> {
        let project = self.get_by_id(id).await?;
        self.projects.delete(&project.id).await?;

        info!("Project {} deleted", project.id);
        Ok(format!("Project '{}' with ID {} deleted", project.title, project.id))
    }

    pub async fn pdf_for(&self, id: &str) -> Result<Vec<u8>, AppError> {
        let project = self.get_by_id(id).await?;
        let path = project.pdf
            .ok_or(AppError::NotFound("No PDF associated with this project".into()))?;
        self.files.read(&path).await
    }

    pub async fn by_student(&self, student_id: &str, active: bool) -> Result<Vec<Project>, AppError> {
        required(student_id, "studentId")?;
        let projects = self.projects.list_by_student(student_id, active).await?;
        let state = if active { "active" } else { "non-active" };
        non_empty(projects, &format!("No {} projects found for this student", state))
    }

    pub async fn by_teacher(&self, teacher_name: &str, active: bool, unassigned_only: bool) -> Result<Vec<Project>, AppError> {
        required(teacher_name, "teacherName")?;
        let projects = self.projects.list_by_teacher(teacher_name, active, unassigned_only).await?;
        let state = if active { "active" } else { "non-active" };
        non_empty(projects, &format!("No {} projects found for this teacher", state))
    }

    /// Active projects shared by a teacher and student, each tagged with the
    /// student's username (or `UNKNOWN_USER` when the reference dangles).
    pub async fn by_teacher_and_student(&self, teacher_name: &str, student_id: &str) -> Result<Vec<ProjectWithUsername>, AppError> {
        required(teacher_name, "teacherName")?;
        required(student_id, "studentId")?;

        let projects = non_empty(
            self.projects.list_by_teacher_and_student(teacher_name, student_id, true).await?,
            &format!("No active projects found for teacher {} and student ID {}", teacher_name, student_id),
        )?;

        let mut enriched = Vec::with_capacity(projects.len());
        for project in projects {
            let username = match &project.student_id {
                Some(sid) => self.users.find_by_id(sid).await?.map(|u| u.username),
                None => None,
            };
            enriched.push(ProjectWithUsername {
                project,
                username: username.unwrap_or_else(|| UNKNOWN_USER.to_string()),
            });
        }
        Ok(enriched)
    }
}
