use crate::domain::{
    models::project::{NewProject, Project, ProjectDetails, TICKET_COUNTER},
    ports::ProjectRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct PostgresProjectRepo {
    pool: PgPool,
}

impl PostgresProjectRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectRepository for PostgresProjectRepo {
    async fn create(&self, project: &NewProject) -> Result<Project, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let ticket: i64 = sqlx::query_scalar("UPDATE counters SET seq = seq + 1 WHERE name = $1 RETURNING seq")
            .bind(TICKET_COUNTER)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let created = sqlx::query_as::<_, Project>(
            "INSERT INTO projects (id, student_id, title, scale, teacher_name, qrnumber, note, pdf, active, ticket, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, NULL, $7, FALSE, $8, $9, $9)
             RETURNING *"
        )
            .bind(&project.id).bind(&project.student_id).bind(&project.title).bind(&project.scale)
            .bind(&project.teacher_name).bind(&project.qrnumber).bind(&project.pdf).bind(ticket)
            .bind(project.created_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Project>, AppError> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_qrnumber(&self, qrnumber: &str) -> Result<Option<Project>, AppError> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE qrnumber = $1")
            .bind(qrnumber)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Project>, AppError> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE title = $1 ORDER BY ticket ASC LIMIT 1")
            .bind(title)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_all(&self) -> Result<Vec<Project>, AppError> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects ORDER BY ticket ASC")
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_student(&self, student_id: &str, active: bool) -> Result<Vec<Project>, AppError> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE student_id = $1 AND active = $2 ORDER BY ticket ASC")
            .bind(student_id).bind(active)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_teacher(&self, teacher_name: &str, active: bool, unassigned_only: bool) -> Result<Vec<Project>, AppError> {
        let query = if unassigned_only {
            "SELECT * FROM projects WHERE teacher_name = $1 AND active = $2 AND student_id IS NULL ORDER BY ticket ASC"
        } else {
            "SELECT * FROM projects WHERE teacher_name = $1 AND active = $2 ORDER BY ticket ASC"
        };

        sqlx::query_as::<_, Project>(query)
            .bind(teacher_name).bind(active)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_teacher_and_student(&self, teacher_name: &str, student_id: &str, active: bool) -> Result<Vec<Project>, AppError> {
        sqlx::query_as::<_, Project>(
            "SELECT * FROM projects WHERE teacher_name = $1 AND student_id = $2 AND active = $3 ORDER BY ticket ASC"
        )
            .bind(teacher_name).bind(student_id).bind(active)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn exists_for_student(&self, student_id: &str) -> Result<bool, AppError> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM projects WHERE student_id = $1)")
            .bind(student_id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn set_note(&self, id: &str, note: &str, at: DateTime<Utc>) -> Result<Option<Project>, AppError> {
        sqlx::query_as::<_, Project>("UPDATE projects SET note = $1, updated_at = $2 WHERE id = $3 RETURNING *")
            .bind(note).bind(at).bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn activate_by_qrnumber(&self, qrnumber: &str, at: DateTime<Utc>) -> Result<Option<Project>, AppError> {
        sqlx::query_as::<_, Project>("UPDATE projects SET active = TRUE, updated_at = $1 WHERE qrnumber = $2 RETURNING *")
            .bind(at).bind(qrnumber)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn update_details(&self, id: &str, details: &ProjectDetails, at: DateTime<Utc>) -> Result<Option<Project>, AppError> {
        sqlx::query_as::<_, Project>(
            "UPDATE projects SET title = $1, scale = $2, teacher_name = $3, updated_at = $4
             WHERE id = $5
             RETURNING *"
        )
            .bind(&details.title).bind(&details.scale).bind(&details.teacher_name).bind(at)
            .bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Project not found".into())); }
        Ok(())
    }
}
