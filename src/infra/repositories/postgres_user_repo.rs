use crate::domain::{models::user::{ClassFilter, Role, User}, ports::UserRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use tracing::error;

pub struct PostgresUserRepo {
    pool: PgPool,
}

impl PostgresUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepo {
    async fn create(&self, user: &User) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, username, password_hash, roles, active, email, phone_number, teacher_name, description, university, college, department, specialization, group_name, level, scale, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
             RETURNING *",
        )
            .bind(&user.id)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(Json(&user.roles))
            .bind(user.active)
            .bind(&user.email)
            .bind(&user.phone_number)
            .bind(&user.teacher_name)
            .bind(&user.description)
            .bind(&user.university)
            .bind(&user.college)
            .bind(&user.department)
            .bind(&user.specialization)
            .bind(&user.group_name)
            .bind(&user.level)
            .bind(&user.scale)
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_all(&self) -> Result<Vec<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at ASC, id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE roles @> $1 ORDER BY created_at ASC, id ASC")
            .bind(Json(vec![role]))
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_students_by_teacher(&self, teacher_name: &str) -> Result<Vec<User>, AppError> {
        sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE teacher_name = $1 AND roles @> $2 ORDER BY created_at ASC, id ASC"
        )
            .bind(teacher_name)
            .bind(Json(vec![Role::Student]))
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_class(&self, filter: &ClassFilter) -> Result<Vec<User>, AppError> {
        sqlx::query_as::<_, User>(
            "SELECT * FROM users
             WHERE roles @> $1
             AND ($2::text IS NULL OR university = $2)
             AND ($3::text IS NULL OR college = $3)
             AND ($4::text IS NULL OR department = $4)
             AND ($5::text IS NULL OR specialization = $5)
             AND ($6::text IS NULL OR level = $6)
             AND ($7::text IS NULL OR group_name = $7)
             AND ($8::text IS NULL OR scale = $8)
             ORDER BY created_at ASC, id ASC"
        )
            .bind(Json(vec![Role::Student]))
            .bind(&filter.university)
            .bind(&filter.college)
            .bind(&filter.department)
            .bind(&filter.specialization)
            .bind(&filter.level)
            .bind(&filter.group_name)
            .bind(&filter.scale)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, user: &User) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET username=$1, password_hash=$2, roles=$3, active=$4, updated_at=$5
             WHERE id=$6
             RETURNING *"
        )
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(Json(&user.roles))
            .bind(user.active)
            .bind(user.updated_at)
            .bind(&user.id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Postgres User Deletion Failed: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }
        Ok(())
    }
}
