use crate::domain::{models::user::{ClassFilter, Role, User}, ports::UserRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{types::Json, SqlitePool};
use tracing::error;

pub struct SqliteUserRepo {
    pool: SqlitePool,
}

impl SqliteUserRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepo {
    async fn create(&self, user: &User) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, username, password_hash, roles, active, email, phone_number, teacher_name, description, university, college, department, specialization, group_name, level, scale, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
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
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
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
        sqlx::query_as::<_, User>(
            "SELECT * FROM users
             WHERE EXISTS (SELECT 1 FROM json_each(users.roles) WHERE json_each.value = ?)
             ORDER BY created_at ASC, id ASC"
        )
            .bind(role.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_students_by_teacher(&self, teacher_name: &str) -> Result<Vec<User>, AppError> {
        sqlx::query_as::<_, User>(
            "SELECT * FROM users
             WHERE teacher_name = ?
             AND EXISTS (SELECT 1 FROM json_each(users.roles) WHERE json_each.value = ?)
             ORDER BY created_at ASC, id ASC"
        )
            .bind(teacher_name)
            .bind(Role::Student.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_class(&self, filter: &ClassFilter) -> Result<Vec<User>, AppError> {
        sqlx::query_as::<_, User>(
            "SELECT * FROM users
             WHERE EXISTS (SELECT 1 FROM json_each(users.roles) WHERE json_each.value = ?)
             AND (? IS NULL OR university = ?)
             AND (? IS NULL OR college = ?)
             AND (? IS NULL OR department = ?)
             AND (? IS NULL OR specialization = ?)
             AND (? IS NULL OR level = ?)
             AND (? IS NULL OR group_name = ?)
             AND (? IS NULL OR scale = ?)
             ORDER BY created_at ASC, id ASC"
        )
            .bind(Role::Student.to_string())
            .bind(&filter.university).bind(&filter.university)
            .bind(&filter.college).bind(&filter.college)
            .bind(&filter.department).bind(&filter.department)
            .bind(&filter.specialization).bind(&filter.specialization)
            .bind(&filter.level).bind(&filter.level)
            .bind(&filter.group_name).bind(&filter.group_name)
            .bind(&filter.scale).bind(&filter.scale)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, user: &User) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET username=?, password_hash=?, roles=?, active=?, updated_at=?
             WHERE id=?
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
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("SQLite User Deletion Failed: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }
        Ok(())
    }
}
