use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

pub const QR_PREFIX: &str = "QR-";
pub const QR_BODY_LEN: usize = 6;
pub const TICKET_COUNTER: &str = "ticketNums";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Project {
    pub id: String,
    pub student_id: Option<String>,
    pub title: String,
    pub scale: String,
    pub teacher_name: String,
    pub qrnumber: String,
    pub note: Option<String>,
    pub pdf: Option<String>,
    pub active: bool,
    pub ticket: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload. The store assigns `ticket` from the counter inside the insert transaction.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub id: String,
    pub student_id: Option<String>,
    pub title: String,
    pub scale: String,
    pub teacher_name: String,
    pub qrnumber: String,
    pub pdf: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewProject {
    pub fn new(student_id: Option<String>, title: String, scale: String, teacher_name: String, qrnumber: String, pdf: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            student_id,
            title,
            scale,
            teacher_name,
            qrnumber,
            pdf,
            created_at: Utc::now(),
        }
    }
}

/// The editable descriptive fields of a project.
#[derive(Debug, Clone)]
pub struct ProjectDetails {
    pub title: String,
    pub scale: String,
    pub teacher_name: String,
}

#[derive(Debug, Serialize)]
pub struct ProjectWithUsername {
    #[serde(flatten)]
    pub project: Project,
    pub username: String,
}
