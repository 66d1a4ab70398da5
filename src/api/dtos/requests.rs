use crate::domain::models::user::{Role, UserProfile};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub roles: Vec<Role>,
    pub email: Option<String>,
    #[serde(alias = "phoneNumber")]
    pub phone_number: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct CreateStudentRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(flatten)]
    pub profile: UserProfile,
}

#[derive(Deserialize)]
pub struct CreateTeacherRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub roles: Vec<Role>,
    pub email: Option<String>,
    #[serde(alias = "phoneNumber")]
    pub phone_number: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub roles: Vec<Role>,
    pub active: bool,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct StudentsQuery {
    #[serde(alias = "teacherName")]
    pub teacher_name: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateTextProjectRequest {
    #[serde(default, alias = "teacherName")]
    pub teacher_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub scale: String,
}

#[derive(Deserialize)]
pub struct UpdateProjectRequest {
    pub title: Option<String>,
    pub scale: Option<String>,
    #[serde(alias = "teacherName")]
    pub teacher_name: Option<String>,
}

#[derive(Deserialize)]
pub struct AttachNoteRequest {
    #[serde(default)]
    pub note: String,
}

#[derive(Deserialize)]
pub struct ActivateProjectRequest {
    #[serde(default)]
    pub qrnumber: String,
}

#[derive(Deserialize)]
pub struct TeacherProjectsQuery {
    pub active: Option<bool>,
    pub unassigned: Option<bool>,
}
