use serde::Serialize;

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[derive(Serialize)]
pub struct StudentTeacherResponse {
    pub id: String,
    pub teacher_name: Option<String>,
}
