use serde::{Deserialize, Serialize};
use crate::domain::models::user::Role;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
    pub jti: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub id: String,
    pub username: String,
    pub roles: Vec<Role>,
}

#[derive(Serialize)]
pub struct SignupResponse {
    pub id: String,
    pub username: String,
}
