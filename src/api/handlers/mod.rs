pub mod auth;
pub mod health;
pub mod project;
pub mod user;
