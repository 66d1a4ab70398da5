use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub upload_dir: String,
    pub session_ttl_days: i64,
    pub cookie_secure: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
            session_ttl_days: env::var("SESSION_TTL_DAYS").unwrap_or_else(|_| "15".to_string()).parse().expect("SESSION_TTL_DAYS must be a number"),
            cookie_secure: env::var("COOKIE_SECURE").map(|v| v != "false" && v != "0").unwrap_or(true),
        }
    }
}
