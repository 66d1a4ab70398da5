pub mod auth_service;
pub mod project_service;
pub mod token_allocator;

use crate::error::AppError;

/// Listing endpoints report zero matches as a client error.
pub fn non_empty<T>(items: Vec<T>, message: &str) -> Result<Vec<T>, AppError> {
    if items.is_empty() {
        return Err(AppError::NoResults(message.to_string()));
    }
    Ok(items)
}
