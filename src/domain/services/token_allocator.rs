use std::sync::Arc;
use rand::Rng;
use tracing::{debug, warn};
use crate::domain::models::project::{QR_BODY_LEN, QR_PREFIX};
use crate::domain::ports::ProjectRepository;
use crate::error::AppError;

pub const MAX_ALLOCATION_ATTEMPTS: usize = 16;

const QR_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub type CandidateGenerator = Box<dyn Fn() -> String + Send + Sync>;

/// `QR-` followed by six uppercase alphanumerics.
pub fn generate_candidate() -> String {
    let mut rng = rand::thread_rng();
    let body: String = (0..QR_BODY_LEN)
        .map(|_| QR_CHARSET[rng.gen_range(0..QR_CHARSET.len())] as char)
        .collect();
    format!("{}{}", QR_PREFIX, body)
}

/// Hands out qrnumbers not currently held by any project.
///
/// The lookup is optimistic: two callers can both see a candidate as free.
/// The unique index on `projects.qrnumber` is what actually enforces
/// exclusivity, and `ProjectService` retries the insert when it trips.
pub struct TokenAllocator {
    repo: Arc<dyn ProjectRepository>,
    generate: CandidateGenerator,
}

impl TokenAllocator {
    pub fn new(repo: Arc<dyn ProjectRepository>) -> Self {
        Self::with_generator(repo, Box::new(generate_candidate))
    }

    pub fn with_generator(repo: Arc<dyn ProjectRepository>, generate: CandidateGenerator) -> Self {
        Self { repo, generate }
    }

    pub async fn allocate(&self) -> Result<String, AppError> {
        for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
            let candidate = (self.generate)();
            if self.repo.find_by_qrnumber(&candidate).await?.is_none() {
                return Ok(candidate);
            }
            debug!(attempt, candidate = %candidate, "qrnumber already taken, regenerating");
        }

        warn!("qrnumber allocation exhausted after {} attempts", MAX_ALLOCATION_ATTEMPTS);
        Err(AppError::InternalWithMsg(format!(
            "could not allocate a unique qrnumber after {} attempts",
            MAX_ALLOCATION_ATTEMPTS
        )))
    }
}
