use std::sync::Arc;
use crate::domain::ports::{FileStore, ProjectRepository, UserRepository};
use crate::domain::services::{auth_service::AuthService, project_service::ProjectService};
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub user_repo: Arc<dyn UserRepository>,
    pub project_repo: Arc<dyn ProjectRepository>,
    pub file_store: Arc<dyn FileStore>,
    pub auth_service: Arc<AuthService>,
    pub project_service: Arc<ProjectService>,
}

impl AppState {
    pub fn new(
        config: Config,
        user_repo: Arc<dyn UserRepository>,
        project_repo: Arc<dyn ProjectRepository>,
        file_store: Arc<dyn FileStore>,
    ) -> Self {
        let auth_service = Arc::new(AuthService::new(&config));
        let project_service = Arc::new(ProjectService::new(
            project_repo.clone(),
            user_repo.clone(),
            file_store.clone(),
        ));

        Self {
            config,
            user_repo,
            project_repo,
            file_store,
            auth_service,
            project_service,
        }
    }
}
