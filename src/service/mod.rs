pub mod privacy;
pub mod account_service;
pub mod profile_service;
pub mod event_service;
pub mod job_service;
pub mod announcement_service;
pub mod dashboard_service;
pub mod export;

use std::path::PathBuf;
use std::sync::Arc;
use sqlx::SqlitePool;
use crate::repository::*;
use crate::auth::AuthService;
use crate::config::Settings;
use account_service::AccountService;
use profile_service::ProfileService;
use event_service::EventService;
use job_service::JobService;
use announcement_service::AnnouncementService;
use dashboard_service::DashboardService;
use export::ExportService;

pub struct ServiceContext {
    pub user_repo: Arc<dyn UserRepository>,
    pub profile_repo: Arc<dyn ProfileRepository>,
    pub event_repo: Arc<dyn EventRepository>,
    pub job_repo: Arc<dyn JobRepository>,
    pub announcement_repo: Arc<dyn AnnouncementRepository>,
    pub auth_service: Arc<AuthService>,
    pub account_service: Arc<AccountService>,
    pub profile_service: Arc<ProfileService>,
    pub event_service: Arc<EventService>,
    pub job_service: Arc<JobService>,
    pub announcement_service: Arc<AnnouncementService>,
    pub dashboard_service: Arc<DashboardService>,
    pub export_service: Arc<ExportService>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(db_pool: SqlitePool, settings: &Settings) -> Self {
        let user_repo: Arc<dyn UserRepository> =
            Arc::new(SqliteUserRepository::new(db_pool.clone()));
        let profile_repo: Arc<dyn ProfileRepository> =
            Arc::new(SqliteProfileRepository::new(db_pool.clone()));
        let event_repo: Arc<dyn EventRepository> =
            Arc::new(SqliteEventRepository::new(db_pool.clone()));
        let job_repo: Arc<dyn JobRepository> =
            Arc::new(SqliteJobRepository::new(db_pool.clone()));
        let announcement_repo: Arc<dyn AnnouncementRepository> =
            Arc::new(SqliteAnnouncementRepository::new(db_pool.clone()));

        let auth_service = Arc::new(AuthService::new(&settings.auth));

        let account_service = Arc::new(AccountService::new(
            user_repo.clone(),
            profile_repo.clone(),
            auth_service.clone(),
        ));
        let profile_service = Arc::new(ProfileService::new(
            user_repo.clone(),
            profile_repo.clone(),
            PathBuf::from(&settings.uploads.dir),
        ));
        let event_service = Arc::new(EventService::new(event_repo.clone()));
        let job_service = Arc::new(JobService::new(job_repo.clone()));
        let announcement_service = Arc::new(AnnouncementService::new(announcement_repo.clone()));
        let dashboard_service = Arc::new(DashboardService::new(
            user_repo.clone(),
            event_repo.clone(),
            job_repo.clone(),
        ));
        let export_service = Arc::new(ExportService::new(profile_repo.clone()));

        Self {
            user_repo,
            profile_repo,
            event_repo,
            job_repo,
            announcement_repo,
            auth_service,
            account_service,
            profile_service,
            event_service,
            job_service,
            announcement_service,
            dashboard_service,
            export_service,
            db_pool,
        }
    }
}
