use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use uuid::Uuid;
use crate::domain::*;
use crate::error::Result;

pub mod codec;
pub mod user_repository;
pub mod profile_repository;
pub mod event_repository;
pub mod job_repository;
pub mod announcement_repository;

pub use user_repository::SqliteUserRepository;
pub use profile_repository::SqliteProfileRepository;
pub use event_repository::SqliteEventRepository;
pub use job_repository::SqliteJobRepository;
pub use announcement_repository::SqliteAnnouncementRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<User>;
    /// Creates the account and its first profile atomically.
    async fn create_with_profile(&self, user: NewUser, profile: &ProfileData) -> Result<User>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    /// Stored password hash for a login attempt. Never leaves the service layer.
    async fn find_credentials(&self, email: &str) -> Result<Option<(User, String)>>;
    async fn list(&self, filter: &UserFilter, page: PageRequest) -> Result<(Vec<User>, i64)>;
    async fn count(&self, filter: &UserFilter) -> Result<i64>;
    async fn list_recent(&self, limit: i64) -> Result<Vec<User>>;
    async fn update(&self, id: Uuid, update: UpdateUser) -> Result<User>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn create(&self, user_id: Uuid, data: &ProfileData) -> Result<AlumniProfile>;
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<AlumniProfile>>;
    async fn update(&self, user_id: Uuid, data: &ProfileData) -> Result<AlumniProfile>;
    /// Approved, active alumni with a profile, newest graduation year first.
    async fn search_directory(
        &self,
        filter: &DirectoryFilter,
        page: PageRequest,
    ) -> Result<(Vec<DirectoryEntry>, i64)>;
    async fn find_directory_entry(&self, profile_id: Uuid) -> Result<Option<DirectoryEntry>>;
    /// Every alumni account, profile or not, newest first.
    async fn list_alumni(
        &self,
        filter: &AdminAlumniFilter,
        page: PageRequest,
    ) -> Result<(Vec<AlumniRecord>, i64)>;
    /// All alumni that have a profile, ordered for export.
    async fn list_for_export(&self) -> Result<Vec<DirectoryEntry>>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, organizer_id: Uuid, data: &EventData) -> Result<Event>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>>;
    async fn list(&self, active_only: bool, page: PageRequest) -> Result<(Vec<Event>, i64)>;
    async fn update(&self, id: Uuid, data: &EventData) -> Result<Event>;
    async fn delete(&self, id: Uuid) -> Result<()>;
    async fn count(&self, upcoming_after: Option<DateTime<Utc>>) -> Result<i64>;
    /// Atomically checks capacity and inserts the registration.
    async fn register(&self, event_id: Uuid, user_id: Uuid) -> Result<RegistrationOutcome>;
    /// Returns whether a registration was removed.
    async fn unregister(&self, event_id: Uuid, user_id: Uuid) -> Result<bool>;
    async fn list_registrants(&self, event_id: Uuid) -> Result<Vec<Registrant>>;
}

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, posted_by: Uuid, data: &JobData) -> Result<JobPost>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<JobPost>>;
    async fn list(&self, filter: &JobFilter, page: PageRequest) -> Result<(Vec<JobPost>, i64)>;
    async fn update(&self, id: Uuid, data: &JobData) -> Result<JobPost>;
    async fn delete(&self, id: Uuid) -> Result<()>;
    async fn count_active(&self) -> Result<i64>;
    /// Returns false when the user already applied.
    async fn add_application(&self, job_id: Uuid, user_id: Uuid) -> Result<bool>;
    async fn list_applications(&self, job_id: Uuid) -> Result<Vec<JobApplication>>;
    /// Returns false when no such application exists.
    async fn set_application_status(
        &self,
        job_id: Uuid,
        user_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<bool>;
}

#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    async fn create(&self, posted_by: Uuid, data: &AnnouncementData) -> Result<Announcement>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Announcement>>;
    async fn list(&self, page: PageRequest) -> Result<(Vec<Announcement>, i64)>;
    /// Active announcements whose audience contains `all` or `audience`.
    async fn list_for_audience(&self, audience: Audience, limit: i64) -> Result<Vec<Announcement>>;
    async fn update(&self, id: Uuid, data: &AnnouncementData) -> Result<Announcement>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Unique-constraint violations surface as `Conflict` rather than a 500.
pub(crate) fn map_unique_violation(err: sqlx::Error, message: &str) -> crate::error::AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            crate::error::AppError::Conflict(message.to_string())
        }
        _ => crate::error::AppError::Database(err.to_string()),
    }
}

/// Opens the pool with foreign keys enforced and runs the embedded migrations.
pub async fn connect(url: &str, max_connections: u32) -> std::result::Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}
