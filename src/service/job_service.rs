use std::sync::Arc;

use uuid::Uuid;

use crate::{
    domain::{
        validation::validate_with, ApplicationStatus, CreateJobRequest, JobApplication, JobData,
        JobFilter, JobPost, Page, PageRequest, UpdateJobRequest, User,
    },
    error::{AppError, Result},
    repository::JobRepository,
};

const JOB_NOT_FOUND: &str = "Job posting not found";

pub struct JobService {
    repo: Arc<dyn JobRepository>,
}

impl JobService {
    pub fn new(repo: Arc<dyn JobRepository>) -> Self {
        Self { repo }
    }

    fn not_found() -> AppError {
        AppError::NotFound(JOB_NOT_FOUND.to_string())
    }

    async fn find(&self, id: Uuid) -> Result<JobPost> {
        self.repo.find_by_id(id).await?.ok_or_else(Self::not_found)
    }

    /// Only the poster or an admin may manage a posting.
    fn ensure_manager(job: &JobPost, user: &User) -> Result<()> {
        if user.is_admin() || job.posted_by.id == user.id {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Only the poster or an admin can manage this job posting".to_string(),
            ))
        }
    }

    pub async fn post(&self, poster: &User, request: CreateJobRequest) -> Result<JobPost> {
        let extra = request
            .salary
            .as_ref()
            .and_then(|s| s.check())
            .into_iter()
            .collect();
        validate_with(&request, extra)?;

        let job = self.repo.create(poster.id, &JobData::from_request(request)).await?;
        tracing::info!("Job {} posted by {}", job.id, poster.id);
        Ok(job)
    }

    pub async fn update(&self, editor: &User, id: Uuid, request: UpdateJobRequest) -> Result<JobPost> {
        let extra = request
            .salary
            .as_ref()
            .and_then(|s| s.check())
            .into_iter()
            .collect();
        validate_with(&request, extra)?;

        let current = self.find(id).await?;
        Self::ensure_manager(&current, editor)?;

        let mut data = JobData::from_job(&current);
        data.apply(request);
        self.repo.update(id, &data).await
    }

    pub async fn delete(&self, editor: &User, id: Uuid) -> Result<()> {
        let current = self.find(id).await?;
        Self::ensure_manager(&current, editor)?;
        self.repo.delete(id).await?;
        tracing::info!("Job {} deleted by {}", id, editor.id);
        Ok(())
    }

    pub async fn list(&self, filter: JobFilter, page: PageRequest) -> Result<Page<JobPost>> {
        let (jobs, total) = self.repo.list(&filter, page).await?;
        Ok(Page::new(jobs, total, page))
    }

    /// Inactive postings are visible to admins and their poster only.
    pub async fn get(&self, viewer: &User, id: Uuid) -> Result<JobPost> {
        let job = self.find(id).await?;
        if job.is_active || viewer.is_admin() || job.posted_by.id == viewer.id {
            Ok(job)
        } else {
            Err(Self::not_found())
        }
    }

    pub async fn apply(&self, applicant: &User, id: Uuid) -> Result<JobPost> {
        let job = self.find(id).await?;
        if !job.is_active {
            return Err(Self::not_found());
        }
        if job.posted_by.id == applicant.id {
            return Err(AppError::BadRequest(
                "You cannot apply to your own job posting".to_string(),
            ));
        }

        if !self.repo.add_application(id, applicant.id).await? {
            return Err(AppError::Conflict(
                "Already applied to this job".to_string(),
            ));
        }

        tracing::debug!("User {} applied to job {}", applicant.id, id);
        self.find(id).await
    }

    pub async fn list_applications(&self, viewer: &User, id: Uuid) -> Result<Vec<JobApplication>> {
        let job = self.find(id).await?;
        Self::ensure_manager(&job, viewer)?;
        self.repo.list_applications(id).await
    }

    pub async fn set_application_status(
        &self,
        editor: &User,
        id: Uuid,
        applicant_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Vec<JobApplication>> {
        let job = self.find(id).await?;
        Self::ensure_manager(&job, editor)?;

        if !self.repo.set_application_status(id, applicant_id, status).await? {
            return Err(AppError::not_found("Application"));
        }
        self.repo.list_applications(id).await
    }
}
