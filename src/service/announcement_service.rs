use std::sync::Arc;

use uuid::Uuid;

use crate::{
    domain::{
        validation::validate_with, Announcement, AnnouncementData, Audience,
        CreateAnnouncementRequest, Page, PageRequest, UpdateAnnouncementRequest, User,
    },
    error::{AppError, Result},
    repository::AnnouncementRepository,
};

/// Feed size for the role-scoped announcement list.
pub const FEED_LIMIT: i64 = 20;

pub struct AnnouncementService {
    repo: Arc<dyn AnnouncementRepository>,
}

impl AnnouncementService {
    pub fn new(repo: Arc<dyn AnnouncementRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(
        &self,
        author: &User,
        request: CreateAnnouncementRequest,
    ) -> Result<Announcement> {
        validate_with(&request, Vec::new())?;
        let data = AnnouncementData::from_request(request);
        let announcement = self.repo.create(author.id, &data).await?;
        tracing::info!("Announcement {} created by {}", announcement.id, author.id);
        Ok(announcement)
    }

    pub async fn update(&self, id: Uuid, request: UpdateAnnouncementRequest) -> Result<Announcement> {
        validate_with(&request, Vec::new())?;

        let current = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Announcement"))?;

        let mut data = AnnouncementData::from_announcement(&current);
        data.apply(request);
        self.repo.update(id, &data).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.repo.delete(id).await
    }

    /// Everything, including inactive ones (admin).
    pub async fn list_all(&self, page: PageRequest) -> Result<Page<Announcement>> {
        let (items, total) = self.repo.list(page).await?;
        Ok(Page::new(items, total, page))
    }

    pub async fn list_for_role(&self, viewer: &User) -> Result<Vec<Announcement>> {
        self.repo
            .list_for_audience(Audience::from(viewer.role), FEED_LIMIT)
            .await
    }

    pub async fn get_for_role(&self, viewer: &User, id: Uuid) -> Result<Announcement> {
        self.repo
            .find_by_id(id)
            .await?
            .filter(|a| viewer.is_admin() || a.is_visible_to(viewer.role))
            .ok_or_else(|| AppError::not_found("Announcement"))
    }
}
