use std::path::PathBuf;
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    domain::{
        validation::{check_graduation_year, validate_with},
        DirectoryEntry, DirectoryFilter, Page, PageRequest, ProfileData, UpdateUser,
        UpsertProfileRequest, User,
    },
    error::{AppError, FieldError, Result},
    repository::{ProfileRepository, UserRepository},
    service::privacy::{self, ProfileView},
    web::uploads,
};

pub struct ProfileService {
    users: Arc<dyn UserRepository>,
    profiles: Arc<dyn ProfileRepository>,
    upload_dir: PathBuf,
}

impl ProfileService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        profiles: Arc<dyn ProfileRepository>,
        upload_dir: PathBuf,
    ) -> Self {
        Self {
            users,
            profiles,
            upload_dir,
        }
    }

    pub async fn get_own(&self, user: &User) -> Result<ProfileView> {
        let profile = self
            .profiles
            .find_by_user(user.id)
            .await?
            .ok_or_else(|| AppError::not_found("Profile"))?;

        Ok(privacy::project(
            DirectoryEntry {
                user: user.clone(),
                profile,
            },
            user,
        ))
    }

    /// Updates the caller's profile, creating it on first save.
    pub async fn upsert_own(&self, user: &User, request: UpsertProfileRequest) -> Result<ProfileView> {
        let existing = self.profiles.find_by_user(user.id).await?;

        let mut extra = Vec::new();
        if let Some(year) = request.graduation_year {
            extra.extend(check_graduation_year(year));
        }
        if existing.is_none() {
            if request.graduation_year.is_none() {
                extra.push(FieldError::new("graduationYear", "Graduation year is required"));
            }
            if request.department.is_none() {
                extra.push(FieldError::new("department", "Department is required"));
            }
        }
        validate_with(&request, extra)?;

        let profile = match existing {
            Some(current) => {
                let mut data = ProfileData::from_profile(&current);
                data.apply(request);
                self.profiles.update(user.id, &data).await?
            }
            None => {
                let mut data = ProfileData::initial(0, String::new());
                data.apply(request);
                self.profiles.create(user.id, &data).await?
            }
        };

        Ok(privacy::project(
            DirectoryEntry {
                user: user.clone(),
                profile,
            },
            user,
        ))
    }

    /// Points the user at a newly stored photo and removes the previous file.
    pub async fn update_photo(&self, user: &User, stored_path: String) -> Result<String> {
        let previous = user.profile_photo.clone();
        let updated = self
            .users
            .update(
                user.id,
                UpdateUser {
                    profile_photo: Some(stored_path),
                    ..Default::default()
                },
            )
            .await?;

        if !previous.is_empty() && previous != updated.profile_photo {
            if let Err(e) = uploads::delete_uploaded_file(&self.upload_dir, &previous).await {
                tracing::warn!("Could not remove old profile photo {}: {}", previous, e);
            }
        }

        Ok(updated.profile_photo)
    }

    pub async fn search_directory(
        &self,
        viewer: &User,
        filter: DirectoryFilter,
        page: PageRequest,
    ) -> Result<Page<ProfileView>> {
        let (entries, total) = self.profiles.search_directory(&filter, page).await?;
        Ok(Page::new(entries, total, page).map(|entry| privacy::project(entry, viewer)))
    }

    /// Single directory profile; unapproved or inactive alumni are not visible.
    pub async fn get_for_viewer(&self, viewer: &User, profile_id: Uuid) -> Result<ProfileView> {
        let entry = self
            .profiles
            .find_directory_entry(profile_id)
            .await?
            .filter(|e| viewer.is_admin() || (e.user.is_approved && e.user.is_active))
            .ok_or_else(|| AppError::not_found("Profile"))?;

        Ok(privacy::project(entry, viewer))
    }
}
