use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    auth::AuthService,
    domain::{
        normalize_email,
        validation::{check_graduation_year, validate_with},
        AdminAlumniFilter, AdminUpdateUserRequest, AlumniProfile, AlumniRecord,
        LoginRequest, NewUser, Page, PageRequest, ProfileData, RegisterRequest, Role, UpdateUser,
        User,
    },
    error::{AppError, FieldError, Result},
    repository::{ProfileRepository, UserRepository},
};

/// Token plus the user it was issued for, returned by register and login.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
pub struct WhoAmI {
    pub user: User,
    pub profile: Option<AlumniProfile>,
}

pub struct AccountService {
    users: Arc<dyn UserRepository>,
    profiles: Arc<dyn ProfileRepository>,
    auth: Arc<AuthService>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        profiles: Arc<dyn ProfileRepository>,
        auth: Arc<AuthService>,
    ) -> Self {
        Self { users, profiles, auth }
    }

    fn registration_errors(request: &RegisterRequest) -> Vec<FieldError> {
        let mut errors = Vec::new();
        match request.role {
            Role::Admin => errors.push(FieldError::new(
                "role",
                "Admin accounts cannot be self-registered",
            )),
            Role::Alumni => {
                match request.graduation_year {
                    Some(year) => errors.extend(check_graduation_year(year)),
                    None => errors.push(FieldError::new(
                        "graduationYear",
                        "Graduation year is required for alumni",
                    )),
                }
                if request.department.as_deref().map(str::trim).unwrap_or("").is_empty() {
                    errors.push(FieldError::new(
                        "department",
                        "Department is required for alumni",
                    ));
                }
            }
            Role::Student => {}
        }
        errors
    }

    /// Alumni start out pending; students are usable immediately.
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse> {
        validate_with(&request, Self::registration_errors(&request))?;

        let email = normalize_email(&request.email);
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = AuthService::hash_password(&request.password).await?;
        let new_user = NewUser {
            name: request.name.trim().to_string(),
            email,
            password_hash,
            role: request.role,
            is_approved: request.role != Role::Alumni,
        };

        let initial_profile = match (request.role, request.graduation_year, request.department) {
            (Role::Alumni, Some(year), Some(department)) => {
                Some(ProfileData::initial(year, department.trim().to_string()))
            }
            _ => None,
        };
        let user = match initial_profile {
            Some(profile) => self.users.create_with_profile(new_user, &profile).await?,
            None => self.users.create(new_user).await?,
        };

        tracing::info!("Registered {} account {}", user.role, user.id);

        let token = self.auth.issue_token(&user)?;
        Ok(AuthResponse { token, user })
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse> {
        validate_with(&request, Vec::new())?;

        let email = normalize_email(&request.email);
        let invalid = || AppError::Unauthenticated("Invalid credentials".to_string());

        let (user, hash) = self.users.find_credentials(&email).await?.ok_or_else(invalid)?;
        if !AuthService::verify_password(&request.password, &hash).await? {
            return Err(invalid());
        }
        if !user.is_active {
            return Err(AppError::AccountDisabled);
        }

        let user = self
            .users
            .update(
                user.id,
                UpdateUser {
                    last_login: Some(Utc::now()),
                    ..Default::default()
                },
            )
            .await?;

        let token = self.auth.issue_token(&user)?;
        Ok(AuthResponse { token, user })
    }

    pub async fn me(&self, user: &User) -> Result<WhoAmI> {
        let profile = match user.role {
            Role::Alumni => self.profiles.find_by_user(user.id).await?,
            _ => None,
        };
        Ok(WhoAmI {
            user: user.clone(),
            profile,
        })
    }

    /// Approve or revoke an alumni account. Re-applying the current state succeeds.
    pub async fn set_approval(&self, target_id: Uuid, is_approved: bool) -> Result<User> {
        let target = self
            .users
            .find_by_id(target_id)
            .await?
            .filter(|u| u.role == Role::Alumni)
            .ok_or_else(|| AppError::not_found("Alumni"))?;

        if target.is_approved == is_approved {
            return Ok(target);
        }

        let updated = self
            .users
            .update(
                target_id,
                UpdateUser {
                    is_approved: Some(is_approved),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(
            "Alumni {} {}",
            updated.id,
            if is_approved { "approved" } else { "rejected" }
        );
        Ok(updated)
    }

    pub async fn admin_update_user(
        &self,
        target_id: Uuid,
        request: AdminUpdateUserRequest,
    ) -> Result<User> {
        validate_with(&request, Vec::new())?;

        if self.users.find_by_id(target_id).await?.is_none() {
            return Err(AppError::not_found("User"));
        }

        let email = request.email.as_deref().map(normalize_email);
        if let Some(email) = &email {
            if let Some(existing) = self.users.find_by_email(email).await? {
                if existing.id != target_id {
                    return Err(AppError::Conflict("Email already registered".to_string()));
                }
            }
        }

        self.users
            .update(
                target_id,
                UpdateUser {
                    name: request.name.map(|n| n.trim().to_string()),
                    email,
                    is_active: request.is_active,
                    ..Default::default()
                },
            )
            .await
    }

    /// Removes the user; profile, registrations and applications cascade.
    pub async fn delete_user(&self, target_id: Uuid, acting: &User) -> Result<()> {
        if target_id == acting.id {
            return Err(AppError::BadRequest(
                "You cannot delete your own account".to_string(),
            ));
        }
        self.users.delete(target_id).await?;
        tracing::info!("Deleted user {}", target_id);
        Ok(())
    }

    pub async fn list_alumni(
        &self,
        filter: AdminAlumniFilter,
        page: PageRequest,
    ) -> Result<Page<AlumniRecord>> {
        let (records, total) = self.profiles.list_alumni(&filter, page).await?;
        Ok(Page::new(records, total, page))
    }
}
