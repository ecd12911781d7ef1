use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{PersonSummary, Role};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    Admin,
    Alumni,
    Student,
    All,
}

impl Audience {
    pub fn as_str(&self) -> &'static str {
        match self {
            Audience::Admin => "admin",
            Audience::Alumni => "alumni",
            Audience::Student => "student",
            Audience::All => "all",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Audience::Admin),
            "alumni" => Some(Audience::Alumni),
            "student" => Some(Audience::Student),
            "all" => Some(Audience::All),
            _ => None,
        }
    }
}

impl From<Role> for Audience {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => Audience::Admin,
            Role::Alumni => Audience::Alumni,
            Role::Student => Audience::Student,
        }
    }
}

pub fn default_audience() -> BTreeSet<Audience> {
    BTreeSet::from([Audience::All])
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub posted_by: PersonSummary,
    pub target_audience: BTreeSet<Audience>,
    pub is_important: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Announcement {
    pub fn is_visible_to(&self, role: Role) -> bool {
        self.is_active
            && (self.target_audience.contains(&Audience::All)
                || self.target_audience.contains(&Audience::from(role)))
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnnouncementRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, max = 2000, message = "Message is required and cannot exceed 2000 characters"))]
    pub message: String,
    pub target_audience: Option<BTreeSet<Audience>>,
    #[serde(default)]
    pub is_important: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAnnouncementRequest {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 2000, message = "Message cannot exceed 2000 characters"))]
    pub message: Option<String>,
    pub target_audience: Option<BTreeSet<Audience>>,
    pub is_important: Option<bool>,
    pub is_active: Option<bool>,
}

/// Resolved announcement fields written by the repository.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnouncementData {
    pub title: String,
    pub message: String,
    pub target_audience: BTreeSet<Audience>,
    pub is_important: bool,
    pub is_active: bool,
}

/// An empty audience set means "not specified" and falls back to everyone.
fn audience_or_default(audience: Option<BTreeSet<Audience>>) -> BTreeSet<Audience> {
    match audience {
        Some(set) if !set.is_empty() => set,
        _ => default_audience(),
    }
}

impl AnnouncementData {
    pub fn from_request(req: CreateAnnouncementRequest) -> Self {
        Self {
            title: req.title.trim().to_string(),
            message: req.message,
            target_audience: audience_or_default(req.target_audience),
            is_important: req.is_important,
            is_active: true,
        }
    }

    pub fn from_announcement(a: &Announcement) -> Self {
        Self {
            title: a.title.clone(),
            message: a.message.clone(),
            target_audience: a.target_audience.clone(),
            is_important: a.is_important,
            is_active: a.is_active,
        }
    }

    pub fn apply(&mut self, req: UpdateAnnouncementRequest) {
        if let Some(title) = req.title {
            self.title = title.trim().to_string();
        }
        if let Some(message) = req.message {
            self.message = message;
        }
        if req.target_audience.is_some() {
            self.target_audience = audience_or_default(req.target_audience);
        }
        if let Some(important) = req.is_important {
            self.is_important = important;
        }
        if let Some(active) = req.is_active {
            self.is_active = active;
        }
    }
}
