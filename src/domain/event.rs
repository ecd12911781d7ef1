use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::PersonSummary;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    #[default]
    Networking,
    Workshop,
    Seminar,
    Reunion,
    Other,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Networking => "networking",
            EventType::Workshop => "workshop",
            EventType::Seminar => "seminar",
            EventType::Reunion => "reunion",
            EventType::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "networking" => Some(EventType::Networking),
            "workshop" => Some(EventType::Workshop),
            "seminar" => Some(EventType::Seminar),
            "reunion" => Some(EventType::Reunion),
            "other" => Some(EventType::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub event_type: EventType,
    pub organizer: PersonSummary,
    pub max_attendees: Option<i32>,
    pub is_active: bool,
    pub image: String,
    pub registered_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn is_full(&self) -> bool {
        self.max_attendees
            .map(|max| self.registered_count >= i64::from(max))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Registrant {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub profile_photo: String,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: Event,
    pub registered_users: Vec<Registrant>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Registered,
    EventNotFound,
    AlreadyRegistered,
    EventFull,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, max = 2000, message = "Description is required and cannot exceed 2000 characters"))]
    pub description: String,
    #[validate(required(message = "Date is required"))]
    pub date: Option<DateTime<Utc>>,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    #[serde(default)]
    pub event_type: EventType,
    #[validate(range(min = 1, message = "Max attendees must be at least 1"))]
    pub max_attendees: Option<i32>,
    pub is_active: Option<bool>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 2000, message = "Description cannot exceed 2000 characters"))]
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    #[validate(length(min = 1, message = "Location cannot be empty"))]
    pub location: Option<String>,
    pub event_type: Option<EventType>,
    /// `Some(None)` (explicit `null`) removes the capacity limit.
    #[serde(default, with = "double_option")]
    pub max_attendees: Option<Option<i32>>,
    pub is_active: Option<bool>,
    pub image: Option<String>,
}

/// Resolved event fields written by the repository.
#[derive(Debug, Clone, PartialEq)]
pub struct EventData {
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub event_type: EventType,
    pub max_attendees: Option<i32>,
    pub is_active: bool,
    pub image: String,
}

impl EventData {
    pub fn from_event(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            description: event.description.clone(),
            date: event.date,
            location: event.location.clone(),
            event_type: event.event_type,
            max_attendees: event.max_attendees,
            is_active: event.is_active,
            image: event.image.clone(),
        }
    }

    pub fn apply(&mut self, req: UpdateEventRequest) {
        if let Some(title) = req.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = req.description {
            self.description = description;
        }
        if let Some(date) = req.date {
            self.date = date;
        }
        if let Some(location) = req.location {
            self.location = location.trim().to_string();
        }
        if let Some(event_type) = req.event_type {
            self.event_type = event_type;
        }
        if let Some(max) = req.max_attendees {
            self.max_attendees = max;
        }
        if let Some(active) = req.is_active {
            self.is_active = active;
        }
        if let Some(image) = req.image {
            self.image = image;
        }
    }
}

pub(crate) mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}
