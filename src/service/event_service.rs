use std::sync::Arc;

use uuid::Uuid;

use crate::{
    domain::{
        validation::validate_with, CreateEventRequest, Event, EventData, EventDetail, Page,
        PageRequest, RegistrationOutcome, UpdateEventRequest, User,
    },
    error::{AppError, FieldError, Result},
    repository::EventRepository,
};

pub struct EventService {
    repo: Arc<dyn EventRepository>,
}

impl EventService {
    pub fn new(repo: Arc<dyn EventRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, organizer: &User, request: CreateEventRequest) -> Result<Event> {
        validate_with(&request, Vec::new())?;

        let date = request
            .date
            .ok_or_else(|| AppError::invalid_field("date", "Date is required"))?;
        let data = EventData {
            title: request.title.trim().to_string(),
            description: request.description,
            date,
            location: request.location.trim().to_string(),
            event_type: request.event_type,
            max_attendees: request.max_attendees,
            is_active: request.is_active.unwrap_or(true),
            image: request.image.unwrap_or_default(),
        };

        let event = self.repo.create(organizer.id, &data).await?;
        tracing::info!("Event {} created by {}", event.id, organizer.id);
        Ok(event)
    }

    pub async fn update(&self, id: Uuid, request: UpdateEventRequest) -> Result<Event> {
        let mut extra = Vec::new();
        if let Some(Some(max)) = request.max_attendees {
            if max < 1 {
                extra.push(FieldError::new("maxAttendees", "Max attendees must be at least 1"));
            }
        }
        validate_with(&request, extra)?;

        let current = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Event"))?;

        let mut data = EventData::from_event(&current);
        data.apply(request);
        self.repo.update(id, &data).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.repo.delete(id).await?;
        tracing::info!("Event {} deleted", id);
        Ok(())
    }

    /// Soonest first. `active_only` is false only for the admin listing.
    pub async fn list(&self, active_only: bool, page: PageRequest) -> Result<Page<Event>> {
        let (events, total) = self.repo.list(active_only, page).await?;
        Ok(Page::new(events, total, page))
    }

    /// Inactive events are only visible to admins.
    pub async fn get(&self, viewer: &User, id: Uuid) -> Result<EventDetail> {
        let event = self
            .repo
            .find_by_id(id)
            .await?
            .filter(|e| e.is_active || viewer.is_admin())
            .ok_or_else(|| AppError::not_found("Event"))?;

        let registered_users = self.repo.list_registrants(id).await?;
        Ok(EventDetail {
            event,
            registered_users,
        })
    }

    pub async fn register(&self, user: &User, event_id: Uuid) -> Result<Event> {
        match self.repo.register(event_id, user.id).await? {
            RegistrationOutcome::Registered => {}
            RegistrationOutcome::AlreadyRegistered => {
                return Err(AppError::Conflict(
                    "Already registered for this event".to_string(),
                ))
            }
            RegistrationOutcome::EventFull => {
                return Err(AppError::Conflict("Event is full".to_string()))
            }
            RegistrationOutcome::EventNotFound => return Err(AppError::not_found("Event")),
        }

        tracing::debug!("User {} registered for event {}", user.id, event_id);
        self.repo
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| AppError::not_found("Event"))
    }

    /// Unregistering when not registered is a no-op success.
    pub async fn unregister(&self, user: &User, event_id: Uuid) -> Result<Event> {
        if self.repo.find_by_id(event_id).await?.is_none() {
            return Err(AppError::not_found("Event"));
        }
        self.repo.unregister(event_id, user.id).await?;
        self.repo
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| AppError::not_found("Event"))
    }
}
