use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Event, EventData, EventType, PageRequest, PersonSummary, Registrant, RegistrationOutcome},
    error::{AppError, Result},
    repository::{
        map_unique_violation,
        user_repository::{parse_uuid, utc},
        EventRepository,
    },
};

const EVENT_SELECT: &str = r#"
    SELECT e.id, e.title, e.description, e.event_date, e.location, e.event_type,
           e.organizer_id, o.name AS organizer_name, o.email AS organizer_email,
           e.max_attendees, e.is_active, e.image, e.created_at, e.updated_at,
           (SELECT COUNT(*) FROM event_registrations r WHERE r.event_id = e.id) AS registered_count
    FROM events e
    JOIN users o ON o.id = e.organizer_id
"#;

#[derive(FromRow)]
struct EventRow {
    id: String,
    title: String,
    description: String,
    event_date: NaiveDateTime,
    location: String,
    event_type: String,
    organizer_id: String,
    organizer_name: String,
    organizer_email: String,
    max_attendees: Option<i32>,
    is_active: i32,
    image: String,
    registered_count: i64,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(FromRow)]
struct RegistrantRow {
    user_id: String,
    name: String,
    email: String,
    profile_photo: String,
    registered_at: NaiveDateTime,
}

pub struct SqliteEventRepository {
    pool: SqlitePool,
}

impl SqliteEventRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_event(row: EventRow) -> Result<Event> {
        Ok(Event {
            id: parse_uuid(&row.id)?,
            title: row.title,
            description: row.description,
            date: utc(row.event_date),
            location: row.location,
            event_type: EventType::from_str(&row.event_type)
                .ok_or_else(|| AppError::Database(format!("Invalid event type: {}", row.event_type)))?,
            organizer: PersonSummary {
                id: parse_uuid(&row.organizer_id)?,
                name: row.organizer_name,
                email: row.organizer_email,
            },
            max_attendees: row.max_attendees,
            is_active: row.is_active != 0,
            image: row.image,
            registered_count: row.registered_count,
            created_at: utc(row.created_at),
            updated_at: utc(row.updated_at),
        })
    }

    /// Explains why a conditional registration insert wrote nothing.
    async fn classify_rejection(&self, event_id: &str, user_id: &str) -> Result<RegistrationOutcome> {
        let already: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM event_registrations WHERE event_id = ? AND user_id = ?",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
        if already.0 > 0 {
            return Ok(RegistrationOutcome::AlreadyRegistered);
        }

        let open: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events WHERE id = ? AND is_active = 1")
            .bind(event_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        if open.0 == 0 {
            Ok(RegistrationOutcome::EventNotFound)
        } else {
            Ok(RegistrationOutcome::EventFull)
        }
    }
}

#[async_trait]
impl EventRepository for SqliteEventRepository {
    async fn create(&self, organizer_id: Uuid, data: &EventData) -> Result<Event> {
        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO events (
                id, title, description, event_date, location, event_type,
                organizer_id, max_attendees, is_active, image, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.date.naive_utc())
        .bind(&data.location)
        .bind(data.event_type.as_str())
        .bind(organizer_id.to_string())
        .bind(data.max_attendees)
        .bind(i32::from(data.is_active))
        .bind(&data.image)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created event".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>> {
        let row = sqlx::query_as::<_, EventRow>(&format!("{} WHERE e.id = ?", EVENT_SELECT))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        row.map(Self::row_to_event).transpose()
    }

    async fn list(&self, active_only: bool, page: PageRequest) -> Result<(Vec<Event>, i64)> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "{} WHERE (? = 0 OR e.is_active = 1) ORDER BY e.event_date ASC LIMIT ? OFFSET ?",
            EVENT_SELECT
        ))
        .bind(i32::from(active_only))
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        let total: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM events e WHERE (? = 0 OR e.is_active = 1)")
                .bind(i32::from(active_only))
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;

        let events = rows
            .into_iter()
            .map(Self::row_to_event)
            .collect::<Result<Vec<_>>>()?;
        Ok((events, total.0))
    }

    async fn update(&self, id: Uuid, data: &EventData) -> Result<Event> {
        let now = Utc::now().naive_utc();

        let result = sqlx::query(
            r#"
            UPDATE events
            SET title = ?, description = ?, event_date = ?, location = ?, event_type = ?,
                max_attendees = ?, is_active = ?, image = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.date.naive_utc())
        .bind(&data.location)
        .bind(data.event_type.as_str())
        .bind(data.max_attendees)
        .bind(i32::from(data.is_active))
        .bind(&data.image)
        .bind(now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Event"));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve updated event".to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Event"));
        }
        Ok(())
    }

    async fn count(&self, upcoming_after: Option<DateTime<Utc>>) -> Result<i64> {
        let after = upcoming_after.map(|dt| dt.naive_utc());
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM events WHERE (? IS NULL OR event_date >= ?)",
        )
        .bind(after)
        .bind(after)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count.0)
    }

    async fn register(&self, event_id: Uuid, user_id: Uuid) -> Result<RegistrationOutcome> {
        let event_id = event_id.to_string();
        let user_id = user_id.to_string();
        let now = Utc::now().naive_utc();

        // One statement: SQLite serializes writers, so the capacity check and the
        // insert cannot interleave with another registration.
        let result = sqlx::query(
            r#"
            INSERT INTO event_registrations (event_id, user_id, registered_at)
            SELECT e.id, ?, ?
            FROM events e
            WHERE e.id = ?
              AND e.is_active = 1
              AND (e.max_attendees IS NULL
                   OR (SELECT COUNT(*) FROM event_registrations r WHERE r.event_id = e.id)
                      < e.max_attendees)
            ON CONFLICT (event_id, user_id) DO NOTHING
            "#,
        )
        .bind(&user_id)
        .bind(now)
        .bind(&event_id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Already registered for this event"))?;

        if result.rows_affected() == 1 {
            return Ok(RegistrationOutcome::Registered);
        }
        self.classify_rejection(&event_id, &user_id).await
    }

    async fn unregister(&self, event_id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM event_registrations WHERE event_id = ? AND user_id = ?")
            .bind(event_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_registrants(&self, event_id: Uuid) -> Result<Vec<Registrant>> {
        let rows = sqlx::query_as::<_, RegistrantRow>(
            r#"
            SELECT r.user_id, u.name, u.email, u.profile_photo, r.registered_at
            FROM event_registrations r
            JOIN users u ON u.id = r.user_id
            WHERE r.event_id = ?
            ORDER BY r.registered_at ASC
            "#,
        )
        .bind(event_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter()
            .map(|row| {
                Ok(Registrant {
                    user_id: parse_uuid(&row.user_id)?,
                    name: row.name,
                    email: row.email,
                    profile_photo: row.profile_photo,
                    registered_at: utc(row.registered_at),
                })
            })
            .collect()
    }
}
