use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Announcement, AnnouncementData, Audience, PageRequest, PersonSummary},
    error::{AppError, Result},
    repository::{
        codec::{decode_audience, encode_audience, AUDIENCE_MATCHES_SQL},
        user_repository::{parse_uuid, utc},
        AnnouncementRepository,
    },
};

const ANNOUNCEMENT_SELECT: &str = r#"
    SELECT a.id, a.title, a.message, a.posted_by_id,
           p.name AS posted_by_name, p.email AS posted_by_email,
           a.target_audience, a.is_important, a.is_active, a.created_at, a.updated_at
    FROM announcements a
    JOIN users p ON p.id = a.posted_by_id
"#;

#[derive(FromRow)]
struct AnnouncementRow {
    id: String,
    title: String,
    message: String,
    posted_by_id: String,
    posted_by_name: String,
    posted_by_email: String,
    target_audience: Option<String>,
    is_important: i32,
    is_active: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteAnnouncementRepository {
    pool: SqlitePool,
}

impl SqliteAnnouncementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_announcement(row: AnnouncementRow) -> Result<Announcement> {
        Ok(Announcement {
            id: parse_uuid(&row.id)?,
            title: row.title,
            message: row.message,
            posted_by: PersonSummary {
                id: parse_uuid(&row.posted_by_id)?,
                name: row.posted_by_name,
                email: row.posted_by_email,
            },
            target_audience: decode_audience(row.target_audience.as_deref())?,
            is_important: row.is_important != 0,
            is_active: row.is_active != 0,
            created_at: utc(row.created_at),
            updated_at: utc(row.updated_at),
        })
    }
}

#[async_trait]
impl AnnouncementRepository for SqliteAnnouncementRepository {
    async fn create(&self, posted_by: Uuid, data: &AnnouncementData) -> Result<Announcement> {
        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();
        let audience = encode_audience(&data.target_audience)?;

        sqlx::query(
            r#"
            INSERT INTO announcements (
                id, title, message, posted_by_id, target_audience,
                is_important, is_active, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&data.title)
        .bind(&data.message)
        .bind(posted_by.to_string())
        .bind(&audience)
        .bind(i32::from(data.is_important))
        .bind(i32::from(data.is_active))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created announcement".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Announcement>> {
        let row = sqlx::query_as::<_, AnnouncementRow>(&format!("{} WHERE a.id = ?", ANNOUNCEMENT_SELECT))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        row.map(Self::row_to_announcement).transpose()
    }

    async fn list(&self, page: PageRequest) -> Result<(Vec<Announcement>, i64)> {
        let rows = sqlx::query_as::<_, AnnouncementRow>(&format!(
            "{} ORDER BY a.created_at DESC LIMIT ? OFFSET ?",
            ANNOUNCEMENT_SELECT
        ))
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM announcements")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let announcements = rows
            .into_iter()
            .map(Self::row_to_announcement)
            .collect::<Result<Vec<_>>>()?;
        Ok((announcements, total.0))
    }

    async fn list_for_audience(&self, audience: Audience, limit: i64) -> Result<Vec<Announcement>> {
        let rows = sqlx::query_as::<_, AnnouncementRow>(&format!(
            "{} WHERE a.is_active = 1 AND {} \
             ORDER BY a.is_important DESC, a.created_at DESC LIMIT ?",
            ANNOUNCEMENT_SELECT, AUDIENCE_MATCHES_SQL
        ))
        .bind(audience.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_announcement).collect()
    }

    async fn update(&self, id: Uuid, data: &AnnouncementData) -> Result<Announcement> {
        let now = Utc::now().naive_utc();
        let audience = encode_audience(&data.target_audience)?;

        let result = sqlx::query(
            r#"
            UPDATE announcements
            SET title = ?, message = ?, target_audience = ?, is_important = ?,
                is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&data.title)
        .bind(&data.message)
        .bind(&audience)
        .bind(i32::from(data.is_important))
        .bind(i32::from(data.is_active))
        .bind(now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Announcement"));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve updated announcement".to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM announcements WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Announcement"));
        }
        Ok(())
    }
}
