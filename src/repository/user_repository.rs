use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{NewUser, PageRequest, ProfileData, Role, UpdateUser, User, UserFilter},
    error::{AppError, Result},
    repository::{
        codec::like_pattern, map_unique_violation, profile_repository::insert_profile,
        UserRepository,
    },
};

/// Column list matching `UserRow`, for queries that alias `users` as `u`.
pub(crate) const USER_COLUMNS: &str = "u.id, u.name, u.email, u.role, u.is_approved, u.is_active, \
     u.profile_photo, u.last_login, u.created_at, u.updated_at";

#[derive(FromRow)]
pub(crate) struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub is_approved: i32,
    pub is_active: i32,
    pub profile_photo: String,
    pub last_login: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

pub(crate) fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| AppError::Database(e.to_string()))
}

pub(crate) fn utc(dt: NaiveDateTime) -> DateTime<Utc> {
    DateTime::from_naive_utc_and_offset(dt, Utc)
}

pub(crate) fn row_to_user(row: UserRow) -> Result<User> {
    Ok(User {
        id: parse_uuid(&row.id)?,
        name: row.name,
        email: row.email,
        role: Role::from_str(&row.role)
            .ok_or_else(|| AppError::Database(format!("Invalid role: {}", row.role)))?,
        is_approved: row.is_approved != 0,
        is_active: row.is_active != 0,
        profile_photo: row.profile_photo,
        last_login: row.last_login.map(utc),
        created_at: utc(row.created_at),
        updated_at: utc(row.updated_at),
    })
}

fn bool_param(value: Option<bool>) -> Option<i32> {
    value.map(i32::from)
}

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Optional filters are bound twice: `(? IS NULL OR column = ?)`.
const USER_FILTER_SQL: &str = r#"
    (? IS NULL OR u.role = ?)
    AND (? IS NULL OR u.is_approved = ?)
    AND (? IS NULL OR u.is_active = ?)
    AND (? IS NULL OR u.name LIKE ? ESCAPE '\' OR u.email LIKE ? ESCAPE '\')
"#;

async fn insert_user<'e, E>(executor: E, user: &NewUser) -> Result<Uuid>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let id = Uuid::new_v4();
    let now = Utc::now().naive_utc();

    sqlx::query(
        r#"
        INSERT INTO users (
            id, name, email, password_hash, role, is_approved, is_active,
            profile_photo, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, 1, '', ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.role.as_str())
    .bind(i32::from(user.is_approved))
    .bind(now)
    .bind(now)
    .execute(executor)
    .await
    .map_err(|e| map_unique_violation(e, "Email already registered"))?;

    Ok(id)
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: NewUser) -> Result<User> {
        let id = insert_user(&self.pool, &user).await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created user".to_string()))
    }

    async fn create_with_profile(&self, user: NewUser, profile: &ProfileData) -> Result<User> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let id = insert_user(&mut *tx, &user).await?;
        insert_profile(&mut *tx, id, profile).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created user".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users u WHERE u.id = ?",
            USER_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users u WHERE u.email = ?",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        row.map(row_to_user).transpose()
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<(User, String)>> {
        let row = sqlx::query_as::<_, CredentialRow>(&format!(
            "SELECT {}, u.password_hash FROM users u WHERE u.email = ?",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(row) => Ok(Some((row_to_user(row.user)?, row.password_hash))),
            None => Ok(None),
        }
    }

    async fn list(&self, filter: &UserFilter, page: PageRequest) -> Result<(Vec<User>, i64)> {
        let role = filter.role.map(|r| r.as_str());
        let approved = bool_param(filter.is_approved);
        let active = bool_param(filter.is_active);
        let search = filter.search.as_deref().map(like_pattern);

        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users u WHERE {} ORDER BY u.created_at DESC LIMIT ? OFFSET ?",
            USER_COLUMNS, USER_FILTER_SQL
        ))
        .bind(role)
        .bind(role)
        .bind(approved)
        .bind(approved)
        .bind(active)
        .bind(active)
        .bind(&search)
        .bind(&search)
        .bind(&search)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        let users = rows.into_iter().map(row_to_user).collect::<Result<Vec<_>>>()?;
        let total = self.count(filter).await?;
        Ok((users, total))
    }

    async fn count(&self, filter: &UserFilter) -> Result<i64> {
        let role = filter.role.map(|r| r.as_str());
        let approved = bool_param(filter.is_approved);
        let active = bool_param(filter.is_active);
        let search = filter.search.as_deref().map(like_pattern);

        let count: (i64,) = sqlx::query_as(&format!(
            "SELECT COUNT(*) FROM users u WHERE {}",
            USER_FILTER_SQL
        ))
        .bind(role)
        .bind(role)
        .bind(approved)
        .bind(approved)
        .bind(active)
        .bind(active)
        .bind(&search)
        .bind(&search)
        .bind(&search)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count.0)
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users u ORDER BY u.created_at DESC LIMIT ?",
            USER_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(row_to_user).collect()
    }

    async fn update(&self, id: Uuid, update: UpdateUser) -> Result<User> {
        let now = Utc::now().naive_utc();

        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = COALESCE(?, name),
                email = COALESCE(?, email),
                is_active = COALESCE(?, is_active),
                is_approved = COALESCE(?, is_approved),
                profile_photo = COALESCE(?, profile_photo),
                last_login = COALESCE(?, last_login),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&update.name)
        .bind(&update.email)
        .bind(bool_param(update.is_active))
        .bind(bool_param(update.is_approved))
        .bind(&update.profile_photo)
        .bind(update.last_login.map(|dt| dt.naive_utc()))
        .bind(now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Email already registered"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("User"));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve updated user".to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("User"));
        }
        Ok(())
    }
}
