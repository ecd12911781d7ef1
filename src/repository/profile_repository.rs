use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{
        AdminAlumniFilter, AlumniProfile, AlumniRecord, DirectoryEntry, DirectoryFilter,
        PageRequest, PrivacySettings, ProfileData, SocialLinks,
    },
    error::{AppError, Result},
    repository::{
        codec::{decode_list, encode_list, like_pattern, list_element_like_sql, LocationColumns},
        map_unique_violation,
        user_repository::{parse_uuid, row_to_user, utc, UserRow, USER_COLUMNS},
        ProfileRepository,
    },
};

/// Profile columns are aliased with a `p_` prefix so they can sit next to
/// `USER_COLUMNS` in a join.
const PROFILE_COLUMNS: &str = "p.id AS p_id, p.user_id AS p_user_id, \
     p.graduation_year AS p_graduation_year, p.department AS p_department, \
     p.degree AS p_degree, p.company AS p_company, p.position AS p_position, \
     p.location_city AS p_location_city, p.location_state AS p_location_state, \
     p.location_country AS p_location_country, p.bio AS p_bio, \
     p.linkedin AS p_linkedin, p.github AS p_github, p.website AS p_website, \
     p.phone AS p_phone, p.skills AS p_skills, p.show_email AS p_show_email, \
     p.show_phone AS p_show_phone, p.show_location AS p_show_location, \
     p.created_at AS p_created_at, p.updated_at AS p_updated_at";

#[derive(FromRow)]
struct ProfileRow {
    p_id: String,
    p_user_id: String,
    p_graduation_year: i32,
    p_department: String,
    p_degree: String,
    p_company: String,
    p_position: String,
    p_location_city: String,
    p_location_state: String,
    p_location_country: String,
    p_bio: String,
    p_linkedin: String,
    p_github: String,
    p_website: String,
    p_phone: String,
    p_skills: Option<String>,
    p_show_email: i32,
    p_show_phone: i32,
    p_show_location: i32,
    p_created_at: NaiveDateTime,
    p_updated_at: NaiveDateTime,
}

#[derive(FromRow)]
struct DirectoryRow {
    #[sqlx(flatten)]
    user: UserRow,
    #[sqlx(flatten)]
    profile: ProfileRow,
}

pub struct SqliteProfileRepository {
    pool: SqlitePool,
}

impl SqliteProfileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_profile(row: ProfileRow) -> Result<AlumniProfile> {
        let location = LocationColumns {
            city: row.p_location_city,
            state: row.p_location_state,
            country: row.p_location_country,
        }
        .decode();

        Ok(AlumniProfile {
            id: parse_uuid(&row.p_id)?,
            user_id: parse_uuid(&row.p_user_id)?,
            graduation_year: row.p_graduation_year,
            department: row.p_department,
            degree: row.p_degree,
            company: row.p_company,
            position: row.p_position,
            location,
            bio: row.p_bio,
            social_links: SocialLinks {
                linkedin: row.p_linkedin,
                github: row.p_github,
                website: row.p_website,
            },
            phone: row.p_phone,
            skills: decode_list(row.p_skills.as_deref())?,
            privacy_settings: PrivacySettings {
                show_email: row.p_show_email != 0,
                show_phone: row.p_show_phone != 0,
                show_location: row.p_show_location != 0,
            },
            created_at: utc(row.p_created_at),
            updated_at: utc(row.p_updated_at),
        })
    }

    fn row_to_entry(row: DirectoryRow) -> Result<DirectoryEntry> {
        Ok(DirectoryEntry {
            user: row_to_user(row.user)?,
            profile: Self::row_to_profile(row.profile)?,
        })
    }
}

const DIRECTORY_FILTER_SQL: &str = r#"
    u.role = 'alumni' AND u.is_approved = 1 AND u.is_active = 1
    AND (? IS NULL
         OR u.name LIKE ? ESCAPE '\'
         OR p.company LIKE ? ESCAPE '\'
         OR p.position LIKE ? ESCAPE '\'
         OR {skills_match})
    AND (? IS NULL OR p.department LIKE ? ESCAPE '\')
    AND (? IS NULL OR p.graduation_year = ?)
    AND (? IS NULL OR p.company LIKE ? ESCAPE '\')
"#;

fn directory_filter_sql() -> String {
    DIRECTORY_FILTER_SQL.replace("{skills_match}", &list_element_like_sql("p.skills"))
}

const ADMIN_FILTER_SQL: &str = r#"
    u.role = 'alumni'
    AND (? IS NULL OR u.name LIKE ? ESCAPE '\' OR u.email LIKE ? ESCAPE '\')
    AND (? IS NULL OR u.is_approved = ?)
    AND (? IS NULL OR p.department LIKE ? ESCAPE '\')
    AND (? IS NULL OR p.graduation_year = ?)
"#;

/// Inserts a profile row. Shared with user creation so an alumni account and
/// its first profile can be written in one transaction.
pub(crate) async fn insert_profile<'e, E>(executor: E, user_id: Uuid, data: &ProfileData) -> Result<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let id = Uuid::new_v4();
    let now = Utc::now().naive_utc();
    let location = LocationColumns::encode(&data.location);
    let skills = encode_list(&data.skills)?;

    sqlx::query(
        r#"
        INSERT INTO alumni_profiles (
            id, user_id, graduation_year, department, degree, company, position,
            location_city, location_state, location_country, bio,
            linkedin, github, website, phone, skills,
            show_email, show_phone, show_location, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(user_id.to_string())
    .bind(data.graduation_year)
    .bind(&data.department)
    .bind(&data.degree)
    .bind(&data.company)
    .bind(&data.position)
    .bind(&location.city)
    .bind(&location.state)
    .bind(&location.country)
    .bind(&data.bio)
    .bind(&data.social_links.linkedin)
    .bind(&data.social_links.github)
    .bind(&data.social_links.website)
    .bind(&data.phone)
    .bind(&skills)
    .bind(i32::from(data.privacy_settings.show_email))
    .bind(i32::from(data.privacy_settings.show_phone))
    .bind(i32::from(data.privacy_settings.show_location))
    .bind(now)
    .bind(now)
    .execute(executor)
    .await
    .map_err(|e| map_unique_violation(e, "Profile already exists"))?;

    Ok(())
}

#[async_trait]
impl ProfileRepository for SqliteProfileRepository {
    async fn create(&self, user_id: Uuid, data: &ProfileData) -> Result<AlumniProfile> {
        insert_profile(&self.pool, user_id, data).await?;

        self.find_by_user(user_id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created profile".to_string()))
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<AlumniProfile>> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {} FROM alumni_profiles p WHERE p.user_id = ?",
            PROFILE_COLUMNS
        ))
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        row.map(Self::row_to_profile).transpose()
    }

    async fn update(&self, user_id: Uuid, data: &ProfileData) -> Result<AlumniProfile> {
        let now = Utc::now().naive_utc();
        let location = LocationColumns::encode(&data.location);
        let skills = encode_list(&data.skills)?;

        let result = sqlx::query(
            r#"
            UPDATE alumni_profiles
            SET graduation_year = ?, department = ?, degree = ?, company = ?, position = ?,
                location_city = ?, location_state = ?, location_country = ?, bio = ?,
                linkedin = ?, github = ?, website = ?, phone = ?, skills = ?,
                show_email = ?, show_phone = ?, show_location = ?, updated_at = ?
            WHERE user_id = ?
            "#,
        )
        .bind(data.graduation_year)
        .bind(&data.department)
        .bind(&data.degree)
        .bind(&data.company)
        .bind(&data.position)
        .bind(&location.city)
        .bind(&location.state)
        .bind(&location.country)
        .bind(&data.bio)
        .bind(&data.social_links.linkedin)
        .bind(&data.social_links.github)
        .bind(&data.social_links.website)
        .bind(&data.phone)
        .bind(&skills)
        .bind(i32::from(data.privacy_settings.show_email))
        .bind(i32::from(data.privacy_settings.show_phone))
        .bind(i32::from(data.privacy_settings.show_location))
        .bind(now)
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Profile"));
        }

        self.find_by_user(user_id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve updated profile".to_string()))
    }

    async fn search_directory(
        &self,
        filter: &DirectoryFilter,
        page: PageRequest,
    ) -> Result<(Vec<DirectoryEntry>, i64)> {
        let query = filter.query.as_deref().map(like_pattern);
        let department = filter.department.as_deref().map(like_pattern);
        let company = filter.company.as_deref().map(like_pattern);
        let where_sql = directory_filter_sql();

        let rows = sqlx::query_as::<_, DirectoryRow>(&format!(
            "SELECT {}, {} FROM alumni_profiles p JOIN users u ON u.id = p.user_id \
             WHERE {} ORDER BY p.graduation_year DESC, u.name ASC LIMIT ? OFFSET ?",
            USER_COLUMNS, PROFILE_COLUMNS, where_sql
        ))
        .bind(&query)
        .bind(&query)
        .bind(&query)
        .bind(&query)
        .bind(&query)
        .bind(&department)
        .bind(&department)
        .bind(filter.graduation_year)
        .bind(filter.graduation_year)
        .bind(&company)
        .bind(&company)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        let total: (i64,) = sqlx::query_as(&format!(
            "SELECT COUNT(*) FROM alumni_profiles p JOIN users u ON u.id = p.user_id WHERE {}",
            where_sql
        ))
        .bind(&query)
        .bind(&query)
        .bind(&query)
        .bind(&query)
        .bind(&query)
        .bind(&department)
        .bind(&department)
        .bind(filter.graduation_year)
        .bind(filter.graduation_year)
        .bind(&company)
        .bind(&company)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        let entries = rows
            .into_iter()
            .map(Self::row_to_entry)
            .collect::<Result<Vec<_>>>()?;
        Ok((entries, total.0))
    }

    async fn find_directory_entry(&self, profile_id: Uuid) -> Result<Option<DirectoryEntry>> {
        let row = sqlx::query_as::<_, DirectoryRow>(&format!(
            "SELECT {}, {} FROM alumni_profiles p JOIN users u ON u.id = p.user_id \
             WHERE p.id = ? AND u.role = 'alumni'",
            USER_COLUMNS, PROFILE_COLUMNS
        ))
        .bind(profile_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        row.map(Self::row_to_entry).transpose()
    }

    async fn list_alumni(
        &self,
        filter: &AdminAlumniFilter,
        page: PageRequest,
    ) -> Result<(Vec<AlumniRecord>, i64)> {
        let search = filter.search.as_deref().map(like_pattern);
        let approved = filter.is_approved.map(i32::from);
        let department = filter.department.as_deref().map(like_pattern);

        let users = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users u LEFT JOIN alumni_profiles p ON p.user_id = u.id \
             WHERE {} ORDER BY u.created_at DESC LIMIT ? OFFSET ?",
            USER_COLUMNS, ADMIN_FILTER_SQL
        ))
        .bind(&search)
        .bind(&search)
        .bind(&search)
        .bind(approved)
        .bind(approved)
        .bind(&department)
        .bind(&department)
        .bind(filter.graduation_year)
        .bind(filter.graduation_year)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        let total: (i64,) = sqlx::query_as(&format!(
            "SELECT COUNT(*) FROM users u LEFT JOIN alumni_profiles p ON p.user_id = u.id WHERE {}",
            ADMIN_FILTER_SQL
        ))
        .bind(&search)
        .bind(&search)
        .bind(&search)
        .bind(approved)
        .bind(approved)
        .bind(&department)
        .bind(&department)
        .bind(filter.graduation_year)
        .bind(filter.graduation_year)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        let mut records = Vec::with_capacity(users.len());
        for row in users {
            let user = row_to_user(row)?;
            let profile = self.find_by_user(user.id).await?;
            records.push(AlumniRecord { user, profile });
        }
        Ok((records, total.0))
    }

    async fn list_for_export(&self) -> Result<Vec<DirectoryEntry>> {
        let rows = sqlx::query_as::<_, DirectoryRow>(&format!(
            "SELECT {}, {} FROM alumni_profiles p JOIN users u ON u.id = p.user_id \
             WHERE u.role = 'alumni' ORDER BY p.graduation_year DESC, u.name ASC",
            USER_COLUMNS, PROFILE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_entry).collect()
    }
}
