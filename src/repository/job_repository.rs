use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{
        ApplicationStatus, EmploymentType, JobApplication, JobData, JobFilter, JobPost,
        PageRequest, PersonSummary,
    },
    error::{AppError, Result},
    repository::{
        codec::{decode_list, encode_list, like_pattern, SalaryColumns},
        user_repository::{parse_uuid, utc},
        JobRepository,
    },
};

const JOB_SELECT: &str = r#"
    SELECT j.id, j.title, j.company, j.description, j.location, j.employment_type,
           j.salary_min, j.salary_max, j.salary_currency, j.requirements,
           j.posted_by_id, p.name AS posted_by_name, p.email AS posted_by_email,
           j.contact_email, j.is_active, j.created_at, j.updated_at,
           (SELECT COUNT(*) FROM job_applications a WHERE a.job_post_id = j.id) AS application_count
    FROM job_posts j
    JOIN users p ON p.id = j.posted_by_id
"#;

const JOB_FILTER_SQL: &str = r#"
    (? = 0 OR j.is_active = 1)
    AND (? IS NULL
         OR j.title LIKE ? ESCAPE '\'
         OR j.company LIKE ? ESCAPE '\'
         OR j.description LIKE ? ESCAPE '\')
    AND (? IS NULL OR j.location LIKE ? ESCAPE '\')
    AND (? IS NULL OR j.employment_type = ?)
"#;

#[derive(FromRow)]
struct JobRow {
    id: String,
    title: String,
    company: String,
    description: String,
    location: String,
    employment_type: String,
    salary_min: Option<i64>,
    salary_max: Option<i64>,
    salary_currency: Option<String>,
    requirements: Option<String>,
    posted_by_id: String,
    posted_by_name: String,
    posted_by_email: String,
    contact_email: String,
    is_active: i32,
    application_count: i64,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(FromRow)]
struct ApplicationRow {
    job_post_id: String,
    user_id: String,
    name: String,
    email: String,
    status: String,
    applied_at: NaiveDateTime,
}

pub struct SqliteJobRepository {
    pool: SqlitePool,
}

impl SqliteJobRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_job(row: JobRow) -> Result<JobPost> {
        Ok(JobPost {
            id: parse_uuid(&row.id)?,
            title: row.title,
            company: row.company,
            description: row.description,
            location: row.location,
            employment_type: EmploymentType::from_str(&row.employment_type).ok_or_else(|| {
                AppError::Database(format!("Invalid employment type: {}", row.employment_type))
            })?,
            salary: SalaryColumns::decode(row.salary_min, row.salary_max, row.salary_currency),
            requirements: decode_list(row.requirements.as_deref())?,
            posted_by: PersonSummary {
                id: parse_uuid(&row.posted_by_id)?,
                name: row.posted_by_name,
                email: row.posted_by_email,
            },
            contact_email: row.contact_email,
            is_active: row.is_active != 0,
            application_count: row.application_count,
            created_at: utc(row.created_at),
            updated_at: utc(row.updated_at),
        })
    }

    fn row_to_application(row: ApplicationRow) -> Result<JobApplication> {
        Ok(JobApplication {
            job_post_id: parse_uuid(&row.job_post_id)?,
            applicant: PersonSummary {
                id: parse_uuid(&row.user_id)?,
                name: row.name,
                email: row.email,
            },
            status: ApplicationStatus::from_str(&row.status)
                .ok_or_else(|| AppError::Database(format!("Invalid application status: {}", row.status)))?,
            applied_at: utc(row.applied_at),
        })
    }
}

#[async_trait]
impl JobRepository for SqliteJobRepository {
    async fn create(&self, posted_by: Uuid, data: &JobData) -> Result<JobPost> {
        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();
        let salary = SalaryColumns::encode(&data.salary);
        let requirements = encode_list(&data.requirements)?;

        sqlx::query(
            r#"
            INSERT INTO job_posts (
                id, title, company, description, location, employment_type,
                salary_min, salary_max, salary_currency, requirements,
                posted_by_id, contact_email, is_active, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&data.title)
        .bind(&data.company)
        .bind(&data.description)
        .bind(&data.location)
        .bind(data.employment_type.as_str())
        .bind(salary.min)
        .bind(salary.max)
        .bind(&salary.currency)
        .bind(&requirements)
        .bind(posted_by.to_string())
        .bind(&data.contact_email)
        .bind(i32::from(data.is_active))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created job post".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<JobPost>> {
        let row = sqlx::query_as::<_, JobRow>(&format!("{} WHERE j.id = ?", JOB_SELECT))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        row.map(Self::row_to_job).transpose()
    }

    async fn list(&self, filter: &JobFilter, page: PageRequest) -> Result<(Vec<JobPost>, i64)> {
        let active_only = i32::from(filter.active_only);
        let search = filter.search.as_deref().map(like_pattern);
        let location = filter.location.as_deref().map(like_pattern);
        let employment_type = filter.employment_type.map(|t| t.as_str());

        let rows = sqlx::query_as::<_, JobRow>(&format!(
            "{} WHERE {} ORDER BY j.created_at DESC LIMIT ? OFFSET ?",
            JOB_SELECT, JOB_FILTER_SQL
        ))
        .bind(active_only)
        .bind(&search)
        .bind(&search)
        .bind(&search)
        .bind(&search)
        .bind(&location)
        .bind(&location)
        .bind(employment_type)
        .bind(employment_type)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        let total: (i64,) = sqlx::query_as(&format!(
            "SELECT COUNT(*) FROM job_posts j WHERE {}",
            JOB_FILTER_SQL
        ))
        .bind(active_only)
        .bind(&search)
        .bind(&search)
        .bind(&search)
        .bind(&search)
        .bind(&location)
        .bind(&location)
        .bind(employment_type)
        .bind(employment_type)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        let jobs = rows
            .into_iter()
            .map(Self::row_to_job)
            .collect::<Result<Vec<_>>>()?;
        Ok((jobs, total.0))
    }

    async fn update(&self, id: Uuid, data: &JobData) -> Result<JobPost> {
        let now = Utc::now().naive_utc();
        let salary = SalaryColumns::encode(&data.salary);
        let requirements = encode_list(&data.requirements)?;

        let result = sqlx::query(
            r#"
            UPDATE job_posts
            SET title = ?, company = ?, description = ?, location = ?, employment_type = ?,
                salary_min = ?, salary_max = ?, salary_currency = ?, requirements = ?,
                contact_email = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&data.title)
        .bind(&data.company)
        .bind(&data.description)
        .bind(&data.location)
        .bind(data.employment_type.as_str())
        .bind(salary.min)
        .bind(salary.max)
        .bind(&salary.currency)
        .bind(&requirements)
        .bind(&data.contact_email)
        .bind(i32::from(data.is_active))
        .bind(now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Job post"));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve updated job post".to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM job_posts WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Job post"));
        }
        Ok(())
    }

    async fn count_active(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM job_posts WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count.0)
    }

    async fn add_application(&self, job_id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO job_applications (job_post_id, user_id, status, applied_at)
            VALUES (?, ?, 'pending', ?)
            ON CONFLICT (job_post_id, user_id) DO NOTHING
            "#,
        )
        .bind(job_id.to_string())
        .bind(user_id.to_string())
        .bind(Utc::now().naive_utc())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_applications(&self, job_id: Uuid) -> Result<Vec<JobApplication>> {
        let rows = sqlx::query_as::<_, ApplicationRow>(
            r#"
            SELECT a.job_post_id, a.user_id, u.name, u.email, a.status, a.applied_at
            FROM job_applications a
            JOIN users u ON u.id = a.user_id
            WHERE a.job_post_id = ?
            ORDER BY a.applied_at ASC
            "#,
        )
        .bind(job_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_application).collect()
    }

    async fn set_application_status(
        &self,
        job_id: Uuid,
        user_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE job_applications SET status = ? WHERE job_post_id = ? AND user_id = ?",
        )
        .bind(status.as_str())
        .bind(job_id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
