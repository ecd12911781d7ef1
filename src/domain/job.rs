use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::PersonSummary;
use crate::error::FieldError;

pub const DEFAULT_CURRENCY: &str = "USD";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum EmploymentType {
    #[default]
    FullTime,
    PartTime,
    Contract,
    Internship,
    Freelance,
}

impl EmploymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentType::FullTime => "full-time",
            EmploymentType::PartTime => "part-time",
            EmploymentType::Contract => "contract",
            EmploymentType::Internship => "internship",
            EmploymentType::Freelance => "freelance",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "full-time" => Some(EmploymentType::FullTime),
            "part-time" => Some(EmploymentType::PartTime),
            "contract" => Some(EmploymentType::Contract),
            "internship" => Some(EmploymentType::Internship),
            "freelance" => Some(EmploymentType::Freelance),
            _ => None,
        }
    }
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Salary {
    pub min: Option<i64>,
    pub max: Option<i64>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for Salary {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            currency: default_currency(),
        }
    }
}

impl Salary {
    pub fn check(&self) -> Option<FieldError> {
        match (self.min, self.max) {
            (Some(min), _) if min < 0 => Some(FieldError::new("salary", "Salary cannot be negative")),
            (Some(min), Some(max)) if min > max => Some(FieldError::new(
                "salary",
                "Minimum salary cannot exceed maximum salary",
            )),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Reviewed,
    Rejected,
    Accepted,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewed => "reviewed",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Accepted => "accepted",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ApplicationStatus::Pending),
            "reviewed" => Some(ApplicationStatus::Reviewed),
            "rejected" => Some(ApplicationStatus::Rejected),
            "accepted" => Some(ApplicationStatus::Accepted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobPost {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub description: String,
    pub location: String,
    pub employment_type: EmploymentType,
    pub salary: Salary,
    pub requirements: Vec<String>,
    pub posted_by: PersonSummary,
    pub contact_email: String,
    pub is_active: bool,
    pub application_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobApplication {
    pub job_post_id: Uuid,
    pub applicant: PersonSummary,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    /// Case-insensitive substring over title, company and description.
    pub search: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<EmploymentType>,
    /// `false` also lists inactive posts (admin view).
    pub active_only: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Company is required"))]
    pub company: String,
    #[validate(length(min = 1, max = 5000, message = "Description is required and cannot exceed 5000 characters"))]
    pub description: String,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    #[serde(default)]
    pub employment_type: EmploymentType,
    pub salary: Option<Salary>,
    pub requirements: Option<Vec<String>>,
    #[validate(email(message = "Valid contact email is required"))]
    pub contact_email: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobRequest {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Company cannot be empty"))]
    pub company: Option<String>,
    #[validate(length(min = 1, max = 5000, message = "Description cannot exceed 5000 characters"))]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "Location cannot be empty"))]
    pub location: Option<String>,
    pub employment_type: Option<EmploymentType>,
    pub salary: Option<Salary>,
    pub requirements: Option<Vec<String>>,
    #[validate(email(message = "Valid contact email is required"))]
    pub contact_email: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStatusRequest {
    pub status: ApplicationStatus,
}

/// Resolved job fields written by the repository.
#[derive(Debug, Clone, PartialEq)]
pub struct JobData {
    pub title: String,
    pub company: String,
    pub description: String,
    pub location: String,
    pub employment_type: EmploymentType,
    pub salary: Salary,
    pub requirements: Vec<String>,
    pub contact_email: String,
    pub is_active: bool,
}

impl JobData {
    pub fn from_request(req: CreateJobRequest) -> Self {
        Self {
            title: req.title.trim().to_string(),
            company: req.company.trim().to_string(),
            description: req.description,
            location: req.location.trim().to_string(),
            employment_type: req.employment_type,
            salary: req.salary.unwrap_or_default(),
            requirements: super::validation::clean_list(req.requirements.unwrap_or_default()),
            contact_email: req.contact_email.trim().to_string(),
            is_active: true,
        }
    }

    pub fn from_job(job: &JobPost) -> Self {
        Self {
            title: job.title.clone(),
            company: job.company.clone(),
            description: job.description.clone(),
            location: job.location.clone(),
            employment_type: job.employment_type,
            salary: job.salary.clone(),
            requirements: job.requirements.clone(),
            contact_email: job.contact_email.clone(),
            is_active: job.is_active,
        }
    }

    pub fn apply(&mut self, req: UpdateJobRequest) {
        if let Some(title) = req.title {
            self.title = title.trim().to_string();
        }
        if let Some(company) = req.company {
            self.company = company.trim().to_string();
        }
        if let Some(description) = req.description {
            self.description = description;
        }
        if let Some(location) = req.location {
            self.location = location.trim().to_string();
        }
        if let Some(employment_type) = req.employment_type {
            self.employment_type = employment_type;
        }
        if let Some(salary) = req.salary {
            self.salary = salary;
        }
        if let Some(requirements) = req.requirements {
            self.requirements = super::validation::clean_list(requirements);
        }
        if let Some(email) = req.contact_email {
            self.contact_email = email.trim().to_string();
        }
        if let Some(active) = req.is_active {
            self.is_active = active;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salary_currency_defaults_to_usd() {
        let salary: Salary = serde_json::from_str(r#"{"min":1000}"#).unwrap();
        assert_eq!(salary.currency, "USD");
        assert_eq!(salary.max, None);
    }

    #[test]
    fn salary_range_must_be_ordered() {
        let salary = Salary {
            min: Some(10),
            max: Some(5),
            currency: "EUR".into(),
        };
        assert!(salary.check().is_some());
        assert!(Salary::default().check().is_none());
    }

    #[test]
    fn employment_type_uses_kebab_case() {
        let t: EmploymentType = serde_json::from_str(r#""part-time""#).unwrap();
        assert_eq!(t, EmploymentType::PartTime);
        assert_eq!(EmploymentType::from_str(t.as_str()), Some(t));
    }
}
