use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::User;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Location {
    pub city: String,
    pub state: String,
    pub country: String,
}

impl Location {
    pub fn is_empty(&self) -> bool {
        self.city.is_empty() && self.state.is_empty() && self.country.is_empty()
    }

    /// "City, State, Country" with blank parts skipped.
    pub fn display(&self) -> String {
        [&self.city, &self.state, &self.country]
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SocialLinks {
    pub linkedin: String,
    pub github: String,
    pub website: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct PrivacySettings {
    pub show_email: bool,
    pub show_phone: bool,
    pub show_location: bool,
}

impl Default for PrivacySettings {
    fn default() -> Self {
        Self {
            show_email: false,
            show_phone: false,
            show_location: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AlumniProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub graduation_year: i32,
    pub department: String,
    pub degree: String,
    pub company: String,
    pub position: String,
    pub location: Location,
    pub bio: String,
    pub social_links: SocialLinks,
    pub phone: String,
    pub skills: Vec<String>,
    pub privacy_settings: PrivacySettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An approved alumni's profile together with its owner, as searched in the directory.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    pub user: User,
    pub profile: AlumniProfile,
}

/// An alumni account with its profile if one has been filled in (admin view).
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AlumniRecord {
    pub user: User,
    pub profile: Option<AlumniProfile>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpsertProfileRequest {
    pub graduation_year: Option<i32>,
    #[validate(length(min = 1, message = "Department is required"))]
    pub department: Option<String>,
    pub degree: Option<String>,
    pub company: Option<String>,
    pub position: Option<String>,
    pub location: Option<Location>,
    #[validate(length(max = 1000, message = "Bio cannot exceed 1000 characters"))]
    pub bio: Option<String>,
    pub social_links: Option<SocialLinks>,
    pub phone: Option<String>,
    pub skills: Option<Vec<String>>,
    pub privacy_settings: Option<PrivacySettings>,
}

/// Fully resolved profile fields handed to the repository on insert or update.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileData {
    pub graduation_year: i32,
    pub department: String,
    pub degree: String,
    pub company: String,
    pub position: String,
    pub location: Location,
    pub bio: String,
    pub social_links: SocialLinks,
    pub phone: String,
    pub skills: Vec<String>,
    pub privacy_settings: PrivacySettings,
}

impl ProfileData {
    pub fn from_profile(profile: &AlumniProfile) -> Self {
        Self {
            graduation_year: profile.graduation_year,
            department: profile.department.clone(),
            degree: profile.degree.clone(),
            company: profile.company.clone(),
            position: profile.position.clone(),
            location: profile.location.clone(),
            bio: profile.bio.clone(),
            social_links: profile.social_links.clone(),
            phone: profile.phone.clone(),
            skills: profile.skills.clone(),
            privacy_settings: profile.privacy_settings,
        }
    }

    /// Minimal profile created at alumni self-registration.
    pub fn initial(graduation_year: i32, department: String) -> Self {
        Self {
            graduation_year,
            department,
            degree: String::new(),
            company: String::new(),
            position: String::new(),
            location: Location::default(),
            bio: String::new(),
            social_links: SocialLinks::default(),
            phone: String::new(),
            skills: Vec::new(),
            privacy_settings: PrivacySettings::default(),
        }
    }

    /// Overlays the fields present in `req`; absent fields keep their value.
    pub fn apply(&mut self, req: UpsertProfileRequest) {
        if let Some(year) = req.graduation_year {
            self.graduation_year = year;
        }
        if let Some(department) = req.department {
            self.department = department.trim().to_string();
        }
        if let Some(degree) = req.degree {
            self.degree = degree.trim().to_string();
        }
        if let Some(company) = req.company {
            self.company = company.trim().to_string();
        }
        if let Some(position) = req.position {
            self.position = position.trim().to_string();
        }
        if let Some(location) = req.location {
            self.location = Location {
                city: location.city.trim().to_string(),
                state: location.state.trim().to_string(),
                country: location.country.trim().to_string(),
            };
        }
        if let Some(bio) = req.bio {
            self.bio = bio;
        }
        if let Some(links) = req.social_links {
            self.social_links = links;
        }
        if let Some(phone) = req.phone {
            self.phone = phone.trim().to_string();
        }
        if let Some(skills) = req.skills {
            self.skills = super::validation::clean_list(skills);
        }
        if let Some(privacy) = req.privacy_settings {
            self.privacy_settings = privacy;
        }
    }
}

/// Filters for the alumni directory. Only approved alumni are ever returned.
#[derive(Debug, Clone, Default)]
pub struct DirectoryFilter {
    /// Case-insensitive substring over name, company, position and skills.
    pub query: Option<String>,
    pub department: Option<String>,
    pub graduation_year: Option<i32>,
    pub company: Option<String>,
}

/// Filters for the admin view, which also lists unapproved and profile-less alumni.
#[derive(Debug, Clone, Default)]
pub struct AdminAlumniFilter {
    pub search: Option<String>,
    pub is_approved: Option<bool>,
    pub department: Option<String>,
    pub graduation_year: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn privacy_defaults_hide_contact_but_show_location() {
        let p = PrivacySettings::default();
        assert!(!p.show_email);
        assert!(!p.show_phone);
        assert!(p.show_location);
    }

    #[test]
    fn apply_keeps_absent_fields() {
        let mut data = ProfileData::initial(2015, "CS".into());
        data.company = "Acme".into();
        data.apply(UpsertProfileRequest {
            position: Some("  Engineer ".into()),
            skills: Some(vec!["rust".into(), " ".into()]),
            ..Default::default()
        });
        assert_eq!(data.company, "Acme");
        assert_eq!(data.position, "Engineer");
        assert_eq!(data.skills, vec!["rust".to_string()]);
        assert_eq!(data.department, "CS");
    }

    #[test]
    fn location_display_skips_blank_parts() {
        let loc = Location {
            city: "Pune".into(),
            state: String::new(),
            country: "India".into(),
        };
        assert_eq!(loc.display(), "Pune, India");
    }

    #[test]
    fn partial_location_payload_fills_defaults() {
        let loc: Location = serde_json::from_str(r#"{"city":"Oslo"}"#).unwrap();
        assert_eq!(loc.city, "Oslo");
        assert_eq!(loc.country, "");
    }
}
