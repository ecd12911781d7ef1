//! Viewer-dependent projection of alumni profiles.
//!
//! Owners and admins see everything. Every other viewer gets each profile
//! redacted by that profile's own privacy flags:
//!
//! | field      | student viewer                 | alumni viewer                  |
//! |------------|--------------------------------|--------------------------------|
//! | `email`    | `"Hidden"` unless `showEmail`  | `"Hidden"` unless `showEmail`  |
//! | `phone`    | omitted                        | omitted unless `showPhone`     |
//! | `location` | `{}` unless `showLocation`     | `{}` unless `showLocation`     |

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{DirectoryEntry, Location, PrivacySettings, Role, SocialLinks, User};

pub const HIDDEN: &str = "Hidden";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Full,
    Alumni,
    Student,
}

impl Visibility {
    pub fn for_viewer(viewer: &User, owner_id: Uuid) -> Self {
        if viewer.id == owner_id {
            return Visibility::Full;
        }
        match viewer.role {
            Role::Admin => Visibility::Full,
            Role::Alumni => Visibility::Alumni,
            Role::Student => Visibility::Student,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Redacted {}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum LocationView {
    Visible(Location),
    Hidden(Redacted),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OwnerView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub profile_photo: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub id: Uuid,
    pub user: OwnerView,
    pub graduation_year: i32,
    pub department: String,
    pub degree: String,
    pub company: String,
    pub position: String,
    pub location: LocationView,
    pub bio: String,
    pub social_links: SocialLinks,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub skills: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy_settings: Option<PrivacySettings>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn project(entry: DirectoryEntry, viewer: &User) -> ProfileView {
    let visibility = Visibility::for_viewer(viewer, entry.user.id);
    project_as(entry, visibility)
}

pub fn project_as(entry: DirectoryEntry, visibility: Visibility) -> ProfileView {
    let DirectoryEntry { user, profile } = entry;
    let flags = profile.privacy_settings;
    let full = visibility == Visibility::Full;

    let email = if full || flags.show_email {
        user.email
    } else {
        HIDDEN.to_string()
    };

    let location = if full || flags.show_location {
        LocationView::Visible(profile.location)
    } else {
        LocationView::Hidden(Redacted {})
    };

    let phone = match visibility {
        Visibility::Full => Some(profile.phone),
        Visibility::Alumni if flags.show_phone => Some(profile.phone),
        _ => None,
    };

    ProfileView {
        id: profile.id,
        user: OwnerView {
            id: user.id,
            name: user.name,
            email,
            profile_photo: user.profile_photo,
        },
        graduation_year: profile.graduation_year,
        department: profile.department,
        degree: profile.degree,
        company: profile.company,
        position: profile.position,
        location,
        bio: profile.bio,
        social_links: profile.social_links,
        phone,
        skills: profile.skills,
        privacy_settings: full.then_some(flags),
        created_at: profile.created_at,
        updated_at: profile.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AlumniProfile;
    use serde_json::Value;

    fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Grace".into(),
            email: "grace@example.com".into(),
            role,
            is_approved: true,
            is_active: true,
            profile_photo: String::new(),
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn entry(privacy: PrivacySettings) -> DirectoryEntry {
        let owner = user(Role::Alumni);
        DirectoryEntry {
            profile: AlumniProfile {
                id: Uuid::new_v4(),
                user_id: owner.id,
                graduation_year: 2012,
                department: "Physics".into(),
                degree: "BSc".into(),
                company: "Lab".into(),
                position: "Researcher".into(),
                location: Location {
                    city: "Lyon".into(),
                    state: String::new(),
                    country: "France".into(),
                },
                bio: String::new(),
                social_links: SocialLinks::default(),
                phone: "555-0100".into(),
                skills: vec!["optics".into()],
                privacy_settings: privacy,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            user: owner,
        }
    }

    const ALL_PRIVATE: PrivacySettings = PrivacySettings {
        show_email: false,
        show_phone: false,
        show_location: false,
    };

    const ALL_PUBLIC: PrivacySettings = PrivacySettings {
        show_email: true,
        show_phone: true,
        show_location: true,
    };

    #[test]
    fn student_sees_redacted_private_profile() {
        let view = project(entry(ALL_PRIVATE), &user(Role::Student));
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["user"]["email"], "Hidden");
        assert!(json.get("phone").is_none());
        assert_eq!(json["location"], Value::Object(Default::default()));
        assert!(json.get("privacySettings").is_none());
    }

    #[test]
    fn student_never_sees_phone() {
        let view = project(entry(ALL_PUBLIC), &user(Role::Student));
        assert_eq!(view.phone, None);
        assert_eq!(view.user.email, "grace@example.com");
    }

    #[test]
    fn admin_and_owner_see_everything() {
        let admin_view = project(entry(ALL_PRIVATE), &user(Role::Admin));
        assert_eq!(admin_view.user.email, "grace@example.com");
        assert_eq!(admin_view.phone.as_deref(), Some("555-0100"));
        assert!(matches!(admin_view.location, LocationView::Visible(_)));

        let e = entry(ALL_PRIVATE);
        let owner = e.user.clone();
        let own_view = project(e, &owner);
        assert_eq!(own_view.privacy_settings, Some(ALL_PRIVATE));
        assert_eq!(own_view.phone.as_deref(), Some("555-0100"));
    }

    #[test]
    fn alumni_viewer_respects_phone_flag() {
        let alumni = user(Role::Alumni);
        assert_eq!(project(entry(ALL_PRIVATE), &alumni).phone, None);
        assert_eq!(
            project(entry(ALL_PUBLIC), &alumni).phone.as_deref(),
            Some("555-0100")
        );
    }

    #[test]
    fn flags_apply_per_profile() {
        let student = user(Role::Student);
        let public = project(entry(ALL_PUBLIC), &student);
        let private = project(entry(ALL_PRIVATE), &student);
        assert_ne!(public.user.email, HIDDEN);
        assert_eq!(private.user.email, HIDDEN);
    }
}
