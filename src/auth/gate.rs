//! Route access checks. The role gate always runs before the approval gate so
//! that an unapproved alumni hitting an admin route is told about the role.

use crate::{
    domain::{Role, User},
    error::{AppError, Result},
};

/// Roles permitted on a route group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessPolicy {
    pub roles: &'static [Role],
}

impl AccessPolicy {
    pub const ADMIN: AccessPolicy = AccessPolicy { roles: &[Role::Admin] };
    pub const ALUMNI: AccessPolicy = AccessPolicy { roles: &[Role::Alumni] };
    pub const STUDENT: AccessPolicy = AccessPolicy { roles: &[Role::Student] };
    pub const ANY_ROLE: AccessPolicy = AccessPolicy {
        roles: &[Role::Admin, Role::Alumni, Role::Student],
    };
}

pub fn authorize(role: Role, permitted: &[Role]) -> Result<()> {
    if permitted.contains(&role) {
        return Ok(());
    }
    let required = permitted
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(" or ");
    Err(AppError::Forbidden(format!(
        "Access denied. Required role: {}",
        required
    )))
}

/// Only alumni are subject to approval.
pub fn require_approval(user: &User) -> Result<()> {
    if user.role == Role::Alumni && !user.is_approved {
        return Err(AppError::PendingApproval);
    }
    Ok(())
}

pub fn check_access(user: &User, policy: AccessPolicy) -> Result<()> {
    authorize(user.role, policy.roles)?;
    require_approval(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn user(role: Role, is_approved: bool) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Test".into(),
            email: "test@example.com".into(),
            role,
            is_approved,
            is_active: true,
            profile_photo: String::new(),
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn non_alumni_pass_approval_regardless_of_flag() {
        for role in [Role::Admin, Role::Student] {
            for approved in [true, false] {
                assert!(require_approval(&user(role, approved)).is_ok());
            }
        }
    }

    #[test]
    fn unapproved_alumni_is_pending() {
        assert!(matches!(
            require_approval(&user(Role::Alumni, false)),
            Err(AppError::PendingApproval)
        ));
        assert!(require_approval(&user(Role::Alumni, true)).is_ok());
    }

    #[test]
    fn role_mismatch_names_required_role() {
        match authorize(Role::Student, AccessPolicy::ADMIN.roles) {
            Err(AppError::Forbidden(msg)) => assert_eq!(msg, "Access denied. Required role: admin"),
            other => panic!("expected Forbidden, got {:?}", other),
        }
    }

    #[test]
    fn role_is_reported_before_approval() {
        let pending = user(Role::Alumni, false);
        assert!(matches!(
            check_access(&pending, AccessPolicy::ADMIN),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            check_access(&pending, AccessPolicy::ALUMNI),
            Err(AppError::PendingApproval)
        ));
        assert!(check_access(&user(Role::Student, false), AccessPolicy::ANY_ROLE).is_ok());
    }
}
