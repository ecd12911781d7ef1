use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::{
    domain::{Role, User, UserFilter},
    error::Result,
    repository::{EventRepository, JobRepository, UserRepository},
};

const RECENT_REGISTRATIONS: i64 = 5;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_alumni: i64,
    pub approved_alumni: i64,
    pub pending_alumni: i64,
    pub total_students: i64,
    pub active_users: i64,
    pub total_events: i64,
    pub upcoming_events: i64,
    /// Active job postings only.
    pub total_jobs: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub statistics: Statistics,
    pub recent_registrations: Vec<User>,
}

pub struct DashboardService {
    users: Arc<dyn UserRepository>,
    events: Arc<dyn EventRepository>,
    jobs: Arc<dyn JobRepository>,
}

impl DashboardService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        events: Arc<dyn EventRepository>,
        jobs: Arc<dyn JobRepository>,
    ) -> Self {
        Self { users, events, jobs }
    }

    pub async fn stats(&self) -> Result<Dashboard> {
        let alumni = |is_approved| UserFilter {
            role: Some(Role::Alumni),
            is_approved,
            ..Default::default()
        };

        let statistics = Statistics {
            total_alumni: self.users.count(&alumni(None)).await?,
            approved_alumni: self.users.count(&alumni(Some(true))).await?,
            pending_alumni: self.users.count(&alumni(Some(false))).await?,
            total_students: self
                .users
                .count(&UserFilter {
                    role: Some(Role::Student),
                    ..Default::default()
                })
                .await?,
            active_users: self
                .users
                .count(&UserFilter {
                    is_active: Some(true),
                    ..Default::default()
                })
                .await?,
            total_events: self.events.count(None).await?,
            upcoming_events: self.events.count(Some(Utc::now())).await?,
            total_jobs: self.jobs.count_active().await?,
        };

        let recent_registrations = self.users.list_recent(RECENT_REGISTRATIONS).await?;

        Ok(Dashboard {
            statistics,
            recent_registrations,
        })
    }
}
