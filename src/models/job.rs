use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::location::Coordinate;
use crate::models::user::UserProfile;

/// Lifecycle of a posting. Only ever moves forward: Open -> Process -> Finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    Open,
    Process,
    Finish,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Open => "Open",
            JobStatus::Process => "Process",
            JobStatus::Finish => "Finish",
        }
    }

    pub fn next(&self) -> Option<JobStatus> {
        match self {
            JobStatus::Open => Some(JobStatus::Process),
            JobStatus::Process => Some(JobStatus::Finish),
            JobStatus::Finish => None,
        }
    }

    pub fn can_transition_to(&self, target: JobStatus) -> bool {
        self.next() == Some(target)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(JobStatus::Open),
            "process" => Ok(JobStatus::Process),
            "finish" => Ok(JobStatus::Finish),
            other => Err(format!("unknown job status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub budget: Decimal,
    pub address: String,
    pub location: Coordinate,
    pub created_by: String,
    pub status: JobStatus,
    pub assignee: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Field changes for an Open job. Address and location travel together:
/// a new address is geocoded before it reaches the store.
#[derive(Debug, Clone, Default)]
pub struct JobPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub budget: Option<Decimal>,
    pub relocation: Option<(String, Coordinate)>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<DateTime<Utc>>,
}

impl JobPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.budget.is_none()
            && self.relocation.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }
}

impl JobPosting {
    pub fn check_apply(&self, actor: &UserProfile) -> Result<()> {
        if !actor.is_job_seeker() {
            return Err(Error::RoleNotAllowed(
                "only job seekers can apply to jobs".to_string(),
            ));
        }
        if self.status != JobStatus::Open {
            return Err(Error::NotOpen);
        }
        if self.assignee.is_some() {
            return Err(Error::AlreadyAssigned);
        }
        Ok(())
    }

    pub fn apply(&mut self, actor: &UserProfile, at: DateTime<Utc>) -> Result<()> {
        self.check_apply(actor)?;
        self.status = JobStatus::Process;
        self.assignee = Some(actor.username.clone());
        self.updated_at = Some(at);
        Ok(())
    }

    pub fn check_finish(&self, actor: &UserProfile) -> Result<()> {
        if self.created_by != actor.username {
            return Err(Error::NotJobOwner);
        }
        if !self.status.can_transition_to(JobStatus::Finish) {
            return Err(Error::NotInProcess);
        }
        Ok(())
    }

    pub fn finish(&mut self, actor: &UserProfile, at: DateTime<Utc>) -> Result<()> {
        self.check_finish(actor)?;
        self.status = JobStatus::Finish;
        self.updated_at = Some(at);
        Ok(())
    }

    pub fn check_editable(&self, actor: &UserProfile) -> Result<()> {
        if self.created_by != actor.username {
            return Err(Error::NotJobOwner);
        }
        if self.status != JobStatus::Open {
            return Err(Error::JobLocked);
        }
        Ok(())
    }

    pub fn edit(&mut self, actor: &UserProfile, patch: &JobPatch, at: DateTime<Utc>) -> Result<()> {
        self.check_editable(actor)?;
        let end_date = patch.end_date.or(self.end_date);
        let start_date = patch.start_date.or(self.start_date);
        check_schedule(self.created_at, start_date, end_date)?;

        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(category) = &patch.category {
            self.category = category.clone();
        }
        if let Some(budget) = patch.budget {
            self.budget = budget;
        }
        if let Some((address, location)) = &patch.relocation {
            self.address = address.clone();
            self.location = *location;
        }
        self.start_date = start_date;
        self.end_date = end_date;
        self.updated_at = Some(at);
        Ok(())
    }

    /// Who a review of this job is credited to, if `actor` may write one.
    pub fn check_reviewable(&self, actor: &UserProfile) -> Result<&str> {
        if self.created_by != actor.username {
            return Err(Error::NotJobOwner);
        }
        if self.status != JobStatus::Finish {
            return Err(Error::NotFinished);
        }
        self.assignee
            .as_deref()
            .ok_or_else(|| Error::Internal(format!("finished job {} has no assignee", self.id)))
    }
}

/// End date may not precede creation, nor the start date when both are set.
pub fn check_schedule(
    created_at: DateTime<Utc>,
    start_date: Option<NaiveDate>,
    end_date: Option<DateTime<Utc>>,
) -> Result<()> {
    if let Some(end) = end_date {
        if end < created_at {
            return Err(Error::BadRequest(
                "end_date must not be before the job's creation time".to_string(),
            ));
        }
        if let Some(start) = start_date {
            if end.date_naive() < start {
                return Err(Error::BadRequest(
                    "end_date must not be before start_date".to_string(),
                ));
            }
        }
    }
    Ok(())
}
