use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A creator's review of a finished job, credited to its assignee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub job_id: Uuid,
    pub rating: i16,
    pub comment: String,
    pub created_by: String,
    pub created_for: String,
    pub created_at: DateTime<Utc>,
}
