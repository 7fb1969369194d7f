pub mod memory;
pub mod pool;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::job::{JobPatch, JobPosting, JobStatus};
use crate::models::location::Coordinate;
use crate::models::review::Review;
use crate::models::search::SpatialQuery;
use crate::models::user::UserProfile;

/// Non-spatial job listing filters.
#[derive(Debug, Clone, Default)]
pub struct JobListFilter {
    pub status: Option<JobStatus>,
    pub created_by: Option<String>,
}

/// Job persistence. Transition methods are single atomic conditional writes:
/// they either apply the change with its precondition still holding, or
/// change nothing and report why.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn insert_job(&self, job: &JobPosting) -> Result<()>;

    async fn get_job(&self, id: Uuid) -> Result<Option<JobPosting>>;

    /// Jobs inside the query radius that pass its attribute filters.
    async fn search_jobs(&self, query: &SpatialQuery) -> Result<Vec<JobPosting>>;

    /// Newest first.
    async fn list_jobs(&self, filter: &JobListFilter) -> Result<Vec<JobPosting>>;

    /// Open -> Process, setting the assignee.
    async fn assign_job(&self, id: Uuid, applicant: &UserProfile) -> Result<JobPosting>;

    /// Process -> Finish.
    async fn finish_job(&self, id: Uuid, actor: &UserProfile) -> Result<JobPosting>;

    async fn update_job(&self, id: Uuid, actor: &UserProfile, patch: &JobPatch)
        -> Result<JobPosting>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: &UserProfile) -> Result<()>;

    async fn get_user(&self, username: &str) -> Result<Option<UserProfile>>;

    async fn list_users(&self) -> Result<Vec<UserProfile>>;

    async fn update_user_location(
        &self,
        username: &str,
        address: &str,
        location: Coordinate,
    ) -> Result<UserProfile>;
}

#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Stores the review and credits its rating to `review.created_for` in
    /// one atomic step. Fails with `ReviewExists` if the job already has one.
    async fn record_review(&self, review: &Review) -> Result<()>;

    async fn list_reviews_for(&self, username: &str) -> Result<Vec<Review>>;
}

/// Everything the services need from persistence.
pub trait Store: JobStore + UserStore + ReviewStore {}

impl<T: JobStore + UserStore + ReviewStore> Store for T {}
