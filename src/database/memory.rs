use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::database::{JobListFilter, JobStore, ReviewStore, UserStore};
use crate::error::{Error, Result};
use crate::models::job::{JobPatch, JobPosting};
use crate::models::location::Coordinate;
use crate::models::review::Review;
use crate::models::search::SpatialQuery;
use crate::models::user::UserProfile;
use crate::utils::time;

#[derive(Debug, Default)]
struct Tables {
    jobs: HashMap<Uuid, JobPosting>,
    users: HashMap<String, UserProfile>,
    reviews: Vec<Review>,
}

/// Process-local store. Every mutation runs under one write lock, which is
/// what makes the conditional transitions atomic.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| Error::StoreUnavailable("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| Error::StoreUnavailable("memory store lock poisoned".to_string()))
    }

    fn mutate_job<F>(&self, id: Uuid, change: F) -> Result<JobPosting>
    where
        F: FnOnce(&mut JobPosting) -> Result<()>,
    {
        let mut tables = self.write()?;
        let job = tables
            .jobs
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("Job {} not found", id)))?;
        // work on a copy so a failed precondition leaves the stored job untouched
        let mut updated = job.clone();
        change(&mut updated)?;
        *job = updated.clone();
        Ok(updated)
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn insert_job(&self, job: &JobPosting) -> Result<()> {
        let mut tables = self.write()?;
        if tables.jobs.contains_key(&job.id) {
            return Err(Error::BadRequest(format!("Job {} already exists", job.id)));
        }
        tables.jobs.insert(job.id, job.clone());
        Ok(())
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<JobPosting>> {
        Ok(self.read()?.jobs.get(&id).cloned())
    }

    async fn search_jobs(&self, query: &SpatialQuery) -> Result<Vec<JobPosting>> {
        let tables = self.read()?;
        Ok(tables
            .jobs
            .values()
            .filter(|job| query.matches(job))
            .cloned()
            .collect())
    }

    async fn list_jobs(&self, filter: &JobListFilter) -> Result<Vec<JobPosting>> {
        let tables = self.read()?;
        let mut jobs: Vec<JobPosting> = tables
            .jobs
            .values()
            .filter(|job| filter.status.map_or(true, |s| job.status == s))
            .filter(|job| {
                filter
                    .created_by
                    .as_ref()
                    .map_or(true, |creator| &job.created_by == creator)
            })
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(jobs)
    }

    async fn assign_job(&self, id: Uuid, applicant: &UserProfile) -> Result<JobPosting> {
        let at = time::now();
        self.mutate_job(id, |job| job.apply(applicant, at))
    }

    async fn finish_job(&self, id: Uuid, actor: &UserProfile) -> Result<JobPosting> {
        let at = time::now();
        self.mutate_job(id, |job| job.finish(actor, at))
    }

    async fn update_job(
        &self,
        id: Uuid,
        actor: &UserProfile,
        patch: &JobPatch,
    ) -> Result<JobPosting> {
        let at = time::now();
        self.mutate_job(id, |job| job.edit(actor, patch, at))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &UserProfile) -> Result<()> {
        let mut tables = self.write()?;
        if tables.users.contains_key(&user.username) {
            return Err(Error::BadRequest(format!(
                "Username {} already exists",
                user.username
            )));
        }
        tables.users.insert(user.username.clone(), user.clone());
        Ok(())
    }

    async fn get_user(&self, username: &str) -> Result<Option<UserProfile>> {
        Ok(self.read()?.users.get(username).cloned())
    }

    async fn list_users(&self) -> Result<Vec<UserProfile>> {
        let mut users: Vec<UserProfile> = self.read()?.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn update_user_location(
        &self,
        username: &str,
        address: &str,
        location: Coordinate,
    ) -> Result<UserProfile> {
        let mut tables = self.write()?;
        let user = tables
            .users
            .get_mut(username)
            .ok_or_else(|| Error::NotFound(format!("User {} not found", username)))?;
        user.address = Some(address.to_string());
        user.location = Some(location);
        Ok(user.clone())
    }
}

#[async_trait]
impl ReviewStore for MemoryStore {
    async fn record_review(&self, review: &Review) -> Result<()> {
        let mut tables = self.write()?;
        if tables.reviews.iter().any(|r| r.job_id == review.job_id) {
            return Err(Error::ReviewExists);
        }
        let user = tables.users.get_mut(&review.created_for).ok_or_else(|| {
            Error::NotFound(format!("User {} not found", review.created_for))
        })?;
        user.rating.record(review.rating);
        tables.reviews.push(review.clone());
        Ok(())
    }

    async fn list_reviews_for(&self, username: &str) -> Result<Vec<Review>> {
        let tables = self.read()?;
        let mut reviews: Vec<Review> = tables
            .reviews
            .iter()
            .filter(|r| r.created_for == username)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::tests::{open_job, user};
    use crate::models::job::JobStatus;
    use crate::models::user::Role;

    #[tokio::test]
    async fn failed_transition_leaves_job_untouched() {
        let store = MemoryStore::new();
        let job = open_job("budi");
        store.insert_job(&job).await.unwrap();

        let employer = user("andi", Role::Employer);
        let err = store.assign_job(job.id, &employer).await.unwrap_err();
        assert!(matches!(err, Error::RoleNotAllowed(_)));

        let stored = store.get_job(job.id).await.unwrap().unwrap();
        assert_eq!(stored.status, JobStatus::Open);
        assert!(stored.assignee.is_none());
        assert!(stored.updated_at.is_none());
    }

    #[tokio::test]
    async fn transitions_on_unknown_job_are_not_found() {
        let store = MemoryStore::new();
        let err = store
            .assign_job(Uuid::new_v4(), &user("sari", Role::JobSeeker))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn list_jobs_filters_by_creator_newest_first() {
        let store = MemoryStore::new();
        let mut older = open_job("budi");
        older.created_at = older.created_at - chrono::Duration::hours(1);
        let newer = open_job("budi");
        let other = open_job("andi");
        for job in [&older, &newer, &other] {
            store.insert_job(job).await.unwrap();
        }

        let filter = JobListFilter {
            created_by: Some("budi".to_string()),
            ..Default::default()
        };
        let ids: Vec<Uuid> = store
            .list_jobs(&filter)
            .await
            .unwrap()
            .into_iter()
            .map(|j| j.id)
            .collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[tokio::test]
    async fn second_review_for_a_job_is_rejected_without_double_counting() {
        let store = MemoryStore::new();
        store.insert_user(&user("sari", Role::JobSeeker)).await.unwrap();
        let review = Review {
            id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            rating: 4,
            comment: "Good".to_string(),
            created_by: "budi".to_string(),
            created_for: "sari".to_string(),
            created_at: time::now(),
        };
        store.record_review(&review).await.unwrap();
        let again = Review {
            id: Uuid::new_v4(),
            ..review.clone()
        };
        assert!(matches!(store.record_review(&again).await, Err(Error::ReviewExists)));

        let sari = store.get_user("sari").await.unwrap().unwrap();
        assert_eq!(sari.rating.count, 1);
        assert_eq!(sari.rating.total, 4);
    }
}
