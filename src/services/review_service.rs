use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::database::Store;
use crate::dto::review_dto::CreateReviewPayload;
use crate::error::{Error, Result};
use crate::models::review::Review;
use crate::models::user::UserProfile;
use crate::utils::time;

#[derive(Clone)]
pub struct ReviewService {
    store: Arc<dyn Store>,
}

impl ReviewService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// The creator of a finished job rates its assignee, once per job.
    #[instrument(skip(self, author, payload), fields(author = %author.username, job_id = %payload.job_id))]
    pub async fn add_review(&self, author: &UserProfile, payload: CreateReviewPayload) -> Result<Review> {
        let job = self
            .store
            .get_job(payload.job_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Job {} not found", payload.job_id)))?;
        let assignee = job.check_reviewable(author)?;

        let review = Review {
            id: Uuid::new_v4(),
            job_id: job.id,
            rating: payload.rating,
            comment: payload.comment,
            created_by: author.username.clone(),
            created_for: assignee.to_string(),
            created_at: time::now(),
        };
        self.store.record_review(&review).await?;

        info!(review_id = %review.id, "Review recorded");
        Ok(review)
    }

    pub async fn list_for_user(&self, username: &str) -> Result<Vec<Review>> {
        self.store.list_reviews_for(username).await
    }
}
