use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::database::{JobListFilter, Store};
use crate::dto::job_dto::{CreateJobPayload, UpdateJobPayload};
use crate::error::{Error, Result};
use crate::models::job::{check_schedule, JobPatch, JobPosting, JobStatus};
use crate::models::search::PAGE_SIZE;
use crate::models::user::UserProfile;
use crate::services::geocoding_service::{resolve_address, Geocoder};
use crate::utils::pagination::{paginate, Page};
use crate::utils::time;
use crate::utils::validation::positive_budget;

#[derive(Clone)]
pub struct JobService {
    store: Arc<dyn Store>,
    geocoder: Arc<dyn Geocoder>,
}

fn check_start_date(start_date: Option<chrono::NaiveDate>) -> Result<()> {
    if let Some(start) = start_date {
        if start < time::today() {
            return Err(Error::BadRequest(
                "start_date must not be in the past".to_string(),
            ));
        }
    }
    Ok(())
}

impl JobService {
    pub fn new(store: Arc<dyn Store>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self { store, geocoder }
    }

    #[instrument(skip(self, creator, payload), fields(creator = %creator.username))]
    pub async fn create(&self, creator: &UserProfile, payload: CreateJobPayload) -> Result<JobPosting> {
        if !creator.is_employer() {
            return Err(Error::RoleNotAllowed(
                "only employers can create jobs".to_string(),
            ));
        }
        let budget = positive_budget(payload.budget)?;
        let created_at = time::now();
        check_start_date(payload.start_date)?;
        check_schedule(created_at, payload.start_date, payload.end_date)?;

        let location = resolve_address(self.geocoder.as_ref(), &payload.address).await?;

        let job = JobPosting {
            id: Uuid::new_v4(),
            title: payload.title,
            description: payload.description,
            category: payload.category,
            budget,
            address: payload.address,
            location,
            created_by: creator.username.clone(),
            status: JobStatus::Open,
            assignee: None,
            start_date: payload.start_date,
            end_date: payload.end_date,
            created_at,
            updated_at: None,
        };
        self.store.insert_job(&job).await?;

        info!(job_id = %job.id, "Job created");
        Ok(job)
    }

    #[instrument(skip(self, applicant), fields(applicant = %applicant.username))]
    pub async fn apply(&self, id: Uuid, applicant: &UserProfile) -> Result<JobPosting> {
        let job = self.store.assign_job(id, applicant).await?;
        info!(job_id = %job.id, "Application accepted, job in process");
        Ok(job)
    }

    #[instrument(skip(self, actor), fields(actor = %actor.username))]
    pub async fn finish(&self, id: Uuid, actor: &UserProfile) -> Result<JobPosting> {
        let job = self.store.finish_job(id, actor).await?;
        info!(job_id = %job.id, "Job finished");
        Ok(job)
    }

    #[instrument(skip(self, actor, payload), fields(actor = %actor.username))]
    pub async fn edit(&self, id: Uuid, actor: &UserProfile, payload: UpdateJobPayload) -> Result<JobPosting> {
        // fail fast before spending a geocoder call; the store re-checks atomically
        let current = self.get(id).await?;
        current.check_editable(actor)?;

        let budget = payload.budget.map(positive_budget).transpose()?;
        check_start_date(payload.start_date)?;

        let relocation = match payload.address {
            Some(address) => {
                let location = resolve_address(self.geocoder.as_ref(), &address).await?;
                Some((address, location))
            }
            None => None,
        };

        let patch = JobPatch {
            title: payload.title,
            description: payload.description,
            category: payload.category,
            budget,
            relocation,
            start_date: payload.start_date,
            end_date: payload.end_date,
        };
        if patch.is_empty() {
            return Err(Error::BadRequest("No fields to update".to_string()));
        }

        let job = self.store.update_job(id, actor, &patch).await?;
        info!(job_id = %job.id, "Job updated");
        Ok(job)
    }

    pub async fn get(&self, id: Uuid) -> Result<JobPosting> {
        self.store
            .get_job(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Job {} not found", id)))
    }

    /// Open jobs, newest first.
    pub async fn list_open(&self, page: u32) -> Result<Page<JobPosting>> {
        if page == 0 {
            return Err(Error::InvalidPage(
                "\"page\" must be greater than or equal to 1, got 0".to_string(),
            ));
        }
        let filter = JobListFilter {
            status: Some(JobStatus::Open),
            ..Default::default()
        };
        let jobs = self.store.list_jobs(&filter).await?;
        Ok(paginate(jobs, page, PAGE_SIZE))
    }

    pub async fn list_by_creator(&self, username: &str) -> Result<Vec<JobPosting>> {
        if self.store.get_user(username).await?.is_none() {
            return Err(Error::NotFound(format!("User {} not found", username)));
        }
        let filter = JobListFilter {
            created_by: Some(username.to_string()),
            ..Default::default()
        };
        self.store.list_jobs(&filter).await
    }
}
