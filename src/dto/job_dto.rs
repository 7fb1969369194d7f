use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::job::JobPosting;
use crate::utils::pagination::Page;
use crate::utils::validation::non_blank;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateJobPayload {
    #[validate(length(max = 200), custom(function = "non_blank"))]
    pub title: String,
    #[validate(length(max = 5000), custom(function = "non_blank"))]
    pub description: String,
    #[validate(length(max = 100), custom(function = "non_blank"))]
    pub category: String,
    pub budget: Decimal,
    #[validate(length(max = 500), custom(function = "non_blank"))]
    pub address: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateJobPayload {
    #[validate(length(max = 200), custom(function = "non_blank"))]
    pub title: Option<String>,
    #[validate(length(max = 5000), custom(function = "non_blank"))]
    pub description: Option<String>,
    #[validate(length(max = 100), custom(function = "non_blank"))]
    pub category: Option<String>,
    pub budget: Option<Decimal>,
    #[validate(length(max = 500), custom(function = "non_blank"))]
    pub address: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobListQuery {
    pub page: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<JobPosting>,
    pub total: usize,
    pub page: u32,
    pub per_page: usize,
    pub total_pages: usize,
}

impl From<Page<JobPosting>> for JobListResponse {
    fn from(page: Page<JobPosting>) -> Self {
        Self {
            jobs: page.items,
            total: page.total,
            page: page.page,
            per_page: page.per_page,
            total_pages: page.total_pages,
        }
    }
}
