use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::database::Store;
use crate::error::{Error, Result};
use crate::models::job::JobPosting;
use crate::models::location::Coordinate;
use crate::models::search::{
    validate_radius, RankedJob, SearchRequest, SearchResultPage, SortDirection, SpatialQuery,
    PAGE_SIZE,
};
use crate::models::user::UserProfile;
use crate::services::geocoding_service::{resolve_address, Geocoder};
use crate::utils::pagination::paginate;

/// Turns a validated request into a store query, resolving the origin.
pub struct QueryBuilder<'a> {
    geocoder: &'a dyn Geocoder,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(geocoder: &'a dyn Geocoder) -> Self {
        Self { geocoder }
    }

    pub async fn build(&self, request: &SearchRequest, requester: &UserProfile) -> Result<SpatialQuery> {
        let radius_km = validate_radius(request.radius_km)?;
        let origin = self.origin(request, requester).await?;

        Ok(SpatialQuery {
            origin,
            radius_m: radius_km * 1000.0,
            category: request.category.clone(),
            budget: request.budget,
            title: request.title.clone(),
            status: request.status,
            sort: request.sort,
        })
    }

    async fn origin(&self, request: &SearchRequest, requester: &UserProfile) -> Result<Coordinate> {
        match &request.address {
            Some(address) => resolve_address(self.geocoder, address).await,
            None => requester.location.ok_or(Error::NoLocationAvailable),
        }
    }
}

/// Attach distances, drop anything outside the radius and order the rest.
///
/// Without an explicit sort the order is nearest first; ties fall back to
/// creation time and then id so that pages stay stable between calls.
pub fn rank(jobs: Vec<JobPosting>, query: &SpatialQuery) -> Vec<RankedJob> {
    let radius_km = query.radius_km();
    let mut ranked: Vec<RankedJob> = jobs
        .into_iter()
        .map(|job| RankedJob::new(job, &query.origin))
        .filter(|r| r.exact_distance_km <= radius_km)
        .collect();

    ranked.sort_by(|a, b| compare(a, b, query.sort));
    ranked
}

fn compare(a: &RankedJob, b: &RankedJob, sort: Option<SortDirection>) -> Ordering {
    let by_id = a.job.id.cmp(&b.job.id);
    match sort {
        None => a
            .exact_distance_km
            .total_cmp(&b.exact_distance_km)
            .then(a.job.created_at.cmp(&b.job.created_at))
            .then(by_id),
        Some(SortDirection::Asc) => a.job.created_at.cmp(&b.job.created_at).then(by_id),
        Some(SortDirection::Desc) => b.job.created_at.cmp(&a.job.created_at).then(by_id),
    }
}

fn ensure_page(page: u32) -> Result<()> {
    if page == 0 {
        return Err(Error::InvalidPage(
            "\"page\" must be greater than or equal to 1, got 0".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct SearchService {
    store: Arc<dyn Store>,
    geocoder: Arc<dyn Geocoder>,
}

impl SearchService {
    pub fn new(store: Arc<dyn Store>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self { store, geocoder }
    }

    #[instrument(skip(self, requester), fields(requester = %requester.username))]
    pub async fn search(
        &self,
        request: SearchRequest,
        requester: &UserProfile,
    ) -> Result<SearchResultPage> {
        ensure_page(request.page)?;
        let query = QueryBuilder::new(self.geocoder.as_ref())
            .build(&request, requester)
            .await?;
        self.execute(&query, request.page).await
    }

    pub async fn execute(&self, query: &SpatialQuery, page: u32) -> Result<SearchResultPage> {
        ensure_page(page)?;
        let jobs = self.store.search_jobs(query).await?;
        let ranked = rank(jobs, query);
        let page = paginate(ranked, page, PAGE_SIZE);

        info!(
            total = page.total,
            page = page.page,
            returned = page.items.len(),
            "Job search executed"
        );

        Ok(SearchResultPage {
            jobs: page.items,
            total: page.total,
            page: page.page,
            page_size: page.per_page,
            total_pages: page.total_pages,
        })
    }
}
