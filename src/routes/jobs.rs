use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        job_dto::{CreateJobPayload, JobListQuery, JobListResponse, UpdateJobPayload},
        search_dto::SearchJobsPayload,
    },
    error::Result,
    models::user::UserProfile,
    utils::pagination::parse_page_str,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/jobs/search",
    request_body = SearchJobsPayload,
    responses(
        (status = 200, description = "Jobs near the search origin", body = SearchResultPage),
        (status = 400, description = "Invalid page, radius, budget, status, sort or unresolvable address")
    )
)]
#[axum::debug_handler]
pub async fn search_jobs(
    State(state): State<AppState>,
    Extension(requester): Extension<UserProfile>,
    Json(payload): Json<SearchJobsPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let request = payload.into_request()?;
    let page = state.search_service.search(request, &requester).await?;
    Ok(Json(page))
}

#[utoipa::path(
    post,
    path = "/api/jobs",
    request_body = CreateJobPayload,
    responses(
        (status = 201, description = "Job created", body = JobPosting),
        (status = 400, description = "Invalid payload or unresolvable address"),
        (status = 403, description = "Only employers may create jobs")
    )
)]
#[axum::debug_handler]
pub async fn create_job(
    State(state): State<AppState>,
    Extension(creator): Extension<UserProfile>,
    Json(payload): Json<CreateJobPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let job = state.job_service.create(&creator, payload).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

#[utoipa::path(
    get,
    path = "/api/jobs",
    params(
        ("page" = Option<String>, Query, description = "Page number, 10 jobs per page")
    ),
    responses(
        (status = 200, description = "Open jobs, newest first", body = JobListResponse),
        (status = 400, description = "Invalid page")
    )
)]
#[axum::debug_handler]
pub async fn list_open_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> Result<impl IntoResponse> {
    let page = match query.page.as_deref() {
        Some(raw) => parse_page_str(raw)?,
        None => 1,
    };
    let result = state.job_service.list_open(page).await?;
    Ok(Json(JobListResponse::from(result)))
}

#[utoipa::path(
    get,
    path = "/api/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job details", body = JobPosting),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let job = state.job_service.get(id).await?;
    Ok(Json(job))
}

#[utoipa::path(
    patch,
    path = "/api/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    request_body = UpdateJobPayload,
    responses(
        (status = 200, description = "Job updated", body = JobPosting),
        (status = 403, description = "Not the job's creator"),
        (status = 409, description = "Job is no longer open")
    )
)]
#[axum::debug_handler]
pub async fn update_job(
    State(state): State<AppState>,
    Extension(actor): Extension<UserProfile>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateJobPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let job = state.job_service.edit(id, &actor, payload).await?;
    Ok(Json(job))
}

#[utoipa::path(
    post,
    path = "/api/jobs/{id}/apply",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Applied; job is now in process", body = JobPosting),
        (status = 403, description = "Only job seekers may apply"),
        (status = 409, description = "Job is not open")
    )
)]
#[axum::debug_handler]
pub async fn apply_job(
    State(state): State<AppState>,
    Extension(applicant): Extension<UserProfile>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let job = state.job_service.apply(id, &applicant).await?;
    Ok(Json(job))
}

#[utoipa::path(
    post,
    path = "/api/jobs/{id}/finish",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job finished", body = JobPosting),
        (status = 403, description = "Not the job's creator"),
        (status = 409, description = "Job is not in process")
    )
)]
#[axum::debug_handler]
pub async fn finish_job(
    State(state): State<AppState>,
    Extension(actor): Extension<UserProfile>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let job = state.job_service.finish(id, &actor).await?;
    Ok(Json(job))
}
