use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::user_dto::{UpdateAddressPayload, UserProfileResponse},
    error::Result,
    models::user::UserProfile,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All user profiles", body = Vec<UserProfileResponse>)
    )
)]
#[axum::debug_handler]
pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let users = state.user_service.list().await?;
    let body: Vec<UserProfileResponse> = users.into_iter().map(UserProfileResponse::from).collect();
    Ok(Json(body))
}

#[utoipa::path(
    get,
    path = "/api/users/{username}",
    params(
        ("username" = String, Path, description = "Username")
    ),
    responses(
        (status = 200, description = "User profile", body = UserProfileResponse),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.get_profile(&username).await?;
    Ok(Json(UserProfileResponse::from(user)))
}

#[utoipa::path(
    get,
    path = "/api/users/{username}/jobs",
    params(
        ("username" = String, Path, description = "Username of the job creator")
    ),
    responses(
        (status = 200, description = "Jobs created by the user, newest first", body = Vec<JobPosting>),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn list_user_jobs(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse> {
    let jobs = state.job_service.list_by_creator(&username).await?;
    Ok(Json(jobs))
}

#[utoipa::path(
    patch,
    path = "/api/users/me/address",
    request_body = UpdateAddressPayload,
    responses(
        (status = 200, description = "Address and location updated", body = UserProfileResponse),
        (status = 400, description = "Address could not be resolved")
    )
)]
#[axum::debug_handler]
pub async fn update_my_address(
    State(state): State<AppState>,
    Extension(user): Extension<UserProfile>,
    Json(payload): Json<UpdateAddressPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let updated = state.user_service.update_address(&user, payload.address).await?;
    Ok(Json(UserProfileResponse::from(updated)))
}
