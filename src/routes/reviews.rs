use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{dto::review_dto::CreateReviewPayload, error::Result, models::user::UserProfile, AppState};

#[utoipa::path(
    post,
    path = "/api/reviews",
    request_body = CreateReviewPayload,
    responses(
        (status = 201, description = "Review recorded", body = Review),
        (status = 403, description = "Not the job's creator"),
        (status = 409, description = "Job not finished or already reviewed")
    )
)]
#[axum::debug_handler]
pub async fn create_review(
    State(state): State<AppState>,
    Extension(author): Extension<UserProfile>,
    Json(payload): Json<CreateReviewPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let review = state.review_service.add_review(&author, payload).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

#[utoipa::path(
    get,
    path = "/api/reviews/me",
    responses(
        (status = 200, description = "Reviews received by the caller", body = Vec<Review>)
    )
)]
#[axum::debug_handler]
pub async fn my_reviews(
    State(state): State<AppState>,
    Extension(user): Extension<UserProfile>,
) -> Result<impl IntoResponse> {
    let reviews = state.review_service.list_for_user(&user.username).await?;
    Ok(Json(reviews))
}
