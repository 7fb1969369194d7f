pub mod health;
pub mod jobs;
pub mod reviews;
pub mod users;

use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::middleware::{auth::require_bearer_auth, cors::api_cors};
use crate::AppState;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/jobs/search", post(jobs::search_jobs))
        .route("/api/jobs", get(jobs::list_open_jobs).post(jobs::create_job))
        .route("/api/jobs/:id", get(jobs::get_job).patch(jobs::update_job))
        .route("/api/jobs/:id/apply", post(jobs::apply_job))
        .route("/api/jobs/:id/finish", post(jobs::finish_job))
        .route("/api/users", get(users::list_users))
        .route("/api/users/me/address", patch(users::update_my_address))
        .route("/api/users/:username", get(users::get_user))
        .route("/api/users/:username/jobs", get(users::list_user_jobs))
        .route("/api/reviews", post(reviews::create_review))
        .route("/api/reviews/me", get(reviews::my_reviews))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_bearer_auth,
        ));

    Router::new()
        .route("/health", get(health::health))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .layer(api_cors())
        .with_state(state)
}
