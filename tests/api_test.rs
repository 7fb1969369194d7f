use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use geojob_backend::{
    database::{memory::MemoryStore, UserStore},
    middleware::auth::issue_token,
    models::{
        location::Coordinate,
        user::{Rating, Role, UserProfile},
    },
    routes,
    services::geocoding_service::{Geocoder, Unresolvable},
    AppState,
};
use serde_json::{json, Value as JsonValue};
use tokio_test::assert_ok;
use tower::ServiceExt;

const SECRET: &str = "test_secret_key";

/// Resolves only the addresses it was seeded with.
struct FixedGeocoder {
    known: HashMap<String, Coordinate>,
}

#[async_trait]
impl Geocoder for FixedGeocoder {
    async fn resolve(&self, address: &str) -> Result<Coordinate, Unresolvable> {
        self.known.get(address).copied().ok_or(Unresolvable)
    }
}

fn profile(username: &str, role: Role, location: Option<Coordinate>) -> UserProfile {
    UserProfile {
        username: username.to_string(),
        full_name: username.to_string(),
        email: format!("{}@example.com", username),
        role,
        address: None,
        location,
        rating: Rating::default(),
        created_at: Utc::now(),
    }
}

async fn app() -> Router {
    let store = MemoryStore::new();
    let home = Coordinate::new(106.82, -6.21).unwrap();
    for user in [
        profile("budi", Role::Employer, None),
        profile("sari", Role::JobSeeker, Some(home)),
        profile("dewi", Role::JobSeeker, Some(home)),
    ] {
        store.insert_user(&user).await.unwrap();
    }

    let mut known = HashMap::new();
    known.insert(
        "Jl. Sudirman, Jakarta".to_string(),
        Coordinate::new(106.8, -6.2).unwrap(),
    );
    let geocoder = FixedGeocoder { known };

    let state = AppState::new(Arc::new(store), Arc::new(geocoder), SECRET);
    routes::router(state)
}

fn token(username: &str) -> String {
    let token = issue_token(username, SECRET, chrono::Duration::minutes(10));
    assert_ok!(&token);
    token.unwrap()
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    user: Option<&str>,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        req = req.header("authorization", format!("Bearer {}", token(user)));
    }
    let req = match body {
        Some(body) => req
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn job_body() -> JsonValue {
    json!({
        "title": "Fix the fence",
        "description": "Two panels are loose",
        "category": "handyman",
        "budget": 150,
        "address": "Jl. Sudirman, Jakarta"
    })
}

#[tokio::test]
async fn health_is_public() {
    let app = app().await;
    let (status, body) = call(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn api_requires_a_valid_bearer_token() {
    let app = app().await;
    let (status, body) = call(&app, "POST", "/api/jobs/search", None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");

    let (status, _) = call(&app, "GET", "/api/users", Some("ghost"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn posted_job_is_found_by_a_nearby_search() {
    let app = app().await;
    let (status, created) = call(&app, "POST", "/api/jobs", Some("budi"), Some(job_body())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "Open");

    let (status, page) = call(
        &app,
        "POST",
        "/api/jobs/search",
        Some("sari"),
        Some(json!({"radius": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["page"], 1);
    assert_eq!(page["page_size"], 10);
    assert_eq!(page["jobs"][0]["id"], created["id"]);
    assert_eq!(page["jobs"][0]["distance"], 2.47);

    let (_, narrow) = call(
        &app,
        "POST",
        "/api/jobs/search",
        Some("sari"),
        Some(json!({"radius": 2})),
    )
    .await;
    assert_eq!(narrow["total"], 0);
}

#[tokio::test]
async fn malformed_search_input_is_rejected_with_its_code() {
    let app = app().await;
    let cases = [
        (json!({"page": "abc"}), "invalid_page"),
        (json!({"page": 0}), "invalid_page"),
        (json!({"radius": -5}), "invalid_radius_or_budget"),
        (json!({"budget_range": {"min": 200, "max": 100}}), "invalid_radius_or_budget"),
        (json!({"status": "closed"}), "bad_request"),
        (json!({"address": "Atlantis"}), "address_unresolvable"),
    ];
    for (body, code) in cases {
        let (status, resp) = call(&app, "POST", "/api/jobs/search", Some("sari"), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", code);
        assert_eq!(resp["code"], code);
    }

    let (status, resp) = call(&app, "POST", "/api/jobs/search", Some("budi"), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["code"], "no_location_available");
}

#[tokio::test]
async fn unresolvable_job_address_persists_nothing() {
    let app = app().await;
    let mut body = job_body();
    body["address"] = json!("Nowhere street");
    let (status, resp) = call(&app, "POST", "/api/jobs", Some("budi"), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["code"], "address_unresolvable");

    let (status, list) = call(&app, "GET", "/api/jobs", Some("sari"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], 0);
}

#[tokio::test]
async fn job_lifecycle_from_apply_to_review() {
    let app = app().await;
    let (_, created) = call(&app, "POST", "/api/jobs", Some("budi"), Some(job_body())).await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, resp) = call(&app, "POST", &format!("/api/jobs/{}/apply", id), Some("budi"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(resp["code"], "role_not_allowed");

    let (status, applied) = call(&app, "POST", &format!("/api/jobs/{}/apply", id), Some("sari"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(applied["status"], "Process");
    assert_eq!(applied["assignee"], "sari");

    let (status, resp) = call(&app, "POST", &format!("/api/jobs/{}/apply", id), Some("dewi"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(resp["code"], "not_open");

    let (status, resp) = call(
        &app,
        "PATCH",
        &format!("/api/jobs/{}", id),
        Some("budi"),
        Some(json!({"title": "Too late"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(resp["code"], "job_locked");

    let review = json!({"job_id": id, "rating": 5, "comment": "Great work"});
    let (status, resp) = call(&app, "POST", "/api/reviews", Some("budi"), Some(review.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(resp["code"], "not_finished");

    let (status, finished) = call(&app, "POST", &format!("/api/jobs/{}/finish", id), Some("budi"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(finished["status"], "Finish");

    let (status, _) = call(&app, "POST", "/api/reviews", Some("budi"), Some(review.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, resp) = call(&app, "POST", "/api/reviews", Some("budi"), Some(review)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(resp["code"], "review_exists");

    let (_, sari) = call(&app, "GET", "/api/users/sari", Some("budi"), None).await;
    assert_eq!(sari["rating"], 5.0);
    assert_eq!(sari["rating_count"], 1);

    let (_, mine) = call(&app, "GET", "/api/reviews/me", Some("sari"), None).await;
    assert_eq!(mine.as_array().map(Vec::len), Some(1));

    let (_, by_budi) = call(&app, "GET", "/api/users/budi/jobs", Some("sari"), None).await;
    assert_eq!(by_budi.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn address_update_moves_the_default_search_origin() {
    let app = app().await;
    call(&app, "POST", "/api/jobs", Some("budi"), Some(job_body())).await;

    let (status, profile) = call(
        &app,
        "PATCH",
        "/api/users/me/address",
        Some("budi"),
        Some(json!({"address": "Jl. Sudirman, Jakarta"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["location"]["longitude"], 106.8);

    let (status, page) = call(&app, "POST", "/api/jobs/search", Some("budi"), Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["jobs"][0]["distance"], 0.0);
}
