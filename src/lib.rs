pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::database::Store;
use crate::services::{
    geocoding_service::Geocoder, job_service::JobService, review_service::ReviewService,
    search_service::SearchService, user_service::UserService,
};

#[derive(Clone)]
pub struct AppState {
    pub search_service: SearchService,
    pub job_service: JobService,
    pub user_service: UserService,
    pub review_service: ReviewService,
    pub jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, geocoder: Arc<dyn Geocoder>, jwt_secret: &str) -> Self {
        Self {
            search_service: SearchService::new(store.clone(), geocoder.clone()),
            job_service: JobService::new(store.clone(), geocoder.clone()),
            user_service: UserService::new(store.clone(), geocoder),
            review_service: ReviewService::new(store),
            jwt_secret: Arc::from(jwt_secret),
        }
    }
}
