pub mod geocoding_service;
pub mod job_service;
pub mod review_service;
pub mod search_service;
pub mod user_service;
