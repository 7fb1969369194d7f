pub mod job_dto;
pub mod review_dto;
pub mod search_dto;
pub mod user_dto;
