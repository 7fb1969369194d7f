pub mod job;
pub mod location;
pub mod review;
pub mod search;
pub mod user;
