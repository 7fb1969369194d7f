pub mod geo;
pub mod pagination;
pub mod time;
pub mod validation;
