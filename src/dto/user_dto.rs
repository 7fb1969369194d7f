use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::location::Coordinate;
use crate::models::user::{Role, UserProfile};
use crate::utils::validation::non_blank;

#[derive(Debug, Serialize)]
pub struct UserProfileResponse {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub address: Option<String>,
    pub location: Option<Coordinate>,
    pub rating: f64,
    pub rating_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<UserProfile> for UserProfileResponse {
    fn from(user: UserProfile) -> Self {
        Self {
            rating: user.rating.average(),
            rating_count: user.rating.count,
            username: user.username,
            full_name: user.full_name,
            email: user.email,
            role: user.role,
            address: user.address,
            location: user.location,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateAddressPayload {
    #[validate(length(max = 500), custom(function = "non_blank"))]
    pub address: String,
}
