use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::non_blank;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateReviewPayload {
    pub job_id: Uuid,
    #[validate(range(min = 1, max = 5))]
    pub rating: i16,
    #[validate(length(max = 1000), custom(function = "non_blank"))]
    pub comment: String,
}
