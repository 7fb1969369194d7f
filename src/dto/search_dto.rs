use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use validator::Validate;

use crate::error::Result;
use crate::models::search::{
    validate_radius, BudgetRange, SearchRequest, SortDirection, StatusFilter, DEFAULT_RADIUS_KM,
};
use crate::utils::pagination::validate_page;
use crate::utils::validation::non_blank;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetRangePayload {
    pub min: Decimal,
    pub max: Decimal,
}

/// Raw search body. `page` stays untyped so that malformed values are
/// reported as an invalid page rather than a generic body error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SearchJobsPayload {
    #[validate(length(max = 200), custom(function = "non_blank"))]
    pub title: Option<String>,
    #[validate(length(max = 100), custom(function = "non_blank"))]
    pub category: Option<String>,
    #[validate(length(max = 500), custom(function = "non_blank"))]
    pub address: Option<String>,
    /// Kilometers.
    pub radius: Option<f64>,
    pub budget_range: Option<BudgetRangePayload>,
    pub page: Option<JsonValue>,
    pub sort: Option<String>,
    pub status: Option<String>,
}

impl SearchJobsPayload {
    pub fn into_request(self) -> Result<SearchRequest> {
        let page = validate_page(self.page.as_ref())?;
        let status = match self.status.as_deref() {
            Some(raw) => raw.parse::<StatusFilter>()?,
            None => StatusFilter::default(),
        };
        let sort = self
            .sort
            .as_deref()
            .map(str::parse::<SortDirection>)
            .transpose()?;
        let radius_km = validate_radius(self.radius.unwrap_or(DEFAULT_RADIUS_KM))?;
        let budget = self
            .budget_range
            .map(|range| BudgetRange::new(range.min, range.max))
            .transpose()?;

        Ok(SearchRequest {
            title: self.title,
            category: self.category,
            address: self.address,
            radius_km,
            budget,
            page,
            sort,
            status,
        })
    }
}
