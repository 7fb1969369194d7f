use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::models::job::{JobPosting, JobStatus};
use crate::models::location::Coordinate;
use crate::utils::geo;
use crate::utils::validation::storable_amount;

pub const PAGE_SIZE: usize = 10;
pub const DEFAULT_RADIUS_KM: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Only(JobStatus),
    All,
}

impl Default for StatusFilter {
    fn default() -> Self {
        StatusFilter::Only(JobStatus::Open)
    }
}

impl StatusFilter {
    pub fn admits(&self, status: JobStatus) -> bool {
        match self {
            StatusFilter::Only(wanted) => *wanted == status,
            StatusFilter::All => true,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        s.parse::<JobStatus>()
            .map(StatusFilter::Only)
            .map_err(|_| {
                Error::BadRequest(format!(
                    "invalid status '{}': expected one of open, process, finish, all",
                    s
                ))
            })
    }
}

/// Ordering over creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "oldest" => Ok(SortDirection::Asc),
            "desc" | "newest" => Ok(SortDirection::Desc),
            _ => Err(Error::BadRequest(format!(
                "invalid sort '{}': expected asc or desc",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetRange {
    min: Decimal,
    max: Decimal,
}

impl BudgetRange {
    pub fn new(min: Decimal, max: Decimal) -> Result<Self> {
        if min.is_sign_negative() || max.is_sign_negative() {
            return Err(Error::InvalidRadiusOrBudget(
                "budget bounds must not be negative".to_string(),
            ));
        }
        if min > max {
            return Err(Error::InvalidRadiusOrBudget(format!(
                "budget min {} is greater than max {}",
                min, max
            )));
        }
        Ok(Self {
            min: storable_amount(min)?,
            max: storable_amount(max)?,
        })
    }

    pub fn min(&self) -> Decimal {
        self.min
    }

    pub fn max(&self) -> Decimal {
        self.max
    }

    pub fn contains(&self, budget: Decimal) -> bool {
        budget >= self.min && budget <= self.max
    }
}

/// A validated search, built at the HTTP boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub title: Option<String>,
    pub category: Option<String>,
    pub address: Option<String>,
    pub radius_km: f64,
    pub budget: Option<BudgetRange>,
    pub page: u32,
    pub sort: Option<SortDirection>,
    pub status: StatusFilter,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            title: None,
            category: None,
            address: None,
            radius_km: DEFAULT_RADIUS_KM,
            budget: None,
            page: 1,
            sort: None,
            status: StatusFilter::default(),
        }
    }
}

pub fn validate_radius(radius_km: f64) -> Result<f64> {
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Err(Error::InvalidRadiusOrBudget(format!(
            "radius must be a positive number of kilometers, got {}",
            radius_km
        )));
    }
    Ok(radius_km)
}

/// Spatial predicate plus attribute filters, ready for a store.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialQuery {
    pub origin: Coordinate,
    pub radius_m: f64,
    pub category: Option<String>,
    pub budget: Option<BudgetRange>,
    pub title: Option<String>,
    pub status: StatusFilter,
    pub sort: Option<SortDirection>,
}

impl SpatialQuery {
    pub fn radius_km(&self) -> f64 {
        self.radius_m / 1000.0
    }

    pub fn matches_attributes(&self, job: &JobPosting) -> bool {
        if !self.status.admits(job.status) {
            return false;
        }
        if let Some(category) = &self.category {
            if &job.category != category {
                return false;
            }
        }
        if let Some(budget) = &self.budget {
            if !budget.contains(job.budget) {
                return false;
            }
        }
        if let Some(title) = &self.title {
            if !job.title.to_lowercase().contains(&title.to_lowercase()) {
                return false;
            }
        }
        true
    }

    pub fn within_radius(&self, location: &Coordinate) -> bool {
        geo::haversine_km(&self.origin, location) <= self.radius_km()
    }

    pub fn matches(&self, job: &JobPosting) -> bool {
        self.matches_attributes(job) && self.within_radius(&job.location)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedJob {
    #[serde(flatten)]
    pub job: JobPosting,
    /// Kilometers from the search origin, rounded to 2 decimals.
    pub distance: f64,
    #[serde(skip)]
    pub exact_distance_km: f64,
}

impl RankedJob {
    pub fn new(job: JobPosting, origin: &Coordinate) -> Self {
        let exact_distance_km = geo::haversine_km(origin, &job.location);
        Self {
            job,
            distance: geo::round_km(exact_distance_km),
            exact_distance_km,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResultPage {
    pub jobs: Vec<RankedJob>,
    pub total: usize,
    pub page: u32,
    pub page_size: usize,
    pub total_pages: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::tests::open_job;

    fn query_at(origin: Coordinate, radius_km: f64) -> SpatialQuery {
        SpatialQuery {
            origin,
            radius_m: radius_km * 1000.0,
            category: None,
            budget: None,
            title: None,
            status: StatusFilter::default(),
            sort: None,
        }
    }

    #[test]
    fn status_filter_defaults_to_open_and_all_bypasses() {
        assert!(StatusFilter::default().admits(JobStatus::Open));
        assert!(!StatusFilter::default().admits(JobStatus::Process));
        let all: StatusFilter = "ALL".parse().unwrap();
        assert!(all.admits(JobStatus::Finish));
        assert!(matches!("done".parse::<StatusFilter>(), Err(Error::BadRequest(_))));
    }

    #[test]
    fn sort_direction_rejects_unknown_values() {
        assert_eq!("desc".parse::<SortDirection>().unwrap(), SortDirection::Desc);
        assert!(matches!("sideways".parse::<SortDirection>(), Err(Error::BadRequest(_))));
    }

    #[test]
    fn budget_range_bounds() {
        assert!(BudgetRange::new(Decimal::from(200), Decimal::from(100)).is_err());
        assert!(BudgetRange::new(Decimal::from(-1), Decimal::from(100)).is_err());
        let range = BudgetRange::new(Decimal::from(100), Decimal::from(200)).unwrap();
        assert!(range.contains(Decimal::from(100)));
        assert!(range.contains(Decimal::from(200)));
        assert!(!range.contains(Decimal::from(250)));
    }

    #[test]
    fn budget_range_bounds_use_the_stored_precision() {
        let sub_cent = Decimal::new(150_005, 3);
        assert!(matches!(
            BudgetRange::new(Decimal::from(100), sub_cent),
            Err(Error::InvalidRadiusOrBudget(_))
        ));
        assert!(matches!(
            BudgetRange::new(Decimal::from(100), Decimal::from(2_000_000_000_000i64)),
            Err(Error::InvalidRadiusOrBudget(_))
        ));
        let range = BudgetRange::new(Decimal::new(10_050, 2), Decimal::new(15_001, 2)).unwrap();
        assert!(range.contains(Decimal::new(15_001, 2)));
    }

    #[test]
    fn radius_must_be_positive() {
        assert!(validate_radius(0.0).is_err());
        assert!(validate_radius(-3.0).is_err());
        assert!(validate_radius(f64::INFINITY).is_err());
        assert_eq!(validate_radius(2.5).unwrap(), 2.5);
    }

    #[test]
    fn title_filter_is_case_insensitive_substring() {
        let mut query = query_at(Coordinate::new(106.8, -6.2).unwrap(), 5.0);
        query.title = Some("FENCE".to_string());
        assert!(query.matches(&open_job("budi")));
        query.title = Some("fen.e".to_string());
        assert!(!query.matches(&open_job("budi")));
    }

    #[test]
    fn radius_excludes_far_jobs() {
        let job = open_job("budi");
        let origin = Coordinate::new(106.82, -6.21).unwrap();
        assert!(query_at(origin, 3.0).matches(&job));
        assert!(!query_at(origin, 2.0).matches(&job));
    }
}
