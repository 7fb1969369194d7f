use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::location::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Employer,
    JobSeeker,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employer => "employer",
            Role::JobSeeker => "job_seeker",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "employer" => Ok(Role::Employer),
            "job_seeker" => Ok(Role::JobSeeker),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Running review aggregate for a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub total: i64,
    pub count: i64,
}

impl Rating {
    pub fn average(&self) -> f64 {
        if self.count > 0 {
            self.total as f64 / self.count as f64
        } else {
            0.0
        }
    }

    pub fn record(&mut self, stars: i16) {
        self.total += i64::from(stars);
        self.count += 1;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub address: Option<String>,
    /// Home location, the default origin for searches.
    pub location: Option<Coordinate>,
    pub rating: Rating,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn is_job_seeker(&self) -> bool {
        self.role == Role::JobSeeker
    }

    pub fn is_employer(&self) -> bool {
        self.role == Role::Employer
    }
}
