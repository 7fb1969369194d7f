use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::database::{JobListFilter, JobStore, ReviewStore, UserStore};
use crate::error::{Error, Result};
use crate::models::job::{JobPatch, JobPosting, JobStatus};
use crate::models::location::Coordinate;
use crate::models::review::Review;
use crate::models::search::{SortDirection, SpatialQuery, StatusFilter};
use crate::models::user::{Rating, UserProfile};
use crate::utils::time;

const JOB_COLUMNS: &str = "id, title, description, category, budget, address, longitude, latitude, created_by, status, assignee, start_date, end_date, created_at, updated_at";

const USER_COLUMNS: &str = "username, full_name, email, role, address, longitude, latitude, rating_total, rating_count, created_at";

const REVIEW_COLUMNS: &str = "id, job_id, rating, comment, created_by, created_for, created_at";

/// Great-circle distance in km from ($1 lon, $2 lat) to the row, R = 6371.
const HAVERSINE_SQL: &str = "2 * 6371.0 * asin(sqrt(LEAST(1.0, \
     power(sin(radians(latitude - $2) / 2), 2) \
     + cos(radians($2)) * cos(radians(latitude)) * power(sin(radians(longitude - $1) / 2), 2))))";

#[derive(Debug, FromRow)]
struct JobRow {
    id: Uuid,
    title: String,
    description: String,
    category: String,
    budget: Decimal,
    address: String,
    longitude: f64,
    latitude: f64,
    created_by: String,
    status: String,
    assignee: Option<String>,
    start_date: Option<NaiveDate>,
    end_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<JobRow> for JobPosting {
    type Error = Error;

    fn try_from(row: JobRow) -> Result<Self> {
        let status: JobStatus = row
            .status
            .parse()
            .map_err(|e: String| Error::Internal(format!("job {}: {}", row.id, e)))?;
        Ok(JobPosting {
            id: row.id,
            title: row.title,
            description: row.description,
            category: row.category,
            budget: row.budget,
            address: row.address,
            location: Coordinate::new(row.longitude, row.latitude)?,
            created_by: row.created_by,
            status,
            assignee: row.assignee,
            start_date: row.start_date,
            end_date: row.end_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    username: String,
    full_name: String,
    email: String,
    role: String,
    address: Option<String>,
    longitude: Option<f64>,
    latitude: Option<f64>,
    rating_total: i64,
    rating_count: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserProfile {
    type Error = Error;

    fn try_from(row: UserRow) -> Result<Self> {
        let role = row
            .role
            .parse()
            .map_err(|e: String| Error::Internal(format!("user {}: {}", row.username, e)))?;
        let location = match (row.longitude, row.latitude) {
            (Some(lon), Some(lat)) => Some(Coordinate::new(lon, lat)?),
            _ => None,
        };
        Ok(UserProfile {
            username: row.username,
            full_name: row.full_name,
            email: row.email,
            role,
            address: row.address,
            location,
            rating: Rating {
                total: row.rating_total,
                count: row.rating_count,
            },
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ReviewRow {
    id: Uuid,
    job_id: Uuid,
    rating: i16,
    comment: String,
    created_by: String,
    created_for: String,
    created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: row.id,
            job_id: row.job_id,
            rating: row.rating,
            comment: row.comment,
            created_by: row.created_by,
            created_for: row.created_for,
            created_at: row.created_at,
        }
    }
}

/// Escape LIKE metacharacters so a title filter matches literally.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn order_clause(sort: Option<SortDirection>) -> &'static str {
    match sort {
        None => "ORDER BY distance_km ASC, created_at ASC, id ASC",
        Some(SortDirection::Asc) => "ORDER BY created_at ASC, id ASC",
        Some(SortDirection::Desc) => "ORDER BY created_at DESC, id ASC",
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// After a conditional write matched nothing, read the row and let the
    /// state machine say why.
    async fn explain_rejection<F>(&self, id: Uuid, check: F) -> Error
    where
        F: FnOnce(&JobPosting) -> Result<()> + Send,
    {
        match self.get_job(id).await {
            Ok(Some(job)) => match check(&job) {
                Err(reason) => reason,
                Ok(()) => Error::Internal(format!(
                    "conditional update on job {} matched no row",
                    id
                )),
            },
            Ok(None) => Error::NotFound(format!("Job {} not found", id)),
            Err(e) => e,
        }
    }
}

#[async_trait]
impl JobStore for PgStore {
    async fn insert_job(&self, job: &JobPosting) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO jobs (
                id, title, description, category, budget, address, longitude, latitude,
                created_by, status, assignee, start_date, end_date, created_at, updated_at
            ) VALUES (
                $1,$2,$3,$4,$5,$6,$7,$8,
                $9,$10,$11,$12,$13,$14,$15
            )
            "#,
        )
        .bind(job.id)
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.category)
        .bind(job.budget)
        .bind(&job.address)
        .bind(job.location.longitude())
        .bind(job.location.latitude())
        .bind(&job.created_by)
        .bind(job.status.as_str())
        .bind(&job.assignee)
        .bind(job.start_date)
        .bind(job.end_date)
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<JobPosting>> {
        let sql = format!("SELECT {} FROM jobs WHERE id = $1", JOB_COLUMNS);
        let row = sqlx::query_as::<_, JobRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(JobPosting::try_from).transpose()
    }

    async fn search_jobs(&self, query: &SpatialQuery) -> Result<Vec<JobPosting>> {
        let status = match query.status {
            StatusFilter::Only(status) => Some(status.as_str()),
            StatusFilter::All => None,
        };
        let title = query.title.as_deref().map(escape_like);

        // earth_box works on earthdistance's own radius, so the box radius is
        // scaled to keep the same angular extent as the 6371 km sphere
        let sql = format!(
            r#"
            SELECT * FROM (
                SELECT {columns}, {distance} AS distance_km
                FROM jobs
                WHERE earth_box(ll_to_earth($2, $1), $3 * earth() / 6371000.0)
                        @> ll_to_earth(latitude, longitude)
                  AND ($4::text IS NULL OR category = $4)
                  AND ($5::numeric IS NULL OR budget >= $5)
                  AND ($6::numeric IS NULL OR budget <= $6)
                  AND ($7::text IS NULL OR title ILIKE '%' || $7 || '%' ESCAPE '\')
                  AND ($8::text IS NULL OR status = $8)
            ) AS nearby
            WHERE distance_km <= $3 / 1000.0
            {order}
            "#,
            columns = JOB_COLUMNS,
            distance = HAVERSINE_SQL,
            order = order_clause(query.sort),
        );

        let rows = sqlx::query_as::<_, JobRow>(&sql)
            .bind(query.origin.longitude())
            .bind(query.origin.latitude())
            .bind(query.radius_m)
            .bind(&query.category)
            .bind(query.budget.map(|b| b.min()))
            .bind(query.budget.map(|b| b.max()))
            .bind(title)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(JobPosting::try_from).collect()
    }

    async fn list_jobs(&self, filter: &JobListFilter) -> Result<Vec<JobPosting>> {
        let sql = format!(
            "SELECT {} FROM jobs
             WHERE ($1::text IS NULL OR status = $1)
               AND ($2::text IS NULL OR created_by = $2)
             ORDER BY created_at DESC, id ASC",
            JOB_COLUMNS
        );
        let rows = sqlx::query_as::<_, JobRow>(&sql)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(&filter.created_by)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(JobPosting::try_from).collect()
    }

    async fn assign_job(&self, id: Uuid, applicant: &UserProfile) -> Result<JobPosting> {
        if !applicant.is_job_seeker() {
            return Err(self
                .explain_rejection(id, |job| job.check_apply(applicant))
                .await);
        }

        let sql = format!(
            "UPDATE jobs
             SET status = 'Process', assignee = $2, updated_at = $3
             WHERE id = $1 AND status = 'Open' AND assignee IS NULL
             RETURNING {}",
            JOB_COLUMNS
        );
        let row = sqlx::query_as::<_, JobRow>(&sql)
            .bind(id)
            .bind(&applicant.username)
            .bind(time::now())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => row.try_into(),
            None => Err(self
                .explain_rejection(id, |job| job.check_apply(applicant))
                .await),
        }
    }

    async fn finish_job(&self, id: Uuid, actor: &UserProfile) -> Result<JobPosting> {
        let sql = format!(
            "UPDATE jobs
             SET status = 'Finish', updated_at = $3
             WHERE id = $1 AND status = 'Process' AND created_by = $2
             RETURNING {}",
            JOB_COLUMNS
        );
        let row = sqlx::query_as::<_, JobRow>(&sql)
            .bind(id)
            .bind(&actor.username)
            .bind(time::now())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => row.try_into(),
            None => Err(self
                .explain_rejection(id, |job| job.check_finish(actor))
                .await),
        }
    }

    async fn update_job(
        &self,
        id: Uuid,
        actor: &UserProfile,
        patch: &JobPatch,
    ) -> Result<JobPosting> {
        let mut tx = self.pool.begin().await?;

        let select = format!("SELECT {} FROM jobs WHERE id = $1 FOR UPDATE", JOB_COLUMNS);
        let mut job: JobPosting = sqlx::query_as::<_, JobRow>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Job {} not found", id)))?
            .try_into()?;

        // the row lock is held until commit; dropping tx on error rolls back
        job.edit(actor, patch, time::now())?;

        sqlx::query(
            r#"
            UPDATE jobs
            SET title = $2, description = $3, category = $4, budget = $5,
                address = $6, longitude = $7, latitude = $8,
                start_date = $9, end_date = $10, updated_at = $11
            WHERE id = $1
            "#,
        )
        .bind(job.id)
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.category)
        .bind(job.budget)
        .bind(&job.address)
        .bind(job.location.longitude())
        .bind(job.location.latitude())
        .bind(job.start_date)
        .bind(job.end_date)
        .bind(job.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(job)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: &UserProfile) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                username, full_name, email, role, address, longitude, latitude,
                rating_total, rating_count, created_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)
            "#,
        )
        .bind(&user.username)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(&user.address)
        .bind(user.location.map(|c| c.longitude()))
        .bind(user.location.map(|c| c.latitude()))
        .bind(user.rating.total)
        .bind(user.rating.count)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_user(&self, username: &str) -> Result<Option<UserProfile>> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        row.map(UserProfile::try_from).transpose()
    }

    async fn list_users(&self) -> Result<Vec<UserProfile>> {
        let sql = format!("SELECT {} FROM users ORDER BY username", USER_COLUMNS);
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(UserProfile::try_from).collect()
    }

    async fn update_user_location(
        &self,
        username: &str,
        address: &str,
        location: Coordinate,
    ) -> Result<UserProfile> {
        let sql = format!(
            "UPDATE users SET address = $2, longitude = $3, latitude = $4
             WHERE username = $1
             RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .bind(address)
            .bind(location.longitude())
            .bind(location.latitude())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("User {} not found", username)))?;
        row.try_into()
    }
}

#[async_trait]
impl ReviewStore for PgStore {
    async fn record_review(&self, review: &Review) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO reviews (id, job_id, rating, comment, created_by, created_for, created_at)
            VALUES ($1,$2,$3,$4,$5,$6,$7)
            ON CONFLICT (job_id) DO NOTHING
            "#,
        )
        .bind(review.id)
        .bind(review.job_id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(&review.created_by)
        .bind(&review.created_for)
        .bind(review.created_at)
        .execute(&mut *tx)
        .await?;
        if inserted.rows_affected() == 0 {
            return Err(Error::ReviewExists);
        }

        let credited = sqlx::query(
            "UPDATE users
             SET rating_total = rating_total + $2, rating_count = rating_count + 1
             WHERE username = $1",
        )
        .bind(&review.created_for)
        .bind(i64::from(review.rating))
        .execute(&mut *tx)
        .await?;
        if credited.rows_affected() == 0 {
            return Err(Error::NotFound(format!(
                "User {} not found",
                review.created_for
            )));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_reviews_for(&self, username: &str) -> Result<Vec<Review>> {
        let sql = format!(
            "SELECT {} FROM reviews WHERE created_for = $1 ORDER BY created_at DESC",
            REVIEW_COLUMNS
        );
        let rows = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(username)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Review::from).collect())
    }
}
