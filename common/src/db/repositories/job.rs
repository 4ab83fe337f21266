// Job repository implementation

use super::bind_values;
use super::queries::job_queries;
use crate::db::DbPool;
use crate::errors::{DatabaseError, ModelError};
use crate::models::{Company, Job, JobDetail, JobFilter, JobPatch, NewJob, JOB_COLUMNS};
use crate::sql;
use crate::telemetry::{record_query, record_query_build_error};
use sqlx::Row;
use tracing::instrument;

/// Repository for job-related database operations
#[derive(Clone)]
pub struct JobRepository {
    pool: DbPool,
}

impl JobRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a job under an existing company
    ///
    /// # Errors
    /// `ModelError::NotFound` when the company handle does not exist
    #[instrument(skip(self, job), fields(company_handle = %job.company_handle))]
    pub async fn create(&self, job: &NewJob) -> Result<Job, ModelError> {
        record_query("job", "create");

        let query = format!(
            r#"
            INSERT INTO jobs (title, salary, equity, company_handle)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            job_queries::SELECT_ALL_COLUMNS
        );

        let created = sqlx::query_as::<_, Job>(&query)
            .bind(&job.title)
            .bind(job.salary)
            .bind(job.equity)
            .bind(&job.company_handle)
            .fetch_one(self.pool.pool())
            .await
            .map_err(|e| match DatabaseError::from(e) {
                DatabaseError::ForeignKeyViolation(_) => {
                    ModelError::NotFound(format!("No company: {}", job.company_handle))
                }
                other => other.into(),
            })?;

        tracing::info!(job_id = created.id, title = %created.title, "Job created");
        Ok(created)
    }

    /// List jobs matching `filter`, ordered by id
    #[instrument(skip(self))]
    pub async fn find_all(&self, filter: &JobFilter) -> Result<Vec<Job>, ModelError> {
        record_query("job", "find_all");

        let criteria = sql::job_filter(&filter.to_filter_spec());
        let query = format!(
            "SELECT {} FROM jobs{} ORDER BY id",
            job_queries::SELECT_ALL_COLUMNS,
            criteria.where_clause()
        );

        let jobs = bind_values(sqlx::query_as::<_, Job>(&query), &criteria.values)
            .fetch_all(self.pool.pool())
            .await?;

        tracing::debug!(count = jobs.len(), "Found jobs");
        Ok(jobs)
    }

    /// Fetch a job together with its company
    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<JobDetail, ModelError> {
        record_query("job", "get");

        let row = sqlx::query(
            r#"
            SELECT j.id,
                   j.title,
                   j.salary,
                   j.equity::float8 AS equity,
                   c.handle,
                   c.name,
                   c.description,
                   c.num_employees,
                   c.logo_url
            FROM jobs AS j
              JOIN companies AS c ON j.company_handle = c.handle
            WHERE j.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.pool())
        .await?
        .ok_or_else(|| ModelError::NotFound(format!("No job: {}", id)))?;

        Ok(JobDetail {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            salary: row.try_get("salary")?,
            equity: row.try_get("equity")?,
            company: Company {
                handle: row.try_get("handle")?,
                name: row.try_get("name")?,
                description: row.try_get("description")?,
                num_employees: row.try_get("num_employees")?,
                logo_url: row.try_get("logo_url")?,
            },
        })
    }

    /// Apply a partial update to title, salary or equity
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: i32, patch: &JobPatch) -> Result<Job, ModelError> {
        record_query("job", "update");

        let set = sql::partial_update(&patch.to_update_spec(), JOB_COLUMNS).map_err(|e| {
            record_query_build_error(e.kind());
            e
        })?;

        let query = format!(
            "UPDATE jobs SET {} WHERE id = {} RETURNING {}",
            set.fragment,
            set.next_placeholder(),
            job_queries::SELECT_ALL_COLUMNS
        );

        let job = bind_values(sqlx::query_as::<_, Job>(&query), &set.values)
            .bind(id)
            .fetch_optional(self.pool.pool())
            .await?
            .ok_or_else(|| ModelError::NotFound(format!("No job: {}", id)))?;

        tracing::info!(job_id = id, fields = set.values.len(), "Job updated");
        Ok(job)
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, id: i32) -> Result<(), ModelError> {
        record_query("job", "remove");

        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(self.pool.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(ModelError::NotFound(format!("No job: {}", id)));
        }

        tracing::info!(job_id = id, "Job deleted");
        Ok(())
    }
}
