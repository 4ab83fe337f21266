// Company repository implementation

use super::bind_values;
use super::queries::{company_queries, job_queries};
use crate::db::DbPool;
use crate::errors::{DatabaseError, ModelError};
use crate::models::{
    Company, CompanyDetail, CompanyFilter, CompanyPatch, JobSummary, NewCompany, COMPANY_COLUMNS,
};
use crate::sql;
use crate::telemetry::{record_query, record_query_build_error};
use tracing::instrument;

/// Repository for company-related database operations
#[derive(Clone)]
pub struct CompanyRepository {
    pool: DbPool,
}

impl CompanyRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a company
    ///
    /// # Errors
    /// `ModelError::BadRequest` when the handle is already taken
    #[instrument(skip(self, company), fields(handle = %company.handle))]
    pub async fn create(&self, company: &NewCompany) -> Result<Company, ModelError> {
        record_query("company", "create");

        let query = format!(
            r#"
            INSERT INTO companies (handle, name, description, num_employees, logo_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            company_queries::SELECT_ALL_COLUMNS
        );

        let created = sqlx::query_as::<_, Company>(&query)
            .bind(&company.handle)
            .bind(&company.name)
            .bind(&company.description)
            .bind(company.num_employees)
            .bind(&company.logo_url)
            .fetch_one(self.pool.pool())
            .await
            .map_err(|e| match DatabaseError::from(e) {
                DatabaseError::DuplicateKey(_) => {
                    ModelError::BadRequest(format!("Duplicate company: {}", company.handle))
                }
                other => other.into(),
            })?;

        tracing::info!(handle = %created.handle, "Company created");
        Ok(created)
    }

    /// List companies matching `filter`, ordered by name
    ///
    /// # Errors
    /// `ModelError::BadRequest` when `maxEmployees` is below `minEmployees`
    #[instrument(skip(self))]
    pub async fn find_all(&self, filter: &CompanyFilter) -> Result<Vec<Company>, ModelError> {
        record_query("company", "find_all");

        let criteria = sql::company_filter(&filter.to_filter_spec()).map_err(|e| {
            record_query_build_error(e.kind());
            e
        })?;

        let query = format!(
            "SELECT {} FROM companies{} ORDER BY name",
            company_queries::SELECT_ALL_COLUMNS,
            criteria.where_clause()
        );

        let companies = bind_values(sqlx::query_as::<_, Company>(&query), &criteria.values)
            .fetch_all(self.pool.pool())
            .await?;

        tracing::debug!(count = companies.len(), "Found companies");
        Ok(companies)
    }

    /// Fetch a company and the jobs it posts
    #[instrument(skip(self))]
    pub async fn get(&self, handle: &str) -> Result<CompanyDetail, ModelError> {
        record_query("company", "get");

        let company = sqlx::query_as::<_, Company>(&format!(
            "SELECT {} FROM companies WHERE handle = $1",
            company_queries::SELECT_ALL_COLUMNS
        ))
        .bind(handle)
        .fetch_optional(self.pool.pool())
        .await?
        .ok_or_else(|| ModelError::NotFound(format!("No company: {}", handle)))?;

        let jobs = sqlx::query_as::<_, JobSummary>(&format!(
            "SELECT {} FROM jobs WHERE company_handle = $1 ORDER BY id",
            job_queries::SELECT_SUMMARY_COLUMNS
        ))
        .bind(handle)
        .fetch_all(self.pool.pool())
        .await?;

        Ok(CompanyDetail { company, jobs })
    }

    /// Apply a partial update; the handle is bound after the patch values
    #[instrument(skip(self, patch))]
    pub async fn update(&self, handle: &str, patch: &CompanyPatch) -> Result<Company, ModelError> {
        record_query("company", "update");

        let set = sql::partial_update(&patch.to_update_spec(), COMPANY_COLUMNS).map_err(|e| {
            record_query_build_error(e.kind());
            e
        })?;

        let query = format!(
            "UPDATE companies SET {} WHERE handle = {} RETURNING {}",
            set.fragment,
            set.next_placeholder(),
            company_queries::SELECT_ALL_COLUMNS
        );

        let company = bind_values(sqlx::query_as::<_, Company>(&query), &set.values)
            .bind(handle)
            .fetch_optional(self.pool.pool())
            .await?
            .ok_or_else(|| ModelError::NotFound(format!("No company: {}", handle)))?;

        tracing::info!(handle = %handle, fields = set.values.len(), "Company updated");
        Ok(company)
    }

    /// Delete a company; its jobs go with it
    #[instrument(skip(self))]
    pub async fn remove(&self, handle: &str) -> Result<(), ModelError> {
        record_query("company", "remove");

        let result = sqlx::query("DELETE FROM companies WHERE handle = $1")
            .bind(handle)
            .execute(self.pool.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(ModelError::NotFound(format!("No company: {}", handle)));
        }

        tracing::info!(handle = %handle, "Company deleted");
        Ok(())
    }
}
