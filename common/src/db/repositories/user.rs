// User repository implementation
// Passwords are stored as bcrypt hashes and never selected back out

use super::bind_values;
use super::queries::user_queries;
use crate::db::DbPool;
use crate::errors::{DatabaseError, ModelError};
use crate::models::{NewUser, User, UserDetail, UserPatch, USER_COLUMNS};
use crate::sql;
use crate::telemetry::{record_query, record_query_build_error};
use tracing::instrument;

/// Repository for user-related database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: DbPool,
    bcrypt_work_factor: u32,
}

impl UserRepository {
    pub fn new(pool: DbPool, bcrypt_work_factor: u32) -> Self {
        Self {
            pool,
            bcrypt_work_factor,
        }
    }

    /// Register a user with a hashed password
    ///
    /// # Errors
    /// `ModelError::BadRequest` when the username is already taken
    #[instrument(skip(self, user), fields(username = %user.username))]
    pub async fn register(&self, user: &NewUser) -> Result<User, ModelError> {
        record_query("user", "register");

        let password_hash = hash_password(&user.password, self.bcrypt_work_factor).await?;

        let query = format!(
            r#"
            INSERT INTO users (username, password, first_name, last_name, email, is_admin)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            user_queries::SELECT_ALL_COLUMNS
        );

        let created = sqlx::query_as::<_, User>(&query)
            .bind(&user.username)
            .bind(password_hash)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(user.is_admin)
            .fetch_one(self.pool.pool())
            .await
            .map_err(|e| match DatabaseError::from(e) {
                DatabaseError::DuplicateKey(_) => {
                    ModelError::BadRequest(format!("Duplicate username: {}", user.username))
                }
                other => other.into(),
            })?;

        tracing::info!(username = %created.username, is_admin = created.is_admin, "User registered");
        Ok(created)
    }

    /// All users, ordered by username
    #[instrument(skip(self))]
    pub async fn find_all(&self) -> Result<Vec<User>, ModelError> {
        record_query("user", "find_all");

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users ORDER BY username",
            user_queries::SELECT_ALL_COLUMNS
        ))
        .fetch_all(self.pool.pool())
        .await?;

        Ok(users)
    }

    /// Fetch a user and the ids of the jobs they applied to
    #[instrument(skip(self))]
    pub async fn get(&self, username: &str) -> Result<UserDetail, ModelError> {
        record_query("user", "get");

        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            user_queries::SELECT_ALL_COLUMNS
        ))
        .bind(username)
        .fetch_optional(self.pool.pool())
        .await?
        .ok_or_else(|| ModelError::NotFound(format!("No user: {}", username)))?;

        let applications = sqlx::query_scalar::<_, i32>(
            "SELECT job_id FROM applications WHERE username = $1 ORDER BY job_id",
        )
        .bind(username)
        .fetch_all(self.pool.pool())
        .await?;

        Ok(UserDetail { user, applications })
    }

    /// Apply a partial update; a new password is hashed before it is stored
    #[instrument(skip(self, patch))]
    pub async fn update(&self, username: &str, patch: &UserPatch) -> Result<User, ModelError> {
        record_query("user", "update");

        let mut spec = patch.to_update_spec();
        if let Some(password) = &patch.password {
            spec.push(
                "password",
                hash_password(password, self.bcrypt_work_factor).await?,
            );
        }

        let set = sql::partial_update(&spec, USER_COLUMNS).map_err(|e| {
            record_query_build_error(e.kind());
            e
        })?;

        let query = format!(
            "UPDATE users SET {} WHERE username = {} RETURNING {}",
            set.fragment,
            set.next_placeholder(),
            user_queries::SELECT_ALL_COLUMNS
        );

        let user = bind_values(sqlx::query_as::<_, User>(&query), &set.values)
            .bind(username)
            .fetch_optional(self.pool.pool())
            .await?
            .ok_or_else(|| ModelError::NotFound(format!("No user: {}", username)))?;

        tracing::info!(username = %username, fields = set.values.len(), "User updated");
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, username: &str) -> Result<(), ModelError> {
        record_query("user", "remove");

        let result = sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(username)
            .execute(self.pool.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(ModelError::NotFound(format!("No user: {}", username)));
        }

        tracing::info!(username = %username, "User deleted");
        Ok(())
    }

    /// Record that `username` applied to job `job_id`
    ///
    /// # Errors
    /// `ModelError::NotFound` when either the job or the user is missing,
    /// `ModelError::BadRequest` when the application already exists
    #[instrument(skip(self))]
    pub async fn apply_to_job(&self, username: &str, job_id: i32) -> Result<(), ModelError> {
        record_query("user", "apply_to_job");

        let job = sqlx::query_scalar::<_, i32>("SELECT id FROM jobs WHERE id = $1")
            .bind(job_id)
            .fetch_optional(self.pool.pool())
            .await?;
        if job.is_none() {
            return Err(ModelError::NotFound(format!("No job: {}", job_id)));
        }

        let user = sqlx::query_scalar::<_, String>("SELECT username FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(self.pool.pool())
            .await?;
        if user.is_none() {
            return Err(ModelError::NotFound(format!("No user: {}", username)));
        }

        sqlx::query("INSERT INTO applications (job_id, username) VALUES ($1, $2)")
            .bind(job_id)
            .bind(username)
            .execute(self.pool.pool())
            .await
            .map_err(|e| match DatabaseError::from(e) {
                DatabaseError::DuplicateKey(_) => ModelError::BadRequest(format!(
                    "{} already applied to job {}",
                    username, job_id
                )),
                other => other.into(),
            })?;

        tracing::info!(username = %username, job_id, "Application recorded");
        Ok(())
    }
}

// Hashing runs on the blocking pool
async fn hash_password(password: &str, cost: u32) -> Result<String, ModelError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| ModelError::Hashing(e.to_string()))?
        .map_err(ModelError::from)
}
