// Error handling framework
// One enum per concern; repositories surface `ModelError`.

use thiserror::Error;

/// Errors raised while compiling payloads into SQL fragments.
///
/// Both variants are caller-input errors and are never worth retrying.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryBuildError {
    #[error("No data")]
    EmptyUpdate,

    #[error("Max {field} ({max}) must not be less than min {field} ({min})")]
    InvalidRange {
        field: &'static str,
        min: String,
        max: String,
    },
}

impl QueryBuildError {
    /// Short label used for metrics and structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            QueryBuildError::EmptyUpdate => "empty_update",
            QueryBuildError::InvalidRange { .. } => "invalid_range",
        }
    }
}

/// Database-specific errors
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Database health check failed: {0}")]
    HealthCheckFailed(String),

    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Duplicate key violation: {0}")]
    DuplicateKey(String),

    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),
}

/// Errors returned by the repositories
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<QueryBuildError> for ModelError {
    fn from(err: QueryBuildError) -> Self {
        ModelError::BadRequest(err.to_string())
    }
}

impl From<sqlx::Error> for ModelError {
    fn from(err: sqlx::Error) -> Self {
        ModelError::Database(err.into())
    }
}

impl From<bcrypt::BcryptError> for ModelError {
    fn from(err: bcrypt::BcryptError) -> Self {
        ModelError::Hashing(err.to_string())
    }
}

/// Serializable error body handed to whatever transport sits on top
#[derive(Debug, serde::Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub trace_id: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            trace_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// HTTP status matching `code`
    pub fn status_code(&self) -> u16 {
        match self.code.as_str() {
            "BAD_REQUEST" => 400,
            "NOT_FOUND" => 404,
            "CONFLICT" => 409,
            _ => 500,
        }
    }
}

impl From<QueryBuildError> for ApiError {
    fn from(err: QueryBuildError) -> Self {
        ApiError::new("BAD_REQUEST", err.to_string())
            .with_details(serde_json::json!({ "kind": err.kind() }))
    }
}

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        let code = match &err {
            ModelError::BadRequest(_) => "BAD_REQUEST",
            ModelError::NotFound(_) => "NOT_FOUND",
            ModelError::Database(DatabaseError::DuplicateKey(_)) => "CONFLICT",
            ModelError::Database(DatabaseError::NotFound(_)) => "NOT_FOUND",
            _ => "INTERNAL_ERROR",
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DatabaseError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some("23505") => DatabaseError::DuplicateKey(db_err.message().to_string()),
                Some("23503") => DatabaseError::ForeignKeyViolation(db_err.message().to_string()),
                _ => DatabaseError::QueryFailed(db_err.message().to_string()),
            },
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_update_message() {
        assert_eq!(QueryBuildError::EmptyUpdate.to_string(), "No data");
    }

    #[test]
    fn test_invalid_range_message() {
        let err = QueryBuildError::InvalidRange {
            field: "employees",
            min: "50".to_string(),
            max: "49".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Max employees (49) must not be less than min employees (50)"
        );
        assert_eq!(err.kind(), "invalid_range");
    }

    #[test]
    fn test_query_build_error_is_bad_request() {
        let err: ModelError = QueryBuildError::EmptyUpdate.into();
        assert!(matches!(err, ModelError::BadRequest(ref msg) if msg == "No data"));
    }

    #[test]
    fn test_model_error_to_api_error() {
        let api_err: ApiError = ModelError::NotFound("No job: 0".to_string()).into();
        assert_eq!(api_err.code, "NOT_FOUND");
        assert_eq!(api_err.status_code(), 404);
        assert_eq!(api_err.message, "No job: 0");

        let api_err: ApiError =
            ModelError::Database(DatabaseError::DuplicateKey("handle".to_string())).into();
        assert_eq!(api_err.status_code(), 409);

        let api_err: ApiError =
            ModelError::Database(DatabaseError::QueryFailed("boom".to_string())).into();
        assert_eq!(api_err.status_code(), 500);
    }

    #[test]
    fn test_api_error_with_details() {
        let err: ApiError = QueryBuildError::EmptyUpdate.into();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.details, Some(serde_json::json!({ "kind": "empty_update" })));
        assert!(!err.trace_id.is_empty());
    }
}
