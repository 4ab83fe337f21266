// Repository layer for database operations

pub mod company;
pub mod job;
pub mod queries;
pub mod user;

pub use company::CompanyRepository;
pub use job::JobRepository;
pub use user::UserRepository;

use crate::sql::BindValue;
use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::QueryAs;

/// Bind fragment values onto a query in placeholder order
pub(crate) fn bind_values<'q, O>(
    mut query: QueryAs<'q, Postgres, O, PgArguments>,
    values: &[BindValue],
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for value in values {
        query = match value.clone() {
            BindValue::Text(v) => query.bind(v),
            BindValue::Int(v) => query.bind(v),
            BindValue::Float(v) => query.bind(v),
            BindValue::Bool(v) => query.bind(v),
        };
    }
    query
}
