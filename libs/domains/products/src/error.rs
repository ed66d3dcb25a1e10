use http::StatusCode;
use sea_orm::{DbErr, RuntimeErr, SqlErr, SqlxPostgresError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product with term {0} not found")]
    NotFound(String),

    /// Unique constraint violation, carrying the store's detail message
    #[error("{0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    /// Details are only written to the server log
    #[error("Unexpected error, check server logs")]
    Internal,
}

pub type ProductResult<T> = Result<T, ProductError>;

impl ProductError {
    /// Log an unexpected failure and hide it behind [`ProductError::Internal`]
    pub fn internal(err: impl std::fmt::Display) -> Self {
        tracing::error!(error = %err, "Unexpected product store error");
        ProductError::Internal
    }

    /// HTTP status the transport layer should answer with
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProductError::NotFound(_) => StatusCode::NOT_FOUND,
            // Duplicates are reported as a bad request, not 409
            ProductError::Conflict(_) | ProductError::Validation(_) => StatusCode::BAD_REQUEST,
            ProductError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Postgres `DETAIL` line of a failed statement, e.g. `Key (slug)=(shirt) already exists.`
fn postgres_detail(err: &DbErr) -> Option<String> {
    match err {
        DbErr::Exec(RuntimeErr::SqlxError(e)) | DbErr::Query(RuntimeErr::SqlxError(e)) => e
            .as_database_error()?
            .try_downcast_ref::<SqlxPostgresError>()?
            .detail()
            .map(str::to_string),
        _ => None,
    }
}

/// Single classification point for store failures
impl From<DbErr> for ProductError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message)) => {
                ProductError::Conflict(postgres_detail(&err).unwrap_or(message))
            }
            _ => ProductError::internal(err),
        }
    }
}
