use actix_web::{body, http::{header::ContentType, StatusCode}, HttpResponse};
use sea_orm::{sqlx, DbErr, RuntimeErr};
use thiserror::Error;

use crate::ledger::LedgerError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("internal server error")]
    Database(#[from] DbErr),
}

impl ApiError {
    /// A write that lost the race on a unique index becomes a conflict, not a 500
    pub fn conflict_on_duplicate(err: DbErr, message: impl FnOnce() -> String) -> Self {
        match &err {
            DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(db_err)))
            | DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(db_err)))
                if db_err.is_unique_violation() => ApiError::Conflict(message()),
            _ => ApiError::Database(err),
        }
    }
}

impl actix_web::error::ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse<body::BoxBody> {
        if let ApiError::Database(err) = self {
            tracing::error!(error = %err, "database request failed");
        }

        HttpResponse::build(self.status_code())
            .insert_header(ContentType::plaintext())
            .body(self.to_string())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Ledger(LedgerError::InvalidInput { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Ledger(LedgerError::DataInconsistency { .. }) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// What Postgres reports when an insert collides with a unique index
#[cfg(test)]
pub(crate) fn unique_violation() -> DbErr {
    use sqlx::error::{DatabaseError, ErrorKind};

    #[derive(Debug, Error)]
    #[error("duplicate key value violates unique constraint")]
    struct DuplicateKey;

    impl DatabaseError for DuplicateKey {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::UniqueViolation
        }
    }

    DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(Box::new(DuplicateKey))))
}
