use sqlx::error::ErrorKind;

use crate::application::repos::RepoError;

const QUERY_CANCELED: &str = "57014";

pub fn map_sqlx_error(err: sqlx::Error) -> RepoError {
    match err {
        sqlx::Error::RowNotFound => RepoError::NotFound,
        sqlx::Error::PoolTimedOut => RepoError::Timeout,
        sqlx::Error::Database(db) => match db.kind() {
            ErrorKind::UniqueViolation => RepoError::Duplicate {
                constraint: db.constraint().unwrap_or("unknown").to_string(),
            },
            ErrorKind::ForeignKeyViolation => RepoError::InvalidInput {
                message: db.message().to_string(),
            },
            ErrorKind::CheckViolation | ErrorKind::NotNullViolation => RepoError::Integrity {
                message: db.message().to_string(),
            },
            _ if db.code().as_deref() == Some(QUERY_CANCELED) => RepoError::Timeout,
            _ if db.message().contains("invalid input syntax") => RepoError::InvalidInput {
                message: db.message().to_string(),
            },
            _ => RepoError::from_persistence(db),
        },
        other => RepoError::from_persistence(other),
    }
}

pub(crate) fn convert_count(value: i64) -> Result<u64, RepoError> {
    value
        .try_into()
        .map_err(|_| RepoError::from_persistence("count exceeds supported range"))
}
