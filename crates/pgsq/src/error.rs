//! Error types for pgsq

use thiserror::Error;
use tokio_postgres::error::SqlState;

/// Result type alias for pgsq operations
pub type SqResult<T> = Result<T, SqError>;

/// Error types for statement composition and database operations
#[derive(Debug, Error)]
pub enum SqError {
    /// A statement is missing a clause it cannot be emitted without
    #[error("{0}")]
    MissingClause(&'static str),

    /// A value of a kind that is not accepted at this position
    #[error("unsupported predicate type: {0}")]
    UnsupportedPredicateType(String),

    /// An equality condition was given an empty list
    #[error("equality condition must contain at least one parameter (column '{0}')")]
    EmptyParameterSet(String),

    /// NULL or a list used with <, <=, > or >=
    #[error("invalid comparison operand for column '{column}': {message}")]
    InvalidComparisonOperand { column: String, message: String },

    /// Malformed WITH clause
    #[error("invalid WITH clause: {0}")]
    InvalidWith(String),

    /// Malformed placeholder reference
    #[error("placeholder error: {0}")]
    Placeholder(String),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Serialization failure (SQLSTATE 40001), the retryable class
    #[error("Serialization failure: {0}")]
    SerializationFailure(String),

    /// Unique constraint violation
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Invalid configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl SqError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub(crate) fn comparison(column: &str, message: &str) -> Self {
        Self::InvalidComparisonOperand {
            column: column.to_string(),
            message: message.to_string(),
        }
    }

    /// Whether this error happened while composing a statement.
    ///
    /// Composition errors are never retried.
    pub fn is_composition(&self) -> bool {
        matches!(
            self,
            Self::MissingClause(_)
                | Self::UnsupportedPredicateType(_)
                | Self::EmptyParameterSet(_)
                | Self::InvalidComparisonOperand { .. }
                | Self::InvalidWith(_)
                | Self::Placeholder(_)
        )
    }

    /// Check if this is a serialization failure (the retryable class)
    pub fn is_serialization_failure(&self) -> bool {
        self.sql_state() == Some(SqlState::T_R_SERIALIZATION_FAILURE.code())
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// The SQLSTATE carried by this error, if it came from the database.
    pub fn sql_state(&self) -> Option<&str> {
        match self {
            Self::Query(err) => err.code().map(SqlState::code),
            Self::SerializationFailure(_) => Some(SqlState::T_R_SERIALIZATION_FAILURE.code()),
            Self::UniqueViolation(_) => Some(SqlState::UNIQUE_VIOLATION.code()),
            Self::ForeignKeyViolation(_) => Some(SqlState::FOREIGN_KEY_VIOLATION.code()),
            Self::CheckViolation(_) => Some(SqlState::CHECK_VIOLATION.code()),
            _ => None,
        }
    }

    /// Parse a tokio_postgres error into a more specific SqError
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            let constraint = db_err.constraint().unwrap_or("unknown");
            let message = db_err.message();

            match db_err.code().code() {
                "40001" => return Self::SerializationFailure(message.to_string()),
                "23505" => return Self::UniqueViolation(format!("{}: {}", constraint, message)),
                "23503" => {
                    return Self::ForeignKeyViolation(format!("{}: {}", constraint, message));
                }
                "23514" => return Self::CheckViolation(format!("{}: {}", constraint, message)),
                _ => {}
            }
        }
        Self::Query(err)
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for SqError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialization_failure_maps_to_40001() {
        let err = SqError::SerializationFailure("could not serialize access".into());
        assert!(err.is_serialization_failure());
        assert_eq!(err.sql_state(), Some("40001"));
        assert!(!err.is_composition());
    }

    #[test]
    fn composition_errors_have_no_sql_state() {
        let err = SqError::EmptyParameterSet("id".into());
        assert!(err.is_composition());
        assert_eq!(err.sql_state(), None);
        assert!(!err.is_serialization_failure());
        assert!(err.to_string().contains("must contain at least one parameter"));
    }
}
