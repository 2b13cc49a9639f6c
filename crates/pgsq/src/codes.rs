//! SQLSTATE error codes.
//!
//! The individual codes are the [`SqlState`] constants from `tokio-postgres`
//! (`SqlState::T_R_SERIALIZATION_FAILURE`, `SqlState::UNIQUE_VIOLATION`, ...).
//! [`ErrorClass`] groups them by their two-character class.

use crate::error::SqError;

pub use tokio_postgres::error::SqlState;

/// The class of a SQLSTATE code (its first two characters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    SuccessfulCompletion,
    Warning,
    NoData,
    SqlStatementNotYetComplete,
    ConnectionException,
    TriggeredActionException,
    FeatureNotSupported,
    InvalidTransactionInitiation,
    LocatorException,
    InvalidGrantor,
    InvalidRoleSpecification,
    DiagnosticsException,
    CaseNotFound,
    CardinalityViolation,
    DataException,
    IntegrityConstraintViolation,
    InvalidCursorState,
    InvalidTransactionState,
    InvalidSqlStatementName,
    TriggeredDataChangeViolation,
    InvalidAuthorizationSpecification,
    DependentPrivilegeDescriptorsStillExist,
    InvalidTransactionTermination,
    SqlRoutineException,
    InvalidCursorName,
    ExternalRoutineException,
    ExternalRoutineInvocationException,
    SavepointException,
    InvalidCatalogName,
    InvalidSchemaName,
    TransactionRollback,
    SyntaxErrorOrAccessRuleViolation,
    WithCheckOptionViolation,
    InsufficientResources,
    ProgramLimitExceeded,
    ObjectNotInPrerequisiteState,
    OperatorIntervention,
    SystemError,
    SnapshotFailure,
    ConfigFileError,
    FdwError,
    PlpgsqlError,
    InternalError,
}

impl ErrorClass {
    /// Classify a five-character SQLSTATE code. Unknown classes yield `None`.
    pub fn of(code: &str) -> Option<Self> {
        let class = code.get(..2)?;
        let c = match class {
            "00" => Self::SuccessfulCompletion,
            "01" => Self::Warning,
            "02" => Self::NoData,
            "03" => Self::SqlStatementNotYetComplete,
            "08" => Self::ConnectionException,
            "09" => Self::TriggeredActionException,
            "0A" => Self::FeatureNotSupported,
            "0B" => Self::InvalidTransactionInitiation,
            "0F" => Self::LocatorException,
            "0L" => Self::InvalidGrantor,
            "0P" => Self::InvalidRoleSpecification,
            "0Z" => Self::DiagnosticsException,
            "20" => Self::CaseNotFound,
            "21" => Self::CardinalityViolation,
            "22" => Self::DataException,
            "23" => Self::IntegrityConstraintViolation,
            "24" => Self::InvalidCursorState,
            "25" => Self::InvalidTransactionState,
            "26" => Self::InvalidSqlStatementName,
            "27" => Self::TriggeredDataChangeViolation,
            "28" => Self::InvalidAuthorizationSpecification,
            "2B" => Self::DependentPrivilegeDescriptorsStillExist,
            "2D" => Self::InvalidTransactionTermination,
            "2F" => Self::SqlRoutineException,
            "34" => Self::InvalidCursorName,
            "38" => Self::ExternalRoutineException,
            "39" => Self::ExternalRoutineInvocationException,
            "3B" => Self::SavepointException,
            "3D" => Self::InvalidCatalogName,
            "3F" => Self::InvalidSchemaName,
            "40" => Self::TransactionRollback,
            "42" => Self::SyntaxErrorOrAccessRuleViolation,
            "44" => Self::WithCheckOptionViolation,
            "53" => Self::InsufficientResources,
            "54" => Self::ProgramLimitExceeded,
            "55" => Self::ObjectNotInPrerequisiteState,
            "57" => Self::OperatorIntervention,
            "58" => Self::SystemError,
            "72" => Self::SnapshotFailure,
            "F0" => Self::ConfigFileError,
            "HV" => Self::FdwError,
            "P0" => Self::PlpgsqlError,
            "XX" => Self::InternalError,
            _ => return None,
        };
        Some(c)
    }

    /// Classify the SQLSTATE carried by an error, if any.
    pub fn of_error(err: &SqError) -> Option<Self> {
        err.sql_state().and_then(Self::of)
    }

    /// Warnings and notices rather than errors.
    pub fn is_warning(self) -> bool {
        matches!(
            self,
            Self::SuccessfulCompletion | Self::Warning | Self::NoData
        )
    }
}

/// Whether `err` came from the database with exactly this SQLSTATE.
///
/// ```ignore
/// if pgsq::is_error(&err, &SqlState::UNIQUE_VIOLATION) {
///     return Ok(Created::AlreadyExists);
/// }
/// ```
pub fn is_error(err: &SqError, code: &SqlState) -> bool {
    err.sql_state() == Some(code.code())
}
