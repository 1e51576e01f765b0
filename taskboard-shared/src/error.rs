/// Errors returned by the service operations
///
/// Every operation either completes fully or fails with one of these before
/// touching the store.

use crate::auth::authorization::DenyReason;
use crate::store::StoreError;

/// Error type for service operations
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Caller identity did not resolve to a user
    #[error("Authentication required: {0}")]
    Authentication(String),

    /// Caller resolved but lacks the required role or relation
    #[error("Not authorized: {0}")]
    Authorization(String),

    /// Referenced task or user does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Referenced record exists but violates a constraint
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Storage failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub fn task_not_found(id: uuid::Uuid) -> Self {
        ServiceError::NotFound(format!("task {} does not exist", id))
    }

    pub fn user_not_found(id: uuid::Uuid) -> Self {
        ServiceError::NotFound(format!("user {} does not exist", id))
    }
}

impl From<DenyReason> for ServiceError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::Unauthenticated => ServiceError::Authentication(reason.to_string()),
            DenyReason::AdminRequired(_)
            | DenyReason::NotAssignee
            | DenyReason::MissingTarget(_) => ServiceError::Authorization(reason.to_string()),
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Store(StoreError::Database(err))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::authorization::Action;

    #[test]
    fn test_deny_reason_mapping() {
        assert!(matches!(
            ServiceError::from(DenyReason::Unauthenticated),
            ServiceError::Authentication(_)
        ));
        assert!(matches!(
            ServiceError::from(DenyReason::AdminRequired(Action::DeleteTask)),
            ServiceError::Authorization(_)
        ));
        assert!(matches!(
            ServiceError::from(DenyReason::NotAssignee),
            ServiceError::Authorization(_)
        ));
    }

    #[test]
    fn test_error_display() {
        let id = uuid::Uuid::nil();
        let err = ServiceError::task_not_found(id);
        assert_eq!(
            err.to_string(),
            "Not found: task 00000000-0000-0000-0000-000000000000 does not exist"
        );
    }
}
