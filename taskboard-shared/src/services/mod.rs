/// Business operations
///
/// Each operation takes the store and, where the outcome depends on who is
/// asking, the caller's email. The email is resolved to a user on every call
/// and the result is run through [`crate::auth::authorization::authorize`]
/// before anything is written.
///
/// - [`identity`]: sign-in, user lookup and employee removal
/// - [`tasks`]: task lifecycle
/// - [`dashboard`]: status counts and per-employee summaries

pub mod dashboard;
pub mod identity;
pub mod tasks;

use tracing::warn;

use crate::auth::authorization::{authorize, Action};
use crate::error::{ServiceError, ServiceResult};
use crate::models::task::Task;
use crate::models::user::User;
use crate::store::Store;

/// Looks up the caller by email; an unknown email is `None`, not an error
pub(crate) async fn resolve_caller(store: &dyn Store, email: &str) -> ServiceResult<Option<User>> {
    Ok(store.find_user_by_email(email).await?)
}

/// Runs the policy for one request, logging denials
pub(crate) fn guard(
    caller: Option<&User>,
    caller_email: &str,
    action: Action,
    target: Option<&Task>,
) -> ServiceResult<()> {
    authorize(caller, action, target).into_result().map_err(|reason| {
        warn!(caller = %caller_email, action = %action, %reason, "Request denied");
        ServiceError::from(reason)
    })
}

/// Resolves the caller and requires the policy to allow a target-free action
pub(crate) async fn require(
    store: &dyn Store,
    caller_email: &str,
    action: Action,
) -> ServiceResult<User> {
    let caller = resolve_caller(store, caller_email).await?;
    guard(caller.as_ref(), caller_email, action, None)?;

    caller.ok_or_else(|| ServiceError::Authentication(format!("unknown caller {}", caller_email)))
}
