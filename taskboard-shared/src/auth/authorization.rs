/// Authorization policy
///
/// All permission rules live in [`authorize`], a pure function of the
/// resolved caller, the requested action and (for task-specific actions) the
/// target task. Service operations call it before every mutation; nothing
/// here touches storage.
///
/// # Policy
///
/// | Action                              | Allowed caller                     |
/// |-------------------------------------|------------------------------------|
/// | CreateTask                          | admin                              |
/// | EditTask / AssignTask / DeleteTask  | admin                              |
/// | UpdateTaskStatus                    | admin, or the task's assignee      |
/// | ViewTask                            | admin, or the task's assignee      |
/// | DeleteEmployee / ViewTeam           | admin                              |
///
/// A caller that did not resolve to a user is always denied with
/// [`DenyReason::Unauthenticated`].
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::authorization::{authorize, Action, Decision, DenyReason};
///
/// let decision = authorize(None, Action::CreateTask, None);
/// assert_eq!(decision, Decision::Deny(DenyReason::Unauthenticated));
/// ```

use std::fmt;

use uuid::Uuid;

use crate::models::task::Task;
use crate::models::user::User;

/// Operations subject to the guard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    CreateTask,
    EditTask,
    AssignTask,
    DeleteTask,
    UpdateTaskStatus,
    ViewTask,
    DeleteEmployee,

    /// Team-wide views such as per-employee summaries
    ViewTeam,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::CreateTask => "create tasks",
            Action::EditTask => "edit tasks",
            Action::AssignTask => "assign tasks",
            Action::DeleteTask => "delete tasks",
            Action::UpdateTaskStatus => "update task status",
            Action::ViewTask => "view this task",
            Action::DeleteEmployee => "delete employees",
            Action::ViewTeam => "view team summaries",
        }
    }

    /// Whether the action is evaluated against a specific task
    pub fn needs_target(&self) -> bool {
        matches!(self, Action::UpdateTaskStatus | Action::ViewTask)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a request was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DenyReason {
    /// Caller identity did not resolve to a user
    #[error("caller is not a known user")]
    Unauthenticated,

    /// Action is reserved for admins
    #[error("only admins can {0}")]
    AdminRequired(Action),

    /// Caller is neither an admin nor the task's assignee
    #[error("not authorized to update this task")]
    NotAssignee,

    /// A task-specific action was evaluated without its task
    #[error("no target task supplied to {0}")]
    MissingTarget(Action),
}

/// Outcome of a policy evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Converts to a `Result` for use with `?`
    pub fn into_result(self) -> Result<(), DenyReason> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(reason),
        }
    }
}

/// Evaluates the policy table for one request
pub fn authorize(caller: Option<&User>, action: Action, target: Option<&Task>) -> Decision {
    let Some(caller) = caller else {
        return Decision::Deny(DenyReason::Unauthenticated);
    };

    if caller.is_admin() {
        return Decision::Allow;
    }

    if !action.needs_target() {
        return Decision::Deny(DenyReason::AdminRequired(action));
    }

    match target {
        Some(task) if task.assigned_to == caller.id => Decision::Allow,
        Some(_) if action == Action::ViewTask => Decision::Deny(DenyReason::AdminRequired(action)),
        Some(_) => Decision::Deny(DenyReason::NotAssignee),
        None => Decision::Deny(DenyReason::MissingTarget(action)),
    }
}

/// Which tasks a caller may list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskScope {
    /// Every task in the store
    All,

    /// Only tasks assigned to this user
    AssignedTo(Uuid),

    /// Nothing (caller did not resolve)
    Nothing,
}

/// Read scope for task listings and statistics
///
/// Admins see everything, employees see their own tasks and an unresolved
/// caller sees nothing. Reads never fail on identity; they come back empty.
pub fn task_scope(caller: Option<&User>) -> TaskScope {
    match caller {
        None => TaskScope::Nothing,
        Some(user) if user.is_admin() => TaskScope::All,
        Some(user) => TaskScope::AssignedTo(user.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::{CreateTask, TaskPriority};
    use crate::models::user::{CreateUser, UserRole};
    use chrono::Utc;

    fn user(role: UserRole) -> User {
        CreateUser::new(format!("{}@example.com", Uuid::new_v4()), "Someone", role)
            .into_user(Utc::now())
    }

    fn task_for(assignee: &User, admin: &User) -> Task {
        CreateTask {
            title: "t".to_string(),
            description: String::new(),
            assigned_to: assignee.id,
            assigned_by: admin.id,
            priority: TaskPriority::Low,
            due_date: None,
        }
        .into_task(Utc::now())
    }

    const ADMIN_ONLY: [Action; 6] = [
        Action::CreateTask,
        Action::EditTask,
        Action::AssignTask,
        Action::DeleteTask,
        Action::DeleteEmployee,
        Action::ViewTeam,
    ];

    #[test]
    fn test_unresolved_caller_is_always_denied() {
        let admin = user(UserRole::Admin);
        let task = task_for(&admin, &admin);

        for action in ADMIN_ONLY.into_iter().chain([Action::UpdateTaskStatus, Action::ViewTask]) {
            assert_eq!(
                authorize(None, action, Some(&task)),
                Decision::Deny(DenyReason::Unauthenticated)
            );
        }
    }

    #[test]
    fn test_admin_is_allowed_everything() {
        let admin = user(UserRole::Admin);
        let employee = user(UserRole::Employee);
        let task = task_for(&employee, &admin);

        for action in ADMIN_ONLY {
            assert!(authorize(Some(&admin), action, None).is_allowed());
        }
        assert!(authorize(Some(&admin), Action::UpdateTaskStatus, Some(&task)).is_allowed());
        assert!(authorize(Some(&admin), Action::ViewTask, Some(&task)).is_allowed());
    }

    #[test]
    fn test_employee_denied_admin_actions() {
        let employee = user(UserRole::Employee);

        for action in ADMIN_ONLY {
            assert_eq!(
                authorize(Some(&employee), action, None),
                Decision::Deny(DenyReason::AdminRequired(action))
            );
        }
    }

    #[test]
    fn test_assignee_may_update_status() {
        let admin = user(UserRole::Admin);
        let assignee = user(UserRole::Employee);
        let other = user(UserRole::Employee);
        let task = task_for(&assignee, &admin);

        assert!(authorize(Some(&assignee), Action::UpdateTaskStatus, Some(&task)).is_allowed());
        assert_eq!(
            authorize(Some(&other), Action::UpdateTaskStatus, Some(&task)),
            Decision::Deny(DenyReason::NotAssignee)
        );
        assert_eq!(
            authorize(Some(&assignee), Action::UpdateTaskStatus, None),
            Decision::Deny(DenyReason::MissingTarget(Action::UpdateTaskStatus))
        );
    }

    #[test]
    fn test_view_task_scoped_to_assignee() {
        let admin = user(UserRole::Admin);
        let assignee = user(UserRole::Employee);
        let other = user(UserRole::Employee);
        let task = task_for(&assignee, &admin);

        assert!(authorize(Some(&assignee), Action::ViewTask, Some(&task)).is_allowed());
        assert!(!authorize(Some(&other), Action::ViewTask, Some(&task)).is_allowed());
    }

    #[test]
    fn test_assignee_still_cannot_edit() {
        let admin = user(UserRole::Admin);
        let assignee = user(UserRole::Employee);
        let task = task_for(&assignee, &admin);

        for action in [Action::EditTask, Action::AssignTask, Action::DeleteTask] {
            assert!(!authorize(Some(&assignee), action, Some(&task)).is_allowed());
        }
    }

    #[test]
    fn test_task_scope() {
        let admin = user(UserRole::Admin);
        let employee = user(UserRole::Employee);

        assert_eq!(task_scope(None), TaskScope::Nothing);
        assert_eq!(task_scope(Some(&admin)), TaskScope::All);
        assert_eq!(task_scope(Some(&employee)), TaskScope::AssignedTo(employee.id));
    }

    #[test]
    fn test_deny_reason_display() {
        assert_eq!(
            DenyReason::AdminRequired(Action::CreateTask).to_string(),
            "only admins can create tasks"
        );
        assert!(DenyReason::NotAssignee.to_string().contains("not authorized"));
    }

    #[test]
    fn test_needs_target() {
        assert!(Action::UpdateTaskStatus.needs_target());
        assert!(Action::ViewTask.needs_target());
        assert!(!Action::CreateTask.needs_target());
    }
}
