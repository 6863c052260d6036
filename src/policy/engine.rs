//! Rule table and evaluation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::identity::domain::{Role, UserId};

/// Operation a caller asks to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Create a new task.
    CreateTask,
    /// Read one task.
    ReadTask,
    /// List tasks.
    ReadTaskList,
    /// Edit task fields other than status.
    UpdateTaskFields,
    /// Delete a task.
    DeleteTask,
    /// Move a task to another status.
    ChangeStatus,
}

impl Action {
    /// Every action, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::CreateTask,
        Self::ReadTask,
        Self::ReadTaskList,
        Self::UpdateTaskFields,
        Self::DeleteTask,
        Self::ChangeStatus,
    ];

    /// Returns the canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateTask => "create_task",
            Self::ReadTask => "read_task",
            Self::ReadTaskList => "read_task_list",
            Self::UpdateTaskFields => "update_task_fields",
            Self::DeleteTask => "delete_task",
            Self::ChangeStatus => "change_status",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Condition under which a rule allows its action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grant {
    /// Allowed regardless of ownership.
    Always,
    /// Allowed when the requester is the task's responsible user.
    IfResponsible,
    /// Allowed when the requester created the task.
    IfCreator,
}

/// One entry of the permission table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyRule {
    /// Role the rule applies to.
    pub role: Role,
    /// Action the rule applies to.
    pub action: Action,
    /// Ownership qualifier.
    pub grant: Grant,
}

const fn rule(role: Role, action: Action, grant: Grant) -> PolicyRule {
    PolicyRule {
        role,
        action,
        grant,
    }
}

/// The permission table. At most one rule exists per `(role, action)`.
pub const POLICY_RULES: &[PolicyRule] = &[
    rule(Role::Admin, Action::CreateTask, Grant::Always),
    rule(Role::Admin, Action::ReadTask, Grant::Always),
    rule(Role::Admin, Action::ReadTaskList, Grant::Always),
    rule(Role::Admin, Action::UpdateTaskFields, Grant::Always),
    rule(Role::Admin, Action::DeleteTask, Grant::Always),
    rule(Role::Admin, Action::ChangeStatus, Grant::Always),
    rule(Role::Manager, Action::CreateTask, Grant::Always),
    rule(Role::Manager, Action::ReadTask, Grant::Always),
    rule(Role::Manager, Action::ReadTaskList, Grant::Always),
    rule(Role::Manager, Action::UpdateTaskFields, Grant::Always),
    rule(Role::Manager, Action::ChangeStatus, Grant::Always),
    rule(Role::Manager, Action::DeleteTask, Grant::IfCreator),
    rule(Role::Developer, Action::ReadTask, Grant::Always),
    rule(Role::Developer, Action::ReadTaskList, Grant::Always),
    rule(Role::Developer, Action::UpdateTaskFields, Grant::IfResponsible),
    rule(Role::Developer, Action::ChangeStatus, Grant::IfResponsible),
];

/// Ownership facts about the resource an action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceContext {
    requester: UserId,
    responsible_user_id: Option<UserId>,
    creator_id: Option<UserId>,
}

impl ResourceContext {
    /// Creates a context with no ownership facts, as for collection actions.
    #[must_use]
    pub const fn new(requester: UserId) -> Self {
        Self {
            requester,
            responsible_user_id: None,
            creator_id: None,
        }
    }

    /// Records the target task's responsible user, if it has one.
    #[must_use]
    pub const fn with_responsible_user(mut self, user_id: Option<UserId>) -> Self {
        self.responsible_user_id = user_id;
        self
    }

    /// Records the target task's creator.
    #[must_use]
    pub const fn with_creator(mut self, user_id: UserId) -> Self {
        self.creator_id = Some(user_id);
        self
    }

    /// Returns the requesting user.
    #[must_use]
    pub const fn requester(&self) -> UserId {
        self.requester
    }
}

/// Why a decision was reached. Kept internal to logs; never sent to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionReason {
    /// An unconditional rule allowed the action.
    RoleGrant,
    /// The requester is the responsible user.
    ResponsibleUser,
    /// The requester created the task.
    TaskCreator,
    /// The rule requires responsibility the requester lacks.
    NotResponsible,
    /// The rule requires authorship the requester lacks.
    NotCreator,
    /// No rule exists for the role and action.
    NoMatchingRule,
}

/// Outcome of a policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionDecision {
    allowed: bool,
    reason: DecisionReason,
}

impl PermissionDecision {
    const fn allow(reason: DecisionReason) -> Self {
        Self {
            allowed: true,
            reason,
        }
    }

    const fn deny(reason: DecisionReason) -> Self {
        Self {
            allowed: false,
            reason,
        }
    }

    /// Returns `true` when the action is allowed.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        self.allowed
    }

    /// Returns the reason for the decision.
    #[must_use]
    pub const fn reason(&self) -> DecisionReason {
        self.reason
    }
}

/// Returns the grant for `(role, action)`, if the table has a rule.
#[must_use]
pub fn rule_for(role: Role, action: Action) -> Option<Grant> {
    POLICY_RULES
        .iter()
        .find(|entry| entry.role == role && entry.action == action)
        .map(|entry| entry.grant)
}

/// Decides whether `role` may perform `action` on the described resource.
///
/// Total and pure: every input yields a decision and nothing is mutated.
#[must_use]
pub fn authorize(role: Role, action: Action, context: &ResourceContext) -> PermissionDecision {
    let Some(grant) = rule_for(role, action) else {
        return PermissionDecision::deny(DecisionReason::NoMatchingRule);
    };

    match grant {
        Grant::Always => PermissionDecision::allow(DecisionReason::RoleGrant),
        Grant::IfResponsible => {
            if context.responsible_user_id == Some(context.requester) {
                PermissionDecision::allow(DecisionReason::ResponsibleUser)
            } else {
                PermissionDecision::deny(DecisionReason::NotResponsible)
            }
        }
        Grant::IfCreator => {
            if context.creator_id == Some(context.requester) {
                PermissionDecision::allow(DecisionReason::TaskCreator)
            } else {
                PermissionDecision::deny(DecisionReason::NotCreator)
            }
        }
    }
}
