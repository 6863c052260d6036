//! Role-based permission policy.
//!
//! Decisions come from one static table of [`PolicyRule`]s keyed by
//! `(Role, Action)`. A rule may be qualified by task ownership. A pair with
//! no rule is denied, so a permission is granted only by listing it.

mod engine;

pub use engine::{
    Action, DecisionReason, Grant, POLICY_RULES, PermissionDecision, PolicyRule, ResourceContext,
    authorize, rule_for,
};
