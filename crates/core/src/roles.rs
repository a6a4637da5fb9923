//! Well-known role and plan name constants.
//!
//! These must match the CHECK constraints in the `users` migration.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_LEARNER: &str = "learner";

pub const PLAN_FREE: &str = "free";
pub const PLAN_PAID: &str = "paid";

/// Returns `true` if `plan` is one of the known plan names.
pub fn is_valid_plan(plan: &str) -> bool {
    matches!(plan, PLAN_FREE | PLAN_PAID)
}
