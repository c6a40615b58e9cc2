//! Golden-image PR reconciliation
//!
//! Three-phase pattern:
//! 1. Gather - verify the trigger and query for an existing goldens PR (effectful, bounded)
//! 2. Plan - create a `ReconcilePlan` (pure, testable)
//! 3. Execute - create or update the PR and run side effects (effectful)

mod execute;
mod plan;

pub use execute::{ReconcileOutcome, execute_reconcile};
pub use plan::{
    GOLDENS_LABEL, GoldensContext, ReconcilePlan, ReconcileStep, compose_body, is_stale,
    plan_reconcile, pr_title,
};
