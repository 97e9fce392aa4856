// Use cases: battle session orchestration over the domain rules.

pub mod coordinator;
pub mod gates;
pub mod reconciliation;
pub mod registry;
pub mod retry;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use coordinator::{STAMINA_PER_ATTACK, SessionCoordinator, SessionSettings};
pub use reconciliation::{PendingReconciliation, PendingWrite, ReconcileReport};
pub use retry::RetryPolicy;
pub use types::{AttackResult, BattleDetail, BattleSummary, JoinResult};
