// Collaborator writes that exhausted their retry budget after a committed battle mutation.

use crate::domain::RewardGrant;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingWrite {
    StaminaDebit { amount: u32 },
    RewardCredit(RewardGrant),
}

impl PendingWrite {
    pub fn label(&self) -> &'static str {
        match self {
            PendingWrite::StaminaDebit { .. } => "stamina_debit",
            PendingWrite::RewardCredit(_) => "reward_credit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReconciliation {
    pub id: u64,
    pub battle_id: String,
    pub player_id: String,
    pub write: PendingWrite,
    pub last_error: String,
    pub attempts: u32,
    pub recorded_at: u64,
}

/// Outcome of one reconciliation sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileReport {
    pub resolved: usize,
    pub still_pending: usize,
    pub dropped: usize,
}

/// In-memory queue of writes owed to the identity store.
#[derive(Debug, Default)]
pub struct ReconciliationQueue {
    next_id: AtomicU64,
    items: Mutex<Vec<PendingReconciliation>>,
}

impl ReconciliationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(
        &self,
        battle_id: &str,
        player_id: &str,
        write: PendingWrite,
        last_error: String,
        attempts: u32,
        recorded_at: u64,
    ) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let mut items = self.items.lock().await;
        items.push(PendingReconciliation {
            id,
            battle_id: battle_id.to_string(),
            player_id: player_id.to_string(),
            write,
            last_error,
            attempts,
            recorded_at,
        });
        id
    }

    pub async fn snapshot(&self) -> Vec<PendingReconciliation> {
        self.items.lock().await.clone()
    }

    /// Stamina still owed by `player_id` through queued debits.
    pub async fn owed_stamina(&self, player_id: &str) -> u32 {
        self.items
            .lock()
            .await
            .iter()
            .filter(|item| item.player_id == player_id)
            .map(|item| match item.write {
                PendingWrite::StaminaDebit { amount } => amount,
                PendingWrite::RewardCredit(_) => 0,
            })
            .fold(0, u32::saturating_add)
    }

    /// Remove every item so a sweep can work on them without holding the queue lock.
    pub async fn drain(&self) -> Vec<PendingReconciliation> {
        std::mem::take(&mut *self.items.lock().await)
    }

    /// Put unresolved items back, ahead of anything recorded during the sweep.
    pub async fn requeue(&self, mut unresolved: Vec<PendingReconciliation>) {
        if unresolved.is_empty() {
            return;
        }
        let mut items = self.items.lock().await;
        unresolved.append(&mut *items);
        *items = unresolved;
    }
}
