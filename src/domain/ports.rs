use async_trait::async_trait;

use crate::domain::errors::IdentityError;

// Combat-relevant stats read from the identity collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerStats {
    pub stamina: u32,
    pub base_attack: u32,
}

// Reward owed to the player who landed a finishing blow.
// The battle id doubles as the idempotency key for the credit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardGrant {
    pub battle_id: String,
    pub experience: u64,
    pub coins: u64,
}

// Port for the player identity/stamina/reward store.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn get_stats(&self, player_id: &str) -> Result<Option<PlayerStats>, IdentityError>;
    // Atomic per player; returns the stamina left after the debit.
    async fn debit_stamina(&self, player_id: &str, amount: u32) -> Result<u32, IdentityError>;
    // Atomic, and a no-op when the same grant was already applied.
    async fn credit_rewards(&self, player_id: &str, grant: &RewardGrant)
    -> Result<(), IdentityError>;
}

// Port for retrieving the current time.
pub trait Clock: Send + Sync {
    fn now_epoch_seconds(&self) -> u64;
}

// Port for uniform integer draws, injected so rolls are reproducible in tests.
pub trait Dice: Send + Sync {
    // Uniform draw from `low..=high`; callers guarantee `low <= high`.
    fn roll_inclusive(&self, low: u64, high: u64) -> u64;
}
