use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{
    Clock, Dice, IdentityError, IdentityStore, MonsterKind, MonsterTemplate, PlayerStats,
    RewardGrant,
};
use crate::use_cases::retry::RetryPolicy;

// Small fixed monster shared by domain and use-case tests.
pub(crate) fn template(max_health: u64) -> MonsterTemplate {
    MonsterTemplate {
        name: "Training Dummy".to_string(),
        kind: MonsterKind::Goblin,
        level: 1,
        max_health,
        attack: 10,
        defense: 10,
        magic: 10,
        experience_reward: 300,
        coin_reward: 120,
        drop_table: vec!["wooden-sword".to_string()],
    }
}

pub(crate) fn instant_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        initial_backoff: Duration::ZERO,
        max_backoff: Duration::ZERO,
    }
}

// Deterministic dice: always the lowest, the highest, or a fixed value clamped into range.
#[derive(Debug, Clone, Copy)]
pub(crate) enum TestDice {
    Low,
    High,
    Value(u64),
}

impl Dice for TestDice {
    fn roll_inclusive(&self, low: u64, high: u64) -> u64 {
        match self {
            TestDice::Low => low,
            TestDice::High => high,
            TestDice::Value(value) => (*value).clamp(low, high),
        }
    }
}

// Adjustable time source for deterministic use-case tests.
pub(crate) struct ManualClock(AtomicU64);

impl ManualClock {
    pub(crate) fn new(now: u64) -> Self {
        Self(AtomicU64::new(now))
    }

    pub(crate) fn advance(&self, seconds: u64) {
        self.0.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_epoch_seconds(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Default)]
struct TestPlayer {
    stamina: u32,
    base_attack: u32,
    experience: u64,
    coins: u64,
    credited_battles: HashSet<String>,
}

#[derive(Default)]
struct FailurePlan {
    reads: AtomicBool,
    debits_left: AtomicU32,
    credits_left: AtomicU32,
}

impl FailurePlan {
    fn take(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
    }
}

// Identity store fake that records applied credits and can fail on demand.
#[derive(Clone, Default)]
pub(crate) struct RecordingIdentityStore {
    players: Arc<Mutex<HashMap<String, TestPlayer>>>,
    failures: Arc<FailurePlan>,
    credits: Arc<Mutex<Vec<(String, RewardGrant)>>>,
    debit_calls: Arc<AtomicU32>,
}

impl RecordingIdentityStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_player(self, player_id: &str, stamina: u32, base_attack: u32) -> Self {
        {
            let mut guard = self.players.lock().expect("players mutex poisoned");
            guard.insert(
                player_id.to_string(),
                TestPlayer {
                    stamina,
                    base_attack,
                    ..TestPlayer::default()
                },
            );
        }
        self
    }

    pub(crate) fn remove_player(&self, player_id: &str) {
        let mut guard = self.players.lock().expect("players mutex poisoned");
        guard.remove(player_id);
    }

    // Stamina changed behind the coordinator's back, e.g. by another service.
    pub(crate) fn set_stamina(&self, player_id: &str, stamina: u32) {
        let mut guard = self.players.lock().expect("players mutex poisoned");
        if let Some(player) = guard.get_mut(player_id) {
            player.stamina = stamina;
        }
    }

    pub(crate) fn fail_reads(&self, fail: bool) {
        self.failures.reads.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_next_debits(&self, count: u32) {
        self.failures.debits_left.store(count, Ordering::SeqCst);
    }

    pub(crate) fn fail_next_credits(&self, count: u32) {
        self.failures.credits_left.store(count, Ordering::SeqCst);
    }

    pub(crate) fn stamina(&self, player_id: &str) -> Option<u32> {
        let guard = self.players.lock().expect("players mutex poisoned");
        guard.get(player_id).map(|player| player.stamina)
    }

    pub(crate) fn rewards(&self, player_id: &str) -> Option<(u64, u64)> {
        let guard = self.players.lock().expect("players mutex poisoned");
        guard
            .get(player_id)
            .map(|player| (player.experience, player.coins))
    }

    // Credits that were actually applied, in order.
    pub(crate) fn credits(&self) -> Vec<(String, RewardGrant)> {
        self.credits.lock().expect("credits mutex poisoned").clone()
    }

    // Every debit attempt, failed ones included.
    pub(crate) fn debit_calls(&self) -> u32 {
        self.debit_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityStore for RecordingIdentityStore {
    async fn get_stats(&self, player_id: &str) -> Result<Option<PlayerStats>, IdentityError> {
        if self.failures.reads.load(Ordering::SeqCst) {
            return Err(IdentityError::Unavailable("get_stats failed".to_string()));
        }

        let guard = self.players.lock().expect("players mutex poisoned");
        Ok(guard.get(player_id).map(|player| PlayerStats {
            stamina: player.stamina,
            base_attack: player.base_attack,
        }))
    }

    async fn debit_stamina(&self, player_id: &str, amount: u32) -> Result<u32, IdentityError> {
        self.debit_calls.fetch_add(1, Ordering::SeqCst);
        if FailurePlan::take(&self.failures.debits_left) {
            return Err(IdentityError::Unavailable("debit failed".to_string()));
        }

        let mut guard = self.players.lock().expect("players mutex poisoned");
        let player = guard
            .get_mut(player_id)
            .ok_or(IdentityError::UnknownPlayer)?;
        if player.stamina < amount {
            return Err(IdentityError::InsufficientStamina);
        }
        player.stamina -= amount;
        Ok(player.stamina)
    }

    async fn credit_rewards(
        &self,
        player_id: &str,
        grant: &RewardGrant,
    ) -> Result<(), IdentityError> {
        if FailurePlan::take(&self.failures.credits_left) {
            return Err(IdentityError::Unavailable("credit failed".to_string()));
        }

        let mut guard = self.players.lock().expect("players mutex poisoned");
        let player = guard
            .get_mut(player_id)
            .ok_or(IdentityError::UnknownPlayer)?;
        if !player.credited_battles.insert(grant.battle_id.clone()) {
            return Ok(());
        }
        player.experience += grant.experience;
        player.coins += grant.coins;
        self.credits
            .lock()
            .expect("credits mutex poisoned")
            .push((player_id.to_string(), grant.clone()));
        Ok(())
    }
}
