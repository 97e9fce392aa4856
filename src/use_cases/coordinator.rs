// Session coordinator: the battle lifecycle operations exposed to the HTTP layer.

use crate::domain::damage::roll_damage;
use crate::domain::{
    Battle, Clock, Dice, IdentityError, IdentityStore, JoinOutcome, MonsterSpec, Reward,
    RewardGrant, SessionError, calculate_reward,
};
use crate::use_cases::gates::PlayerGates;
use crate::use_cases::reconciliation::{
    PendingReconciliation, PendingWrite, ReconcileReport, ReconciliationQueue,
};
use crate::use_cases::registry::BattleRegistry;
use crate::use_cases::retry::RetryPolicy;
use crate::use_cases::types::{AttackResult, BattleDetail, BattleSummary, JoinResult};
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Stamina consumed by one attack.
pub const STAMINA_PER_ATTACK: u32 = 1;

/// Tunables applied to every battle the coordinator creates.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub max_players: usize,
    /// Nominal battle length used for the `time_left` countdown.
    pub battle_duration_seconds: u64,
    /// Retry budget for identity writes made after a committed battle mutation.
    pub retry: RetryPolicy,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_players: 20,
            battle_duration_seconds: 60 * 60,
            retry: RetryPolicy::default(),
        }
    }
}

/// Orchestrates join/attack/list/create against the battle registry.
///
/// Battle state transitions are committed under the per-battle lock; identity
/// collaborator calls happen after that lock is released. A committed transition is
/// never rolled back: failed follow-up writes are retried and, if still failing,
/// queued for reconciliation.
pub struct SessionCoordinator {
    registry: BattleRegistry,
    identity: Arc<dyn IdentityStore>,
    clock: Arc<dyn Clock>,
    dice: Arc<dyn Dice>,
    settings: SessionSettings,
    gates: PlayerGates,
    reconciliation: ReconciliationQueue,
}

impl SessionCoordinator {
    pub fn new(
        identity: Arc<dyn IdentityStore>,
        clock: Arc<dyn Clock>,
        dice: Arc<dyn Dice>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            registry: BattleRegistry::new(),
            identity,
            clock,
            dice,
            settings,
            gates: PlayerGates::new(),
            reconciliation: ReconciliationQueue::new(),
        }
    }

    /// Builds the requested monster, wraps it in a waiting battle and registers it.
    pub async fn create(&self, spec: MonsterSpec) -> String {
        let monster = spec.build(self.dice.as_ref());
        let battle_id = Uuid::new_v4().to_string();
        info!(
            battle_id = %battle_id,
            monster = %monster.name,
            max_health = monster.max_health,
            "battle created"
        );

        let battle = Battle::new(
            battle_id.clone(),
            monster,
            self.settings.max_players,
            self.clock.now_epoch_seconds(),
        );
        self.registry.insert(battle).await;
        battle_id
    }

    pub async fn join(&self, battle_id: &str, player_id: &str) -> Result<JoinResult, SessionError> {
        let handle = self
            .registry
            .get(battle_id)
            .await
            .ok_or(SessionError::BattleNotFound)?;
        let now = self.clock.now_epoch_seconds();

        let (outcome, players_joined, state) = {
            let mut battle = handle.lock().await;
            let outcome = battle.join(player_id, now);
            (outcome, battle.players_joined(), battle.state())
        };

        let newly_joined = match outcome {
            JoinOutcome::Joined => {
                info!(battle_id, player_id, players_joined, "player joined battle");
                true
            }
            JoinOutcome::AlreadyJoined => {
                debug!(battle_id, player_id, "player already in battle");
                false
            }
            JoinOutcome::Full => return Err(SessionError::BattleFull),
            JoinOutcome::NotJoinable => return Err(SessionError::BattleNotJoinable),
        };

        Ok(JoinResult {
            newly_joined,
            players_joined,
            state,
        })
    }

    /// Resolves one attack for `player_id`, debits stamina and rewards a finishing blow.
    pub async fn attack(
        &self,
        battle_id: &str,
        player_id: &str,
    ) -> Result<AttackResult, SessionError> {
        // One player's check/mutate/debit sequence never interleaves with itself.
        let _gate = self.gates.acquire(player_id).await;

        let stats = self
            .identity
            .get_stats(player_id)
            .await
            .map_err(read_error)?
            .ok_or(SessionError::UnknownPlayer)?;
        // Debits still waiting in the reconciliation queue are already spent.
        let owed = self.reconciliation.owed_stamina(player_id).await;
        let available = stats.stamina.saturating_sub(owed);
        if available < STAMINA_PER_ATTACK {
            debug!(player_id, stamina = stats.stamina, owed, "not enough stamina");
            return Err(SessionError::InsufficientStamina);
        }

        let handle = self
            .registry
            .get(battle_id)
            .await
            .ok_or(SessionError::BattleNotFound)?;
        let raw_damage = roll_damage(self.dice.as_ref(), stats.base_attack);
        let now = self.clock.now_epoch_seconds();

        let (outcome, finished_monster) = {
            let mut battle = handle.lock().await;
            let outcome = battle.resolve_attack(player_id, raw_damage, now)?;
            let finished_monster = outcome
                .battle_just_completed
                .then(|| battle.monster().clone());
            (outcome, finished_monster)
        };
        debug!(
            battle_id,
            player_id,
            raw_damage,
            damage_applied = outcome.damage_applied,
            health_remaining = outcome.health_remaining,
            "attack resolved"
        );

        let mut reconciliation_pending = false;

        let debited = self
            .settings
            .retry
            .run("debit_stamina", || {
                self.identity.debit_stamina(player_id, STAMINA_PER_ATTACK)
            })
            .await;
        let stamina_remaining = match debited {
            Ok(remaining) => remaining.saturating_sub(owed),
            Err((error, attempts)) => {
                reconciliation_pending = true;
                let write = PendingWrite::StaminaDebit {
                    amount: STAMINA_PER_ATTACK,
                };
                self.defer(battle_id, player_id, write, &error, attempts).await;
                available - STAMINA_PER_ATTACK
            }
        };

        let mut reward = Reward::default();
        if let Some(monster) = finished_monster {
            reward = calculate_reward(&monster, outcome.damage_applied);
            info!(
                battle_id,
                player_id,
                damage_applied = outcome.damage_applied,
                experience = reward.experience,
                coins = reward.coins,
                "battle completed by finishing blow"
            );

            let grant = RewardGrant {
                battle_id: battle_id.to_string(),
                experience: reward.experience,
                coins: reward.coins,
            };
            let credited = self
                .settings
                .retry
                .run("credit_rewards", || {
                    self.identity.credit_rewards(player_id, &grant)
                })
                .await;
            if let Err((error, attempts)) = credited {
                reconciliation_pending = true;
                let write = PendingWrite::RewardCredit(grant);
                self.defer(battle_id, player_id, write, &error, attempts).await;
            }
        }

        Ok(AttackResult {
            damage_dealt: outcome.damage_applied,
            monster_health_remaining: outcome.health_remaining,
            stamina_remaining,
            experience_gained: reward.experience,
            coins_gained: reward.coins,
            battle_completed: outcome.battle_just_completed,
            reconciliation_pending,
        })
    }

    /// Battles that still accept joins, with `player_id`'s contribution if given.
    pub async fn list_joinable(&self, player_id: Option<&str>) -> Vec<BattleSummary> {
        let now = self.clock.now_epoch_seconds();
        self.registry
            .joinable()
            .await
            .into_iter()
            .map(|battle| BattleSummary {
                id: battle.id().to_string(),
                state: battle.state(),
                players_joined: battle.players_joined(),
                max_players: battle.max_players(),
                time_left: battle.time_left(now, self.settings.battle_duration_seconds),
                player_damage: player_id.map_or(0, |id| battle.contribution(id)),
                monster: battle.monster().clone(),
            })
            .collect()
    }

    /// Read-only snapshot of one battle, completed ones included.
    pub async fn battle(&self, battle_id: &str) -> Result<BattleDetail, SessionError> {
        let handle = self
            .registry
            .get(battle_id)
            .await
            .ok_or(SessionError::BattleNotFound)?;
        let battle = handle.lock().await.clone();
        let time_left = battle.time_left(
            self.clock.now_epoch_seconds(),
            self.settings.battle_duration_seconds,
        );
        Ok(BattleDetail { battle, time_left })
    }

    pub async fn pending_reconciliations(&self) -> Vec<PendingReconciliation> {
        self.reconciliation.snapshot().await
    }

    /// Retries every deferred identity write once.
    ///
    /// Transient failures stay queued for the next sweep. Any other failure can never
    /// succeed on retry, so the item is dropped and logged.
    pub async fn reconcile_pending(&self) -> ReconcileReport {
        let items = self.reconciliation.drain().await;
        let mut report = ReconcileReport::default();
        if items.is_empty() {
            return report;
        }

        let mut unresolved = Vec::new();
        for mut item in items {
            let result = match &item.write {
                PendingWrite::StaminaDebit { amount } => self
                    .identity
                    .debit_stamina(&item.player_id, *amount)
                    .await
                    .map(|_| ()),
                PendingWrite::RewardCredit(grant) => {
                    self.identity.credit_rewards(&item.player_id, grant).await
                }
            };
            item.attempts += 1;

            match result {
                Ok(()) => {
                    report.resolved += 1;
                    info!(
                        reconciliation_id = item.id,
                        battle_id = %item.battle_id,
                        player_id = %item.player_id,
                        write = item.write.label(),
                        "deferred write reconciled"
                    );
                }
                Err(error) if error.is_transient() => {
                    item.last_error = error.to_string();
                    unresolved.push(item);
                }
                Err(error) => {
                    report.dropped += 1;
                    error!(
                        reconciliation_id = item.id,
                        battle_id = %item.battle_id,
                        player_id = %item.player_id,
                        write = item.write.label(),
                        attempts = item.attempts,
                        error = %error,
                        "dropping deferred write that cannot succeed"
                    );
                }
            }
        }

        report.still_pending = unresolved.len();
        self.reconciliation.requeue(unresolved).await;
        report
    }

    async fn defer(
        &self,
        battle_id: &str,
        player_id: &str,
        write: PendingWrite,
        error: &IdentityError,
        attempts: u32,
    ) {
        let label = write.label();
        let reconciliation_id = self
            .reconciliation
            .record(
                battle_id,
                player_id,
                write,
                error.to_string(),
                attempts,
                self.clock.now_epoch_seconds(),
            )
            .await;
        error!(
            reconciliation_id,
            battle_id,
            player_id,
            write = label,
            attempts,
            error = %error,
            "identity write deferred to reconciliation"
        );
    }
}

fn read_error(error: IdentityError) -> SessionError {
    match error {
        IdentityError::UnknownPlayer => SessionError::UnknownPlayer,
        IdentityError::InsufficientStamina => SessionError::InsufficientStamina,
        IdentityError::Unavailable(_) => SessionError::IdentityUnavailable,
    }
}
