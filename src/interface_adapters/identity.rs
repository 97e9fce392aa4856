// Identity store adapters: stamina, base attack and reward balances per player.

use crate::domain::{IdentityError, IdentityStore, PlayerStats, RewardGrant};
use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;

// Stats given to players the in-memory store has not seen yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerDefaults {
    pub stamina: u32,
    pub base_attack: u32,
    // Starting coin balance, same as the `player_stats.coins` column default.
    pub coins: u64,
}

impl Default for PlayerDefaults {
    fn default() -> Self {
        Self {
            stamina: 100,
            base_attack: 100,
            coins: 1_000,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct PlayerRecord {
    stamina: u32,
    base_attack: u32,
    experience: u64,
    coins: u64,
    credited_battles: HashSet<String>,
}

impl PlayerRecord {
    fn provisioned(defaults: PlayerDefaults) -> Self {
        Self {
            stamina: defaults.stamina,
            base_attack: defaults.base_attack,
            coins: defaults.coins,
            ..Self::default()
        }
    }
}

// In-memory identity store used when no database is configured.
#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    players: Mutex<HashMap<String, PlayerRecord>>,
    defaults: PlayerDefaults,
}

impl InMemoryIdentityStore {
    pub fn new(defaults: PlayerDefaults) -> Self {
        Self {
            players: Mutex::new(HashMap::new()),
            defaults,
        }
    }

    // Experience and coins credited so far, if the player exists.
    pub async fn balances(&self, player_id: &str) -> Option<(u64, u64)> {
        let players = self.players.lock().await;
        players
            .get(player_id)
            .map(|player| (player.experience, player.coins))
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn get_stats(&self, player_id: &str) -> Result<Option<PlayerStats>, IdentityError> {
        let mut players = self.players.lock().await;
        let player = players
            .entry(player_id.to_string())
            .or_insert_with(|| PlayerRecord::provisioned(self.defaults));
        Ok(Some(PlayerStats {
            stamina: player.stamina,
            base_attack: player.base_attack,
        }))
    }

    async fn debit_stamina(&self, player_id: &str, amount: u32) -> Result<u32, IdentityError> {
        let mut players = self.players.lock().await;
        let player = players
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
        let mut players = self.players.lock().await;
        let player = players
            .get_mut(player_id)
            .ok_or(IdentityError::UnknownPlayer)?;
        if !player.credited_battles.insert(grant.battle_id.clone()) {
            return Ok(());
        }
        player.experience = player.experience.saturating_add(grant.experience);
        player.coins = player.coins.saturating_add(grant.coins);
        Ok(())
    }
}

// PostgreSQL-backed identity store over the `player_stats` and `reward_credits` tables.
#[derive(Clone)]
pub struct PostgresIdentityStore {
    pub db: PgPool,
}

fn unavailable(err: sqlx::Error) -> IdentityError {
    IdentityError::Unavailable(err.to_string())
}

fn to_u32(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

#[async_trait]
impl IdentityStore for PostgresIdentityStore {
    async fn get_stats(&self, player_id: &str) -> Result<Option<PlayerStats>, IdentityError> {
        let row: Option<(i32, i32)> = sqlx::query_as(
            r#"
            SELECT stamina, base_attack
            FROM player_stats
            WHERE player_id = $1
            "#,
        )
        .bind(player_id)
        .fetch_optional(&self.db)
        .await
        .map_err(unavailable)?;

        Ok(row.map(|(stamina, base_attack)| PlayerStats {
            stamina: to_u32(stamina),
            base_attack: to_u32(base_attack),
        }))
    }

    async fn debit_stamina(&self, player_id: &str, amount: u32) -> Result<u32, IdentityError> {
        let amount = i32::try_from(amount).map_err(|_| IdentityError::InsufficientStamina)?;

        // The stamina guard and the decrement are one statement.
        let remaining: Option<(i32,)> = sqlx::query_as(
            r#"
            UPDATE player_stats
            SET stamina = stamina - $2
            WHERE player_id = $1 AND stamina >= $2
            RETURNING stamina
            "#,
        )
        .bind(player_id)
        .bind(amount)
        .fetch_optional(&self.db)
        .await
        .map_err(unavailable)?;

        if let Some((stamina,)) = remaining {
            return Ok(to_u32(stamina));
        }

        let exists: Option<(i32,)> =
            sqlx::query_as("SELECT 1 FROM player_stats WHERE player_id = $1")
                .bind(player_id)
                .fetch_optional(&self.db)
                .await
                .map_err(unavailable)?;
        match exists {
            Some(_) => Err(IdentityError::InsufficientStamina),
            None => Err(IdentityError::UnknownPlayer),
        }
    }

    async fn credit_rewards(
        &self,
        player_id: &str,
        grant: &RewardGrant,
    ) -> Result<(), IdentityError> {
        let experience = i64::try_from(grant.experience).unwrap_or(i64::MAX);
        let coins = i64::try_from(grant.coins).unwrap_or(i64::MAX);

        let mut tx = self.db.begin().await.map_err(unavailable)?;

        let exists: Option<(i32,)> =
            sqlx::query_as("SELECT 1 FROM player_stats WHERE player_id = $1 FOR UPDATE")
                .bind(player_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(unavailable)?;
        if exists.is_none() {
            return Err(IdentityError::UnknownPlayer);
        }

        // One row per (battle, player); a replayed credit inserts nothing.
        let inserted = sqlx::query(
            r#"
            INSERT INTO reward_credits (battle_id, player_id, experience, coins)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (battle_id, player_id) DO NOTHING
            "#,
        )
        .bind(&grant.battle_id)
        .bind(player_id)
        .bind(experience)
        .bind(coins)
        .execute(&mut *tx)
        .await
        .map_err(unavailable)?;

        if inserted.rows_affected() > 0 {
            sqlx::query(
                r#"
                UPDATE player_stats
                SET experience = experience + $2,
                    coins = coins + $3
                WHERE player_id = $1
                "#,
            )
            .bind(player_id)
            .bind(experience)
            .bind(coins)
            .execute(&mut *tx)
            .await
            .map_err(unavailable)?;
        }

        tx.commit().await.map_err(unavailable)?;
        Ok(())
    }
}
