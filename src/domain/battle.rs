// Battle aggregate: one shared encounter against a single monster.

use crate::domain::errors::BattleError;
use crate::domain::monster::Monster;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleState {
    Waiting,
    Active,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    AlreadyJoined,
    Full,
    NotJoinable,
}

/// Result of a single resolved attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackOutcome {
    pub damage_applied: u64,
    pub health_remaining: u64,
    /// True for exactly one attack per battle: the one that brought health to zero.
    pub battle_just_completed: bool,
}

/// Mutable battle state. All mutation goes through [`Battle::join`] and
/// [`Battle::resolve_attack`]; callers are responsible for serializing access.
#[derive(Debug, Clone)]
pub struct Battle {
    id: String,
    monster: Monster,
    state: BattleState,
    // Join order is kept for stable listings.
    joined_players: Vec<String>,
    max_players: usize,
    created_at: u64,
    start_time: Option<u64>,
    end_time: Option<u64>,
    total_damage_dealt: u64,
    contributions: HashMap<String, u64>,
}

impl Battle {
    pub fn new(id: String, monster: Monster, max_players: usize, created_at: u64) -> Self {
        Self {
            id,
            monster,
            state: BattleState::Waiting,
            joined_players: Vec::new(),
            max_players,
            created_at,
            start_time: None,
            end_time: None,
            total_damage_dealt: 0,
            contributions: HashMap::new(),
        }
    }

    /// Add a player. The first join of a waiting battle activates it.
    pub fn join(&mut self, player_id: &str, now: u64) -> JoinOutcome {
        if self.state == BattleState::Completed {
            return JoinOutcome::NotJoinable;
        }
        if self.has_player(player_id) {
            return JoinOutcome::AlreadyJoined;
        }
        if self.joined_players.len() >= self.max_players {
            return JoinOutcome::Full;
        }

        self.joined_players.push(player_id.to_string());
        if self.state == BattleState::Waiting {
            self.state = BattleState::Active;
            self.start_time = Some(now);
        }
        JoinOutcome::Joined
    }

    /// Apply one already-rolled attack: clamp, attribute, and flip to completed on a kill.
    pub fn resolve_attack(
        &mut self,
        player_id: &str,
        raw_damage: u64,
        now: u64,
    ) -> Result<AttackOutcome, BattleError> {
        if self.state != BattleState::Active {
            return Err(BattleError::NotActive);
        }
        if !self.has_player(player_id) {
            return Err(BattleError::NotJoined);
        }

        let damage_applied = self.monster.apply_damage(raw_damage);
        self.total_damage_dealt += damage_applied;
        *self
            .contributions
            .entry(player_id.to_string())
            .or_insert(0) += damage_applied;

        let battle_just_completed = self.monster.is_defeated();
        if battle_just_completed {
            self.state = BattleState::Completed;
            self.end_time = Some(now);
        }

        Ok(AttackOutcome {
            damage_applied,
            health_remaining: self.monster.current_health(),
            battle_just_completed,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn monster(&self) -> &Monster {
        &self.monster
    }

    pub fn state(&self) -> BattleState {
        self.state
    }

    pub fn joined_players(&self) -> &[String] {
        &self.joined_players
    }

    pub fn players_joined(&self) -> usize {
        self.joined_players.len()
    }

    pub fn max_players(&self) -> usize {
        self.max_players
    }

    pub fn has_player(&self, player_id: &str) -> bool {
        self.joined_players.iter().any(|id| id == player_id)
    }

    pub fn is_joinable(&self) -> bool {
        self.state != BattleState::Completed
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn start_time(&self) -> Option<u64> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<u64> {
        self.end_time
    }

    pub fn total_damage_dealt(&self) -> u64 {
        self.total_damage_dealt
    }

    pub fn contributions(&self) -> &HashMap<String, u64> {
        &self.contributions
    }

    pub fn contribution(&self, player_id: &str) -> u64 {
        self.contributions.get(player_id).copied().unwrap_or(0)
    }

    /// Seconds left of `duration` once the battle has started; `None` while waiting.
    pub fn time_left(&self, now: u64, duration: u64) -> Option<u64> {
        self.start_time
            .map(|start| duration.saturating_sub(now.saturating_sub(start)))
    }
}
