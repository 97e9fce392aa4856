// Use-case level outputs for battle sessions.

use crate::domain::{Battle, BattleState, Monster};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackResult {
    pub damage_dealt: u64,
    pub monster_health_remaining: u64,
    pub stamina_remaining: u32,
    pub experience_gained: u64,
    pub coins_gained: u64,
    pub battle_completed: bool,
    // Set when a stamina debit or reward credit was deferred to reconciliation.
    pub reconciliation_pending: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinResult {
    pub newly_joined: bool,
    pub players_joined: usize,
    pub state: BattleState,
}

#[derive(Debug, Clone)]
pub struct BattleSummary {
    pub id: String,
    pub monster: Monster,
    pub state: BattleState,
    pub players_joined: usize,
    pub max_players: usize,
    pub time_left: Option<u64>,
    pub player_damage: u64,
}

#[derive(Debug, Clone)]
pub struct BattleDetail {
    pub battle: Battle,
    pub time_left: Option<u64>,
}
