use crate::domain::{BattleState, Monster, MonsterKind, MonsterSpec, MonsterTemplate};
use crate::use_cases::{
    AttackResult, BattleDetail, BattleSummary, JoinResult, PendingReconciliation, PendingWrite,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct PlayerRequest {
    // Acting player; must be non-blank.
    pub player_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListBattlesQuery {
    // Caller whose contribution is reported per battle.
    pub player_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateBattleRequest {
    #[serde(default)]
    pub monster: MonsterSpecRequest,
}

#[derive(Debug, Default, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MonsterSpecRequest {
    #[default]
    Random,
    Fixed(FixedMonsterRequest),
}

#[derive(Debug, Deserialize)]
pub struct FixedMonsterRequest {
    pub name: String,
    pub kind: MonsterKind,
    pub level: u32,
    pub max_health: u64,
    pub attack: u32,
    pub defense: u32,
    pub magic: u32,
    pub experience_reward: u64,
    pub coin_reward: u64,
    #[serde(default)]
    pub drop_table: Vec<String>,
}

impl From<MonsterSpecRequest> for MonsterSpec {
    fn from(request: MonsterSpecRequest) -> Self {
        match request {
            MonsterSpecRequest::Random => MonsterSpec::Random,
            MonsterSpecRequest::Fixed(fixed) => MonsterSpec::Fixed(MonsterTemplate {
                name: fixed.name,
                kind: fixed.kind,
                level: fixed.level,
                max_health: fixed.max_health,
                attack: fixed.attack,
                defense: fixed.defense,
                magic: fixed.magic,
                experience_reward: fixed.experience_reward,
                coin_reward: fixed.coin_reward,
                drop_table: fixed.drop_table,
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateBattleResponse {
    pub battle_id: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleStateResponse {
    Waiting,
    Active,
    Completed,
}

impl From<BattleState> for BattleStateResponse {
    fn from(state: BattleState) -> Self {
        match state {
            BattleState::Waiting => BattleStateResponse::Waiting,
            BattleState::Active => BattleStateResponse::Active,
            BattleState::Completed => BattleStateResponse::Completed,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MonsterResponse {
    pub name: String,
    pub kind: MonsterKind,
    pub level: u32,
    pub max_health: u64,
    pub current_health: u64,
    pub attack: u32,
    pub defense: u32,
    pub magic: u32,
    pub experience_reward: u64,
    pub coin_reward: u64,
    pub drop_table: Vec<String>,
}

impl From<&Monster> for MonsterResponse {
    fn from(monster: &Monster) -> Self {
        Self {
            name: monster.name.clone(),
            kind: monster.kind,
            level: monster.level,
            max_health: monster.max_health,
            current_health: monster.current_health(),
            attack: monster.attack,
            defense: monster.defense,
            magic: monster.magic,
            experience_reward: monster.experience_reward,
            coin_reward: monster.coin_reward,
            drop_table: monster.drop_table.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BattleSummaryResponse {
    pub id: String,
    pub monster: MonsterResponse,
    pub state: BattleStateResponse,
    pub players_joined: usize,
    pub max_players: usize,
    // Seconds left once active; absent while waiting.
    pub time_left: Option<u64>,
    pub player_damage: u64,
}

impl From<BattleSummary> for BattleSummaryResponse {
    fn from(summary: BattleSummary) -> Self {
        Self {
            monster: MonsterResponse::from(&summary.monster),
            id: summary.id,
            state: summary.state.into(),
            players_joined: summary.players_joined,
            max_players: summary.max_players,
            time_left: summary.time_left,
            player_damage: summary.player_damage,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ContributionResponse {
    pub player_id: String,
    pub damage: u64,
}

#[derive(Debug, Serialize)]
pub struct BattleDetailResponse {
    pub id: String,
    pub monster: MonsterResponse,
    pub state: BattleStateResponse,
    pub players: Vec<String>,
    pub max_players: usize,
    pub created_at: u64,
    pub start_time: Option<u64>,
    pub end_time: Option<u64>,
    pub time_left: Option<u64>,
    pub total_damage_dealt: u64,
    // Highest damage first, ties by player id.
    pub contributions: Vec<ContributionResponse>,
}

impl From<BattleDetail> for BattleDetailResponse {
    fn from(detail: BattleDetail) -> Self {
        let battle = detail.battle;
        let mut contributions: Vec<ContributionResponse> = battle
            .contributions()
            .iter()
            .map(|(player_id, damage)| ContributionResponse {
                player_id: player_id.clone(),
                damage: *damage,
            })
            .collect();
        contributions.sort_by(|a, b| {
            b.damage
                .cmp(&a.damage)
                .then_with(|| a.player_id.cmp(&b.player_id))
        });

        Self {
            id: battle.id().to_string(),
            monster: MonsterResponse::from(battle.monster()),
            state: battle.state().into(),
            players: battle.joined_players().to_vec(),
            max_players: battle.max_players(),
            created_at: battle.created_at(),
            start_time: battle.start_time(),
            end_time: battle.end_time(),
            time_left: detail.time_left,
            total_damage_dealt: battle.total_damage_dealt(),
            contributions,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinStatus {
    Joined,
    AlreadyJoined,
}

#[derive(Debug, Serialize)]
pub struct JoinResponse {
    pub status: JoinStatus,
    pub players_joined: usize,
    pub state: BattleStateResponse,
}

impl From<JoinResult> for JoinResponse {
    fn from(result: JoinResult) -> Self {
        Self {
            status: if result.newly_joined {
                JoinStatus::Joined
            } else {
                JoinStatus::AlreadyJoined
            },
            players_joined: result.players_joined,
            state: result.state.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AttackResponse {
    pub damage_dealt: u64,
    pub monster_health_remaining: u64,
    pub stamina_remaining: u32,
    pub experience_gained: u64,
    pub coins_gained: u64,
    pub battle_completed: bool,
    pub reconciliation_pending: bool,
}

impl From<AttackResult> for AttackResponse {
    fn from(result: AttackResult) -> Self {
        Self {
            damage_dealt: result.damage_dealt,
            monster_health_remaining: result.monster_health_remaining,
            stamina_remaining: result.stamina_remaining,
            experience_gained: result.experience_gained,
            coins_gained: result.coins_gained,
            battle_completed: result.battle_completed,
            reconciliation_pending: result.reconciliation_pending,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PendingReconciliationResponse {
    pub id: u64,
    pub battle_id: String,
    pub player_id: String,
    pub write: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stamina: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coins: Option<u64>,
    pub last_error: String,
    pub attempts: u32,
    pub recorded_at: u64,
}

impl From<PendingReconciliation> for PendingReconciliationResponse {
    fn from(item: PendingReconciliation) -> Self {
        let write = item.write.label();
        let (stamina, experience, coins) = match item.write {
            PendingWrite::StaminaDebit { amount } => (Some(amount), None, None),
            PendingWrite::RewardCredit(grant) => (None, Some(grant.experience), Some(grant.coins)),
        };
        Self {
            id: item.id,
            battle_id: item.battle_id,
            player_id: item.player_id,
            write,
            stamina,
            experience,
            coins,
            last_error: item.last_error,
            attempts: item.attempts,
            recorded_at: item.recorded_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}
