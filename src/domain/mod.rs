// Domain layer: battle rules, reward formula and collaborator ports.

pub mod battle;
pub mod damage;
pub mod errors;
pub mod monster;
pub mod ports;
pub mod rewards;

pub use battle::{AttackOutcome, Battle, BattleState, JoinOutcome};
pub use errors::{BattleError, IdentityError, SessionError};
pub use monster::{Monster, MonsterKind, MonsterSpec, MonsterTemplate};
pub use ports::{Clock, Dice, IdentityStore, PlayerStats, RewardGrant};
pub use rewards::{Reward, calculate_reward};
