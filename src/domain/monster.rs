// Monster definitions and the templates battles are created from.

use crate::domain::ports::Dice;
use serde::{Deserialize, Serialize};

// Serialized names are the wire names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonsterKind {
    Goblin,
    Orc,
    Dragon,
    Undead,
    Elemental,
}

/// Static description of a monster before it enters a battle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonsterTemplate {
    pub name: String,
    pub kind: MonsterKind,
    pub level: u32,
    pub max_health: u64,
    pub attack: u32,
    pub defense: u32,
    pub magic: u32,
    pub experience_reward: u64,
    pub coin_reward: u64,
    pub drop_table: Vec<String>,
}

/// How a new battle picks its monster.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MonsterSpec {
    /// Roll a monster from the built-in roster and stat ranges.
    #[default]
    Random,
    /// Use the provided template as-is.
    Fixed(MonsterTemplate),
}

/// Monster instance owned by a single battle.
///
/// `current_health` only moves through [`Monster::apply_damage`], which keeps
/// `0 <= current_health <= max_health`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Monster {
    pub name: String,
    pub kind: MonsterKind,
    pub level: u32,
    pub max_health: u64,
    current_health: u64,
    pub attack: u32,
    pub defense: u32,
    pub magic: u32,
    pub experience_reward: u64,
    pub coin_reward: u64,
    pub drop_table: Vec<String>,
}

const ROSTER: [(&str, MonsterKind); 5] = [
    ("Goblin Skirmisher", MonsterKind::Goblin),
    ("Orc Warrior", MonsterKind::Orc),
    ("Shadow Beast", MonsterKind::Undead),
    ("Fire Elemental", MonsterKind::Elemental),
    ("Ice Dragon", MonsterKind::Dragon),
];

const LEVEL_RANGE: (u64, u64) = (1, 10);
const HEALTH_RANGE: (u64, u64) = (500_000, 2_000_000);
const ATTACK_RANGE: (u64, u64) = (100, 500);
const DEFENSE_RANGE: (u64, u64) = (50, 200);
const MAGIC_RANGE: (u64, u64) = (75, 300);
const EXPERIENCE_RANGE: (u64, u64) = (100, 500);
const COIN_RANGE: (u64, u64) = (50, 200);

impl MonsterSpec {
    /// Materialize into a monster at full health.
    pub fn build(self, dice: &dyn Dice) -> Monster {
        match self {
            MonsterSpec::Random => Monster::from_template(random_template(dice)),
            MonsterSpec::Fixed(template) => Monster::from_template(template),
        }
    }
}

impl Monster {
    pub fn from_template(template: MonsterTemplate) -> Self {
        Self {
            name: template.name,
            kind: template.kind,
            level: template.level,
            max_health: template.max_health,
            current_health: template.max_health,
            attack: template.attack,
            defense: template.defense,
            magic: template.magic,
            experience_reward: template.experience_reward,
            coin_reward: template.coin_reward,
            drop_table: template.drop_table,
        }
    }

    pub fn current_health(&self) -> u64 {
        self.current_health
    }

    pub fn is_defeated(&self) -> bool {
        self.current_health == 0
    }

    /// Clamp `raw_damage` to the remaining health, subtract it, and return what was applied.
    pub fn apply_damage(&mut self, raw_damage: u64) -> u64 {
        let applied = raw_damage.min(self.current_health);
        self.current_health -= applied;
        applied
    }
}

fn random_template(dice: &dyn Dice) -> MonsterTemplate {
    let last = (ROSTER.len() - 1) as u64;
    let index = usize::try_from(dice.roll_inclusive(0, last).min(last)).unwrap_or(0);
    let (name, kind) = ROSTER[index];

    MonsterTemplate {
        name: name.to_string(),
        kind,
        level: roll_u32(dice, LEVEL_RANGE),
        max_health: roll(dice, HEALTH_RANGE),
        attack: roll_u32(dice, ATTACK_RANGE),
        defense: roll_u32(dice, DEFENSE_RANGE),
        magic: roll_u32(dice, MAGIC_RANGE),
        experience_reward: roll(dice, EXPERIENCE_RANGE),
        coin_reward: roll(dice, COIN_RANGE),
        drop_table: Vec::new(),
    }
}

fn roll(dice: &dyn Dice, (low, high): (u64, u64)) -> u64 {
    dice.roll_inclusive(low, high)
}

fn roll_u32(dice: &dyn Dice, range: (u64, u64)) -> u32 {
    u32::try_from(roll(dice, range)).unwrap_or(u32::MAX)
}
