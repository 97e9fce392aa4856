// Reward formula for the finishing blow.

use crate::domain::monster::Monster;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reward {
    pub experience: u64,
    pub coins: u64,
}

/// Grant `floor(pool * damage / max(1, max_health))` of the monster's experience and coin pools.
///
/// Only the attack that completes a battle is rewarded, and only for its own damage.
pub fn calculate_reward(monster: &Monster, damage_applied: u64) -> Reward {
    let max_health = u128::from(monster.max_health.max(1));
    let share = |pool: u64| {
        let amount = u128::from(pool) * u128::from(damage_applied) / max_health;
        u64::try_from(amount).unwrap_or(u64::MAX)
    };

    Reward {
        experience: share(monster.experience_reward),
        coins: share(monster.coin_reward),
    }
}
