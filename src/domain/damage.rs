// Damage roll for a single attack.

use crate::domain::ports::Dice;

/// Inclusive roll bounds `(round(base * 0.8), round(base * 1.2))`, rounding half up.
pub fn damage_range(base_attack: u32) -> (u64, u64) {
    let base = u64::from(base_attack);
    ((base * 8 + 5) / 10, (base * 12 + 5) / 10)
}

/// Draw the raw damage for one attack. Clamping to monster health happens in the battle.
pub fn roll_damage(dice: &dyn Dice, base_attack: u32) -> u64 {
    let (low, high) = damage_range(base_attack);
    dice.roll_inclusive(low, high)
}
