use crate::domain::{Clock, Dice};
use crate::use_cases::SessionCoordinator;
use rand::Rng;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Clone)]
pub struct AppState {
    // Owns the battle registry and the identity collaborator.
    pub coordinator: Arc<SessionCoordinator>,
}

// System clock adapter used by the session coordinator.
#[derive(Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_seconds(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

// Dice adapter backed by the thread-local RNG.
#[derive(Clone)]
pub struct ThreadRngDice;

impl Dice for ThreadRngDice {
    fn roll_inclusive(&self, low: u64, high: u64) -> u64 {
        if low >= high {
            return low;
        }
        rand::thread_rng().gen_range(low..=high)
    }
}
