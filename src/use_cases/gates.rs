// Per-player action gates.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Serializes the actions of one player while leaving other players untouched.
///
/// A gate exists only while someone holds or waits on it; idle gates are pruned on
/// the next acquire.
#[derive(Debug, Default)]
pub struct PlayerGates {
    gates: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl PlayerGates {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, player_id: &str) -> OwnedMutexGuard<()> {
        let gate = {
            let mut gates = self.gates.lock().await;
            // Only the map itself references an idle gate.
            gates.retain(|_, gate| Arc::strong_count(gate) > 1);
            gates
                .entry(player_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        gate.lock_owned().await
    }

    #[cfg(test)]
    pub(crate) async fn tracked(&self) -> usize {
        self.gates.lock().await.len()
    }
}
