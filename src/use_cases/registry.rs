// Registry of live battles keyed by battle id.

use crate::domain::Battle;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Shared handle to one battle. Each battle has its own lock so unrelated battles never contend.
pub type BattleHandle = Arc<Mutex<Battle>>;

/// Thread-safe registry for battles.
///
/// The map lock is only held to look up or insert handles; battle mutation happens
/// under the per-battle lock after the map lock is released.
#[derive(Debug, Default)]
pub struct BattleRegistry {
    battles: RwLock<HashMap<String, BattleHandle>>,
}

impl BattleRegistry {
    pub fn new() -> Self {
        Self {
            battles: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a battle under its own id and returns the shared handle.
    pub async fn insert(&self, battle: Battle) -> BattleHandle {
        let battle_id = battle.id().to_string();
        let handle = Arc::new(Mutex::new(battle));
        let mut battles = self.battles.write().await;
        battles.insert(battle_id, handle.clone());
        handle
    }

    /// Returns the battle handle for the provided id, if it exists.
    pub async fn get(&self, battle_id: &str) -> Option<BattleHandle> {
        let battles = self.battles.read().await;
        battles.get(battle_id).cloned()
    }

    /// Snapshots every battle that still accepts joins, oldest first.
    pub async fn joinable(&self) -> Vec<Battle> {
        let handles: Vec<BattleHandle> = {
            let battles = self.battles.read().await;
            battles.values().cloned().collect()
        };

        let mut snapshots = Vec::with_capacity(handles.len());
        for handle in handles {
            let battle = handle.lock().await;
            if battle.is_joinable() {
                snapshots.push(battle.clone());
            }
        }

        snapshots.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        snapshots
    }
}
