use crate::interface_adapters::handlers::{
    attack_battle, create_battle, get_battle, health, join_battle, list_battles,
    list_reconciliation,
};
use crate::interface_adapters::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

pub fn app(state: Arc<AppState>) -> Router {
    // Wire the HTTP routes to their handlers.
    Router::new()
        .route("/health", get(health))
        .route("/battles", get(list_battles).post(create_battle))
        .route("/battles/{battle_id}", get(get_battle))
        .route("/battles/{battle_id}/join", post(join_battle))
        .route("/battles/{battle_id}/attack", post(attack_battle))
        .route("/reconciliation", get(list_reconciliation))
        .with_state(state)
}
