use crate::domain::{MonsterSpec, SessionError};
use crate::interface_adapters::protocol::{
    AttackResponse, BattleDetailResponse, BattleSummaryResponse, CreateBattleRequest,
    CreateBattleResponse, ErrorResponse, HealthResponse, JoinResponse, ListBattlesQuery,
    MonsterSpecRequest, PendingReconciliationResponse, PlayerRequest,
};
use crate::interface_adapters::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;

type ApiError = (StatusCode, Json<ErrorResponse>);

// Handler for listing battles that still accept joins.
#[tracing::instrument(name = "list_battles", skip_all, fields(player_id = ?query.player_id))]
pub async fn list_battles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListBattlesQuery>,
) -> Json<Vec<BattleSummaryResponse>> {
    let player_id = query
        .player_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());

    let battles = state.coordinator.list_joinable(player_id).await;
    Json(battles.into_iter().map(Into::into).collect())
}

// Handler for creating a battle around a random or fixed monster.
#[tracing::instrument(name = "create_battle", skip_all)]
pub async fn create_battle(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateBattleRequest>,
) -> Result<(StatusCode, Json<CreateBattleResponse>), ApiError> {
    if let MonsterSpecRequest::Fixed(fixed) = &body.monster {
        if fixed.name.trim().is_empty() {
            return Err(error_response(StatusCode::BAD_REQUEST, "monster name is required"));
        }
        if fixed.max_health == 0 {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "max_health must be positive",
            ));
        }
    }

    let battle_id = state
        .coordinator
        .create(MonsterSpec::from(body.monster))
        .await;

    Ok((StatusCode::CREATED, Json(CreateBattleResponse { battle_id })))
}

// Handler for a full battle snapshot, completed battles included.
#[tracing::instrument(name = "get_battle", skip_all, fields(battle_id = %battle_id))]
pub async fn get_battle(
    State(state): State<Arc<AppState>>,
    Path(battle_id): Path<String>,
) -> Result<Json<BattleDetailResponse>, ApiError> {
    let detail = state
        .coordinator
        .battle(&battle_id)
        .await
        .map_err(map_session_error)?;

    Ok(Json(detail.into()))
}

// Handler for joining a battle.
#[tracing::instrument(
    name = "join_battle",
    skip_all,
    fields(battle_id = %battle_id, player_id = %body.player_id)
)]
pub async fn join_battle(
    State(state): State<Arc<AppState>>,
    Path(battle_id): Path<String>,
    Json(body): Json<PlayerRequest>,
) -> Result<Json<JoinResponse>, ApiError> {
    let player_id = require_player_id(&body)?;

    let result = state
        .coordinator
        .join(&battle_id, player_id)
        .await
        .map_err(map_session_error)?;

    Ok(Json(result.into()))
}

// Handler for one attack against a battle's monster.
#[tracing::instrument(
    name = "attack_battle",
    skip_all,
    fields(battle_id = %battle_id, player_id = %body.player_id)
)]
pub async fn attack_battle(
    State(state): State<Arc<AppState>>,
    Path(battle_id): Path<String>,
    Json(body): Json<PlayerRequest>,
) -> Result<Json<AttackResponse>, ApiError> {
    let player_id = require_player_id(&body)?;

    let result = state
        .coordinator
        .attack(&battle_id, player_id)
        .await
        .map_err(map_session_error)?;

    if result.reconciliation_pending {
        tracing::warn!("attack committed with identity writes pending reconciliation");
    }

    Ok(Json(result.into()))
}

// Handler for listing identity writes waiting on reconciliation.
pub async fn list_reconciliation(
    State(state): State<Arc<AppState>>,
) -> Json<Vec<PendingReconciliationResponse>> {
    let pending = state.coordinator.pending_reconciliations().await;
    Json(pending.into_iter().map(Into::into).collect())
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

fn require_player_id(body: &PlayerRequest) -> Result<&str, ApiError> {
    let player_id = body.player_id.trim();
    if player_id.is_empty() {
        return Err(error_response(StatusCode::BAD_REQUEST, "player_id is required"));
    }
    Ok(player_id)
}

// Helper to build a JSON error response.
fn error_response(status: StatusCode, message: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            message: message.to_string(),
        }),
    )
}

fn map_session_error(err: SessionError) -> ApiError {
    match err {
        SessionError::BattleNotFound => error_response(StatusCode::NOT_FOUND, "Battle not found"),
        SessionError::UnknownPlayer => error_response(StatusCode::NOT_FOUND, "Player not found"),
        SessionError::BattleFull => error_response(StatusCode::BAD_REQUEST, "Battle is full"),
        SessionError::BattleNotJoinable => {
            error_response(StatusCode::BAD_REQUEST, "Battle is not joinable")
        }
        SessionError::BattleNotActive => {
            error_response(StatusCode::BAD_REQUEST, "Battle is not active")
        }
        SessionError::PlayerNotInBattle => {
            error_response(StatusCode::BAD_REQUEST, "You are not in this battle")
        }
        SessionError::InsufficientStamina => {
            error_response(StatusCode::BAD_REQUEST, "Not enough stamina")
        }
        SessionError::IdentityUnavailable => {
            tracing::error!("identity store unavailable.");
            error_response(StatusCode::BAD_GATEWAY, "identity store unavailable")
        }
    }
}
