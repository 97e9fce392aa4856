// Framework bootstrap for the battle server runtime.

use crate::domain::IdentityStore;
use crate::frameworks::config::Settings;
use crate::frameworks::db::{connect_pool, run_migrations};
use crate::interface_adapters::identity::{InMemoryIdentityStore, PostgresIdentityStore};
use crate::interface_adapters::routes::app;
use crate::interface_adapters::state::{AppState, SystemClock, ThreadRngDice};
use crate::use_cases::{ReconcileReport, SessionCoordinator};

use std::net::SocketAddr;
use std::{io::Result, sync::Arc, time::Duration};
use tokio::time::MissedTickBehavior;

// Log output selected by LOG_FORMAT; anything but "json" gives compact lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

fn init_runtime() {
    // .env is optional; deployments set the variables directly.
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,sqlx=warn"));
    let format = LogFormat::parse(std::env::var("LOG_FORMAT").ok().as_deref());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    match format {
        LogFormat::Json => builder.json().with_current_span(true).init(),
        LogFormat::Compact => builder.compact().init(),
    }

    // Panics inside request handlers or the reconciler show up in the log stream.
    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "battle server panicked");
    }));
}

pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let settings = Settings::load()?;
    run_with_settings(listener, settings).await
}

pub async fn run_with_settings(listener: tokio::net::TcpListener, settings: Settings) -> Result<()> {
    let address = listener.local_addr()?;
    // build state
    let state = build_state(&settings).await?;
    spawn_reconciler(state.coordinator.clone(), settings.reconcile_interval());

    let app = app(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let settings = Settings::load().inspect_err(|e| {
        tracing::error!(error = %e, "failed to load settings");
    })?;
    let address = SocketAddr::from(([0, 0, 0, 0], settings.port));

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run_with_settings(listener, settings).await
}

async fn build_state(settings: &Settings) -> Result<Arc<AppState>> {
    let identity: Arc<dyn IdentityStore> = match &settings.database_url {
        Some(database_url) => {
            let db = connect_pool(database_url, settings.database_max_connections)
                .await
                .map_err(|e| std::io::Error::other(format!("failed to connect to database: {e}")))?;
            run_migrations(&db)
                .await
                .map_err(|e| std::io::Error::other(format!("failed to run migrations: {e}")))?;
            tracing::info!("identity store: postgres");
            Arc::new(PostgresIdentityStore { db })
        }
        None => {
            let defaults = settings.player_defaults();
            tracing::info!(
                default_stamina = defaults.stamina,
                default_base_attack = defaults.base_attack,
                default_coins = defaults.coins,
                "identity store: in-memory"
            );
            Arc::new(InMemoryIdentityStore::new(defaults))
        }
    };

    let session_settings = settings.session_settings();
    tracing::debug!(
        max_players = session_settings.max_players,
        battle_duration_seconds = session_settings.battle_duration_seconds,
        retry_attempts = session_settings.retry.max_attempts,
        "session settings configured"
    );

    let coordinator = SessionCoordinator::new(
        identity,
        Arc::new(SystemClock),
        Arc::new(ThreadRngDice),
        session_settings,
    );

    Ok(Arc::new(AppState {
        coordinator: Arc::new(coordinator),
    }))
}

// Periodically retry identity writes that exhausted their inline retries.
fn spawn_reconciler(coordinator: Arc<SessionCoordinator>, period: Option<Duration>) {
    let Some(period) = period else {
        tracing::info!("background reconciliation disabled");
        return;
    };

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;

        loop {
            interval.tick().await;
            let report = coordinator.reconcile_pending().await;
            if report != ReconcileReport::default() {
                tracing::info!(
                    resolved = report.resolved,
                    still_pending = report.still_pending,
                    dropped = report.dropped,
                    "reconciliation sweep finished"
                );
            }
        }
    });
}
