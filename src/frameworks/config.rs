use crate::interface_adapters::identity::PlayerDefaults;
use crate::use_cases::{RetryPolicy, SessionSettings};
use serde::Deserialize;
use std::{env, time::Duration};

// Runtime/server settings (not battle tuning beyond the session defaults).

const CONFIG_PATH_VAR: &str = "BATTLE_SERVER_CONFIG";
const MAX_RETRY_BACKOFF: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub port: u16,
    // Selects the PostgreSQL identity store when present.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub max_players: usize,
    pub battle_duration_seconds: u64,
    pub identity_retry_attempts: u32,
    pub identity_retry_backoff_ms: u64,
    pub reconcile_interval_seconds: u64,
    pub default_player_stamina: u32,
    pub default_player_base_attack: u32,
    pub default_player_coins: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: 3004,
            database_url: None,
            database_max_connections: 5,
            max_players: 20,
            battle_duration_seconds: 60 * 60,
            identity_retry_attempts: 3,
            identity_retry_backoff_ms: 50,
            reconcile_interval_seconds: 30,
            default_player_stamina: 100,
            default_player_base_attack: 100,
            default_player_coins: 1_000,
        }
    }
}

impl Settings {
    // Optional TOML file from BATTLE_SERVER_CONFIG, then environment overrides.
    pub fn load() -> std::io::Result<Self> {
        let mut settings = match env::var(CONFIG_PATH_VAR) {
            Ok(path) => {
                let contents = std::fs::read_to_string(&path).inspect_err(|e| {
                    tracing::error!(%path, error = %e, "failed to read config file");
                })?;
                Self::from_toml_str(&contents).map_err(|e| {
                    std::io::Error::other(format!("invalid config file {path}: {e}"))
                })?
            }
            Err(_) => Self::default(),
        };
        settings.apply_overrides(|key| env::var(key).ok());
        Ok(settings)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    // Values that fail to parse are ignored and the current value is kept.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        fn parsed<T: std::str::FromStr>(
            lookup: &impl Fn(&str) -> Option<String>,
            key: &str,
        ) -> Option<T> {
            lookup(key).and_then(|value| value.trim().parse().ok())
        }

        if let Some(port) = parsed(&lookup, "BATTLE_SERVER_PORT") {
            self.port = port;
        }
        if let Some(url) = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
            self.database_url = Some(url);
        }
        if let Some(connections) = parsed(&lookup, "DATABASE_MAX_CONNECTIONS") {
            self.database_max_connections = connections;
        }
        if let Some(max_players) = parsed(&lookup, "BATTLE_MAX_PLAYERS") {
            self.max_players = max_players;
        }
        if let Some(seconds) = parsed(&lookup, "BATTLE_DURATION_SECONDS") {
            self.battle_duration_seconds = seconds;
        }
        if let Some(attempts) = parsed(&lookup, "IDENTITY_RETRY_ATTEMPTS") {
            self.identity_retry_attempts = attempts;
        }
        if let Some(millis) = parsed(&lookup, "IDENTITY_RETRY_BACKOFF_MS") {
            self.identity_retry_backoff_ms = millis;
        }
        if let Some(seconds) = parsed(&lookup, "RECONCILE_INTERVAL_SECONDS") {
            self.reconcile_interval_seconds = seconds;
        }
        if let Some(stamina) = parsed(&lookup, "DEFAULT_PLAYER_STAMINA") {
            self.default_player_stamina = stamina;
        }
        if let Some(base_attack) = parsed(&lookup, "DEFAULT_PLAYER_BASE_ATTACK") {
            self.default_player_base_attack = base_attack;
        }
        if let Some(coins) = parsed(&lookup, "DEFAULT_PLAYER_COINS") {
            self.default_player_coins = coins;
        }
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            max_players: self.max_players.max(1),
            battle_duration_seconds: self.battle_duration_seconds,
            retry: RetryPolicy {
                max_attempts: self.identity_retry_attempts.max(1),
                initial_backoff: Duration::from_millis(self.identity_retry_backoff_ms),
                max_backoff: MAX_RETRY_BACKOFF,
            },
        }
    }

    pub fn player_defaults(&self) -> PlayerDefaults {
        PlayerDefaults {
            stamina: self.default_player_stamina,
            base_attack: self.default_player_base_attack,
            coins: self.default_player_coins,
        }
    }

    // Zero disables the background sweep.
    pub fn reconcile_interval(&self) -> Option<Duration> {
        (self.reconcile_interval_seconds > 0)
            .then(|| Duration::from_secs(self.reconcile_interval_seconds))
    }
}
