use std::fmt;

// Rule violations raised by the battle aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleError {
    NotActive,
    NotJoined,
}

// Failures reported by the identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    InsufficientStamina,
    UnknownPlayer,
    // Infrastructure failure; safe to retry.
    Unavailable(String),
}

impl IdentityError {
    pub fn is_transient(&self) -> bool {
        matches!(self, IdentityError::Unavailable(_))
    }
}

impl fmt::Display for IdentityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityError::InsufficientStamina => write!(f, "insufficient stamina"),
            IdentityError::UnknownPlayer => write!(f, "unknown player"),
            IdentityError::Unavailable(reason) => write!(f, "identity store unavailable: {reason}"),
        }
    }
}

impl std::error::Error for IdentityError {}

// Errors surfaced by session coordinator operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    BattleNotFound,
    BattleFull,
    BattleNotJoinable,
    BattleNotActive,
    PlayerNotInBattle,
    InsufficientStamina,
    UnknownPlayer,
    IdentityUnavailable,
}

impl From<BattleError> for SessionError {
    fn from(err: BattleError) -> Self {
        match err {
            BattleError::NotActive => SessionError::BattleNotActive,
            BattleError::NotJoined => SessionError::PlayerNotInBattle,
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SessionError::BattleNotFound => "battle not found",
            SessionError::BattleFull => "battle is full",
            SessionError::BattleNotJoinable => "battle is not joinable",
            SessionError::BattleNotActive => "battle is not active",
            SessionError::PlayerNotInBattle => "player is not in this battle",
            SessionError::InsufficientStamina => "not enough stamina",
            SessionError::UnknownPlayer => "unknown player",
            SessionError::IdentityUnavailable => "identity store unavailable",
        };
        f.write_str(text)
    }
}
