use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejection reasons for a proposed betting action. Non-fatal: the caller
/// gets the reason, table state is untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ActionError {
    #[error("it's not seat {seat}'s turn (expected seat {expected})")]
    NotYourTurn { seat: usize, expected: usize },
    #[error("seat {seat} is folded, all-in or out of the hand")]
    SeatInactive { seat: usize },
    #[error("cannot check with {to_call} chips to call")]
    CannotCheck { to_call: u32 },
    #[error("nothing to call")]
    NothingToCall,
    #[error("not enough chips: need {needed}, have {stack}")]
    NotEnoughChips { needed: u32, stack: u32 },
    #[error("bet of {amount} is below the minimum of {minimum}")]
    BetTooSmall { amount: u32, minimum: u32 },
    #[error("raise of {amount} is below the minimum of {minimum}")]
    RaiseTooSmall { amount: u32, minimum: u32 },
    #[error("cannot bet once the betting is open; call or raise instead")]
    BetAlreadyOpen,
}

/// Table configuration problems, caught at creation and never mid-hand.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("big blind must be nonzero")]
    ZeroBigBlind,
    #[error("small blind {small} exceeds big blind {big}")]
    SmallBlindAboveBig { small: u32, big: u32 },
    #[error("blind increase interval must be nonzero")]
    ZeroIncreaseInterval,
    #[error("blind multiplier must be at least 1")]
    MultiplierBelowOne,
    #[error("table needs 2 to 9 seats, got {0}")]
    BadSeatCount(usize),
    #[error("only zero rake is supported, got {0}")]
    UnsupportedRake(u32),
}

/// Engine-level failures. `Rejected` wraps the non-fatal validation
/// taxonomy; the rest are invariant violations that abort the hand.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Rejected(#[from] ActionError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Size-accounting bug upstream; must never occur for a legal table.
    #[error("deck exhausted while dealing")]
    DeckExhausted,
    #[error("no active actor for the current street")]
    NoActiveActor,
    #[error("no hand in progress")]
    NoHandInProgress,
    #[error("a hand is already in progress")]
    HandAlreadyRunning,
}
