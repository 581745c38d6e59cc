use serde::{Deserialize, Serialize};

use crate::errors::ActionError;
use crate::seat::Seat;
use crate::table::Street;

/// The closed action set accepted at the boundary. `Bet` and `Raise`
/// carry the chips pushed beyond the current call amount.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlayerAction {
    Fold,
    Check,
    Call,
    Bet { amount: u32 },
    Raise { amount: u32 },
}

/// Action kinds without amounts, for legality listings.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Fold,
    Check,
    Call,
    Bet,
    Raise,
}

/// Ephemeral view of the betting state for one decision. Built fresh per
/// validation call, never stored.
#[derive(Debug, Clone, Copy)]
pub struct BettingContext {
    pub street: Street,
    pub actor: usize,
    pub bet_to_call: u32,
    pub last_raise: u32,
    pub big_blind: u32,
    pub pot: u32,
}

impl BettingContext {
    /// Chips this seat must add to match the current bet.
    pub fn to_call(&self, seat: &Seat) -> u32 {
        self.bet_to_call.saturating_sub(seat.committed_this_street)
    }

    /// Minimum opening bet.
    pub fn min_bet(&self) -> u32 {
        self.big_blind
    }

    /// Minimum raise-by increment beyond the call.
    pub fn min_raise(&self) -> u32 {
        self.last_raise.max(self.big_blind)
    }
}

/// What an applied action did to the seat, for the lifecycle to fold into
/// table-level state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Fold,
    Check,
    Call { paid: u32 },
    Bet { paid: u32 },
    /// `full` is false for an all-in shorter than a legal raise; short
    /// raises do not reopen the action.
    Raise { paid: u32, raise_by: u32, full: bool },
}

/// Check a proposed action against the betting context. Never mutates;
/// rejections carry the reason and leave everything untouched.
pub fn validate(seat: &Seat, action: PlayerAction, ctx: &BettingContext) -> Result<(), ActionError> {
    if seat.index != ctx.actor {
        return Err(ActionError::NotYourTurn {
            seat: seat.index,
            expected: ctx.actor,
        });
    }
    if !seat.can_act() {
        return Err(ActionError::SeatInactive { seat: seat.index });
    }

    let to_call = ctx.to_call(seat);
    match action {
        PlayerAction::Fold => Ok(()),
        PlayerAction::Check => {
            if to_call == 0 {
                Ok(())
            } else {
                Err(ActionError::CannotCheck { to_call })
            }
        }
        PlayerAction::Call => {
            // A stack below the call amount still calls, all-in for less;
            // apply clamps the transfer.
            if to_call == 0 {
                Err(ActionError::NothingToCall)
            } else {
                Ok(())
            }
        }
        PlayerAction::Bet { amount } => {
            // Keyed on to_call, not the table bet level: the big blind may
            // bet its option once the limps have matched it.
            if to_call > 0 {
                return Err(ActionError::BetAlreadyOpen);
            }
            // An all-in for the whole stack may fall short of the minimum.
            if amount < ctx.min_bet() && amount < seat.stack {
                return Err(ActionError::BetTooSmall {
                    amount,
                    minimum: ctx.min_bet(),
                });
            }
            if amount > seat.stack {
                return Err(ActionError::NotEnoughChips {
                    needed: amount,
                    stack: seat.stack,
                });
            }
            Ok(())
        }
        PlayerAction::Raise { amount } => {
            if to_call == 0 {
                return Err(ActionError::NothingToCall);
            }
            let needed = to_call.saturating_add(amount);
            if needed > seat.stack {
                return Err(ActionError::NotEnoughChips {
                    needed,
                    stack: seat.stack,
                });
            }
            // A raise that does not put the seat all-in must be at least
            // the full increment.
            if amount < ctx.min_raise() && needed < seat.stack {
                return Err(ActionError::RaiseTooSmall {
                    amount,
                    minimum: ctx.min_raise(),
                });
            }
            Ok(())
        }
    }
}

/// Actions currently legal for this seat. Fold is always legal for the
/// acting seat; the rest follow the no-limit bounds.
pub fn available_actions(seat: &Seat, ctx: &BettingContext) -> Vec<ActionKind> {
    if seat.index != ctx.actor || !seat.can_act() {
        return Vec::new();
    }
    let mut out = vec![ActionKind::Fold];
    let to_call = ctx.to_call(seat);
    if to_call == 0 {
        out.push(ActionKind::Check);
        if seat.stack >= ctx.min_bet() {
            out.push(ActionKind::Bet);
        }
    } else {
        out.push(ActionKind::Call);
        if seat.stack >= to_call.saturating_add(ctx.min_raise()) {
            out.push(ActionKind::Raise);
        }
    }
    out
}

/// Apply a validated action to the seat. Transfers are clamped at the
/// stack — apply never trusts validate and a shortfall becomes an all-in
/// rather than a negative stack.
pub fn apply(seat: &mut Seat, action: PlayerAction, ctx: &BettingContext) -> Applied {
    let to_call = ctx.to_call(seat);
    match action {
        PlayerAction::Fold => {
            seat.folded = true;
            Applied::Fold
        }
        PlayerAction::Check => Applied::Check,
        PlayerAction::Call => {
            let paid = seat.commit(to_call);
            Applied::Call { paid }
        }
        PlayerAction::Bet { amount } => {
            let paid = seat.commit(amount);
            Applied::Bet { paid }
        }
        PlayerAction::Raise { amount } => {
            let paid = seat.commit(to_call.saturating_add(amount));
            let raise_by = paid.saturating_sub(to_call);
            Applied::Raise {
                paid,
                raise_by,
                full: raise_by >= ctx.min_raise(),
            }
        }
    }
}

/// Street-completion predicate: done when at most one seat can still act,
/// or every seat that can act has matched the bet. The lifecycle layers a
/// pending-action queue on top so a no-bet street still visits everyone.
pub fn is_street_complete(seats: &[Seat], bet_to_call: u32) -> bool {
    let actionable: Vec<&Seat> = seats.iter().filter(|s| s.can_act()).collect();
    if actionable.len() <= 1 {
        return true;
    }
    actionable
        .iter()
        .all(|s| s.committed_this_street >= bet_to_call)
}

/// Hand-termination predicate: one player left, or the showdown street.
pub fn should_end_hand(seats: &[Seat], street: Option<Street>) -> bool {
    let live = seats.iter().filter(|s| s.is_live()).count();
    live <= 1 || street == Some(Street::Showdown)
}
