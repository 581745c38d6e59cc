use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::hand::Category;
use crate::rules::PlayerAction;
use crate::seat::Seat;
use crate::table::{Street, TableState, TableStatus};

/// Which blind a seat posted.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlindKind {
    Small,
    Big,
}

/// Public view of one seat. `hole` is populated only for the viewer's own
/// seat and for seats revealed at showdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatView {
    pub index: usize,
    pub is_cpu: bool,
    pub stack: u32,
    pub committed_this_street: u32,
    pub committed_total: u32,
    pub folded: bool,
    pub all_in: bool,
    pub hole: Option<[Card; 2]>,
}

/// Full public snapshot of the table, safe to relay to every client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableView {
    pub hand_id: u64,
    pub status: TableStatus,
    pub street: Option<Street>,
    pub button: usize,
    pub to_act: Option<usize>,
    pub bet_to_call: u32,
    pub last_raise: u32,
    pub small_blind: u32,
    pub big_blind: u32,
    pub pot: u32,
    pub community: Vec<Card>,
    pub seats: Vec<SeatView>,
    pub game_over: bool,
}

/// Per-seat private state at deal time, for the one collaborator allowed
/// to see hole cards before showdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandSetup {
    pub hand_id: u64,
    pub button: usize,
    pub small_blind: u32,
    pub big_blind: u32,
    pub seats: Vec<SeatView>,
}

/// Settlement line for one seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatResult {
    pub seat: usize,
    /// Chips won from the pot (zero for losers).
    pub won: u32,
    /// Stack change over the whole hand.
    pub net: i64,
    pub stack: u32,
    /// Shown only when the hand reached showdown and the seat was live.
    pub hole: Option<[Card; 2]>,
    pub category: Option<Category>,
}

/// Everything the engine reports to the outside world. Mutating commands
/// return the events they produced; the engine performs no I/O of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    HandStarted {
        hand_id: u64,
        button: usize,
        small_blind: u32,
        big_blind: u32,
    },
    HandSetup { setup: HandSetup },
    BlindPosted {
        seat: usize,
        kind: BlindKind,
        amount: u32,
    },
    Dealt {
        street: Street,
        cards: Vec<Card>,
    },
    ActionApplied {
        seat: usize,
        action: PlayerAction,
        paid: u32,
        all_in: bool,
        to_call: u32,
        street: Street,
    },
    StateSync { view: TableView },
    HandEnded {
        hand_id: u64,
        board: Vec<Card>,
        results: Vec<SeatResult>,
    },
}

fn seat_view(seat: &Seat, reveal: bool) -> SeatView {
    SeatView {
        index: seat.index,
        is_cpu: seat.is_cpu,
        stack: seat.stack,
        committed_this_street: seat.committed_this_street,
        committed_total: seat.committed_total,
        folded: seat.folded,
        all_in: seat.all_in,
        hole: if reveal { seat.hole_pair() } else { None },
    }
}

/// Build the public snapshot. `viewer` reveals that seat's own hole cards;
/// pass `None` for the fully masked broadcast view.
pub fn table_view(state: &TableState, viewer: Option<usize>) -> TableView {
    TableView {
        hand_id: state.hand_id,
        status: state.status,
        street: state.street,
        button: state.button,
        to_act: state.to_act,
        bet_to_call: state.bet_to_call,
        last_raise: state.last_raise,
        small_blind: state.small_blind,
        big_blind: state.big_blind,
        pot: state.pot,
        community: state.community.clone(),
        seats: state
            .seats
            .iter()
            .map(|s| seat_view(s, viewer == Some(s.index)))
            .collect(),
        game_over: state.game_over,
    }
}

/// The private deal-time snapshot: every seat's hole cards visible.
pub fn hand_setup(state: &TableState) -> HandSetup {
    HandSetup {
        hand_id: state.hand_id,
        button: state.button,
        small_blind: state.small_blind,
        big_blind: state.big_blind,
        seats: state.seats.iter().map(|s| seat_view(s, true)).collect(),
    }
}
