use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::events::SeatResult;
use crate::rules::PlayerAction;
use crate::table::Street;

/// One action as it happened, for replay and downstream ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub seat: usize,
    pub street: Street,
    pub action: PlayerAction,
    pub paid: u32,
}

/// Showdown summary when the hand got that far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowdownInfo {
    pub winners: Vec<usize>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Complete record of one hand. The engine fills everything except `ts`,
/// which the runtime stamps RFC3339 before handing the record to the
/// persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandRecord {
    pub hand_id: u64,
    /// Shuffle seed when the table runs deterministic streams.
    pub seed: Option<u32>,
    pub small_blind: u32,
    pub big_blind: u32,
    pub button: usize,
    pub actions: Vec<ActionRecord>,
    pub board: Vec<Card>,
    pub results: Vec<SeatResult>,
    #[serde(default)]
    pub ts: Option<String>,
    #[serde(default)]
    pub showdown: Option<ShowdownInfo>,
}

/// External hand ids format as `{prefix}-{seq:06}`.
pub fn format_hand_id(prefix: &str, seq: u64) -> String {
    format!("{}-{:06}", prefix, seq)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hand_ids_zero_pad_to_six() {
        assert_eq!(format_hand_id("t1", 7), "t1-000007");
        assert_eq!(format_hand_id("t1", 1_234_567), "t1-1234567");
    }

    #[test]
    fn records_round_trip_through_json() {
        let record = HandRecord {
            hand_id: 3,
            seed: Some(42),
            small_blind: 5,
            big_blind: 10,
            button: 1,
            actions: vec![ActionRecord {
                seat: 0,
                street: Street::Preflop,
                action: PlayerAction::Call,
                paid: 10,
            }],
            board: vec!["AS".parse().unwrap(), "KD".parse().unwrap()],
            results: Vec::new(),
            ts: None,
            showdown: None,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"AS\""));
        let back: HandRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
