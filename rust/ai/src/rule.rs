//! Rule-based advisor: preflop hole classes crossed with position and
//! profile, postflop a made-hand ladder over the engine evaluator.

use flophouse_engine::cards::Card;
use flophouse_engine::events::{SeatView, TableView};
use flophouse_engine::hand::{evaluate_hand, Category};
use flophouse_engine::rules::PlayerAction;
use flophouse_engine::table::Street;

use crate::{Advisor, RiskProfile};

/// Preflop hole-card classes, best to worst.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum HoleClass {
    Premium,
    Strong,
    Speculative,
    Trash,
}

/// Coarse acting position relative to the button.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PositionBucket {
    Early,
    Middle,
    Late,
    Blinds,
}

#[derive(Debug, Clone)]
pub struct RuleAdvisor {
    profile: RiskProfile,
}

impl RuleAdvisor {
    pub fn new(profile: RiskProfile) -> Self {
        Self { profile }
    }

    /// Classify two hole cards by pair rank, high cards, suitedness and
    /// connector gap.
    pub fn classify_hole(c1: Card, c2: Card) -> HoleClass {
        let r1 = c1.rank as u8;
        let r2 = c2.rank as u8;
        let (high, low) = if r1 > r2 { (r1, r2) } else { (r2, r1) };
        let suited = c1.suit == c2.suit;

        if r1 == r2 {
            return match high {
                11..=14 => HoleClass::Premium, // JJ+
                8..=10 => HoleClass::Strong,   // 88-TT
                _ => HoleClass::Speculative,   // small pairs set-mine
            };
        }

        match (high, low) {
            (14, 13) if suited => HoleClass::Premium,
            (14, 13) => HoleClass::Strong,
            (14, 12) => HoleClass::Strong,
            (14, 11) | (13, 12) if suited => HoleClass::Strong,
            (14, _) if suited => HoleClass::Speculative,
            (13, 12) | (14, 11) => HoleClass::Speculative,
            _ if suited && high - low <= 1 && high >= 9 => HoleClass::Speculative,
            _ if high >= 11 && low >= 10 => HoleClass::Speculative, // broadway
            _ => HoleClass::Trash,
        }
    }

    /// Bucket a seat's position by clockwise distance from the button.
    pub fn position(seat: usize, button: usize, seats: usize) -> PositionBucket {
        let d = (seat + seats - button) % seats;
        match d {
            0 => PositionBucket::Late, // the button itself
            1 | 2 => PositionBucket::Blinds,
            _ => {
                // Split the field after the blinds into thirds; the last
                // third plays like the button.
                let from_utg = d - 3;
                let field = seats.saturating_sub(3).max(1);
                if from_utg * 3 < field {
                    PositionBucket::Early
                } else if from_utg * 3 < 2 * field {
                    PositionBucket::Middle
                } else {
                    PositionBucket::Late
                }
            }
        }
    }

    /// Open-shove threshold in effective big blinds.
    fn shove_threshold(&self) -> u32 {
        match self.profile {
            RiskProfile::Cautious => 8,
            RiskProfile::Standard => 10,
            RiskProfile::Aggressive => 12,
        }
    }

    /// Aggression score out of class x position x profile; 3+ raises,
    /// 2 calls at a fair price, 1 calls only cheap, 0 check-folds.
    fn preflop_score(&self, class: HoleClass, position: PositionBucket) -> i32 {
        let base = match class {
            HoleClass::Premium => 3,
            HoleClass::Strong => 2,
            HoleClass::Speculative => 1,
            HoleClass::Trash => 0,
        };
        let pos = match position {
            PositionBucket::Late => 1,
            PositionBucket::Middle | PositionBucket::Blinds => 0,
            PositionBucket::Early => -1,
        };
        let temperament = match self.profile {
            RiskProfile::Aggressive => 1,
            RiskProfile::Standard => 0,
            RiskProfile::Cautious => -1,
        };
        base + pos + temperament
    }

    fn preflop(&self, me: &SeatView, view: &TableView, hole: [Card; 2]) -> PlayerAction {
        let class = Self::classify_hole(hole[0], hole[1]);
        let position = Self::position(me.index, view.button, view.seats.len());
        let score = self.preflop_score(class, position);

        let to_call = view.bet_to_call.saturating_sub(me.committed_this_street);
        let min_raise = view.last_raise.max(view.big_blind);
        let bb = view.big_blind.max(1);
        let effective = effective_stack(me, view);

        if score >= 3 {
            // Shove short stacks outright; otherwise raise a multiple of
            // the last raise, with a 3x-blind floor on the open.
            if effective / bb <= self.shove_threshold() {
                let jam = me.stack.saturating_sub(to_call);
                if to_call == 0 {
                    return PlayerAction::Bet { amount: me.stack };
                }
                if jam > 0 {
                    return PlayerAction::Raise { amount: jam };
                }
                return PlayerAction::Call;
            }
            let raise_by = min_raise.max(view.last_raise.saturating_mul(2)).max(bb * 2);
            let raise_by = raise_by.min(me.stack.saturating_sub(to_call));
            if to_call == 0 {
                let open = raise_by.max(view.big_blind).min(me.stack);
                return PlayerAction::Bet { amount: open };
            }
            if raise_by >= min_raise {
                return PlayerAction::Raise { amount: raise_by };
            }
            return PlayerAction::Call;
        }

        if to_call == 0 {
            return PlayerAction::Check;
        }
        match score {
            2 => {
                if me.stack >= to_call {
                    PlayerAction::Call
                } else {
                    PlayerAction::Fold
                }
            }
            1 if to_call <= bb * 2 && me.stack >= to_call => PlayerAction::Call,
            _ => PlayerAction::Fold,
        }
    }

    fn postflop(&self, me: &SeatView, view: &TableView, hole: [Card; 2]) -> PlayerAction {
        let mut cards = Vec::with_capacity(7);
        cards.extend_from_slice(&hole);
        cards.extend_from_slice(&view.community);
        let strength = evaluate_hand(&cards);

        let to_call = view.bet_to_call.saturating_sub(me.committed_this_street);
        let min_open = view.big_blind.max(1);
        let position = Self::position(me.index, view.button, view.seats.len());
        let pot = view.pot.max(min_open);

        let board_top = view
            .community
            .iter()
            .map(|c| c.rank as u8)
            .max()
            .unwrap_or(0);
        // Top pair or an overpair counts as a marginal made hand; a pair
        // below the board top does not.
        let marginal = match strength.category {
            Category::TwoPair => true,
            Category::OnePair => strength.kickers[0] >= board_top,
            _ => false,
        };

        match strength.category {
            Category::StraightFlush | Category::FourOfAKind | Category::FullHouse => {
                self.bet_or_raise(me, to_call, min_open, pot, view.last_raise)
            }
            Category::Flush | Category::Straight | Category::ThreeOfAKind => {
                if to_call == 0 {
                    let amount = (pot * 2 / 3).max(min_open).min(me.stack);
                    PlayerAction::Bet { amount }
                } else {
                    PlayerAction::Call
                }
            }
            _ if marginal => {
                if to_call == 0 {
                    if position == PositionBucket::Late {
                        let amount = (pot / 3).max(min_open).min(me.stack);
                        PlayerAction::Bet { amount }
                    } else {
                        PlayerAction::Check
                    }
                } else if to_call <= pot / 2 || self.profile == RiskProfile::Aggressive {
                    PlayerAction::Call
                } else {
                    PlayerAction::Fold
                }
            }
            _ => {
                if to_call == 0 {
                    PlayerAction::Check
                } else {
                    PlayerAction::Fold
                }
            }
        }
    }

    /// Monster line: pot it when unopened, raise it when not.
    fn bet_or_raise(
        &self,
        me: &SeatView,
        to_call: u32,
        min_open: u32,
        pot: u32,
        last_raise: u32,
    ) -> PlayerAction {
        if to_call == 0 {
            let amount = pot.max(min_open).min(me.stack);
            PlayerAction::Bet { amount }
        } else {
            let min_raise = last_raise.max(min_open);
            let raise_by = pot.max(min_raise).min(me.stack.saturating_sub(to_call));
            if raise_by >= min_raise {
                PlayerAction::Raise { amount: raise_by }
            } else {
                PlayerAction::Call
            }
        }
    }
}

/// Effective stack: the smaller of mine and the biggest live opponent's.
fn effective_stack(me: &SeatView, view: &TableView) -> u32 {
    let biggest_opponent = view
        .seats
        .iter()
        .filter(|s| s.index != me.index && !s.folded)
        .map(|s| s.stack + s.committed_this_street)
        .max()
        .unwrap_or(0);
    me.stack.min(biggest_opponent)
}

impl Advisor for RuleAdvisor {
    fn suggest(&self, view: &TableView, seat: usize) -> PlayerAction {
        let me = match view.seats.get(seat) {
            Some(me) => me,
            None => return PlayerAction::Fold,
        };
        let hole = match me.hole {
            Some(hole) => hole,
            // Masked or undealt view: stay out of the way.
            None => {
                return if view.bet_to_call <= me.committed_this_street {
                    PlayerAction::Check
                } else {
                    PlayerAction::Fold
                };
            }
        };

        match view.street {
            None | Some(Street::Preflop) => self.preflop(me, view, hole),
            Some(_) => self.postflop(me, view, hole),
        }
    }

    fn name(&self) -> &str {
        match self.profile {
            RiskProfile::Cautious => "rule:cautious",
            RiskProfile::Standard => "rule:standard",
            RiskProfile::Aggressive => "rule:aggressive",
        }
    }
}
