use std::collections::HashMap;

use crate::errors::{ActionError, ConfigError, EngineError};
use crate::events::{
    hand_setup, table_view, BlindKind, EngineEvent, HandSetup, SeatResult, TableView,
};
use crate::hand::{compare_hands, evaluate_hand, HandStrength};
use crate::pot::{side_pots, split_award};
use crate::record::{ActionRecord, HandRecord, ShowdownInfo};
use crate::rng::SeedPolicy;
use crate::rules::{self, ActionKind, Applied, BettingContext, PlayerAction};
use crate::table::{Street, TableConfig, TableState, TableStatus};

/// The hand lifecycle machine.
///
/// Owns the authoritative [`TableState`] and drives it through
/// `Idle → InHand(preflop..showdown) → HandOver → Idle`, with `game_over`
/// as a terminal absorption once fewer than two seats are funded.
///
/// Every mutating command validates before it applies and returns the
/// [`EngineEvent`]s it produced; illegal actions are typed rejections that
/// leave the state untouched. The engine never performs I/O — relaying
/// events, timers and persistence belong to the caller.
#[derive(Debug)]
pub struct Engine {
    state: TableState,
    seed: SeedPolicy,
    /// Seed the current hand shuffled with, when deterministic.
    current_seed: Option<u32>,
    actions_log: Vec<ActionRecord>,
    last_record: Option<HandRecord>,
}

impl Engine {
    pub fn new(config: TableConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            state: TableState::new(&config),
            seed: config.seed,
            current_seed: None,
            actions_log: Vec::new(),
            last_record: None,
        })
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    pub fn hand_id(&self) -> u64 {
        self.state.hand_id
    }

    pub fn status(&self) -> TableStatus {
        self.state.status
    }

    pub fn street(&self) -> Option<Street> {
        self.state.street
    }

    pub fn is_game_over(&self) -> bool {
        self.state.game_over
    }

    pub fn current_actor(&self) -> Option<usize> {
        self.state.to_act
    }

    /// Public snapshot with every hole card masked.
    pub fn view(&self) -> TableView {
        table_view(&self.state, None)
    }

    /// Snapshot revealing `seat`'s own hole cards only.
    pub fn view_for(&self, seat: usize) -> TableView {
        table_view(&self.state, Some(seat))
    }

    /// Private per-seat state at deal time.
    pub fn deal_snapshot(&self) -> HandSetup {
        hand_setup(&self.state)
    }

    /// Flip a seat between human and CPU control.
    pub fn set_auto(&mut self, seat: usize, cpu: bool) {
        if let Some(s) = self.state.seats.get_mut(seat) {
            s.is_cpu = cpu;
        }
    }

    /// Legal action kinds for the current actor, empty when nobody acts.
    pub fn legal_actions(&self) -> Vec<ActionKind> {
        match (self.state.to_act, self.betting_context()) {
            (Some(actor), Some(ctx)) => rules::available_actions(&self.state.seats[actor], &ctx),
            _ => Vec::new(),
        }
    }

    /// Dry-run validation of an action for the current betting context.
    pub fn check_action(&self, seat: usize, action: PlayerAction) -> Result<(), ActionError> {
        let actor = self.state.to_act.unwrap_or(usize::MAX);
        let ctx = match self.betting_context() {
            Some(ctx) => ctx,
            None => {
                return Err(ActionError::SeatInactive { seat });
            }
        };
        match self.state.seats.get(seat) {
            Some(s) => rules::validate(s, action, &ctx),
            None => Err(ActionError::NotYourTurn {
                seat,
                expected: actor,
            }),
        }
    }

    /// The finished hand's record, once per hand.
    pub fn take_last_record(&mut self) -> Option<HandRecord> {
        self.last_record.take()
    }

    /// Start the next hand. A no-op on a game-over table; an error while a
    /// hand is running.
    pub fn begin_hand(&mut self) -> Result<Vec<EngineEvent>, EngineError> {
        if self.state.game_over {
            return Ok(Vec::new());
        }
        if self.state.status == TableStatus::InHand {
            return Err(EngineError::HandAlreadyRunning);
        }

        let mut events = Vec::new();

        self.state.hand_id += 1;
        let hand_id = self.state.hand_id;
        let (sb, bb) = self.state.rules.blinds_for_hand(hand_id);
        self.state.small_blind = sb;
        self.state.big_blind = bb;

        for seat in &mut self.state.seats {
            seat.reset_for_hand();
        }
        self.state.community.clear();
        self.state.pot = 0;
        self.state.pending.clear();
        self.state.to_act = None;
        self.state.last_aggressor = None;
        self.state.bet_to_call = 0;
        self.state.last_raise = 0;
        self.actions_log.clear();

        if self.state.funded_count() < 2 {
            self.state.status = TableStatus::HandOver;
            self.state.street = None;
            self.state.game_over = true;
            events.push(EngineEvent::StateSync {
                view: table_view(&self.state, None),
            });
            return Ok(events);
        }

        self.state.button = self
            .state
            .next_seat_where(self.state.button, |s| s.stack > 0)
            .ok_or(EngineError::NoActiveActor)?;

        self.current_seed = self.seed.seed_for_hand(hand_id);
        let mut rng = self.seed.rng_for_hand(hand_id);
        self.state.deck.shuffle(&mut rng);

        // Two passes, one card at a time, starting left of the button.
        let order = self.state.seats_from_where(self.state.button, |s| s.can_act());
        for _ in 0..2 {
            for &i in &order {
                let c = self
                    .state
                    .deck
                    .deal_card()
                    .ok_or(EngineError::DeckExhausted)?;
                self.state.seats[i].give_card(c);
            }
        }

        self.state.street = Some(Street::Preflop);
        self.state.status = TableStatus::InHand;

        events.push(EngineEvent::HandStarted {
            hand_id,
            button: self.state.button,
            small_blind: sb,
            big_blind: bb,
        });
        events.push(EngineEvent::HandSetup {
            setup: hand_setup(&self.state),
        });

        // Heads-up the button posts the small blind; otherwise the two
        // seats left of it, skipping anyone unfunded.
        let (sb_seat, bb_seat) = if order.len() == 2 {
            let other = self
                .state
                .next_seat_where(self.state.button, |s| s.can_act())
                .ok_or(EngineError::NoActiveActor)?;
            (self.state.button, other)
        } else {
            let small = self
                .state
                .next_seat_where(self.state.button, |s| s.can_act())
                .ok_or(EngineError::NoActiveActor)?;
            let big = self
                .state
                .next_seat_where(small, |s| s.can_act())
                .ok_or(EngineError::NoActiveActor)?;
            (small, big)
        };

        let paid_sb = self.state.seats[sb_seat].commit(sb);
        self.state.pot += paid_sb;
        events.push(EngineEvent::BlindPosted {
            seat: sb_seat,
            kind: BlindKind::Small,
            amount: paid_sb,
        });
        let paid_bb = self.state.seats[bb_seat].commit(bb);
        self.state.pot += paid_bb;
        events.push(EngineEvent::BlindPosted {
            seat: bb_seat,
            kind: BlindKind::Big,
            amount: paid_bb,
        });

        // The full big blind is owed even when the blind posted short.
        self.state.bet_to_call = bb;
        self.state.last_raise = bb;

        // First to act is left of the big blind; the queue laps the table
        // and ends on the big blind, preserving its option.
        self.state.pending = self
            .state
            .seats_from_where(bb_seat, |s| s.can_act())
            .into_iter()
            .collect();

        self.progress(&mut events)?;
        events.push(EngineEvent::StateSync {
            view: table_view(&self.state, None),
        });
        Ok(events)
    }

    /// Validate and apply one action for the acting seat.
    pub fn apply_action(
        &mut self,
        seat: usize,
        action: PlayerAction,
    ) -> Result<Vec<EngineEvent>, EngineError> {
        if self.state.status != TableStatus::InHand {
            return Err(EngineError::NoHandInProgress);
        }
        let actor = self.state.to_act.ok_or(EngineError::NoActiveActor)?;
        let ctx = self.betting_context().ok_or(EngineError::NoActiveActor)?;
        let seat_state = self
            .state
            .seats
            .get(seat)
            .ok_or(ActionError::NotYourTurn {
                seat,
                expected: actor,
            })?;
        rules::validate(seat_state, action, &ctx)?;

        let street = ctx.street;
        let st = &mut self.state;
        let applied = rules::apply(&mut st.seats[seat], action, &ctx);
        let paid = match applied {
            Applied::Fold | Applied::Check => 0,
            Applied::Call { paid } | Applied::Bet { paid } | Applied::Raise { paid, .. } => paid,
        };
        st.pot += paid;

        match applied {
            Applied::Bet { paid } => {
                st.bet_to_call = st.seats[seat].committed_this_street;
                st.last_raise = paid;
                st.last_aggressor = Some(seat);
                st.pending = st
                    .seats_from_where(seat, |s| s.can_act())
                    .into_iter()
                    .filter(|&i| i != seat)
                    .collect();
            }
            Applied::Raise {
                raise_by,
                full: true,
                ..
            } => {
                st.bet_to_call = st.seats[seat].committed_this_street;
                st.last_raise = raise_by;
                st.last_aggressor = Some(seat);
                st.pending = st
                    .seats_from_where(seat, |s| s.can_act())
                    .into_iter()
                    .filter(|&i| i != seat)
                    .collect();
            }
            // A short all-in raise is a degenerate call: the bet level and
            // raise rights stay put, the excess comes back through the
            // side-pot layering at settlement.
            Applied::Raise { full: false, .. }
            | Applied::Fold
            | Applied::Check
            | Applied::Call { .. } => {}
        }
        st.to_act = None;

        self.actions_log.push(ActionRecord {
            seat,
            street,
            action,
            paid,
        });

        let mut events = vec![EngineEvent::ActionApplied {
            seat,
            action,
            paid,
            all_in: self.state.seats[seat].all_in,
            to_call: self.state.bet_to_call,
            street,
        }];

        self.progress(&mut events)?;
        events.push(EngineEvent::StateSync {
            view: table_view(&self.state, None),
        });
        Ok(events)
    }

    fn betting_context(&self) -> Option<BettingContext> {
        let street = self.state.street?;
        let actor = self.state.to_act?;
        Some(BettingContext {
            street,
            actor,
            bet_to_call: self.state.bet_to_call,
            last_raise: self.state.last_raise,
            big_blind: self.state.big_blind,
            pot: self.state.pot,
        })
    }

    /// Advance turns and streets until an actor is due, the hand ends, or
    /// a locked-up board runs out to showdown.
    fn progress(&mut self, events: &mut Vec<EngineEvent>) -> Result<(), EngineError> {
        loop {
            if self.state.status != TableStatus::InHand {
                return Ok(());
            }
            if rules::should_end_hand(&self.state.seats, self.state.street) {
                if self.state.live_count() <= 1 {
                    self.settle_fold_out(events);
                } else {
                    self.settle_showdown(events)?;
                }
                return Ok(());
            }

            let st = &mut self.state;
            // Queued seats can only leave can_act by acting, but stay
            // defensive about skipping anyone who no longer can.
            while let Some(&front) = st.pending.front() {
                if st.seats[front].can_act() {
                    break;
                }
                st.pending.pop_front();
            }

            if let Some(next) = st.pending.pop_front() {
                st.to_act = Some(next);
                return Ok(());
            }

            if !rules::is_street_complete(&st.seats, st.bet_to_call) {
                // Empty queue with an unmatched actionable seat is a turn
                // accounting bug, not a user error.
                return Err(EngineError::NoActiveActor);
            }

            // Street complete: collect commitments (the pot already holds
            // the chips), reset the betting level, move forward.
            for s in &mut st.seats {
                s.clear_street_commitment();
            }
            st.bet_to_call = 0;
            st.last_raise = st.big_blind;
            st.last_aggressor = None;
            st.to_act = None;

            let next_street = st
                .street
                .and_then(Street::next)
                .ok_or(EngineError::NoActiveActor)?;
            st.street = Some(next_street);

            if next_street == Street::Showdown {
                // Loop back so the termination predicate settles it.
                continue;
            }

            st.deck.burn_card();
            let mut dealt = Vec::with_capacity(next_street.cards_dealt());
            for _ in 0..next_street.cards_dealt() {
                let c = st.deck.deal_card().ok_or(EngineError::DeckExhausted)?;
                st.community.push(c);
                dealt.push(c);
            }
            events.push(EngineEvent::Dealt {
                street: next_street,
                cards: dealt,
            });

            if st.actionable_count() <= 1 {
                // Locked up: nobody can bet, keep dealing to showdown.
                st.pending.clear();
                continue;
            }
            st.pending = st
                .seats_from_where(st.button, |s| s.can_act())
                .into_iter()
                .collect();
        }
    }

    /// Everyone but one seat folded: the pot, uncalled excess included,
    /// goes to the survivor without a showdown or a reveal.
    fn settle_fold_out(&mut self, events: &mut Vec<EngineEvent>) {
        let st = &mut self.state;
        let winner = st
            .seats
            .iter()
            .find(|s| s.is_live())
            .map(|s| s.index)
            .unwrap_or(st.button);
        let won = st.pot;
        st.seats[winner].add_chips(won);
        st.pot = 0;

        let results: Vec<SeatResult> = st
            .seats
            .iter()
            .map(|s| SeatResult {
                seat: s.index,
                won: if s.index == winner { won } else { 0 },
                net: if s.index == winner {
                    i64::from(won) - i64::from(s.committed_total)
                } else {
                    -i64::from(s.committed_total)
                },
                stack: s.stack,
                hole: None,
                category: None,
            })
            .collect();

        st.status = TableStatus::HandOver;
        st.street = None;
        st.to_act = None;
        st.pending.clear();

        events.push(EngineEvent::HandEnded {
            hand_id: st.hand_id,
            board: st.community.clone(),
            results: results.clone(),
        });
        self.finalize_record(results, Some(winner), false);
    }

    /// Showdown settlement: evaluate every live seat over its hole cards
    /// plus the full board, then award each commitment layer to the best
    /// eligible hand.
    fn settle_showdown(&mut self, events: &mut Vec<EngineEvent>) -> Result<(), EngineError> {
        let st = &mut self.state;

        let mut strengths: HashMap<usize, HandStrength> = HashMap::new();
        for seat in st.seats.iter().filter(|s| s.is_live()) {
            let hole = seat.hole_pair().ok_or(EngineError::NoActiveActor)?;
            let mut cards = Vec::with_capacity(7);
            cards.extend_from_slice(&hole);
            cards.extend_from_slice(&st.community);
            strengths.insert(seat.index, evaluate_hand(&cards));
        }

        let seat_count = st.seat_count();
        let mut won = vec![0u32; seat_count];
        for pot in side_pots(&st.seats) {
            if pot.eligible.len() == 1 {
                // Uncalled layer flows back to its sole contributor.
                won[pot.eligible[0]] += pot.amount;
                continue;
            }
            let best = pot
                .eligible
                .iter()
                .filter_map(|i| strengths.get(i))
                .max_by(|a, b| compare_hands(a, b))
                .cloned()
                .ok_or(EngineError::NoActiveActor)?;
            let winners: Vec<usize> = pot
                .eligible
                .iter()
                .copied()
                .filter(|i| {
                    strengths
                        .get(i)
                        .map(|s| compare_hands(s, &best).is_eq())
                        .unwrap_or(false)
                })
                .collect();
            for (seat, share) in split_award(pot.amount, &winners, st.button, seat_count) {
                won[seat] += share;
            }
        }

        for (i, amount) in won.iter().enumerate() {
            st.seats[i].add_chips(*amount);
        }
        st.pot = 0;

        let results: Vec<SeatResult> = st
            .seats
            .iter()
            .map(|s| SeatResult {
                seat: s.index,
                won: won[s.index],
                net: i64::from(won[s.index]) - i64::from(s.committed_total),
                stack: s.stack,
                hole: if s.is_live() { s.hole_pair() } else { None },
                category: strengths.get(&s.index).map(|h| h.category),
            })
            .collect();

        st.status = TableStatus::HandOver;
        st.to_act = None;
        st.pending.clear();

        events.push(EngineEvent::HandEnded {
            hand_id: st.hand_id,
            board: st.community.clone(),
            results: results.clone(),
        });
        self.finalize_record(results, None, true);
        Ok(())
    }

    fn finalize_record(&mut self, results: Vec<SeatResult>, fold_winner: Option<usize>, showdown: bool) {
        let st = &self.state;
        let winners: Vec<usize> = match fold_winner {
            Some(w) => vec![w],
            None => results
                .iter()
                .filter(|r| r.won > 0)
                .map(|r| r.seat)
                .collect(),
        };
        self.last_record = Some(HandRecord {
            hand_id: st.hand_id,
            seed: self.current_seed,
            small_blind: st.small_blind,
            big_blind: st.big_blind,
            button: st.button,
            actions: std::mem::take(&mut self.actions_log),
            board: st.community.clone(),
            results,
            ts: None,
            showdown: if showdown {
                Some(ShowdownInfo {
                    winners,
                    notes: None,
                })
            } else {
                None
            },
        });
    }
}
