//! # flophouse-engine: No-Limit Hold'em Hand Engine
//!
//! The authoritative table core: deck and reproducible RNG, 5-7 card hand
//! evaluation, betting legality, pot and side-pot accounting, and the hand
//! lifecycle state machine. The engine is synchronous and I/O-free — it
//! accepts commands, mutates its own [`table::TableState`], and returns the
//! [`events::EngineEvent`]s each command produced for a caller to relay.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card representation (Suit, Rank, Card) and boundary codes
//! - [`deck`] - Dealing deck with explicit Fisher-Yates shuffling
//! - [`rng`] - Seeded xorshift streams and the per-hand seed schedule
//! - [`hand`] - Poker hand evaluation and strength comparison
//! - [`seat`] - Per-seat stack, commitment and status tracking
//! - [`rules`] - Betting validation, legal-action sets, street completion
//! - [`pot`] - Side-pot layering and award splitting
//! - [`table`] - Table state, streets, stakes and the blind schedule
//! - [`engine`] - The hand lifecycle machine driving all of the above
//! - [`events`] - Boundary events and masked snapshots
//! - [`record`] - Hand records for the persistence collaborator
//! - [`errors`] - Typed rejection and invariant-failure taxonomy
//!
//! ## Quick Start
//!
//! ```rust
//! use flophouse_engine::engine::Engine;
//! use flophouse_engine::rng::{SeedPolicy, SeedSchedule};
//! use flophouse_engine::rules::PlayerAction;
//! use flophouse_engine::table::{SeatConfig, TableConfig, TableRules};
//!
//! let config = TableConfig {
//!     seats: vec![
//!         SeatConfig { stack: 1_000, is_cpu: false },
//!         SeatConfig { stack: 1_000, is_cpu: true },
//!     ],
//!     rules: TableRules::new(5, 10),
//!     seed: SeedPolicy::Seeded(SeedSchedule::new(42, 1_000)),
//! };
//!
//! let mut engine = Engine::new(config).expect("valid table config");
//! let events = engine.begin_hand().expect("hand starts");
//! assert!(!events.is_empty());
//!
//! // The button posts the small blind heads-up and acts first preflop.
//! let actor = engine.current_actor().expect("someone to act");
//! engine.apply_action(actor, PlayerAction::Call).expect("legal call");
//! ```
//!
//! ## Determinism
//!
//! A seeded table derives a fresh xorshift stream per hand from
//! `base + (hand_id + 1) * increment`, so any hand can be replayed in
//! isolation:
//!
//! ```rust
//! use flophouse_engine::deck::Deck;
//! use flophouse_engine::rng::XorShift32;
//!
//! let mut a = Deck::new();
//! let mut b = Deck::new();
//! a.shuffle(&mut XorShift32::new(7));
//! b.shuffle(&mut XorShift32::new(7));
//! assert_eq!(a.deal_card(), b.deal_card());
//! ```
//!
//! ## Validation
//!
//! Betting legality is a pure check over an ephemeral context; illegal
//! actions come back as typed reasons and never touch state:
//!
//! ```rust
//! use flophouse_engine::rules::{validate, BettingContext, PlayerAction};
//! use flophouse_engine::seat::Seat;
//! use flophouse_engine::table::Street;
//!
//! let seat = Seat::new(0, 15, false);
//! let ctx = BettingContext {
//!     street: Street::Preflop,
//!     actor: 0,
//!     bet_to_call: 10,
//!     last_raise: 10,
//!     big_blind: 10,
//!     pot: 15,
//! };
//! assert!(validate(&seat, PlayerAction::Raise { amount: 3 }, &ctx).is_err());
//! assert!(validate(&seat, PlayerAction::Call, &ctx).is_ok());
//! ```

pub mod cards;
pub mod deck;
pub mod engine;
pub mod errors;
pub mod events;
pub mod hand;
pub mod pot;
pub mod record;
pub mod rng;
pub mod rules;
pub mod seat;
pub mod table;
