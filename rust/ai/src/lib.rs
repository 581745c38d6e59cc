//! # flophouse-ai: Bot Strategy Advisor
//!
//! Suggests actions for CPU-controlled seats from a public table snapshot.
//! The advisor is a pure recommender: it never mutates table state, and the
//! runtime routes every suggestion back through engine validation exactly
//! like a human action - a bad suggestion degrades to the nearest legal
//! action instead of corrupting the hand.
//!
//! ## Core Components
//!
//! - [`Advisor`] - Trait for suggestion strategies
//! - [`rule`] - The rule-based implementation with risk profiles
//! - [`create_advisor`] - Factory keyed on [`RiskProfile`]
//!
//! ## Quick Start
//!
//! ```rust
//! use flophouse_ai::{create_advisor, RiskProfile};
//! use flophouse_engine::engine::Engine;
//! use flophouse_engine::rng::{SeedPolicy, SeedSchedule};
//! use flophouse_engine::table::{SeatConfig, TableConfig, TableRules};
//!
//! let config = TableConfig {
//!     seats: vec![
//!         SeatConfig { stack: 1_000, is_cpu: true },
//!         SeatConfig { stack: 1_000, is_cpu: true },
//!     ],
//!     rules: TableRules::new(5, 10),
//!     seed: SeedPolicy::Seeded(SeedSchedule::new(1, 1)),
//! };
//! let mut engine = Engine::new(config).unwrap();
//! engine.begin_hand().unwrap();
//!
//! let advisor = create_advisor(RiskProfile::Standard);
//! let seat = engine.current_actor().unwrap();
//! let action = advisor.suggest(&engine.view_for(seat), seat);
//! assert!(engine.check_action(seat, action).is_ok());
//! ```

use flophouse_engine::events::TableView;
use flophouse_engine::rules::PlayerAction;

pub mod rule;

pub use rule::RuleAdvisor;

/// How hot the advisor runs: thresholds for shoving, opening and calling
/// all shift with the profile.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RiskProfile {
    Cautious,
    Standard,
    Aggressive,
}

/// A suggestion strategy for one seat.
///
/// `view` must be the seat's own perspective (from `Engine::view_for`) so
/// its hole cards are visible; everything else in the snapshot is public.
pub trait Advisor: Send + Sync {
    fn suggest(&self, view: &TableView, seat: usize) -> PlayerAction;

    fn name(&self) -> &str;
}

/// Build the rule-based advisor for a risk profile.
pub fn create_advisor(profile: RiskProfile) -> Box<dyn Advisor> {
    Box::new(RuleAdvisor::new(profile))
}
