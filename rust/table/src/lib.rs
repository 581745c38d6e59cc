//! # flophouse-table: Per-Table Async Runtime
//!
//! Hosts [`flophouse_engine::engine::Engine`] instances as independent
//! actor tasks: one mpsc-fed loop per table owns all mutation, timer
//! firings arrive as messages with hand/street tags so stale callbacks are
//! discriminated and dropped, and CPU seats are driven through the same
//! validation path as external actions.
//!
//! - [`events`] - Notice bus relaying engine events per table id
//! - [`timers`] - Per-purpose timer bank (CPU delay, timeouts, watchdog)
//! - [`runtime`] - The table actor, its handle and timing profiles
//! - [`registry`] - Directory of running tables keyed by uuid

pub mod events;
pub mod registry;
pub mod runtime;
pub mod timers;

pub use events::{EventBus, NoticeSubscription, TableId, TableNotice};
pub use registry::TableRegistry;
pub use runtime::{RuntimeError, TableHandle, TimingProfile};
pub use timers::{TimerKind, TimerTag};
