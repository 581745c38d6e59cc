use std::collections::HashMap;
use std::time::Duration;

use flophouse_engine::table::Street;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// The timer purposes a table runs. One live timer per purpose: starting a
/// purpose again implicitly cancels its predecessor.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum TimerKind {
    /// Delay before a CPU seat acts.
    CpuAction,
    /// Deadline for a human seat to act.
    HumanTimeout,
    /// Backup trigger in case a CPU action callback is lost.
    Watchdog,
    /// Pause between one hand ending and the next being dealt.
    AutoDeal,
    /// Upper bound on a single betting street.
    StreetTimeout,
    /// Upper bound on a whole hand.
    HandTimeout,
}

/// Identity a firing carries so the table loop can discriminate and drop
/// callbacks that outlived the state they were armed for.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct TimerTag {
    pub hand_id: u64,
    pub street: Option<Street>,
    pub actor: Option<usize>,
}

impl TimerTag {
    /// Tag scoped to a whole hand.
    pub fn hand(hand_id: u64) -> Self {
        Self {
            hand_id,
            street: None,
            actor: None,
        }
    }

    /// Tag scoped to one seat's turn on one street.
    pub fn turn(hand_id: u64, street: Option<Street>, actor: Option<usize>) -> Self {
        Self {
            hand_id,
            street,
            actor,
        }
    }
}

/// A timer firing, delivered as a message into the table's event loop.
/// Timers have no privilege: the loop feeds their consequences through the
/// same validation path as external actions.
#[derive(Debug, Clone, Copy)]
pub struct TimerFire {
    pub kind: TimerKind,
    pub tag: TimerTag,
}

#[derive(Debug)]
struct TimerSlot {
    handle: JoinHandle<()>,
    tag: TimerTag,
    delay: Duration,
    restarts_left: u32,
}

/// One table's timers. Everything is armed against the provided sender;
/// firing never mutates anything here beyond the slot bookkeeping.
#[derive(Debug)]
pub struct TimerBank {
    tx: mpsc::Sender<TimerFire>,
    slots: HashMap<TimerKind, TimerSlot>,
}

impl TimerBank {
    pub fn new(tx: mpsc::Sender<TimerFire>) -> Self {
        Self {
            tx,
            slots: HashMap::new(),
        }
    }

    pub fn start(&mut self, kind: TimerKind, tag: TimerTag, delay: Duration) {
        self.start_with_restarts(kind, tag, delay, 0);
    }

    /// Arm `kind`, cancelling any predecessor. `restarts` allows the timer
    /// to re-arm itself that many times after firing (watchdog pattern).
    pub fn start_with_restarts(
        &mut self,
        kind: TimerKind,
        tag: TimerTag,
        delay: Duration,
        restarts: u32,
    ) {
        self.cancel(kind);
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(TimerFire { kind, tag }).await;
        });
        self.slots.insert(
            kind,
            TimerSlot {
                handle,
                tag,
                delay,
                restarts_left: restarts,
            },
        );
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        if let Some(slot) = self.slots.remove(&kind) {
            slot.handle.abort();
        }
    }

    /// Hand teardown: nothing armed may outlive the state it pointed at.
    pub fn cancel_all(&mut self) {
        for (_, slot) in self.slots.drain() {
            slot.handle.abort();
        }
    }

    /// The tag the latest armed timer of this purpose carries, if any.
    pub fn current_tag(&self, kind: TimerKind) -> Option<TimerTag> {
        self.slots.get(&kind).map(|s| s.tag)
    }

    /// Bookkeeping after a firing arrives: clears the slot, or re-arms it
    /// when the restart policy still has budget. Returns true when the
    /// firing matches the live slot (i.e. it is not a stale leftover).
    pub fn note_fired(&mut self, fire: &TimerFire) -> bool {
        match self.slots.get(&fire.kind) {
            Some(slot) if slot.tag == fire.tag => {
                let (tag, delay, restarts) = (slot.tag, slot.delay, slot.restarts_left);
                if restarts > 0 {
                    self.start_with_restarts(fire.kind, tag, delay, restarts - 1);
                } else {
                    self.slots.remove(&fire.kind);
                }
                true
            }
            _ => false,
        }
    }
}

impl Drop for TimerBank {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
