use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use flophouse_ai::Advisor;
use flophouse_engine::engine::Engine;
use flophouse_engine::errors::EngineError;
use flophouse_engine::events::{EngineEvent, TableView};
use flophouse_engine::rules::PlayerAction;
use flophouse_engine::table::TableStatus;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::events::{EventBus, TableId, TableNotice};
use crate::timers::{TimerBank, TimerFire, TimerKind, TimerTag};

/// Deadlines and pacing for one table. All per-purpose timers key off
/// this; the simulation profile collapses them to near-zero so CPU-only
/// tables play as fast as the loop can turn.
#[derive(Debug, Clone, Copy)]
pub struct TimingProfile {
    pub cpu_action_delay: Duration,
    /// Extra slack beyond the CPU delay before the watchdog steps in.
    pub watchdog_grace: Duration,
    pub human_action_timeout: Duration,
    pub auto_deal_delay: Duration,
    pub street_timeout: Duration,
    pub hand_timeout: Duration,
    /// Deal the first hand on spawn and re-deal after each hand ends.
    pub auto_begin: bool,
}

impl Default for TimingProfile {
    fn default() -> Self {
        Self {
            cpu_action_delay: Duration::from_millis(800),
            watchdog_grace: Duration::from_secs(2),
            human_action_timeout: Duration::from_secs(30),
            auto_deal_delay: Duration::from_millis(1_500),
            street_timeout: Duration::from_secs(90),
            hand_timeout: Duration::from_secs(600),
            auto_begin: true,
        }
    }
}

impl TimingProfile {
    /// Millisecond pacing for simulations and tests.
    pub fn simulation() -> Self {
        Self {
            cpu_action_delay: Duration::from_millis(1),
            watchdog_grace: Duration::from_millis(50),
            human_action_timeout: Duration::from_millis(200),
            auto_deal_delay: Duration::from_millis(1),
            street_timeout: Duration::from_secs(5),
            hand_timeout: Duration::from_secs(10),
            auto_begin: true,
        }
    }
}

/// Errors crossing the handle boundary.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("table is closed")]
    Closed,
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Commands into a table's event loop. Timer firings travel a separate
/// channel but land in the same serialized loop.
#[derive(Debug)]
pub enum TableCmd {
    BeginHand {
        reply: Option<oneshot::Sender<Result<(), EngineError>>>,
    },
    Act {
        seat: usize,
        action: PlayerAction,
        reply: Option<oneshot::Sender<Result<(), EngineError>>>,
    },
    SetAuto {
        seat: usize,
        cpu: bool,
    },
    Snapshot {
        viewer: Option<usize>,
        reply: oneshot::Sender<TableView>,
    },
    Close,
}

/// Cheap cloneable handle to a running table actor.
#[derive(Debug, Clone)]
pub struct TableHandle {
    pub id: TableId,
    cmd_tx: mpsc::Sender<TableCmd>,
}

impl TableHandle {
    pub async fn begin_hand(&self) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(TableCmd::BeginHand { reply: Some(tx) })
            .await
            .map_err(|_| RuntimeError::Closed)?;
        rx.await.map_err(|_| RuntimeError::Closed)?.map_err(Into::into)
    }

    pub async fn act(&self, seat: usize, action: PlayerAction) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(TableCmd::Act {
                seat,
                action,
                reply: Some(tx),
            })
            .await
            .map_err(|_| RuntimeError::Closed)?;
        rx.await.map_err(|_| RuntimeError::Closed)?.map_err(Into::into)
    }

    pub async fn set_auto(&self, seat: usize, cpu: bool) -> Result<(), RuntimeError> {
        self.cmd_tx
            .send(TableCmd::SetAuto { seat, cpu })
            .await
            .map_err(|_| RuntimeError::Closed)
    }

    pub async fn snapshot(&self, viewer: Option<usize>) -> Result<TableView, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(TableCmd::Snapshot { viewer, reply: tx })
            .await
            .map_err(|_| RuntimeError::Closed)?;
        rx.await.map_err(|_| RuntimeError::Closed)
    }

    pub async fn close(&self) {
        let _ = self.cmd_tx.send(TableCmd::Close).await;
    }
}

/// Spawn the actor task owning `engine`. All mutation happens inside the
/// task; the handle and the timers only send messages into it.
pub fn spawn_table(
    id: TableId,
    engine: Engine,
    advisor: Box<dyn Advisor>,
    timing: TimingProfile,
    bus: EventBus,
) -> (TableHandle, JoinHandle<()>) {
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (fire_tx, fire_rx) = mpsc::channel(64);
    let worker = TableWorker {
        id: id.clone(),
        engine,
        advisor,
        timing,
        bus,
        timers: TimerBank::new(fire_tx),
        cmd_rx,
        fire_rx,
        street_mark: None,
    };
    let join = tokio::spawn(worker.run());
    (TableHandle { id, cmd_tx }, join)
}

struct TableWorker {
    id: TableId,
    engine: Engine,
    advisor: Box<dyn Advisor>,
    timing: TimingProfile,
    bus: EventBus,
    timers: TimerBank,
    cmd_rx: mpsc::Receiver<TableCmd>,
    fire_rx: mpsc::Receiver<TimerFire>,
    /// Last (hand, street) the street timer was armed for.
    street_mark: Option<(u64, Option<flophouse_engine::table::Street>)>,
}

impl TableWorker {
    async fn run(mut self) {
        tracing::info!(table_id = %self.id, "table actor started");
        if self.timing.auto_begin {
            let _ = self.begin_hand_inner();
        }

        loop {
            tokio::select! {
                biased;
                cmd = self.cmd_rx.recv() => match cmd {
                    None | Some(TableCmd::Close) => break,
                    Some(cmd) => self.handle_cmd(cmd),
                },
                Some(fire) = self.fire_rx.recv() => self.handle_fire(fire),
            }
        }

        self.timers.cancel_all();
        self.bus.broadcast(
            &self.id,
            TableNotice::Closed {
                table_id: self.id.clone(),
                reason: "closed".into(),
            },
        );
        self.bus.drop_table(&self.id);
        tracing::info!(table_id = %self.id, "table actor stopped");
    }

    fn handle_cmd(&mut self, cmd: TableCmd) {
        match cmd {
            TableCmd::BeginHand { reply } => {
                let result = self.begin_hand_inner();
                if let Some(reply) = reply {
                    let _ = reply.send(result);
                }
            }
            TableCmd::Act {
                seat,
                action,
                reply,
            } => {
                let result = self.apply_and_relay(seat, action);
                if let Some(reply) = reply {
                    let _ = reply.send(result);
                }
            }
            TableCmd::SetAuto { seat, cpu } => {
                self.engine.set_auto(seat, cpu);
                // A human seat flipping to CPU mid-turn should start
                // acting on the CPU cadence immediately.
                self.arm_turn_timers();
            }
            TableCmd::Snapshot { viewer, reply } => {
                let view = match viewer {
                    Some(seat) => self.engine.view_for(seat),
                    None => self.engine.view(),
                };
                let _ = reply.send(view);
            }
            TableCmd::Close => unreachable!("close is handled by the run loop"),
        }
    }

    fn handle_fire(&mut self, fire: TimerFire) {
        if !self.timers.note_fired(&fire) {
            tracing::trace!(table_id = %self.id, kind = ?fire.kind, "dropping stale timer firing");
            return;
        }

        match fire.kind {
            TimerKind::CpuAction | TimerKind::Watchdog => {
                let Some(actor) = self.engine.current_actor() else {
                    return;
                };
                if fire.tag.hand_id != self.engine.hand_id() || fire.tag.actor != Some(actor) {
                    return;
                }
                if !self.engine.state().seats[actor].is_cpu {
                    return;
                }
                self.drive_cpu(actor);
            }
            TimerKind::HumanTimeout => {
                if fire.tag.hand_id != self.engine.hand_id()
                    || fire.tag.street != self.engine.street()
                {
                    return;
                }
                let Some(actor) = self.engine.current_actor() else {
                    return;
                };
                if fire.tag.actor != Some(actor) || self.engine.state().seats[actor].is_cpu {
                    return;
                }
                tracing::debug!(table_id = %self.id, seat = actor, "human action timed out");
                self.force_passive(actor);
            }
            TimerKind::StreetTimeout => {
                if fire.tag.hand_id != self.engine.hand_id()
                    || fire.tag.street != self.engine.street()
                {
                    return;
                }
                if let Some(actor) = self.engine.current_actor() {
                    tracing::warn!(table_id = %self.id, street = ?self.engine.street(), "street timed out");
                    self.force_passive(actor);
                }
            }
            TimerKind::HandTimeout => {
                if fire.tag.hand_id != self.engine.hand_id()
                    || self.engine.status() != TableStatus::InHand
                {
                    return;
                }
                tracing::warn!(table_id = %self.id, hand_id = self.engine.hand_id(), "hand timed out; folding it down");
                let mut guard = 0;
                while self.engine.status() == TableStatus::InHand && guard < 64 {
                    let Some(actor) = self.engine.current_actor() else {
                        break;
                    };
                    self.force_passive(actor);
                    guard += 1;
                }
            }
            TimerKind::AutoDeal => {
                if self.engine.status() == TableStatus::HandOver && !self.engine.is_game_over() {
                    let _ = self.begin_hand_inner();
                }
            }
        }
    }

    fn begin_hand_inner(&mut self) -> Result<(), EngineError> {
        self.timers.cancel(TimerKind::AutoDeal);
        match self.engine.begin_hand() {
            Ok(events) => {
                // Empty events mean the game-over no-op.
                if !events.is_empty() && self.engine.status() == TableStatus::InHand {
                    self.timers.start(
                        TimerKind::HandTimeout,
                        TimerTag::hand(self.engine.hand_id()),
                        self.timing.hand_timeout,
                    );
                }
                self.relay(events);
                Ok(())
            }
            Err(e) => {
                self.bus.broadcast(
                    &self.id,
                    TableNotice::Error {
                        table_id: self.id.clone(),
                        message: e.to_string(),
                    },
                );
                Err(e)
            }
        }
    }

    fn apply_and_relay(&mut self, seat: usize, action: PlayerAction) -> Result<(), EngineError> {
        match self.engine.apply_action(seat, action) {
            Ok(events) => {
                self.relay(events);
                Ok(())
            }
            Err(e) => {
                // Validation rejections are the caller's business; state
                // is untouched, so the timers stay as they are.
                tracing::debug!(table_id = %self.id, seat, error = %e, "action rejected");
                Err(e)
            }
        }
    }

    fn relay(&mut self, events: Vec<EngineEvent>) {
        let mut hand_ended = false;
        for event in events {
            if matches!(event, EngineEvent::HandEnded { .. }) {
                hand_ended = true;
            }
            self.bus.broadcast(
                &self.id,
                TableNotice::Engine {
                    table_id: self.id.clone(),
                    event,
                },
            );
        }

        if hand_ended {
            if let Some(mut record) = self.engine.take_last_record() {
                record.ts = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
                self.bus.broadcast(
                    &self.id,
                    TableNotice::HandRecorded {
                        table_id: self.id.clone(),
                        record,
                    },
                );
            }
            // Teardown: nothing from the finished hand may fire into the
            // next one.
            self.timers.cancel_all();
            self.street_mark = None;
            if self.timing.auto_begin && !self.engine.is_game_over() {
                self.timers.start(
                    TimerKind::AutoDeal,
                    TimerTag::hand(self.engine.hand_id()),
                    self.timing.auto_deal_delay,
                );
            }
        }

        self.arm_turn_timers();
    }

    fn arm_turn_timers(&mut self) {
        if self.engine.status() != TableStatus::InHand {
            self.timers.cancel(TimerKind::CpuAction);
            self.timers.cancel(TimerKind::Watchdog);
            self.timers.cancel(TimerKind::HumanTimeout);
            self.timers.cancel(TimerKind::StreetTimeout);
            return;
        }

        let hand_id = self.engine.hand_id();
        let street = self.engine.street();

        let mark = (hand_id, street);
        if self.street_mark != Some(mark) {
            self.street_mark = Some(mark);
            self.timers.start(
                TimerKind::StreetTimeout,
                TimerTag::turn(hand_id, street, None),
                self.timing.street_timeout,
            );
        }

        let Some(actor) = self.engine.current_actor() else {
            self.timers.cancel(TimerKind::CpuAction);
            self.timers.cancel(TimerKind::Watchdog);
            self.timers.cancel(TimerKind::HumanTimeout);
            return;
        };

        let tag = TimerTag::turn(hand_id, street, Some(actor));
        if self.engine.state().seats[actor].is_cpu {
            self.timers
                .start(TimerKind::CpuAction, tag, self.timing.cpu_action_delay);
            self.timers.start_with_restarts(
                TimerKind::Watchdog,
                tag,
                self.timing.cpu_action_delay + self.timing.watchdog_grace,
                1,
            );
            self.timers.cancel(TimerKind::HumanTimeout);
        } else {
            self.timers.start(
                TimerKind::HumanTimeout,
                tag,
                self.timing.human_action_timeout,
            );
            self.timers.cancel(TimerKind::CpuAction);
            self.timers.cancel(TimerKind::Watchdog);
        }
    }

    /// Ask the advisor, validate, and degrade to the nearest legal action
    /// rather than letting a bad suggestion wedge the table.
    fn drive_cpu(&mut self, actor: usize) {
        let suggestion = self.advisor.suggest(&self.engine.view_for(actor), actor);
        let action = if self.engine.check_action(actor, suggestion).is_ok() {
            suggestion
        } else {
            tracing::warn!(
                table_id = %self.id,
                seat = actor,
                suggestion = ?suggestion,
                "advisor suggestion rejected; falling back"
            );
            self.nearest_legal(actor)
        };
        if let Err(e) = self.apply_and_relay(actor, action) {
            self.bus.broadcast(
                &self.id,
                TableNotice::Error {
                    table_id: self.id.clone(),
                    message: format!("cpu action failed for seat {actor}: {e}"),
                },
            );
        }
    }

    /// Call, else check, else fold.
    fn nearest_legal(&self, actor: usize) -> PlayerAction {
        for action in [PlayerAction::Call, PlayerAction::Check] {
            if self.engine.check_action(actor, action).is_ok() {
                return action;
            }
        }
        PlayerAction::Fold
    }

    /// Check when free, fold otherwise: the timeout treatment.
    fn force_passive(&mut self, actor: usize) {
        let action = if self.engine.check_action(actor, PlayerAction::Check).is_ok() {
            PlayerAction::Check
        } else {
            PlayerAction::Fold
        };
        if let Err(e) = self.apply_and_relay(actor, action) {
            self.bus.broadcast(
                &self.id,
                TableNotice::Error {
                    table_id: self.id.clone(),
                    message: format!("timeout action failed for seat {actor}: {e}"),
                },
            );
        }
    }
}
