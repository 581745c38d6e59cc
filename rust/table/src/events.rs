use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use flophouse_engine::events::EngineEvent;
use flophouse_engine::record::HandRecord;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

pub type TableId = String;

// Bounded per-subscriber buffers; a subscriber that stops draining gets
// pruned rather than wedging the table.
const NOTICE_CHANNEL_BUFFER: usize = 1000;

pub type NoticeSender = mpsc::Sender<TableNotice>;
pub type NoticeReceiver = mpsc::Receiver<TableNotice>;

/// Everything a table publishes: relayed engine events plus runtime
/// lifecycle notices.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TableNotice {
    Opened {
        table_id: TableId,
        seats: usize,
        small_blind: u32,
        big_blind: u32,
    },
    Engine {
        table_id: TableId,
        event: EngineEvent,
    },
    HandRecorded {
        table_id: TableId,
        record: HandRecord,
    },
    Closed {
        table_id: TableId,
        reason: String,
    },
    Error {
        table_id: TableId,
        message: String,
    },
}

/// RAII subscription: dropping it unsubscribes.
pub struct NoticeSubscription {
    bus: EventBus,
    table_id: TableId,
    subscriber_id: usize,
    pub receiver: NoticeReceiver,
}

impl NoticeSubscription {
    pub fn receiver(&mut self) -> &mut NoticeReceiver {
        &mut self.receiver
    }
}

impl Drop for NoticeSubscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(&self.table_id, self.subscriber_id);
    }
}

/// Fan-out bus keyed by table id. Broadcast never blocks: full subscriber
/// channels drop the notice and the subscriber is pruned.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    inner: Arc<EventBusInner>,
}

#[derive(Debug, Default)]
struct EventBusInner {
    subscribers: RwLock<HashMap<TableId, Vec<(usize, NoticeSender)>>>,
    next_id: AtomicUsize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, table_id: TableId) -> NoticeSubscription {
        let (subscriber_id, receiver) = self.subscribe_raw(table_id.clone());
        NoticeSubscription {
            bus: self.clone(),
            table_id,
            subscriber_id,
            receiver,
        }
    }

    fn subscribe_raw(&self, table_id: TableId) -> (usize, NoticeReceiver) {
        let (tx, rx) = mpsc::channel(NOTICE_CHANNEL_BUFFER);
        let id = self.inner.next_id.fetch_add(1, Ordering::AcqRel);
        let mut guard = self
            .inner
            .subscribers
            .write()
            .expect("subscriber lock poisoned");
        guard.entry(table_id.clone()).or_default().push((id, tx));

        tracing::debug!(table_id = %table_id, subscriber_id = id, "subscribed to table notices");
        (id, rx)
    }

    pub fn broadcast(&self, table_id: &TableId, notice: TableNotice) {
        let subscribers = {
            let guard = self
                .inner
                .subscribers
                .read()
                .expect("subscriber lock poisoned");
            guard.get(table_id).cloned()
        };

        let Some(list) = subscribers else {
            return;
        };

        let mut failed = Vec::new();
        for (id, sender) in list {
            if let Err(e) = sender.try_send(notice.clone()) {
                tracing::warn!(
                    table_id = %table_id,
                    subscriber_id = id,
                    error = ?e,
                    "dropping slow table subscriber"
                );
                failed.push(id);
            }
        }
        if !failed.is_empty() {
            self.remove_subscribers(table_id, &failed);
        }
    }

    pub fn unsubscribe(&self, table_id: &TableId, subscriber_id: usize) {
        self.remove_subscribers(table_id, &[subscriber_id]);
    }

    pub fn drop_table(&self, table_id: &TableId) {
        let mut guard = self
            .inner
            .subscribers
            .write()
            .expect("subscriber lock poisoned");
        guard.remove(table_id);
    }

    pub fn subscriber_count(&self) -> usize {
        let guard = self
            .inner
            .subscribers
            .read()
            .expect("subscriber lock poisoned");
        guard.values().map(|list| list.len()).sum()
    }

    fn remove_subscribers(&self, table_id: &TableId, ids: &[usize]) {
        let mut guard = self
            .inner
            .subscribers
            .write()
            .expect("subscriber lock poisoned");
        if let Some(list) = guard.get_mut(table_id) {
            list.retain(|(id, _)| !ids.contains(id));
            if list.is_empty() {
                guard.remove(table_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error_notice(table_id: &str) -> TableNotice {
        TableNotice::Error {
            table_id: table_id.to_string(),
            message: "ping".into(),
        }
    }

    #[test]
    fn subscription_drop_unsubscribes() {
        let bus = EventBus::new();
        let table = "t".to_string();
        {
            let _sub = bus.subscribe(table.clone());
            assert_eq!(bus.subscriber_count(), 1);
        }
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn broadcast_reaches_all_subscribers() {
        let bus = EventBus::new();
        let table = "t".to_string();
        let mut sub1 = bus.subscribe(table.clone());
        let mut sub2 = bus.subscribe(table.clone());

        bus.broadcast(&table, error_notice(&table));

        assert!(matches!(
            sub1.receiver.try_recv(),
            Ok(TableNotice::Error { .. })
        ));
        assert!(matches!(
            sub2.receiver.try_recv(),
            Ok(TableNotice::Error { .. })
        ));
    }

    #[test]
    fn broadcasts_do_not_cross_tables() {
        let bus = EventBus::new();
        let mut sub = bus.subscribe("a".to_string());
        bus.broadcast(&"b".to_string(), error_notice("b"));
        assert!(sub.receiver.try_recv().is_err());
    }

    #[test]
    fn stale_receiver_is_pruned() {
        let bus = EventBus::new();
        let table = "t".to_string();
        let (id, rx) = bus.subscribe_raw(table.clone());
        drop(rx);
        bus.broadcast(&table, error_notice(&table));
        assert_eq!(bus.subscriber_count(), 0);
        bus.unsubscribe(&table, id); // no panic after removal
    }
}
