use std::collections::HashMap;
use std::sync::RwLock;

use flophouse_ai::{create_advisor, RiskProfile};
use flophouse_engine::engine::Engine;
use flophouse_engine::errors::ConfigError;
use flophouse_engine::table::TableConfig;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::events::{EventBus, NoticeSubscription, TableId, TableNotice};
use crate::runtime::{spawn_table, TableHandle, TimingProfile};

struct RegisteredTable {
    handle: TableHandle,
    join: JoinHandle<()>,
}

/// Owns every running table. Each table is an independent actor reached
/// only through its handle's channel, so there is no shared mutable table
/// state anywhere - the registry is just the directory.
#[derive(Default)]
pub struct TableRegistry {
    tables: RwLock<HashMap<TableId, RegisteredTable>>,
    bus: EventBus,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bus(&self) -> EventBus {
        self.bus.clone()
    }

    pub fn subscribe(&self, table_id: &str) -> NoticeSubscription {
        self.bus.subscribe(table_id.to_string())
    }

    /// Validate the config, spawn the actor, and publish the opening
    /// notice. Configuration problems surface here, never mid-hand.
    pub fn open(
        &self,
        config: TableConfig,
        timing: TimingProfile,
        profile: RiskProfile,
    ) -> Result<TableId, ConfigError> {
        let engine = Engine::new(config.clone())?;
        let id = Uuid::new_v4().to_string();

        tracing::info!(
            table_id = %id,
            seats = config.seats.len(),
            small_blind = config.rules.small_blind,
            big_blind = config.rules.big_blind,
            "opening table"
        );

        let advisor = create_advisor(profile);
        let (handle, join) = spawn_table(id.clone(), engine, advisor, timing, self.bus.clone());

        self.bus.broadcast(
            &id,
            TableNotice::Opened {
                table_id: id.clone(),
                seats: config.seats.len(),
                small_blind: config.rules.small_blind,
                big_blind: config.rules.big_blind,
            },
        );

        let mut guard = self.tables.write().expect("registry lock poisoned");
        guard.insert(id.clone(), RegisteredTable { handle, join });
        Ok(id)
    }

    pub fn handle(&self, table_id: &str) -> Option<TableHandle> {
        let guard = self.tables.read().expect("registry lock poisoned");
        guard.get(table_id).map(|t| t.handle.clone())
    }

    pub fn active_tables(&self) -> Vec<TableId> {
        let guard = self.tables.read().expect("registry lock poisoned");
        guard.keys().cloned().collect()
    }

    /// Stop a table: ask the actor to shut down gracefully so it can
    /// publish its closing notice, then abort if it does not drain.
    pub async fn close(&self, table_id: &str) -> bool {
        let removed = {
            let mut guard = self.tables.write().expect("registry lock poisoned");
            guard.remove(table_id)
        };
        match removed {
            Some(table) => {
                table.handle.close().await;
                let mut join = table.join;
                if tokio::time::timeout(std::time::Duration::from_secs(5), &mut join)
                    .await
                    .is_err()
                {
                    tracing::warn!(table_id = %table_id, "table actor did not stop; aborting");
                    join.abort();
                }
                true
            }
            None => false,
        }
    }

    /// Close every table; used on shutdown.
    pub async fn close_all(&self) {
        let ids = self.active_tables();
        for id in ids {
            self.close(&id).await;
        }
    }
}
