//! In-memory store backends.
//!
//! Used by tests as injectable doubles and as the mirror fallback when no
//! Redis is configured. The mirror double can be switched into a failing
//! mode to exercise the divergence window between the two stores.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{
    AuditFilter, BotConfig, BotPatch, BotStatus, DisplayStatus, SessionSnapshot, SessionState,
    TradeAudit,
};
use crate::store::{AuditStore, MirrorStore, RecordStore};

#[derive(Default)]
pub struct MemoryRecordStore {
    bots: RwLock<HashMap<(Uuid, Uuid), BotConfig>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert_bot(&self, bot: &BotConfig) -> Result<(), StoreError> {
        let mut bots = self.bots.write().await;
        bots.insert((bot.owner_id, bot.id), bot.clone());
        Ok(())
    }

    async fn fetch_bot(
        &self,
        owner_id: Uuid,
        bot_id: Uuid,
    ) -> Result<Option<BotConfig>, StoreError> {
        let bots = self.bots.read().await;
        Ok(bots.get(&(owner_id, bot_id)).cloned())
    }

    async fn list_bots(&self, owner_id: Uuid) -> Result<Vec<BotConfig>, StoreError> {
        let bots = self.bots.read().await;
        let mut owned: Vec<BotConfig> = bots
            .values()
            .filter(|b| b.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn update_bot(
        &self,
        owner_id: Uuid,
        bot_id: Uuid,
        patch: &BotPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut bots = self.bots.write().await;
        let bot = bots
            .get_mut(&(owner_id, bot_id))
            .ok_or(StoreError::NotFound)?;

        if let Some(name) = &patch.name {
            bot.name = name.clone();
        }
        if let Some(contract_type) = &patch.contract_type {
            bot.contract_type = contract_type.clone();
        }
        if let Some(initial_stake) = patch.initial_stake {
            bot.initial_stake = initial_stake;
        }
        if let Some(duration) = patch.duration {
            bot.duration = duration;
        }
        if let Some(duration_unit) = patch.duration_unit {
            bot.duration_unit = duration_unit;
        }
        if let Some(repeat_trade) = patch.repeat_trade {
            bot.repeat_trade = repeat_trade;
        }
        if let Some(symbol) = &patch.symbol {
            bot.symbol = symbol.clone();
        }
        if let Some(version) = &patch.version {
            bot.version = version.clone();
        }
        if let Some(status) = patch.status {
            bot.status = status;
        }
        if let Some(is_active) = patch.is_active {
            bot.is_active = is_active;
        }
        bot.updated_at = updated_at;

        Ok(())
    }

    async fn delete_bot(&self, owner_id: Uuid, bot_id: Uuid) -> Result<(), StoreError> {
        let mut bots = self.bots.write().await;
        bots.remove(&(owner_id, bot_id))
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[derive(Default)]
pub struct MemoryMirror {
    sessions: RwLock<HashMap<Uuid, SessionState>>,
    statuses: RwLock<HashMap<Uuid, DisplayStatus>>,
    fail_writes: AtomicBool,
}

impl MemoryMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write/remove fail, to simulate an unavailable
    /// mirror.
    pub fn set_failing(&self, failing: bool) {
        self.fail_writes.store(failing, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("mirror unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl MirrorStore for MemoryMirror {
    async fn put_session_state(
        &self,
        snapshot: &SessionSnapshot,
    ) -> Result<SessionState, StoreError> {
        self.check_available()?;
        let state = snapshot.clone().into_state(Utc::now());
        let mut sessions = self.sessions.write().await;
        sessions.insert(state.bot_id, state.clone());
        Ok(state)
    }

    async fn get_session_state(&self, bot_id: Uuid) -> Result<Option<SessionState>, StoreError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(&bot_id).cloned())
    }

    async fn put_display_status(
        &self,
        bot_id: Uuid,
        status: BotStatus,
        is_active: bool,
    ) -> Result<(), StoreError> {
        self.check_available()?;
        let mut statuses = self.statuses.write().await;
        statuses.insert(
            bot_id,
            DisplayStatus {
                status,
                is_active,
                last_status_update: Utc::now(),
            },
        );
        Ok(())
    }

    async fn get_display_status(&self, bot_id: Uuid) -> Result<Option<DisplayStatus>, StoreError> {
        let statuses = self.statuses.read().await;
        Ok(statuses.get(&bot_id).cloned())
    }

    async fn remove_bot(&self, bot_id: Uuid) -> Result<(), StoreError> {
        self.check_available()?;
        self.sessions.write().await.remove(&bot_id);
        self.statuses.write().await.remove(&bot_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryAuditStore {
    records: RwLock<Vec<TradeAudit>>,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn insert_audit(&self, record: &TradeAudit) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        records.push(record.clone());
        Ok(())
    }

    async fn query_audits(&self, filter: &AuditFilter) -> Result<Vec<TradeAudit>, StoreError> {
        let records = self.records.read().await;
        let mut matched: Vec<TradeAudit> = records
            .iter()
            .filter(|r| {
                filter.owner_id.map_or(true, |v| r.owner_id == v)
                    && filter.bot_id.map_or(true, |v| r.bot_id == v)
                    && filter
                        .session_id
                        .as_ref()
                        .map_or(true, |v| &r.session_id == v)
                    && filter
                        .strategy_used
                        .as_ref()
                        .map_or(true, |v| &r.strategy_used == v)
                    && filter.start_time.map_or(true, |v| r.timestamp >= v)
                    && filter.end_time.map_or(true, |v| r.timestamp <= v)
            })
            .cloned()
            .collect();
        // Stable sort keeps append order for equal timestamps
        matched.sort_by_key(|r| r.timestamp);
        Ok(matched)
    }
}
