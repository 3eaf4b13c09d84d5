//! Store contracts for the two asymmetric stores and the audit log.
//!
//! The record store is durable and authoritative; the mirror store is a
//! best-effort, low-latency projection; the audit store is append-only.
//! Backends are injected as trait objects so the service layer never knows
//! which one it is talking to.

pub mod memory;
pub mod postgres;
pub mod redis;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{
    AuditFilter, BotConfig, BotPatch, BotStatus, DisplayStatus, SessionSnapshot, SessionState,
    TradeAudit,
};

pub use self::memory::{MemoryAuditStore, MemoryMirror, MemoryRecordStore};
pub use self::postgres::{PgAuditStore, PgRecordStore};
pub use self::redis::RedisMirror;

/// Durable, strongly consistent storage of bot configuration, keyed by
/// `(owner_id, bot_id)`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert_bot(&self, bot: &BotConfig) -> Result<(), StoreError>;

    async fn fetch_bot(&self, owner_id: Uuid, bot_id: Uuid)
        -> Result<Option<BotConfig>, StoreError>;

    /// All bots for an owner, newest first.
    async fn list_bots(&self, owner_id: Uuid) -> Result<Vec<BotConfig>, StoreError>;

    /// Merges the supplied fields into an existing record and refreshes
    /// `updated_at`. Fails with `NotFound` when the record does not exist.
    async fn update_bot(
        &self,
        owner_id: Uuid,
        bot_id: Uuid,
        patch: &BotPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Removes the record. Fails with `NotFound` when the record does not
    /// exist.
    async fn delete_bot(&self, owner_id: Uuid, bot_id: Uuid) -> Result<(), StoreError>;
}

/// Low-latency storage of the two derived per-bot views. Writes are
/// whole-value replaces; the store stamps its own timestamps.
#[async_trait]
pub trait MirrorStore: Send + Sync {
    /// Wholesale replace of the bot's live session metrics. Returns the
    /// stored state with the stamped `last_updated`.
    async fn put_session_state(&self, snapshot: &SessionSnapshot)
        -> Result<SessionState, StoreError>;

    async fn get_session_state(&self, bot_id: Uuid) -> Result<Option<SessionState>, StoreError>;

    /// Replaces the bot's display-status projection, stamping
    /// `last_status_update`.
    async fn put_display_status(
        &self,
        bot_id: Uuid,
        status: BotStatus,
        is_active: bool,
    ) -> Result<(), StoreError>;

    async fn get_display_status(&self, bot_id: Uuid)
        -> Result<Option<DisplayStatus>, StoreError>;

    /// Removes every mirror entry for the bot.
    async fn remove_bot(&self, bot_id: Uuid) -> Result<(), StoreError>;
}

/// Append-only, queryable storage of immutable trade records.
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn insert_audit(&self, record: &TradeAudit) -> Result<(), StoreError>;

    /// Conjunctive filters, results ascending by timestamp. The ordering is
    /// load-bearing: streak analysis assumes chronological input and never
    /// re-sorts.
    async fn query_audits(&self, filter: &AuditFilter) -> Result<Vec<TradeAudit>, StoreError>;
}
