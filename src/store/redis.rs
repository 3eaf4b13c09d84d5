//! Redis mirror implementation.
//!
//! Values are whole JSON documents keyed per bot; every write is a replace.
//! Timestamps are stamped here, at the mirror boundary.

use async_trait::async_trait;
use chrono::Utc;
use redis::AsyncCommands;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{BotStatus, DisplayStatus, SessionSnapshot, SessionState};
use crate::store::MirrorStore;

pub struct RedisMirror {
    conn: redis::aio::MultiplexedConnection,
}

impl RedisMirror {
    pub async fn new(redis_url: &str) -> anyhow::Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_multiplexed_async_connection().await?;

        Ok(Self { conn })
    }
}

fn session_key(bot_id: Uuid) -> String {
    format!("bot_sessions:{}", bot_id)
}

fn status_key(bot_id: Uuid) -> String {
    format!("bot_display_status:{}", bot_id)
}

#[async_trait]
impl MirrorStore for RedisMirror {
    async fn put_session_state(
        &self,
        snapshot: &SessionSnapshot,
    ) -> Result<SessionState, StoreError> {
        let state = snapshot.clone().into_state(Utc::now());
        let json = serde_json::to_string(&state)?;

        // Explicit type annotation to avoid never type fallback
        let _: () = self.conn.clone().set(session_key(state.bot_id), json).await?;

        Ok(state)
    }

    async fn get_session_state(&self, bot_id: Uuid) -> Result<Option<SessionState>, StoreError> {
        let value: Option<String> = self.conn.clone().get(session_key(bot_id)).await?;

        match value {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn put_display_status(
        &self,
        bot_id: Uuid,
        status: BotStatus,
        is_active: bool,
    ) -> Result<(), StoreError> {
        let projection = DisplayStatus {
            status,
            is_active,
            last_status_update: Utc::now(),
        };
        let json = serde_json::to_string(&projection)?;

        let _: () = self.conn.clone().set(status_key(bot_id), json).await?;

        Ok(())
    }

    async fn get_display_status(&self, bot_id: Uuid) -> Result<Option<DisplayStatus>, StoreError> {
        let value: Option<String> = self.conn.clone().get(status_key(bot_id)).await?;

        match value {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn remove_bot(&self, bot_id: Uuid) -> Result<(), StoreError> {
        let _: () = self
            .conn
            .clone()
            .del(vec![session_key(bot_id), status_key(bot_id)])
            .await?;

        Ok(())
    }
}
