//! Bot lifecycle: create/read/update/delete of bot configuration, with
//! best-effort propagation of the display-status projection into the mirror.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{RegistryError, StoreError};
use crate::models::{BotConfig, BotPatch, CreateBotRequest, DisplayStatus};
use crate::observability::{metrics, MetricsCollector};
use crate::store::{MirrorStore, RecordStore};

#[derive(Clone)]
pub struct BotRegistry {
    records: Arc<dyn RecordStore>,
    mirror: Arc<dyn MirrorStore>,
    metrics: MetricsCollector,
}

impl BotRegistry {
    pub fn new(
        records: Arc<dyn RecordStore>,
        mirror: Arc<dyn MirrorStore>,
        metrics: MetricsCollector,
    ) -> Self {
        Self {
            records,
            mirror,
            metrics,
        }
    }

    pub async fn create(
        &self,
        owner_id: Uuid,
        req: CreateBotRequest,
    ) -> Result<BotConfig, RegistryError> {
        validate_fields(&req.name, req.initial_stake, req.duration)?;

        let now = Utc::now();
        let bot = BotConfig {
            id: Uuid::new_v4(),
            owner_id,
            name: req.name,
            contract_type: req.contract_type,
            initial_stake: req.initial_stake,
            duration: req.duration,
            duration_unit: req.duration_unit,
            repeat_trade: req.repeat_trade,
            symbol: req.symbol,
            version: req.version,
            status: req.status,
            is_active: req.is_active,
            created_at: now,
            updated_at: now,
        };

        self.records.insert_bot(&bot).await?;
        self.mirror_display_status(&bot).await;
        self.metrics.increment(metrics::BOT_CREATED, 1).await;

        info!("Created bot {} for owner {}", bot.id, owner_id);

        Ok(bot)
    }

    pub async fn get(
        &self,
        owner_id: Uuid,
        bot_id: Uuid,
    ) -> Result<Option<BotConfig>, RegistryError> {
        Ok(self.records.fetch_bot(owner_id, bot_id).await?)
    }

    pub async fn list(&self, owner_id: Uuid) -> Result<Vec<BotConfig>, RegistryError> {
        Ok(self.records.list_bots(owner_id).await?)
    }

    pub async fn update(
        &self,
        owner_id: Uuid,
        bot_id: Uuid,
        patch: BotPatch,
    ) -> Result<BotConfig, RegistryError> {
        if let Some(name) = &patch.name {
            if name.is_empty() || name.len() > 100 {
                return Err(RegistryError::Validation(
                    "name must be 1-100 characters".to_string(),
                ));
            }
        }
        if let Some(stake) = patch.initial_stake {
            if stake <= Decimal::ZERO {
                return Err(RegistryError::Validation(
                    "initial_stake must be positive".to_string(),
                ));
            }
        }
        if let Some(duration) = patch.duration {
            if duration < 1 {
                return Err(RegistryError::Validation(
                    "duration must be at least 1".to_string(),
                ));
            }
        }

        self.records
            .update_bot(owner_id, bot_id, &patch, Utc::now())
            .await?;

        // Re-read the full record so the mirror always receives status and
        // is_active as a pair, even when the patch carried only one of them.
        // Not atomic with the update; a concurrent writer can win in between
        // and the record store stays authoritative.
        let bot = self
            .records
            .fetch_bot(owner_id, bot_id)
            .await?
            .ok_or(StoreError::NotFound)?;

        if patch.touches_display_status() {
            self.mirror_display_status(&bot).await;
        }
        self.metrics.increment(metrics::BOT_UPDATED, 1).await;

        Ok(bot)
    }

    pub async fn delete(&self, owner_id: Uuid, bot_id: Uuid) -> Result<(), RegistryError> {
        self.records.delete_bot(owner_id, bot_id).await?;

        // Audit records for this bot are intentionally left in place.
        if let Err(e) = self.mirror.remove_bot(bot_id).await {
            warn!("Failed to remove mirror entries for bot {}: {}", bot_id, e);
            self.metrics
                .increment(metrics::MIRROR_DELETE_FAILED, 1)
                .await;
        }
        self.metrics.increment(metrics::BOT_DELETED, 1).await;

        info!("Deleted bot {} for owner {}", bot_id, owner_id);

        Ok(())
    }

    /// Presentation-side read of the mirrored status projection.
    pub async fn display_status(
        &self,
        bot_id: Uuid,
    ) -> Result<Option<DisplayStatus>, RegistryError> {
        Ok(self.mirror.get_display_status(bot_id).await?)
    }

    async fn mirror_display_status(&self, bot: &BotConfig) {
        // Do not surface errors; this is a secondary write to a mirror
        if let Err(e) = self
            .mirror
            .put_display_status(bot.id, bot.status, bot.is_active)
            .await
        {
            warn!("Failed to mirror display status for bot {}: {}", bot.id, e);
            self.metrics
                .increment(metrics::MIRROR_WRITE_FAILED, 1)
                .await;
        }
    }
}

fn validate_fields(name: &str, initial_stake: Decimal, duration: i32) -> Result<(), RegistryError> {
    if name.is_empty() || name.len() > 100 {
        return Err(RegistryError::Validation(
            "name must be 1-100 characters".to_string(),
        ));
    }
    if initial_stake <= Decimal::ZERO {
        return Err(RegistryError::Validation(
            "initial_stake must be positive".to_string(),
        ));
    }
    if duration < 1 {
        return Err(RegistryError::Validation(
            "duration must be at least 1".to_string(),
        ));
    }
    Ok(())
}
