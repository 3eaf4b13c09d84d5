//! Trade audit trail: immutable appends and ordered, filtered reads, plus
//! the streak report composed on top of them.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::error::RegistryError;
use crate::models::{AuditFilter, StreakReport, TradeAudit, TradeAuditInput};
use crate::observability::{metrics, MetricsCollector};
use crate::store::AuditStore;
use crate::streaks;

#[derive(Clone)]
pub struct AuditTrail {
    store: Arc<dyn AuditStore>,
    metrics: MetricsCollector,
}

impl AuditTrail {
    pub fn new(store: Arc<dyn AuditStore>, metrics: MetricsCollector) -> Self {
        Self { store, metrics }
    }

    /// Append one trade record. The id and timestamp are assigned here, at
    /// write time; re-invoking with the same payload produces a new record.
    pub async fn append(&self, input: TradeAuditInput) -> Result<TradeAudit, RegistryError> {
        if input.session_id.is_empty() {
            return Err(RegistryError::Validation(
                "session_id is required".to_string(),
            ));
        }
        if input.amount <= Decimal::ZERO {
            return Err(RegistryError::Validation(
                "amount must be positive".to_string(),
            ));
        }

        let record = TradeAudit {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            owner_id: input.owner_id,
            bot_id: input.bot_id,
            session_id: input.session_id,
            strategy_used: input.strategy_used,
            proposal_id: input.proposal_id,
            amount: input.amount,
            basis: input.basis,
            contract_type: input.contract_type,
            currency: input.currency,
            duration: input.duration,
            duration_unit: input.duration_unit,
            symbol: input.symbol,
            barrier: input.barrier,
            outcome: input.outcome,
            profit_or_loss: input.profit_or_loss,
        };

        self.store.insert_audit(&record).await?;
        self.metrics.increment(metrics::AUDIT_APPENDED, 1).await;

        debug!(
            "Appended audit {} for bot {} ({:?})",
            record.id, record.bot_id, record.outcome
        );

        Ok(record)
    }

    /// Filtered slice of the log, ascending by timestamp.
    pub async fn query(&self, filter: &AuditFilter) -> Result<Vec<TradeAudit>, RegistryError> {
        let records = self.store.query_audits(filter).await?;
        self.metrics.increment(metrics::AUDIT_QUERIES, 1).await;
        Ok(records)
    }

    /// Query the matching slice and compute longest win/loss streaks on it.
    pub async fn streak_report(&self, filter: &AuditFilter) -> Result<StreakReport, RegistryError> {
        let records = self.query(filter).await?;
        self.metrics.increment(metrics::STREAK_ANALYSES, 1).await;
        Ok(streaks::analyze(&records))
    }
}
