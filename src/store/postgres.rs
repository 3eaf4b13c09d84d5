//! Postgres backends for the record store and the audit log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::db::Db;
use crate::error::StoreError;
use crate::models::{
    bigdecimal_from_decimal, AuditFilter, BotConfig, BotPatch, BotRow, TradeAudit, TradeAuditRow,
};
use crate::store::{AuditStore, RecordStore};

pub struct PgRecordStore {
    pool: Db,
}

impl PgRecordStore {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn insert_bot(&self, bot: &BotConfig) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO bots (
                id, owner_id, name, contract_type, initial_stake, duration,
                duration_unit, repeat_trade, symbol, version, status, is_active,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(bot.id)
        .bind(bot.owner_id)
        .bind(&bot.name)
        .bind(&bot.contract_type)
        .bind(bigdecimal_from_decimal(bot.initial_stake))
        .bind(bot.duration)
        .bind(bot.duration_unit)
        .bind(bot.repeat_trade)
        .bind(&bot.symbol)
        .bind(&bot.version)
        .bind(bot.status)
        .bind(bot.is_active)
        .bind(bot.created_at)
        .bind(bot.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn fetch_bot(
        &self,
        owner_id: Uuid,
        bot_id: Uuid,
    ) -> Result<Option<BotConfig>, StoreError> {
        let row = sqlx::query_as::<_, BotRow>("SELECT * FROM bots WHERE owner_id = $1 AND id = $2")
            .bind(owner_id)
            .bind(bot_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    async fn list_bots(&self, owner_id: Uuid) -> Result<Vec<BotConfig>, StoreError> {
        let rows = sqlx::query_as::<_, BotRow>(
            "SELECT * FROM bots WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_bot(
        &self,
        owner_id: Uuid,
        bot_id: Uuid,
        patch: &BotPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE bots SET
                name = COALESCE($3, name),
                contract_type = COALESCE($4, contract_type),
                initial_stake = COALESCE($5, initial_stake),
                duration = COALESCE($6, duration),
                duration_unit = COALESCE($7, duration_unit),
                repeat_trade = COALESCE($8, repeat_trade),
                symbol = COALESCE($9, symbol),
                version = COALESCE($10, version),
                status = COALESCE($11, status),
                is_active = COALESCE($12, is_active),
                updated_at = $13
            WHERE owner_id = $1 AND id = $2
            "#,
        )
        .bind(owner_id)
        .bind(bot_id)
        .bind(patch.name.clone())
        .bind(patch.contract_type.clone())
        .bind(patch.initial_stake.map(bigdecimal_from_decimal))
        .bind(patch.duration)
        .bind(patch.duration_unit)
        .bind(patch.repeat_trade)
        .bind(patch.symbol.clone())
        .bind(patch.version.clone())
        .bind(patch.status)
        .bind(patch.is_active)
        .bind(updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    async fn delete_bot(&self, owner_id: Uuid, bot_id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM bots WHERE owner_id = $1 AND id = $2")
            .bind(owner_id)
            .bind(bot_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }
}

pub struct PgAuditStore {
    pool: Db,
}

impl PgAuditStore {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditStore for PgAuditStore {
    async fn insert_audit(&self, record: &TradeAudit) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO trade_audits (
                id, timestamp, owner_id, bot_id, session_id, strategy_used,
                proposal_id, amount, basis, contract_type, currency, duration,
                duration_unit, symbol, barrier, outcome, profit_or_loss
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                $15, $16, $17
            )
            "#,
        )
        .bind(record.id)
        .bind(record.timestamp)
        .bind(record.owner_id)
        .bind(record.bot_id)
        .bind(&record.session_id)
        .bind(&record.strategy_used)
        .bind(record.proposal_id)
        .bind(bigdecimal_from_decimal(record.amount))
        .bind(&record.basis)
        .bind(&record.contract_type)
        .bind(&record.currency)
        .bind(record.duration)
        .bind(record.duration_unit)
        .bind(&record.symbol)
        .bind(record.barrier.map(bigdecimal_from_decimal))
        .bind(record.outcome)
        .bind(bigdecimal_from_decimal(record.profit_or_loss))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn query_audits(&self, filter: &AuditFilter) -> Result<Vec<TradeAudit>, StoreError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM trade_audits WHERE 1 = 1");

        if let Some(owner_id) = filter.owner_id {
            qb.push(" AND owner_id = ");
            qb.push_bind(owner_id);
        }
        if let Some(bot_id) = filter.bot_id {
            qb.push(" AND bot_id = ");
            qb.push_bind(bot_id);
        }
        if let Some(session_id) = &filter.session_id {
            qb.push(" AND session_id = ");
            qb.push_bind(session_id.clone());
        }
        if let Some(strategy) = &filter.strategy_used {
            qb.push(" AND strategy_used = ");
            qb.push_bind(strategy.clone());
        }
        if let Some(start) = filter.start_time {
            qb.push(" AND timestamp >= ");
            qb.push_bind(start);
        }
        if let Some(end) = filter.end_time {
            qb.push(" AND timestamp <= ");
            qb.push_bind(end);
        }

        // Always order for streak analysis
        qb.push(" ORDER BY timestamp ASC");

        let rows: Vec<TradeAuditRow> = qb.build_query_as().fetch_all(&self.pool).await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
