use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Bot lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "bot_status", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BotStatus {
    Stopped,
    Paused,
    Running,
    Initializing,
}

/// Contract duration unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "duration_unit", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DurationUnit {
    Tick,
    Seconds,
    Minutes,
    Hours,
    Days,
}

/// Settled outcome of a single trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "trade_outcome", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeOutcome {
    Win,
    Loss,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StreakKind {
    Win,
    Loss,
}

/// Bot configuration record. The record store holds the authoritative copy;
/// the mirror's status projection is derived and never written back.
#[derive(Debug, Clone, Serialize)]
pub struct BotConfig {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub contract_type: String,
    pub initial_stake: Decimal,
    pub duration: i32,
    pub duration_unit: DurationUnit,
    pub repeat_trade: bool,
    pub symbol: String,
    pub version: String,
    pub status: BotStatus,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Bot DB row (uses BigDecimal for SQLx compatibility)
#[derive(Debug, Clone, FromRow)]
pub struct BotRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub contract_type: String,
    pub initial_stake: BigDecimal,
    pub duration: i32,
    pub duration_unit: DurationUnit,
    pub repeat_trade: bool,
    pub symbol: String,
    pub version: String,
    pub status: BotStatus,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BotRow> for BotConfig {
    fn from(row: BotRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            contract_type: row.contract_type,
            initial_stake: decimal_from_bigdecimal(row.initial_stake),
            duration: row.duration,
            duration_unit: row.duration_unit,
            repeat_trade: row.repeat_trade,
            symbol: row.symbol,
            version: row.version,
            status: row.status,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Partial update of a bot record. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BotPatch {
    pub name: Option<String>,
    pub contract_type: Option<String>,
    pub initial_stake: Option<Decimal>,
    pub duration: Option<i32>,
    pub duration_unit: Option<DurationUnit>,
    pub repeat_trade: Option<bool>,
    pub symbol: Option<String>,
    pub version: Option<String>,
    pub status: Option<BotStatus>,
    pub is_active: Option<bool>,
}

impl BotPatch {
    /// True when the patch changes a field that is projected into the
    /// mirror's display status.
    pub fn touches_display_status(&self) -> bool {
        self.status.is_some() || self.is_active.is_some()
    }
}

/// Live metrics for the current trading run. Overwritten wholesale on every
/// publish; only `session_id` distinguishes one run from the next.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub bot_id: Uuid,
    pub session_id: String,
    pub number_of_runs: i64,
    pub number_of_wins: i64,
    pub number_of_losses: i64,
    pub total_stake: Decimal,
    pub total_payout: Decimal,
    pub total_profit: Decimal,
    pub commission_payout: Decimal,
    pub real_commission_payout: Decimal,
    pub current_strategy: String,
    pub last_updated: DateTime<Utc>,
}

/// Caller-supplied session snapshot; `last_updated` is stamped at the
/// mirror boundary.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionSnapshot {
    pub bot_id: Uuid,
    pub session_id: String,
    pub number_of_runs: i64,
    pub number_of_wins: i64,
    pub number_of_losses: i64,
    pub total_stake: Decimal,
    pub total_payout: Decimal,
    pub total_profit: Decimal,
    pub commission_payout: Decimal,
    pub real_commission_payout: Decimal,
    pub current_strategy: String,
}

impl SessionSnapshot {
    pub fn into_state(self, last_updated: DateTime<Utc>) -> SessionState {
        SessionState {
            bot_id: self.bot_id,
            session_id: self.session_id,
            number_of_runs: self.number_of_runs,
            number_of_wins: self.number_of_wins,
            number_of_losses: self.number_of_losses,
            total_stake: self.total_stake,
            total_payout: self.total_payout,
            total_profit: self.total_profit,
            commission_payout: self.commission_payout,
            real_commission_payout: self.real_commission_payout,
            current_strategy: self.current_strategy,
            last_updated,
        }
    }
}

/// Compact status projection read by presentation layers. Derived from the
/// bot record; never authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayStatus {
    pub status: BotStatus,
    pub is_active: bool,
    pub last_status_update: DateTime<Utc>,
}

/// One immutable trade record in the audit log.
#[derive(Debug, Clone, Serialize)]
pub struct TradeAudit {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub owner_id: Uuid,
    pub bot_id: Uuid,
    pub session_id: String,
    pub strategy_used: String,
    pub proposal_id: i64,
    pub amount: Decimal,
    pub basis: String,
    pub contract_type: String,
    pub currency: String,
    pub duration: i32,
    pub duration_unit: DurationUnit,
    pub symbol: String,
    pub barrier: Option<Decimal>,
    pub outcome: TradeOutcome,
    pub profit_or_loss: Decimal,
}

/// Trade audit DB row (uses BigDecimal for SQLx compatibility)
#[derive(Debug, Clone, FromRow)]
pub struct TradeAuditRow {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub owner_id: Uuid,
    pub bot_id: Uuid,
    pub session_id: String,
    pub strategy_used: String,
    pub proposal_id: i64,
    pub amount: BigDecimal,
    pub basis: String,
    pub contract_type: String,
    pub currency: String,
    pub duration: i32,
    pub duration_unit: DurationUnit,
    pub symbol: String,
    pub barrier: Option<BigDecimal>,
    pub outcome: TradeOutcome,
    pub profit_or_loss: BigDecimal,
}

impl From<TradeAuditRow> for TradeAudit {
    fn from(row: TradeAuditRow) -> Self {
        Self {
            id: row.id,
            timestamp: row.timestamp,
            owner_id: row.owner_id,
            bot_id: row.bot_id,
            session_id: row.session_id,
            strategy_used: row.strategy_used,
            proposal_id: row.proposal_id,
            amount: decimal_from_bigdecimal(row.amount),
            basis: row.basis,
            contract_type: row.contract_type,
            currency: row.currency,
            duration: row.duration,
            duration_unit: row.duration_unit,
            symbol: row.symbol,
            barrier: row.barrier.map(decimal_from_bigdecimal),
            outcome: row.outcome,
            profit_or_loss: decimal_from_bigdecimal(row.profit_or_loss),
        }
    }
}

/// Trade record as supplied by the caller; `id` and `timestamp` are assigned
/// at append time.
#[derive(Debug, Clone, Deserialize)]
pub struct TradeAuditInput {
    pub owner_id: Uuid,
    pub bot_id: Uuid,
    pub session_id: String,
    pub strategy_used: String,
    pub proposal_id: i64,
    pub amount: Decimal,
    pub basis: String,
    pub contract_type: String,
    pub currency: String,
    pub duration: i32,
    pub duration_unit: DurationUnit,
    pub symbol: String,
    pub barrier: Option<Decimal>,
    pub outcome: TradeOutcome,
    pub profit_or_loss: Decimal,
}

/// Conjunctive audit-log filters. Any subset may be supplied; results are
/// always ordered ascending by timestamp.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditFilter {
    pub owner_id: Option<Uuid>,
    pub bot_id: Option<Uuid>,
    pub session_id: Option<String>,
    pub strategy_used: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

/// A maximal run of same-outcome trades, in chronological order.
#[derive(Debug, Clone, Serialize)]
pub struct TradeStreak {
    pub kind: StreakKind,
    pub length: usize,
    pub start_timestamp: DateTime<Utc>,
    pub end_timestamp: DateTime<Utc>,
    pub trades: Vec<TradeAudit>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StreakReport {
    pub longest_win: Option<TradeStreak>,
    pub longest_loss: Option<TradeStreak>,
}

// Helper conversions between BigDecimal and Decimal
pub fn decimal_from_bigdecimal(bd: BigDecimal) -> Decimal {
    bd.to_string().parse().unwrap_or_default()
}

pub fn bigdecimal_from_decimal(d: Decimal) -> BigDecimal {
    d.to_string().parse().unwrap_or_default()
}

// Request types for API

#[derive(Debug, Clone, Deserialize, validator::Validate)]
pub struct CreateBotRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1))]
    pub contract_type: String,
    pub initial_stake: Decimal,
    #[validate(range(min = 1))]
    pub duration: i32,
    pub duration_unit: DurationUnit,
    pub repeat_trade: bool,
    #[validate(length(min = 1))]
    pub symbol: String,
    #[validate(length(min = 1))]
    pub version: String,
    pub status: BotStatus,
    pub is_active: bool,
}

// Response types for API

#[derive(Debug, Serialize)]
pub struct ListBotsResponse {
    pub bots: Vec<BotConfig>,
    pub total: i64,
}

#[derive(Debug, Serialize)]
pub struct AuditsResponse {
    pub audits: Vec<TradeAudit>,
    pub total: i64,
}
