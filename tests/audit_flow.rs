//! Audit trail flows: append, ordered queries, and streak reports, driven
//! the way a trading run drives them.

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use bot_registry::audit::AuditTrail;
use bot_registry::error::RegistryError;
use bot_registry::models::{AuditFilter, DurationUnit, SessionSnapshot, TradeAuditInput, TradeOutcome};
use bot_registry::observability::MetricsCollector;
use bot_registry::session::SessionPublisher;
use bot_registry::store::{MemoryAuditStore, MemoryMirror};

fn setup() -> AuditTrail {
    AuditTrail::new(Arc::new(MemoryAuditStore::new()), MetricsCollector::new())
}

fn input(owner_id: Uuid, bot_id: Uuid, session_id: &str, outcome: TradeOutcome) -> TradeAuditInput {
    TradeAuditInput {
        owner_id,
        bot_id,
        session_id: session_id.to_string(),
        strategy_used: "MartingaleV1".to_string(),
        proposal_id: 1,
        amount: Decimal::from(10),
        basis: "stake".to_string(),
        contract_type: "CALL".to_string(),
        currency: "USD".to_string(),
        duration: 5,
        duration_unit: DurationUnit::Tick,
        symbol: "R_100".to_string(),
        barrier: None,
        outcome,
        profit_or_loss: match outcome {
            TradeOutcome::Win => Decimal::from(5),
            TradeOutcome::Loss => Decimal::from(-5),
            TradeOutcome::Pending => Decimal::ZERO,
        },
    }
}

#[tokio::test]
async fn identical_payloads_produce_distinct_records() {
    let trail = setup();
    let owner = Uuid::new_v4();
    let bot = Uuid::new_v4();

    let first = trail
        .append(input(owner, bot, "session-1", TradeOutcome::Win))
        .await
        .unwrap();
    let second = trail
        .append(input(owner, bot, "session-1", TradeOutcome::Win))
        .await
        .unwrap();

    // No implicit deduplication
    assert_ne!(first.id, second.id);
    assert_ne!(first.timestamp, second.timestamp);

    let all = trail.query(&AuditFilter::default()).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn queries_are_ordered_ascending_under_every_filter() {
    let trail = setup();
    let owner = Uuid::new_v4();
    let bot_a = Uuid::new_v4();
    let bot_b = Uuid::new_v4();

    for i in 0..6 {
        let bot = if i % 2 == 0 { bot_a } else { bot_b };
        let outcome = if i < 3 { TradeOutcome::Win } else { TradeOutcome::Loss };
        trail.append(input(owner, bot, "session-1", outcome)).await.unwrap();
    }

    let unfiltered = trail.query(&AuditFilter::default()).await.unwrap();
    assert_eq!(unfiltered.len(), 6);
    assert!(unfiltered.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

    let filtered = trail
        .query(&AuditFilter {
            bot_id: Some(bot_a),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(filtered.len(), 3);
    assert!(filtered.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

    // Equality filters never change the relative order of matching records.
    let expected: Vec<Uuid> = unfiltered
        .iter()
        .filter(|r| r.bot_id == bot_a)
        .map(|r| r.id)
        .collect();
    let actual: Vec<Uuid> = filtered.iter().map(|r| r.id).collect();
    assert_eq!(actual, expected);
}

#[tokio::test]
async fn filters_are_conjunctive() {
    let trail = setup();
    let owner_a = Uuid::new_v4();
    let owner_b = Uuid::new_v4();
    let bot = Uuid::new_v4();

    trail.append(input(owner_a, bot, "session-1", TradeOutcome::Win)).await.unwrap();
    trail.append(input(owner_b, bot, "session-1", TradeOutcome::Win)).await.unwrap();
    trail.append(input(owner_a, bot, "session-2", TradeOutcome::Loss)).await.unwrap();

    let matched = trail
        .query(&AuditFilter {
            owner_id: Some(owner_a),
            session_id: Some("session-1".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].owner_id, owner_a);
    assert_eq!(matched[0].session_id, "session-1");
}

#[tokio::test]
async fn time_range_filters_are_inclusive() {
    let trail = setup();
    let owner = Uuid::new_v4();
    let bot = Uuid::new_v4();

    let mut stamped = Vec::new();
    for _ in 0..4 {
        stamped.push(
            trail
                .append(input(owner, bot, "session-1", TradeOutcome::Win))
                .await
                .unwrap(),
        );
    }

    let from_second = trail
        .query(&AuditFilter {
            start_time: Some(stamped[1].timestamp),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(from_second.len(), 3);
    assert_eq!(from_second[0].id, stamped[1].id);

    let middle = trail
        .query(&AuditFilter {
            start_time: Some(stamped[1].timestamp),
            end_time: Some(stamped[2].timestamp),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(middle.len(), 2);
}

#[tokio::test]
async fn append_rejects_structurally_invalid_records() {
    let trail = setup();
    let owner = Uuid::new_v4();
    let bot = Uuid::new_v4();

    let err = trail
        .append(input(owner, bot, "", TradeOutcome::Win))
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::Validation(_)));

    let mut zero_amount = input(owner, bot, "session-1", TradeOutcome::Win);
    zero_amount.amount = Decimal::ZERO;
    let err = trail.append(zero_amount).await.unwrap_err();
    assert!(matches!(err, RegistryError::Validation(_)));
}

#[tokio::test]
async fn streak_report_runs_over_the_filtered_slice() {
    let trail = setup();
    let owner = Uuid::new_v4();
    let bot = Uuid::new_v4();
    let other_bot = Uuid::new_v4();

    use TradeOutcome::{Loss, Win};
    for outcome in [Win, Win, Loss, Win, Win, Win, Loss] {
        trail.append(input(owner, bot, "session-1", outcome)).await.unwrap();
        // Interleaved noise from another bot must not leak into the report.
        trail.append(input(owner, other_bot, "session-9", Loss)).await.unwrap();
    }

    let report = trail
        .streak_report(&AuditFilter {
            bot_id: Some(bot),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(report.longest_win.unwrap().length, 3);
    assert_eq!(report.longest_loss.unwrap().length, 1);
}

#[tokio::test]
async fn pending_trades_break_streaks_end_to_end() {
    let trail = setup();
    let owner = Uuid::new_v4();
    let bot = Uuid::new_v4();

    use TradeOutcome::{Pending, Win};
    for outcome in [Win, Pending, Win] {
        trail.append(input(owner, bot, "session-1", outcome)).await.unwrap();
    }

    let report = trail.streak_report(&AuditFilter::default()).await.unwrap();
    assert_eq!(report.longest_win.unwrap().length, 1);
    assert!(report.longest_loss.is_none());
}

/// One logical trading run: each trade publishes the full session snapshot,
/// then appends one audit record, strictly sequentially.
#[tokio::test]
async fn trading_run_publishes_then_appends_per_trade() {
    let trail = setup();
    let mirror = Arc::new(MemoryMirror::new());
    let publisher = SessionPublisher::new(mirror, MetricsCollector::new());

    let owner = Uuid::new_v4();
    let bot = Uuid::new_v4();
    let session_id = "session-1700000000";

    use TradeOutcome::{Loss, Win};
    let outcomes = [Win, Loss, Win, Win, Loss];
    let mut wins = 0i64;
    let mut losses = 0i64;

    for (i, outcome) in outcomes.iter().enumerate() {
        match outcome {
            Win => wins += 1,
            _ => losses += 1,
        }

        publisher
            .publish(SessionSnapshot {
                bot_id: bot,
                session_id: session_id.to_string(),
                number_of_runs: (i + 1) as i64,
                number_of_wins: wins,
                number_of_losses: losses,
                total_stake: Decimal::from(10 * (i + 1) as i64),
                total_payout: Decimal::from(15 * wins),
                total_profit: Decimal::from(5 * wins - 5 * losses),
                commission_payout: Decimal::ZERO,
                real_commission_payout: Decimal::ZERO,
                current_strategy: "MartingaleV1".to_string(),
            })
            .await
            .unwrap();

        trail
            .append(input(owner, bot, session_id, *outcome))
            .await
            .unwrap();
    }

    let state = publisher.current(bot).await.unwrap().unwrap();
    assert_eq!(state.number_of_runs, 5);
    assert_eq!(state.number_of_wins, 3);
    assert_eq!(state.number_of_losses, 2);

    let audits = trail
        .query(&AuditFilter {
            session_id: Some(session_id.to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(audits.len(), 5);

    let report = trail
        .streak_report(&AuditFilter {
            bot_id: Some(bot),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(report.longest_win.unwrap().length, 2);
    assert_eq!(report.longest_loss.unwrap().length, 1);
}
