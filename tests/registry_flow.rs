//! Lifecycle and session-state flows over the in-memory store doubles.

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use bot_registry::error::RegistryError;
use bot_registry::models::{
    BotPatch, BotStatus, CreateBotRequest, DurationUnit, SessionSnapshot,
};
use bot_registry::observability::{metrics, MetricsCollector};
use bot_registry::registry::BotRegistry;
use bot_registry::session::SessionPublisher;
use bot_registry::store::{MemoryMirror, MemoryRecordStore, MirrorStore};

fn sample_request() -> CreateBotRequest {
    CreateBotRequest {
        name: "MyAwesomeBot".to_string(),
        contract_type: "CALL".to_string(),
        initial_stake: Decimal::from(10),
        duration: 5,
        duration_unit: DurationUnit::Tick,
        repeat_trade: true,
        symbol: "R_100".to_string(),
        version: "1.0.0".to_string(),
        status: BotStatus::Initializing,
        is_active: false,
    }
}

fn setup() -> (BotRegistry, Arc<MemoryMirror>, MetricsCollector) {
    let records = Arc::new(MemoryRecordStore::new());
    let mirror = Arc::new(MemoryMirror::new());
    let collector = MetricsCollector::new();
    let registry = BotRegistry::new(records, mirror.clone(), collector.clone());
    (registry, mirror, collector)
}

#[tokio::test]
async fn create_then_update_reflects_last_write_per_field() {
    let (registry, _, _) = setup();
    let owner = Uuid::new_v4();

    let bot = registry.create(owner, sample_request()).await.unwrap();
    assert_eq!(bot.created_at, bot.updated_at);

    let renamed = registry
        .update(
            owner,
            bot.id,
            BotPatch {
                name: Some("RenamedBot".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "RenamedBot");
    assert_eq!(renamed.status, BotStatus::Initializing);
    assert!(renamed.updated_at >= bot.updated_at);

    let running = registry
        .update(
            owner,
            bot.id,
            BotPatch {
                status: Some(BotStatus::Running),
                is_active: Some(true),
                initial_stake: Some(Decimal::from(25)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(running.updated_at >= renamed.updated_at);

    let current = registry.get(owner, bot.id).await.unwrap().unwrap();
    assert_eq!(current.name, "RenamedBot");
    assert_eq!(current.status, BotStatus::Running);
    assert!(current.is_active);
    assert_eq!(current.initial_stake, Decimal::from(25));
    assert_eq!(current.created_at, bot.created_at);
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
    let (registry, _, _) = setup();
    let owner = Uuid::new_v4();

    let bot = registry.create(owner, sample_request()).await.unwrap();
    registry.delete(owner, bot.id).await.unwrap();

    assert!(registry.get(owner, bot.id).await.unwrap().is_none());

    let err = registry.delete(owner, bot.id).await.unwrap_err();
    assert!(matches!(err, RegistryError::Persistence(_)));
}

#[tokio::test]
async fn create_projects_display_status_into_mirror() {
    let (registry, mirror, _) = setup();
    let owner = Uuid::new_v4();

    let bot = registry.create(owner, sample_request()).await.unwrap();

    let projected = mirror.get_display_status(bot.id).await.unwrap().unwrap();
    assert_eq!(projected.status, BotStatus::Initializing);
    assert!(!projected.is_active);
}

#[tokio::test]
async fn status_only_patch_mirrors_both_fields_together() {
    let (registry, mirror, _) = setup();
    let owner = Uuid::new_v4();

    let mut req = sample_request();
    req.is_active = true;
    req.status = BotStatus::Paused;
    let bot = registry.create(owner, req).await.unwrap();

    registry
        .update(
            owner,
            bot.id,
            BotPatch {
                status: Some(BotStatus::Running),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // is_active was not in the patch; the mirror pairing is filled from the
    // re-read record.
    let projected = mirror.get_display_status(bot.id).await.unwrap().unwrap();
    assert_eq!(projected.status, BotStatus::Running);
    assert!(projected.is_active);
}

#[tokio::test]
async fn non_status_patch_leaves_mirror_untouched() {
    let (registry, mirror, collector) = setup();
    let owner = Uuid::new_v4();

    let bot = registry.create(owner, sample_request()).await.unwrap();

    mirror.set_failing(true);
    registry
        .update(
            owner,
            bot.id,
            BotPatch {
                symbol: Some("R_50".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(collector.get_counter(metrics::MIRROR_WRITE_FAILED).await, 0);
}

#[tokio::test]
async fn mirror_failure_never_fails_create() {
    let (registry, mirror, collector) = setup();
    let owner = Uuid::new_v4();

    mirror.set_failing(true);
    let bot = registry.create(owner, sample_request()).await.unwrap();

    // Primary path unaffected: the record store has the bot.
    let stored = registry.get(owner, bot.id).await.unwrap().unwrap();
    assert_eq!(stored.id, bot.id);

    // The divergence is observable, not silent.
    assert_eq!(collector.get_counter(metrics::MIRROR_WRITE_FAILED).await, 1);
    assert!(mirror.get_display_status(bot.id).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_swallows_mirror_removal_failure() {
    let (registry, mirror, collector) = setup();
    let owner = Uuid::new_v4();

    let bot = registry.create(owner, sample_request()).await.unwrap();

    mirror.set_failing(true);
    registry.delete(owner, bot.id).await.unwrap();

    assert!(registry.get(owner, bot.id).await.unwrap().is_none());
    assert_eq!(collector.get_counter(metrics::MIRROR_DELETE_FAILED).await, 1);

    // The stale projection survives until the mirror recovers.
    assert!(mirror.get_display_status(bot.id).await.unwrap().is_some());
}

#[tokio::test]
async fn create_rejects_non_positive_stake() {
    let (registry, _, _) = setup();

    let mut req = sample_request();
    req.initial_stake = Decimal::ZERO;

    let err = registry.create(Uuid::new_v4(), req).await.unwrap_err();
    assert!(matches!(err, RegistryError::Validation(_)));
}

fn snapshot(bot_id: Uuid, session_id: &str, runs: i64) -> SessionSnapshot {
    SessionSnapshot {
        bot_id,
        session_id: session_id.to_string(),
        number_of_runs: runs,
        number_of_wins: runs,
        number_of_losses: 0,
        total_stake: Decimal::from(10 * runs),
        total_payout: Decimal::from(15 * runs),
        total_profit: Decimal::from(5 * runs),
        commission_payout: Decimal::ZERO,
        real_commission_payout: Decimal::ZERO,
        current_strategy: "MartingaleV1".to_string(),
    }
}

#[tokio::test]
async fn publish_replaces_session_state_wholesale() {
    let (_, mirror, collector) = setup();
    let publisher = SessionPublisher::new(mirror.clone(), collector.clone());
    let bot_id = Uuid::new_v4();

    let first = publisher.publish(snapshot(bot_id, "session-1", 1)).await.unwrap();

    let mut second = snapshot(bot_id, "session-1", 2);
    second.current_strategy = "MartingaleV2".to_string();
    let second = publisher.publish(second).await.unwrap();
    assert!(second.last_updated >= first.last_updated);

    let current = publisher.current(bot_id).await.unwrap().unwrap();
    assert_eq!(current.number_of_runs, 2);
    assert_eq!(current.current_strategy, "MartingaleV2");
    assert_eq!(collector.get_counter(metrics::SESSION_PUBLISHED).await, 2);
}

#[tokio::test]
async fn new_session_id_replaces_the_previous_run() {
    let (_, mirror, collector) = setup();
    let publisher = SessionPublisher::new(mirror, collector);
    let bot_id = Uuid::new_v4();

    publisher.publish(snapshot(bot_id, "session-1", 4)).await.unwrap();
    publisher.publish(snapshot(bot_id, "session-2", 1)).await.unwrap();

    // Only the session id distinguishes runs; history is not kept.
    let current = publisher.current(bot_id).await.unwrap().unwrap();
    assert_eq!(current.session_id, "session-2");
    assert_eq!(current.number_of_runs, 1);
}

#[tokio::test]
async fn publish_rejects_structurally_invalid_snapshots() {
    let (_, mirror, collector) = setup();
    let publisher = SessionPublisher::new(mirror, collector);
    let bot_id = Uuid::new_v4();

    let err = publisher.publish(snapshot(bot_id, "", 1)).await.unwrap_err();
    assert!(matches!(err, RegistryError::Validation(_)));

    let mut negative = snapshot(bot_id, "session-1", 1);
    negative.number_of_losses = -1;
    let err = publisher.publish(negative).await.unwrap_err();
    assert!(matches!(err, RegistryError::Validation(_)));
}

#[tokio::test]
async fn publish_failure_propagates_to_the_caller() {
    let (_, mirror, collector) = setup();
    let publisher = SessionPublisher::new(mirror.clone(), collector);
    let bot_id = Uuid::new_v4();

    mirror.set_failing(true);
    let err = publisher.publish(snapshot(bot_id, "session-1", 1)).await.unwrap_err();
    assert!(matches!(err, RegistryError::Persistence(_)));
}
