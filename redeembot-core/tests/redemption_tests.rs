// File: redeembot-core/tests/redemption_tests.rs

mod test_utils;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use chrono::TimeDelta;

use redeembot_common::traits::repository_traits::AuditLogRepository;
use redeembot_common::Error;
use redeembot_core::config::{CodeNameSettings, FailedAttemptSettings};
use redeembot_core::repositories::YamlAuditLogRepository;
use redeembot_core::services::{CodeRegistry, LockoutTracker, RedemptionService, RedemptionState};

use test_utils::*;

struct Harness {
    service: RedemptionService,
    registry: Arc<tokio::sync::Mutex<redeembot_core::services::CodeRegistry>>,
    executor: Arc<RecordingExecutor>,
    audit: Arc<RecordingAuditLog>,
    _dir: tempfile::TempDir,
}

async fn harness_with(audit: RecordingAuditLog, lockouts: FailedAttemptSettings) -> Harness {
    let dir = temp_dir();
    let registry = shared(yaml_registry(dir.path()).await);
    let executor = Arc::new(RecordingExecutor::default());
    let audit = Arc::new(audit);
    let service = RedemptionService::new(
        registry.clone(),
        executor.clone(),
        audit.clone(),
        LockoutTracker::in_memory(lockouts),
    );
    Harness { service, registry, executor, audit, _dir: dir }
}

async fn harness() -> Harness {
    harness_with(RecordingAuditLog::default(), FailedAttemptSettings::default()).await
}

#[tokio::test]
async fn test_single_use_code_is_gone_after_redemption() -> Result<(), Error> {
    let h = harness().await;
    h.registry.lock().await.create("g", "ONCE", 1, true, "give %player% cake 1", None).await?;

    let redemption = h.service.redeem("ONCE", "alex", fixed_now()).await?;
    assert_eq!(redemption.state, RedemptionState::Removed);
    assert_eq!(redemption.commands, vec!["give alex cake 1".to_string()]);
    assert_eq!(*h.executor.dispatched.lock().await, vec!["give alex cake 1".to_string()]);

    let again = h.service.redeem("ONCE", "steve", fixed_now()).await;
    assert!(matches!(again, Err(Error::CodeNotFound(_))));
    Ok(())
}

#[tokio::test]
async fn test_multi_use_code_counts_down_per_user() -> Result<(), Error> {
    let h = harness().await;
    h.registry.lock().await.create("event", "TRIPLE", 3, false, "say %player%", None).await?;
    let now = fixed_now();

    h.service.redeem("TRIPLE", "alex", now).await?;
    let dup = h.service.redeem("TRIPLE", "alex", now).await;
    assert!(matches!(dup, Err(Error::AlreadyRedeemed { .. })));
    assert_eq!(h.registry.lock().await.find_by_name("TRIPLE").unwrap().remaining_uses, 2);

    let second = h.service.redeem("TRIPLE", "steve", now).await?;
    assert_eq!(second.state, RedemptionState::Remaining(1));
    let third = h.service.redeem("TRIPLE", "notch", now).await?;
    assert_eq!(third.state, RedemptionState::Removed);
    assert!(h.registry.lock().await.find_by_name("TRIPLE").is_none());
    assert_eq!(h.executor.dispatched.lock().await.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_expired_code_is_rejected_before_sweep() -> Result<(), Error> {
    let h = harness().await;
    let now = fixed_now();
    h.registry
        .lock()
        .await
        .create("g", "STALE", 1, true, "say hi", Some(now - TimeDelta::minutes(1)))
        .await?;

    assert!(matches!(h.service.redeem("STALE", "alex", now).await, Err(Error::CodeExpired(_))));
    assert!(matches!(h.service.verify("STALE", "alex", now).await, Err(Error::CodeExpired(_))));
    assert!(h.executor.dispatched.lock().await.is_empty());

    assert_eq!(h.registry.lock().await.sweep_expired(now).await?, 1);
    assert!(h.registry.lock().await.get_all().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_partial_effect_still_advances_state() -> Result<(), Error> {
    let h = harness().await;
    h.registry
        .lock()
        .await
        .create("g", "SHAKY", 2, false, "say first|fail %player%|say last", None)
        .await?;

    let redemption = h.service.redeem("SHAKY", "alex", fixed_now()).await?;
    assert_eq!(redemption.failed_commands, vec!["fail alex".to_string()]);
    assert_eq!(h.executor.dispatched.lock().await.len(), 3);
    assert_eq!(redemption.state, RedemptionState::Remaining(1));
    Ok(())
}

#[tokio::test]
async fn test_audit_failure_does_not_fail_redemption() -> Result<(), Error> {
    let h = harness_with(RecordingAuditLog::failing(), FailedAttemptSettings::default()).await;
    h.registry.lock().await.create("g", "LOGLESS", 1, true, "say hi", None).await?;
    assert!(h.service.redeem("LOGLESS", "alex", fixed_now()).await.is_ok());
    Ok(())
}

#[tokio::test]
async fn test_history_records_each_redemption() -> Result<(), Error> {
    let h = harness().await;
    {
        let mut registry = h.registry.lock().await;
        registry.create("g", "H1", 1, true, "say hi", None).await?;
        registry.create("g", "H2", 1, true, "say hi", None).await?;
    }
    h.service.redeem("H1", "alex", fixed_now()).await?;
    h.service.redeem("H2", "alex", fixed_now()).await?;

    let history = h.service.history("alex").await?;
    assert_eq!(history.len(), 2);
    assert!(history[0].contains("H1"));
    assert!(history[0].ends_with("at 2025-06-01 12:00"));
    assert!(h.service.history("steve").await?.is_empty());
    assert_eq!(h.audit.entries.lock().await.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_verify_does_not_change_state() -> Result<(), Error> {
    let h = harness().await;
    h.registry.lock().await.create("g", "LOOK", 1, true, "say hi", None).await?;

    let cdk = h.service.verify("LOOK", "alex", fixed_now()).await?;
    assert_eq!(cdk.name, "LOOK");
    assert!(h.registry.lock().await.find_by_name("LOOK").is_some());
    assert!(h.executor.dispatched.lock().await.is_empty());
    assert!(matches!(
        h.service.verify("MISSING", "alex", fixed_now()).await,
        Err(Error::CodeNotFound(_))
    ));
    Ok(())
}

#[tokio::test]
async fn test_repeated_misses_lock_the_user_out() -> Result<(), Error> {
    let settings = FailedAttemptSettings {
        enabled: true,
        max_attempts: 2,
        ban_duration_minutes: 5,
        reset_duration_minutes: 5,
    };
    let h = harness_with(RecordingAuditLog::default(), settings).await;
    h.registry.lock().await.create("g", "REAL", 1, true, "say hi", None).await?;
    let now = fixed_now();

    assert!(matches!(h.service.redeem("nope1", "eve", now).await, Err(Error::CodeNotFound(_))));
    assert!(matches!(h.service.redeem("nope2", "eve", now).await, Err(Error::LockedOut { .. })));
    assert!(matches!(h.service.redeem("REAL", "eve", now).await, Err(Error::LockedOut { .. })));

    // Other users are unaffected, and the ban lapses.
    assert!(h.service.redeem("nope3", "alex", now).await.is_err());
    h.service.redeem("REAL", "eve", now + TimeDelta::minutes(5)).await?;
    Ok(())
}

#[tokio::test]
async fn test_yaml_audit_log_backs_history() -> Result<(), Error> {
    let dir = temp_dir();
    let registry = shared(yaml_registry(dir.path()).await);
    let service = RedemptionService::new(
        registry.clone(),
        Arc::new(RecordingExecutor::default()),
        Arc::new(YamlAuditLogRepository::new(dir.path().join("log.yml"))),
        LockoutTracker::in_memory(FailedAttemptSettings::default()),
    );
    registry.lock().await.create("g", "FILELOG", 1, true, "say hi", None).await?;
    service.redeem("FILELOG", "alex", fixed_now()).await?;

    let history = service.history("alex").await?;
    assert_eq!(history.len(), 1);
    assert!(dir.path().join("log.yml").exists());
    Ok(())
}

#[tokio::test]
async fn test_redemption_counts_when_saving_fails() -> Result<(), Error> {
    let store = BrokenStore::new(sample_codes());
    let save_attempts = store.save_attempts.clone();
    let registry = shared(CodeRegistry::open(Box::new(store), CodeNameSettings::default()).await);
    let executor = Arc::new(RecordingExecutor::default());
    let audit = Arc::new(RecordingAuditLog::default());
    let service = RedemptionService::new(
        registry.clone(),
        executor.clone(),
        audit.clone(),
        LockoutTracker::in_memory(FailedAttemptSettings::default()),
    );

    let redemption = service.redeem("VIPCODE1", "notch", fixed_now()).await?;
    assert_eq!(redemption.state, RedemptionState::Remaining(2));
    assert_eq!(save_attempts.load(Ordering::SeqCst), 1);
    assert_eq!(executor.dispatched.lock().await.len(), 2);
    assert_eq!(audit.entries_for_user("notch").await?.len(), 1);

    {
        let registry = registry.lock().await;
        let cdk = registry.find_by_name("VIPCODE1").unwrap();
        assert_eq!(cdk.remaining_uses, 2);
        assert!(cdk.has_redeemed("notch"));
    }
    assert!(matches!(
        service.redeem("VIPCODE1", "notch", fixed_now()).await,
        Err(Error::AlreadyRedeemed { .. })
    ));

    let single = service.redeem("STARTA01", "notch", fixed_now()).await?;
    assert_eq!(single.state, RedemptionState::Removed);
    assert!(registry.lock().await.find_by_name("STARTA01").is_none());
    assert_eq!(save_attempts.load(Ordering::SeqCst), 2);
    Ok(())
}
