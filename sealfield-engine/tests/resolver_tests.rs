mod support;

use sealfield_engine::{
    initialize_master_key, EngineError, InMemoryKeyCache, InMemoryWrappedKeyStore,
    MasterKeyResolver,
};
use std::sync::Arc;
use std::time::Duration;
use support::CountingKms;

struct ResolverParts {
    resolver: MasterKeyResolver,
    kms: Arc<CountingKms>,
}

async fn seeded_resolver(ttl: Duration) -> ResolverParts {
    let kms = Arc::new(CountingKms::new("resolver-kms-root"));
    let keys = Arc::new(InMemoryWrappedKeyStore::new());
    initialize_master_key(kms.as_ref(), keys.as_ref())
        .await
        .unwrap();

    let resolver = MasterKeyResolver::new(
        keys,
        Arc::new(InMemoryKeyCache::with_ttl(ttl)),
        kms.clone(),
    );
    ResolverParts { resolver, kms }
}

#[tokio::test]
async fn second_resolve_performs_zero_kms_calls() {
    let parts = seeded_resolver(Duration::from_secs(600)).await;

    parts.resolver.resolve().await.unwrap();
    assert_eq!(parts.kms.unwrap_calls(), 1);

    parts.resolver.resolve().await.unwrap();
    assert_eq!(parts.kms.unwrap_calls(), 1);
}

#[tokio::test]
async fn resolved_cipher_round_trips_fields() {
    let parts = seeded_resolver(Duration::from_secs(600)).await;

    let cipher = parts.resolver.resolve().await.unwrap();
    let envelope = cipher.encrypt("1990-01-01").unwrap();
    assert_eq!(cipher.decrypt(&envelope).unwrap(), "1990-01-01");

    // A cipher resolved from the cache opens envelopes from the first one
    let warm = parts.resolver.resolve().await.unwrap();
    assert_eq!(warm.decrypt(&envelope).unwrap(), "1990-01-01");
}

#[tokio::test]
async fn missing_record_is_fatal() {
    let kms = Arc::new(CountingKms::new("resolver-kms-root"));
    let resolver = MasterKeyResolver::new(
        Arc::new(InMemoryWrappedKeyStore::new()),
        Arc::new(InMemoryKeyCache::new()),
        kms.clone(),
    );

    assert!(matches!(
        resolver.resolve().await.unwrap_err(),
        EngineError::KeyRecordMissing
    ));
    // Fatal conditions never reach the KMS
    assert_eq!(kms.unwrap_calls(), 0);
}

#[tokio::test]
async fn transient_kms_failures_are_retried() {
    let parts = seeded_resolver(Duration::from_secs(600)).await;

    parts.kms.fail_next(2);
    parts.resolver.resolve().await.unwrap();
    assert_eq!(parts.kms.unwrap_calls(), 3);
}

#[tokio::test]
async fn persistent_kms_failure_surfaces_key_unavailable() {
    let parts = seeded_resolver(Duration::from_secs(600)).await;

    parts.kms.fail_next(10);
    assert!(matches!(
        parts.resolver.resolve().await.unwrap_err(),
        EngineError::KeyUnavailable(_)
    ));

    // Nothing was cached on the failed path; a healthy KMS recovers
    parts.kms.fail_next(0);
    parts.resolver.resolve().await.unwrap();
}

#[tokio::test]
async fn expired_cache_entry_triggers_reunwrap() {
    let parts = seeded_resolver(Duration::ZERO).await;

    parts.resolver.resolve().await.unwrap();
    parts.resolver.resolve().await.unwrap();
    assert_eq!(parts.kms.unwrap_calls(), 2);
}
