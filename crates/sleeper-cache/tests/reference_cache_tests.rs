//! Freshness, persistence and single-flight behaviour of the player cache.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tempfile::TempDir;

use sleeper_cache::{
    paths, CacheConfig, FsSnapshotStore, ManualClock, ReadOrigin, ReferenceCache, SnapshotMeta,
    SnapshotStore,
};
use sleeper_transport::testing::MockSource;
use sleeper_transport::{FetchError, RemoteSource};
use sleeper_types::PlayerMap;

const PLAYERS: &str = "/players/nfl";
const DAY: Duration = Duration::from_secs(24 * 60 * 60);
const START_MS: i64 = 1_700_000_000_000;

fn catalog(n: usize) -> Value {
    let mut map = serde_json::Map::new();
    for i in 0..n {
        map.insert(
            format!("{}", 1000 + i),
            json!({
                "first_name": "Player",
                "last_name": format!("Number{}", i),
                "position": "WR",
                "status": "Active",
                "search_rank": i + 1
            }),
        );
    }
    Value::Object(map)
}

struct Harness {
    dir: TempDir,
    source: Arc<MockSource>,
    clock: Arc<ManualClock>,
}

impl Harness {
    fn new(players: usize) -> Self {
        Self {
            dir: TempDir::new().expect("tempdir"),
            source: Arc::new(MockSource::new().with_json(PLAYERS, catalog(players))),
            clock: Arc::new(ManualClock::new(START_MS)),
        }
    }

    fn store(&self) -> FsSnapshotStore {
        FsSnapshotStore::new(self.dir.path())
    }

    /// A new cache instance over the same disk, source and clock (a "restart").
    fn cache(&self) -> ReferenceCache {
        let source: Arc<dyn RemoteSource> = self.source.clone();
        ReferenceCache::with_parts(
            CacheConfig::new(self.dir.path()),
            source,
            Arc::new(self.store()),
            self.clock.clone(),
        )
    }

    fn fetches(&self) -> usize {
        self.source.calls(PLAYERS)
    }
}

#[tokio::test]
async fn cold_start_fetches_exactly_once() {
    let h = Harness::new(25);
    let cache = h.cache();

    let read = cache.ensure_fresh().await.expect("refresh");
    assert_eq!(read.origin, ReadOrigin::Remote);
    assert_eq!(read.snapshot.len(), 25);
    assert_eq!(h.fetches(), 1);
}

#[tokio::test]
async fn back_to_back_lookups_hit_memory() {
    let h = Harness::new(5);
    let cache = h.cache();

    cache.get("1000").await.expect("first lookup");
    let player = cache.get("1003").await.expect("second lookup");
    assert_eq!(player.map(|p| p.player_id), Some("1003".to_string()));

    let read = cache.ensure_fresh().await.expect("third");
    assert_eq!(read.origin, ReadOrigin::Memory);
    assert_eq!(h.fetches(), 1);
    assert!(cache.metrics().memory_hits >= 2);
}

#[tokio::test]
async fn ttl_expiry_triggers_one_more_fetch() {
    let h = Harness::new(5);
    let cache = h.cache();
    cache.ensure_fresh().await.expect("initial");

    h.clock.advance(DAY - Duration::from_millis(1));
    cache.ensure_fresh().await.expect("still fresh");
    assert_eq!(h.fetches(), 1);

    h.clock.advance(Duration::from_millis(1));
    cache.ensure_fresh().await.expect("expired");
    cache.ensure_fresh().await.expect("fresh again");
    assert_eq!(h.fetches(), 2);
}

#[tokio::test]
async fn restart_hydrates_from_disk_without_fetching() {
    let h = Harness::new(40);
    h.cache().ensure_fresh().await.expect("populate");
    assert_eq!(h.fetches(), 1);

    h.clock.advance(Duration::from_secs(3600));
    let restarted = h.cache();
    let read = restarted.ensure_fresh().await.expect("hydrate");
    assert_eq!(read.origin, ReadOrigin::Durable);
    assert_eq!(read.snapshot.len(), 40);
    assert_eq!(read.snapshot.last_refreshed_at(), Some(START_MS));
    assert_eq!(h.fetches(), 1);
    assert_eq!(restarted.metrics().durable_hydrations, 1);
}

#[tokio::test]
async fn expired_disk_snapshot_is_refetched() {
    let h = Harness::new(3);
    h.cache().ensure_fresh().await.expect("populate");

    h.clock.advance(DAY);
    let read = h.cache().ensure_fresh().await.expect("refetch");
    assert_eq!(read.origin, ReadOrigin::Remote);
    assert_eq!(h.fetches(), 2);
}

#[tokio::test]
async fn count_mismatch_on_disk_is_a_silent_miss() {
    let h = Harness::new(4);
    h.cache().ensure_fresh().await.expect("populate");

    let meta_file = paths::meta_path(h.dir.path());
    let mut meta: SnapshotMeta =
        serde_json::from_slice(&std::fs::read(&meta_file).expect("read meta")).expect("parse meta");
    meta.player_count += 1;
    std::fs::write(&meta_file, serde_json::to_vec(&meta).expect("encode")).expect("write meta");

    let read = h.cache().ensure_fresh().await.expect("no error on corrupt snapshot");
    assert_eq!(read.origin, ReadOrigin::Remote);
    assert_eq!(read.snapshot.len(), 4);
    assert_eq!(h.fetches(), 2);
}

#[tokio::test]
async fn unparsable_disk_snapshot_is_a_silent_miss() {
    let h = Harness::new(2);
    std::fs::write(paths::players_path(h.dir.path()), b"[[[").expect("write");
    std::fs::write(paths::meta_path(h.dir.path()), b"nope").expect("write");

    let read = h.cache().ensure_fresh().await.expect("falls through to remote");
    assert_eq!(read.origin, ReadOrigin::Remote);
    assert_eq!(h.fetches(), 1);
}

#[tokio::test]
async fn concurrent_cold_callers_share_one_fetch() {
    let h = Harness::new(10);
    let source = Arc::new(
        MockSource::new()
            .with_json(PLAYERS, catalog(10))
            .with_delay(Duration::from_millis(50)),
    );
    let dyn_source: Arc<dyn RemoteSource> = source.clone();
    let cache = ReferenceCache::with_parts(
        CacheConfig::new(h.dir.path()),
        dyn_source,
        Arc::new(h.store()),
        h.clock.clone(),
    );

    let callers: Vec<_> = (0..8)
        .map(|_| {
            let cache = cache.clone();
            tokio::spawn(async move { cache.ensure_fresh().await.map(|r| r.snapshot.len()) })
        })
        .collect();
    for caller in futures::future::join_all(callers).await {
        assert_eq!(caller.expect("join").expect("refresh"), 10);
    }

    assert_eq!(source.calls(PLAYERS), 1);
    assert!(cache.metrics().coalesced_waits >= 1);
    assert!(!cache.status().refresh_in_flight);
}

#[tokio::test]
async fn concurrent_callers_all_see_the_same_failure() {
    let dir = TempDir::new().expect("tempdir");
    let source = Arc::new(
        MockSource::new()
            .with_error(PLAYERS, FetchError::RateLimited)
            .with_delay(Duration::from_millis(30)),
    );
    let dyn_source: Arc<dyn RemoteSource> = source.clone();
    let cache = ReferenceCache::new(CacheConfig::new(dir.path()), dyn_source);

    let (a, b) = tokio::join!(cache.ensure_fresh(), cache.ensure_fresh());
    assert_eq!(a.expect_err("a fails"), FetchError::RateLimited);
    assert_eq!(b.expect_err("b fails"), FetchError::RateLimited);
    assert_eq!(source.calls(PLAYERS), 1);
}

#[tokio::test]
async fn failed_refresh_keeps_stale_snapshot() {
    let h = Harness::new(6);
    let cache = h.cache();
    cache.ensure_fresh().await.expect("initial");

    h.clock.advance(DAY * 2);
    h.source.set_error(
        PLAYERS,
        FetchError::Upstream {
            status: 503,
            message: "down".to_string(),
        },
    );

    let err = cache.get("1000").await.expect_err("refresh fails");
    assert_eq!(err.kind(), "upstream");
    assert_eq!(cache.snapshot().len(), 6);
    assert!(!cache.status().is_fresh);

    h.source.set_json(PLAYERS, catalog(7));
    assert_eq!(cache.ensure_fresh().await.expect("recovers").snapshot.len(), 7);
}

#[tokio::test]
async fn persist_failure_does_not_fail_refresh() {
    let dir = TempDir::new().expect("tempdir");
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a dir").expect("write");
    let source: Arc<dyn RemoteSource> =
        Arc::new(MockSource::new().with_json(PLAYERS, catalog(3)));
    let cache = ReferenceCache::new(CacheConfig::new(blocker.join("cache")), source);

    let read = cache.ensure_fresh().await.expect("refresh still succeeds");
    assert_eq!(read.snapshot.len(), 3);
    assert_eq!(cache.metrics().persist_failures, 1);
}

#[tokio::test]
async fn reset_clears_memory_and_disk() {
    let h = Harness::new(3);
    let cache = h.cache();
    cache.ensure_fresh().await.expect("populate");
    assert!(paths::players_path(h.dir.path()).exists());

    cache.reset().await;
    assert!(!paths::players_path(h.dir.path()).exists());
    assert!(!paths::meta_path(h.dir.path()).exists());
    let status = cache.status();
    assert!(!status.initialized);
    assert_eq!(status.player_count, 0);

    cache.ensure_fresh().await.expect("repopulate");
    assert_eq!(h.fetches(), 2);
}

/// Reads the snapshot, then stalls before handing it back.
struct SlowLoadStore {
    inner: FsSnapshotStore,
    delay: Duration,
}

impl SnapshotStore for SlowLoadStore {
    fn load(&self, now_ms: i64, ttl_ms: i64) -> Option<(PlayerMap, SnapshotMeta)> {
        let loaded = self.inner.load(now_ms, ttl_ms);
        std::thread::sleep(self.delay);
        loaded
    }

    fn save(&self, players: &PlayerMap, meta: &SnapshotMeta) -> bool {
        self.inner.save(players, meta)
    }

    fn clear(&self) {
        self.inner.clear()
    }
}

#[tokio::test]
async fn reset_during_hydration_discards_loaded_catalog() {
    let h = Harness::new(3);
    h.cache().ensure_fresh().await.expect("seed disk");
    h.source
        .set_json(PLAYERS, json!({"9999": {"first_name": "New", "last_name": "Guy"}}));

    let source: Arc<dyn RemoteSource> = h.source.clone();
    let store = SlowLoadStore {
        inner: h.store(),
        delay: Duration::from_millis(200),
    };
    let cache = ReferenceCache::with_parts(
        CacheConfig::new(h.dir.path()),
        source,
        Arc::new(store),
        h.clock.clone(),
    );

    let early = tokio::spawn({
        let cache = cache.clone();
        async move { cache.ensure_fresh().await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    cache.reset().await;

    let read = cache.ensure_fresh().await.expect("refetch after reset");
    assert_eq!(read.origin, ReadOrigin::Remote);
    assert!(read.snapshot.get("1000").is_none());
    assert!(read.snapshot.get("9999").is_some());
    assert_eq!(h.fetches(), 2);

    let early = early.await.expect("join").expect("early read retries");
    assert!(early.snapshot.get("1000").is_none());
    assert!(cache.snapshot().get("9999").is_some());

    let on_disk = h.store().load(START_MS, i64::MAX).expect("new catalog persisted");
    assert!(on_disk.0.contains_key("9999"));
    assert!(!on_disk.0.contains_key("1000"));
}

#[tokio::test]
async fn force_refresh_ignores_age() {
    let h = Harness::new(3);
    let cache = h.cache();
    cache.ensure_fresh().await.expect("populate");

    h.source.set_json(PLAYERS, catalog(5));
    assert_eq!(cache.force_refresh().await.expect("force"), 5);
    assert_eq!(h.fetches(), 2);
    assert_eq!(h.store().load(START_MS, i64::MAX).expect("saved").0.len(), 5);
}

#[tokio::test]
async fn search_with_zero_limit_does_no_io() {
    let h = Harness::new(3);
    let cache = h.cache();
    assert!(cache.search("player", 0).await.expect("search").is_empty());
    assert_eq!(h.fetches(), 0);

    let results = cache.search("NUMBER", 2).await.expect("search");
    assert_eq!(results.len(), 2);
    assert_eq!(h.fetches(), 1);
}

#[tokio::test]
async fn get_many_skips_unknown_ids() {
    let h = Harness::new(3);
    let cache = h.cache();
    let players = cache
        .get_many(&["1002", "nope", "1000"])
        .await
        .expect("lookup");
    let ids: Vec<_> = players.into_iter().map(|p| p.player_id).collect();
    assert_eq!(ids, vec!["1002", "1000"]);
}
