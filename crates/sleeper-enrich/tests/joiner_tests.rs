//! Join behaviour against a mocked provider.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tempfile::TempDir;

use sleeper_cache::{CacheConfig, ReferenceCache};
use sleeper_enrich::{EnrichmentJoiner, MatchupPairing, PairingFailure};
use sleeper_transport::testing::MockSource;
use sleeper_transport::{FetchError, RemoteSource, SleeperApi, TrendKind};
use sleeper_types::UNKNOWN_OWNER_ID;

const PLAYERS: &str = "/players/nfl";
const LEAGUE: &str = "L1";

fn catalog() -> Value {
    json!({
        "a": {"first_name": "Josh", "last_name": "Allen", "position": "QB", "team": "BUF", "status": "Active", "search_rank": 3},
        "b": {"first_name": "Breece", "last_name": "Hall", "position": "RB", "team": "NYJ", "status": "Active", "search_rank": 12},
        "c": {"first_name": "Cooper", "last_name": "Kupp", "position": "WR", "team": "LAR", "status": "Active",
              "injury_status": "Questionable", "search_rank": 40},
        "d": {"first_name": "Dalton", "last_name": "Kincaid", "position": "TE", "team": "BUF", "status": "Active", "search_rank": 90},
        "e": {"first_name": "Evan", "last_name": "Engram", "position": "TE", "team": "JAX", "status": "Active",
              "injury_status": "Out", "search_rank": 150}
    })
}

fn rosters() -> Value {
    json!([
        {"roster_id": 1, "owner_id": "u1", "players": ["a", "b", "c", "d"], "starters": ["a", "c"]},
        {"roster_id": 2, "owner_id": "ghost", "players": ["e"], "starters": ["e"]},
        {"roster_id": 3, "owner_id": "u3", "players": [], "starters": []}
    ])
}

fn users() -> Value {
    json!([
        {"user_id": "u1", "username": "alice", "display_name": "Alice", "is_owner": true},
        {"user_id": "u3", "username": "carol", "display_name": "Carol"}
    ])
}

struct Fixture {
    _dir: TempDir,
    source: Arc<MockSource>,
    joiner: EnrichmentJoiner,
}

fn fixture(source: MockSource) -> Fixture {
    let dir = TempDir::new().expect("tempdir");
    let source = Arc::new(
        source
            .with_json(PLAYERS, catalog())
            .with_json("/league/L1/rosters", rosters())
            .with_json("/league/L1/users", users()),
    );
    let dyn_source: Arc<dyn RemoteSource> = source.clone();
    let cache = ReferenceCache::new(CacheConfig::new(dir.path()), dyn_source.clone());
    Fixture {
        _dir: dir,
        source,
        joiner: EnrichmentJoiner::new(SleeperApi::new(dyn_source), cache),
    }
}

fn ids(joined: &[sleeper_types::PlayerDetails]) -> Vec<&str> {
    joined.iter().map(|p| p.id()).collect()
}

#[tokio::test]
async fn roster_partition_splits_starters_and_bench() {
    let f = fixture(MockSource::new());
    let roster = f
        .joiner
        .find_user_roster(LEAGUE, "u1")
        .await
        .expect("rosters")
        .expect("u1 owns a roster");
    let detail = f.joiner.roster_with_owner(&roster, LEAGUE).await.expect("join").value;

    assert_eq!(ids(&detail.starters), vec!["a", "c"]);
    assert_eq!(ids(&detail.bench), vec!["b", "d"]);
    assert!(detail.starters.iter().all(|p| p.is_starter == Some(true)));
    assert!(detail.bench.iter().all(|p| p.is_starter == Some(false)));
    assert_eq!(detail.owner.display_name, "Alice");
}

#[tokio::test]
async fn unmatched_owner_gets_placeholder() {
    let f = fixture(MockSource::new());
    let details = f.joiner.league_rosters(LEAGUE).await.expect("join").value;

    let orphan = details.iter().find(|d| d.roster_id() == 2).expect("roster 2");
    assert_eq!(orphan.owner.user_id, UNKNOWN_OWNER_ID);
    let json = serde_json::to_value(orphan).expect("encode");
    assert_eq!(json["owner"]["user_id"], "unknown");
}

#[tokio::test]
async fn batch_join_fetches_members_and_catalog_once() {
    let f = fixture(MockSource::new());
    let joined = f.joiner.league_rosters(LEAGUE).await.expect("join");

    assert_eq!(joined.value.len(), 3);
    assert!(!joined.cache_hit);
    assert_eq!(f.source.calls("/league/L1/users"), 1);
    assert_eq!(f.source.calls("/league/L1/rosters"), 1);
    assert_eq!(f.source.calls(PLAYERS), 1);

    let again = f.joiner.league_rosters(LEAGUE).await.expect("join");
    assert!(again.cache_hit);
    assert_eq!(f.source.calls(PLAYERS), 1);
}

#[tokio::test]
async fn player_details_reports_shortfall() {
    let f = fixture(MockSource::new());
    let request = vec!["d".to_string(), "missing".to_string(), "a".to_string()];
    let join = f.joiner.player_details(&request).await.expect("join").value;

    assert_eq!(join.requested_count, 3);
    assert_eq!(join.count, 2);
    assert_eq!(ids(&join.players), vec!["d", "a"]);
    assert_eq!(join.players[0].full_name, "Dalton Kincaid");
}

#[tokio::test]
async fn matchup_pairs_two_sides_with_their_own_starters() {
    let f = fixture(MockSource::new().with_json(
        "/league/L1/matchups/5",
        json!([
            {"roster_id": 1, "matchup_id": 7, "points": 101.5, "players": ["a", "b", "c", "d"], "starters": ["a", "b"]},
            {"roster_id": 2, "matchup_id": 7, "points": 88.0, "players": ["e"], "starters": ["e"]},
            {"roster_id": 3, "matchup_id": 8, "points": 0.0, "players": [], "starters": []}
        ]),
    ));

    let pairing = f.joiner.matchup_pairing(LEAGUE, 5, "u1").await.expect("join").value;
    let MatchupPairing::Paired { matchup_id, week, sides } = pairing else {
        panic!("expected a pairing");
    };
    assert_eq!((matchup_id, week), (7, 5));
    assert_eq!(sides[0].owner.display_name, "Alice");
    assert_eq!(ids(&sides[0].starters), vec!["a", "b"]);
    assert_eq!(ids(&sides[0].bench), vec!["c", "d"]);
    assert_eq!(sides[0].total_players, 4);
    assert!(sides[1].owner.is_placeholder());
    assert_eq!(sides[1].points, 88.0);
}

#[tokio::test]
async fn matchup_with_one_side_is_not_found() {
    let f = fixture(MockSource::new().with_json(
        "/league/L1/matchups/1",
        json!([{"roster_id": 1, "matchup_id": 4, "points": 0.0, "players": [], "starters": []}]),
    ));

    let pairing = f.joiner.matchup_pairing(LEAGUE, 1, "u1").await.expect("join").value;
    match pairing {
        MatchupPairing::NotFound { reason } => {
            assert_eq!(reason, PairingFailure::UnexpectedSideCount { sides: 1 })
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn matchup_with_three_sides_is_not_found() {
    let f = fixture(MockSource::new().with_json(
        "/league/L1/matchups/3",
        json!([
            {"roster_id": 1, "matchup_id": 1, "points": 90.0, "players": ["a"], "starters": ["a"]},
            {"roster_id": 2, "matchup_id": 1, "points": 80.0, "players": ["e"], "starters": ["e"]},
            {"roster_id": 3, "matchup_id": 1, "points": 70.0, "players": [], "starters": []}
        ]),
    ));

    let pairing = f.joiner.matchup_pairing(LEAGUE, 3, "u1").await.expect("join").value;
    match pairing {
        MatchupPairing::NotFound { reason } => {
            assert_eq!(reason, PairingFailure::UnexpectedSideCount { sides: 3 })
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn matchup_with_no_sides_is_not_found() {
    let f = fixture(MockSource::new().with_json("/league/L1/matchups/2", json!([])));

    let pairing = f.joiner.matchup_pairing(LEAGUE, 2, "u1").await.expect("join").value;
    assert!(matches!(
        pairing,
        MatchupPairing::NotFound {
            reason: PairingFailure::NoMatchupForRoster
        }
    ));

    let stranger = f.joiner.matchup_pairing(LEAGUE, 2, "nobody").await.expect("join").value;
    assert!(matches!(
        stranger,
        MatchupPairing::NotFound {
            reason: PairingFailure::RosterNotFound
        }
    ));
}

#[tokio::test]
async fn trending_keeps_unresolved_entries() {
    let f = fixture(MockSource::new().with_json(
        "/players/nfl/trending/add?lookback_hours=24&limit=3",
        json!([
            {"player_id": "b", "count": 310},
            {"player_id": "9999", "count": 120},
            {"player_id": "a", "count": 45}
        ]),
    ));

    let trending = f.joiner.trending(TrendKind::Add, 24, 3).await.expect("join").value;
    assert_eq!(trending.len(), 3);
    assert_eq!(trending[0].player.as_ref().map(|p| p.id()), Some("b"));
    assert!(trending[1].player.is_none());
    assert_eq!(trending[1].count, 120);
}

#[tokio::test]
async fn questionable_players_filters_by_injury() {
    let f = fixture(MockSource::new());
    let roster: Vec<String> = ["a", "c", "e"].iter().map(|s| s.to_string()).collect();
    let flagged = f.joiner.questionable_players(&roster).await.expect("join").value;
    assert_eq!(ids(&flagged), vec!["c", "e"]);
}

#[tokio::test]
async fn transactions_resolve_moved_players() {
    let f = fixture(MockSource::new().with_json(
        "/league/L1/transactions/3",
        json!([{
            "transaction_id": "991",
            "type": "free_agent",
            "status": "complete",
            "roster_ids": [1],
            "adds": {"d": 1},
            "drops": {"gone": 1},
            "created": 1_726_000_000_000i64
        }]),
    ));

    let txs = f.joiner.transactions(LEAGUE, 3).await.expect("join").value;
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].enhanced_adds["d"].roster_id, 1);
    assert!(txs[0].enhanced_adds["d"].player.is_some());
    assert!(txs[0].enhanced_drops["gone"].player.is_none());
    assert_eq!(txs[0].formatted_date.as_deref(), Some("2024-09-10"));
}

#[tokio::test]
async fn collection_fetch_errors_propagate() {
    let f = fixture(MockSource::new().with_error(
        "/league/L1/matchups/9",
        FetchError::RateLimited,
    ));
    let err = f.joiner.matchup_pairing(LEAGUE, 9, "u1").await.expect_err("rate limited");
    assert_eq!(err, FetchError::RateLimited);
}

#[tokio::test]
async fn concurrent_joins_share_one_catalog_fetch() {
    let f = fixture(MockSource::new().with_delay(Duration::from_millis(20)));
    let request = vec!["a".to_string()];
    let (a, b) = tokio::join!(
        f.joiner.player_details(&request),
        f.joiner.league_rosters(LEAGUE)
    );
    a.expect("details");
    b.expect("rosters");
    assert_eq!(f.source.calls(PLAYERS), 1);
}
