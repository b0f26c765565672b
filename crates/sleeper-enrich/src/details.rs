//! Player-detail join.

use std::collections::HashSet;

use serde::Serialize;

use sleeper_cache::CatalogSnapshot;
use sleeper_types::{Player, PlayerDetails};

/// Injury statuses that put a start in doubt.
pub const QUESTIONABLE_STATUSES: [&str; 3] = ["Questionable", "Doubtful", "Out"];

/// Starter ids of one roster or matchup side.
pub type StarterSet<'a> = HashSet<&'a str>;

pub fn starter_set(ids: &[String]) -> StarterSet<'_> {
    ids.iter().map(String::as_str).collect()
}

/// Attach derived fields to a copy of `player`.
///
/// `is_starter` is only set when a starter context is given.
pub fn enrich(player: &Player, starters: Option<&StarterSet<'_>>) -> PlayerDetails {
    let details = PlayerDetails::from_player(player);
    match starters {
        Some(set) => details.with_starter(set.contains(player.player_id.as_str())),
        None => details,
    }
}

/// Resolve `ids` in order; ids missing from the catalog are dropped.
pub fn resolve(
    snapshot: &CatalogSnapshot,
    ids: &[String],
    starters: Option<&StarterSet<'_>>,
) -> Vec<PlayerDetails> {
    ids.iter()
        .filter_map(|id| snapshot.get(id))
        .map(|player| enrich(player, starters))
        .collect()
}

pub fn is_questionable(player: &Player) -> bool {
    player
        .injury_status
        .as_deref()
        .is_some_and(|status| QUESTIONABLE_STATUSES.contains(&status))
}

/// Result of a player-detail join, with the shortfall made visible.
#[derive(Debug, Clone, Serialize)]
pub struct DetailsJoin {
    pub players: Vec<PlayerDetails>,
    pub requested_count: usize,
    pub count: usize,
}

impl DetailsJoin {
    pub fn new(snapshot: &CatalogSnapshot, ids: &[String]) -> Self {
        let players = resolve(snapshot, ids, None);
        Self {
            requested_count: ids.len(),
            count: players.len(),
            players,
        }
    }

    pub fn missing(&self) -> usize {
        self.requested_count - self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> CatalogSnapshot {
        let players = [
            Player::new("a", "Amon-Ra", "St. Brown").with_position("WR"),
            Player::new("b", "Bijan", "Robinson")
                .with_position("RB")
                .with_injury("Questionable", Some("2024-11-02")),
            Player::new("c", "CeeDee", "Lamb").with_injury("IR", None),
        ];
        CatalogSnapshot::new(
            players
                .into_iter()
                .map(|p| (p.player_id.clone(), p))
                .collect(),
            0,
        )
    }

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_join_reports_requested_vs_returned() {
        let join = DetailsJoin::new(&snapshot(), &ids(&["b", "zz", "a"]));
        assert_eq!(join.requested_count, 3);
        assert_eq!(join.count, 2);
        assert_eq!(join.missing(), 1);
        assert_eq!(join.players[0].id(), "b");
        assert_eq!(
            join.players[0].injury_display.as_deref(),
            Some("Questionable (since 2024-11-02)")
        );
    }

    #[test]
    fn test_starter_tagging() {
        let starters = ids(&["a"]);
        let set = starter_set(&starters);
        let details = resolve(&snapshot(), &ids(&["a", "b"]), Some(&set));
        assert_eq!(details[0].is_starter, Some(true));
        assert_eq!(details[1].is_starter, Some(false));
        assert_eq!(resolve(&snapshot(), &ids(&["a"]), None)[0].is_starter, None);
    }

    #[test]
    fn test_questionable_statuses() {
        let snap = snapshot();
        assert!(is_questionable(snap.get("b").unwrap()));
        assert!(!is_questionable(snap.get("c").unwrap()));
        assert!(!is_questionable(snap.get("a").unwrap()));
    }

    #[test]
    fn test_cached_record_is_not_mutated() {
        let snap = snapshot();
        let starters = ids(&["a"]);
        let _ = resolve(&snap, &starters, Some(&starter_set(&starters)));
        let json = serde_json::to_value(snap.get("a").unwrap()).unwrap();
        assert!(json.get("is_starter").is_none());
        assert!(json.get("full_name").is_none());
    }
}
