//! Immutable in-memory catalog and its lookups.

use std::cmp::Ordering;

use sleeper_types::{position_priority, Player, PlayerMap};

/// One complete catalog as of `last_refreshed_at`.
///
/// Replaced wholesale on refresh; never mutated after construction.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    players: PlayerMap,
    last_refreshed_at: Option<i64>,
}

impl CatalogSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(players: PlayerMap, refreshed_at: i64) -> Self {
        Self {
            players,
            last_refreshed_at: Some(refreshed_at),
        }
    }

    pub fn players(&self) -> &PlayerMap {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn last_refreshed_at(&self) -> Option<i64> {
        self.last_refreshed_at
    }

    pub fn age_ms(&self, now_ms: i64) -> Option<i64> {
        self.last_refreshed_at.map(|at| now_ms - at)
    }

    /// Non-empty and younger than `ttl_ms`.
    pub fn is_fresh(&self, now_ms: i64, ttl_ms: i64) -> bool {
        !self.is_empty() && self.age_ms(now_ms).is_some_and(|age| age < ttl_ms)
    }

    pub fn get(&self, id: &str) -> Option<&Player> {
        self.players.get(id)
    }

    /// Players for `ids` in input order; unknown ids are skipped.
    pub fn get_many<S: AsRef<str>>(&self, ids: &[S]) -> Vec<Player> {
        ids.iter()
            .filter_map(|id| self.players.get(id.as_ref()))
            .cloned()
            .collect()
    }

    /// Case-insensitive substring search over names.
    ///
    /// Collects the first `limit` matches in catalog order, then orders them
    /// by rank (unranked last) and position priority.
    pub fn search(&self, query: &str, limit: usize) -> Vec<Player> {
        if limit == 0 {
            return Vec::new();
        }
        let needle = query.to_lowercase();
        let mut results: Vec<Player> = self
            .players
            .values()
            .filter(|p| name_matches(p, &needle))
            .take(limit)
            .cloned()
            .collect();
        results.sort_by(search_order);
        results
    }

    /// Active players not ruled out, optionally eligible at `position`, by rank.
    pub fn active_startable(&self, position: Option<&str>) -> Vec<Player> {
        let mut results: Vec<Player> = self
            .players
            .values()
            .filter(|p| p.status.as_deref() == Some("Active"))
            .filter(|p| p.injury_status.as_deref() != Some("Out"))
            .filter(|p| position.map_or(true, |pos| p.is_eligible_at(pos)))
            .cloned()
            .collect();
        results.sort_by_key(|p| p.rank_or_sentinel());
        results
    }
}

fn name_matches(player: &Player, needle: &str) -> bool {
    let contains = |field: Option<&str>| field.is_some_and(|f| f.to_lowercase().contains(needle));
    contains(player.search_full_name.as_deref())
        || contains(player.first_name.as_deref())
        || contains(player.last_name.as_deref())
        || player.full_name().to_lowercase().contains(needle)
}

fn search_order(a: &Player, b: &Player) -> Ordering {
    a.rank_or_sentinel()
        .cmp(&b.rank_or_sentinel())
        .then_with(|| {
            position_priority(a.position.as_deref()).cmp(&position_priority(b.position.as_deref()))
        })
}
