//! Trending-signal join.

use std::collections::HashMap;

use serde::Serialize;

use sleeper_types::{PlayerDetails, TrendingEntry};

/// A trending entry with its player attached when the catalog knows it.
#[derive(Debug, Clone, Serialize)]
pub struct TrendingPlayer {
    pub player_id: String,
    pub count: u32,
    /// `null` for ids the catalog cannot resolve.
    pub player: Option<PlayerDetails>,
}

/// Attach players to entries by id. Every entry is kept, in input order.
pub fn join_trending(entries: Vec<TrendingEntry>, players: &[PlayerDetails]) -> Vec<TrendingPlayer> {
    let by_id: HashMap<&str, &PlayerDetails> = players.iter().map(|p| (p.id(), p)).collect();
    entries
        .into_iter()
        .map(|entry| {
            let player = by_id.get(entry.player_id.as_str()).map(|p| (*p).clone());
            TrendingPlayer {
                player_id: entry.player_id,
                count: entry.count,
                player,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sleeper_types::Player;

    fn entry(id: &str, count: u32) -> TrendingEntry {
        TrendingEntry {
            player_id: id.to_string(),
            count,
        }
    }

    #[test]
    fn test_unresolved_entries_are_kept_with_null_player() {
        let players = vec![PlayerDetails::from_player(&Player::new("1", "Puka", "Nacua"))];
        let joined = join_trending(vec![entry("9", 40), entry("1", 12)], &players);

        assert_eq!(joined.len(), 2);
        assert_eq!(joined[0].player_id, "9");
        assert!(joined[0].player.is_none());
        assert_eq!(joined[1].player.as_ref().map(|p| p.full_name.as_str()), Some("Puka Nacua"));

        let json = serde_json::to_value(&joined[0]).unwrap();
        assert!(json["player"].is_null());
        assert_eq!(json["count"], 40);
    }
}
