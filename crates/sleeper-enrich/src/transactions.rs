//! Transaction enrichment.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use sleeper_cache::CatalogSnapshot;
use sleeper_types::{PlayerDetails, Transaction};

use crate::details::enrich;

/// A player moved by a transaction, with the roster on the other end.
#[derive(Debug, Clone, Serialize)]
pub struct MovedPlayer {
    pub roster_id: u32,
    pub player: Option<PlayerDetails>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrichedTransaction {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub enhanced_adds: BTreeMap<String, MovedPlayer>,
    pub enhanced_drops: BTreeMap<String, MovedPlayer>,
    /// `created` as `YYYY-MM-DD` (UTC); `None` when the timestamp is unusable.
    pub formatted_date: Option<String>,
}

impl EnrichedTransaction {
    pub fn build(snapshot: &CatalogSnapshot, transaction: Transaction) -> Self {
        let moved = |side: &Option<BTreeMap<String, u32>>| -> BTreeMap<String, MovedPlayer> {
            side.iter()
                .flatten()
                .map(|(player_id, roster_id)| {
                    let entry = MovedPlayer {
                        roster_id: *roster_id,
                        player: snapshot.get(player_id).map(|p| enrich(p, None)),
                    };
                    (player_id.clone(), entry)
                })
                .collect()
        };

        Self {
            enhanced_adds: moved(&transaction.adds),
            enhanced_drops: moved(&transaction.drops),
            formatted_date: format_date(transaction.created),
            transaction,
        }
    }
}

fn format_date(created_ms: i64) -> Option<String> {
    if created_ms <= 0 {
        return None;
    }
    DateTime::<Utc>::from_timestamp_millis(created_ms).map(|at| at.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sleeper_types::Player;

    fn transaction() -> Transaction {
        serde_json::from_value(serde_json::json!({
            "transaction_id": "t1",
            "type": "waiver",
            "status": "complete",
            "roster_ids": [3],
            "adds": {"100": 3},
            "drops": {"404": 3},
            "created": 1_700_000_000_000i64
        }))
        .unwrap()
    }

    #[test]
    fn test_adds_and_drops_are_resolved() {
        let snap = CatalogSnapshot::new(
            [("100".to_string(), Player::new("100", "Jaylen", "Warren"))]
                .into_iter()
                .collect(),
            0,
        );
        let enriched = EnrichedTransaction::build(&snap, transaction());

        let add = &enriched.enhanced_adds["100"];
        assert_eq!(add.roster_id, 3);
        assert_eq!(add.player.as_ref().map(|p| p.id()), Some("100"));
        assert!(enriched.enhanced_drops["404"].player.is_none());
        assert_eq!(enriched.formatted_date.as_deref(), Some("2023-11-14"));
    }

    #[test]
    fn test_flattened_output_keeps_wire_fields() {
        let json = serde_json::to_value(EnrichedTransaction::build(
            &CatalogSnapshot::empty(),
            transaction(),
        ))
        .unwrap();
        assert_eq!(json["type"], "waiver");
        assert_eq!(json["transaction_id"], "t1");
        assert!(json["enhanced_drops"]["404"]["player"].is_null());
    }

    #[test]
    fn test_missing_timestamp_has_no_date() {
        assert_eq!(format_date(0), None);
    }
}
