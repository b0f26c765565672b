//! Weekly head-to-head pairing.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use sleeper_cache::CatalogSnapshot;
use sleeper_types::{LeagueUser, Matchup, PlayerDetails, Roster};

use crate::details::{resolve, starter_set};
use crate::roster::{attach_owner, MemberIndex};

/// Why a user's matchup could not be paired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum PairingFailure {
    /// The user owns no roster in the league.
    RosterNotFound,
    /// The roster has no matchup record (or no group) that week.
    NoMatchupForRoster,
    /// The group did not hold exactly two sides.
    UnexpectedSideCount { sides: usize },
}

impl fmt::Display for PairingFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PairingFailure::RosterNotFound => f.write_str("user has no roster in this league"),
            PairingFailure::NoMatchupForRoster => f.write_str("roster has no matchup this week"),
            PairingFailure::UnexpectedSideCount { sides } => {
                write!(f, "expected 2 sides in matchup, found {}", sides)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchupSide {
    pub roster_id: u32,
    pub owner: LeagueUser,
    pub points: f64,
    pub starters: Vec<PlayerDetails>,
    pub bench: Vec<PlayerDetails>,
    pub total_players: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchupPairing {
    Paired {
        matchup_id: u32,
        week: u32,
        sides: [MatchupSide; 2],
    },
    NotFound {
        #[serde(flatten)]
        reason: PairingFailure,
    },
}

impl MatchupPairing {
    pub fn is_paired(&self) -> bool {
        matches!(self, MatchupPairing::Paired { .. })
    }
}

/// Pair the user's roster with its opponent for one week.
pub fn pair_matchup(
    snapshot: &CatalogSnapshot,
    week: u32,
    user_id: &str,
    rosters: &[Roster],
    members: &MemberIndex,
    matchups: &[Matchup],
) -> MatchupPairing {
    let not_found = |reason| MatchupPairing::NotFound { reason };

    let Some(roster) = rosters.iter().find(|r| r.is_owned_by(user_id)) else {
        return not_found(PairingFailure::RosterNotFound);
    };
    let Some(matchup_id) = matchups
        .iter()
        .find(|m| m.roster_id == roster.roster_id)
        .and_then(|m| m.matchup_id)
    else {
        return not_found(PairingFailure::NoMatchupForRoster);
    };

    let group: Vec<&Matchup> = matchups
        .iter()
        .filter(|m| m.matchup_id == Some(matchup_id))
        .collect();
    let [first, second] = group.as_slice() else {
        return not_found(PairingFailure::UnexpectedSideCount { sides: group.len() });
    };

    let side = |m: &Matchup| build_side(snapshot, m, rosters, members);
    MatchupPairing::Paired {
        matchup_id,
        week,
        sides: [side(first), side(second)],
    }
}

fn build_side(
    snapshot: &CatalogSnapshot,
    matchup: &Matchup,
    rosters: &[Roster],
    members: &MemberIndex,
) -> MatchupSide {
    let owner = rosters
        .iter()
        .find(|r| r.roster_id == matchup.roster_id)
        .map(|r| attach_owner(r, members))
        .unwrap_or_else(LeagueUser::placeholder);
    let starters = starter_set(&matchup.starters);

    MatchupSide {
        roster_id: matchup.roster_id,
        owner,
        points: matchup.points,
        starters: resolve(snapshot, &matchup.starters, Some(&starters)),
        bench: resolve(snapshot, &matchup.bench_ids(), Some(&starters)),
        total_players: matchup.players.len(),
    }
}

/// One matchup group of a week (two teams, or one on a bye).
#[derive(Debug, Clone, Serialize)]
pub struct MatchupGroup {
    pub matchup_id: Option<u32>,
    pub teams: Vec<Matchup>,
}

/// Group a week's matchup records by group id, ordered by id.
pub fn group_matchups(matchups: Vec<Matchup>) -> Vec<MatchupGroup> {
    let mut groups: BTreeMap<Option<u32>, Vec<Matchup>> = BTreeMap::new();
    for matchup in matchups {
        groups.entry(matchup.matchup_id).or_default().push(matchup);
    }
    groups
        .into_iter()
        .map(|(matchup_id, teams)| MatchupGroup { matchup_id, teams })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_matchups_orders_by_id() {
        let groups = group_matchups(vec![
            Matchup::new(1, 2),
            Matchup::new(2, 1),
            Matchup::new(3, 2),
            Matchup::new(4, 1),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].matchup_id, Some(1));
        assert_eq!(groups[0].teams.len(), 2);
        assert_eq!(groups[1].teams[1].roster_id, 3);
    }

    #[test]
    fn test_failure_serializes_with_reason() {
        let pairing = MatchupPairing::NotFound {
            reason: PairingFailure::UnexpectedSideCount { sides: 3 },
        };
        let json = serde_json::to_value(&pairing).unwrap();
        assert_eq!(json["status"], "not_found");
        assert_eq!(json["reason"], "unexpected_side_count");
        assert_eq!(json["sides"], 3);
    }
}
