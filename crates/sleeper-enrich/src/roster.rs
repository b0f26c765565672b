//! Roster-detail join and owner attachment.

use std::collections::HashMap;

use serde::Serialize;

use sleeper_cache::CatalogSnapshot;
use sleeper_types::{LeagueUser, PlayerDetails, Roster};

use crate::details::{resolve, starter_set};

/// League members by user id.
pub type MemberIndex = HashMap<String, LeagueUser>;

pub fn member_index(members: Vec<LeagueUser>) -> MemberIndex {
    members
        .into_iter()
        .map(|member| (member.user_id.clone(), member))
        .collect()
}

/// The roster's owning member, or the fixed placeholder.
pub fn attach_owner(roster: &Roster, members: &MemberIndex) -> LeagueUser {
    roster
        .owner_id
        .as_deref()
        .and_then(|id| members.get(id))
        .cloned()
        .unwrap_or_else(LeagueUser::placeholder)
}

/// A roster with its players resolved and its owner attached.
#[derive(Debug, Clone, Serialize)]
pub struct RosterDetail {
    pub roster: Roster,
    pub owner: LeagueUser,
    /// Resolved from the starter list itself, so a starter missing from the
    /// full list still appears here.
    pub starters: Vec<PlayerDetails>,
    pub bench: Vec<PlayerDetails>,
    pub all_players: Vec<PlayerDetails>,
}

impl RosterDetail {
    pub fn build(snapshot: &CatalogSnapshot, roster: &Roster, owner: LeagueUser) -> Self {
        let starters = starter_set(&roster.starters);
        let all_players = resolve(snapshot, &roster.players, Some(&starters));
        let starter_details = resolve(snapshot, &roster.starters, Some(&starters));
        let bench = all_players
            .iter()
            .filter(|p| !p.is_starter())
            .cloned()
            .collect();

        Self {
            roster: roster.clone(),
            owner,
            starters: starter_details,
            bench,
            all_players,
        }
    }

    pub fn roster_id(&self) -> u32 {
        self.roster.roster_id
    }
}
