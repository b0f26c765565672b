//! Async join operations.
//!
//! Each operation fetches its league-scoped collections fresh, then resolves
//! player ids through the shared [`ReferenceCache`]. Nothing here is cached.

use std::sync::Arc;

use futures::future::{try_join, try_join3, try_join_all};
use tracing::debug;

use sleeper_cache::{CacheRead, ReferenceCache};
use sleeper_transport::{FetchError, RemoteSource, SleeperApi, TrendKind};
use sleeper_types::{Player, PlayerDetails, Roster};

use crate::details::{enrich, is_questionable, resolve, DetailsJoin};
use crate::matchup::{group_matchups, pair_matchup, MatchupGroup, MatchupPairing};
use crate::roster::{attach_owner, member_index, RosterDetail};
use crate::transactions::EnrichedTransaction;
use crate::trending::{join_trending, TrendingPlayer};

/// A joined result plus whether the catalog read avoided a remote download.
#[derive(Debug, Clone)]
pub struct Joined<T> {
    pub value: T,
    pub cache_hit: bool,
}

impl<T> Joined<T> {
    fn new(value: T, read: &CacheRead) -> Self {
        Self {
            value,
            cache_hit: read.origin.is_cache_hit(),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Joined<U> {
        Joined {
            value: f(self.value),
            cache_hit: self.cache_hit,
        }
    }
}

#[derive(Clone)]
pub struct EnrichmentJoiner {
    api: SleeperApi<Arc<dyn RemoteSource>>,
    cache: ReferenceCache,
}

impl EnrichmentJoiner {
    pub fn new(api: SleeperApi<Arc<dyn RemoteSource>>, cache: ReferenceCache) -> Self {
        Self { api, cache }
    }

    pub fn api(&self) -> &SleeperApi<Arc<dyn RemoteSource>> {
        &self.api
    }

    pub fn cache(&self) -> &ReferenceCache {
        &self.cache
    }

    /// Player-detail join for an ordered id list.
    pub async fn player_details(&self, ids: &[String]) -> Result<Joined<DetailsJoin>, FetchError> {
        let read = self.cache.ensure_fresh().await?;
        let join = DetailsJoin::new(&read.snapshot, ids);
        if join.missing() > 0 {
            debug!(
                requested = join.requested_count,
                returned = join.count,
                "some player ids are not in the catalog"
            );
        }
        Ok(Joined::new(join, &read))
    }

    /// The roster owned by `user_id`, if any.
    pub async fn find_user_roster(
        &self,
        league_id: &str,
        user_id: &str,
    ) -> Result<Option<Roster>, FetchError> {
        let rosters = self.api.rosters(league_id).await?;
        Ok(rosters.into_iter().find(|r| r.is_owned_by(user_id)))
    }

    /// Roster-detail join for one roster, fetching the member list once.
    pub async fn roster_with_owner(
        &self,
        roster: &Roster,
        league_id: &str,
    ) -> Result<Joined<RosterDetail>, FetchError> {
        let (members, read) =
            try_join(self.api.league_users(league_id), self.cache.ensure_fresh()).await?;
        let owner = attach_owner(roster, &member_index(members));
        let detail = RosterDetail::build(&read.snapshot, roster, owner);
        Ok(Joined::new(detail, &read))
    }

    /// Batch roster-detail join over a whole league.
    ///
    /// Rosters and members are fetched once. The per-roster joins run
    /// concurrently and coalesce onto a single catalog refresh.
    pub async fn league_rosters(
        &self,
        league_id: &str,
    ) -> Result<Joined<Vec<RosterDetail>>, FetchError> {
        let (rosters, members) =
            try_join(self.api.rosters(league_id), self.api.league_users(league_id)).await?;
        let members = member_index(members);

        let joined = try_join_all(rosters.iter().map(|roster| {
            let members = &members;
            async move {
                let read = self.cache.ensure_fresh().await?;
                let owner = attach_owner(roster, members);
                Ok::<_, FetchError>(Joined::new(
                    RosterDetail::build(&read.snapshot, roster, owner),
                    &read,
                ))
            }
        }))
        .await?;

        let cache_hit = joined.iter().all(|j| j.cache_hit);
        let details: Vec<RosterDetail> = joined.into_iter().map(|j| j.value).collect();
        debug!(league_id, rosters = details.len(), "joined league rosters");
        Ok(Joined {
            value: details,
            cache_hit,
        })
    }

    pub async fn league_rosters_raw(&self, league_id: &str) -> Result<Vec<Roster>, FetchError> {
        self.api.rosters(league_id).await
    }

    pub async fn matchup_pairing(
        &self,
        league_id: &str,
        week: u32,
        user_id: &str,
    ) -> Result<Joined<MatchupPairing>, FetchError> {
        let (rosters, members, matchups) = try_join3(
            self.api.rosters(league_id),
            self.api.league_users(league_id),
            self.api.matchups(league_id, week),
        )
        .await?;
        let read = self.cache.ensure_fresh().await?;
        let pairing = pair_matchup(
            &read.snapshot,
            week,
            user_id,
            &rosters,
            &member_index(members),
            &matchups,
        );
        if let MatchupPairing::NotFound { reason } = &pairing {
            debug!(league_id, week, user_id, %reason, "no matchup pairing");
        }
        Ok(Joined::new(pairing, &read))
    }

    /// A week's matchups grouped by matchup id. Does not touch the catalog.
    pub async fn league_matchups(
        &self,
        league_id: &str,
        week: u32,
    ) -> Result<Vec<MatchupGroup>, FetchError> {
        Ok(group_matchups(self.api.matchups(league_id, week).await?))
    }

    /// Trending entries joined to the catalog; unresolved ids keep a null player.
    pub async fn trending(
        &self,
        kind: TrendKind,
        lookback_hours: u32,
        limit: u32,
    ) -> Result<Joined<Vec<TrendingPlayer>>, FetchError> {
        let entries = self.api.trending(kind, lookback_hours, limit).await?;
        let ids: Vec<String> = entries.iter().map(|e| e.player_id.clone()).collect();
        let read = self.cache.ensure_fresh().await?;
        let players = resolve(&read.snapshot, &ids, None);
        Ok(Joined::new(join_trending(entries, &players), &read))
    }

    /// Players among `ids` whose injury status is Questionable, Doubtful or Out.
    pub async fn questionable_players(
        &self,
        ids: &[String],
    ) -> Result<Joined<Vec<PlayerDetails>>, FetchError> {
        let read = self.cache.ensure_fresh().await?;
        let players = ids
            .iter()
            .filter_map(|id| read.snapshot.get(id))
            .filter(|p| is_questionable(p))
            .map(|p| enrich(p, None))
            .collect();
        Ok(Joined::new(players, &read))
    }

    pub async fn transactions(
        &self,
        league_id: &str,
        week: u32,
    ) -> Result<Joined<Vec<EnrichedTransaction>>, FetchError> {
        let transactions = self.api.transactions(league_id, week).await?;
        let read = self.cache.ensure_fresh().await?;
        let enriched = transactions
            .into_iter()
            .map(|t| EnrichedTransaction::build(&read.snapshot, t))
            .collect();
        Ok(Joined::new(enriched, &read))
    }

    pub async fn active_startable(
        &self,
        position: Option<&str>,
    ) -> Result<Joined<Vec<Player>>, FetchError> {
        let read = self.cache.ensure_fresh().await?;
        Ok(Joined::new(read.snapshot.active_startable(position), &read))
    }

    pub async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Joined<Vec<PlayerDetails>>, FetchError> {
        if limit == 0 {
            return Ok(Joined {
                value: Vec::new(),
                cache_hit: true,
            });
        }
        let read = self.cache.ensure_fresh().await?;
        let players = read
            .snapshot
            .search(query, limit)
            .iter()
            .map(|p| enrich(p, None))
            .collect();
        Ok(Joined::new(players, &read))
    }
}
