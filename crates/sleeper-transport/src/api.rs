//! Typed endpoint wrappers over a [`RemoteSource`].

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use sleeper_types::{
    League, LeagueUser, Matchup, NflState, PlayerMap, Roster, Transaction, TrendingEntry, User,
};

use crate::error::FetchError;
use crate::source::RemoteSource;

pub const DEFAULT_SPORT: &str = "nfl";

/// Direction of trending activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendKind {
    #[default]
    Add,
    Drop,
}

impl TrendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendKind::Add => "add",
            TrendKind::Drop => "drop",
        }
    }
}

impl fmt::Display for TrendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "add" => Ok(TrendKind::Add),
            "drop" => Ok(TrendKind::Drop),
            other => Err(format!("unknown trend type '{}', expected add or drop", other)),
        }
    }
}

/// Percent-encode one path segment (user names may contain anything).
fn segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for b in raw.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

/// The Sleeper endpoints this workspace consumes.
#[derive(Clone)]
pub struct SleeperApi<S = Arc<dyn RemoteSource>> {
    source: S,
    sport: String,
}

impl<S: RemoteSource> SleeperApi<S> {
    pub fn new(source: S) -> Self {
        Self::with_sport(source, DEFAULT_SPORT)
    }

    pub fn with_sport(source: S, sport: &str) -> Self {
        Self {
            source,
            sport: sport.to_string(),
        }
    }

    pub fn sport(&self) -> &str {
        &self.sport
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Object endpoint. The provider answers unknown ids with `null`.
    async fn object<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        match self.source.get_json(path).await? {
            Value::Null => Err(FetchError::NotFound {
                path: path.to_string(),
            }),
            value => decode(path, value),
        }
    }

    /// List endpoint; `null` is an empty list.
    async fn list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, FetchError> {
        match self.source.get_json(path).await? {
            Value::Null => Ok(Vec::new()),
            value => decode(path, value),
        }
    }

    pub fn players_path(&self) -> String {
        format!("/players/{}", self.sport)
    }

    /// The full catalog. Keys are player ids.
    pub async fn players(&self) -> Result<PlayerMap, FetchError> {
        let path = self.players_path();
        let mut players: PlayerMap = self.object(&path).await?;
        for (id, player) in players.iter_mut() {
            if player.player_id != *id {
                player.player_id = id.clone();
            }
        }
        Ok(players)
    }

    pub async fn trending(
        &self,
        kind: TrendKind,
        lookback_hours: u32,
        limit: u32,
    ) -> Result<Vec<TrendingEntry>, FetchError> {
        let path = format!(
            "/players/{}/trending/{}?lookback_hours={}&limit={}",
            self.sport, kind, lookback_hours, limit
        );
        self.list(&path).await
    }

    pub async fn nfl_state(&self) -> Result<NflState, FetchError> {
        self.object(&format!("/state/{}", self.sport)).await
    }

    pub async fn user(&self, username_or_id: &str) -> Result<User, FetchError> {
        self.object(&format!("/user/{}", segment(username_or_id)))
            .await
    }

    pub async fn user_leagues(
        &self,
        user_id: &str,
        sport: &str,
        season: &str,
    ) -> Result<Vec<League>, FetchError> {
        let path = format!(
            "/user/{}/leagues/{}/{}",
            segment(user_id),
            segment(sport),
            segment(season)
        );
        self.list(&path).await
    }

    pub async fn league(&self, league_id: &str) -> Result<League, FetchError> {
        self.object(&format!("/league/{}", segment(league_id)))
            .await
    }

    pub async fn rosters(&self, league_id: &str) -> Result<Vec<Roster>, FetchError> {
        self.list(&format!("/league/{}/rosters", segment(league_id)))
            .await
    }

    pub async fn league_users(&self, league_id: &str) -> Result<Vec<LeagueUser>, FetchError> {
        self.list(&format!("/league/{}/users", segment(league_id)))
            .await
    }

    pub async fn matchups(&self, league_id: &str, week: u32) -> Result<Vec<Matchup>, FetchError> {
        self.list(&format!("/league/{}/matchups/{}", segment(league_id), week))
            .await
    }

    pub async fn transactions(
        &self,
        league_id: &str,
        round: u32,
    ) -> Result<Vec<Transaction>, FetchError> {
        self.list(&format!(
            "/league/{}/transactions/{}",
            segment(league_id),
            round
        ))
        .await
    }
}

fn decode<T: DeserializeOwned>(path: &str, value: Value) -> Result<T, FetchError> {
    serde_json::from_value(value).map_err(|e| FetchError::Decode {
        path: path.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockSource;
    use serde_json::json;

    #[test]
    fn test_segment_encoding() {
        assert_eq!(segment("alice_99"), "alice_99");
        assert_eq!(segment("a b/c"), "a%20b%2Fc");
    }

    #[test]
    fn test_trend_kind_parse() {
        assert_eq!("DROP".parse::<TrendKind>().unwrap(), TrendKind::Drop);
        assert!("hold".parse::<TrendKind>().is_err());
    }

    #[tokio::test]
    async fn test_null_object_is_not_found() {
        let api = SleeperApi::new(MockSource::new().with_json("/user/ghost", Value::Null));
        let err = api.user("ghost").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_null_list_is_empty() {
        let api = SleeperApi::new(MockSource::new().with_json("/league/1/rosters", Value::Null));
        assert!(api.rosters("1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_players_normalizes_ids() {
        let api = SleeperApi::new(MockSource::new().with_json(
            "/players/nfl",
            json!({
                "4046": {"first_name": "Patrick", "last_name": "Mahomes"},
                "KC": {"player_id": "kc", "last_name": "Chiefs", "position": "DEF"}
            }),
        ));
        let players = api.players().await.unwrap();
        assert_eq!(players["4046"].player_id, "4046");
        assert_eq!(players["KC"].player_id, "KC");
    }

    #[tokio::test]
    async fn test_trending_path() {
        let source = MockSource::new().with_json(
            "/players/nfl/trending/drop?lookback_hours=48&limit=5",
            json!([{"player_id": "1", "count": 12}]),
        );
        let api = SleeperApi::new(source);
        let entries = api.trending(TrendKind::Drop, 48, 5).await.unwrap();
        assert_eq!(entries[0].count, 12);
    }

    #[tokio::test]
    async fn test_shape_mismatch_is_decode_error() {
        let api = SleeperApi::new(MockSource::new().with_json("/league/9", json!([1, 2])));
        let err = api.league("9").await.unwrap_err();
        assert_eq!(err.kind(), "decode");
    }
}
