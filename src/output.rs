//! Output formatting for the sleeper CLI.
//!
//! Every command prints either one of these text renderings or
//! pretty-printed JSON when `--json` is set.

use serde::Serialize;

use sleeper_cache::CacheStatus;
use sleeper_enrich::TrendingPlayer;
use sleeper_types::PlayerDetails;

const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Pretty JSON, falling back to `{}` for values serde cannot render.
pub fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Whole hours and minutes, e.g. `3h 07m`.
pub fn format_age(age_ms: i64) -> String {
    let minutes = age_ms.max(0) / 60_000;
    format!("{}h {:02}m", minutes / 60, minutes % 60)
}

fn injury_color(label: &str) -> &'static str {
    match label {
        "Healthy" => GREEN,
        "Questionable" => YELLOW,
        _ => RED,
    }
}

/// One line per player: id, name, position, team, injury label.
pub fn format_player_line(details: &PlayerDetails) -> String {
    let player = &details.player;
    let label = player.injury_label();
    let mut line = format!(
        "{:<8} {:<26} {:<4} {:<4} {}{}{}",
        details.id(),
        details.full_name,
        details.display_position,
        player.team.as_deref().unwrap_or("FA"),
        injury_color(label),
        label,
        RESET
    );
    if let Some(rank) = player.search_rank {
        line.push_str(&format!(" {}#{}{}", DIM, rank, RESET));
    }
    line
}

pub fn format_players(players: &[PlayerDetails]) -> String {
    if players.is_empty() {
        return "No players found\n".to_string();
    }
    let mut out = String::new();
    for details in players {
        out.push_str(&format_player_line(details));
        out.push('\n');
    }
    out
}

pub fn format_trending(entries: &[TrendingPlayer]) -> String {
    if entries.is_empty() {
        return "No trending activity\n".to_string();
    }
    let mut out = String::new();
    for (i, entry) in entries.iter().enumerate() {
        let who = match &entry.player {
            Some(details) => format_player_line(details),
            None => format!("{:<8} {}(not in catalog){}", entry.player_id, DIM, RESET),
        };
        out.push_str(&format!("{:>3}. {:>6}  {}\n", i + 1, entry.count, who));
    }
    out
}

pub fn format_cache_status(status: &CacheStatus) -> String {
    let mut out = format!("{}Player Cache{}\n", BOLD, RESET);
    out.push_str(&format!("  Storage:      {}\n", status.storage_dir));
    out.push_str(&format!("  Players:      {}\n", status.player_count));
    match status.age_ms {
        Some(age) => out.push_str(&format!(
            "  Age:          {} ({}{}{})\n",
            format_age(age),
            if status.is_fresh { GREEN } else { YELLOW },
            if status.is_fresh { "fresh" } else { "stale" },
            RESET
        )),
        None => out.push_str("  Age:          never refreshed\n"),
    }
    out.push_str(&format!("  TTL:          {}\n", format_age(status.ttl_ms)));
    if status.refresh_in_flight {
        out.push_str("  Refresh:      in flight\n");
    }
    out.push('\n');
    out.push_str(&status.metrics.format_report());
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sleeper_types::Player;

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(0), "0h 00m");
        assert_eq!(format_age(3 * 3_600_000 + 7 * 60_000 + 59_000), "3h 07m");
        assert_eq!(format_age(-5), "0h 00m");
    }

    #[test]
    fn test_player_line_defaults() {
        let player = Player::new("4984", "Josh", "Allen").with_position("QB");
        let line = format_player_line(&PlayerDetails::from_player(&player));
        assert!(line.starts_with("4984"));
        assert!(line.contains("Josh Allen"));
        assert!(line.contains("FA"));
        assert!(line.contains("Healthy"));
    }

    #[test]
    fn test_trending_marks_unresolved() {
        let entries = vec![TrendingPlayer {
            player_id: "0000".to_string(),
            count: 12,
            player: None,
        }];
        let out = format_trending(&entries);
        assert!(out.contains("0000"));
        assert!(out.contains("not in catalog"));
    }

    #[test]
    fn test_empty_lists() {
        assert_eq!(format_players(&[]), "No players found\n");
        assert_eq!(format_trending(&[]), "No trending activity\n");
    }
}
