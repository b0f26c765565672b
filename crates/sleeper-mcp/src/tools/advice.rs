//! Fantasy advice heuristics.
//!
//! Pure functions over already-enriched players. Advice tiers use their own
//! rank sentinel (999), distinct from the search-ordering sentinel.

use serde::Serialize;

use sleeper_types::{Player, PlayerDetails, HEALTHY_LABEL};

pub const ADVICE_RANK_SENTINEL: u32 = 999;

fn rank(player: &Player) -> u32 {
    player.search_rank.unwrap_or(ADVICE_RANK_SENTINEL)
}

fn injury(player: &Player) -> Option<&str> {
    player.injury_status.as_deref()
}

pub fn fantasy_impact(player: &Player) -> &'static str {
    match injury(player) {
        Some("Out") => "HIGH NEGATIVE IMPACT - Player is ruled out and should not be started",
        Some("Doubtful") => "HIGH RISK - Player unlikely to play, consider bench/alternative options",
        Some("Questionable") => "MODERATE RISK - Monitor closely, have backup plan ready",
        _ if player.status.as_deref() != Some("Active") => {
            "NOT FANTASY RELEVANT - Player not on active roster"
        }
        _ => "LOW RISK - Player appears healthy and available",
    }
}

pub fn player_recommendation(player: &Player) -> String {
    match injury(player) {
        Some("Out") => "DO NOT START - Find immediate replacement".to_string(),
        Some("Doubtful") => "AVOID - High risk of not playing".to_string(),
        Some("Questionable") => {
            "CAUTION - Monitor injury reports leading up to game time".to_string()
        }
        _ => {
            let tier = match rank(player) {
                r if r <= 50 => "elite",
                r if r <= 150 => "solid",
                _ => "depth",
            };
            format!(
                "CONSIDER STARTING - {} option at {}",
                tier,
                player.display_position()
            )
        }
    }
}

/// A suggested bench swap for an injured starter.
#[derive(Debug, Clone, Serialize)]
pub struct LineupChange {
    pub player: PlayerDetails,
    pub recommendation: String,
    pub reason: String,
}

/// For each Out/Doubtful starter, the first bench player sharing a fantasy
/// position who is not Out.
pub fn lineup_changes(starters: &[PlayerDetails], bench: &[PlayerDetails]) -> Vec<LineupChange> {
    starters
        .iter()
        .filter_map(|starter| {
            let status = injury(&starter.player).filter(|s| matches!(*s, "Out" | "Doubtful"))?;
            let replacement = bench.iter().find(|candidate| {
                injury(&candidate.player) != Some("Out")
                    && candidate
                        .player
                        .fantasy_positions
                        .iter()
                        .any(|pos| starter.player.fantasy_positions.contains(pos))
            })?;
            Some(LineupChange {
                player: starter.clone(),
                recommendation: format!("Bench {}", starter.full_name),
                reason: format!(
                    "Player is {} - replace with {}",
                    status, replacement.full_name
                ),
            })
        })
        .collect()
}

/// Rough lineup projection from rank tier and injury status.
pub fn projected_points(starters: &[PlayerDetails]) -> i64 {
    starters
        .iter()
        .map(|details| {
            let player = &details.player;
            let mut points: i64 = 8;
            match rank(player) {
                r if r <= 24 => points += 6,
                r if r <= 60 => points += 4,
                r if r <= 120 => points += 2,
                _ => {}
            }
            match injury(player) {
                Some("Questionable") => points - 2,
                Some("Doubtful") => points - 5,
                Some("Out") => 0,
                _ => points,
            }
        })
        .sum()
}

/// Letter grade from the share of starters without an injury designation.
pub fn lineup_grade(starters: &[PlayerDetails]) -> &'static str {
    if starters.is_empty() {
        return "F";
    }
    let injured = starters
        .iter()
        .filter(|p| matches!(injury(&p.player), Some("Out" | "Doubtful" | "Questionable")))
        .count();
    let healthy_ratio = (starters.len() - injured) as f64 / starters.len() as f64;
    match healthy_ratio {
        r if r >= 0.9 => "A",
        r if r >= 0.8 => "B",
        r if r >= 0.7 => "C",
        r if r >= 0.6 => "D",
        _ => "F",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WaiverPriority {
    High,
    Medium,
    Low,
}

impl WaiverPriority {
    pub fn for_index(index: usize) -> Self {
        match index {
            0..=4 => WaiverPriority::High,
            5..=14 => WaiverPriority::Medium,
            _ => WaiverPriority::Low,
        }
    }
}

pub fn waiver_reason(player: &Player, trending_adds: u32) -> String {
    let mut reason = format!("{} managers added recently", trending_adds);
    if let Some(status) = injury(player).filter(|s| *s != HEALTHY_LABEL) {
        reason.push_str(&format!(" - Monitor injury status ({})", status));
    }
    if let Some(team) = &player.team {
        reason.push_str(&format!(" - {} {}", team, player.display_position()));
    }
    reason
}

#[derive(Debug, Clone, Serialize)]
pub struct BasicInfoComparison {
    pub positions: String,
    pub teams: String,
    pub ages: String,
    pub experience: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SideBySide {
    pub status: String,
    pub advantage: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankingComparison {
    pub rankings: String,
    pub advantage: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerComparison {
    pub basic_info: BasicInfoComparison,
    pub injury_status: SideBySide,
    pub fantasy_relevance: RankingComparison,
    pub recommendation: String,
}

pub fn compare(p1: &PlayerDetails, p2: &PlayerDetails) -> PlayerComparison {
    let (a, b) = (&p1.player, &p2.player);

    let basic_info = BasicInfoComparison {
        positions: format!("{} vs {}", a.display_position(), b.display_position()),
        teams: format!(
            "{} vs {}",
            a.team.as_deref().unwrap_or("FA"),
            b.team.as_deref().unwrap_or("FA")
        ),
        ages: match (a.age, b.age) {
            (Some(x), Some(y)) => format!("{} vs {} years old", x, y),
            _ => "Age data unavailable".to_string(),
        },
        experience: match (a.years_exp, b.years_exp) {
            (Some(x), Some(y)) => format!("{} vs {} years experience", x, y),
            _ => "Experience data unavailable".to_string(),
        },
    };

    let (s1, s2) = (a.injury_label(), b.injury_label());
    let injury_advantage = if s1 == HEALTHY_LABEL && s2 != HEALTHY_LABEL {
        p1.full_name.clone()
    } else if s2 == HEALTHY_LABEL && s1 != HEALTHY_LABEL {
        p2.full_name.clone()
    } else {
        "Even".to_string()
    };

    let (r1, r2) = (rank(a), rank(b));
    let rank_advantage = match r1.cmp(&r2) {
        std::cmp::Ordering::Less => p1.full_name.clone(),
        std::cmp::Ordering::Greater => p2.full_name.clone(),
        std::cmp::Ordering::Equal => "Even".to_string(),
    };

    PlayerComparison {
        basic_info,
        injury_status: SideBySide {
            status: format!("{} vs {}", s1, s2),
            advantage: injury_advantage,
        },
        fantasy_relevance: RankingComparison {
            rankings: format!("#{} vs #{}", r1, r2),
            advantage: rank_advantage,
        },
        recommendation: comparison_recommendation(p1, p2),
    }
}

fn comparison_recommendation(p1: &PlayerDetails, p2: &PlayerDetails) -> String {
    let (out1, out2) = (
        injury(&p1.player) == Some("Out"),
        injury(&p2.player) == Some("Out"),
    );
    if out1 && !out2 {
        return format!("Start {} - {} is ruled out", p2.full_name, p1.full_name);
    }
    if out2 && !out1 {
        return format!("Start {} - {} is ruled out", p1.full_name, p2.full_name);
    }

    let (r1, r2) = (rank(&p1.player), rank(&p2.player));
    if r1.abs_diff(r2) > 30 {
        let better = if r1 < r2 { &p1.full_name } else { &p2.full_name };
        return format!("Start {} - significantly higher ranked player", better);
    }
    "Close decision - both viable options. Consider matchup and recent form.".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StartSit {
    Start,
    Sit,
    Flex,
}

pub fn start_sit(player: &Player) -> StartSit {
    let injury = injury(player);
    if matches!(injury, Some("Out" | "Doubtful")) {
        return StartSit::Sit;
    }
    match rank(player) {
        r if r <= 60 && injury != Some("Questionable") => StartSit::Start,
        r if r <= 120 => StartSit::Flex,
        _ => StartSit::Sit,
    }
}

/// Confidence in [`start_sit`]'s call, clamped to 0..=100.
pub fn confidence(player: &Player) -> u8 {
    let mut confidence: i32 = 50;
    match rank(player) {
        r if r <= 24 => confidence += 30,
        r if r <= 60 => confidence += 20,
        r if r <= 120 => confidence += 10,
        _ => confidence -= 10,
    }
    match injury(player) {
        Some("Out") => confidence = 95,
        Some("Doubtful") => confidence += 20,
        Some("Questionable") => confidence -= 15,
        _ => {}
    }
    confidence.clamp(0, 100) as u8
}

pub fn start_sit_reasoning(player: &Player) -> String {
    let mut reasons: Vec<String> = Vec::new();
    match rank(player) {
        r if r <= 24 => reasons.push("Elite player ranking".to_string()),
        r if r <= 60 => reasons.push("Solid fantasy option".to_string()),
        r if r > 200 => reasons.push("Low fantasy ranking".to_string()),
        _ => {}
    }
    reasons.push(
        match injury(player) {
            Some("Out") => "Ruled out for game",
            Some("Doubtful") => "Unlikely to play",
            Some("Questionable") => "Game-time decision",
            _ => "No injury concerns",
        }
        .to_string(),
    );
    if let Some(team) = &player.team {
        reasons.push(format!("{} {}", team, player.display_position()));
    }
    reasons.join(" • ")
}

#[derive(Debug, Clone, Serialize)]
pub struct StartSitAdvice {
    pub player: PlayerDetails,
    pub is_currently_starting: bool,
    pub recommendation: StartSit,
    pub confidence: u8,
    pub reasoning: String,
}

/// Advice per player, "start" calls first, then by confidence descending.
pub fn start_sit_advice(players: Vec<PlayerDetails>) -> Vec<StartSitAdvice> {
    let mut advice: Vec<StartSitAdvice> = players
        .into_iter()
        .map(|details| StartSitAdvice {
            is_currently_starting: details.is_starter(),
            recommendation: start_sit(&details.player),
            confidence: confidence(&details.player),
            reasoning: start_sit_reasoning(&details.player),
            player: details,
        })
        .collect();
    advice.sort_by(|a, b| {
        let a_start = a.recommendation == StartSit::Start;
        let b_start = b.recommendation == StartSit::Start;
        b_start
            .cmp(&a_start)
            .then_with(|| b.confidence.cmp(&a.confidence))
    });
    advice
}
