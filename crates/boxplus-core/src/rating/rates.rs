// Rate normalization: season totals to per-100-possession rates, floor
// share, and per-floor-time shares of team totals.
//
// Degenerate denominators never fault. Each derived value falls back to 0:
// - possessions = minutes * pace / 48; per-100 rates are 0 when it is 0
// - team pts/TSA is 0 when team TSA is 0
// - floor share is 0 when team minutes are 0
// - a share of a team total is 0 when the team total or the floor share is 0

use serde::Serialize;

use crate::config::{ScoringConstants, TeamConstants};
use crate::rating::coefficients::CategoryLine;
use crate::totals::{PlayerSeasonTotals, TeamSeasonTotals};

/// Regulation minutes in one game.
pub const GAME_MINUTES: f64 = 48.0;

/// `numerator / denominator`, or 0 when the denominator is zero or not finite.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        0.0
    } else {
        numerator / denominator
    }
}

/// Team-level quantities every player rate is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TeamBaseline {
    pub true_shooting_attempts: f64,
    pub points_per_tsa: f64,
    /// Team total of threshold points under the same threshold.
    pub threshold_points: f64,
    /// Team minutes divided by the nominal lineup size.
    pub slot_minutes: f64,
    pub pace: f64,
}

impl TeamBaseline {
    pub fn from_totals(team: &TeamSeasonTotals, scoring: &ScoringConstants, lineup: &TeamConstants) -> Self {
        let tsa = team.true_shooting_attempts(scoring.ft_weight);
        let points_per_tsa = ratio(team.points, tsa);
        TeamBaseline {
            true_shooting_attempts: tsa,
            points_per_tsa,
            threshold_points: team.points - tsa * (points_per_tsa - scoring.threshold_offset),
            slot_minutes: team.minutes / lineup.roster_slots,
            pace: team.pace,
        }
    }
}

/// A player's share of each team total, per unit of floor share.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct UsageShares {
    pub trb: f64,
    pub stl: f64,
    pub blk: f64,
    pub ast: f64,
    pub pf: f64,
    pub threshold_points: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlayerRates {
    /// Estimated possessions played: `minutes * pace / 48`.
    pub possessions: f64,
    /// `minutes / (team_minutes / 5)`; 1.0 for a player who never sat.
    pub floor_share: f64,
    /// Points above the team's efficiency baseline, season total.
    pub adj_points: f64,
    /// Points above the threshold efficiency, season total.
    pub threshold_points: f64,
    pub per100: CategoryLine,
    pub shares: UsageShares,
}

fn per_100(value: f64, possessions: f64) -> f64 {
    ratio(value, possessions) * 100.0
}

fn share(value: f64, team_total: f64, floor_share: f64) -> f64 {
    ratio(ratio(value, team_total), floor_share)
}

/// Normalize one player's totals against their team.
pub fn normalize_player(
    player: &PlayerSeasonTotals,
    team: &TeamSeasonTotals,
    baseline: &TeamBaseline,
    scoring: &ScoringConstants,
) -> PlayerRates {
    let possessions = player.minutes * baseline.pace / GAME_MINUTES;
    let floor_share = ratio(player.minutes, baseline.slot_minutes);

    let tsa = player.true_shooting_attempts(scoring.ft_weight);
    let adj_points = player.points - tsa * (baseline.points_per_tsa - scoring.efficiency_baseline);
    let threshold_points =
        player.points - tsa * (baseline.points_per_tsa - scoring.threshold_offset);

    let per100 = CategoryLine {
        adj_pts: per_100(adj_points, possessions),
        fga: per_100(player.fga, possessions),
        fta: per_100(player.fta, possessions),
        fg3m: per_100(player.fg3m, possessions),
        ast: per_100(player.ast, possessions),
        tov: per_100(player.tov, possessions),
        oreb: per_100(player.oreb, possessions),
        dreb: per_100(player.dreb, possessions),
        treb: per_100(player.treb, possessions),
        stl: per_100(player.stl, possessions),
        blk: per_100(player.blk, possessions),
        pf: per_100(player.pf, possessions),
    };

    let shares = UsageShares {
        trb: share(player.treb, team.treb, floor_share),
        stl: share(player.stl, team.stl, floor_share),
        blk: share(player.blk, team.blk, floor_share),
        ast: share(player.ast, team.ast, floor_share),
        pf: share(player.pf, team.pf, floor_share),
        threshold_points: share(threshold_points, baseline.threshold_points, floor_share),
    };

    PlayerRates {
        possessions,
        floor_share,
        adj_points,
        threshold_points,
        per100,
        shares,
    }
}

/// Normalize a whole roster. Output order matches `roster`.
pub fn normalize_roster(
    team: &TeamSeasonTotals,
    roster: &[PlayerSeasonTotals],
    scoring: &ScoringConstants,
    lineup: &TeamConstants,
) -> (TeamBaseline, Vec<PlayerRates>) {
    let baseline = TeamBaseline::from_totals(team, scoring, lineup);
    let rates = roster
        .iter()
        .map(|p| normalize_player(p, team, &baseline, scoring))
        .collect();
    (baseline, rates)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
