// Rating pipeline: rate normalization, position estimation, coefficient
// interpolation, raw ratings, team reconciliation and derived metrics.

pub mod coefficients;
pub mod metrics;
pub mod position;
pub mod rates;
pub mod raw;
pub mod team;

#[cfg(test)]
pub(crate) mod fixtures;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{CoefficientTable, ModelConstants};
use crate::error::RatingError;
use crate::totals::{PlayerSeasonRecord, PlayerSeasonTotals, TeamSeasonTotals};

use coefficients::PlayerCoefficients;
use metrics::RatingSplit;
use position::{Convergence, PositionEstimates, PositionFlavor, CONVERGENCE_TOLERANCE};
use rates::{PlayerRates, TeamBaseline};
use raw::RawRating;
use team::{LeagueContext, TeamContext};

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Everything computed for one player in one team pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerRating {
    pub player_id: String,
    pub team: String,
    pub games: f64,
    pub minutes: f64,
    pub nominal_position: f64,
    pub position_defaulted: bool,
    /// Final corrected overall position estimate.
    pub position: f64,
    pub offensive_role: f64,
    pub rates: PlayerRates,
    pub coefficients: PlayerCoefficients,
    pub raw: RawRating,
    /// Team-adjusted final ratings.
    pub rating: RatingSplit,
    pub contribution: f64,
    pub vorp: f64,
    pub regressed: RatingSplit,
}

/// A team whose position average missed 3.0 after the fixed rounds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvergenceWarning {
    pub team: String,
    pub flavor: PositionFlavor,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamResult {
    pub context: TeamContext,
    pub baseline: TeamBaseline,
    pub positions: PositionEstimates,
    /// Roster order.
    pub players: Vec<PlayerRating>,
    pub warnings: Vec<ConvergenceWarning>,
    /// Players whose nominal position fell back to the default.
    pub defaulted_positions: usize,
}

// ---------------------------------------------------------------------------
// Team pass
// ---------------------------------------------------------------------------

fn check_convergence(
    team: &str,
    flavor: PositionFlavor,
    conv: &Convergence,
    has_minutes: bool,
    warnings: &mut Vec<ConvergenceWarning>,
) {
    if has_minutes && conv.deviation() > CONVERGENCE_TOLERANCE {
        warn!(
            "{team}: {flavor:?} position average {:.9} is off target after the fixed rounds",
            conv.final_average()
        );
        warnings.push(ConvergenceWarning {
            team: team.to_string(),
            flavor,
            average: conv.final_average(),
        });
    }
}

/// Rate every player on one team.
///
/// Fails if the team has no totals, its totals are invalid, or any roster
/// entry lacks a required field; degenerate ratios and convergence misses
/// never fail.
pub fn compute_team(
    team_code: &str,
    team: Option<&TeamSeasonTotals>,
    roster: &[PlayerSeasonRecord],
    league: &LeagueContext,
    coefficients: &CoefficientTable,
    constants: &ModelConstants,
) -> Result<TeamResult, RatingError> {
    let team = team.ok_or_else(|| RatingError::MissingTeam {
        team: team_code.to_string(),
    })?;
    team.validate()?;

    let players: Vec<PlayerSeasonTotals> = roster
        .iter()
        .map(PlayerSeasonRecord::validate)
        .collect::<Result<_, _>>()?;

    let defaulted_positions = players.iter().filter(|p| p.position_defaulted).count();
    for p in players.iter().filter(|p| p.position_defaulted) {
        debug!("{team_code}: no position for {}, using default", p.player_id);
    }

    // 1. Rates
    let (baseline, rates) = rates::normalize_roster(team, &players, &constants.scoring, &constants.team);

    // 2. Positions
    let positions = position::estimate_positions(&players, &rates, constants);
    let has_minutes = players.iter().any(|p| p.minutes > 0.0);
    let mut warnings = Vec::new();
    check_convergence(team_code, PositionFlavor::Overall, &positions.position, has_minutes, &mut warnings);
    check_convergence(
        team_code,
        PositionFlavor::OffensiveRole,
        &positions.offensive_role,
        has_minutes,
        &mut warnings,
    );

    // 3 + 4. Coefficients and raw ratings
    let player_coefs: Vec<PlayerCoefficients> = (0..players.len())
        .map(|i| PlayerCoefficients::for_player(coefficients, positions.position(i), positions.offensive_role(i)))
        .collect();
    let raw: Vec<RawRating> = (0..players.len())
        .map(|i| {
            raw::raw_rating(
                &rates[i],
                &player_coefs[i],
                coefficients,
                positions.position(i),
                positions.offensive_role(i),
            )
        })
        .collect();

    // 5. Team reconciliation
    let context = team::team_context(team, league, &raw, &rates, &constants.team);
    debug!(
        "{team_code}: team rating {:.3}, raw contribution {:.3}, correction {:.3}",
        context.team_rating, context.raw_contribution, context.overall_correction
    );

    // 6. Finals and derived metrics
    let replacement = &constants.replacement;
    let rated: Vec<PlayerRating> = players
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
            let r = &rates[i];
            let rating = metrics::final_ratings(&raw[i], &context);
            PlayerRating {
                position: positions.position(i),
                offensive_role: positions.offensive_role(i),
                rates: *r,
                coefficients: player_coefs[i],
                raw: raw[i],
                contribution: metrics::contribution(rating.overall, r.floor_share),
                vorp: metrics::value_over_replacement(rating.overall, r.floor_share, team.games, replacement),
                regressed: metrics::regressed_ratings(&rating, p.minutes, p.games, replacement),
                rating,
                player_id: p.player_id,
                team: p.team,
                games: p.games,
                minutes: p.minutes,
                nominal_position: p.nominal_position,
                position_defaulted: p.position_defaulted,
            }
        })
        .collect();

    Ok(TeamResult {
        context,
        baseline,
        positions,
        players: rated,
        warnings,
        defaulted_positions,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
