// League aggregation: rate every team independently and merge the player
// rows into one table.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{CoefficientTable, ModelConstants};
use crate::error::RatingError;
use crate::rating::team::{LeagueContext, TeamContext};
use crate::rating::{compute_team, ConvergenceWarning, PlayerRating, TeamResult};
use crate::totals::{PlayerSeasonRecord, RejectedRow, TeamSeasonTotals};

/// Source of season totals, keyed by team code.
pub trait TotalsProvider: Sync {
    fn team_totals(&self, team: &str) -> Option<TeamSeasonTotals>;
    fn roster(&self, team: &str) -> Vec<PlayerSeasonRecord>;

    /// Input rows the provider could not read. A team named by any of them
    /// is reported as failed rather than rated on a partial roster.
    fn rejected_rows(&self) -> Vec<RejectedRow> {
        Vec::new()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LeagueOptions {
    /// Abort on the first failed team instead of returning a partial table.
    pub fail_fast: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamFailure {
    pub team: String,
    pub error: String,
}

/// Per-team roll-up kept alongside the league table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSummary {
    pub context: TeamContext,
    pub players: usize,
    pub defaulted_positions: usize,
    pub position_average: f64,
}

impl TeamSummary {
    fn from_result(result: &TeamResult) -> Self {
        TeamSummary {
            context: result.context.clone(),
            players: result.players.len(),
            defaulted_positions: result.defaulted_positions,
            position_average: result.positions.position.final_average(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeagueResult {
    pub league: LeagueContext,
    /// Every rated player, sorted by final overall rating, best first.
    pub rows: Vec<PlayerRating>,
    pub teams: Vec<TeamSummary>,
    pub failures: Vec<TeamFailure>,
    pub warnings: Vec<ConvergenceWarning>,
    /// Every row the provider rejected, including rows naming no team.
    pub rejected_rows: Vec<RejectedRow>,
}

impl LeagueResult {
    pub fn failed_teams(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.team.as_str()).collect()
    }

    /// Rejected rows that could not be attributed to any team.
    pub fn unattributed_rows(&self) -> Vec<&RejectedRow> {
        self.rejected_rows.iter().filter(|r| r.team.is_none()).collect()
    }

    pub fn defaulted_positions(&self) -> usize {
        self.teams.iter().map(|t| t.defaulted_positions).sum()
    }

    /// Fraction of rated players whose nominal position was defaulted.
    pub fn defaulted_position_rate(&self) -> f64 {
        if self.rows.is_empty() {
            return 0.0;
        }
        self.defaulted_positions() as f64 / self.rows.len() as f64
    }
}

fn rejected_error(team: &str, rejected: &[RejectedRow]) -> Option<RatingError> {
    let rows: Vec<&RejectedRow> = rejected
        .iter()
        .filter(|r| r.team.as_deref() == Some(team))
        .collect();
    let first = rows.first()?;
    let who = first.player.as_deref().unwrap_or("team row");
    Some(RatingError::RejectedRows {
        team: team.to_string(),
        rows: rows.len(),
        detail: format!("{who}: {}", first.reason),
    })
}

/// Rate every team in `team_codes`.
///
/// The league-average offensive rating is taken over every listed team with
/// valid totals before any team is rated. Teams then run in parallel. A team
/// with invalid totals or rejected input rows fails. A failed team is
/// recorded and skipped, unless `options.fail_fast` is set, in which case
/// the first failure in `team_codes` order is returned.
pub fn compute_league<P: TotalsProvider>(
    team_codes: &[String],
    provider: &P,
    coefficients: &CoefficientTable,
    constants: &ModelConstants,
    options: LeagueOptions,
) -> Result<LeagueResult, RatingError> {
    let inputs: Vec<(&str, Option<TeamSeasonTotals>, Vec<PlayerSeasonRecord>)> = team_codes
        .iter()
        .map(|code| (code.as_str(), provider.team_totals(code), provider.roster(code)))
        .collect();

    let rejected_rows = provider.rejected_rows();
    let unattributed = rejected_rows.iter().filter(|r| r.team.is_none()).count();
    if unattributed > 0 {
        warn!("{unattributed} rejected input row(s) name no team; ratings may be incomplete");
    }

    let league = LeagueContext::from_teams(
        inputs
            .iter()
            .filter_map(|(_, t, _)| t.as_ref())
            .filter(|t| t.validate().is_ok()),
    );
    info!(
        "League context: {} teams, average offensive rating {:.3}",
        league.teams, league.league_off_rating
    );

    let outcomes: Vec<(&str, Result<TeamResult, RatingError>)> = inputs
        .par_iter()
        .map(|(code, totals, roster)| {
            let result = match rejected_error(code, &rejected_rows) {
                Some(e) => Err(e),
                None => compute_team(code, totals.as_ref(), roster, &league, coefficients, constants),
            };
            (*code, result)
        })
        .collect();

    let mut rows = Vec::new();
    let mut teams = Vec::new();
    let mut failures = Vec::new();
    let mut warnings = Vec::new();

    for (code, outcome) in outcomes {
        match outcome {
            Ok(result) => {
                teams.push(TeamSummary::from_result(&result));
                warnings.extend(result.warnings);
                rows.extend(result.players);
            }
            Err(e) if options.fail_fast => return Err(e),
            Err(e) => {
                warn!("Skipping team {code}: {e}");
                failures.push(TeamFailure {
                    team: code.to_string(),
                    error: e.to_string(),
                });
            }
        }
    }

    rows.sort_by(|a, b| b.rating.overall.total_cmp(&a.rating.overall));

    let result = LeagueResult {
        league,
        rows,
        teams,
        failures,
        warnings,
        rejected_rows,
    };
    info!(
        "Rated {} players on {} teams ({} failed, {:.1}% default positions)",
        result.rows.len(),
        result.teams.len(),
        result.failures.len(),
        result.defaulted_position_rate() * 100.0
    );
    Ok(result)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
