// Team context and the uniform correction that reconciles raw player
// ratings with team efficiency.

use serde::Serialize;

use crate::config::TeamConstants;
use crate::rating::rates::{ratio, PlayerRates};
use crate::rating::raw::RawRating;
use crate::totals::TeamSeasonTotals;

/// League-wide aggregates computed once, before any team is rated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LeagueContext {
    /// Plain mean of every team's offensive rating.
    pub league_off_rating: f64,
    pub teams: usize,
}

impl LeagueContext {
    pub fn from_teams<'a, I>(teams: I) -> Self
    where
        I: IntoIterator<Item = &'a TeamSeasonTotals>,
    {
        let (sum, count) = teams
            .into_iter()
            .fold((0.0, 0usize), |(sum, n), t| (sum + t.off_rating, n + 1));
        LeagueContext {
            league_off_rating: ratio(sum, count as f64),
            teams: count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamContext {
    pub team: String,
    pub games: f64,
    pub pace: f64,
    /// Offensive rating relative to the league average.
    pub adjusted_offense: f64,
    /// Net rating per 100 possessions.
    pub adjusted_net: f64,
    /// Estimated average in-game margin: `net * pace / 100 / 2`.
    pub average_lead: f64,
    pub lead_bonus: f64,
    /// Rating the roster's contributions must add up to.
    pub team_rating: f64,
    pub team_offense_rating: f64,
    /// Sum of raw overall ratings weighted by floor share.
    pub raw_contribution: f64,
    pub raw_offense_contribution: f64,
    /// Added to every player's raw overall rating.
    pub overall_correction: f64,
    /// Added to every player's raw offensive rating.
    pub offense_correction: f64,
}

/// Build a team's context and corrections from its players' raw ratings.
/// `raw` and `rates` are in roster order.
pub fn team_context(
    team: &TeamSeasonTotals,
    league: &LeagueContext,
    raw: &[RawRating],
    rates: &[PlayerRates],
    constants: &TeamConstants,
) -> TeamContext {
    let adjusted_offense = team.off_rating - league.league_off_rating;
    let adjusted_net = team.net_rating;
    let average_lead = adjusted_net * team.pace / 100.0 / 2.0;
    let lead_bonus = constants.lead_bonus_factor / 2.0 * average_lead;

    let team_rating = adjusted_net + lead_bonus;
    let team_offense_rating = adjusted_offense + lead_bonus * constants.offense_lead_share;

    let raw_contribution: f64 = raw
        .iter()
        .zip(rates)
        .map(|(r, p)| r.overall.total * p.floor_share)
        .sum();
    let raw_offense_contribution: f64 = raw
        .iter()
        .zip(rates)
        .map(|(r, p)| r.offense.total * p.floor_share)
        .sum();

    TeamContext {
        team: team.team.clone(),
        games: team.games,
        pace: team.pace,
        adjusted_offense,
        adjusted_net,
        average_lead,
        lead_bonus,
        team_rating,
        team_offense_rating,
        raw_contribution,
        raw_offense_contribution,
        overall_correction: (team_rating - raw_contribution) / constants.roster_slots,
        offense_correction: (team_offense_rating - raw_offense_contribution) / constants.roster_slots,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
