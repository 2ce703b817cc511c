// Final ratings and the metrics derived from them: contribution, value over
// replacement, and the minutes-regressed rating.

use serde::Serialize;

use crate::config::ReplacementConstants;
use crate::rating::raw::RawRating;
use crate::rating::team::TeamContext;

/// Overall, offensive and defensive values of one rating. Defense is always
/// the residual `overall - offense`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RatingSplit {
    pub overall: f64,
    pub offense: f64,
    pub defense: f64,
}

impl RatingSplit {
    pub fn from_overall_and_offense(overall: f64, offense: f64) -> Self {
        RatingSplit {
            overall,
            offense,
            defense: overall - offense,
        }
    }
}

pub fn final_ratings(raw: &RawRating, team: &TeamContext) -> RatingSplit {
    RatingSplit::from_overall_and_offense(
        raw.overall.total + team.overall_correction,
        raw.offense.total + team.offense_correction,
    )
}

/// Rating weighted by floor share; a team's contributions sum to its rating.
pub fn contribution(rating: f64, floor_share: f64) -> f64 {
    rating * floor_share
}

/// `(rating - replacement) * floor_share * team_games / season_games`.
pub fn value_over_replacement(
    rating: f64,
    floor_share: f64,
    team_games: f64,
    c: &ReplacementConstants,
) -> f64 {
    (rating - c.replacement_level) * floor_share * team_games / c.season_games
}

/// Rating expected from playing time alone, from padded minutes per game.
pub fn expected_rating(minutes: f64, games: f64, c: &ReplacementConstants) -> f64 {
    let padded_games = games + c.game_padding;
    let mpg = if padded_games > 0.0 { minutes / padded_games } else { 0.0 };
    c.expectation_intercept + c.expectation_slope * mpg
}

/// Extra pseudo-minutes of the expectation blended into a rating.
pub fn pseudo_minutes(minutes: f64, c: &ReplacementConstants) -> f64 {
    ((c.regression_minutes - minutes) / c.pseudo_minute_divisor).max(0.0)
}

/// Blend `rating` toward `expectation`. Players past the regression minutes
/// keep their rating; players without minutes get the expectation.
pub fn regress(rating: f64, expectation: f64, minutes: f64, c: &ReplacementConstants) -> f64 {
    let extra = pseudo_minutes(minutes, c);
    if extra == 0.0 {
        return rating;
    }
    if minutes <= 0.0 {
        return expectation;
    }
    (rating * minutes + expectation * extra) / (minutes + extra)
}

pub fn regressed_ratings(
    finals: &RatingSplit,
    minutes: f64,
    games: f64,
    c: &ReplacementConstants,
) -> RatingSplit {
    let expectation = expected_rating(minutes, games, c);
    RatingSplit::from_overall_and_offense(
        regress(finals.overall, expectation, minutes, c),
        regress(finals.offense, expectation, minutes, c),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
