// Raw individual ratings: interpolated weights applied to per-100 rates,
// plus a positional constant.

use serde::Serialize;

use crate::config::{CoefficientTable, FlavorCoefficients};
use crate::rating::coefficients::{CategoryLine, PlayerCoefficients};
use crate::rating::position::TARGET_AVERAGE;
use crate::rating::rates::PlayerRates;

/// A raw rating split into its category groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RatingBreakdown {
    pub scoring: f64,
    pub ball_handling: f64,
    pub rebounding: f64,
    pub defense: f64,
    pub position_constant: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RawRating {
    pub overall: RatingBreakdown,
    pub offense: RatingBreakdown,
}

/// Below position 3 the constant scales with distance toward the guard end;
/// from 3 up it follows the offensive role instead.
pub fn positional_constant(flavor: &FlavorCoefficients, position: f64, offensive_role: f64) -> f64 {
    if position < TARGET_AVERAGE {
        (TARGET_AVERAGE - position) / 2.0 * flavor.position_constant
    } else {
        flavor.role_constant * (offensive_role - TARGET_AVERAGE)
    }
}

pub fn breakdown(
    rates: &PlayerRates,
    weights: &CategoryLine,
    flavor: &FlavorCoefficients,
    position: f64,
    offensive_role: f64,
) -> RatingBreakdown {
    // No possessions, no sample: the player carries no rating of their own.
    if rates.possessions <= 0.0 {
        return RatingBreakdown::default();
    }

    let per100 = &rates.per100;
    let scoring = per100.scoring(weights);
    let ball_handling = per100.ball_handling(weights);
    let rebounding = per100.rebounding(weights);
    let defense = per100.defense(weights);
    let position_constant = positional_constant(flavor, position, offensive_role);

    RatingBreakdown {
        scoring,
        ball_handling,
        rebounding,
        defense,
        position_constant,
        total: scoring + ball_handling + rebounding + defense + position_constant,
    }
}

pub fn raw_rating(
    rates: &PlayerRates,
    coefficients: &PlayerCoefficients,
    table: &CoefficientTable,
    position: f64,
    offensive_role: f64,
) -> RawRating {
    RawRating {
        overall: breakdown(rates, &coefficients.overall, &table.overall, position, offensive_role),
        offense: breakdown(rates, &coefficients.offense, &table.offense, position, offensive_role),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
