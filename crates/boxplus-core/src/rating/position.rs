// Position estimation: a damped fixed-round correction that pulls each
// team's minutes-weighted position average onto 3.0.
//
// The round counts are part of the model. Ratings are defined relative to
// exactly these rounds, so there is no convergence-driven early exit.

use serde::Serialize;

use crate::config::{ModelConstants, PositionRegression, RoleRegression};
use crate::rating::rates::{PlayerRates, UsageShares};
use crate::totals::{PlayerSeasonTotals, MAX_POSITION, MIN_POSITION};

/// Correction rounds applied to the overall position estimate.
pub const POSITION_CORRECTION_ROUNDS: usize = 4;
/// Correction rounds applied to the offensive role estimate.
pub const ROLE_CORRECTION_ROUNDS: usize = 3;

/// League-standard position average every team is pulled onto.
pub const TARGET_AVERAGE: f64 = 3.0;
/// Largest final deviation from `TARGET_AVERAGE` not reported as a warning.
pub const CONVERGENCE_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PositionFlavor {
    Overall,
    OffensiveRole,
}

pub fn clamp_position(value: f64) -> f64 {
    value.clamp(MIN_POSITION, MAX_POSITION)
}

/// Minutes-weighted average. A team with no minutes is taken to sit on the
/// target already, so it receives no correction.
pub fn team_average(values: &[f64], minutes: &[f64]) -> f64 {
    let total: f64 = minutes.iter().sum();
    if total <= 0.0 {
        return TARGET_AVERAGE;
    }
    values.iter().zip(minutes).map(|(v, m)| v * m).sum::<f64>() / total
}

/// Blend a regression estimate with a prior: `(seed*MP + prior*W) / (MP + W)`.
pub fn blend_with_prior(seed: f64, minutes: f64, prior: f64, prior_weight: f64) -> f64 {
    (seed * minutes + prior * prior_weight) / (minutes + prior_weight)
}

pub fn position_seed(shares: &UsageShares, reg: &PositionRegression) -> f64 {
    reg.intercept
        + reg.trb * shares.trb
        + reg.stl * shares.stl
        + reg.pf * shares.pf
        + reg.ast * shares.ast
        + reg.blk * shares.blk
}

pub fn role_seed(shares: &UsageShares, reg: &RoleRegression) -> f64 {
    reg.intercept + reg.ast * shares.ast + reg.threshold_points * shares.threshold_points
}

/// Every clamped round of one flavor's estimate, seed round first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Convergence {
    pub rounds: Vec<Vec<f64>>,
    /// Minutes-weighted team average of each entry in `rounds`.
    pub averages: Vec<f64>,
}

impl Convergence {
    pub fn final_values(&self) -> &[f64] {
        self.rounds.last().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn final_average(&self) -> f64 {
        self.averages.last().copied().unwrap_or(TARGET_AVERAGE)
    }

    /// Absolute distance of the final team average from the target.
    pub fn deviation(&self) -> f64 {
        (self.final_average() - TARGET_AVERAGE).abs()
    }
}

/// Run `corrections` rounds. Each round shifts every player's running
/// (unclamped) estimate by the current clamped team average's distance from
/// the target, then re-clamps.
pub fn converge(mut running: Vec<f64>, minutes: &[f64], corrections: usize) -> Convergence {
    let mut current: Vec<f64> = running.iter().copied().map(clamp_position).collect();
    let mut rounds = Vec::with_capacity(corrections + 1);
    let mut averages = Vec::with_capacity(corrections + 1);

    for _ in 0..corrections {
        let avg = team_average(&current, minutes);
        let shift = avg - TARGET_AVERAGE;
        rounds.push(current);
        averages.push(avg);

        for r in running.iter_mut() {
            *r -= shift;
        }
        current = running.iter().copied().map(clamp_position).collect();
    }

    averages.push(team_average(&current, minutes));
    rounds.push(current);

    Convergence { rounds, averages }
}

/// Both position estimates for one roster, in roster order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionEstimates {
    pub position: Convergence,
    pub offensive_role: Convergence,
}

impl PositionEstimates {
    pub fn position(&self, index: usize) -> f64 {
        self.position.final_values()[index]
    }

    pub fn offensive_role(&self, index: usize) -> f64 {
        self.offensive_role.final_values()[index]
    }
}

pub fn estimate_positions(
    roster: &[PlayerSeasonTotals],
    rates: &[PlayerRates],
    constants: &ModelConstants,
) -> PositionEstimates {
    let minutes: Vec<f64> = roster.iter().map(|p| p.minutes).collect();
    let pos = &constants.position;
    let role = &constants.offensive_role;

    let position_start: Vec<f64> = roster
        .iter()
        .zip(rates)
        .map(|(p, r)| {
            let seed = position_seed(&r.shares, pos);
            blend_with_prior(seed, p.minutes, p.nominal_position, pos.prior_weight)
        })
        .collect();

    let role_start: Vec<f64> = roster
        .iter()
        .zip(rates)
        .map(|(p, r)| {
            let seed = role_seed(&r.shares, role);
            blend_with_prior(seed, p.minutes, role.default_role, role.prior_weight)
        })
        .collect();

    PositionEstimates {
        position: converge(position_start, &minutes, POSITION_CORRECTION_ROUNDS),
        offensive_role: converge(role_start, &minutes, ROLE_CORRECTION_ROUNDS),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
