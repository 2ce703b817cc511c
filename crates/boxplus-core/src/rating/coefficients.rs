// Category lines and position-interpolated coefficients.
//
// A `CategoryLine` holds one number per rating category. The same shape
// carries a player's per-100 rates and the weights applied to them, so a raw
// rating is just a dot product of two lines.

use serde::{Deserialize, Serialize};

use crate::config::{CoefficientTable, FlavorCoefficients};
use crate::totals::{MAX_POSITION, MIN_POSITION};

/// One value per rating category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryLine {
    /// Points above the team's efficiency baseline.
    pub adj_pts: f64,
    pub fga: f64,
    pub fta: f64,
    /// Made threes, credited on top of the points they already produce.
    pub fg3m: f64,
    pub ast: f64,
    pub tov: f64,
    pub oreb: f64,
    pub dreb: f64,
    pub treb: f64,
    pub stl: f64,
    pub blk: f64,
    pub pf: f64,
}

impl CategoryLine {
    /// Category values in a fixed order, for validation and diagnostics.
    pub fn values(&self) -> [f64; 12] {
        [
            self.adj_pts,
            self.fga,
            self.fta,
            self.fg3m,
            self.ast,
            self.tov,
            self.oreb,
            self.dreb,
            self.treb,
            self.stl,
            self.blk,
            self.pf,
        ]
    }

    /// Scoring group: adjusted points, FGA, FTA and the three-point bonus.
    pub fn scoring(&self, weights: &CategoryLine) -> f64 {
        self.adj_pts * weights.adj_pts
            + self.fga * weights.fga
            + self.fta * weights.fta
            + self.fg3m * weights.fg3m
    }

    /// Ball-handling group: assists and turnovers.
    pub fn ball_handling(&self, weights: &CategoryLine) -> f64 {
        self.ast * weights.ast + self.tov * weights.tov
    }

    pub fn rebounding(&self, weights: &CategoryLine) -> f64 {
        self.oreb * weights.oreb + self.dreb * weights.dreb + self.treb * weights.treb
    }

    pub fn defense(&self, weights: &CategoryLine) -> f64 {
        self.stl * weights.stl + self.blk * weights.blk + self.pf * weights.pf
    }
}

/// Linear blend between the pure-guard and pure-center weight for a position.
///
/// `(5 - p) / 4 * at_guard + (p - 1) / 4 * at_center`; exact at both ends.
pub fn interpolate(at_guard: f64, at_center: f64, position: f64) -> f64 {
    let span = MAX_POSITION - MIN_POSITION;
    (MAX_POSITION - position) / span * at_guard + (position - MIN_POSITION) / span * at_center
}

/// Interpolate every category of one flavor. Usage categories (FGA, FTA)
/// follow the offensive role; everything else follows the overall position.
pub fn interpolate_line(flavor: &FlavorCoefficients, position: f64, offensive_role: f64) -> CategoryLine {
    let (g, c) = (&flavor.guard, &flavor.center);
    CategoryLine {
        adj_pts: interpolate(g.adj_pts, c.adj_pts, position),
        fga: interpolate(g.fga, c.fga, offensive_role),
        fta: interpolate(g.fta, c.fta, offensive_role),
        fg3m: interpolate(g.fg3m, c.fg3m, position),
        ast: interpolate(g.ast, c.ast, position),
        tov: interpolate(g.tov, c.tov, position),
        oreb: interpolate(g.oreb, c.oreb, position),
        dreb: interpolate(g.dreb, c.dreb, position),
        treb: interpolate(g.treb, c.treb, position),
        stl: interpolate(g.stl, c.stl, position),
        blk: interpolate(g.blk, c.blk, position),
        pf: interpolate(g.pf, c.pf, position),
    }
}

/// Per-player coefficients for both rating flavors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlayerCoefficients {
    pub overall: CategoryLine,
    pub offense: CategoryLine,
}

impl PlayerCoefficients {
    pub fn for_player(table: &CoefficientTable, position: f64, offensive_role: f64) -> Self {
        PlayerCoefficients {
            overall: interpolate_line(&table.overall, position, offensive_role),
            offense: interpolate_line(&table.offense, position, offensive_role),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
