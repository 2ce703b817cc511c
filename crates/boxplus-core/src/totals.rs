// Season box-score totals: the ingestion-facing records and their validated
// counterparts consumed by the rating pipeline.

use serde::{Deserialize, Serialize};

use crate::error::RatingError;

/// Nominal position used when the external position lookup has no entry.
pub const DEFAULT_NOMINAL_POSITION: f64 = 3.0;

/// Bounds of the continuous position axis (1 = point guard, 5 = center).
pub const MIN_POSITION: f64 = 1.0;
pub const MAX_POSITION: f64 = 5.0;

// ---------------------------------------------------------------------------
// Team totals
// ---------------------------------------------------------------------------

/// Season totals for one team, aggregated (counting stats) or averaged
/// (pace and ratings) across its games.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSeasonTotals {
    #[serde(alias = "TEAM")]
    pub team: String,
    #[serde(alias = "G", alias = "GP")]
    pub games: f64,
    #[serde(alias = "MIN", alias = "MP")]
    pub minutes: f64,
    #[serde(alias = "PTS")]
    pub points: f64,
    #[serde(alias = "FGM")]
    pub fgm: f64,
    #[serde(alias = "FGA")]
    pub fga: f64,
    #[serde(alias = "FG3M")]
    pub fg3m: f64,
    #[serde(alias = "FG3A")]
    pub fg3a: f64,
    #[serde(alias = "FTM")]
    pub ftm: f64,
    #[serde(alias = "FTA")]
    pub fta: f64,
    #[serde(alias = "OREB")]
    pub oreb: f64,
    #[serde(alias = "DREB")]
    pub dreb: f64,
    #[serde(alias = "REB")]
    pub treb: f64,
    #[serde(alias = "AST")]
    pub ast: f64,
    #[serde(alias = "STL")]
    pub stl: f64,
    #[serde(alias = "BLK")]
    pub blk: f64,
    #[serde(alias = "TOV")]
    pub tov: f64,
    #[serde(alias = "PF")]
    pub pf: f64,
    /// Possessions per 48 minutes.
    #[serde(alias = "PACE")]
    pub pace: f64,
    #[serde(alias = "OFF_RATING")]
    pub off_rating: f64,
    #[serde(alias = "DEF_RATING")]
    pub def_rating: f64,
    #[serde(alias = "NET_RATING")]
    pub net_rating: f64,
}

impl TeamSeasonTotals {
    /// True shooting attempts: `FGA + ft_weight * FTA`.
    pub fn true_shooting_attempts(&self, ft_weight: f64) -> f64 {
        self.fga + ft_weight * self.fta
    }

    /// Reject totals the pipeline cannot rate against: any non-finite
    /// value, negative counting stats, or makes above attempts. Ratings may
    /// be negative.
    pub fn validate(&self) -> Result<(), RatingError> {
        let counting = [
            ("games", self.games),
            ("minutes", self.minutes),
            ("points", self.points),
            ("fgm", self.fgm),
            ("fga", self.fga),
            ("fg3m", self.fg3m),
            ("fg3a", self.fg3a),
            ("ftm", self.ftm),
            ("fta", self.fta),
            ("oreb", self.oreb),
            ("dreb", self.dreb),
            ("treb", self.treb),
            ("ast", self.ast),
            ("stl", self.stl),
            ("blk", self.blk),
            ("tov", self.tov),
            ("pf", self.pf),
            ("pace", self.pace),
        ];
        let ratings = [
            ("off_rating", self.off_rating),
            ("def_rating", self.def_rating),
            ("net_rating", self.net_rating),
        ];

        for (field, v) in counting.iter().chain(ratings.iter()) {
            if !v.is_finite() {
                return Err(self.invalid(format!("`{field}` is not finite ({v})")));
            }
        }
        for (field, v) in counting {
            if v < 0.0 {
                return Err(self.invalid(format!("`{field}` is negative ({v})")));
            }
        }
        for (label, makes, attempts) in [
            ("FG", self.fgm, self.fga),
            ("3P", self.fg3m, self.fg3a),
            ("FT", self.ftm, self.fta),
        ] {
            if makes > attempts {
                return Err(self.invalid(format!(
                    "{label} makes ({makes}) exceed attempts ({attempts})"
                )));
            }
        }
        Ok(())
    }

    fn invalid(&self, message: String) -> RatingError {
        RatingError::InvalidTeam {
            team: self.team.clone(),
            message,
        }
    }
}

/// An input row ingestion could not turn into a record. `team` and
/// `player` are filled in when the row still names them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRow {
    pub team: Option<String>,
    pub player: Option<String>,
    pub line: Option<u64>,
    pub reason: String,
}

// ---------------------------------------------------------------------------
// Player records
// ---------------------------------------------------------------------------

/// One player's season totals for one team stint, as delivered by ingestion.
///
/// Every statistic is optional here; `validate` decides which ones the
/// pipeline cannot do without.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerSeasonRecord {
    #[serde(alias = "PLAYER")]
    pub player_id: String,
    #[serde(alias = "TEAM")]
    pub team: String,
    #[serde(default, alias = "G", alias = "GP")]
    pub games: Option<f64>,
    #[serde(default, alias = "MIN", alias = "MP")]
    pub minutes: Option<f64>,
    #[serde(default, alias = "PTS")]
    pub points: Option<f64>,
    #[serde(default, alias = "FGM")]
    pub fgm: Option<f64>,
    #[serde(default, alias = "FGA")]
    pub fga: Option<f64>,
    #[serde(default, alias = "FG3M")]
    pub fg3m: Option<f64>,
    #[serde(default, alias = "FG3A")]
    pub fg3a: Option<f64>,
    #[serde(default, alias = "FTM")]
    pub ftm: Option<f64>,
    #[serde(default, alias = "FTA")]
    pub fta: Option<f64>,
    #[serde(default, alias = "OREB")]
    pub oreb: Option<f64>,
    #[serde(default, alias = "DREB")]
    pub dreb: Option<f64>,
    #[serde(default, alias = "REB")]
    pub treb: Option<f64>,
    #[serde(default, alias = "AST")]
    pub ast: Option<f64>,
    #[serde(default, alias = "STL")]
    pub stl: Option<f64>,
    #[serde(default, alias = "BLK")]
    pub blk: Option<f64>,
    #[serde(default, alias = "TOV")]
    pub tov: Option<f64>,
    #[serde(default, alias = "PF")]
    pub pf: Option<f64>,
    #[serde(default, alias = "PLUS_MINUS")]
    pub plus_minus: Option<f64>,
    /// Time-share-derived position label mapped onto 1..5, if resolved.
    #[serde(default, alias = "POS")]
    pub nominal_position: Option<f64>,
}

/// Validated player totals. All counting stats are present and finite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSeasonTotals {
    pub player_id: String,
    pub team: String,
    pub games: f64,
    pub minutes: f64,
    pub points: f64,
    pub fgm: f64,
    pub fga: f64,
    pub fg3m: f64,
    pub fg3a: f64,
    pub ftm: f64,
    pub fta: f64,
    pub oreb: f64,
    pub dreb: f64,
    pub treb: f64,
    pub ast: f64,
    pub stl: f64,
    pub blk: f64,
    pub tov: f64,
    pub pf: f64,
    pub plus_minus: Option<f64>,
    pub nominal_position: f64,
    /// Set when `nominal_position` fell back to `DEFAULT_NOMINAL_POSITION`.
    pub position_defaulted: bool,
}

impl PlayerSeasonTotals {
    pub fn true_shooting_attempts(&self, ft_weight: f64) -> f64 {
        self.fga + ft_weight * self.fta
    }
}

impl PlayerSeasonRecord {
    /// Check required fields and basic invariants, producing the totals the
    /// pipeline works on.
    pub fn validate(&self) -> Result<PlayerSeasonTotals, RatingError> {
        let require = |value: Option<f64>, field: &'static str| -> Result<f64, RatingError> {
            let v = value.ok_or_else(|| RatingError::MissingInput {
                team: self.team.clone(),
                player: self.player_id.clone(),
                field,
            })?;
            if !v.is_finite() {
                return Err(self.invalid(format!("`{field}` is not finite")));
            }
            Ok(v)
        };

        let games = require(self.games, "games")?;
        let minutes = require(self.minutes, "minutes")?;
        let points = require(self.points, "points")?;
        let fgm = require(self.fgm, "fgm")?;
        let fga = require(self.fga, "fga")?;
        let fg3m = require(self.fg3m, "fg3m")?;
        let fg3a = require(self.fg3a, "fg3a")?;
        let ftm = require(self.ftm, "ftm")?;
        let fta = require(self.fta, "fta")?;
        let oreb = require(self.oreb, "oreb")?;
        let dreb = require(self.dreb, "dreb")?;
        let ast = require(self.ast, "ast")?;
        let stl = require(self.stl, "stl")?;
        let blk = require(self.blk, "blk")?;
        let tov = require(self.tov, "tov")?;
        let pf = require(self.pf, "pf")?;
        let treb = match self.treb {
            Some(_) => require(self.treb, "treb")?,
            None => oreb + dreb,
        };

        if minutes < 0.0 {
            return Err(self.invalid(format!("negative minutes ({minutes})")));
        }
        for (label, makes, attempts) in [("FG", fgm, fga), ("3P", fg3m, fg3a), ("FT", ftm, fta)] {
            if makes > attempts {
                return Err(self.invalid(format!(
                    "{label} makes ({makes}) exceed attempts ({attempts})"
                )));
            }
        }

        let (nominal_position, position_defaulted) = match self.nominal_position {
            Some(p) if p.is_finite() && (MIN_POSITION..=MAX_POSITION).contains(&p) => (p, false),
            Some(p) => {
                return Err(self.invalid(format!("nominal position {p} outside 1..5")));
            }
            None => (DEFAULT_NOMINAL_POSITION, true),
        };

        Ok(PlayerSeasonTotals {
            player_id: self.player_id.clone(),
            team: self.team.clone(),
            games,
            minutes,
            points,
            fgm,
            fga,
            fg3m,
            fg3a,
            ftm,
            fta,
            oreb,
            dreb,
            treb,
            ast,
            stl,
            blk,
            tov,
            pf,
            plus_minus: self.plus_minus,
            nominal_position,
            position_defaulted,
        })
    }

    fn invalid(&self, message: String) -> RatingError {
        RatingError::InvalidInput {
            team: self.team.clone(),
            player: self.player_id.clone(),
            message,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn full_record() -> PlayerSeasonRecord {
        PlayerSeasonRecord {
            player_id: "p1".into(),
            team: "AAA".into(),
            games: Some(70.0),
            minutes: Some(2100.0),
            points: Some(1200.0),
            fgm: Some(450.0),
            fga: Some(950.0),
            fg3m: Some(120.0),
            fg3a: Some(330.0),
            ftm: Some(180.0),
            fta: Some(220.0),
            oreb: Some(60.0),
            dreb: Some(250.0),
            treb: Some(310.0),
            ast: Some(300.0),
            stl: Some(80.0),
            blk: Some(20.0),
            tov: Some(140.0),
            pf: Some(150.0),
            plus_minus: Some(45.0),
            nominal_position: Some(1.5),
        }
    }

    #[test]
    fn complete_record_validates() {
        let totals = full_record().validate().unwrap();
        assert_eq!(totals.player_id, "p1");
        assert_eq!(totals.minutes, 2100.0);
        assert_eq!(totals.nominal_position, 1.5);
        assert!(!totals.position_defaulted);
    }

    #[test]
    fn missing_required_field_is_reported_by_name() {
        let mut record = full_record();
        record.stl = None;
        match record.validate().unwrap_err() {
            RatingError::MissingInput { field, player, team } => {
                assert_eq!(field, "stl");
                assert_eq!(player, "p1");
                assert_eq!(team, "AAA");
            }
            other => panic!("expected MissingInput, got {other:?}"),
        }
    }

    #[test]
    fn missing_total_rebounds_are_derived() {
        let mut record = full_record();
        record.treb = None;
        let totals = record.validate().unwrap();
        assert_eq!(totals.treb, 310.0);
    }

    #[test]
    fn missing_position_defaults_to_three_and_is_flagged() {
        let mut record = full_record();
        record.nominal_position = None;
        let totals = record.validate().unwrap();
        assert_eq!(totals.nominal_position, DEFAULT_NOMINAL_POSITION);
        assert!(totals.position_defaulted);
    }

    #[test]
    fn plus_minus_is_optional() {
        let mut record = full_record();
        record.plus_minus = None;
        assert!(record.validate().is_ok());
    }

    #[test]
    fn makes_above_attempts_rejected() {
        let mut record = full_record();
        record.ftm = Some(300.0);
        assert!(matches!(record.validate(), Err(RatingError::InvalidInput { .. })));
    }

    #[test]
    fn negative_minutes_rejected() {
        let mut record = full_record();
        record.minutes = Some(-1.0);
        assert!(matches!(record.validate(), Err(RatingError::InvalidInput { .. })));
    }

    #[test]
    fn non_finite_value_rejected() {
        let mut record = full_record();
        record.points = Some(f64::NAN);
        assert!(matches!(record.validate(), Err(RatingError::InvalidInput { .. })));
    }

    #[test]
    fn out_of_range_position_rejected() {
        let mut record = full_record();
        record.nominal_position = Some(6.0);
        assert!(matches!(record.validate(), Err(RatingError::InvalidInput { .. })));
    }

    fn valid_team() -> TeamSeasonTotals {
        TeamSeasonTotals {
            team: "AAA".into(),
            games: 82.0,
            minutes: 19680.0,
            points: 9000.0,
            fgm: 3300.0,
            fga: 7000.0,
            fg3m: 900.0,
            fg3a: 2500.0,
            ftm: 1400.0,
            fta: 1800.0,
            oreb: 850.0,
            dreb: 2800.0,
            treb: 3650.0,
            ast: 2000.0,
            stl: 650.0,
            blk: 400.0,
            tov: 1150.0,
            pf: 1600.0,
            pace: 100.0,
            off_rating: 106.0,
            def_rating: 111.0,
            net_rating: -5.0,
        }
    }

    #[test]
    fn team_with_negative_net_rating_validates() {
        assert!(valid_team().validate().is_ok());
    }

    #[test]
    fn team_with_nan_rating_rejected() {
        let mut team = valid_team();
        team.off_rating = f64::NAN;
        match team.validate().unwrap_err() {
            RatingError::InvalidTeam { team, message } => {
                assert_eq!(team, "AAA");
                assert!(message.contains("off_rating"));
            }
            other => panic!("expected InvalidTeam, got {other:?}"),
        }
    }

    #[test]
    fn team_with_infinite_pace_rejected() {
        let mut team = valid_team();
        team.pace = f64::INFINITY;
        assert!(matches!(team.validate(), Err(RatingError::InvalidTeam { .. })));
    }

    #[test]
    fn team_with_negative_minutes_rejected() {
        let mut team = valid_team();
        team.minutes = -10.0;
        assert!(matches!(team.validate(), Err(RatingError::InvalidTeam { .. })));
    }

    #[test]
    fn team_makes_above_attempts_rejected() {
        let mut team = valid_team();
        team.fg3m = 2600.0;
        assert!(matches!(team.validate(), Err(RatingError::InvalidTeam { .. })));
    }

    #[test]
    fn true_shooting_attempts_weights_free_throws() {
        let totals = full_record().validate().unwrap();
        assert!((totals.true_shooting_attempts(0.44) - (950.0 + 0.44 * 220.0)).abs() < 1e-9);
    }
}
