// Output of the league table: a flat per-player row written as CSV or as
// part of a JSON document, plus a plain-text failure summary.

use std::io::Write;

use serde::Serialize;

use crate::league::{LeagueResult, TeamFailure, TeamSummary};
use crate::rating::team::LeagueContext;
use crate::rating::{ConvergenceWarning, PlayerRating};
use crate::totals::RejectedRow;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON write failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// One output row per player. Column order follows field order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingRow {
    pub rank: usize,
    pub player_id: String,
    pub team: String,
    pub games: f64,
    pub minutes: f64,
    pub nominal_position: f64,
    pub position_defaulted: bool,
    pub position: f64,
    pub offensive_role: f64,
    pub floor_share: f64,
    pub raw_overall: f64,
    pub raw_offense: f64,
    pub rating: f64,
    pub offense: f64,
    pub defense: f64,
    pub contribution: f64,
    pub vorp: f64,
    pub regressed: f64,
    pub regressed_offense: f64,
    pub regressed_defense: f64,
}

impl RatingRow {
    pub fn from_rating(rank: usize, p: &PlayerRating) -> Self {
        RatingRow {
            rank,
            player_id: p.player_id.clone(),
            team: p.team.clone(),
            games: p.games,
            minutes: p.minutes,
            nominal_position: p.nominal_position,
            position_defaulted: p.position_defaulted,
            position: p.position,
            offensive_role: p.offensive_role,
            floor_share: p.rates.floor_share,
            raw_overall: p.raw.overall.total,
            raw_offense: p.raw.offense.total,
            rating: p.rating.overall,
            offense: p.rating.offense,
            defense: p.rating.defense,
            contribution: p.contribution,
            vorp: p.vorp,
            regressed: p.regressed.overall,
            regressed_offense: p.regressed.offense,
            regressed_defense: p.regressed.defense,
        }
    }
}

/// Rows of `result` in table order, dropping players under `min_minutes`.
/// Ranks are assigned after filtering.
pub fn select_rows(result: &LeagueResult, min_minutes: f64) -> Vec<RatingRow> {
    result
        .rows
        .iter()
        .filter(|p| p.minutes >= min_minutes)
        .enumerate()
        .map(|(i, p)| RatingRow::from_rating(i + 1, p))
        .collect()
}

pub fn write_csv<W: Write>(rows: &[RatingRow], writer: W) -> Result<(), ReportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    league: &'a LeagueContext,
    teams: &'a [TeamSummary],
    players: &'a [RatingRow],
    failures: &'a [TeamFailure],
    warnings: &'a [ConvergenceWarning],
    rejected_rows: &'a [RejectedRow],
}

pub fn write_json<W: Write>(result: &LeagueResult, rows: &[RatingRow], mut writer: W) -> Result<(), ReportError> {
    let report = JsonReport {
        league: &result.league,
        teams: &result.teams,
        players: rows,
        failures: &result.failures,
        warnings: &result.warnings,
        rejected_rows: &result.rejected_rows,
    };
    serde_json::to_writer_pretty(&mut writer, &report)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Human-readable lines for failed teams, input rows that named no team,
/// and convergence warnings. Empty when the run was clean.
pub fn failure_summary(result: &LeagueResult) -> Vec<String> {
    let mut lines = Vec::new();
    if !result.failures.is_empty() {
        lines.push(format!("{} team(s) failed:", result.failures.len()));
        for f in &result.failures {
            lines.push(format!("  {}: {}", f.team, f.error));
        }
    }
    let unattributed = result.unattributed_rows();
    if !unattributed.is_empty() {
        lines.push(format!("{} input row(s) could not be read or attributed:", unattributed.len()));
        for row in unattributed {
            let line = row.line.map(|l| l.to_string()).unwrap_or_else(|| "?".into());
            lines.push(format!("  line {line}: {}", row.reason));
        }
    }
    for w in &result.warnings {
        lines.push(format!(
            "warning: {} {:?} position average {:.6} after correction",
            w.team, w.flavor, w.average
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::league::{compute_league, LeagueOptions, TotalsProvider};
    use crate::rating::fixtures::{make_team, starting_five};
    use crate::totals::{PlayerSeasonRecord, TeamSeasonTotals};

    struct OneTeam(TeamSeasonTotals, Vec<RejectedRow>);

    impl TotalsProvider for OneTeam {
        fn team_totals(&self, team: &str) -> Option<TeamSeasonTotals> {
            (team == self.0.team).then(|| self.0.clone())
        }

        fn roster(&self, team: &str) -> Vec<PlayerSeasonRecord> {
            if team == self.0.team {
                starting_five(team)
            } else {
                Vec::new()
            }
        }

        fn rejected_rows(&self) -> Vec<RejectedRow> {
            self.1.clone()
        }
    }

    fn league() -> LeagueResult {
        league_with_rejected(Vec::new())
    }

    fn league_with_rejected(rejected: Vec<RejectedRow>) -> LeagueResult {
        let config = ModelConfig::default();
        let provider = OneTeam(make_team("AAA", 100.0, 112.0, 107.0), rejected);
        compute_league(
            &["AAA".to_string(), "ZZZ".to_string()],
            &provider,
            &config.coefficients,
            &config.constants,
            LeagueOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn csv_has_header_and_one_line_per_player() {
        let result = league();
        let rows = select_rows(&result, 0.0);
        let mut out = Vec::new();
        write_csv(&rows, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("rank,player_id,team,games,minutes"));
        assert!(lines[1].starts_with("1,"));
    }

    #[test]
    fn min_minutes_filters_rows_and_reranks() {
        let result = league();
        let all = select_rows(&result, 0.0);
        assert_eq!(all.len(), 5);
        let none = select_rows(&result, f64::MAX);
        assert!(none.is_empty());
        assert!(all.iter().enumerate().all(|(i, r)| r.rank == i + 1));
    }

    #[test]
    fn json_report_contains_players_and_failures() {
        let result = league();
        let rows = select_rows(&result, 0.0);
        let mut out = Vec::new();
        write_json(&result, &rows, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["players"].as_array().unwrap().len(), 5);
        assert_eq!(value["failures"][0]["team"], "ZZZ");
        assert_eq!(value["league"]["teams"], 1);
    }

    #[test]
    fn summary_lists_failed_teams() {
        let result = league();
        let lines = failure_summary(&result);
        assert_eq!(lines[0], "1 team(s) failed:");
        assert!(lines[1].starts_with("  ZZZ: no season totals"));
        assert!(!lines.iter().any(|l| l.contains("input row")));
    }

    #[test]
    fn unattributed_rows_are_summarized_and_serialized() {
        let result = league_with_rejected(vec![RejectedRow {
            team: None,
            player: None,
            line: Some(12),
            reason: "invalid UTF-8".into(),
        }]);
        let lines = failure_summary(&result);
        assert!(lines.contains(&"  line 12: invalid UTF-8".to_string()));

        let mut out = Vec::new();
        write_json(&result, &select_rows(&result, 0.0), &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["rejected_rows"][0]["line"], 12);
    }
}
