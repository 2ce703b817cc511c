// Synthetic box-score builders shared by the pipeline unit tests.

use crate::totals::{PlayerSeasonRecord, PlayerSeasonTotals, TeamSeasonTotals};

pub const TEAM_GAMES: f64 = 82.0;
pub const TEAM_MINUTES: f64 = TEAM_GAMES * 240.0;

/// A league-typical team season. `net_rating` is `off_rating - def_rating`.
pub fn make_team(code: &str, pace: f64, off_rating: f64, def_rating: f64) -> TeamSeasonTotals {
    TeamSeasonTotals {
        team: code.into(),
        games: TEAM_GAMES,
        minutes: TEAM_MINUTES,
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
        pace,
        off_rating,
        def_rating,
        net_rating: off_rating - def_rating,
    }
}

/// A player producing the team's per-minute averages over `minutes`.
pub fn make_player(id: &str, team: &str, minutes: f64, nominal_position: f64) -> PlayerSeasonTotals {
    let t = make_team(team, 100.0, 110.0, 110.0);
    let f = minutes / TEAM_MINUTES;
    PlayerSeasonTotals {
        player_id: id.into(),
        team: team.into(),
        games: if minutes > 0.0 { 60.0 } else { 0.0 },
        minutes,
        points: t.points * f,
        fgm: t.fgm * f,
        fga: t.fga * f,
        fg3m: t.fg3m * f,
        fg3a: t.fg3a * f,
        ftm: t.ftm * f,
        fta: t.fta * f,
        oreb: t.oreb * f,
        dreb: t.dreb * f,
        treb: t.treb * f,
        ast: t.ast * f,
        stl: t.stl * f,
        blk: t.blk * f,
        tov: t.tov * f,
        pf: t.pf * f,
        plus_minus: None,
        nominal_position,
        position_defaulted: false,
    }
}

/// Ingestion-shaped counterpart of `make_player`.
pub fn make_record(id: &str, team: &str, minutes: f64, nominal_position: Option<f64>) -> PlayerSeasonRecord {
    let p = make_player(id, team, minutes, nominal_position.unwrap_or(3.0));
    PlayerSeasonRecord {
        player_id: p.player_id,
        team: p.team,
        games: Some(p.games),
        minutes: Some(p.minutes),
        points: Some(p.points),
        fgm: Some(p.fgm),
        fga: Some(p.fga),
        fg3m: Some(p.fg3m),
        fg3a: Some(p.fg3a),
        ftm: Some(p.ftm),
        fta: Some(p.fta),
        oreb: Some(p.oreb),
        dreb: Some(p.dreb),
        treb: Some(p.treb),
        ast: Some(p.ast),
        stl: Some(p.stl),
        blk: Some(p.blk),
        tov: Some(p.tov),
        pf: Some(p.pf),
        plus_minus: None,
        nominal_position,
    }
}

/// Five players splitting the team's minutes evenly, guard to center.
pub fn starting_five(team: &str) -> Vec<PlayerSeasonRecord> {
    (1..=5)
        .map(|i| make_record(&format!("{team}-{i}"), team, TEAM_MINUTES / 5.0, Some(i as f64)))
        .collect()
}
