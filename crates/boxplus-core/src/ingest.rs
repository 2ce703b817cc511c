// Season data loading from CSV: one file of player season rows and one of
// team season rows, held in memory as a `TotalsProvider`.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::league::TotalsProvider;
use crate::totals::{PlayerSeasonRecord, RejectedRow, TeamSeasonTotals};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

// ---------------------------------------------------------------------------
// Season data
// ---------------------------------------------------------------------------

/// Rows read from one CSV file, plus the rows that could not be read.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub rows: Vec<T>,
    pub rejected: Vec<RejectedRow>,
}

/// All season totals for one league, indexed by team code.
#[derive(Debug, Clone, Default)]
pub struct SeasonData {
    teams: BTreeMap<String, TeamSeasonTotals>,
    rosters: HashMap<String, Vec<PlayerSeasonRecord>>,
    rejected: Vec<RejectedRow>,
}

impl SeasonData {
    pub fn new(teams: Vec<TeamSeasonTotals>, players: Vec<PlayerSeasonRecord>) -> Self {
        let mut data = SeasonData::default();
        for team in teams {
            if data.teams.contains_key(&team.team) {
                warn!("duplicate totals for team '{}', using latest row", team.team);
            }
            data.teams.insert(team.team.clone(), team);
        }
        for player in players {
            data.rosters.entry(player.team.clone()).or_default().push(player);
        }
        data
    }

    /// Attach rows that ingestion rejected, so the league run can fail the
    /// teams they belong to.
    pub fn with_rejected(mut self, rows: Vec<RejectedRow>) -> Self {
        self.rejected.extend(rows);
        self
    }

    /// Every team code seen in team rows, player rows or rejected rows,
    /// sorted. Codes without usable totals fail when rated.
    pub fn team_codes(&self) -> Vec<String> {
        let codes: BTreeSet<&String> = self
            .teams
            .keys()
            .chain(self.rosters.keys())
            .chain(self.rejected.iter().filter_map(|r| r.team.as_ref()))
            .collect();
        codes.into_iter().cloned().collect()
    }

    /// Team codes that appear only in player rows.
    pub fn teams_without_totals(&self) -> Vec<String> {
        let mut codes: Vec<String> = self
            .rosters
            .keys()
            .filter(|code| !self.teams.contains_key(*code))
            .cloned()
            .collect();
        codes.sort();
        codes
    }

    pub fn player_count(&self) -> usize {
        self.rosters.values().map(Vec::len).sum()
    }

    pub fn rejected(&self) -> &[RejectedRow] {
        &self.rejected
    }
}

impl TotalsProvider for SeasonData {
    fn team_totals(&self, team: &str) -> Option<TeamSeasonTotals> {
        self.teams.get(team).cloned()
    }

    fn roster(&self, team: &str) -> Vec<PlayerSeasonRecord> {
        self.rosters.get(team).cloned().unwrap_or_default()
    }

    fn rejected_rows(&self) -> Vec<RejectedRow> {
        self.rejected.clone()
    }
}

// ---------------------------------------------------------------------------
// Reader-based loaders (private, enable testing without temp files)
// ---------------------------------------------------------------------------

const TEAM_HEADERS: &[&str] = &["team", "TEAM"];
const PLAYER_HEADERS: &[&str] = &["player_id", "PLAYER"];

/// Trimmed, non-empty value of the first column named in `names`.
fn column(headers: &StringRecord, record: &StringRecord, names: &[&str]) -> Option<String> {
    headers
        .iter()
        .position(|h| names.contains(&h.trim()))
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn reject(
    headers: &StringRecord,
    record: &StringRecord,
    kind: &str,
    reason: String,
) -> RejectedRow {
    let row = RejectedRow {
        team: column(headers, record, TEAM_HEADERS).map(|t| t.to_uppercase()),
        player: column(headers, record, PLAYER_HEADERS),
        line: record.position().map(|p| p.line()),
        reason,
    };
    warn!(
        "skipping malformed {kind} row (line {}): {}",
        row.line.unwrap_or(0),
        row.reason
    );
    row
}

/// Deserialize every row, keeping the ones that fail as `RejectedRow`s.
/// Rows of the wrong width are rejected rather than read shifted.
fn read_rows<R: Read, T: DeserializeOwned>(rdr: R, kind: &str) -> Result<Loaded<T>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(rdr);
    let headers = reader.headers()?.clone();
    let mut loaded = Loaded {
        rows: Vec::new(),
        rejected: Vec::new(),
    };

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(e),
            Err(e) => {
                warn!("skipping unreadable {kind} row: {}", e);
                loaded.rejected.push(RejectedRow {
                    team: None,
                    player: None,
                    line: e.position().map(|p| p.line()),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if record.len() != headers.len() {
            let reason = format!("expected {} fields, found {}", headers.len(), record.len());
            loaded.rejected.push(reject(&headers, &record, kind, reason));
            continue;
        }
        match record.deserialize::<T>(Some(&headers)) {
            Ok(row) => loaded.rows.push(row),
            Err(e) => loaded.rejected.push(reject(&headers, &record, kind, e.to_string())),
        }
    }
    Ok(loaded)
}

fn load_players_from_reader<R: Read>(rdr: R) -> Result<Loaded<PlayerSeasonRecord>, csv::Error> {
    let raw = read_rows::<R, PlayerSeasonRecord>(rdr, "player")?;
    let mut loaded = Loaded {
        rows: Vec::with_capacity(raw.rows.len()),
        rejected: raw.rejected,
    };
    for mut player in raw.rows {
        player.player_id = player.player_id.trim().to_string();
        player.team = player.team.trim().to_uppercase();
        if player.player_id.is_empty() || player.team.is_empty() {
            warn!("skipping player row without id or team");
            loaded.rejected.push(RejectedRow {
                team: Some(player.team.clone()).filter(|t| !t.is_empty()),
                player: Some(player.player_id.clone()).filter(|p| !p.is_empty()),
                line: None,
                reason: "missing player id or team".into(),
            });
            continue;
        }
        loaded.rows.push(player);
    }
    Ok(loaded)
}

fn load_teams_from_reader<R: Read>(rdr: R) -> Result<Loaded<TeamSeasonTotals>, csv::Error> {
    let raw = read_rows::<R, TeamSeasonTotals>(rdr, "team")?;
    let mut loaded = Loaded {
        rows: Vec::with_capacity(raw.rows.len()),
        rejected: raw.rejected,
    };
    for mut team in raw.rows {
        team.team = team.team.trim().to_uppercase();
        if team.team.is_empty() {
            warn!("skipping team row without a team code");
            loaded.rejected.push(RejectedRow {
                team: None,
                player: None,
                line: None,
                reason: "missing team code".into(),
            });
            continue;
        }
        loaded.rows.push(team);
    }
    Ok(loaded)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

fn open(path: &Path) -> Result<std::fs::File, IngestError> {
    std::fs::File::open(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

pub fn load_players(path: &Path) -> Result<Loaded<PlayerSeasonRecord>, IngestError> {
    load_players_from_reader(open(path)?).map_err(|e| IngestError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

pub fn load_teams(path: &Path) -> Result<Loaded<TeamSeasonTotals>, IngestError> {
    load_teams_from_reader(open(path)?).map_err(|e| IngestError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load both files into one `SeasonData`, carrying every rejected row.
pub fn load_season(players: &Path, teams: &Path) -> Result<SeasonData, IngestError> {
    let teams = load_teams(teams)?;
    let players = load_players(players)?;
    let mut rejected = teams.rejected;
    rejected.extend(players.rejected);
    Ok(SeasonData::new(teams.rows, players.rows).with_rejected(rejected))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
