// Error types for the rating pipeline.
//
// Only hard failures live here. Degenerate ratios resolve to 0 inside the
// pipeline and convergence deviations are reported as warnings on the team
// result, so neither shows up as a `RatingError`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RatingError {
    #[error("no season totals for team {team}")]
    MissingTeam { team: String },

    #[error("player {player} ({team}) is missing required field `{field}`")]
    MissingInput {
        team: String,
        player: String,
        field: &'static str,
    },

    #[error("player {player} ({team}) has invalid input: {message}")]
    InvalidInput {
        team: String,
        player: String,
        message: String,
    },

    #[error("team {team} has invalid season totals: {message}")]
    InvalidTeam { team: String, message: String },

    #[error("{rows} input row(s) for team {team} could not be read: {detail}")]
    RejectedRows {
        team: String,
        rows: usize,
        detail: String,
    },
}

impl RatingError {
    /// Team code the error is attributed to.
    pub fn team(&self) -> &str {
        match self {
            RatingError::MissingTeam { team }
            | RatingError::MissingInput { team, .. }
            | RatingError::InvalidInput { team, .. }
            | RatingError::InvalidTeam { team, .. }
            | RatingError::RejectedRows { team, .. } => team,
        }
    }
}
