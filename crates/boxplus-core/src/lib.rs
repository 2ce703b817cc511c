// Box-score plus-minus ratings: season totals in, per-player overall,
// offensive and defensive ratings out, reconciled with team efficiency.

pub mod config;
pub mod error;
pub mod ingest;
pub mod league;
pub mod rating;
pub mod report;
pub mod totals;

pub use config::ModelConfig;
pub use error::RatingError;
pub use league::{compute_league, LeagueOptions, LeagueResult, TotalsProvider};
pub use rating::{compute_team, PlayerRating, TeamResult};
