use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(author, version, about = "Box-score plus-minus player ratings")]
pub struct Cli {
    /// Player season totals (CSV)
    #[arg(long)]
    pub players: PathBuf,

    /// Team season totals (CSV)
    #[arg(long)]
    pub teams: PathBuf,

    /// Directory holding config/model.toml and defaults/
    #[arg(long, default_value = ".")]
    pub base_dir: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Csv)]
    pub format: Format,

    /// Write the table here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Stop at the first team that fails
    #[arg(long)]
    pub fail_fast: bool,

    /// Leave players under this many minutes out of the output
    #[arg(long, default_value_t = 0.0)]
    pub min_minutes: f64,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
}
