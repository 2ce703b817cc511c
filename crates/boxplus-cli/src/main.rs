// boxplus entry point.
//
// 1. Initialize tracing (stderr, so the table can go to stdout)
// 2. Load the model configuration
// 3. Load season totals
// 4. Rate the league
// 5. Write the table and report failed teams

mod cli;

use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::Context;
use boxplus_core::config;
use boxplus_core::ingest;
use boxplus_core::league::{compute_league, LeagueOptions};
use boxplus_core::report;
use clap::Parser;
use tracing::{error, info, warn};

use cli::{Cli, Format};

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{:#}", e);
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    // 1. Tracing
    init_tracing()?;
    info!("boxplus starting up");

    // 2. Config
    if let Some(path) = config::ensure_config_files(&cli.base_dir).context("failed to set up config directory")? {
        info!("Copied default config to {}", path.display());
    }
    let model = config::load_config_from(&cli.base_dir).context("failed to load model configuration")?;

    // 3. Season totals
    let season = ingest::load_season(&cli.players, &cli.teams).context("failed to load season totals")?;
    info!(
        "Loaded {} players across {} teams",
        season.player_count(),
        season.team_codes().len()
    );
    for code in season.teams_without_totals() {
        warn!("Players listed for team {code} without team totals; the team will fail");
    }
    if !season.rejected().is_empty() {
        warn!(
            "{} input row(s) were rejected; their teams will fail",
            season.rejected().len()
        );
    }

    // 4. Ratings
    let options = LeagueOptions {
        fail_fast: cli.fail_fast,
    };
    let result = compute_league(
        &season.team_codes(),
        &season,
        &model.coefficients,
        &model.constants,
        options,
    )
    .context("rating failed")?;

    // 5. Output
    let rows = report::select_rows(&result, cli.min_minutes);
    let writer: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };
    match cli.format {
        Format::Csv => report::write_csv(&rows, writer),
        Format::Json => report::write_json(&result, &rows, writer),
    }
    .context("failed to write ratings")?;
    info!("Wrote {} rows", rows.len());

    for line in report::failure_summary(&result) {
        eprintln!("{line}");
    }
    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("boxplus=info,boxplus_core=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("failed to set tracing subscriber")?;

    Ok(())
}
