// Model configuration: the published coefficient tables and the constants of
// every pipeline stage, loaded from `config/model.toml` or built in.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::info;

use crate::rating::coefficients::CategoryLine;
use crate::totals::{MAX_POSITION, MIN_POSITION};

/// File name of the model configuration inside `config/` and `defaults/`.
pub const MODEL_FILE: &str = "model.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Coefficient tables
// ---------------------------------------------------------------------------

/// Category weights for one rating flavor at the two ends of the position
/// axis, plus the positional constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlavorCoefficients {
    /// Weights for a pure point guard (position 1).
    pub guard: CategoryLine,
    /// Weights for a pure center (position 5).
    pub center: CategoryLine,
    /// Constant scaled by `(3 - position) / 2` for players below position 3.
    pub position_constant: f64,
    /// Constant scaled by `(offensive_role - 3)` for everyone else.
    pub role_constant: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientTable {
    pub overall: FlavorCoefficients,
    pub offense: FlavorCoefficients,
}

// ---------------------------------------------------------------------------
// Stage constants
// ---------------------------------------------------------------------------

/// Regression of position on per-floor-time shares of team totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRegression {
    pub intercept: f64,
    pub trb: f64,
    pub stl: f64,
    pub pf: f64,
    pub ast: f64,
    pub blk: f64,
    /// Pseudo-minutes given to the nominal position when blending.
    pub prior_weight: f64,
}

/// Regression of offensive role on assist and threshold-scoring shares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleRegression {
    pub intercept: f64,
    pub ast: f64,
    pub threshold_points: f64,
    /// Role assumed for a player with no minutes.
    pub default_role: f64,
    pub prior_weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConstants {
    /// Free-throw credit in true shooting attempts.
    pub ft_weight: f64,
    /// Points per true shooting attempt treated as neutral.
    pub efficiency_baseline: f64,
    /// Threshold scoring counts points above `team pts/TSA - threshold_offset`.
    pub threshold_offset: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamConstants {
    /// Lead-bonus points per point of average lead, before halving.
    pub lead_bonus_factor: f64,
    /// Fraction of the lead bonus credited to offense.
    pub offense_lead_share: f64,
    /// Nominal lineup size the team gap is spread across.
    pub roster_slots: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplacementConstants {
    pub replacement_level: f64,
    pub season_games: f64,
    /// Players at or above this many minutes are not regressed.
    pub regression_minutes: f64,
    pub pseudo_minute_divisor: f64,
    pub expectation_intercept: f64,
    pub expectation_slope: f64,
    /// Games added to the denominator of minutes per game.
    pub game_padding: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConstants {
    pub position: PositionRegression,
    pub offensive_role: RoleRegression,
    pub scoring: ScoringConstants,
    pub team: TeamConstants,
    pub replacement: ReplacementConstants,
}

/// Everything the rating pipeline reads besides the season totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub coefficients: CoefficientTable,
    pub constants: ModelConstants,
}

impl ModelConfig {
    /// Process-wide copy of the built-in published model.
    pub fn published() -> &'static ModelConfig {
        static PUBLISHED: OnceLock<ModelConfig> = OnceLock::new();
        PUBLISHED.get_or_init(ModelConfig::default)
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            coefficients: CoefficientTable {
                overall: FlavorCoefficients {
                    guard: CategoryLine {
                        adj_pts: 0.860,
                        fga: -0.560,
                        fta: -0.246,
                        fg3m: 0.389,
                        ast: 0.580,
                        tov: -0.964,
                        oreb: 0.613,
                        dreb: 0.116,
                        treb: 0.0,
                        stl: 1.369,
                        blk: 1.327,
                        pf: -0.367,
                    },
                    center: CategoryLine {
                        adj_pts: 0.860,
                        fga: -0.780,
                        fta: -0.343,
                        fg3m: 0.389,
                        ast: 1.034,
                        tov: -0.964,
                        oreb: 0.181,
                        dreb: 0.181,
                        treb: 0.0,
                        stl: 1.008,
                        blk: 0.703,
                        pf: -0.367,
                    },
                    position_constant: -0.818,
                    role_constant: 1.387,
                },
                offense: FlavorCoefficients {
                    guard: CategoryLine {
                        adj_pts: 0.605,
                        fga: -0.330,
                        fta: -0.145,
                        fg3m: 0.477,
                        ast: 0.476,
                        tov: -0.579,
                        oreb: 0.606,
                        dreb: -0.112,
                        treb: 0.0,
                        stl: 0.177,
                        blk: 0.725,
                        pf: -0.439,
                    },
                    center: CategoryLine {
                        adj_pts: 0.605,
                        fga: -0.472,
                        fta: -0.208,
                        fg3m: 0.477,
                        ast: 0.476,
                        tov: -0.579,
                        oreb: 0.606,
                        dreb: -0.112,
                        treb: 0.0,
                        stl: 0.177,
                        blk: 0.725,
                        pf: -0.439,
                    },
                    position_constant: -1.698,
                    role_constant: 0.430,
                },
            },
            constants: ModelConstants {
                position: PositionRegression {
                    intercept: 2.130,
                    trb: 8.668,
                    stl: -2.486,
                    pf: 0.992,
                    ast: -3.536,
                    blk: 1.667,
                    prior_weight: 50.0,
                },
                offensive_role: RoleRegression {
                    intercept: 6.00,
                    ast: -6.642,
                    threshold_points: -8.544,
                    default_role: 4.0,
                    prior_weight: 50.0,
                },
                scoring: ScoringConstants {
                    ft_weight: 0.44,
                    efficiency_baseline: 1.0,
                    threshold_offset: 0.33,
                },
                team: TeamConstants {
                    lead_bonus_factor: 0.35,
                    offense_lead_share: 0.5,
                    roster_slots: 5.0,
                },
                replacement: ReplacementConstants {
                    replacement_level: -2.0,
                    season_games: 82.0,
                    regression_minutes: 450.0,
                    pseudo_minute_divisor: 3.0,
                    expectation_intercept: 4.75,
                    expectation_slope: 0.175,
                    game_padding: 4.0,
                },
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/model.toml` relative to `base_dir`.
///
/// A missing file is not an error: the built-in published model is used.
pub fn load_config_from(base_dir: &Path) -> Result<ModelConfig, ConfigError> {
    let path = base_dir.join("config").join(MODEL_FILE);
    let config = if path.exists() {
        let text = read_file(&path)?;
        let config: ModelConfig = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
            path: path.clone(),
            source: e,
        })?;
        info!("Loaded model configuration from {}", path.display());
        config
    } else {
        info!("No {} found, using published model constants", path.display());
        ModelConfig::default()
    };

    validate(&config)?;
    Ok(config)
}

/// Parse and validate a model configuration from TOML text.
pub fn parse_config(text: &str) -> Result<ModelConfig, ConfigError> {
    let config: ModelConfig = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: PathBuf::from("<inline>"),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Seed `config/model.toml` from `defaults/model.toml` when it is missing.
/// An existing file is never overwritten. Returns the path written, if any.
pub fn ensure_config_files(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let source = base_dir.join("defaults").join(MODEL_FILE);
    let target = base_dir.join("config").join(MODEL_FILE);
    if target.exists() || !source.exists() {
        return Ok(None);
    }

    let copy_error = |what: &str, e: std::io::Error| ConfigError::DefaultsCopyError {
        message: format!("failed to {what}: {e}"),
    };
    if let Some(dir) = target.parent() {
        std::fs::create_dir_all(dir).map_err(|e| copy_error("create config directory", e))?;
    }
    std::fs::copy(&source, &target)
        .map_err(|e| copy_error(&format!("copy {} to {}", source.display(), target.display()), e))?;
    Ok(Some(target))
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn invalid(field: &str, message: String) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_string(),
        message,
    }
}

fn validate(config: &ModelConfig) -> Result<(), ConfigError> {
    let coef = &config.coefficients;
    let lines: &[(&str, &CategoryLine)] = &[
        ("coefficients.overall.guard", &coef.overall.guard),
        ("coefficients.overall.center", &coef.overall.center),
        ("coefficients.offense.guard", &coef.offense.guard),
        ("coefficients.offense.center", &coef.offense.center),
    ];
    for (name, line) in lines {
        if line.values().iter().any(|v| !v.is_finite()) {
            return Err(invalid(name, "all coefficients must be finite".into()));
        }
    }

    let c = &config.constants;
    let finite_fields: &[(&str, f64)] = &[
        ("coefficients.overall.position_constant", coef.overall.position_constant),
        ("coefficients.overall.role_constant", coef.overall.role_constant),
        ("coefficients.offense.position_constant", coef.offense.position_constant),
        ("coefficients.offense.role_constant", coef.offense.role_constant),
        ("constants.position.intercept", c.position.intercept),
        ("constants.offensive_role.intercept", c.offensive_role.intercept),
        ("constants.scoring.efficiency_baseline", c.scoring.efficiency_baseline),
        ("constants.scoring.threshold_offset", c.scoring.threshold_offset),
        ("constants.team.lead_bonus_factor", c.team.lead_bonus_factor),
        ("constants.replacement.replacement_level", c.replacement.replacement_level),
        ("constants.replacement.expectation_intercept", c.replacement.expectation_intercept),
        ("constants.replacement.expectation_slope", c.replacement.expectation_slope),
    ];
    for (name, val) in finite_fields {
        if !val.is_finite() {
            return Err(invalid(name, format!("must be finite, got {val}")));
        }
    }

    let positive_fields: &[(&str, f64)] = &[
        ("constants.position.prior_weight", c.position.prior_weight),
        ("constants.offensive_role.prior_weight", c.offensive_role.prior_weight),
        ("constants.team.roster_slots", c.team.roster_slots),
        ("constants.replacement.season_games", c.replacement.season_games),
        ("constants.replacement.pseudo_minute_divisor", c.replacement.pseudo_minute_divisor),
    ];
    for (name, val) in positive_fields {
        if !(*val > 0.0) {
            return Err(invalid(name, format!("must be > 0, got {val}")));
        }
    }

    let non_negative_fields: &[(&str, f64)] = &[
        ("constants.scoring.ft_weight", c.scoring.ft_weight),
        ("constants.replacement.regression_minutes", c.replacement.regression_minutes),
        ("constants.replacement.game_padding", c.replacement.game_padding),
    ];
    for (name, val) in non_negative_fields {
        if !(*val >= 0.0) {
            return Err(invalid(name, format!("must be >= 0, got {val}")));
        }
    }

    let share = c.team.offense_lead_share;
    if !(0.0..=1.0).contains(&share) {
        return Err(invalid(
            "constants.team.offense_lead_share",
            format!("must be between 0.0 and 1.0 inclusive, got {share}"),
        ));
    }

    let role = c.offensive_role.default_role;
    if !(MIN_POSITION..=MAX_POSITION).contains(&role) {
        return Err(invalid(
            "constants.offensive_role.default_role",
            format!("must be within 1..5, got {role}"),
        ));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Workspace root, which holds `defaults/`.
    fn project_root() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("boxplus_config_{name}"));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn built_in_model_is_valid() {
        validate(&ModelConfig::default()).expect("published model should validate");
    }

    #[test]
    fn published_returns_same_instance() {
        let a = ModelConfig::published() as *const ModelConfig;
        let b = ModelConfig::published() as *const ModelConfig;
        assert_eq!(a, b);
        assert_eq!(*ModelConfig::published(), ModelConfig::default());
    }

    #[test]
    fn defaults_file_matches_built_in_model() {
        let text = fs::read_to_string(project_root().join("defaults").join(MODEL_FILE))
            .expect("defaults/model.toml should exist");
        let parsed = parse_config(&text).expect("defaults/model.toml should parse");
        assert_eq!(parsed, ModelConfig::default());
    }

    #[test]
    fn missing_model_file_falls_back_to_defaults() {
        let tmp = scratch_dir("missing");
        let config = load_config_from(&tmp).expect("should fall back to defaults");
        assert_eq!(config, ModelConfig::default());
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_copies_without_overwriting() {
        let tmp = scratch_dir("ensure");
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::copy(
            project_root().join("defaults").join(MODEL_FILE),
            tmp.join("defaults").join(MODEL_FILE),
        )
        .unwrap();

        let copied = ensure_config_files(&tmp).unwrap();
        assert_eq!(copied, Some(tmp.join("config").join(MODEL_FILE)));

        // Second call finds the file already in place.
        let copied = ensure_config_files(&tmp).unwrap();
        assert_eq!(copied, None);

        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config, ModelConfig::default());
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_without_defaults_is_a_no_op() {
        let tmp = scratch_dir("no_defaults");
        assert_eq!(ensure_config_files(&tmp).unwrap(), None);
        assert!(!tmp.join("config").exists());
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_keeps_edited_model() {
        let tmp = scratch_dir("keep_edited");
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("defaults").join(MODEL_FILE), "defaults").unwrap();
        fs::write(tmp.join("config").join(MODEL_FILE), "edited").unwrap();

        assert_eq!(ensure_config_files(&tmp).unwrap(), None);
        let kept = fs::read_to_string(tmp.join("config").join(MODEL_FILE)).unwrap();
        assert_eq!(kept, "edited");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn edited_model_file_is_honored() {
        let tmp = scratch_dir("edited");
        fs::create_dir_all(tmp.join("config")).unwrap();
        let text = fs::read_to_string(project_root().join("defaults").join(MODEL_FILE)).unwrap();
        let modified = text.replace("replacement_level = -2.0", "replacement_level = -3.0");
        fs::write(tmp.join("config").join(MODEL_FILE), modified).unwrap();

        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.constants.replacement.replacement_level, -3.0);
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn malformed_model_file_is_a_parse_error() {
        let tmp = scratch_dir("malformed");
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("config").join(MODEL_FILE), "[coefficients\n").unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }), "got {err}");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_roster_slots() {
        let mut config = ModelConfig::default();
        config.constants.team.roster_slots = 0.0;
        match validate(&config).unwrap_err() {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "constants.team.roster_slots");
            }
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn rejects_non_finite_coefficient() {
        let mut config = ModelConfig::default();
        config.coefficients.offense.center.blk = f64::NAN;
        match validate(&config).unwrap_err() {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "coefficients.offense.center");
            }
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn rejects_default_role_outside_axis() {
        let mut config = ModelConfig::default();
        config.constants.offensive_role.default_role = 0.5;
        match validate(&config).unwrap_err() {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "constants.offensive_role.default_role");
            }
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn rejects_lead_share_above_one() {
        let mut config = ModelConfig::default();
        config.constants.team.offense_lead_share = 1.5;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::ValidationError { .. })
        ));
    }
}
