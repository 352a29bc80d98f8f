//! Layered configuration for rankscope.
//!
//! Built-in defaults, then an optional TOML file, then `RANKSCOPE_*`
//! environment overrides. Unknown file keys produce warnings rather than
//! errors, and every loaded value is validated before use.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::hash::BuildHasher;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::summary::{DEFAULT_BUCKET_COUNT, DEFAULT_PERCENTILES};
use crate::types::FieldWeights;
use crate::{AnalysisError, AnalysisResult};

const PRECEDENCE: [ConfigSource; 3] = [
    ConfigSource::Env,
    ConfigSource::File,
    ConfigSource::Defaults,
];

const MAX_HISTOGRAM_BUCKETS: usize = 1000;

pub const ENV_HISTOGRAM_BUCKETS: &str = "RANKSCOPE_HISTOGRAM_BUCKETS";
pub const ENV_PERCENTILES: &str = "RANKSCOPE_PERCENTILES";
pub const ENV_EXCELLENT_MIN: &str = "RANKSCOPE_RELEVANCE_EXCELLENT_MIN";
pub const ENV_GOOD_MIN: &str = "RANKSCOPE_RELEVANCE_GOOD_MIN";
pub const ENV_FAIR_MIN: &str = "RANKSCOPE_RELEVANCE_FAIR_MIN";
pub const ENV_FIELD_WEIGHTS: &str = "RANKSCOPE_FIELD_WEIGHTS";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisConfig {
    pub histogram_buckets: usize,
    pub percentiles: Vec<u8>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            histogram_buckets: DEFAULT_BUCKET_COUNT,
            percentiles: DEFAULT_PERCENTILES.to_vec(),
        }
    }
}

/// Lower bounds (inclusive) of the relevance tiers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RelevanceConfig {
    pub excellent_min: f64,
    pub good_min: f64,
    pub fair_min: f64,
}

impl Default for RelevanceConfig {
    fn default() -> Self {
        Self {
            excellent_min: -1.0,
            good_min: -2.0,
            fair_min: -4.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExplainConfig {
    /// `field:weight` pairs; empty means every field weighs 1.0.
    pub field_weights: String,
}

impl ExplainConfig {
    /// Parsed field weights.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidConfig` for malformed pairs.
    pub fn parsed_weights(&self) -> AnalysisResult<FieldWeights> {
        if self.field_weights.trim().is_empty() {
            return Ok(FieldWeights::uniform());
        }
        self.field_weights.parse()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RankscopeConfig {
    pub analysis: AnalysisConfig,
    pub relevance: RelevanceConfig,
    pub explain: ExplainConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct AnalysisConfigPatch {
    histogram_buckets: Option<usize>,
    percentiles: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RelevanceConfigPatch {
    excellent_min: Option<f64>,
    good_min: Option<f64>,
    fair_min: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ExplainConfigPatch {
    field_weights: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RankscopeConfigPatch {
    analysis: Option<AnalysisConfigPatch>,
    relevance: Option<RelevanceConfigPatch>,
    explain: Option<ExplainConfigPatch>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSource {
    Env,
    File,
    Defaults,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigWarning {
    pub reason_code: String,
    pub field: String,
    pub source: ConfigSource,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigLoadResult {
    pub config: RankscopeConfig,
    pub source_precedence: [ConfigSource; 3],
    pub config_file_used: Option<PathBuf>,
    pub env_keys_used: Vec<String>,
    pub warnings: Vec<ConfigWarning>,
}

/// Load config from a file and env overlay (`env > file > defaults`).
///
/// A config path that does not exist is treated as "no file".
///
/// # Errors
///
/// Returns `AnalysisError::InvalidConfig` for parse/validation failures and
/// `AnalysisError::Io` if reading a present file fails.
pub fn load_from_sources<S>(
    config_file: Option<&Path>,
    env: &HashMap<String, String, S>,
) -> AnalysisResult<ConfigLoadResult>
where
    S: BuildHasher,
{
    let (toml_contents, config_file_used) = match config_file {
        Some(path) if path.exists() => (Some(fs::read_to_string(path)?), Some(path)),
        Some(_) | None => (None, None),
    };

    let mut loaded = load_from_str(toml_contents.as_deref(), env)?;
    loaded.config_file_used = config_file_used.map(Path::to_path_buf);
    Ok(loaded)
}

/// Load config from raw TOML plus env overlay (`env > file > defaults`).
///
/// # Errors
///
/// Returns `AnalysisError::InvalidConfig` when parsing or validation fails.
pub fn load_from_str<S>(
    config_toml: Option<&str>,
    env: &HashMap<String, String, S>,
) -> AnalysisResult<ConfigLoadResult>
where
    S: BuildHasher,
{
    let mut config = RankscopeConfig::default();
    let mut warnings = Vec::new();

    if let Some(config_toml) = config_toml {
        warnings.extend(collect_unknown_key_warnings(config_toml)?);
        let patch: RankscopeConfigPatch =
            toml::from_str(config_toml).map_err(|error| AnalysisError::InvalidConfig {
                field: "config_file".into(),
                value: "<toml>".into(),
                reason: error.to_string(),
            })?;
        apply_patch(&mut config, patch);
    }

    let env_keys_used = apply_env_overrides(&mut config, env)?;
    validate_config(&config)?;

    info!(
        target: "rankscope.config",
        histogram_buckets = config.analysis.histogram_buckets,
        percentile_count = config.analysis.percentiles.len(),
        env_keys = env_keys_used.len(),
        warnings = warnings.len(),
        "config loaded"
    );

    Ok(ConfigLoadResult {
        config,
        source_precedence: PRECEDENCE,
        config_file_used: None,
        env_keys_used,
        warnings,
    })
}

fn apply_patch(config: &mut RankscopeConfig, patch: RankscopeConfigPatch) {
    if let Some(analysis) = patch.analysis {
        if let Some(value) = analysis.histogram_buckets {
            config.analysis.histogram_buckets = value;
        }
        if let Some(value) = analysis.percentiles {
            config.analysis.percentiles = value;
        }
    }

    if let Some(relevance) = patch.relevance {
        if let Some(value) = relevance.excellent_min {
            config.relevance.excellent_min = value;
        }
        if let Some(value) = relevance.good_min {
            config.relevance.good_min = value;
        }
        if let Some(value) = relevance.fair_min {
            config.relevance.fair_min = value;
        }
    }

    if let Some(explain) = patch.explain {
        if let Some(value) = explain.field_weights {
            config.explain.field_weights = value;
        }
    }
}

fn apply_env_overrides(
    config: &mut RankscopeConfig,
    env: &HashMap<String, String, impl BuildHasher>,
) -> AnalysisResult<Vec<String>> {
    let mut keys_used = Vec::new();

    if let Some(value) = env.get(ENV_HISTOGRAM_BUCKETS) {
        config.analysis.histogram_buckets = parse_usize(value, "analysis.histogram_buckets")?;
        keys_used.push(ENV_HISTOGRAM_BUCKETS.into());
    }

    if let Some(value) = env.get(ENV_PERCENTILES) {
        config.analysis.percentiles = parse_csv(value, "analysis.percentiles")?
            .iter()
            .map(|part| parse_u8(part, "analysis.percentiles"))
            .collect::<AnalysisResult<_>>()?;
        keys_used.push(ENV_PERCENTILES.into());
    }

    if let Some(value) = env.get(ENV_EXCELLENT_MIN) {
        config.relevance.excellent_min = parse_f64(value, "relevance.excellent_min")?;
        keys_used.push(ENV_EXCELLENT_MIN.into());
    }

    if let Some(value) = env.get(ENV_GOOD_MIN) {
        config.relevance.good_min = parse_f64(value, "relevance.good_min")?;
        keys_used.push(ENV_GOOD_MIN.into());
    }

    if let Some(value) = env.get(ENV_FAIR_MIN) {
        config.relevance.fair_min = parse_f64(value, "relevance.fair_min")?;
        keys_used.push(ENV_FAIR_MIN.into());
    }

    if let Some(value) = env.get(ENV_FIELD_WEIGHTS) {
        config.explain.field_weights.clone_from(value);
        keys_used.push(ENV_FIELD_WEIGHTS.into());
    }

    Ok(keys_used)
}

fn collect_unknown_key_warnings(config_toml: &str) -> AnalysisResult<Vec<ConfigWarning>> {
    let value: toml::Value =
        toml::from_str(config_toml).map_err(|error| AnalysisError::InvalidConfig {
            field: "config_file".into(),
            value: "<toml>".into(),
            reason: error.to_string(),
        })?;

    let root = value.as_table().ok_or_else(|| AnalysisError::InvalidConfig {
        field: "config_file".into(),
        value: "<toml>".into(),
        reason: "expected table at root".into(),
    })?;

    let mut warnings = Vec::new();

    for (section, section_value) in root {
        let known_keys: HashSet<&str> = match section.as_str() {
            "analysis" => ["histogram_buckets", "percentiles"].into_iter().collect(),
            "relevance" => ["excellent_min", "good_min", "fair_min"]
                .into_iter()
                .collect(),
            "explain" => ["field_weights"].into_iter().collect(),
            _ => {
                warnings.push(ConfigWarning {
                    reason_code: "config.unknown_key.warning".into(),
                    field: format!("config.{section}"),
                    source: ConfigSource::File,
                    message: format!("Unknown section {section} ignored"),
                });
                continue;
            }
        };

        let Some(section_table) = section_value.as_table() else {
            continue;
        };

        for key in section_table.keys() {
            if !known_keys.contains(key.as_str()) {
                warnings.push(ConfigWarning {
                    reason_code: "config.unknown_key.warning".into(),
                    field: format!("{section}.{key}"),
                    source: ConfigSource::File,
                    message: format!("Unknown key {section}.{key} ignored"),
                });
            }
        }
    }

    Ok(warnings)
}

/// Range and consistency checks on a fully merged config.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidConfig` naming the first offending field.
pub fn validate_config(config: &RankscopeConfig) -> AnalysisResult<()> {
    if !(1..=MAX_HISTOGRAM_BUCKETS).contains(&config.analysis.histogram_buckets) {
        return Err(AnalysisError::InvalidConfig {
            field: "analysis.histogram_buckets".into(),
            value: config.analysis.histogram_buckets.to_string(),
            reason: format!("must be between 1 and {MAX_HISTOGRAM_BUCKETS}"),
        });
    }

    if config.analysis.percentiles.is_empty() {
        return Err(AnalysisError::InvalidConfig {
            field: "analysis.percentiles".into(),
            value: "[]".into(),
            reason: "expected at least one percentile".into(),
        });
    }

    if let Some(p) = config.analysis.percentiles.iter().find(|p| **p > 100) {
        return Err(AnalysisError::InvalidConfig {
            field: "analysis.percentiles".into(),
            value: p.to_string(),
            reason: "must be between 0 and 100".into(),
        });
    }

    validate_thresholds(
        config.relevance.excellent_min,
        config.relevance.good_min,
        config.relevance.fair_min,
    )?;

    config.explain.parsed_weights()?;

    Ok(())
}

/// Tier thresholds must be finite and strictly descending.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidConfig` naming the offending threshold.
pub fn validate_thresholds(excellent_min: f64, good_min: f64, fair_min: f64) -> AnalysisResult<()> {
    for (field, value) in [
        ("relevance.excellent_min", excellent_min),
        ("relevance.good_min", good_min),
        ("relevance.fair_min", fair_min),
    ] {
        if !value.is_finite() {
            return Err(AnalysisError::InvalidConfig {
                field: field.into(),
                value: value.to_string(),
                reason: "must be finite".into(),
            });
        }
    }

    if good_min >= excellent_min {
        return Err(AnalysisError::InvalidConfig {
            field: "relevance.good_min".into(),
            value: good_min.to_string(),
            reason: format!("must be < relevance.excellent_min ({excellent_min})"),
        });
    }

    if fair_min >= good_min {
        return Err(AnalysisError::InvalidConfig {
            field: "relevance.fair_min".into(),
            value: fair_min.to_string(),
            reason: format!("must be < relevance.good_min ({good_min})"),
        });
    }

    Ok(())
}

fn parse_csv(value: &str, field: &str) -> AnalysisResult<Vec<String>> {
    let parts: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect();

    if parts.is_empty() {
        return Err(AnalysisError::InvalidConfig {
            field: field.into(),
            value: value.into(),
            reason: "expected at least one comma-separated value".into(),
        });
    }

    Ok(parts)
}

fn parse_usize(value: &str, field: &str) -> AnalysisResult<usize> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| AnalysisError::InvalidConfig {
            field: field.into(),
            value: value.into(),
            reason: "expected unsigned integer".into(),
        })
}

fn parse_u8(value: &str, field: &str) -> AnalysisResult<u8> {
    value
        .trim()
        .parse::<u8>()
        .map_err(|_| AnalysisError::InvalidConfig {
            field: field.into(),
            value: value.into(),
            reason: "expected integer percentile between 0 and 100".into(),
        })
}

fn parse_f64(value: &str, field: &str) -> AnalysisResult<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| AnalysisError::InvalidConfig {
            field: field.into(),
            value: value.into(),
            reason: "expected a number".into(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env() -> HashMap<String, String> {
        HashMap::new()
    }

    #[test]
    fn defaults_without_file_or_env() {
        let loaded = load_from_str(None, &no_env()).expect("load");
        assert_eq!(loaded.config, RankscopeConfig::default());
        assert_eq!(loaded.config.analysis.histogram_buckets, 10);
        assert_eq!(loaded.config.analysis.percentiles, vec![25, 50, 75, 90, 95, 99]);
        assert!(loaded.env_keys_used.is_empty());
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn file_values_override_defaults() {
        let toml = r#"
            [analysis]
            histogram_buckets = 20
            percentiles = [50, 90]

            [relevance]
            excellent_min = -0.5

            [explain]
            field_weights = "title:2.0"
        "#;
        let loaded = load_from_str(Some(toml), &no_env()).expect("load");
        assert_eq!(loaded.config.analysis.histogram_buckets, 20);
        assert_eq!(loaded.config.analysis.percentiles, vec![50, 90]);
        assert!((loaded.config.relevance.excellent_min - -0.5).abs() < f64::EPSILON);
        assert!((loaded.config.relevance.good_min - -2.0).abs() < f64::EPSILON);
        let weights = loaded.config.explain.parsed_weights().expect("weights");
        assert!((weights.weight("title") - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn env_overrides_file() {
        let toml = "[analysis]\nhistogram_buckets = 20\n";
        let env = HashMap::from([
            (ENV_HISTOGRAM_BUCKETS.to_string(), "5".to_string()),
            (ENV_PERCENTILES.to_string(), "10, 50,90".to_string()),
            (ENV_FAIR_MIN.to_string(), "-6".to_string()),
        ]);
        let loaded = load_from_str(Some(toml), &env).expect("load");
        assert_eq!(loaded.config.analysis.histogram_buckets, 5);
        assert_eq!(loaded.config.analysis.percentiles, vec![10, 50, 90]);
        assert!((loaded.config.relevance.fair_min - -6.0).abs() < f64::EPSILON);
        assert_eq!(
            loaded.env_keys_used,
            vec![
                ENV_HISTOGRAM_BUCKETS.to_string(),
                ENV_PERCENTILES.to_string(),
                ENV_FAIR_MIN.to_string()
            ]
        );
    }

    #[test]
    fn unknown_keys_warn_instead_of_failing() {
        let toml = "[analysis]\nbins = 3\n\n[render]\ncolor = true\n";
        let loaded = load_from_str(Some(toml), &no_env()).expect("load");
        let fields: Vec<_> = loaded.warnings.iter().map(|w| w.field.as_str()).collect();
        assert!(fields.contains(&"analysis.bins"));
        assert!(fields.contains(&"config.render"));
        assert!(loaded
            .warnings
            .iter()
            .all(|w| w.reason_code == "config.unknown_key.warning"));
    }

    #[test]
    fn zero_buckets_rejected() {
        let env = HashMap::from([(ENV_HISTOGRAM_BUCKETS.to_string(), "0".to_string())]);
        let err = load_from_str(None, &env).expect_err("must fail");
        assert!(
            matches!(err, AnalysisError::InvalidConfig { ref field, .. } if field == "analysis.histogram_buckets")
        );
    }

    #[test]
    fn out_of_range_percentile_rejected() {
        let toml = "[analysis]\npercentiles = [50, 101]\n";
        let err = load_from_str(Some(toml), &no_env()).expect_err("must fail");
        assert!(err.to_string().contains("101"));
    }

    #[test]
    fn empty_percentile_list_rejected() {
        let toml = "[analysis]\npercentiles = []\n";
        assert!(load_from_str(Some(toml), &no_env()).is_err());
    }

    #[test]
    fn non_descending_thresholds_rejected() {
        let env = HashMap::from([(ENV_GOOD_MIN.to_string(), "-0.5".to_string())]);
        let err = load_from_str(None, &env).expect_err("must fail");
        assert!(
            matches!(err, AnalysisError::InvalidConfig { ref field, .. } if field == "relevance.good_min")
        );
    }

    #[test]
    fn non_finite_threshold_rejected() {
        assert!(validate_thresholds(f64::NAN, -2.0, -4.0).is_err());
        assert!(validate_thresholds(-1.0, -2.0, f64::NEG_INFINITY).is_err());
        assert!(validate_thresholds(-1.0, -2.0, -4.0).is_ok());
    }

    #[test]
    fn bad_env_number_names_the_field() {
        let env = HashMap::from([(ENV_EXCELLENT_MIN.to_string(), "high".to_string())]);
        let err = load_from_str(None, &env).expect_err("must fail");
        assert!(err.to_string().contains("relevance.excellent_min"));
    }

    #[test]
    fn malformed_field_weights_rejected() {
        let env = HashMap::from([(ENV_FIELD_WEIGHTS.to_string(), "title=2".to_string())]);
        assert!(load_from_str(None, &env).is_err());
    }

    #[test]
    fn malformed_toml_is_invalid_config() {
        let err = load_from_str(Some("[analysis"), &no_env()).expect_err("must fail");
        assert!(
            matches!(err, AnalysisError::InvalidConfig { ref field, .. } if field == "config_file")
        );
    }

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.toml");
        let loaded = load_from_sources(Some(&path), &no_env()).expect("load");
        assert!(loaded.config_file_used.is_none());
        assert_eq!(loaded.config, RankscopeConfig::default());
    }

    #[test]
    fn present_file_is_recorded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("rankscope.toml");
        fs::write(&path, "[analysis]\nhistogram_buckets = 4\n").expect("write");
        let loaded = load_from_sources(Some(&path), &no_env()).expect("load");
        assert_eq!(loaded.config_file_used.as_deref(), Some(path.as_path()));
        assert_eq!(loaded.config.analysis.histogram_buckets, 4);
    }
}
