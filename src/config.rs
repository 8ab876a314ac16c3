use crate::consts::{DEFAULT_DOWNSAMPLE_THRESHOLD, DEFAULT_UPSAMPLE_THRESHOLD};
use crate::error::{SmResult, StrokeMatchError};
use crate::features::FeatureKind;
use crate::model::ModelMeta;
use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Meta keys shared by the recognizer and the trainer of a model.
pub const META_DOWNSAMPLE_THRESHOLD: &str = "downsample_threshold";
pub const META_FEATURE_FUNCTION: &str = "feature_extraction_function";

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    #[command(flatten)]
    pub recognizer: RecognizerOptions,
    #[command(flatten)]
    pub trainer: TrainerOptions,
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> SmResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> SmResult<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecognizerOptions {
    /// Minimum spacing kept between points before feature extraction.
    #[arg(long, default_value_t = DEFAULT_DOWNSAMPLE_THRESHOLD)]
    pub downsample_threshold: u32,
    #[arg(long, default_value_t = FeatureKind::Delta)]
    pub features: FeatureKind,
    /// Score templates on the rayon pool.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub parallel: bool,
}

impl Default for RecognizerOptions {
    fn default() -> Self {
        Self {
            downsample_threshold: DEFAULT_DOWNSAMPLE_THRESHOLD,
            features: FeatureKind::Delta,
            parallel: true,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrainerOptions {
    #[arg(
        long = "train-downsample-threshold",
        id = "train_downsample_threshold",
        default_value_t = DEFAULT_DOWNSAMPLE_THRESHOLD
    )]
    pub downsample_threshold: u32,
    /// Target point spacing for the representative sample; 0 disables.
    #[arg(
        long = "train-upsample-threshold",
        id = "train_upsample_threshold",
        default_value_t = DEFAULT_UPSAMPLE_THRESHOLD
    )]
    pub upsample_threshold: u32,
    #[arg(
        long = "train-features",
        id = "train_features",
        default_value_t = FeatureKind::Delta
    )]
    pub features: FeatureKind,
}

impl Default for TrainerOptions {
    fn default() -> Self {
        Self {
            downsample_threshold: DEFAULT_DOWNSAMPLE_THRESHOLD,
            upsample_threshold: DEFAULT_UPSAMPLE_THRESHOLD,
            features: FeatureKind::Delta,
        }
    }
}

impl RecognizerOptions {
    /// Adopts the preprocessing a model was trained with.
    pub fn apply_meta(&mut self, meta: &ModelMeta) -> SmResult<()> {
        if let Some(v) = meta.get(META_DOWNSAMPLE_THRESHOLD) {
            self.downsample_threshold = parse_threshold(v)?;
        }
        if let Some(v) = meta.get(META_FEATURE_FUNCTION) {
            self.features = parse_features(v)?;
        }
        Ok(())
    }

    /// Copies over only the values given explicitly on the command line.
    pub fn merge_from_cli(&mut self, cli: &RecognizerOptions, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($field:ident, $arg_name:expr) => {
                if matches.value_source($arg_name) == Some(ValueSource::CommandLine) {
                    self.$field = cli.$field.clone();
                }
            };
        }

        update_if_present!(downsample_threshold, "downsample_threshold");
        update_if_present!(features, "features");
        update_if_present!(parallel, "parallel");
    }
}

impl TrainerOptions {
    pub fn apply_meta(&mut self, meta: &ModelMeta) -> SmResult<()> {
        if let Some(v) = meta.get(META_DOWNSAMPLE_THRESHOLD) {
            self.downsample_threshold = parse_threshold(v)?;
        }
        if let Some(v) = meta.get(META_FEATURE_FUNCTION) {
            self.features = parse_features(v)?;
        }
        Ok(())
    }

    pub fn merge_from_cli(&mut self, cli: &TrainerOptions, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($field:ident, $arg_name:expr) => {
                if matches.value_source($arg_name) == Some(ValueSource::CommandLine) {
                    self.$field = cli.$field.clone();
                }
            };
        }

        update_if_present!(downsample_threshold, "train_downsample_threshold");
        update_if_present!(upsample_threshold, "train_upsample_threshold");
        update_if_present!(features, "train_features");
    }

    /// Records the preprocessing in `meta` so recognizers can replay it.
    pub fn write_meta(&self, meta: &mut ModelMeta) {
        meta.set(META_DOWNSAMPLE_THRESHOLD, self.downsample_threshold.to_string());
        meta.set(META_FEATURE_FUNCTION, self.features.to_string());
    }
}

fn parse_threshold(value: &str) -> SmResult<u32> {
    value.trim().parse().map_err(|_| {
        StrokeMatchError::Config(format!(
            "{} must be a non-negative integer, got '{}'",
            META_DOWNSAMPLE_THRESHOLD, value
        ))
    })
}

fn parse_features(value: &str) -> SmResult<FeatureKind> {
    FeatureKind::from_str(value.trim()).map_err(|_| {
        StrokeMatchError::Config(format!("unknown feature extraction function '{}'", value))
    })
}
