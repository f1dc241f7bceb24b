//! YAML run configuration for the CLI.
//!
//! A run config bundles a spec with data provenance (input path, column
//! names) and a method selection. Deserialization is typed; validation
//! beyond shape happens when the config is lowered into a spec.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::spec::{ABSpec, ClipMode, DataKind, StreamSpec};

fn default_alpha() -> f64 {
    0.05
}

fn default_support() -> (f64, f64) {
    (0.0, 1.0)
}

fn default_true() -> bool {
    true
}

fn default_method() -> String {
    "auto".to_string()
}

fn default_column() -> String {
    "value".to_string()
}

fn default_arm_column() -> String {
    "arm".to_string()
}

fn default_clip_mode() -> ClipMode {
    ClipMode::Error
}

/// One run of the `mean` or `abtest` command.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Significance level; defaults to 0.05.
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Declared data kind.
    pub kind: DataKind,
    /// Declared support; defaults to the unit interval.
    #[serde(default = "default_support")]
    pub support: (f64, f64),
    /// Interval sidedness (one-sample only); defaults to two-sided.
    #[serde(default = "default_true")]
    pub two_sided: bool,
    /// Out-of-range policy; defaults to `error`.
    #[serde(default = "default_clip_mode")]
    pub clip_mode: ClipMode,
    /// Run name; defaults to empty.
    #[serde(default)]
    pub name: String,
    /// Method name, or `auto` for the recommender; defaults to `auto`.
    #[serde(default = "default_method")]
    pub method: String,
    /// Input CSV path.
    pub input: PathBuf,
    /// Numeric column name; defaults to `value`.
    #[serde(default = "default_column")]
    pub column: String,
    /// Arm column name (two-sample only); defaults to `arm`.
    #[serde(default = "default_arm_column")]
    pub arm_column: String,
}

impl RunConfig {
    /// Load and parse a YAML run config.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] when the file is unreadable or the YAML
    /// does not match the schema.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path).map_err(|e| ConfigError::Invalid {
            message: format!("cannot open config {}: {e}", path.display()),
        })?;
        serde_yaml::from_reader(BufReader::new(file)).map_err(|e| ConfigError::Invalid {
            message: format!("invalid config {}: {e}", path.display()),
        })
    }

    /// Lower into a validated one-sample spec.
    ///
    /// # Errors
    ///
    /// Propagates spec validation failures.
    pub fn stream_spec(&self) -> Result<StreamSpec, ConfigError> {
        Ok(StreamSpec::new(self.alpha, self.kind, self.support)?
            .with_two_sided(self.two_sided)
            .with_clip_mode(self.clip_mode)
            .with_name(self.name.clone()))
    }

    /// Lower into a validated two-sample spec.
    ///
    /// # Errors
    ///
    /// Propagates spec validation failures; a one-sided request is
    /// rejected since two-sample intervals are two-sided only.
    pub fn ab_spec(&self) -> Result<ABSpec, ConfigError> {
        if !self.two_sided {
            return Err(ConfigError::UnsupportedSidedness {
                detail: "two-sample intervals are two-sided only".to_string(),
            });
        }
        Ok(ABSpec::new(self.alpha, self.kind, self.support)?
            .with_clip_mode(self.clip_mode)
            .with_name(self.name.clone()))
    }
}
