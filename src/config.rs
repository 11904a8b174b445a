//! Scoring configuration.
//!
//! A [`ScoringConfig`] can be built in code or loaded from TOML:
//!
//! ```toml
//! metrics = ["muc", "b-cubed", "ceaf"]
//! policy = "ace"
//! error_policy = "strict"
//! per_document = true
//! max_assignment_dim = 2048
//! ```
//!
//! Missing keys take their defaults. The default file lives at
//! `<config_dir>/coref-scorer/config.toml` (see [`ScoringConfig::default_path`]);
//! command-line flags override whatever it sets.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::aggregate::ErrorPolicy;
use crate::align::MatchPolicy;
use crate::assignment::AssignmentSolver;
use crate::error::{Error, Result};
use crate::metrics::Metric;

/// Directory name under the platform config directory.
pub const CONFIG_DIR_NAME: &str = "coref-scorer";

/// File name of the default configuration.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// What to score and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    /// Metrics to compute, in report order.
    pub metrics: Vec<Metric>,
    /// Mention matching policy for span-annotated input.
    pub policy: MatchPolicy,
    /// Handling of documents that fail to score.
    pub error_policy: ErrorPolicy,
    /// Keep per-document diagnostics in the report.
    pub per_document: bool,
    /// Cap on the CEAF assignment dimension.
    pub max_assignment_dim: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            metrics: Metric::CONLL.to_vec(),
            policy: MatchPolicy::default(),
            error_policy: ErrorPolicy::default(),
            per_document: false,
            max_assignment_dim: AssignmentSolver::DEFAULT_MAX_DIM,
        }
    }
}

impl ScoringConfig {
    /// Create the default configuration (CoNLL metrics, MUC matching, lenient).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the metric list.
    #[must_use]
    pub fn with_metrics(mut self, metrics: impl IntoIterator<Item = Metric>) -> Self {
        self.metrics = Vec::new();
        for metric in metrics {
            self = self.add_metric(metric);
        }
        self
    }

    /// Append a metric unless already present.
    #[must_use]
    pub fn add_metric(mut self, metric: Metric) -> Self {
        if !self.metrics.contains(&metric) {
            self.metrics.push(metric);
        }
        self
    }

    /// Set the matching policy.
    #[must_use]
    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the error policy.
    #[must_use]
    pub fn with_error_policy(mut self, error_policy: ErrorPolicy) -> Self {
        self.error_policy = error_policy;
        self
    }

    /// Fail on the first bad document.
    #[must_use]
    pub fn strict(self) -> Self {
        self.with_error_policy(ErrorPolicy::Strict)
    }

    /// Keep per-document diagnostics.
    #[must_use]
    pub fn with_per_document(mut self, per_document: bool) -> Self {
        self.per_document = per_document;
        self
    }

    /// Set the CEAF assignment dimension cap.
    #[must_use]
    pub fn with_max_assignment_dim(mut self, max_dim: usize) -> Self {
        self.max_assignment_dim = max_dim;
        self
    }

    /// Solver honoring the configured cap.
    #[must_use]
    pub fn solver(&self) -> AssignmentSolver {
        AssignmentSolver::new().with_max_dim(self.max_assignment_dim)
    }

    /// Check the values.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] for an empty metric list or a zero dimension cap.
    pub fn validate(&self) -> Result<()> {
        if self.metrics.is_empty() {
            return Err(Error::config("no metrics selected"));
        }
        if self.max_assignment_dim == 0 {
            return Err(Error::config("max_assignment_dim must be positive"));
        }
        Ok(())
    }

    /// Parse from TOML text.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] for malformed TOML, unknown keys or invalid values.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| Error::config(format!("invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)
            .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Serialize to TOML.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if serialization fails.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// `<config_dir>/coref-scorer/config.toml`, if the platform has a
    /// config directory.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load the default file if it exists; otherwise the built-in defaults.
    ///
    /// # Errors
    ///
    /// As [`from_toml_file`](Self::from_toml_file) when the file exists but
    /// cannot be used.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.is_file() => Self::from_toml_file(path),
            _ => Ok(Self::default()),
        }
    }
}
