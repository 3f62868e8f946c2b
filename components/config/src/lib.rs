use std::{fs::File, path::Path};

use error::ConfigurationError;
use serde::{Deserialize, Serialize};
pub mod error;

/// Name of the trace looked up when no source is given.
pub const DEFAULT_SOURCE: &str = "kahadb.log";

/// Switches of the text report. All of them default to off.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportOptions {
    /// Suppress stage lines that retired no segment.
    #[serde(default)]
    pub concise: bool,

    /// Print the timestamp of every full set line.
    #[serde(default)]
    pub time: bool,

    /// Print parse internals of every checkpoint line.
    #[serde(default)]
    pub debug: bool,

    /// Append the retired segment ids to every stage line.
    #[serde(default)]
    pub verbose: bool,
}

impl ReportOptions {
    /// Turn on every option that is on in `other`.
    pub fn merge(&mut self, other: &ReportOptions) {
        self.concise |= other.concise;
        self.time |= other.time;
        self.debug |= other.debug;
        self.verbose |= other.verbose;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Path, URL or bundled resource name of the trace to analyze.
    #[serde(default = "default_source")]
    pub source: String,

    #[serde(default)]
    pub report: ReportOptions,
}

fn default_source() -> String {
    DEFAULT_SOURCE.to_owned()
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            source: default_source(),
            report: ReportOptions::default(),
        }
    }
}

impl Configuration {
    /// Load configuration from a YAML file. Absent keys take their default values.
    pub fn from_file(path: &Path) -> Result<Self, ConfigurationError> {
        if !path.is_file() {
            return Err(ConfigurationError::FileNotExists(
                path.display().to_string(),
            ));
        }
        let configuration = serde_yaml::from_reader(File::open(path)?)?;
        Ok(configuration)
    }

    /// Check the configuration before it is frozen and handed to the analyzer.
    pub fn check_and_apply(&mut self) -> Result<(), ConfigurationError> {
        let source = self.source.trim();
        if source.is_empty() {
            return Err(ConfigurationError::EmptySource);
        }
        if source.len() != self.source.len() {
            self.source = source.to_owned();
        }
        Ok(())
    }
}
