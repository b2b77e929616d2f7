//! Configuration loader for the CLI. The file is optional JSON; string values
//! written as `$ENV{NAME}` are read from the environment after parsing so a
//! salt never has to be committed next to the pipelines that use it.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::pipeline::presets;
use crate::pipeline::{Pipeline, PipelineError};

pub const CONFIG_ENV: &str = "HASHLAB_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "hashlab.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file unreadable: {0}")]
    Io(String),
    #[error("config parse failed: {0}")]
    Parse(String),
    #[error("environment variable {0} is required but missing")]
    MissingEnvVar(String),
    #[error("pipeline '{name}' is invalid: {source}")]
    InvalidPipeline {
        name: String,
        #[source]
        source: PipelineError,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawHashlabConfig {
    pub salt: Option<String>,
    pub log_level: Option<String>,
    #[serde(default)]
    pub pipelines: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub salt: Option<String>,
    pub log_level: Option<String>,
    pub pipelines: BTreeMap<String, Pipeline>,
}

impl RuntimeConfig {
    pub fn pipeline(&self, name: &str) -> Option<&Pipeline> {
        self.pipelines.get(name)
    }
}

/// Loads and validates a config file. Every named pipeline must resolve
/// against the step catalog.
pub fn load_config(path: impl AsRef<Path>) -> Result<RuntimeConfig, ConfigError> {
    let raw_json = fs::read_to_string(&path).map_err(|e| ConfigError::Io(format!("{e}")))?;
    let raw_config: RawHashlabConfig =
        serde_json::from_str(&raw_json).map_err(|e| ConfigError::Parse(format!("{e}")))?;
    debug!(path = %path.as_ref().display(), pipelines = raw_config.pipelines.len(), "config parsed");
    raw_config.into_runtime()
}

/// Loads `explicit` when given. Otherwise tries `$HASHLAB_CONFIG`, then
/// `hashlab.json` in the working directory, falling back to defaults when
/// neither points at an existing file.
pub fn load_or_default(explicit: Option<&Path>) -> Result<RuntimeConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    if let Ok(path) = env::var(CONFIG_ENV) {
        return load_config(path);
    }
    let default_path = Path::new(DEFAULT_CONFIG_PATH);
    if default_path.exists() {
        return load_config(default_path);
    }
    Ok(RuntimeConfig::default())
}

impl RawHashlabConfig {
    fn into_runtime(self) -> Result<RuntimeConfig, ConfigError> {
        let salt = self.salt.map(expand_env).transpose()?;
        let log_level = self.log_level.map(expand_env).transpose()?;

        let mut pipelines = BTreeMap::new();
        for (name, steps) in self.pipelines {
            let pipeline = Pipeline::from_steps(steps);
            if let Err(source) = pipeline.resolve() {
                return Err(ConfigError::InvalidPipeline { name, source });
            }
            if presets::find(&name).is_some() {
                warn!(%name, "configured pipeline shadows the built-in preset");
            }
            pipelines.insert(name, pipeline);
        }

        Ok(RuntimeConfig {
            salt,
            log_level,
            pipelines,
        })
    }
}

fn expand_env(text: String) -> Result<String, ConfigError> {
    match extract_env_placeholder(&text) {
        Some(var) => env::var(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string())),
        None => Ok(text),
    }
}

fn extract_env_placeholder(text: &str) -> Option<&str> {
    text.strip_prefix("$ENV{")
        .and_then(|rest| rest.strip_suffix('}'))
        .filter(|inner| !inner.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::NamedTempFile;

    fn write_config(payload: serde_json::Value) -> NamedTempFile {
        let file = NamedTempFile::new().expect("temp file");
        fs::write(file.path(), serde_json::to_vec(&payload).unwrap()).unwrap();
        file
    }

    #[test]
    fn loads_pipelines_and_salt() {
        let file = write_config(json!({
            "salt": "pepper",
            "logLevel": "debug",
            "pipelines": {
                "mine": ["charcode_sum", "avalanche", "hex_encode"]
            }
        }));

        let config = load_config(file.path()).expect("config should load");
        assert_eq!(config.salt.as_deref(), Some("pepper"));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.pipeline("mine").map(Pipeline::len), Some(3));
    }

    #[test]
    fn expands_env_placeholders() {
        env::set_var("HASHLAB_TEST_SALT", "from-env");
        let file = write_config(json!({ "salt": "$ENV{HASHLAB_TEST_SALT}" }));
        let config = load_config(file.path()).expect("config should load");
        assert_eq!(config.salt.as_deref(), Some("from-env"));
        assert!(config.pipelines.is_empty());
    }

    #[test]
    fn rejects_missing_env() {
        env::remove_var("HASHLAB_MISSING_SALT");
        let file = write_config(json!({ "salt": "$ENV{HASHLAB_MISSING_SALT}" }));
        match load_config(file.path()).unwrap_err() {
            ConfigError::MissingEnvVar(name) => assert_eq!(name, "HASHLAB_MISSING_SALT"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_pipelines_with_unknown_steps() {
        let file = write_config(json!({ "pipelines": { "bad": ["charcode_sum", "sha1"] } }));
        let err = load_config(file.path()).unwrap_err();
        assert!(format!("{err}").contains("pipeline 'bad' is invalid"));
        assert!(matches!(
            err,
            ConfigError::InvalidPipeline { source: PipelineError::UnknownStep { position: 1, .. }, .. }
        ));
    }

    #[test]
    fn rejects_empty_pipelines() {
        let file = write_config(json!({ "pipelines": { "nothing": [] } }));
        assert!(matches!(
            load_config(file.path()).unwrap_err(),
            ConfigError::InvalidPipeline { source: PipelineError::EmptyPipeline, .. }
        ));
    }

    #[test]
    fn reports_parse_and_io_errors() {
        let file = NamedTempFile::new().expect("temp file");
        fs::write(file.path(), "{ not json").unwrap();
        assert!(matches!(load_config(file.path()).unwrap_err(), ConfigError::Parse(_)));

        let missing = file.path().with_extension("missing");
        assert!(matches!(load_config(&missing).unwrap_err(), ConfigError::Io(_)));
        assert!(matches!(load_or_default(Some(missing.as_path())).unwrap_err(), ConfigError::Io(_)));
    }

    #[test]
    fn placeholder_must_be_whole_value() {
        assert_eq!(extract_env_placeholder("$ENV{SALT}"), Some("SALT"));
        assert_eq!(extract_env_placeholder("$ENV{}"), None);
        assert_eq!(extract_env_placeholder("prefix $ENV{SALT}"), None);
    }
}
