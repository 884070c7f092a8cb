//! Configuration for a CLI run.
//!
//! The TOML file is looked up in this order:
//! 1. the `--config` path, which must exist
//! 2. `stratum/config.toml` in the working directory
//! 3. `config.toml` in the platform configuration directory
//!
//! Without a file the defaults apply. Command-line overrides are applied on
//! top and the result is checked before any model is read.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use stratum::{StratumError, config::AppConfig};

use crate::Args;

const LOCAL_CONFIG: &str = "stratum/config.toml";

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for StratumError {
    fn from(err: ConfigError) -> Self {
        StratumError::Io(io::Error::other(err.to_string()))
    }
}

/// Builds the configuration for `args`.
///
/// # Errors
///
/// Returns error if:
/// - `--config` names a file that doesn't exist
/// - the configuration file cannot be read or parsed
/// - a layout or graph value is out of range
pub fn load_config(args: &Args) -> Result<AppConfig, StratumError> {
    let mut config = match locate(args.config.as_deref())? {
        Some(path) => {
            info!(path = path.display().to_string(); "Loading configuration");
            read_config_file(&path)?
        }
        None => {
            debug!("No configuration file found, using default configuration");
            AppConfig::default()
        }
    };

    if let Some(algorithm) = &args.algorithm {
        info!(algorithm = algorithm.as_str(); "Layout algorithm set on the command line");
        config.layout.algorithm = Some(algorithm.clone());
    }

    validate(&config)?;

    debug!(
        algorithm:? = config.layout.algorithm,
        direction:? = config.layout.direction,
        containment:? = config.graph.containment(),
        implicit_relationships = config.parser.implicit_relationships();
        "Configuration ready"
    );
    Ok(config)
}

/// Path of the configuration file to read, if any.
fn locate(explicit: Option<&str>) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = explicit {
        let path = PathBuf::from(path);
        if !path.exists() {
            return Err(ConfigError::MissingFile(path));
        }
        return Ok(Some(path));
    }

    let local = PathBuf::from(LOCAL_CONFIG);
    if local.exists() {
        return Ok(Some(local));
    }

    let Some(proj_dirs) = ProjectDirs::from("com", "stratum", "stratum") else {
        debug!("Could not determine platform-specific config directory");
        return Ok(None);
    };
    let system_config = proj_dirs.config_dir().join("config.toml");
    if system_config.exists() {
        return Ok(Some(system_config));
    }
    debug!(path = system_config.display().to_string(); "System configuration file not found");
    Ok(None)
}

fn read_config_file(path: &Path) -> Result<AppConfig, StratumError> {
    let content = fs::read_to_string(path)?;
    let config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })?;
    Ok(config)
}

/// Rejects values no engine can work with.
fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    let layout = &config.layout;

    for (key, value) in [
        ("spacing", layout.spacing),
        ("layer_spacing", layout.layer_spacing),
    ] {
        if let Some(value) = value {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "layout.{key} must be a non-negative number, got {value}"
                )));
            }
        }
    }
    if let Some(ratio) = layout.aspect_ratio {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "layout.aspect_ratio must be positive, got {ratio}"
            )));
        }
    }
    if layout.iterations == Some(0) {
        return Err(ConfigError::Invalid(
            "layout.iterations must be at least 1".to_string(),
        ));
    }
    if layout
        .algorithm
        .as_deref()
        .is_some_and(|name| name.trim().is_empty())
    {
        return Err(ConfigError::Invalid(
            "layout.algorithm must not be empty".to_string(),
        ));
    }
    if config
        .graph
        .containment()
        .iter()
        .any(|tag| tag.trim().is_empty())
    {
        return Err(ConfigError::Invalid(
            "graph.containment must not contain empty type tags".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use stratum::{
        layout::{Direction, EdgeRouting},
        model::RelationshipKind,
    };

    use super::*;

    fn args(config: Option<&Path>) -> Args {
        Args {
            input: "model.json".to_string(),
            output: None,
            config: config.map(|path| path.to_string_lossy().to_string()),
            algorithm: None,
            log_level: "off".to_string(),
        }
    }

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("config.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
[layout]
algorithm = "stress"
direction = "RIGHT"
edgeRouting = "orthogonal"
spacing = 30.0
unknown = "ignored"

[graph]
containment = ["composition", "deployed-to"]

[parser]
implicit_relationships = false
"#,
        );

        let config = load_config(&args(Some(&path))).unwrap();

        assert_eq!(config.layout.algorithm.as_deref(), Some("stress"));
        assert_eq!(config.layout.direction, Some(Direction::Right));
        assert_eq!(config.layout.edge_routing, Some(EdgeRouting::Orthogonal));
        assert_eq!(config.layout.spacing, Some(30.0));
        assert_eq!(
            config.graph.containment_kinds(),
            vec![RelationshipKind::Composition, RelationshipKind::DeployedTo]
        );
        assert!(!config.parser.implicit_relationships());
    }

    #[test]
    fn test_command_line_algorithm_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "[layout]\nalgorithm = \"stress\"\n");
        let mut args = args(Some(&path));
        args.algorithm = Some("tree".to_string());

        let config = load_config(&args).unwrap();

        assert_eq!(config.layout.algorithm.as_deref(), Some("tree"));
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&args(Some(&dir.path().join("nope.toml")))).unwrap_err();
        assert!(err.to_string().contains("Missing configuration file"));
    }

    #[test]
    fn test_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "[layout\nalgorithm = ");

        let err = load_config(&args(Some(&path))).unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML"));
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let dir = tempfile::tempdir().unwrap();
        for (content, key) in [
            ("[layout]\nspacing = -5.0\n", "layout.spacing"),
            ("[layout]\nlayerSpacing = -1.0\n", "layout.layer_spacing"),
            ("[layout]\naspectRatio = 0.0\n", "layout.aspect_ratio"),
            ("[layout]\niterations = 0\n", "layout.iterations"),
            ("[graph]\ncontainment = [\"\"]\n", "graph.containment"),
        ] {
            let path = write_config(dir.path(), content);
            let err = load_config(&args(Some(&path))).unwrap_err();
            assert!(err.to_string().contains(key), "{content}: {err}");
        }
    }

    #[test]
    fn test_empty_algorithm_override_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "");
        let mut args = args(Some(&path));
        args.algorithm = Some("  ".to_string());

        assert!(load_config(&args).is_err());
    }
}
