use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_NAME: &str = "scratch";
pub const DEFAULT_PROMPT: &str = ">> ";

/// Settings read from `config.toml`. Command-line flags take precedence.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Spreadsheet name.
    pub name: Option<String>,
    /// Shell prompt shown when stdin is a terminal.
    pub prompt: Option<String>,
    /// Dump file replayed at startup when `--load` is not given.
    pub autoload: Option<PathBuf>,
}

pub(crate) fn default_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("me", "shoryuken", "sheetcalc")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}

pub(crate) fn parse_config(content: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(content)
}

/// Load the config file, falling back to defaults.
/// Problems are returned as warnings rather than errors.
pub fn load_config(config_file: Option<&Path>) -> (Config, Vec<String>) {
    let mut warnings = Vec::new();
    let Some(path) = config_file.map(Path::to_path_buf).or_else(default_config_path) else {
        return (Config::default(), warnings);
    };

    if !path.exists() {
        if config_file.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        return (Config::default(), warnings);
    }

    let config = match std::fs::read_to_string(&path) {
        Ok(content) => match parse_config(&content) {
            Ok(config) => {
                log::debug!("loaded config from {}", path.display());
                config
            }
            Err(err) => {
                warnings.push(format!("Failed to parse {}: {}", path.display(), err));
                Config::default()
            }
        },
        Err(err) => {
            warnings.push(format!("Failed to read {}: {}", path.display(), err));
            Config::default()
        }
    };
    (config, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_path_is_deterministic() {
        // Should never panic and should either be Some(path) or None.
        let _ = default_config_path();
    }

    #[test]
    fn parse_full_config() {
        let config = parse_config(
            r#"
            name = "budget"
            prompt = "$ "
            autoload = "budget.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.name.as_deref(), Some("budget"));
        assert_eq!(config.prompt.as_deref(), Some("$ "));
        assert_eq!(config.autoload, Some(PathBuf::from("budget.json")));
    }

    #[test]
    fn parse_empty_config_is_default() {
        assert_eq!(parse_config("").unwrap(), Config::default());
    }

    #[test]
    fn parse_rejects_unknown_keys() {
        assert!(parse_config("colour = \"red\"").is_err());
    }

    #[test]
    fn missing_explicit_config_warns() {
        let (config, warnings) = load_config(Some(Path::new("/definitely/not/here.toml")));
        assert_eq!(config, Config::default());
        assert_eq!(warnings.len(), 1);
    }
}
