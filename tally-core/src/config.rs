//! # Configuration Module
//!
//! Loads tally settings from `tally.toml` and `TALLY_*` environment variables.
//!
//! ## Configuration Loading Flow (block diagram)
//!
//! ```text
//! +-------------------+     +-------------------+     +-------------------+
//! | TALLY_CONFIG env  | --> | Path resolution   | --> | tally.toml file   |
//! | (optional)        |     | or default ./     |     | (optional)        |
//! +-------------------+     +-------------------+     +-------------------+
//!                                                              |
//!                                                              v
//! +-------------------+     +-------------------+     +-------------------+
//! | .env / env vars   | --> | TALLY_* overrides | --> | Config struct     |
//! | (dotenv)          |     |                   |     | get_config()      |
//! +-------------------+     +-------------------+     +-------------------+
//! ```
//!
//! ## Config File Location
//!
//! 1. If `TALLY_CONFIG` is set, the file at that path is loaded and must exist
//! 2. Otherwise `tally.toml` in the current directory is loaded, if present
//!
//! ## Configuration Structure
//!
//! ```toml
//! # Timeout of a test whose definition does not set one.
//! default_timeout = "200ms"
//! # auto | always | never
//! color = "auto"
//! ```
//!
//! `TALLY_DEFAULT_TIMEOUT` and `TALLY_COLOR` take precedence over the file.

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::{io::Read, path::Path, str::FromStr, time::Duration};
use tracing::*;

use crate::{Error, Result};

/// Environment variable name for specifying the config file path.
const TALLY_CONFIG_ENV: &str = "TALLY_CONFIG";
const TALLY_DEFAULT_TIMEOUT_ENV: &str = "TALLY_DEFAULT_TIMEOUT";
const TALLY_COLOR_ENV: &str = "TALLY_COLOR";

/// Timeout applied when neither the definition nor the configuration sets one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(200);

static CONFIG: Lazy<Config> = Lazy::new(|| {
    let _ = dotenv::dotenv();
    Config::load().unwrap_or_else(|e| {
        error!("{e}, falling back to the default configuration");
        Config::default()
    })
});

/// Process-wide configuration, loaded on first access.
pub fn get_config() -> &'static Config {
    &CONFIG
}

/// When console output is styled.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Color {
    /// Styled when the terminal supports it.
    #[default]
    Auto,
    Always,
    Never,
}

impl Color {
    /// Applies the choice to everything rendered through `console`.
    pub fn apply(self) {
        match self {
            Color::Auto => {}
            Color::Always => {
                console::set_colors_enabled(true);
                console::set_colors_enabled_stderr(true);
            }
            Color::Never => {
                console::set_colors_enabled(false);
                console::set_colors_enabled_stderr(false);
            }
        }
    }
}

/// tally's configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub default_timeout: Duration,
    #[serde(default)]
    pub color: Color,
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_timeout: DEFAULT_TIMEOUT,
            color: Color::default(),
        }
    }
}

impl Config {
    /// Load tally configuration from path. A missing file yields the defaults.
    fn load_from(path: &Path) -> Result<Config> {
        let Ok(mut file) = std::fs::File::open(path) else {
            let mut cfg = Config::default();
            cfg.load_env()?;
            return Ok(cfg);
        };

        let mut buf = String::new();
        file.read_to_string(&mut buf)
            .map_err(|e| Error::LoadError(e.to_string()))?;

        let mut cfg: Config = toml::from_str(&buf).map_err(|e| {
            Error::LoadError(format!(
                "failed to deserialize tally.toml into tally::Config: {e}"
            ))
        })?;
        debug!("tally.toml was successfully loaded: {cfg:#?}");

        cfg.load_env()?;
        Ok(cfg)
    }

    /// Load tally configuration.
    ///
    /// Loading order:
    /// 1. If `TALLY_CONFIG` env var is set, load from that path
    /// 2. Otherwise, load from `tally.toml` in the current directory
    fn load() -> Result<Config> {
        match std::env::var(TALLY_CONFIG_ENV) {
            Ok(path) => {
                let path = Path::new(&path);

                if path.extension().is_none_or(|ext| ext != "toml")
                    && !path.to_string_lossy().contains(std::path::MAIN_SEPARATOR)
                    && !path.to_string_lossy().contains('/')
                {
                    return Err(Error::LoadError(format!(
                        "{TALLY_CONFIG_ENV} should be a path to a config file, not a config value. \
                         Got: {path:?}. Use TALLY_<KEY>=value for config values instead."
                    )));
                }

                if !path.exists() {
                    return Err(Error::LoadError(format!(
                        "Config file specified by {TALLY_CONFIG_ENV} not found: {path:?}"
                    )));
                }

                debug!("Loading config from {TALLY_CONFIG_ENV}={path:?}");
                Config::load_from(path)
            }
            Err(_) => Config::load_from(Path::new("tally.toml")),
        }
    }

    /// Overrides file settings with `TALLY_DEFAULT_TIMEOUT` and `TALLY_COLOR`.
    fn load_env(&mut self) -> Result<()> {
        if let Ok(value) = std::env::var(TALLY_DEFAULT_TIMEOUT_ENV) {
            self.default_timeout = humantime_serde::re::humantime::parse_duration(&value)
                .map_err(|e| {
                    Error::ValueError(format!("{TALLY_DEFAULT_TIMEOUT_ENV}={value:?}: {e}"))
                })?;
        }
        if let Ok(value) = std::env::var(TALLY_COLOR_ENV) {
            self.color = Color::from_str(&value)
                .map_err(|e| Error::ValueError(format!("{TALLY_COLOR_ENV}={value:?}: {e}")))?;
        }
        debug!("tally configuration loaded from env: {self:?}");
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serial_test::serial;
    use test_case::test_case;

    fn sample_path() -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../tally-sample.toml")
    }

    /// Runs `f` with `key` set. The global config is loaded beforehand so it
    /// never observes the temporary value.
    fn with_env<T>(key: &str, value: &str, f: impl FnOnce() -> T) -> T {
        let _ = get_config();
        std::env::set_var(key, value);
        let result = f();
        std::env::remove_var(key);
        result
    }

    #[test]
    #[serial]
    fn load_config() -> eyre::Result<()> {
        let cfg = Config::load_from(&sample_path())?;
        assert_eq!(cfg.default_timeout, Duration::from_millis(500));
        assert_eq!(cfg.color, Color::Never);
        Ok(())
    }

    #[test]
    #[serial]
    fn missing_file_yields_defaults() -> eyre::Result<()> {
        let cfg = Config::load_from(Path::new("/nonexistent/tally.toml"))?;
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.default_timeout, DEFAULT_TIMEOUT);
        Ok(())
    }

    #[test_case("1s" => Duration::from_secs(1); "seconds")]
    #[test_case("750ms" => Duration::from_millis(750); "millis")]
    #[test_case("1m 30s" => Duration::from_secs(90); "compound")]
    #[serial]
    fn default_timeout_from_env(value: &str) -> Duration {
        with_env(TALLY_DEFAULT_TIMEOUT_ENV, value, || {
            Config::load_from(&sample_path())
        })
        .unwrap()
        .default_timeout
    }

    #[test_case("always" => Color::Always; "always")]
    #[test_case("never" => Color::Never; "never")]
    #[test_case("auto" => Color::Auto; "auto")]
    #[serial]
    fn color_from_env(value: &str) -> Color {
        with_env(TALLY_COLOR_ENV, value, || Config::load_from(&sample_path()))
            .unwrap()
            .color
    }

    #[test]
    #[serial]
    fn invalid_env_value() {
        let result = with_env(TALLY_DEFAULT_TIMEOUT_ENV, "soon", || {
            Config::load_from(&sample_path())
        });

        assert!(matches!(result, Err(Error::ValueError(_))));
    }

    #[test]
    fn invalid_toml() {
        let result: std::result::Result<Config, _> = toml::from_str("default_timeout = 12");
        assert!(result.is_err());
    }

    mod tally_config_env {
        use super::{sample_path, with_env, Config, Error, TALLY_CONFIG_ENV};
        use serial_test::serial;
        use test_case::test_case;

        #[test]
        #[serial]
        fn load_from_tally_config_env() {
            let path = sample_path();
            let cfg = with_env(TALLY_CONFIG_ENV, path.to_str().unwrap(), Config::load).unwrap();

            assert_eq!(cfg.default_timeout.as_millis(), 500);
        }

        #[test]
        #[serial]
        fn error_when_file_not_found() {
            let result = with_env(TALLY_CONFIG_ENV, "/nonexistent/path/tally.toml", Config::load);

            let err = result.unwrap_err();
            assert!(matches!(err, Error::LoadError(_)));
            assert!(err.to_string().contains("not found"), "{err}");
        }

        #[test_case("true"; "boolean value")]
        #[test_case("123"; "numeric value")]
        #[test_case("some_value"; "string value")]
        #[serial]
        fn error_when_value_looks_like_config_value(value: &str) {
            let result = with_env(TALLY_CONFIG_ENV, value, Config::load);

            let err = result.unwrap_err().to_string();
            assert!(err.contains("should be a path"), "{err}");
        }
    }
}
