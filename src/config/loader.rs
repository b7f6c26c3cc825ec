//! Configuration loader with file resolution and environment override support.

use super::error::{ConfigError, ConfigResult};
use super::schema::Config;
use std::path::{Path, PathBuf};

/// Environment variable prefix for overrides
const ENV_PREFIX: &str = "DUT_CONSOLE";

/// Config file name
const CONFIG_FILE_NAME: &str = "dut-console.toml";

/// Environment variable for explicit config path
const CONFIG_PATH_ENV: &str = "DUT_CONSOLE_CONFIG";

/// Configuration loader with resolution and override logic.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Resolved config file path (if any)
    pub config_path: Option<PathBuf>,
    /// The loaded configuration
    pub config: Config,
}

impl ConfigLoader {
    /// Load configuration using standard resolution order.
    ///
    /// Resolution priority (highest to lowest):
    /// 1. `DUT_CONSOLE_CONFIG` environment variable (explicit path)
    /// 2. `./dut-console.toml` (current directory)
    /// 3. `~/.config/dut-console/dut-console.toml` (XDG on Linux/macOS)
    /// 4. `%APPDATA%\dut-console\dut-console.toml` (Windows)
    /// 5. Built-in defaults (no file required)
    ///
    /// Environment variables can override any config file values.
    pub fn load() -> ConfigResult<Self> {
        let config_path = resolve_config_path();

        let mut config = if let Some(ref path) = config_path {
            load_from_file(path)?
        } else {
            Config::default()
        };

        apply_env_overrides(&mut config)?;

        Ok(Self { config_path, config })
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut config = load_from_file(&path)?;
        apply_env_overrides(&mut config)?;

        Ok(Self {
            config_path: Some(path),
            config,
        })
    }

    /// Create a loader with default configuration (no file).
    pub fn with_defaults() -> Self {
        let mut config = Config::default();
        // Env overrides apply even without a file.
        let _ = apply_env_overrides(&mut config);

        Self {
            config_path: None,
            config,
        }
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> Config {
        self.config
    }

    /// Save the current configuration to a specific file.
    pub fn save_to(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        save_to_file(&self.config, path.as_ref())
    }
}

/// Resolve the configuration file path using standard locations.
pub fn resolve_config_path() -> Option<PathBuf> {
    // 1. Explicit environment variable
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. Current directory
    let cwd_config = PathBuf::from(CONFIG_FILE_NAME);
    if cwd_config.exists() {
        return Some(cwd_config);
    }

    // 3. XDG config directory (Linux/macOS) or APPDATA (Windows)
    if let Some(config_dir) = get_config_dir() {
        let app_config = config_dir.join("dut-console").join(CONFIG_FILE_NAME);
        if app_config.exists() {
            return Some(app_config);
        }
    }

    // 4. No config file found - will use defaults
    None
}

/// Get the platform-specific config directory.
fn get_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA").ok().map(PathBuf::from)
    }

    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var("HOME")
                    .ok()
                    .map(|h| PathBuf::from(h).join(".config"))
            })
    }
}

/// Load configuration from a file.
fn load_from_file(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&content).map_err(ConfigError::ParseError)
}

/// Save configuration to a file.
fn save_to_file(config: &Config, path: &Path) -> ConfigResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|e| ConfigError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Apply environment variable overrides to the configuration.
///
/// Variables follow the pattern `DUT_CONSOLE_<SECTION>_<KEY>`, e.g.:
/// - `DUT_CONSOLE_CONSOLE_BAUD=74880`
/// - `DUT_CONSOLE_EXPECT_WINDOW_MS=60000`
/// - `DUT_CONSOLE_TARGET_PORT=/dev/ttyUSB1`
///
/// The ESP-IDF convention variables `ESPPORT` and `ESPBAUD` are honored as
/// fallbacks for the target port and console baud.
fn apply_env_overrides(config: &mut Config) -> ConfigResult<()> {
    // Console overrides
    if let Ok(val) =
        std::env::var(format!("{}_CONSOLE_BAUD", ENV_PREFIX)).or_else(|_| std::env::var("ESPBAUD"))
    {
        config.console.baud = val.parse().map_err(|_| {
            ConfigError::env_parse(
                format!("{}_CONSOLE_BAUD or ESPBAUD", ENV_PREFIX),
                "Invalid baud rate",
            )
        })?;
    }
    if let Ok(val) = std::env::var(format!("{}_CONSOLE_READ_TIMEOUT_MS", ENV_PREFIX)) {
        config.console.read_timeout_ms = val.parse().map_err(|_| {
            ConfigError::env_parse(
                format!("{}_CONSOLE_READ_TIMEOUT_MS", ENV_PREFIX),
                "Invalid timeout",
            )
        })?;
    }

    // Expect overrides
    if let Ok(val) = std::env::var(format!("{}_EXPECT_WINDOW_MS", ENV_PREFIX)) {
        config.expect.window_ms = val.parse().map_err(|_| {
            ConfigError::env_parse(
                format!("{}_EXPECT_WINDOW_MS", ENV_PREFIX),
                "Invalid window",
            )
        })?;
    }

    // Target overrides
    if let Ok(val) =
        std::env::var(format!("{}_TARGET_PORT", ENV_PREFIX)).or_else(|_| std::env::var("ESPPORT"))
    {
        config.target.port = Some(val);
    }
    if let Ok(val) = std::env::var(format!("{}_TARGET_NAME", ENV_PREFIX)) {
        config.target.name = Some(val.parse().map_err(|e: String| {
            ConfigError::env_parse(format!("{}_TARGET_NAME", ENV_PREFIX), e)
        })?);
    }

    // Logging overrides
    if let Ok(val) = std::env::var(format!("{}_LOG_LEVEL", ENV_PREFIX)) {
        config.logging.level = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    #[test]
    #[serial]
    fn test_default_loader() {
        env::remove_var("DUT_CONSOLE_CONSOLE_BAUD");
        env::remove_var("ESPBAUD");
        let loader = ConfigLoader::with_defaults();
        assert_eq!(loader.config().console.baud, 115_200);
    }

    #[test]
    #[serial]
    fn test_env_override() {
        env::set_var("DUT_CONSOLE_EXPECT_WINDOW_MS", "5000");

        let loader = ConfigLoader::with_defaults();
        assert_eq!(loader.config().expect.window_ms, 5000);

        env::remove_var("DUT_CONSOLE_EXPECT_WINDOW_MS");
    }

    #[test]
    #[serial]
    fn test_espport_espbaud_fallbacks() {
        env::set_var("ESPPORT", "/dev/ttyACM3");
        env::set_var("ESPBAUD", "74880");

        let loader = ConfigLoader::with_defaults();
        assert_eq!(loader.config().target.port.as_deref(), Some("/dev/ttyACM3"));
        assert_eq!(loader.config().console.baud, 74_880);

        env::remove_var("ESPPORT");
        env::remove_var("ESPBAUD");
    }

    #[test]
    #[serial]
    fn test_load_from_file_and_save() {
        env::remove_var("ESPPORT");
        env::remove_var("ESPBAUD");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dut-console.toml");
        std::fs::write(
            &path,
            r#"
            [console]
            baud = 921600

            [expect]
            window_ms = 10000
            "#,
        )
        .unwrap();

        let loader = ConfigLoader::load_from(&path).unwrap();
        assert_eq!(loader.config().console.baud, 921_600);
        assert_eq!(loader.config().expect.window_ms, 10_000);

        let saved = dir.path().join("saved.toml");
        loader.save_to(&saved).unwrap();
        let back = ConfigLoader::load_from(&saved).unwrap();
        assert_eq!(back.config().console.baud, 921_600);
    }

    #[test]
    #[serial]
    fn test_bad_env_value_is_an_error() {
        env::set_var("DUT_CONSOLE_EXPECT_WINDOW_MS", "not-a-number");

        let mut config = Config::default();
        let result = apply_env_overrides(&mut config);
        assert!(matches!(result, Err(ConfigError::EnvParseError { .. })));

        env::remove_var("DUT_CONSOLE_EXPECT_WINDOW_MS");
    }
}
