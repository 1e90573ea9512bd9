pub mod error;
pub mod settings;

pub use error::*;
pub use settings::*;

use std::path::PathBuf;

/// Locate an idlestop config file
///
/// Search order:
/// 1. `IDLESTOP_CONFIG_PATH` (must exist when set)
/// 2. Current directory: `idlestop.yaml`, `.idlestop.yaml`
/// 3. `~/.config/idlestop/config.yaml`
///
/// Returns `Ok(None)` when nothing is found; the built-in defaults apply.
pub fn find_config_file() -> Result<Option<PathBuf>> {
    if let Ok(config_path) = std::env::var("IDLESTOP_CONFIG_PATH") {
        let path = PathBuf::from(&config_path);
        if path.is_file() {
            return Ok(Some(path));
        }
        return Err(ConfigError::ConfigFileNotFound(config_path));
    }

    let current_dir = std::env::current_dir()?;
    for filename in ["idlestop.yaml", ".idlestop.yaml"] {
        let path = current_dir.join(filename);
        if path.is_file() {
            return Ok(Some(path));
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("idlestop").join("config.yaml");
        if global_config.is_file() {
            return Ok(Some(global_config));
        }
    }

    Ok(None)
}

/// Load effective settings: config file (if any), then env overrides, then validation
pub fn load_settings() -> Result<Settings> {
    let mut settings = match find_config_file()? {
        Some(path) => {
            tracing::debug!("Loading settings from {}", path.display());
            Settings::from_file(&path)?
        }
        None => {
            tracing::debug!("No config file found, using built-in settings");
            Settings::default()
        }
    };

    settings.apply_env_overrides();
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    #[serial]
    fn test_find_config_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        fs::write(temp_dir.path().join("idlestop.yaml"), "region: eu-west-1\n").unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();
        let result = temp_env::with_var_unset("IDLESTOP_CONFIG_PATH", find_config_file);
        std::env::set_current_dir(original_dir).unwrap();

        assert!(result.unwrap().unwrap().ends_with("idlestop.yaml"));
    }

    #[test]
    #[serial]
    fn test_visible_file_has_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        fs::write(temp_dir.path().join("idlestop.yaml"), "# visible").unwrap();
        fs::write(temp_dir.path().join(".idlestop.yaml"), "# hidden").unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();
        let result = temp_env::with_var_unset("IDLESTOP_CONFIG_PATH", find_config_file);
        std::env::set_current_dir(original_dir).unwrap();

        let path = result.unwrap().unwrap();
        assert_eq!(path.file_name().unwrap(), "idlestop.yaml");
    }

    #[test]
    #[serial]
    fn test_env_path_must_exist() {
        let result = temp_env::with_var(
            "IDLESTOP_CONFIG_PATH",
            Some("/nonexistent/idlestop.yaml"),
            find_config_file,
        );

        assert!(matches!(result, Err(ConfigError::ConfigFileNotFound(_))));
    }

    #[test]
    #[serial]
    fn test_load_settings_from_env_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("custom.yaml");
        fs::write(
            &config_path,
            "target_tag:\n  key: Team\n  value: qa\nschedule:\n  stop_at: '18:30'\n",
        )
        .unwrap();

        let settings = temp_env::with_vars(
            [
                ("IDLESTOP_CONFIG_PATH", Some(config_path.to_str().unwrap())),
                ("IDLESTOP_REGION", None),
                ("IDLESTOP_SLACK_WEBHOOK_URL", None),
                ("IDLESTOP_DISCORD_WEBHOOK_URL", Some("https://discord.example/hook")),
            ],
            load_settings,
        )
        .unwrap();

        assert_eq!(settings.target_tag, TagSetting::new("Team", "qa"));
        assert_eq!(settings.schedule.stop_at, TriggerTime::new(18, 30).unwrap());
        assert_eq!(settings.region, DEFAULT_REGION);
        assert!(settings.notifications.discord.enabled);
    }

    #[test]
    #[serial]
    fn test_load_settings_rejects_invalid_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("bad.yaml");
        fs::write(&config_path, "sampling:\n  period_secs: 45\n").unwrap();

        let result = temp_env::with_var(
            "IDLESTOP_CONFIG_PATH",
            Some(config_path.to_str().unwrap()),
            load_settings,
        );

        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
