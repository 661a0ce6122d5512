use anyhow::{anyhow, Context, Result};
use ::config::{Config, Environment, File};
use std::path::Path;
use tracing::{debug, info};

use super::settings::AppConfig;

/// Environment prefix for overrides, e.g. `YIELD__FORECAST__SEED=7`
pub const ENV_PREFIX: &str = "YIELD";

/// Load settings from defaults, then `path` if it exists, then the environment.
///
/// A bare `PORT` variable wins over everything else, matching how hosting
/// platforms hand out ports.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    if path.exists() {
        info!("Loading configuration from {}", path.display());
    } else {
        debug!("No configuration file at {}, using defaults", path.display());
    }

    let settings = Config::builder()
        .add_source(Config::try_from(&AppConfig::default())?)
        .add_source(File::from(path).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("failed to read configuration")?;

    let mut app: AppConfig = settings
        .try_deserialize()
        .context("invalid configuration")?;

    apply_port_override(&mut app, std::env::var("PORT").ok())?;

    app.validate().map_err(|errors| anyhow!(errors.join(", ")))?;
    Ok(app)
}

pub fn apply_port_override(app: &mut AppConfig, port: Option<String>) -> Result<()> {
    if let Some(raw) = port {
        let port: u16 = raw
            .trim()
            .parse()
            .with_context(|| format!("PORT must be a port number, got '{}'", raw))?;
        debug!("PORT override: {}", port);
        app.server.port = port;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}.toml", name, std::process::id()));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("ssp-yield-does-not-exist.toml");
        let config = load_config(&path).unwrap();
        assert_eq!(config.forecast, AppConfig::default().forecast);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let path = temp_file(
            "ssp-yield-override",
            r#"
[forecast]
horizon = 14
seed = 7

[forecast.order]
p = 2
d = 1
q = 0
"#,
        );
        let config = load_config(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(config.forecast.horizon, 14);
        assert_eq!(config.forecast.seed, 7);
        assert_eq!(config.forecast.order.p, 2);
        assert_eq!(config.forecast.order.q, 0);
        assert_eq!(config.forecast.history_len, 30);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let path = temp_file("ssp-yield-invalid", "[forecast]\nhorizon = 0\n");
        let result = load_config(&path);
        fs::remove_file(&path).ok();
        assert!(result.is_err());
    }

    #[test]
    fn test_port_override() {
        let mut config = AppConfig::default();
        apply_port_override(&mut config, Some("8080".to_string())).unwrap();
        assert_eq!(config.server.port, 8080);

        apply_port_override(&mut config, None).unwrap();
        assert_eq!(config.server.port, 8080);

        assert!(apply_port_override(&mut config, Some("http".to_string())).is_err());
    }
}
