use std::net::SocketAddr;
use std::path::PathBuf;

use chrono_tz::Tz;

use crate::engine::grouping::DEFAULT_OFFSET_DISTANCE;
use crate::model::DEFAULT_ROUTE_COLOR;
use crate::render::RenderSettings;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{name} has an invalid value \"{value}\"")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub routes_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub log_dir: PathBuf,
    pub timezone: Tz,
    pub offset_distance: f64,
    pub default_color: String,
}

fn parse<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}

impl Config {
    /// Reads the process environment, `.env` included
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::from_lookup(|name| dotenvy::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let offset_distance: f64 = parse(
            "MARKER_OFFSET_DISTANCE",
            var("MARKER_OFFSET_DISTANCE", &DEFAULT_OFFSET_DISTANCE.to_string()),
        )?;
        if !offset_distance.is_finite() || offset_distance < 0.0 {
            return Err(ConfigError::Invalid {
                name: "MARKER_OFFSET_DISTANCE",
                value: offset_distance.to_string(),
            });
        }

        Ok(Config {
            routes_path: var("ROUTES_PATH", "data/routes.json").into(),
            bind_addr: parse("BIND_ADDR", var("BIND_ADDR", "127.0.0.1:8080"))?,
            log_dir: var("LOG_DIR", "./logs").into(),
            timezone: parse("TIMEZONE", var("TIMEZONE", "Asia/Seoul"))?,
            offset_distance,
            default_color: var("DEFAULT_ROUTE_COLOR", DEFAULT_ROUTE_COLOR),
        })
    }

    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            offset_distance: self.offset_distance,
            default_color: self.default_color.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();

        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();

        assert_eq!(config.routes_path, PathBuf::from("data/routes.json"));
        assert_eq!(config.bind_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.timezone, chrono_tz::Asia::Seoul);
        assert_eq!(config.offset_distance, DEFAULT_OFFSET_DISTANCE);
        assert_eq!(config.default_color, "#667eea");
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("TIMEZONE", "Europe/Zagreb"),
            ("MARKER_OFFSET_DISTANCE", "0.0001"),
            ("BIND_ADDR", "0.0.0.0:3000"),
        ])
        .unwrap();

        assert_eq!(config.timezone, chrono_tz::Europe::Zagreb);
        assert_eq!(config.offset_distance, 0.0001);
        assert_eq!(config.bind_addr.port(), 3000);
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            config(&[("TIMEZONE", "Mars/Olympus")]).unwrap_err(),
            ConfigError::Invalid {
                name: "TIMEZONE",
                value: "Mars/Olympus".to_string()
            }
        );
        assert!(config(&[("MARKER_OFFSET_DISTANCE", "-1")]).is_err());
        assert!(config(&[("BIND_ADDR", "localhost")]).is_err());
    }
}
