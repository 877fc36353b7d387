//! Runtime configuration from environment variables.
//!
//! `HOST` / `PORT` pick the listen address (default 0.0.0.0:8080 so the server is
//! reachable on a VPS). `POINTS_WIN`, `POINTS_DRAW` and `POINTS_LOSS` override the
//! league points of every new phase; leave them unset to use each discipline's defaults.

use crate::models::PointsScheme;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub points: Option<PointsScheme>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            points: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Parse an environment variable, falling back to `default` when unset or unparsable.
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the environment, or a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(default_host);
        let port = match lookup("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                var: "PORT".to_string(),
                reason: format!("not a port number: {raw}"),
            })?,
            None => default_port(),
        };

        let points = match (lookup("POINTS_WIN"), lookup("POINTS_DRAW"), lookup("POINTS_LOSS")) {
            (None, None, None) => None,
            (win, draw, loss) => {
                let defaults = PointsScheme::default();
                let parse = |var: &str, raw: Option<String>, default: u32| match raw {
                    Some(raw) => raw.parse::<u32>().map_err(|_| ConfigError::Invalid {
                        var: var.to_string(),
                        reason: format!("not a number: {raw}"),
                    }),
                    None => Ok(default),
                };
                Some(PointsScheme {
                    win: parse("POINTS_WIN", win, defaults.win)?,
                    draw: parse("POINTS_DRAW", draw, defaults.draw)?,
                    loss: parse("POINTS_LOSS", loss, defaults.loss)?,
                })
            }
        };

        let config = Self { host, port, points };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(points) = self.points {
            if points.win <= points.loss {
                return Err(ConfigError::Invalid {
                    var: "POINTS_WIN".to_string(),
                    reason: format!("must exceed POINTS_LOSS ({})", points.loss),
                });
            }
        }
        Ok(())
    }

    /// Log filter for env_logger when `RUST_LOG` is unset.
    pub fn default_log_filter() -> String {
        parse_env_or("LOG_LEVEL", "info".to_string())
    }
}
