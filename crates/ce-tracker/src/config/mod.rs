use std::env;
use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::compliance::{CatalogError, ProfileCatalog};

/// Distinguishes runtime behavior for different stages of the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub evaluation: EvaluationSettings,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let profiles_path = env::var("CE_PROFILES_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let as_of = match env::var("CE_AS_OF") {
            Ok(value) if !value.trim().is_empty() => Some(
                NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
                    .map_err(|source| ConfigError::InvalidAsOf { value, source })?,
            ),
            _ => None,
        };

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            evaluation: EvaluationSettings {
                profiles_path,
                as_of,
            },
        })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where profile rules come from and which date reports are evaluated on.
#[derive(Debug, Clone, Default)]
pub struct EvaluationSettings {
    pub profiles_path: Option<PathBuf>,
    pub as_of: Option<NaiveDate>,
}

impl EvaluationSettings {
    /// Standard catalog, overlaid with the configured profile table if any.
    pub fn catalog(&self) -> Result<ProfileCatalog, CatalogError> {
        match &self.profiles_path {
            Some(path) => ProfileCatalog::from_path(path),
            None => Ok(ProfileCatalog::standard()),
        }
    }

    pub fn as_of_or(&self, today: NaiveDate) -> NaiveDate {
        self.as_of.unwrap_or(today)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidAsOf {
        value: String,
        source: chrono::ParseError,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidAsOf { value, .. } => {
                write!(f, "CE_AS_OF must be a YYYY-MM-DD date (found '{value}')")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidAsOf { source, .. } => Some(source),
        }
    }
}
