//! [`Config`]-related definitions.

use std::time;

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use rust_decimal::Decimal;
use serde::Deserialize;
use smart_default::SmartDefault;
use uuid::Uuid;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: Server,

    /// Service configuration.
    pub service: Service,

    /// Dataset to seed the in-memory database with on startup.
    pub seed: Seed,

    /// Log configuration.
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to bind the server to.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to bind the server to.
    #[default(8080)]
    pub port: u16,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// List of allowed origins.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

/// Service configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Service {
    /// Profit rate (in percents) applied to the financed amount of a
    /// `Contract`.
    #[default(Decimal::TEN)]
    pub profit_rate: Decimal,

    /// Delay between a `Contract` creation and its first installment.
    #[default(time::Duration::from_secs(60 * 60 * 24 * 30))]
    #[serde(with = "humantime_serde")]
    pub first_payment_delay: time::Duration,

    /// Validity period of a `Quote` when the requesting customer doesn't
    /// provide one.
    #[default(time::Duration::from_secs(60 * 60 * 24 * 7))]
    #[serde(with = "humantime_serde")]
    pub default_quote_validity: time::Duration,
}

/// Dataset to seed the in-memory database with on startup.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Seed {
    /// `User`s to seed.
    pub users: Vec<User>,

    /// `Vehicle`s to seed.
    pub vehicles: Vec<Vehicle>,
}

/// `User` to seed the in-memory database with.
#[derive(Clone, Debug, Deserialize)]
pub struct User {
    /// ID of the `User`.
    pub id: Uuid,

    /// Name of the `User`.
    pub name: String,

    /// Role of the `User` (e.g. `CUSTOMER` or `SERVICE_PROVIDER`).
    pub role: String,
}

/// `Vehicle` to seed the in-memory database with.
#[derive(Clone, Debug, Deserialize)]
pub struct Vehicle {
    /// ID of the `Vehicle`.
    pub id: Uuid,

    /// ID of the `User` supplying the `Vehicle`.
    pub provider_id: Uuid,

    /// Make of the `Vehicle`.
    pub make: String,

    /// Model of the `Vehicle`.
    pub model: String,

    /// Production year of the `Vehicle`.
    pub year: u16,

    /// Price of the `Vehicle` (e.g. `85000SAR`).
    pub price: String,
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}
