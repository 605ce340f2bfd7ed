use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub(super) listen: ListenSettings,
    pub(super) runtime: RuntimeSettings,
    pub(super) api: ApiSettings,
    pub(super) supabase: SupabaseSettings,
    pub(super) cors: CorsSettings,
    pub(super) database: DatabaseSettings,
    pub(super) telemetry: TelemetrySettings,
}

#[derive(Debug, Clone)]
pub(crate) struct ListenSettings {
    pub(super) host: ServerHost,
    pub(super) port: ServerPort,
}

/// What `/` reports and where the routers are mounted.
#[derive(Debug, Clone)]
pub(crate) struct ApiSettings {
    pub(crate) project_name: String,
    pub(crate) version: String,
    pub(crate) api_prefix: String,
}

/// Hosted-database project keys. The anon key is handed to browser clients;
/// the service-role key guards the admin routes.
#[derive(Debug, Clone)]
pub(crate) struct SupabaseSettings {
    pub(crate) url: Option<String>,
    pub(crate) anon_key: Option<String>,
    pub(crate) service_role_key: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct CorsSettings {
    pub(crate) origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct DatabaseSettings {
    pub(super) url: String,
    /// True when `url` was assembled from `POSTGRES_*` parts with an empty password.
    pub(super) passwordless: bool,
    pub(crate) max_connections: u32,
}

#[derive(Debug, Clone)]
pub(crate) struct TelemetrySettings {
    pub(crate) log_level: String,
    pub(crate) json: bool,
    pub(crate) prometheus_enabled: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct RuntimeSettings {
    pub(crate) environment: Environment,
    pub(crate) strict_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "dev" | "development" | "local" => Ok(Self::Development),
            "test" | "testing" => Ok(Self::Test),
            "prod" | "production" => Ok(Self::Production),
            _ => Err(ConfigError::InvalidValue { field: "PORTAL_ENV", value: value.to_string() }),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ServerHost(pub(super) String);

#[derive(Debug, Clone, Copy)]
pub(crate) struct ServerPort(pub(super) u16);

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("PORTAL_HOST must not be blank")]
    InvalidHost,
    #[error("PORTAL_PORT must be a port between 1 and 65535, got {0:?}")]
    InvalidPort(String),
    #[error("{field} has an unusable value {value:?}")]
    InvalidValue { field: &'static str, value: String },
    #[error("BACKEND_CORS_ORIGINS is not a JSON list or comma-separated origins: {0}")]
    InvalidCors(String),
    #[error("{0} must be set when strict config is on")]
    MissingSecret(&'static str),
}
