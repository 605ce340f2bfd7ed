use super::parsing::{api_prefix, cors_origins, Env};
use super::types::{
    ApiSettings, ConfigError, CorsSettings, DatabaseSettings, Environment, ListenSettings,
    RuntimeSettings, ServerHost, ServerPort, Settings, SupabaseSettings, TelemetrySettings,
};

impl Settings {
    /// Reads settings from the environment. Production, or `PORTAL_STRICT_CONFIG=1`,
    /// refuses to start without a database password and a service-role key.
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let env = Env;

        let environment: Environment =
            env.get("PORTAL_ENV").or_else(|| env.get("ENVIRONMENT")).unwrap_or_default().parse()?;
        let strict_config =
            env.flag("PORTAL_STRICT_CONFIG") || environment == Environment::Production;

        let settings = Self {
            listen: ListenSettings {
                host: ServerHost::parse(env.get_or("PORTAL_HOST", "0.0.0.0"))?,
                port: ServerPort::parse(env.get_or("PORTAL_PORT", "8000"))?,
            },
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings {
                project_name: env.get_or("PROJECT_NAME", "School Portal API"),
                version: env.get_or("VERSION", env!("CARGO_PKG_VERSION")),
                api_prefix: api_prefix(&env.get_or("API_PREFIX", "/api")),
            },
            supabase: SupabaseSettings {
                url: env.get("SUPABASE_URL"),
                anon_key: env.get("SUPABASE_ANON_KEY"),
                service_role_key: env.get("SUPABASE_SERVICE_ROLE_KEY"),
            },
            cors: CorsSettings { origins: cors_origins(env.get("BACKEND_CORS_ORIGINS"))? },
            database: DatabaseSettings::from_env(&env)?,
            telemetry: TelemetrySettings {
                log_level: env.get_or("PORTAL_LOG_LEVEL", "info"),
                json: env.flag("PORTAL_LOG_JSON"),
                prometheus_enabled: env.flag("PROMETHEUS_ENABLED"),
            },
        };

        settings.check_strict()?;
        Ok(settings)
    }

    pub(crate) fn server_addr(&self) -> String {
        format!("{}:{}", self.listen.host.0, self.listen.port.0)
    }

    pub(crate) fn server_host(&self) -> &str {
        &self.listen.host.0
    }

    pub(crate) fn server_port(&self) -> u16 {
        self.listen.port.0
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn supabase(&self) -> &SupabaseSettings {
        &self.supabase
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn check_strict(&self) -> Result<(), ConfigError> {
        if !self.runtime.strict_config {
            return Ok(());
        }
        if self.database.passwordless {
            return Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"));
        }
        if self.supabase.service_role_key.is_none() {
            return Err(ConfigError::MissingSecret("SUPABASE_SERVICE_ROLE_KEY"));
        }
        Ok(())
    }
}

impl DatabaseSettings {
    /// `DATABASE_URL` wins; otherwise the URL is assembled from `POSTGRES_*`.
    fn from_env(env: &Env) -> Result<Self, ConfigError> {
        let max_connections = env.number("DB_MAX_CONNECTIONS", 20u32)?;
        if max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                field: "DB_MAX_CONNECTIONS",
                value: "0".to_string(),
            });
        }

        if let Some(url) = env.get("DATABASE_URL") {
            return Ok(Self { url, passwordless: false, max_connections });
        }

        let password = env.get_or("POSTGRES_PASSWORD", "");
        let url = format!(
            "postgresql://{user}:{password}@{host}:{port}/{db}",
            user = env.get_or("POSTGRES_USER", "portal"),
            host = env.get_or("POSTGRES_SERVER", "localhost"),
            port = env.number("POSTGRES_PORT", 5432u16)?,
            db = env.get_or("POSTGRES_DB", "school_portal"),
        );
        Ok(Self { url, passwordless: password.is_empty(), max_connections })
    }

    pub(crate) fn database_url(&self) -> &str {
        &self.url
    }
}

impl ServerHost {
    fn parse(value: String) -> Result<Self, ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::InvalidHost);
        }
        Ok(Self(value))
    }
}

impl ServerPort {
    fn parse(value: String) -> Result<Self, ConfigError> {
        match value.parse::<u16>() {
            Ok(port) if port > 0 => Ok(Self(port)),
            _ => Err(ConfigError::InvalidPort(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    fn clear_env() {
        for key in [
            "PORTAL_ENV",
            "ENVIRONMENT",
            "PORTAL_STRICT_CONFIG",
            "PORTAL_PORT",
            "API_PREFIX",
            "DATABASE_URL",
            "POSTGRES_PASSWORD",
            "SUPABASE_SERVICE_ROLE_KEY",
            "DB_MAX_CONNECTIONS",
        ] {
            std::env::remove_var(key);
        }
    }

    #[tokio::test]
    async fn defaults_load_in_development() {
        let _guard = test_support::env_lock().await;
        clear_env();

        let settings = Settings::load().expect("settings");
        assert_eq!(settings.api().api_prefix, "/api");
        assert_eq!(settings.server_port(), 8000);
        assert!(!settings.runtime().strict_config);
        assert!(settings.supabase().service_role_key.is_none());
        assert_eq!(
            settings.database().database_url(),
            "postgresql://portal:@localhost:5432/school_portal"
        );
    }

    #[tokio::test]
    async fn production_requires_secrets() {
        let _guard = test_support::env_lock().await;
        clear_env();
        std::env::set_var("PORTAL_ENV", "production");

        let result = Settings::load();
        assert!(matches!(result, Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"))));

        std::env::set_var("DATABASE_URL", "postgresql://u:p@db/portal");
        let result = Settings::load();
        assert!(matches!(result, Err(ConfigError::MissingSecret("SUPABASE_SERVICE_ROLE_KEY"))));

        std::env::set_var("SUPABASE_SERVICE_ROLE_KEY", "service-key");
        let settings = Settings::load().expect("settings");
        assert!(settings.runtime().strict_config);
        clear_env();
    }

    #[tokio::test]
    async fn rejects_invalid_port() {
        let _guard = test_support::env_lock().await;
        clear_env();
        std::env::set_var("PORTAL_PORT", "0");

        assert!(matches!(Settings::load(), Err(ConfigError::InvalidPort(_))));
        clear_env();
    }

    #[tokio::test]
    async fn environment_names() {
        let _guard = test_support::env_lock().await;
        clear_env();

        std::env::set_var("PORTAL_ENV", "Testing");
        let settings = Settings::load().expect("settings");
        assert_eq!(settings.runtime().environment, Environment::Test);

        std::env::set_var("PORTAL_ENV", "staging");
        assert!(matches!(
            Settings::load(),
            Err(ConfigError::InvalidValue { field: "PORTAL_ENV", .. })
        ));
        clear_env();
    }
}
