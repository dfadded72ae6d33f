use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WebSocketConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub enabled: bool,
    pub allow_any_origin: bool,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub environment: String,
    pub server: ServerConfig,
    pub websocket: WebSocketConfig,
    pub cors: CorsConfig,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start with default values
            .set_default("environment", "development")?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("websocket.host", "127.0.0.1")?
            .set_default("websocket.port", 8081)?
            .set_default("cors.enabled", true)?
            .set_default("cors.allow_any_origin", true)?
            .set_default("cors.max_age", 3600)?
            // Add in settings from the config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in settings from environment variables (with prefix "APP_")
            // E.g., `APP_SERVER__PORT=5001` would set `Settings.server.port`
            .add_source(
                Environment::with_prefix("app")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?;

        s.try_deserialize()
    }

    #[cfg(test)]
    pub fn new_for_test() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("environment", "test")?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("websocket.host", "127.0.0.1")?
            .set_default("websocket.port", 8081)?
            .set_default("cors.enabled", false)?
            .set_default("cors.allow_any_origin", false)?
            .set_default("cors.max_age", 60)?
            .add_source(
                Environment::with_prefix("app")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn cleanup_env() {
        env::remove_var("APP_ENVIRONMENT");
        env::remove_var("APP_SERVER__HOST");
        env::remove_var("APP_SERVER__PORT");
        env::remove_var("APP_SERVER__WORKERS");
        env::remove_var("APP_WEBSOCKET__HOST");
        env::remove_var("APP_WEBSOCKET__PORT");
        env::remove_var("APP_CORS__ENABLED");
        env::remove_var("APP_CORS__ALLOW_ANY_ORIGIN");
        env::remove_var("APP_CORS__MAX_AGE");
    }

    #[test]
    fn test_settings_defaults() {
        cleanup_env();
        let settings = Settings::new_for_test().expect("Failed to load settings");
        assert_eq!(settings.environment, "test");
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.workers as usize, num_cpus::get());
        assert_eq!(settings.websocket.host, "127.0.0.1");
        assert_eq!(settings.websocket.port, 8081);
        assert!(!settings.cors.enabled);
    }

    #[test]
    fn test_environment_override() {
        cleanup_env();

        // Set environment variables for all required fields
        env::set_var("APP_ENVIRONMENT", "test");
        env::set_var("APP_SERVER__HOST", "127.0.0.1");
        env::set_var("APP_SERVER__PORT", "9000");
        env::set_var("APP_SERVER__WORKERS", "2");
        env::set_var("APP_WEBSOCKET__HOST", "0.0.0.0");
        env::set_var("APP_WEBSOCKET__PORT", "9001");
        env::set_var("APP_CORS__ENABLED", "true");
        env::set_var("APP_CORS__ALLOW_ANY_ORIGIN", "false");
        env::set_var("APP_CORS__MAX_AGE", "120");

        // Create config directly from environment
        let config = Config::builder()
            // Set default values
            .set_default("environment", "test").unwrap()
            .set_default("server.host", "127.0.0.1").unwrap()
            .set_default("server.port", 8080).unwrap()
            .set_default("server.workers", 2).unwrap()
            .set_default("websocket.host", "127.0.0.1").unwrap()
            .set_default("websocket.port", 8081).unwrap()
            .set_default("cors.enabled", false).unwrap()
            .set_default("cors.allow_any_origin", false).unwrap()
            .set_default("cors.max_age", 60).unwrap()
            // Add environment variables last to override defaults
            .add_source(
                Environment::with_prefix("app")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()
            .expect("Failed to build config")
            .try_deserialize::<Settings>()
            .expect("Failed to deserialize settings");

        // Verify overrides
        assert_eq!(config.environment, "test");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.workers, 2);
        assert_eq!(config.websocket.host, "0.0.0.0");
        assert_eq!(config.websocket.port, 9001);
        assert!(config.cors.enabled);
        assert!(!config.cors.allow_any_origin);
        assert_eq!(config.cors.max_age, 120);

        cleanup_env();
    }

    #[test]
    fn test_invalid_port() {
        cleanup_env();

        env::set_var("APP_ENVIRONMENT", "test");
        env::set_var("APP_SERVER__HOST", "127.0.0.1");
        env::set_var("APP_SERVER__PORT", "invalid");
        env::set_var("APP_SERVER__WORKERS", "2");

        // Create config directly from environment
        let result = Config::builder()
            .set_default("environment", "test").unwrap()
            .set_default("server.host", "127.0.0.1").unwrap()
            .set_default("server.port", 8080).unwrap()
            .set_default("server.workers", 2).unwrap()
            .set_default("websocket.host", "127.0.0.1").unwrap()
            .set_default("websocket.port", 8081).unwrap()
            .set_default("cors.enabled", false).unwrap()
            .set_default("cors.allow_any_origin", false).unwrap()
            .set_default("cors.max_age", 60).unwrap()
            .add_source(
                Environment::with_prefix("app")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()
            .and_then(|config| config.try_deserialize::<Settings>());

        assert!(result.is_err(), "Expected error for invalid port");

        if let Err(e) = result {
            let error_message = e.to_string();
            assert!(
                error_message.contains("invalid digit found in string") ||
                error_message.contains("invalid value"),
                "Unexpected error: {}",
                error_message
            );
        }

        cleanup_env();
    }
}
