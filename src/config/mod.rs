use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub events: EventRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Scheduling windows applied to event dates.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct EventRules {
    /// Minimum gap between an admin edit/publication and the event start.
    pub admin_lead_minutes: i64,
    /// Minimum gap between organizer creation/edit and the event start.
    pub organizer_lead_minutes: i64,
}

impl EventRules {
    pub fn admin_lead(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.admin_lead_minutes)
    }

    pub fn organizer_lead(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.organizer_lead_minutes)
    }
}

impl Default for EventRules {
    fn default() -> Self {
        Self {
            admin_lead_minutes: 60,
            organizer_lead_minutes: 120,
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.url", "sqlite://evently.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("events.admin_lead_minutes", 60)?
            .set_default("events.organizer_lead_minutes", 120)?

            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Add environment variables (with EVENTLY__ prefix, double underscore separates levels)
            .add_source(Environment::with_prefix("EVENTLY").separator("__"))

            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "sqlite://evently.db?mode=rwc".to_string(),
                max_connections: 10,
            },
            events: EventRules::default(),
        }
    }
}
