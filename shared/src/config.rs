use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_TABLE_NAME: &str = "Tasks";

/// Routes whose authentication check can be switched back to the legacy
/// always-authorized behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatedRoute {
    /// `GET /task/{id}`
    GetTask,
    /// `PUT /task/{id}/volunteer`
    Volunteer,
}

impl FromStr for GatedRoute {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "get_task" => Ok(Self::GetTask),
            "volunteer" => Ok(Self::Volunteer),
            other => Err(ConfigError::UnknownRoute(other.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown route in AUTH_BYPASS_ROUTES: {0}")]
    UnknownRoute(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub table_name: String,
    pub auth_bypass_routes: Vec<GatedRoute>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            auth_bypass_routes: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup (the process environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let table_name = lookup("TABLE_NAME")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TABLE_NAME.to_string());

        let auth_bypass_routes = lookup("AUTH_BYPASS_ROUTES")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(GatedRoute::from_str)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            table_name,
            auth_bypass_routes,
        })
    }

    pub fn with_auth_bypass(mut self, route: GatedRoute) -> Self {
        self.auth_bypass_routes.push(route);
        self
    }

    pub fn bypasses_auth(&self, route: GatedRoute) -> bool {
        self.auth_bypass_routes.contains(&route)
    }
}
