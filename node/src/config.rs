use cobuy_api::ServerConfig;
use cobuy_recommender::RecommenderConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Environment variable overriding `server.listen_addr`
pub const LISTEN_ADDR_ENV: &str = "COBUY_LISTEN_ADDR";

/// Service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Recommendation configuration
    #[serde(default)]
    pub recommender: RecommenderConfig,
}

impl ServiceConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), String> {
        self.server.validate()?;
        self.recommender.validate()?;
        Ok(())
    }

    /// Load from file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ServiceConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save to file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = self.to_toml()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply environment overrides; unparseable values are ignored
    pub fn apply_env(&mut self) {
        if let Some(addr) = std::env::var(LISTEN_ADDR_ENV)
            .ok()
            .and_then(|s| s.parse::<SocketAddr>().ok())
        {
            self.server.listen_addr = addr;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.recommender.neighbors, 3);
        assert_eq!(config.recommender.max_recommendations, 8);
        assert_eq!(config.server.listen_addr.port(), 8000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file() {
        let config: ServiceConfig = toml::from_str(
            r#"
            [recommender]
            max_recommendations = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.recommender.max_recommendations, 4);
        assert_eq!(config.recommender.neighbors, 3);
        assert_eq!(config.server.max_order_items, 1000);
    }

    #[test]
    fn test_empty_file() {
        let config: ServiceConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.listen_addr, ServerConfig::default().listen_addr);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cobuy.toml");

        let mut config = ServiceConfig::default();
        config.server.listen_addr = "127.0.0.1:9100".parse().unwrap();
        config.recommender.neighbors = 5;
        config.save(&path).unwrap();

        let loaded = ServiceConfig::from_file(&path).unwrap();
        assert_eq!(loaded.server.listen_addr, config.server.listen_addr);
        assert_eq!(loaded.recommender, config.recommender);
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[server]\nlisten_addr = 12").unwrap();

        assert!(ServiceConfig::from_file(&path).is_err());
    }

    #[test]
    fn test_validation_rejects_zero_neighbors() {
        let mut config = ServiceConfig::default();
        config.recommender.neighbors = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_override() {
        std::env::set_var(LISTEN_ADDR_ENV, "127.0.0.1:7000");
        let mut config = ServiceConfig::default();
        config.apply_env();
        assert_eq!(config.server.listen_addr, "127.0.0.1:7000".parse::<SocketAddr>().unwrap());

        std::env::set_var(LISTEN_ADDR_ENV, "not an address");
        let mut config = ServiceConfig::default();
        config.apply_env();
        assert_eq!(config.server.listen_addr, ServerConfig::default().listen_addr);

        // Cleanup
        std::env::remove_var(LISTEN_ADDR_ENV);
    }
}
