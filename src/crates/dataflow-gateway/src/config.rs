//! Gateway configuration, loaded the way `tooling::config::ConfigBuilder`
//! implementations elsewhere in the workspace are.

use tooling::config::{get_env_or, get_env_parse_or, ConfigBuilder};
use tooling::Result;

/// Host/port the gateway binds to.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 8080 }
    }
}

impl ConfigBuilder for GatewayConfig {
    fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(tooling::ToolingError::General("gateway host must not be empty".to_string()));
        }
        Ok(())
    }

    fn from_env(prefix: &str) -> Result<Self> {
        Ok(Self {
            host: get_env_or(&format!("{prefix}HOST"), "127.0.0.1")?,
            port: get_env_parse_or(&format!("{prefix}PORT"), 8080u16)?,
        })
    }

    fn merge(&mut self, other: Self) -> &mut Self {
        let defaults = Self::default();
        if other.host != defaults.host {
            self.host = other.host;
        }
        if other.port != defaults.port {
            self.port = other.port;
        }
        self
    }
}

impl GatewayConfig {
    /// The address to bind, as `host:port`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_binds_localhost_8080() {
        let config = GatewayConfig::default();
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn merge_keeps_non_default_values_and_only_fills_gaps_from_defaults() {
        let mut from_env = GatewayConfig { host: "0.0.0.0".to_string(), port: 9090 };
        from_env.merge(GatewayConfig::default());
        assert_eq!(from_env.host, "0.0.0.0");
        assert_eq!(from_env.port, 9090);
    }

    #[test]
    fn merge_fills_default_looking_fields_from_other() {
        let mut base = GatewayConfig::default();
        base.merge(GatewayConfig { host: "0.0.0.0".to_string(), port: 9090 });
        assert_eq!(base.host, "0.0.0.0");
        assert_eq!(base.port, 9090);
    }
}
