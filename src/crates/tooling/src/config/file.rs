//! Loading configuration from a file, auto-detecting YAML/JSON by extension.

use serde::de::DeserializeOwned;
use std::path::Path;

use crate::{Result, ToolingError};

/// Load configuration from a YAML file.
pub fn load_yaml_config<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let content = std::fs::read_to_string(path.as_ref())?;
    serde_yaml::from_str(&content)
        .map_err(|e| ToolingError::General(format!("failed to parse YAML config from {:?}: {e}", path.as_ref())))
}

/// Load configuration from a JSON file.
pub fn load_json_config<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let content = std::fs::read_to_string(path.as_ref())?;
    serde_json::from_str(&content).map_err(ToolingError::Serialization)
}

/// Load configuration from a file, auto-detecting the format from its
/// extension (`.yaml`/`.yml` or `.json`).
pub fn load_config_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| ToolingError::General(format!("unable to determine file extension for {path:?}")))?;

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => load_yaml_config(path),
        "json" => load_json_config(path),
        other => Err(ToolingError::General(format!("unsupported config file extension: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;

    #[derive(Debug, Deserialize, PartialEq)]
    struct TestConfig {
        name: String,
        port: u16,
    }

    fn write_temp(suffix: &str, contents: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("tooling-config-test-{}-{suffix}", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_yaml_by_extension() {
        let path = write_temp("case.yaml", "name: demo\nport: 9090\n");
        let config: TestConfig = load_config_file(&path).unwrap();
        assert_eq!(config, TestConfig { name: "demo".to_string(), port: 9090 });
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn loads_json_by_extension() {
        let path = write_temp("case.json", r#"{"name": "demo", "port": 9090}"#);
        let config: TestConfig = load_config_file(&path).unwrap();
        assert_eq!(config, TestConfig { name: "demo".to_string(), port: 9090 });
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn rejects_unsupported_extension() {
        let path = write_temp("case.toml", "name = \"demo\"\n");
        let result: Result<TestConfig> = load_config_file(&path);
        assert!(result.is_err());
        std::fs::remove_file(path).ok();
    }
}
