//! Mock server configuration.
//!
//! A [`ServerConfig`] is built from defaults and may be overlaid with an
//! injected JSON object supplied by an external test driver. Injected keys
//! take precedence; keys the injection does not mention keep their base value.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Latency applied to intercepted requests outside the test environment.
pub const DEFAULT_TIMING_MS: u64 = 400;

/// Setting naming the upstream that passthrough requests are forwarded to.
pub const URL_PREFIX_SETTING: &str = "urlPrefix";

/// Network-simulation toggle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Responses are delayed by [`ServerConfig::timing`].
    #[default]
    Development,
    /// Responses are immediate.
    Test,
}

/// Options the mock server is constructed with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Which network behavior to simulate.
    pub environment: Environment,

    /// Simulated latency in milliseconds (ignored in [`Environment::Test`]).
    pub timing: u64,

    /// Log every handled request at `info` instead of `debug`.
    pub logging: bool,

    /// Any other settings, kept verbatim and not validated.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            timing: DEFAULT_TIMING_MS,
            logging: false,
            extra: Map::new(),
        }
    }
}

impl ServerConfig {
    /// Configuration for tests: no simulated latency.
    pub fn test() -> Self {
        Self {
            environment: Environment::Test,
            ..Self::default()
        }
    }

    /// Overlay an injected configuration object onto this one.
    ///
    /// This is a shallow spread: each top-level key of `injected` replaces the
    /// key of the same name. If the result is not a valid configuration the
    /// injection is ignored and a copy of `self` is returned.
    pub fn overlay(&self, injected: &Map<String, Value>) -> Self {
        let mut merged = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };

        for (key, value) in injected {
            merged.insert(key.clone(), value.clone());
        }

        match serde_json::from_value(Value::Object(merged)) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(error = %err, "ignoring injected server configuration");
                self.clone()
            }
        }
    }

    /// Delay applied before answering an intercepted request.
    pub fn latency(&self) -> Duration {
        match self.environment {
            Environment::Test => Duration::ZERO,
            Environment::Development => Duration::from_millis(self.timing),
        }
    }

    /// Look up a pass-through setting by name.
    pub fn setting(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Upstream origin for passthrough requests, if configured.
    pub fn url_prefix(&self) -> Option<&str> {
        self.setting(URL_PREFIX_SETTING)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|prefix| !prefix.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected a JSON object"),
        }
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.timing, DEFAULT_TIMING_MS);
        assert!(!config.logging);
        assert_eq!(config.latency(), Duration::from_millis(DEFAULT_TIMING_MS));
    }

    #[test]
    fn test_config_has_no_latency_in_test_environment() {
        let config = ServerConfig {
            timing: 2_000,
            ..ServerConfig::test()
        };
        assert_eq!(config.latency(), Duration::ZERO);
    }

    #[test]
    fn test_empty_object_deserializes_to_defaults() {
        let config: ServerConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_overlay_injected_keys_take_precedence() {
        let base = ServerConfig::test();
        let merged = base.overlay(&object(json!({ "timing": 25, "logging": true })));

        assert_eq!(merged.timing, 25);
        assert!(merged.logging);
        // Not mentioned by the injection, so inherited.
        assert_eq!(merged.environment, Environment::Test);
    }

    #[test]
    fn test_overlay_keeps_unknown_settings() {
        let mut base = ServerConfig::test();
        base.extra.insert("trackRequests".to_string(), json!(false));

        let merged = base.overlay(&object(json!({ "urlPrefix": "http://localhost:4200" })));

        assert_eq!(merged.setting("trackRequests"), Some(&json!(false)));
        assert_eq!(
            merged.setting("urlPrefix"),
            Some(&json!("http://localhost:4200"))
        );
    }

    #[test]
    fn test_overlay_empty_injection_is_identity() {
        let base = ServerConfig::default();
        assert_eq!(base.overlay(&Map::new()), base);
    }

    #[test]
    fn test_overlay_ignores_malformed_injection() {
        let base = ServerConfig::test();
        let merged = base.overlay(&object(json!({ "environment": "staging" })));
        assert_eq!(merged, base);
    }

    #[test]
    fn test_url_prefix() {
        let mut config = ServerConfig::test();
        assert_eq!(config.url_prefix(), None);

        config.extra.insert(URL_PREFIX_SETTING.to_string(), json!(42));
        assert_eq!(config.url_prefix(), None);

        config.extra.insert(URL_PREFIX_SETTING.to_string(), json!("http://localhost:4200"));
        assert_eq!(config.url_prefix(), Some("http://localhost:4200"));
    }
}
