use crate::error::{FaultlineError, Result};
use dashmap::DashMap;
use std::env;
use std::sync::Arc;

/// Key holding the process-wide debug toggle.
pub const DEBUG_KEY: &str = "DEBUG";

/// Configuration service
///
/// A shared snapshot of string settings, loaded from the process environment.
#[derive(Clone, Default)]
pub struct ConfigService {
    config: Arc<DashMap<String, String>>,
}

impl ConfigService {
    pub fn new() -> Self {
        let service = Self::default();
        for (key, value) in env::vars() {
            service.set(&key, &value);
        }
        service
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.config.get(key).map(|v| v.clone())
    }

    pub fn set(&self, key: &str, value: &str) {
        self.config.insert(key.to_string(), value.to_string());
    }

    /// Read a boolean setting.
    ///
    /// Accepts `true/false`, `1/0`, `yes/no` and `on/off` in any case.
    /// Returns `Ok(None)` when the key is absent.
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        let Some(raw) = self.get(key) else {
            return Ok(None);
        };

        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(FaultlineError::invalid_config(key, raw)),
        }
    }

    /// Whether raw exception text may be exposed in error responses.
    pub fn debug(&self) -> Result<bool> {
        Ok(self.get_bool(DEBUG_KEY)?.unwrap_or(false))
    }
}
