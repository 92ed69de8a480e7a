//! Lock-guarded snapshot-replace cell for stage configuration.
//!
//! Readers take an `Arc` snapshot and never hold the lock while working.
//! Writers patch a clone through serde and swap it in under the write lock.

use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;

use super::StageConfig;
use crate::errors::ConfigError;

/// Runtime-updatable configuration shared between `execute` and admin updates.
#[derive(Debug)]
pub struct LiveConfig<T> {
    stage: &'static str,
    current: RwLock<Arc<T>>,
}

impl<T: StageConfig> LiveConfig<T> {
    pub fn new(stage: &'static str, config: T) -> Self {
        Self {
            stage,
            current: RwLock::new(Arc::new(config)),
        }
    }

    /// Current configuration. Later updates do not affect the returned value.
    pub fn snapshot(&self) -> Arc<T> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Serialized view of the current configuration.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self.snapshot().as_ref()).unwrap_or(Value::Null)
    }

    /// Set a single parameter. The write lock is held across the
    /// read-modify-write so concurrent patches cannot lose each other.
    pub fn patch(&self, param: &str, value: Value) -> Result<(), ConfigError> {
        if T::READ_ONLY.contains(&param) {
            return Err(ConfigError::ReadOnlyParam {
                stage: self.stage.to_string(),
                param: param.to_string(),
            });
        }

        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let mut fields = match serde_json::to_value(guard.as_ref()) {
            Ok(Value::Object(fields)) => fields,
            Ok(_) | Err(_) => {
                return Err(self.invalid(param, "configuration is not a table".to_string()))
            }
        };

        if !fields.contains_key(param) {
            return Err(ConfigError::UnknownParam {
                stage: self.stage.to_string(),
                param: param.to_string(),
            });
        }
        fields.insert(param.to_string(), value);

        let updated: T = serde_json::from_value(Value::Object(fields))
            .map_err(|e| self.invalid(param, e.to_string()))?;
        updated
            .validate()
            .map_err(|reason| self.invalid(param, reason))?;

        *guard = Arc::new(updated);
        Ok(())
    }

    fn invalid(&self, param: &str, reason: String) -> ConfigError {
        ConfigError::InvalidValue {
            stage: self.stage.to_string(),
            param: param.to_string(),
            reason,
        }
    }
}
