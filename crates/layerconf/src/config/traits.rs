use std::io::Write;
use std::time::Duration;

use crate::config::defaults::DEBUG_KEY;
use crate::errors::ConfResult;
use crate::logging::LogConfig;
use crate::store::Value;

/// Typed access to a configuration.
///
/// Implementors provide untyped `get`/`set` plus persistence; the typed
/// accessors are derived from those. Typed getters return the zero value of
/// their type when the key is absent or cannot be coerced.
pub trait Conf: Send + Sync {
    /// Value for `key`, searched from highest to lowest precedence layer.
    fn get(&self, key: &str) -> Option<Value>;

    /// Overwrite `key` in memory. Nothing is persisted until [`Conf::save`].
    fn set(&self, key: &str, value: Value);

    /// Write the merged settings to the save target.
    fn save(&self) -> ConfResult<()>;

    /// Write the merged settings as TOML to `out`.
    fn write(&self, out: &mut dyn Write) -> ConfResult<()>;

    /// Development preset when `debug` is true, production preset otherwise.
    fn log_config(&self) -> LogConfig {
        if self.get_bool(DEBUG_KEY) {
            LogConfig::development()
        } else {
            LogConfig::production()
        }
    }

    fn get_bool(&self, key: &str) -> bool {
        self.get(key)
            .and_then(|v| v.coerce_bool())
            .unwrap_or_default()
    }

    fn get_duration(&self, key: &str) -> Duration {
        self.get(key)
            .and_then(|v| v.coerce_duration())
            .unwrap_or_default()
    }

    fn get_float64(&self, key: &str) -> f64 {
        self.get(key)
            .and_then(|v| v.coerce_float())
            .unwrap_or_default()
    }

    fn get_int(&self, key: &str) -> i64 {
        self.get(key).and_then(|v| v.coerce_int()).unwrap_or_default()
    }

    fn get_int_slice(&self, key: &str) -> Vec<i64> {
        self.get(key)
            .and_then(|v| v.coerce_int_slice())
            .unwrap_or_default()
    }

    fn get_string(&self, key: &str) -> String {
        self.get(key)
            .and_then(|v| v.coerce_string())
            .unwrap_or_default()
    }

    fn get_string_slice(&self, key: &str) -> Vec<String> {
        self.get(key)
            .and_then(|v| v.coerce_string_slice())
            .unwrap_or_default()
    }

    fn set_bool(&self, key: &str, value: bool) {
        self.set(key, Value::Bool(value));
    }

    fn set_duration(&self, key: &str, value: Duration) {
        self.set(key, Value::Duration(value));
    }

    fn set_float64(&self, key: &str, value: f64) {
        self.set(key, Value::Float(value));
    }

    fn set_int(&self, key: &str, value: i64) {
        self.set(key, Value::Integer(value));
    }

    fn set_int_slice(&self, key: &str, value: &[i64]) {
        self.set(key, Value::from(value));
    }

    fn set_string(&self, key: &str, value: &str) {
        self.set(key, Value::from(value));
    }

    fn set_string_slice(&self, key: &str, value: &[String]) {
        self.set(key, Value::from(value));
    }
}
