use dashmap::DashMap;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::sync::Arc;

use crate::error::{FlowError, Result};

/// Key/value scratch space shared by the tasks of one graph execution.
///
/// Values are stored as JSON so tasks only need to agree on key names and
/// serde shapes. Cloning is cheap and clones observe the same data.
#[derive(Clone, Debug, Default)]
pub struct Context {
    data: Arc<DashMap<String, Value>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: impl Into<String>, value: impl Serialize) -> Result<()> {
        let key = key.into();
        let value = serde_json::to_value(value)
            .map_err(|e| FlowError::ContextError(format!("cannot serialize '{key}': {e}")))?;
        self.data.insert(key, value);
        Ok(())
    }

    /// Returns `None` when the key is absent or holds a value of another shape.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Like [`Context::get`] but reports a missing key as a [`FlowError::ContextError`].
    pub fn require<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        self.get(key)
            .ok_or_else(|| FlowError::ContextError(format!("{key} not found in context")))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.data.remove(key).map(|(_, v)| v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_data() {
        let context = Context::new();
        let other = context.clone();
        context.set("count", 3u32).unwrap();

        assert_eq!(other.get::<u32>("count"), Some(3));
        assert!(other.contains("count"));
    }

    #[test]
    fn wrong_shape_reads_as_missing() {
        let context = Context::new();
        context.set("name", "feedback").unwrap();

        assert_eq!(context.get::<u32>("name"), None);
        assert!(matches!(
            context.require::<u32>("name"),
            Err(FlowError::ContextError(_))
        ));
    }

    #[test]
    fn remove_returns_raw_value() {
        let context = Context::new();
        context.set("flag", true).unwrap();

        assert_eq!(context.remove("flag"), Some(Value::Bool(true)));
        assert!(!context.contains("flag"));
    }
}
