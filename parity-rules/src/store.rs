use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::RuleError;

/// Key of the JSON array listing the rule sets to load.
pub const RULE_SET_LIST_KEY: &str = "ruleSets/RuleSets.json";

/// Key of the rule-set document for `rule_set_id`.
pub fn rule_set_key(rule_set_id: &str) -> String {
    format!("ruleSets/{}/Rules.json", rule_set_id)
}

/// Key of an evaluator configuration blob inside a rule set.
pub fn evaluator_config_key(rule_set_id: &str, config_key: &str) -> String {
    format!("ruleSets/{}/{}", rule_set_id, config_key)
}

/// Kind of configuration being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigType {
    RuleSetList,
    RuleSet,
    EvaluatorConfig,
}

/// Source of rule configuration documents addressed by string keys.
pub trait ConfigStore: Send + Sync {
    fn get_value(&self, key: &str, config_type: ConfigType) -> Result<String, RuleError>;
}

impl<T: ConfigStore + ?Sized> ConfigStore for Arc<T> {
    fn get_value(&self, key: &str, config_type: ConfigType) -> Result<String, RuleError> {
        (**self).get_value(key, config_type)
    }
}

/// In-memory config store, mostly used by tests and embedders.
#[derive(Default, Clone)]
pub struct MemoryConfigStore {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with_value(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.write().insert(key.into(), value.into());
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.read().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get_value(&self, key: &str, _config_type: ConfigType) -> Result<String, RuleError> {
        self.inner
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| RuleError::MissingConfig {
                key: key.to_string(),
            })
    }
}

/// Config store backed by a directory; keys are relative paths under the root.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    root: PathBuf,
}

impl FileConfigStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, RuleError> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_)));
        if escapes || key.is_empty() {
            return Err(RuleError::parse_error(
                key,
                "key must be a relative path inside the config root",
            ));
        }
        Ok(self.root.join(relative))
    }
}

impl ConfigStore for FileConfigStore {
    fn get_value(&self, key: &str, config_type: ConfigType) -> Result<String, RuleError> {
        let path = self.resolve(key)?;
        debug!(key, ?config_type, path = %path.display(), "reading configuration");
        fs::read_to_string(&path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => RuleError::MissingConfig {
                key: key.to_string(),
            },
            _ => RuleError::from_io(&path, err),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_conventional_keys() {
        assert_eq!(rule_set_key("global"), "ruleSets/global/Rules.json");
        assert_eq!(
            evaluator_config_key("global", "VmSize.json"),
            "ruleSets/global/VmSize.json"
        );
    }

    #[test]
    fn memory_store_returns_inserted_values() {
        let store = MemoryConfigStore::new().with_value(RULE_SET_LIST_KEY, "[\"a\"]");
        assert_eq!(
            store
                .get_value(RULE_SET_LIST_KEY, ConfigType::RuleSetList)
                .unwrap(),
            "[\"a\"]"
        );
        assert!(matches!(
            store.get_value("missing", ConfigType::RuleSet),
            Err(RuleError::MissingConfig { .. })
        ));
    }

    #[test]
    fn file_store_reads_nested_keys() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("ruleSets/core")).unwrap();
        fs::write(dir.path().join("ruleSets/core/Rules.json"), "{\"rules\":[]}").unwrap();

        let store = FileConfigStore::new(dir.path());
        let raw = store
            .get_value(&rule_set_key("core"), ConfigType::RuleSet)
            .unwrap();
        assert_eq!(raw, "{\"rules\":[]}");

        assert!(matches!(
            store.get_value(&rule_set_key("other"), ConfigType::RuleSet),
            Err(RuleError::MissingConfig { .. })
        ));
    }

    #[test]
    fn file_store_rejects_escaping_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::new(dir.path());
        assert!(matches!(
            store.get_value("../secrets.json", ConfigType::EvaluatorConfig),
            Err(RuleError::Parse { .. })
        ));
        assert!(store
            .get_value("/etc/passwd", ConfigType::EvaluatorConfig)
            .is_err());
    }
}
