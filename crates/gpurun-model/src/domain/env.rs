use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Ordered map of environment variables handed to the launched process.
///
/// The launcher composes whole environments (module capture output, runtime
/// environment activation, isolation flags), so this is a map with override
/// semantics rather than a list of per-task deltas. Keys are kept sorted for
/// deterministic iteration, which keeps dry-run output and tests stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvMap(BTreeMap<String, String>);

impl EnvMap {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn from_process() -> Self {
        Self(
            std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Set a variable, replacing any previous value.
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.0.insert(key.into(), value.into());
    }

    /// Prepend a directory to a path-style variable (`:`-separated).
    ///
    /// Creates the variable when absent.
    pub fn prepend_path<K>(&mut self, key: K, dir: &str)
    where
        K: Into<String>,
    {
        let key = key.into();
        match self.0.get(&key) {
            Some(existing) if !existing.is_empty() => {
                let joined = format!("{dir}:{existing}");
                self.0.insert(key, joined);
            }
            _ => {
                self.0.insert(key, dir.to_string());
            }
        }
    }

    /// Merge another environment into this one; entries from `other` win.
    pub fn merge(&mut self, other: &EnvMap) {
        for (k, v) in other.iter() {
            self.0.insert(k.to_string(), v.to_string());
        }
    }

    /// Iterate over all entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for EnvMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::EnvMap;

    #[test]
    fn new_is_empty() {
        let env = EnvMap::new();
        assert!(env.is_empty());
        assert_eq!(env.len(), 0);
        assert!(env.get("PATH").is_none());
    }

    #[test]
    fn set_overrides_previous_value() {
        let mut env = EnvMap::new();
        env.set("FOO", "one");
        env.set("FOO", "two");
        assert_eq!(env.get("FOO"), Some("two"));
        assert_eq!(env.len(), 1);
    }

    #[test]
    fn prepend_path_joins_with_colon() {
        let mut env = EnvMap::new();
        env.set("PATH", "/usr/bin:/bin");
        env.prepend_path("PATH", "/opt/env/bin");
        assert_eq!(env.get("PATH"), Some("/opt/env/bin:/usr/bin:/bin"));
    }

    #[test]
    fn prepend_path_creates_missing_variable() {
        let mut env = EnvMap::new();
        env.prepend_path("PATH", "/opt/env/bin");
        assert_eq!(env.get("PATH"), Some("/opt/env/bin"));

        env.set("EMPTY", "");
        env.prepend_path("EMPTY", "/x");
        assert_eq!(env.get("EMPTY"), Some("/x"));
    }

    #[test]
    fn merge_other_wins() {
        let mut base = EnvMap::new();
        base.set("FOO", "base");
        base.set("BAR", "bar");

        let mut other = EnvMap::new();
        other.set("FOO", "override");
        other.set("BAZ", "baz");

        base.merge(&other);
        assert_eq!(base.get("FOO"), Some("override"));
        assert_eq!(base.get("BAR"), Some("bar"));
        assert_eq!(base.get("BAZ"), Some("baz"));
    }

    #[test]
    fn iteration_is_key_ordered() {
        let mut env = EnvMap::new();
        env.set("B", "2");
        env.set("A", "1");
        env.set("C", "3");

        let keys: Vec<_> = env.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["A", "B", "C"]);
    }

    #[test]
    fn from_process_contains_path() {
        // PATH is set in any reasonable test environment.
        let env = EnvMap::from_process();
        assert!(env.get("PATH").is_some());
    }

    #[test]
    fn serde_transparent_roundtrip() {
        let mut env = EnvMap::new();
        env.set("FOO", "bar");

        let json = serde_json::to_string(&env).unwrap();
        assert_eq!(json, r#"{"FOO":"bar"}"#);

        let back: EnvMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, env);
    }
}
