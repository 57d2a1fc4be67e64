//! Environment snapshot: environment variables plus system properties.
//!
//! Detection and extraction are pure functions over an [`EnvSnapshot`], so a
//! test builds the exact environment it needs instead of mutating the process
//! environment.

use std::collections::{BTreeMap, HashMap};

/// Immutable view of the environment the build runs in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
    properties: BTreeMap<String, String>,
}

impl EnvSnapshot {
    /// Start an empty snapshot.
    pub fn builder() -> EnvSnapshotBuilder {
        EnvSnapshotBuilder::default()
    }

    /// Capture the current process environment.
    ///
    /// System properties are derived from the host: `os.name` is set from the
    /// compile-target OS. Extra properties (for example `-D` flags) are merged
    /// on top and win over derived ones.
    pub fn from_process<I, K, V>(extra_properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars = std::env::vars_os()
            .map(|(k, v)| {
                (
                    k.to_string_lossy().into_owned(),
                    v.to_string_lossy().into_owned(),
                )
            })
            .collect();

        let mut properties = BTreeMap::new();
        properties.insert("os.name".to_string(), os_name(std::env::consts::OS));
        for (k, v) in extra_properties {
            properties.insert(k.into(), v.into());
        }

        Self { vars, properties }
    }

    /// Environment variable by exact, case-sensitive name.
    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn has_var(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// System property by exact name.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    /// System property keys starting with `prefix`, in sorted order.
    pub fn property_keys_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.properties
            .range(prefix.to_string()..)
            .map(|(k, _)| k.as_str())
            .take_while(move |k| k.starts_with(prefix))
    }
}

/// Builder for [`EnvSnapshot`].
#[derive(Debug, Default)]
pub struct EnvSnapshotBuilder {
    snapshot: EnvSnapshot,
}

impl EnvSnapshotBuilder {
    pub fn var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.snapshot.vars.insert(name.into(), value.into());
        self
    }

    pub fn property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.snapshot.properties.insert(name.into(), value.into());
        self
    }

    pub fn build(self) -> EnvSnapshot {
        self.snapshot
    }
}

/// Map a Rust target OS name to the JVM-style `os.name` value.
fn os_name(target_os: &str) -> String {
    match target_os {
        "linux" => "Linux".to_string(),
        "macos" => "Mac OS X".to_string(),
        "windows" => "Windows".to_string(),
        "freebsd" => "FreeBSD".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_sensitive() {
        let env = EnvSnapshot::builder().var("bamboo_resultsUrl", "u").build();
        assert_eq!(env.var("bamboo_resultsUrl"), Some("u"));
        assert_eq!(env.var("BAMBOO_RESULTSURL"), None);
    }

    #[test]
    fn test_empty_value_is_present() {
        let env = EnvSnapshot::builder().var("CI", "").build();
        assert!(env.has_var("CI"));
        assert_eq!(env.var("CI"), Some(""));
    }

    #[test]
    fn test_property_prefix_enumeration() {
        let env = EnvSnapshot::builder()
            .property("idea.version.major", "2024")
            .property("idea.home", "/opt/idea")
            .property("java.version", "21")
            .property("idea.versionx", "1")
            .build();
        let keys: Vec<_> = env.property_keys_with_prefix("idea.version").collect();
        assert_eq!(keys, vec!["idea.version.major", "idea.versionx"]);
    }

    #[test]
    fn test_from_process_sets_os_name() {
        let env = EnvSnapshot::from_process(Vec::<(String, String)>::new());
        assert!(env.property("os.name").is_some());
    }

    #[test]
    fn test_from_process_extra_properties_win() {
        let env = EnvSnapshot::from_process([("os.name", "Plan 9"), ("CI", "true")]);
        assert_eq!(env.property("os.name"), Some("Plan 9"));
        assert_eq!(env.property("CI"), Some("true"));
    }

    #[test]
    fn test_os_name_mapping() {
        assert_eq!(os_name("linux"), "Linux");
        assert_eq!(os_name("macos"), "Mac OS X");
        assert_eq!(os_name("haiku"), "haiku");
    }
}
