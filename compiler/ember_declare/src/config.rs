//! Declaration stage configuration.

/// Default prefix of runtime entry points (`emberAlloc`, `emberPanic`, ...).
pub const DEFAULT_RUNTIME_PREFIX: &str = "ember";

/// Name of the canonical box-info table for class objects.
pub const OBJECTS_BOX_INFO: &str = "box_info_objects";

/// Settings for one compilation's declaration stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclareConfig {
    /// Prefix prepended to every runtime entry point name.
    pub runtime_prefix: String,
    /// Symbol of the canonical objects box-info table.
    pub objects_box_info: String,
    /// Log the declared module at `debug` level after each package.
    pub debug_decls: bool,
}

impl Default for DeclareConfig {
    fn default() -> Self {
        Self {
            runtime_prefix: DEFAULT_RUNTIME_PREFIX.to_owned(),
            objects_box_info: OBJECTS_BOX_INFO.to_owned(),
            debug_decls: false,
        }
    }
}

impl DeclareConfig {
    /// Read overrides from the environment.
    ///
    /// - `EMBER_RUNTIME_PREFIX`: runtime symbol prefix (ignored when empty)
    /// - `EMBER_DEBUG_DECLS`: `1` or `true` enables the module dump
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(prefix) = lookup("EMBER_RUNTIME_PREFIX").filter(|p| !p.is_empty()) {
            config.runtime_prefix = prefix;
        }
        if let Some(flag) = lookup("EMBER_DEBUG_DECLS") {
            config.debug_decls = matches!(flag.trim(), "1" | "true" | "yes");
        }
        config
    }

    #[must_use]
    pub fn with_runtime_prefix(mut self, prefix: &str) -> Self {
        self.runtime_prefix = prefix.to_owned();
        self
    }

    /// Full symbol of a runtime entry point, e.g. `emberAlloc`.
    pub fn runtime_symbol(&self, entry: &str) -> String {
        format!("{}{entry}", self.runtime_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let config = DeclareConfig::default();
        assert_eq!(config.runtime_symbol("Alloc"), "emberAlloc");
        assert_eq!(config.objects_box_info, "box_info_objects");
        assert!(!config.debug_decls);
    }

    #[test]
    fn lookup_overrides() {
        let config = DeclareConfig::from_lookup(|key| match key {
            "EMBER_RUNTIME_PREFIX" => Some("ejc".to_owned()),
            "EMBER_DEBUG_DECLS" => Some("1".to_owned()),
            _ => None,
        });
        assert_eq!(config.runtime_symbol("Panic"), "ejcPanic");
        assert!(config.debug_decls);
    }

    #[test]
    fn empty_prefix_is_ignored() {
        let config = DeclareConfig::from_lookup(|key| {
            (key == "EMBER_RUNTIME_PREFIX").then(String::new)
        });
        assert_eq!(config.runtime_prefix, DEFAULT_RUNTIME_PREFIX);
    }
}
