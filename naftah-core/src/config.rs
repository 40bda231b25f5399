//! Runtime configuration (§6 EXTERNAL INTERFACES "Environment").
//!
//! Mirrors the teacher's `LoggingConfig` shape (`apps/server/src/logging.rs`): a plain
//! struct populated from the environment, passed by reference into the subsystems that
//! need it, with a typed default for every field.

use std::env;

use crate::locale::Locale;

/// Typed view over the `naftah.*` environment configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// `naftah.debug`: emit the token stream produced by the lexer before evaluating.
    pub debug: bool,
    /// `naftah.reflect.active`: enable the host reflection bridge (component E).
    pub reflect_active: bool,
    /// `naftah.reflect.max-depth`: cap on object-to-map conversion depth (cycle guard,
    /// §9 "cyclic object graphs").
    pub reflect_max_depth: usize,
    /// `naftah.locale`: overrides the default Arabic message bundle.
    pub locale: Locale,
    /// `naftah.builtin.classes`: comma-separated host class allowlist.
    pub builtin_classes: Vec<String>,
    /// `naftah.builtin.packages`: comma-separated host package allowlist.
    pub builtin_packages: Vec<String>,
}

impl RuntimeConfig {
    const DEFAULT_REFLECT_MAX_DEPTH: usize = 64;

    pub fn from_env() -> Self {
        Self {
            debug: env_bool("naftah.debug", false),
            reflect_active: env_bool("naftah.reflect.active", false),
            reflect_max_depth: env::var("naftah.reflect.max-depth")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(Self::DEFAULT_REFLECT_MAX_DEPTH),
            locale: env::var("naftah.locale")
                .ok()
                .map(|v| Locale::from_tag(&v))
                .unwrap_or_default(),
            builtin_classes: env_list("naftah.builtin.classes"),
            builtin_packages: env_list("naftah.builtin.packages"),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            debug: false,
            reflect_active: false,
            reflect_max_depth: Self::DEFAULT_REFLECT_MAX_DEPTH,
            locale: Locale::Arabic,
            builtin_classes: Vec::new(),
            builtin_packages: Vec::new(),
        }
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(v) => matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
        Err(_) => default,
    }
}

fn env_list(key: &str) -> Vec<String> {
    env::var(key)
        .ok()
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_conservative() {
        let cfg = RuntimeConfig::default();
        assert!(!cfg.debug);
        assert!(!cfg.reflect_active);
        assert_eq!(cfg.locale, Locale::Arabic);
    }

    #[test]
    fn list_parsing_trims_and_drops_empties() {
        assert_eq!(env_list("NAFTAH_CORE_TEST_NONEXISTENT_VAR"), Vec::<String>::new());
    }
}
