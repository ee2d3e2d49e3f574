//! TOML configuration layer (§9.4): a persisted `RobustValueIteration` run
//! description, with individual fields overridable by CLI flags. Mirrors the
//! flags-layered-over-a-persisted-file approach this codebase's install/
//! config subsystem uses, without inheriting any of that subsystem's
//! power-system-specific fields.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// A config file's contents. Every field is optional so a config can set
/// only the values a caller wants to pin, leaving the rest to CLI flags or
/// their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SolveConfig {
    pub algorithm: Option<String>,
    pub threads: Option<usize>,
    pub synthesize: Option<bool>,
}

impl SolveConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    /// CLI-flag values win over the config file's; the config file's win
    /// over the built-in defaults.
    pub fn merge_algorithm(&self, cli_value: Option<String>) -> String {
        cli_value
            .or_else(|| self.algorithm.clone())
            .unwrap_or_else(|| "o-maximization".to_string())
    }

    pub fn merge_threads(&self, cli_value: Option<usize>) -> usize {
        cli_value.or(self.threads).unwrap_or_else(num_cpus::get)
    }

    pub fn merge_synthesize(&self, cli_value: bool) -> bool {
        cli_value || self.synthesize.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flag_overrides_config_file_value() {
        let cfg = SolveConfig {
            algorithm: Some("vertex-enumeration".to_string()),
            threads: None,
            synthesize: None,
        };
        assert_eq!(cfg.merge_algorithm(Some("o-maximization".to_string())), "o-maximization");
        assert_eq!(cfg.merge_algorithm(None), "vertex-enumeration");
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let cfg = SolveConfig::default();
        assert_eq!(cfg.merge_algorithm(None), "o-maximization");
        assert!(cfg.merge_threads(None) >= 1);
    }
}
