//! Workflow configuration
//!
//! Loaded from a TOML file. Every section has defaults, so a missing file or
//! a partial file is valid. A malformed file is reported as [`ConfigError`];
//! [`AugmentConfig::load_or_default`] logs it and falls back to defaults.

use crate::error::ConfigError;
use crate::types::{ItemId, OptionId};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/auto_augment.toml";

/// Default confirmation dialog lifetime
pub const DEFAULT_CONFIRM_TIMEOUT_SECS: u64 = 15;

/// Life stones handled out of the box
pub const DEFAULT_CATALYSTS: std::ops::RangeInclusive<u32> = 8723..=8762;

/// Auto-augment configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentConfig {
    /// Catalyst item ids this workflow handles
    pub catalysts: IndexSet<ItemId>,
    /// Advance missing material on credit
    pub credit_mode: bool,
    /// Emit debug-level diagnostics
    pub debug_log: bool,
    /// Confirmation dialog policy
    pub confirm: ConfirmPolicy,
    /// What counts as a protected augment
    pub protect: ProtectPolicy,
}

impl AugmentConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a TOML file
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    /// - `ConfigError::Io` if the file exists but cannot be read
    /// - `ConfigError::Parse` if it is not valid for this schema
    /// - `ConfigError::Invalid` if a value is out of range
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("Config {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw =
            std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        let config = Self::from_toml(&raw).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;

        tracing::info!(
            catalysts = config.catalysts.len(),
            confirm = config.confirm.enabled,
            credit_mode = config.credit_mode,
            "Loaded config from {}",
            path.display()
        );
        Ok(config)
    }

    /// Load, falling back to defaults on any error
    #[must_use]
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Config load failed, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Parse from a TOML string
    ///
    /// # Errors
    /// Returns error if TOML is invalid or a value is out of range
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: "<inline>".into(),
            source,
        })?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` naming the offending key
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.catalysts.contains(&ItemId(0)) {
            return Err(ConfigError::Invalid("catalysts: item id 0".to_string()));
        }
        if self.confirm.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "confirm.timeout_secs must be positive".to_string(),
            ));
        }
        if self.protect.option_ids.contains(&OptionId(0)) {
            return Err(ConfigError::Invalid("protect.option_ids: option id 0".to_string()));
        }
        if self.protect.stat_keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "protect.stat_keywords: blank keyword".to_string(),
            ));
        }
        Ok(())
    }

    /// Upper-case and de-blank stat keywords
    fn normalize(&mut self) {
        self.protect.stat_keywords = self
            .protect
            .stat_keywords
            .iter()
            .map(|k| k.trim().to_uppercase())
            .filter(|k| !k.is_empty())
            .collect();
    }

    /// Whether an item id is a handled catalyst
    #[inline]
    #[must_use]
    pub fn is_catalyst(&self, item: ItemId) -> bool {
        self.catalysts.contains(&item)
    }

    /// With catalyst allow-list
    #[must_use]
    pub fn with_catalysts(mut self, ids: impl IntoIterator<Item = u32>) -> Self {
        self.catalysts = ids.into_iter().map(ItemId).collect();
        self
    }

    /// With credit mode
    #[inline]
    #[must_use]
    pub fn with_credit_mode(mut self, enabled: bool) -> Self {
        self.credit_mode = enabled;
        self
    }

    /// With confirmation on or off
    #[inline]
    #[must_use]
    pub fn with_confirm(mut self, enabled: bool) -> Self {
        self.confirm.enabled = enabled;
        self
    }

    /// With confirmation timeout
    #[inline]
    #[must_use]
    pub fn with_confirm_timeout(mut self, secs: u64) -> Self {
        self.confirm.timeout_secs = secs;
        self
    }

    /// With protected option ids
    #[must_use]
    pub fn with_protected_options(mut self, ids: impl IntoIterator<Item = u32>) -> Self {
        self.protect.option_ids = ids.into_iter().map(OptionId).collect();
        self
    }

    /// With stat keyword whitelist
    #[must_use]
    pub fn with_stat_keywords<S: AsRef<str>>(mut self, keywords: impl IntoIterator<Item = S>) -> Self {
        self.protect.stat_keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().to_string())
            .collect();
        self.normalize();
        self
    }
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            catalysts: DEFAULT_CATALYSTS.map(ItemId).collect(),
            credit_mode: false,
            debug_log: false,
            confirm: ConfirmPolicy::default(),
            protect: ProtectPolicy::default(),
        }
    }
}

/// Confirmation dialog policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmPolicy {
    /// Ask before overwriting a protected augment
    pub enabled: bool,
    /// Dialog body
    pub text: String,
    /// Dialog lifetime in seconds
    pub timeout_secs: u64,
}

impl ConfirmPolicy {
    /// Dialog lifetime
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ConfirmPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            text: "Your weapon already has a valuable augment. Replace it?".to_string(),
            timeout_secs: DEFAULT_CONFIRM_TIMEOUT_SECS,
        }
    }
}

/// Protected augment policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtectPolicy {
    /// Any option carrying a skill or trigger is protected
    pub skill_or_trigger: bool,
    /// Option ids that are always protected
    pub option_ids: IndexSet<OptionId>,
    /// Stat keywords matched against the option description (empty disables)
    pub stat_keywords: IndexSet<String>,
}

impl Default for ProtectPolicy {
    fn default() -> Self {
        Self {
            skill_or_trigger: true,
            option_ids: IndexSet::new(),
            stat_keywords: ["STR", "CON", "DEX", "INT", "WIT", "MEN"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn defaults_cover_life_stone_range() {
        let config = AugmentConfig::default();
        assert_eq!(config.catalysts.len(), 40);
        assert!(config.is_catalyst(ItemId(8723)));
        assert!(config.is_catalyst(ItemId(8762)));
        assert!(!config.is_catalyst(ItemId(8763)));
        assert!(config.confirm.enabled);
        assert_eq!(config.confirm.timeout(), Duration::from_secs(15));
        assert!(!config.credit_mode);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = AugmentConfig::from_toml(
            r#"
            credit_mode = true

            [confirm]
            enabled = false
            "#,
        )
        .unwrap();

        assert!(config.credit_mode);
        assert!(!config.confirm.enabled);
        assert_eq!(config.confirm.timeout_secs, DEFAULT_CONFIRM_TIMEOUT_SECS);
        assert_eq!(config.catalysts, AugmentConfig::default().catalysts);
    }

    #[test]
    fn keywords_are_normalized() {
        let config = AugmentConfig::from_toml(
            r#"
            [protect]
            stat_keywords = [" str", "Wit ", "  "]
            "#,
        )
        .unwrap();

        let keywords: Vec<&str> = config
            .protect
            .stat_keywords
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(keywords, vec!["STR", "WIT"]);
    }

    #[test]
    fn catalyst_order_is_preserved() {
        let config = AugmentConfig::from_toml("catalysts = [9, 3, 7]").unwrap();
        let ids: Vec<u32> = config.catalysts.iter().map(|i| i.0).collect();
        assert_eq!(ids, vec![9, 3, 7]);
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let err = AugmentConfig::from_toml("[confirm]\ntimeout_secs = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn blank_keyword_is_invalid() {
        let mut config = AugmentConfig::new();
        config.protect.stat_keywords.insert("  ".to_string());
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = AugmentConfig::from_toml("catalysts = [\"x\"]").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AugmentConfig::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, AugmentConfig::default());
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "catalysts = [8723]\n[protect]\noption_ids = [16000]").unwrap();

        let config = AugmentConfig::load(file.path()).unwrap();
        assert_eq!(config.catalysts.len(), 1);
        assert!(config.protect.option_ids.contains(&OptionId(16000)));
    }

    #[test]
    fn load_or_default_recovers_from_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "this is = = not toml").unwrap();

        assert!(matches!(
            AugmentConfig::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
        assert_eq!(AugmentConfig::load_or_default(file.path()), AugmentConfig::default());
    }

    #[test]
    fn builder_setters() {
        let config = AugmentConfig::new()
            .with_catalysts([1, 2])
            .with_credit_mode(true)
            .with_confirm(false)
            .with_confirm_timeout(5)
            .with_protected_options([77])
            .with_stat_keywords(["luc"]);

        assert_eq!(config.catalysts.len(), 2);
        assert!(config.credit_mode);
        assert!(!config.confirm.enabled);
        assert_eq!(config.confirm.timeout_secs, 5);
        assert!(config.protect.option_ids.contains(&OptionId(77)));
        assert!(config.protect.stat_keywords.contains("LUC"));
    }
}
